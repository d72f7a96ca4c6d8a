use crate::api::AppState;
use crate::auth::auth::AuthUser;
use crate::error::{AttendanceError, AttendanceResult};
use crate::model::shift::{NewShift, ShiftDefinition, normalize_days};
use crate::store::ShiftUpdate;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveTime;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateShift {
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "Morning")]
    pub name: Option<String>,
    #[schema(example = "09:00")]
    pub start_time: String,
    #[schema(example = "17:00")]
    pub end_time: String,
    /// 0 = Sunday .. 6 = Saturday
    #[schema(example = json!([1, 2, 3, 4, 5]))]
    pub days_of_week: Vec<u8>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateShift {
    pub name: Option<String>,
    #[schema(example = "22:00")]
    pub start_time: Option<String>,
    #[schema(example = "06:00")]
    pub end_time: Option<String>,
    pub days_of_week: Option<Vec<u8>>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct ShiftFilter {
    /// Filter by employee ID
    #[schema(example = 1000)]
    pub employee_id: Option<u64>,
}

/// Accepts `HH:MM` or `HH:MM:SS`.
fn parse_time(field: &str, raw: &str) -> AttendanceResult<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| AttendanceError::invalid(format!("{field} must look like HH:MM, got {raw:?}")))
}

impl UpdateShift {
    fn into_update(self) -> AttendanceResult<ShiftUpdate> {
        Ok(ShiftUpdate {
            name: self
                .name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            start_time: self
                .start_time
                .as_deref()
                .map(|t| parse_time("start_time", t))
                .transpose()?,
            end_time: self
                .end_time
                .as_deref()
                .map(|t| parse_time("end_time", t))
                .transpose()?,
            days_of_week: self.days_of_week.map(normalize_days).transpose()?,
            is_active: self.is_active,
        })
    }
}

/// Caller's shifts
#[utoipa::path(
    get,
    path = "/api/shifts/mine",
    responses(
        (status = 200, description = "Shifts of the caller", body = [ShiftDefinition]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Shifts"
)]
pub async fn my_shifts(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee_id()?;
    let shifts = state.shifts.list_shifts(Some(employee_id)).await?;
    Ok(HttpResponse::Ok().json(shifts))
}

/// List shifts (Admin)
#[utoipa::path(
    get,
    path = "/api/shifts",
    params(ShiftFilter),
    responses(
        (status = 200, description = "Shifts", body = [ShiftDefinition]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Shifts"
)]
pub async fn list_shifts(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<ShiftFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let shifts = state.shifts.list_shifts(query.employee_id).await?;
    Ok(HttpResponse::Ok().json(shifts))
}

/// Assign a shift to an employee (Admin)
#[utoipa::path(
    post,
    path = "/api/shifts",
    request_body = CreateShift,
    responses(
        (status = 201, description = "Shift created", body = ShiftDefinition),
        (status = 400, description = "Invalid times or days"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Shifts"
)]
pub async fn create_shift(
    auth: AuthUser,
    state: web::Data<AppState>,
    body: web::Json<CreateShift>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let body = body.into_inner();
    state.profile(body.employee_id).await?;

    let new = NewShift::new(
        body.employee_id,
        body.name.as_deref(),
        parse_time("start_time", &body.start_time)?,
        parse_time("end_time", &body.end_time)?,
        body.days_of_week,
    )?;
    let shift = state.shifts.insert_shift(new, state.clock.now()).await?;

    tracing::info!(shift_id = shift.id, employee_id = shift.employee_id, "Shift created");
    Ok(HttpResponse::Created().json(shift))
}

/// Edit a shift (Admin)
#[utoipa::path(
    put,
    path = "/api/shifts/{shift_id}",
    params(
        ("shift_id" = u64, Path, description = "ID of the shift")
    ),
    request_body = UpdateShift,
    responses(
        (status = 200, description = "Shift updated", body = ShiftDefinition),
        (status = 400, description = "Invalid times or days"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Shift not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Shifts"
)]
pub async fn update_shift(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
    body: web::Json<UpdateShift>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let shift_id = path.into_inner();
    let update = body.into_inner().into_update()?;

    let shift = state
        .shifts
        .update_shift(shift_id, update, state.clock.now())
        .await?
        .ok_or_else(|| AttendanceError::not_found(format!("Shift {shift_id} not found")))?;

    Ok(HttpResponse::Ok().json(shift))
}

/// Delete a shift (Admin)
#[utoipa::path(
    delete,
    path = "/api/shifts/{shift_id}",
    params(
        ("shift_id" = u64, Path, description = "ID of the shift")
    ),
    responses(
        (status = 204, description = "Shift deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Shift not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Shifts"
)]
pub async fn delete_shift(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let shift_id = path.into_inner();

    if !state.shifts.delete_shift(shift_id).await? {
        return Err(AttendanceError::not_found(format!("Shift {shift_id} not found")).into());
    }
    tracing::info!(shift_id, "Shift deleted");
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn times_accept_minutes_or_seconds() {
        assert_eq!(
            parse_time("start_time", "09:30").unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap()
        );
        assert_eq!(
            parse_time("start_time", " 22:00:15 ").unwrap(),
            NaiveTime::from_hms_opt(22, 0, 15).unwrap()
        );
        assert!(parse_time("start_time", "9am").is_err());
        assert!(parse_time("start_time", "25:00").is_err());
    }

    #[test]
    fn update_normalizes_days_and_blank_names() {
        let update = UpdateShift {
            name: Some("  ".into()),
            start_time: None,
            end_time: Some("06:00".into()),
            days_of_week: Some(vec![5, 1, 1]),
            is_active: Some(false),
        }
        .into_update()
        .unwrap();

        assert_eq!(update.name, None);
        assert_eq!(update.end_time, NaiveTime::from_hms_opt(6, 0, 0));
        assert_eq!(update.days_of_week, Some(vec![1, 5]));
        assert_eq!(update.is_active, Some(false));
    }

    #[test]
    fn update_rejects_bad_days() {
        let update = UpdateShift {
            name: None,
            start_time: None,
            end_time: None,
            days_of_week: Some(vec![7]),
            is_active: None,
        };
        assert!(update.into_update().is_err());
    }
}
