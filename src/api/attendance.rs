use crate::api::{AppState, LocationBody};
use crate::attendance::{ClockInOutcome, location::ReportedLocation, shift_window::ShiftEvaluation};
use crate::auth::auth::AuthUser;
use crate::error::AttendanceError;
use crate::model::attendance::AttendanceRecord;
use crate::model::shift::{ShiftDefinition, format_shift_time};
use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Serialize, ToSchema)]
pub struct AttendanceView {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    /// Hours between clock-in and clock-out, once completed.
    #[schema(example = 8.5, nullable = true)]
    pub worked_hours: Option<f64>,
}

impl From<AttendanceRecord> for AttendanceView {
    fn from(record: AttendanceRecord) -> Self {
        Self {
            worked_hours: record.worked_hours(),
            record,
        }
    }
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct HistoryQuery {
    /// Inclusive lower bound on clock-in time
    #[schema(example = "2026-01-01T00:00:00Z", value_type = Option<String>, format = DateTime)]
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on clock-in time
    #[schema(example = "2026-02-01T00:00:00Z", value_type = Option<String>, format = DateTime)]
    pub to: Option<DateTime<Utc>>,
}

#[derive(Serialize, ToSchema)]
pub struct ShiftWindowResponse {
    pub shift: Option<ShiftDefinition>,
    #[schema(example = "9:00 AM")]
    pub starts: Option<String>,
    #[schema(example = "5:00 PM")]
    pub ends: Option<String>,
    /// `null` when no active shift applies; clock-in is then unrestricted.
    pub evaluation: Option<ShiftEvaluation>,
}

/// Clock-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/clock-in",
    request_body = LocationBody,
    responses(
        (status = 200, description = "Clock-in decision", body = ClockInOutcome, example = json!({
            "outcome": "blocked",
            "message": "already clocked in"
        })),
        (status = 400, description = "Coordinates out of range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile"),
        (status = 422, description = "Device location unavailable", body = Object, example = json!({
            "message": "location unavailable: device location was not provided"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn clock_in(
    auth: AuthUser,
    state: web::Data<AppState>,
    body: web::Json<LocationBody>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee_id()?;
    let profile = state.profile(employee_id).await?;
    let position = body.reported()?;

    let outcome = state
        .orchestrator
        .attempt_clock_in(&profile, &position)
        .await?;

    Ok(HttpResponse::Ok().json(outcome))
}

/// Clock-out endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/clock-out",
    request_body = LocationBody,
    responses(
        (status = 200, description = "Clocked out", body = AttendanceView),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile"),
        (status = 404, description = "No active clock-in found", body = Object, example = json!({
            "message": "No active clock-in found"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn clock_out(
    auth: AuthUser,
    state: web::Data<AppState>,
    body: web::Json<LocationBody>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee_id()?;
    // a malformed position is dropped rather than blocking the clock-out
    let position = body.reported().unwrap_or_else(|e| {
        tracing::warn!(employee_id, error = %e, "Ignoring invalid clock-out location");
        ReportedLocation(None)
    });

    let record = state.orchestrator.clock_out(employee_id, &position).await?;
    Ok(HttpResponse::Ok().json(AttendanceView::from(record)))
}

/// Caller's open attendance record
#[utoipa::path(
    get,
    path = "/api/attendance/active",
    responses(
        (status = 200, description = "Active record", body = AttendanceView),
        (status = 404, description = "Not clocked in"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn active(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee_id()?;
    let record = state
        .orchestrator
        .attendance()
        .get_active(employee_id)
        .await?
        .ok_or_else(|| AttendanceError::not_found("No active clock-in found"))?;

    Ok(HttpResponse::Ok().json(AttendanceView::from(record)))
}

/// Caller's attendance history, newest first
#[utoipa::path(
    get,
    path = "/api/attendance/history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Attendance records", body = [AttendanceView]),
        (status = 400, description = "Invalid range"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn history(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<HistoryQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee_id()?;
    let HistoryQuery { from, to } = query.into_inner();
    if let (Some(from), Some(to)) = (from, to) {
        if from >= to {
            return Err(AttendanceError::invalid("`from` must be before `to`").into());
        }
    }

    let records: Vec<AttendanceView> = state
        .orchestrator
        .attendance()
        .history(employee_id, from, to)
        .await?
        .into_iter()
        .map(AttendanceView::from)
        .collect();

    Ok(HttpResponse::Ok().json(records))
}

/// Evaluates the caller's active shift against the current time
#[utoipa::path(
    get,
    path = "/api/shift-window",
    responses(
        (status = 200, description = "Shift window status", body = ShiftWindowResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn shift_window(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee_id()?;
    let shift = state.orchestrator.current_shift(employee_id).await?;
    let evaluation = shift.as_ref().map(|s| state.orchestrator.evaluate_shift(s));

    Ok(HttpResponse::Ok().json(ShiftWindowResponse {
        starts: shift.as_ref().map(|s| format_shift_time(s.start_time)),
        ends: shift.as_ref().map(|s| format_shift_time(s.end_time)),
        shift,
        evaluation,
    }))
}
