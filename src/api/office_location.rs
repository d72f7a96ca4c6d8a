use crate::api::AppState;
use crate::attendance::geo::Coordinate;
use crate::auth::auth::AuthUser;
use crate::error::{AttendanceError, AttendanceResult};
use crate::model::office_location::{NewOfficeLocation, OfficeLocation, validate_radius};
use crate::store::OfficeLocationUpdate;
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateOfficeLocation {
    #[schema(example = "Main Office")]
    pub name: String,
    #[schema(example = 23.8103)]
    pub latitude: f64,
    #[schema(example = 90.4125)]
    pub longitude: f64,
    /// Defaults to the configured fence radius
    #[schema(example = 50.0)]
    pub radius_meters: Option<f64>,
    /// Omit for a fence shared by every company
    #[schema(example = 7)]
    pub company_id: Option<u64>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateOfficeLocation {
    pub name: Option<String>,
    /// Must be sent together with `longitude`
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_meters: Option<f64>,
}

impl UpdateOfficeLocation {
    fn into_update(self) -> AttendanceResult<OfficeLocationUpdate> {
        let center = match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinate::new(latitude, longitude)?),
            (None, None) => None,
            _ => {
                return Err(AttendanceError::invalid(
                    "latitude and longitude must be updated together",
                ));
            }
        };
        if let Some(radius) = self.radius_meters {
            validate_radius(radius)?;
        }
        let name = match self.name.map(|n| n.trim().to_string()) {
            Some(n) if n.is_empty() => {
                return Err(AttendanceError::invalid("location name must not be empty"));
            }
            other => other,
        };

        Ok(OfficeLocationUpdate {
            name,
            center,
            radius_meters: self.radius_meters,
        })
    }
}

/// Office fences visible to the caller: their company's plus shared ones. Admins see all.
#[utoipa::path(
    get,
    path = "/api/office-locations",
    responses(
        (status = 200, description = "Office locations", body = [OfficeLocation]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Office Locations"
)]
pub async fn list_locations(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> actix_web::Result<impl Responder> {
    let locations = if auth.role.is_admin() {
        state.offices.list_office_locations().await?
    } else {
        let profile = state.profile(auth.require_employee_id()?).await?;
        state.offices.fences_for_company(profile.company_id).await?
    };
    Ok(HttpResponse::Ok().json(locations))
}

/// Create an office fence (Admin)
#[utoipa::path(
    post,
    path = "/api/office-locations",
    request_body = CreateOfficeLocation,
    responses(
        (status = 201, description = "Location created", body = OfficeLocation),
        (status = 400, description = "Invalid name, coordinates or radius"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Office Locations"
)]
pub async fn create_location(
    auth: AuthUser,
    state: web::Data<AppState>,
    body: web::Json<CreateOfficeLocation>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let body = body.into_inner();

    let new = NewOfficeLocation::new(
        &body.name,
        body.latitude,
        body.longitude,
        body.radius_meters.unwrap_or(state.default_fence_radius_m),
        body.company_id,
    )?;
    let location = state.offices.insert_office_location(new).await?;

    tracing::info!(location_id = location.id, name = %location.name, "Office location created");
    Ok(HttpResponse::Created().json(location))
}

/// Edit an office fence (Admin)
#[utoipa::path(
    put,
    path = "/api/office-locations/{location_id}",
    params(
        ("location_id" = u64, Path, description = "ID of the office location")
    ),
    request_body = UpdateOfficeLocation,
    responses(
        (status = 200, description = "Location updated", body = OfficeLocation),
        (status = 400, description = "Invalid name, coordinates or radius"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Location not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Office Locations"
)]
pub async fn update_location(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
    body: web::Json<UpdateOfficeLocation>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let location_id = path.into_inner();
    let update = body.into_inner().into_update()?;

    let location = state
        .offices
        .update_office_location(location_id, update)
        .await?
        .ok_or_else(|| {
            AttendanceError::not_found(format!("Office location {location_id} not found"))
        })?;

    Ok(HttpResponse::Ok().json(location))
}

/// Delete an office fence (Admin)
#[utoipa::path(
    delete,
    path = "/api/office-locations/{location_id}",
    params(
        ("location_id" = u64, Path, description = "ID of the office location")
    ),
    responses(
        (status = 204, description = "Location deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Location not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Office Locations"
)]
pub async fn delete_location(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let location_id = path.into_inner();

    if !state.offices.delete_office_location(location_id).await? {
        return Err(
            AttendanceError::not_found(format!("Office location {location_id} not found")).into(),
        );
    }
    tracing::info!(location_id, "Office location deleted");
    Ok(HttpResponse::NoContent().finish())
}
