use crate::api::AppState;
use crate::attendance::{Disposition, geo::Coordinate, location::ReportedLocation};
use crate::auth::auth::AuthUser;
use crate::error::AttendanceError;
use crate::model::remote_request::{Decision, RemoteClockInRequest};
use actix_web::{HttpResponse, Responder, error::ErrorForbidden, web};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateRemoteRequest {
    #[schema(example = 23.9)]
    pub latitude: f64,
    #[schema(example = 90.5)]
    pub longitude: f64,
    #[schema(example = "Client site visit")]
    pub reason: Option<String>,
}

/// Ask the supervisor to approve clocking in from outside every office fence
#[utoipa::path(
    post,
    path = "/api/remote-requests",
    request_body = CreateRemoteRequest,
    responses(
        (status = 201, description = "Request created", body = RemoteClockInRequest),
        (status = 400, description = "Coordinates out of range"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Already clocked in, request pending, or no supervisor", body = Object, example = json!({
            "message": "Cannot send request - supervisor not assigned"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Remote Requests"
)]
pub async fn create_request(
    auth: AuthUser,
    state: web::Data<AppState>,
    body: web::Json<CreateRemoteRequest>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee_id()?;
    let profile = state.profile(employee_id).await?;
    let CreateRemoteRequest {
        latitude,
        longitude,
        reason,
    } = body.into_inner();
    let position = ReportedLocation(Some(Coordinate::new(latitude, longitude)?));

    let request = state
        .orchestrator
        .request_remote_clock_in(&profile, &position, reason)
        .await?;

    Ok(HttpResponse::Created().json(request))
}

/// Caller's outstanding remote request
#[utoipa::path(
    get,
    path = "/api/remote-requests/mine",
    responses(
        (status = 200, description = "Pending request", body = RemoteClockInRequest),
        (status = 404, description = "Nothing pending"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Remote Requests"
)]
pub async fn my_pending(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee_id()?;
    let request = state
        .orchestrator
        .remote()
        .get_pending(employee_id)
        .await?
        .ok_or_else(|| AttendanceError::not_found("No pending remote request"))?;

    Ok(HttpResponse::Ok().json(request))
}

/// Requests awaiting the caller's decision, newest first
#[utoipa::path(
    get,
    path = "/api/remote-requests/pending",
    responses(
        (status = 200, description = "Pending requests", body = [RemoteClockInRequest]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Remote Requests"
)]
pub async fn pending_for_me(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> actix_web::Result<impl Responder> {
    let supervisor_id = auth.require_employee_id()?;
    let requests = state
        .orchestrator
        .remote()
        .get_pending_for_supervisor(supervisor_id)
        .await?;

    Ok(HttpResponse::Ok().json(requests))
}

async fn dispose(
    auth: AuthUser,
    state: web::Data<AppState>,
    request_id: u64,
    decision: Decision,
) -> actix_web::Result<Disposition> {
    let request = state
        .orchestrator
        .remote()
        .get(request_id)
        .await?
        .ok_or_else(|| AttendanceError::not_found(format!("Remote request {request_id} not found")))?;

    if !auth.may_dispose(&request) {
        tracing::info!(
            request_id,
            user_id = auth.user_id,
            username = %auth.username,
            "Refused remote request decision from non-supervisor"
        );
        return Err(ErrorForbidden("Only the assigned supervisor can respond"));
    }

    Ok(state
        .orchestrator
        .dispose_remote_request(request_id, decision)
        .await?)
}

/// Approve a pending request; opens a remote attendance record
#[utoipa::path(
    put,
    path = "/api/remote-requests/{request_id}/approve",
    params(
        ("request_id" = u64, Path, description = "ID of the remote request to approve")
    ),
    responses(
        (status = 200, description = "Request approved", body = Disposition),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the assigned supervisor"),
        (status = 404, description = "Remote request not found or already processed", body = Object, example = json!({
            "message": "Remote request 12 not found or already processed"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Remote Requests"
)]
pub async fn approve_request(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let disposition = dispose(auth, state, path.into_inner(), Decision::Approved).await?;
    Ok(HttpResponse::Ok().json(disposition))
}

/// Reject a pending request
#[utoipa::path(
    put,
    path = "/api/remote-requests/{request_id}/reject",
    params(
        ("request_id" = u64, Path, description = "ID of the remote request to reject")
    ),
    responses(
        (status = 200, description = "Request rejected", body = Disposition),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the assigned supervisor"),
        (status = 404, description = "Remote request not found or already processed")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Remote Requests"
)]
pub async fn reject_request(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let disposition = dispose(auth, state, path.into_inner(), Decision::Rejected).await?;
    Ok(HttpResponse::Ok().json(disposition))
}
