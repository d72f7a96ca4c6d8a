use crate::api::LocationBody;
use crate::api::attendance::{AttendanceView, HistoryQuery, ShiftWindowResponse};
use crate::api::office_location::{CreateOfficeLocation, UpdateOfficeLocation};
use crate::api::remote_request::CreateRemoteRequest;
use crate::api::shift::{CreateShift, ShiftFilter, UpdateShift};
use crate::attendance::geo::Coordinate;
use crate::attendance::geofence::NearestFence;
use crate::attendance::shift_window::ShiftEvaluation;
use crate::attendance::{ClockInOutcome, Disposition};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::office_location::OfficeLocation;
use crate::model::remote_request::{RemoteClockInRequest, RemoteRequestStatus};
use crate::model::shift::ShiftDefinition;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Attendance API",
        version = "1.0.0",
        description = r#"
## Attendance validation for the HRM system

Decides whether an employee may clock in right now, and records the result.

### 🔹 Key Features
- **Clock-in / clock-out** gated by the employee's shift window
- **Office geofences**: office and hybrid staff must be inside a fence
- **Remote approvals**: outside every fence, a supervisor decides
- **Shift and office location management** for admins

### 🔐 Security
All endpoints require a **JWT Bearer** access token.
Shift and office location changes are **Admin** only.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::clock_in,
        crate::api::attendance::clock_out,
        crate::api::attendance::active,
        crate::api::attendance::history,
        crate::api::attendance::shift_window,

        crate::api::remote_request::create_request,
        crate::api::remote_request::my_pending,
        crate::api::remote_request::pending_for_me,
        crate::api::remote_request::approve_request,
        crate::api::remote_request::reject_request,

        crate::api::shift::my_shifts,
        crate::api::shift::list_shifts,
        crate::api::shift::create_shift,
        crate::api::shift::update_shift,
        crate::api::shift::delete_shift,

        crate::api::office_location::list_locations,
        crate::api::office_location::create_location,
        crate::api::office_location::update_location,
        crate::api::office_location::delete_location
    ),
    components(
        schemas(
            Coordinate,
            LocationBody,
            ClockInOutcome,
            NearestFence,
            AttendanceRecord,
            AttendanceStatus,
            AttendanceView,
            HistoryQuery,
            ShiftEvaluation,
            ShiftWindowResponse,
            RemoteClockInRequest,
            RemoteRequestStatus,
            CreateRemoteRequest,
            Disposition,
            ShiftDefinition,
            CreateShift,
            UpdateShift,
            ShiftFilter,
            OfficeLocation,
            CreateOfficeLocation,
            UpdateOfficeLocation
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Clock-in, clock-out and shift window APIs"),
        (name = "Remote Requests", description = "Supervisor approval of off-site clock-ins"),
        (name = "Shifts", description = "Shift management APIs"),
        (name = "Office Locations", description = "Office geofence management APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route_and_the_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        for path in [
            "/api/attendance/clock-in",
            "/api/remote-requests/{request_id}/approve",
            "/api/shifts/{shift_id}",
            "/api/office-locations",
            "/api/shift-window",
        ] {
            assert!(paths.contains_key(path), "missing {path}");
        }
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
