pub mod attendance;
pub mod office_location;
pub mod remote_request;
pub mod shift;

use std::sync::Arc;

use serde::Deserialize;
use utoipa::ToSchema;

use crate::attendance::{ClockInOrchestrator, clock::Clock, geo::Coordinate, location::ReportedLocation};
use crate::error::{AttendanceError, AttendanceResult};
use crate::model::employee::EmployeeProfile;
use crate::store::{EmployeeDirectory, OfficeLocationStore, ShiftStore};

/// Shared handler state, registered once as `web::Data<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: ClockInOrchestrator,
    pub shifts: Arc<dyn ShiftStore>,
    pub offices: Arc<dyn OfficeLocationStore>,
    pub employees: Arc<dyn EmployeeDirectory>,
    pub clock: Arc<dyn Clock>,
    pub default_fence_radius_m: f64,
}

impl AppState {
    pub async fn profile(&self, employee_id: u64) -> AttendanceResult<EmployeeProfile> {
        self.employees
            .employee_profile(employee_id)
            .await?
            .ok_or_else(|| AttendanceError::not_found(format!("Employee {employee_id} not found")))
    }
}

/// Device position sent by the client; absent when the device could not
/// produce one.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LocationBody {
    #[schema(example = 23.8103, nullable = true)]
    pub latitude: Option<f64>,
    #[schema(example = 90.4125, nullable = true)]
    pub longitude: Option<f64>,
}

impl LocationBody {
    /// A half-filled pair counts as no position; out-of-range values are rejected.
    pub fn reported(&self) -> AttendanceResult<ReportedLocation> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => {
                Ok(ReportedLocation(Some(Coordinate::new(latitude, longitude)?)))
            }
            _ => Ok(ReportedLocation(None)),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::attendance::{
        clock::FixedClock, lifecycle::AttendanceService, remote_approval::RemoteApprovalService,
    };
    use crate::auth::jwt::generate_access_token;
    use crate::config::Config;
    use crate::model::role::Role;
    use crate::store::InMemoryStore;
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    pub const SECRET: &str = "test-secret";

    pub struct TestApp {
        pub store: Arc<InMemoryStore>,
        pub clock: Arc<FixedClock>,
        pub state: AppState,
        pub config: Config,
    }

    impl TestApp {
        // Monday 2026-01-05 10:00 UTC
        pub fn new() -> Self {
            let store = Arc::new(InMemoryStore::new());
            let clock = Arc::new(FixedClock::new(
                Utc.with_ymd_and_hms(2026, 1, 5, 10, 0, 0).unwrap(),
            ));
            let orchestrator = ClockInOrchestrator::new(
                AttendanceService::new(store.clone(), clock.clone()),
                RemoteApprovalService::new(store.clone(), clock.clone()),
                store.clone(),
                store.clone(),
                clock.clone(),
            );
            let state = AppState {
                orchestrator,
                shifts: store.clone(),
                offices: store.clone(),
                employees: store.clone(),
                clock: clock.clone(),
                default_fence_radius_m: 50.0,
            };
            let config = Config {
                database_url: String::new(),
                jwt_secret: SECRET.to_string(),
                server_addr: String::new(),
                api_prefix: "/api".to_string(),
                rate_protected_per_min: 1000,
                rate_clock_per_min: 1000,
                company_timezone: chrono_tz::UTC,
                location_timeout: Duration::from_secs(10),
                default_fence_radius_m: 50.0,
                log_dir: String::new(),
                run_migrations: false,
            };
            Self {
                store,
                clock,
                state,
                config,
            }
        }
    }

    pub fn bearer(role: Role, employee_id: Option<u64>) -> (&'static str, String) {
        let token = generate_access_token(1, "tester", role as u8, employee_id, SECRET, 900);
        ("Authorization", format!("Bearer {token}"))
    }
}
