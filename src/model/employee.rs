use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Where an employee is expected to work; controls whether geofencing applies.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, EnumString, Display, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WorkMode {
    Office,
    Remote,
    Hybrid,
}

impl WorkMode {
    pub fn requires_geofence(&self) -> bool {
        !matches!(self, WorkMode::Remote)
    }
}

/// The slice of an employee's record the attendance engine depends on.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1000,
        "company_id": 7,
        "supervisor_id": 1001,
        "work_mode": "office"
    })
)]
pub struct EmployeeProfile {
    #[schema(example = 1000)]
    pub id: u64,

    #[schema(example = 7, nullable = true)]
    pub company_id: Option<u64>,

    #[schema(example = 1001, nullable = true)]
    pub supervisor_id: Option<u64>,

    pub work_mode: WorkMode,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn work_mode_parses_lowercase_names() {
        assert_eq!(WorkMode::from_str("office").unwrap(), WorkMode::Office);
        assert_eq!(WorkMode::from_str("remote").unwrap(), WorkMode::Remote);
        assert_eq!(WorkMode::from_str("hybrid").unwrap(), WorkMode::Hybrid);
        assert!(WorkMode::from_str("moon").is_err());
        assert_eq!(WorkMode::Hybrid.as_ref(), "hybrid");
    }

    #[test]
    fn only_remote_skips_the_geofence() {
        assert!(WorkMode::Office.requires_geofence());
        assert!(WorkMode::Hybrid.requires_geofence());
        assert!(!WorkMode::Remote.requires_geofence());
    }
}
