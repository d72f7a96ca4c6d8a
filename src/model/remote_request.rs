use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::attendance::geo::Coordinate;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, EnumString, Display, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RemoteRequestStatus {
    Pending,
    Approved,
    Rejected,
}

/// A supervisor's answer; only terminal statuses are expressible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Rejected,
}

impl From<Decision> for RemoteRequestStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approved => RemoteRequestStatus::Approved,
            Decision::Rejected => RemoteRequestStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": 12,
    "employee_id": 1000,
    "supervisor_id": 1001,
    "requested_at": "2026-01-05T09:01:00Z",
    "location": { "latitude": 23.8103, "longitude": 90.4125 },
    "reason": "Client meeting",
    "status": "pending",
    "responded_at": null
}))]
pub struct RemoteClockInRequest {
    pub id: u64,
    pub employee_id: u64,
    pub supervisor_id: u64,
    #[schema(format = "date-time", value_type = String)]
    pub requested_at: DateTime<Utc>,
    pub location: Coordinate,
    pub reason: Option<String>,
    pub status: RemoteRequestStatus,
    #[schema(format = "date-time", value_type = String, nullable = true)]
    pub responded_at: Option<DateTime<Utc>>,
}

impl RemoteClockInRequest {
    pub fn is_pending(&self) -> bool {
        self.status == RemoteRequestStatus::Pending
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRemoteRequest {
    pub employee_id: u64,
    pub supervisor_id: u64,
    pub requested_at: DateTime<Utc>,
    pub location: Coordinate,
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decisions_map_to_terminal_statuses() {
        assert_eq!(
            RemoteRequestStatus::from(Decision::Approved),
            RemoteRequestStatus::Approved
        );
        assert_eq!(
            RemoteRequestStatus::from(Decision::Rejected),
            RemoteRequestStatus::Rejected
        );
    }

    #[test]
    fn decision_deserializes_from_lowercase() {
        let d: Decision = serde_json::from_str("\"approved\"").unwrap();
        assert_eq!(d, Decision::Approved);
        assert!(serde_json::from_str::<Decision>("\"pending\"").is_err());
    }
}
