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
pub enum AttendanceStatus {
    Active,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "2026-01-05T09:02:00Z", format = "date-time", value_type = String)]
    pub clock_in_time: DateTime<Utc>,
    pub clock_in_location: Option<Coordinate>,
    #[schema(example = "2026-01-05T17:05:00Z", format = "date-time", value_type = String, nullable = true)]
    pub clock_out_time: Option<DateTime<Utc>>,
    pub clock_out_location: Option<Coordinate>,
    pub is_remote: bool,
    pub status: AttendanceStatus,
}

/// Fields of a record about to be inserted; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAttendance {
    pub employee_id: u64,
    pub clock_in_time: DateTime<Utc>,
    pub clock_in_location: Option<Coordinate>,
    pub is_remote: bool,
}

impl AttendanceRecord {
    pub fn is_active(&self) -> bool {
        self.status == AttendanceStatus::Active
    }

    /// Hours between clock-in and clock-out, `None` while still active.
    pub fn worked_hours(&self) -> Option<f64> {
        self.clock_out_time
            .map(|out| (out - self.clock_in_time).num_seconds().max(0) as f64 / 3600.0)
    }
}
