use chrono::{DateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AttendanceError, AttendanceResult};

/// A recurring daily shift. Weekdays are 0 = Sunday .. 6 = Saturday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 4,
        "employee_id": 1000,
        "name": "Morning",
        "start_time": "09:00:00",
        "end_time": "17:00:00",
        "days_of_week": [1, 2, 3, 4, 5],
        "is_active": true,
        "updated_at": "2026-01-01T00:00:00Z"
    })
)]
pub struct ShiftDefinition {
    pub id: u64,
    pub employee_id: u64,
    pub name: String,
    #[schema(value_type = String, example = "09:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "17:00:00")]
    pub end_time: NaiveTime,
    pub days_of_week: Vec<u8>,
    pub is_active: bool,
    #[schema(format = "date-time", value_type = String)]
    pub updated_at: DateTime<Utc>,
}

impl ShiftDefinition {
    pub fn applies_on(&self, weekday_from_sunday: u8) -> bool {
        self.days_of_week.contains(&weekday_from_sunday)
    }

    /// Shifts whose end time-of-day is before their start wrap past midnight.
    pub fn is_overnight(&self) -> bool {
        self.end_time < self.start_time
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewShift {
    pub employee_id: u64,
    pub name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub days_of_week: Vec<u8>,
}

pub const DEFAULT_SHIFT_NAME: &str = "Regular";

impl NewShift {
    pub fn new(
        employee_id: u64,
        name: Option<&str>,
        start_time: NaiveTime,
        end_time: NaiveTime,
        days_of_week: Vec<u8>,
    ) -> AttendanceResult<Self> {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_SHIFT_NAME);

        Ok(Self {
            employee_id,
            name: name.to_string(),
            start_time,
            end_time,
            days_of_week: normalize_days(days_of_week)?,
        })
    }
}

/// Sorts and deduplicates weekday numbers, rejecting anything outside 0..=6.
pub fn normalize_days(mut days: Vec<u8>) -> AttendanceResult<Vec<u8>> {
    if let Some(bad) = days.iter().find(|d| **d > 6) {
        return Err(AttendanceError::invalid(format!(
            "day of week {bad} is outside 0 (Sunday) .. 6 (Saturday)"
        )));
    }
    days.sort_unstable();
    days.dedup();
    if days.is_empty() {
        return Err(AttendanceError::invalid(
            "a shift needs at least one day of week",
        ));
    }
    Ok(days)
}

/// Renders a time of day as `h:MM AM/PM`.
pub fn format_shift_time(time: NaiveTime) -> String {
    let hour = time.hour();
    let suffix = if hour >= 12 { "PM" } else { "AM" };
    let hour12 = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02} {}", hour12, time.minute(), suffix)
}
