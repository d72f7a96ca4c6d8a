//! Decides whether "now" falls inside an employee's shift window.
//!
//! Evaluation works on the company's local wall clock. A shift whose end is
//! earlier than its start wraps past midnight; the window is anchored so that
//! exactly one start/end pair of at most 24 hours is considered.

use chrono::{Datelike, Duration, NaiveDateTime};
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::shift::ShiftDefinition;

pub const GRACE_BEFORE_START_MINUTES: i64 = 30;
pub const LATE_AFTER_START_HOURS: i64 = 2;

pub const MSG_NO_SHIFT_TODAY: &str = "No shift assigned for today";
pub const MSG_NOT_STARTED: &str = "Shift has not started yet";
pub const MSG_ENDED: &str = "Shift has ended";
pub const MSG_LATE: &str = "Late clock in - more than 2 hours late";
pub const MSG_ON_TIME: &str = "Within shift time";

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ShiftEvaluation {
    pub is_valid: bool,
    pub is_late: bool,
    pub hours_remaining: f64,
    pub message: String,
}

impl ShiftEvaluation {
    fn closed(message: &str) -> Self {
        Self {
            is_valid: false,
            is_late: false,
            hours_remaining: 0.0,
            message: message.to_string(),
        }
    }
}

pub fn evaluate(shift: &ShiftDefinition, now: NaiveDateTime) -> ShiftEvaluation {
    let weekday = now.weekday().num_days_from_sunday() as u8;
    if !shift.applies_on(weekday) {
        return ShiftEvaluation::closed(MSG_NO_SHIFT_TODAY);
    }

    let (start, end) = window_around(shift, now);

    if now < start - Duration::minutes(GRACE_BEFORE_START_MINUTES) {
        return ShiftEvaluation::closed(MSG_NOT_STARTED);
    }
    if now > end {
        return ShiftEvaluation::closed(MSG_ENDED);
    }

    // exactly two hours after start already counts as late
    let is_late = now >= start + Duration::hours(LATE_AFTER_START_HOURS);
    let hours_remaining = ((end - now).num_seconds() as f64 / 3600.0).max(0.0);

    ShiftEvaluation {
        is_valid: true,
        is_late,
        hours_remaining,
        message: if is_late { MSG_LATE } else { MSG_ON_TIME }.to_string(),
    }
}

/// Start and end of the shift occurrence that "now" belongs to.
fn window_around(shift: &ShiftDefinition, now: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    let today = now.date();
    let mut start = today.and_time(shift.start_time);
    let mut end = today.and_time(shift.end_time);

    if shift.start_time == shift.end_time {
        // round-the-clock shift anchored at the most recent start
        if now.time() < shift.start_time {
            start -= Duration::days(1);
        }
        end = start + Duration::days(1);
    } else if shift.is_overnight() {
        if now.time() < shift.end_time {
            start -= Duration::days(1);
        } else {
            end += Duration::days(1);
        }
    }

    (start, end)
}
