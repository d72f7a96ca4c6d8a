//! Attendance validation engine: distance math, geofencing, shift windows,
//! the attendance lifecycle, remote approvals and the clock-in policy that
//! ties them together.

pub mod clock;
pub mod geo;
pub mod geofence;
pub mod lifecycle;
pub mod location;
pub mod orchestrator;
pub mod remote_approval;
pub mod shift_window;

pub use orchestrator::{ClockInOrchestrator, ClockInOutcome, Disposition};
