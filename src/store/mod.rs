//! Persistence seams of the attendance engine.
//!
//! Each collection gets its own trait so services only see what they use.
//! Every backend must uphold two uniqueness rules atomically: at most one
//! `active` attendance record and at most one `pending` remote request per
//! employee. Violations surface as [`AttendanceError::PolicyBlocked`].

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};

use crate::attendance::geo::Coordinate;
use crate::error::AttendanceResult;
use crate::model::{
    attendance::{AttendanceRecord, NewAttendance},
    employee::EmployeeProfile,
    office_location::{NewOfficeLocation, OfficeLocation},
    remote_request::{NewRemoteRequest, RemoteClockInRequest, RemoteRequestStatus},
    shift::{NewShift, ShiftDefinition},
};

#[cfg(test)]
pub mod memory;
pub mod mysql;

#[cfg(test)]
pub use memory::InMemoryStore;
pub use mysql::MySqlStore;

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn insert_attendance(&self, new: NewAttendance) -> AttendanceResult<AttendanceRecord>;

    async fn find_attendance(&self, id: u64) -> AttendanceResult<Option<AttendanceRecord>>;

    async fn find_active_attendance(
        &self,
        employee_id: u64,
    ) -> AttendanceResult<Option<AttendanceRecord>>;

    /// Flips an `active` record to `completed`. `None` when the id is unknown
    /// or the record is not active.
    async fn complete_attendance(
        &self,
        id: u64,
        clock_out_time: DateTime<Utc>,
        location: Option<Coordinate>,
    ) -> AttendanceResult<Option<AttendanceRecord>>;

    /// Records clocked in within `[from, to)`, newest first.
    async fn list_attendance(
        &self,
        employee_id: u64,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> AttendanceResult<Vec<AttendanceRecord>>;
}

#[async_trait]
pub trait RemoteRequestStore: Send + Sync {
    async fn insert_remote_request(
        &self,
        new: NewRemoteRequest,
    ) -> AttendanceResult<RemoteClockInRequest>;

    async fn find_remote_request(&self, id: u64) -> AttendanceResult<Option<RemoteClockInRequest>>;

    async fn find_pending_request(
        &self,
        employee_id: u64,
    ) -> AttendanceResult<Option<RemoteClockInRequest>>;

    /// Pending requests addressed to a supervisor, newest first.
    async fn list_pending_for_supervisor(
        &self,
        supervisor_id: u64,
    ) -> AttendanceResult<Vec<RemoteClockInRequest>>;

    /// Moves a `pending` request to a terminal status. `None` when the id is
    /// unknown or the request was already disposed.
    async fn resolve_remote_request(
        &self,
        id: u64,
        status: RemoteRequestStatus,
        responded_at: DateTime<Utc>,
    ) -> AttendanceResult<Option<RemoteClockInRequest>>;
}

/// Partial edit of a shift; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShiftUpdate {
    pub name: Option<String>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub days_of_week: Option<Vec<u8>>,
    pub is_active: Option<bool>,
}

#[async_trait]
pub trait ShiftStore: Send + Sync {
    async fn insert_shift(
        &self,
        new: NewShift,
        now: DateTime<Utc>,
    ) -> AttendanceResult<ShiftDefinition>;

    async fn find_shift(&self, id: u64) -> AttendanceResult<Option<ShiftDefinition>>;

    /// All shifts, or those of one employee.
    async fn list_shifts(&self, employee_id: Option<u64>) -> AttendanceResult<Vec<ShiftDefinition>>;

    /// Active shifts of an employee, most recently updated first.
    async fn list_active_shifts(&self, employee_id: u64) -> AttendanceResult<Vec<ShiftDefinition>>;

    async fn update_shift(
        &self,
        id: u64,
        update: ShiftUpdate,
        now: DateTime<Utc>,
    ) -> AttendanceResult<Option<ShiftDefinition>>;

    async fn delete_shift(&self, id: u64) -> AttendanceResult<bool>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfficeLocationUpdate {
    pub name: Option<String>,
    pub center: Option<Coordinate>,
    pub radius_meters: Option<f64>,
}

#[async_trait]
pub trait OfficeLocationStore: Send + Sync {
    async fn insert_office_location(
        &self,
        new: NewOfficeLocation,
    ) -> AttendanceResult<OfficeLocation>;

    async fn list_office_locations(&self) -> AttendanceResult<Vec<OfficeLocation>>;

    /// Fences of one company together with the unscoped ones.
    async fn fences_for_company(
        &self,
        company_id: Option<u64>,
    ) -> AttendanceResult<Vec<OfficeLocation>>;

    async fn update_office_location(
        &self,
        id: u64,
        update: OfficeLocationUpdate,
    ) -> AttendanceResult<Option<OfficeLocation>>;

    async fn delete_office_location(&self, id: u64) -> AttendanceResult<bool>;
}

#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    async fn employee_profile(&self, employee_id: u64) -> AttendanceResult<Option<EmployeeProfile>>;
}
