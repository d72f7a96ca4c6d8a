use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::clock::Clock;
use super::geo::Coordinate;
use crate::error::{AttendanceError, AttendanceResult};
use crate::model::attendance::{AttendanceRecord, NewAttendance};
use crate::store::AttendanceStore;

/// Owns the active -> completed transition of attendance records.
#[derive(Clone)]
pub struct AttendanceService {
    store: Arc<dyn AttendanceStore>,
    clock: Arc<dyn Clock>,
}

impl AttendanceService {
    pub fn new(store: Arc<dyn AttendanceStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Opens an active record stamped with the current time. Callers check
    /// for an existing active record first; the store refuses a second one.
    pub async fn clock_in(
        &self,
        employee_id: u64,
        location: Option<Coordinate>,
        is_remote: bool,
    ) -> AttendanceResult<AttendanceRecord> {
        let record = self
            .store
            .insert_attendance(NewAttendance {
                employee_id,
                clock_in_time: self.clock.now(),
                clock_in_location: location,
                is_remote,
            })
            .await?;

        tracing::info!(
            employee_id,
            record_id = record.id,
            is_remote,
            "Clocked in"
        );
        Ok(record)
    }

    /// Completes an active record. The location is optional and never blocks.
    pub async fn clock_out(
        &self,
        record_id: u64,
        location: Option<Coordinate>,
    ) -> AttendanceResult<AttendanceRecord> {
        let record = self
            .store
            .complete_attendance(record_id, self.clock.now(), location)
            .await?
            .ok_or_else(|| {
                AttendanceError::not_found(format!("no active attendance record {record_id}"))
            })?;

        tracing::info!(
            employee_id = record.employee_id,
            record_id,
            has_location = location.is_some(),
            "Clocked out"
        );
        Ok(record)
    }

    pub async fn get_active(&self, employee_id: u64) -> AttendanceResult<Option<AttendanceRecord>> {
        self.store.find_active_attendance(employee_id).await
    }

    pub async fn history(
        &self,
        employee_id: u64,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> AttendanceResult<Vec<AttendanceRecord>> {
        self.store.list_attendance(employee_id, from, to).await
    }
}
