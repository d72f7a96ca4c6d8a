use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{
    AttendanceStore, EmployeeDirectory, OfficeLocationStore, OfficeLocationUpdate,
    RemoteRequestStore, ShiftStore, ShiftUpdate,
};
use crate::attendance::geo::Coordinate;
use crate::error::{AttendanceError, AttendanceResult};
use crate::model::{
    attendance::{AttendanceRecord, AttendanceStatus, NewAttendance},
    employee::EmployeeProfile,
    office_location::{NewOfficeLocation, OfficeLocation},
    remote_request::{NewRemoteRequest, RemoteClockInRequest, RemoteRequestStatus},
    shift::{NewShift, ShiftDefinition},
};

#[derive(Default)]
struct Tables {
    next_id: u64,
    attendance: Vec<AttendanceRecord>,
    requests: Vec<RemoteClockInRequest>,
    shifts: Vec<ShiftDefinition>,
    offices: Vec<OfficeLocation>,
    employees: HashMap<u64, EmployeeProfile>,
}

impl Tables {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Mutex-guarded store with the same uniqueness rules as the MySQL schema.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_employee(&self, profile: EmployeeProfile) {
        self.tables
            .lock()
            .unwrap()
            .employees
            .insert(profile.id, profile);
    }

    pub fn attendance_count(&self, employee_id: u64) -> usize {
        self.tables
            .lock()
            .unwrap()
            .attendance
            .iter()
            .filter(|r| r.employee_id == employee_id)
            .count()
    }
}

#[async_trait]
impl AttendanceStore for InMemoryStore {
    async fn insert_attendance(&self, new: NewAttendance) -> AttendanceResult<AttendanceRecord> {
        let mut tables = self.tables.lock().unwrap();
        if tables
            .attendance
            .iter()
            .any(|r| r.employee_id == new.employee_id && r.is_active())
        {
            return Err(AttendanceError::blocked("already clocked in"));
        }

        let record = AttendanceRecord {
            id: tables.next_id(),
            employee_id: new.employee_id,
            clock_in_time: new.clock_in_time,
            clock_in_location: new.clock_in_location,
            clock_out_time: None,
            clock_out_location: None,
            is_remote: new.is_remote,
            status: AttendanceStatus::Active,
        };
        tables.attendance.push(record.clone());
        Ok(record)
    }

    async fn find_attendance(&self, id: u64) -> AttendanceResult<Option<AttendanceRecord>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.attendance.iter().find(|r| r.id == id).cloned())
    }

    async fn find_active_attendance(
        &self,
        employee_id: u64,
    ) -> AttendanceResult<Option<AttendanceRecord>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .attendance
            .iter()
            .find(|r| r.employee_id == employee_id && r.is_active())
            .cloned())
    }

    async fn complete_attendance(
        &self,
        id: u64,
        clock_out_time: DateTime<Utc>,
        location: Option<Coordinate>,
    ) -> AttendanceResult<Option<AttendanceRecord>> {
        let mut tables = self.tables.lock().unwrap();
        let Some(record) = tables
            .attendance
            .iter_mut()
            .find(|r| r.id == id && r.is_active())
        else {
            return Ok(None);
        };

        record.clock_out_time = Some(clock_out_time);
        record.clock_out_location = location;
        record.status = AttendanceStatus::Completed;
        Ok(Some(record.clone()))
    }

    async fn list_attendance(
        &self,
        employee_id: u64,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> AttendanceResult<Vec<AttendanceRecord>> {
        let tables = self.tables.lock().unwrap();
        let mut records: Vec<_> = tables
            .attendance
            .iter()
            .filter(|r| r.employee_id == employee_id)
            .filter(|r| from.is_none_or(|from| r.clock_in_time >= from))
            .filter(|r| to.is_none_or(|to| r.clock_in_time < to))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.clock_in_time.cmp(&a.clock_in_time));
        Ok(records)
    }
}

#[async_trait]
impl RemoteRequestStore for InMemoryStore {
    async fn insert_remote_request(
        &self,
        new: NewRemoteRequest,
    ) -> AttendanceResult<RemoteClockInRequest> {
        let mut tables = self.tables.lock().unwrap();
        if tables
            .requests
            .iter()
            .any(|r| r.employee_id == new.employee_id && r.is_pending())
        {
            return Err(AttendanceError::blocked("remote request pending"));
        }

        let request = RemoteClockInRequest {
            id: tables.next_id(),
            employee_id: new.employee_id,
            supervisor_id: new.supervisor_id,
            requested_at: new.requested_at,
            location: new.location,
            reason: new.reason,
            status: RemoteRequestStatus::Pending,
            responded_at: None,
        };
        tables.requests.push(request.clone());
        Ok(request)
    }

    async fn find_remote_request(&self, id: u64) -> AttendanceResult<Option<RemoteClockInRequest>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.requests.iter().find(|r| r.id == id).cloned())
    }

    async fn find_pending_request(
        &self,
        employee_id: u64,
    ) -> AttendanceResult<Option<RemoteClockInRequest>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .requests
            .iter()
            .find(|r| r.employee_id == employee_id && r.is_pending())
            .cloned())
    }

    async fn list_pending_for_supervisor(
        &self,
        supervisor_id: u64,
    ) -> AttendanceResult<Vec<RemoteClockInRequest>> {
        let tables = self.tables.lock().unwrap();
        let mut pending: Vec<_> = tables
            .requests
            .iter()
            .filter(|r| r.supervisor_id == supervisor_id && r.is_pending())
            .cloned()
            .collect();
        pending.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));
        Ok(pending)
    }

    async fn resolve_remote_request(
        &self,
        id: u64,
        status: RemoteRequestStatus,
        responded_at: DateTime<Utc>,
    ) -> AttendanceResult<Option<RemoteClockInRequest>> {
        let mut tables = self.tables.lock().unwrap();
        let Some(request) = tables
            .requests
            .iter_mut()
            .find(|r| r.id == id && r.is_pending())
        else {
            return Ok(None);
        };

        request.status = status;
        request.responded_at = Some(responded_at);
        Ok(Some(request.clone()))
    }
}

#[async_trait]
impl ShiftStore for InMemoryStore {
    async fn insert_shift(
        &self,
        new: NewShift,
        now: DateTime<Utc>,
    ) -> AttendanceResult<ShiftDefinition> {
        let mut tables = self.tables.lock().unwrap();
        let shift = ShiftDefinition {
            id: tables.next_id(),
            employee_id: new.employee_id,
            name: new.name,
            start_time: new.start_time,
            end_time: new.end_time,
            days_of_week: new.days_of_week,
            is_active: true,
            updated_at: now,
        };
        tables.shifts.push(shift.clone());
        Ok(shift)
    }

    async fn find_shift(&self, id: u64) -> AttendanceResult<Option<ShiftDefinition>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.shifts.iter().find(|s| s.id == id).cloned())
    }

    async fn list_shifts(&self, employee_id: Option<u64>) -> AttendanceResult<Vec<ShiftDefinition>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .shifts
            .iter()
            .filter(|s| employee_id.is_none_or(|id| s.employee_id == id))
            .cloned()
            .collect())
    }

    async fn list_active_shifts(&self, employee_id: u64) -> AttendanceResult<Vec<ShiftDefinition>> {
        let tables = self.tables.lock().unwrap();
        let mut shifts: Vec<_> = tables
            .shifts
            .iter()
            .filter(|s| s.employee_id == employee_id && s.is_active)
            .cloned()
            .collect();
        shifts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        Ok(shifts)
    }

    async fn update_shift(
        &self,
        id: u64,
        update: ShiftUpdate,
        now: DateTime<Utc>,
    ) -> AttendanceResult<Option<ShiftDefinition>> {
        let mut tables = self.tables.lock().unwrap();
        let Some(shift) = tables.shifts.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };

        if update == ShiftUpdate::default() {
            return Ok(Some(shift.clone()));
        }
        if let Some(name) = update.name {
            shift.name = name;
        }
        if let Some(start) = update.start_time {
            shift.start_time = start;
        }
        if let Some(end) = update.end_time {
            shift.end_time = end;
        }
        if let Some(days) = update.days_of_week {
            shift.days_of_week = days;
        }
        if let Some(active) = update.is_active {
            shift.is_active = active;
        }
        shift.updated_at = now;
        Ok(Some(shift.clone()))
    }

    async fn delete_shift(&self, id: u64) -> AttendanceResult<bool> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.shifts.len();
        tables.shifts.retain(|s| s.id != id);
        Ok(tables.shifts.len() != before)
    }
}

#[async_trait]
impl OfficeLocationStore for InMemoryStore {
    async fn insert_office_location(
        &self,
        new: NewOfficeLocation,
    ) -> AttendanceResult<OfficeLocation> {
        let mut tables = self.tables.lock().unwrap();
        let location = OfficeLocation {
            id: tables.next_id(),
            name: new.name,
            latitude: new.center.latitude,
            longitude: new.center.longitude,
            radius_meters: new.radius_meters,
            company_id: new.company_id,
        };
        tables.offices.push(location.clone());
        Ok(location)
    }

    async fn list_office_locations(&self) -> AttendanceResult<Vec<OfficeLocation>> {
        let tables = self.tables.lock().unwrap();
        let mut offices = tables.offices.clone();
        offices.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(offices)
    }

    async fn fences_for_company(
        &self,
        company_id: Option<u64>,
    ) -> AttendanceResult<Vec<OfficeLocation>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .offices
            .iter()
            .filter(|o| o.company_id.is_none() || (company_id.is_some() && o.company_id == company_id))
            .cloned()
            .collect())
    }

    async fn update_office_location(
        &self,
        id: u64,
        update: OfficeLocationUpdate,
    ) -> AttendanceResult<Option<OfficeLocation>> {
        let mut tables = self.tables.lock().unwrap();
        let Some(location) = tables.offices.iter_mut().find(|o| o.id == id) else {
            return Ok(None);
        };

        if let Some(name) = update.name {
            location.name = name;
        }
        if let Some(center) = update.center {
            location.latitude = center.latitude;
            location.longitude = center.longitude;
        }
        if let Some(radius) = update.radius_meters {
            location.radius_meters = radius;
        }
        Ok(Some(location.clone()))
    }

    async fn delete_office_location(&self, id: u64) -> AttendanceResult<bool> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.offices.len();
        tables.offices.retain(|o| o.id != id);
        Ok(tables.offices.len() != before)
    }
}

#[async_trait]
impl EmployeeDirectory for InMemoryStore {
    async fn employee_profile(&self, employee_id: u64) -> AttendanceResult<Option<EmployeeProfile>> {
        Ok(self.tables.lock().unwrap().employees.get(&employee_id).cloned())
    }
}
