//! The clock-in policy: one decision combining attendance state, outstanding
//! remote requests, the shift window and the office geofence.
//!
//! Nothing is written until the decision is fully resolved, so a failed
//! location lookup leaves no record and no request behind.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use chrono_tz::Tz;
use serde::Serialize;
use utoipa::ToSchema;

use super::clock::Clock;
use super::geofence::{self, NearestFence};
use super::lifecycle::AttendanceService;
use super::location::{self, DEFAULT_LOCATION_TIMEOUT, LocationProvider};
use super::remote_approval::RemoteApprovalService;
use super::shift_window::{self, ShiftEvaluation};
use crate::error::{AttendanceError, AttendanceResult};
use crate::model::{
    attendance::AttendanceRecord,
    employee::EmployeeProfile,
    remote_request::{Decision, RemoteClockInRequest},
    shift::ShiftDefinition,
};
use crate::store::{OfficeLocationStore, ShiftStore};

pub const MSG_ALREADY_CLOCKED_IN: &str = "already clocked in";
pub const MSG_REQUEST_PENDING: &str = "remote request pending";
pub const MSG_NO_SUPERVISOR: &str = "Cannot send request - supervisor not assigned";
pub const MSG_OUTSIDE_OFFICE: &str = "You're not within range of any office location";

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ClockInOutcome {
    ClockedIn {
        record: AttendanceRecord,
        /// Set when the clock-in is more than two hours after shift start.
        late_warning: Option<String>,
    },
    RemoteRequestRequired {
        reason: String,
        nearest_fence: Option<NearestFence>,
    },
    Blocked {
        message: String,
    },
}

impl ClockInOutcome {
    fn blocked(message: impl Into<String>) -> Self {
        ClockInOutcome::Blocked {
            message: message.into(),
        }
    }
}

/// Result of a supervisor's decision on a remote request.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Disposition {
    pub request: RemoteClockInRequest,
    /// Remote attendance opened by an approval, if one was opened.
    pub attendance: Option<AttendanceRecord>,
}

#[derive(Clone)]
pub struct ClockInOrchestrator {
    attendance: AttendanceService,
    remote: RemoteApprovalService,
    shifts: Arc<dyn ShiftStore>,
    offices: Arc<dyn OfficeLocationStore>,
    clock: Arc<dyn Clock>,
    timezone: Tz,
    location_timeout: Duration,
}

impl ClockInOrchestrator {
    pub fn new(
        attendance: AttendanceService,
        remote: RemoteApprovalService,
        shifts: Arc<dyn ShiftStore>,
        offices: Arc<dyn OfficeLocationStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            attendance,
            remote,
            shifts,
            offices,
            clock,
            timezone: chrono_tz::UTC,
            location_timeout: DEFAULT_LOCATION_TIMEOUT,
        }
    }

    /// Zone whose wall clock shift times are expressed in.
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn with_location_timeout(mut self, limit: Duration) -> Self {
        self.location_timeout = limit;
        self
    }

    pub fn attendance(&self) -> &AttendanceService {
        &self.attendance
    }

    pub fn remote(&self) -> &RemoteApprovalService {
        &self.remote
    }

    fn local_now(&self) -> NaiveDateTime {
        self.clock.now().with_timezone(&self.timezone).naive_local()
    }

    /// The shift governing an employee; the most recently updated active one wins.
    pub async fn current_shift(&self, employee_id: u64) -> AttendanceResult<Option<ShiftDefinition>> {
        let shifts = self.shifts.list_active_shifts(employee_id).await?;
        if shifts.len() > 1 {
            tracing::debug!(
                employee_id,
                active_shifts = shifts.len(),
                "Several active shifts, using the most recently updated"
            );
        }
        Ok(shifts.into_iter().next())
    }

    /// Evaluates the employee's shift window at the current moment.
    pub async fn shift_status(&self, employee_id: u64) -> AttendanceResult<Option<ShiftEvaluation>> {
        Ok(self
            .current_shift(employee_id)
            .await?
            .map(|shift| self.evaluate_shift(&shift)))
    }

    pub fn evaluate_shift(&self, shift: &ShiftDefinition) -> ShiftEvaluation {
        shift_window::evaluate(shift, self.local_now())
    }

    /// Checks shared by clock-in and remote requests. `Err(message)` means refused;
    /// `Ok(Some(_))` carries a late-arrival warning.
    async fn precheck(&self, employee_id: u64) -> AttendanceResult<Result<Option<String>, String>> {
        if self.attendance.get_active(employee_id).await?.is_some() {
            return Ok(Err(MSG_ALREADY_CLOCKED_IN.to_string()));
        }
        if self.remote.get_pending(employee_id).await?.is_some() {
            return Ok(Err(MSG_REQUEST_PENDING.to_string()));
        }

        match self.shift_status(employee_id).await? {
            Some(eval) if !eval.is_valid => Ok(Err(eval.message)),
            Some(eval) if eval.is_late => Ok(Ok(Some(eval.message))),
            _ => Ok(Ok(None)),
        }
    }

    pub async fn attempt_clock_in(
        &self,
        employee: &EmployeeProfile,
        position: &dyn LocationProvider,
    ) -> AttendanceResult<ClockInOutcome> {
        let employee_id = employee.id;

        let late_warning = match self.precheck(employee_id).await? {
            Ok(warning) => warning,
            Err(message) => {
                tracing::info!(employee_id, %message, "Clock-in blocked");
                return Ok(ClockInOutcome::blocked(message));
            }
        };

        if !employee.work_mode.requires_geofence() {
            let coordinate = location::acquire(position, self.location_timeout).await.ok();
            return self
                .open_record(employee_id, coordinate, true, late_warning)
                .await;
        }

        let coordinate = location::acquire(position, self.location_timeout).await?;
        let fences = self.offices.fences_for_company(employee.company_id).await?;

        if geofence::is_within_any_fence(&coordinate, &fences) {
            return self
                .open_record(employee_id, Some(coordinate), false, late_warning)
                .await;
        }

        let nearest = geofence::nearest_fence(&coordinate, &fences);
        tracing::info!(
            employee_id,
            nearest_distance_m = nearest.as_ref().map(|n| n.distance_meters),
            "Outside every office fence, remote approval required"
        );
        Ok(ClockInOutcome::RemoteRequestRequired {
            reason: MSG_OUTSIDE_OFFICE.to_string(),
            nearest_fence: nearest,
        })
    }

    async fn open_record(
        &self,
        employee_id: u64,
        coordinate: Option<super::geo::Coordinate>,
        is_remote: bool,
        late_warning: Option<String>,
    ) -> AttendanceResult<ClockInOutcome> {
        match self.attendance.clock_in(employee_id, coordinate, is_remote).await {
            Ok(record) => Ok(ClockInOutcome::ClockedIn {
                record,
                late_warning,
            }),
            // lost a race against a concurrent clock-in
            Err(AttendanceError::PolicyBlocked(message)) => Ok(ClockInOutcome::blocked(message)),
            Err(e) => Err(e),
        }
    }

    /// Raises a supervisor-approval request for an employee outside every fence.
    pub async fn request_remote_clock_in(
        &self,
        employee: &EmployeeProfile,
        position: &dyn LocationProvider,
        reason: Option<String>,
    ) -> AttendanceResult<RemoteClockInRequest> {
        if let Err(message) = self.precheck(employee.id).await? {
            return Err(AttendanceError::PolicyBlocked(message));
        }
        let supervisor_id = employee
            .supervisor_id
            .ok_or_else(|| AttendanceError::blocked(MSG_NO_SUPERVISOR))?;

        let coordinate = location::acquire(position, self.location_timeout).await?;
        self.remote
            .create_request(employee.id, supervisor_id, coordinate, reason)
            .await
    }

    /// Clocks out the employee's active record. A failed location lookup is
    /// logged and the record is completed without coordinates.
    pub async fn clock_out(
        &self,
        employee_id: u64,
        position: &dyn LocationProvider,
    ) -> AttendanceResult<AttendanceRecord> {
        let active = self
            .attendance
            .get_active(employee_id)
            .await?
            .ok_or_else(|| AttendanceError::not_found("No active clock-in found"))?;

        let coordinate = match location::acquire(position, self.location_timeout).await {
            Ok(coordinate) => Some(coordinate),
            Err(e) => {
                tracing::warn!(employee_id, error = %e, "Clocking out without location");
                None
            }
        };

        self.attendance.clock_out(active.id, coordinate).await
    }

    /// Applies a decision; an approval also opens a remote attendance record
    /// at the requested coordinate unless the employee is already clocked in.
    pub async fn dispose_remote_request(
        &self,
        request_id: u64,
        decision: Decision,
    ) -> AttendanceResult<Disposition> {
        let request = self.remote.respond(request_id, decision).await?;

        if decision == Decision::Rejected {
            return Ok(Disposition {
                request,
                attendance: None,
            });
        }

        let attendance = match self
            .attendance
            .clock_in(request.employee_id, Some(request.location), true)
            .await
        {
            Ok(record) => Some(record),
            Err(AttendanceError::PolicyBlocked(_)) => {
                tracing::info!(
                    employee_id = request.employee_id,
                    request_id,
                    "Approved while already clocked in, no new record"
                );
                None
            }
            Err(e) => return Err(e),
        };

        Ok(Disposition {
            request,
            attendance,
        })
    }
}
