use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};
use sqlx::{FromRow, MySqlPool, types::Json};

use super::{
    AttendanceStore, EmployeeDirectory, OfficeLocationStore, OfficeLocationUpdate,
    RemoteRequestStore, ShiftStore, ShiftUpdate,
};
use crate::attendance::geo::Coordinate;
use crate::error::{AttendanceError, AttendanceResult};
use crate::model::{
    attendance::{AttendanceRecord, AttendanceStatus, NewAttendance},
    employee::{EmployeeProfile, WorkMode},
    office_location::{NewOfficeLocation, OfficeLocation},
    remote_request::{NewRemoteRequest, RemoteClockInRequest, RemoteRequestStatus},
    shift::{NewShift, ShiftDefinition},
};
use crate::utils::db_utils::{SqlValue, build_update_sql, execute_update};

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

fn parse_column<T: FromStr>(column: &str, value: &str) -> AttendanceResult<T> {
    value.parse().map_err(|_| {
        AttendanceError::Persistence(sqlx::Error::Decode(
            format!("unexpected {column} value '{value}'").into(),
        ))
    })
}

// -------------------------
// attendance_records
// -------------------------

const ATTENDANCE_COLUMNS: &str = r#"
    id, employee_id, clock_in_time, clock_in_latitude, clock_in_longitude,
    clock_out_time, clock_out_latitude, clock_out_longitude, is_remote, status
"#;

#[derive(FromRow)]
struct AttendanceRow {
    id: u64,
    employee_id: u64,
    clock_in_time: DateTime<Utc>,
    clock_in_latitude: Option<f64>,
    clock_in_longitude: Option<f64>,
    clock_out_time: Option<DateTime<Utc>>,
    clock_out_latitude: Option<f64>,
    clock_out_longitude: Option<f64>,
    is_remote: bool,
    status: String,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = AttendanceError;

    fn try_from(row: AttendanceRow) -> AttendanceResult<Self> {
        Ok(AttendanceRecord {
            id: row.id,
            employee_id: row.employee_id,
            clock_in_time: row.clock_in_time,
            clock_in_location: Coordinate::from_parts(row.clock_in_latitude, row.clock_in_longitude),
            clock_out_time: row.clock_out_time,
            clock_out_location: Coordinate::from_parts(
                row.clock_out_latitude,
                row.clock_out_longitude,
            ),
            is_remote: row.is_remote,
            status: parse_column::<AttendanceStatus>("attendance status", &row.status)?,
        })
    }
}

impl MySqlStore {
    async fn fetch_attendance(
        &self,
        filter: &str,
        id: u64,
    ) -> AttendanceResult<Option<AttendanceRecord>> {
        let sql = format!("SELECT {ATTENDANCE_COLUMNS} FROM attendance_records WHERE {filter}");
        sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(AttendanceRecord::try_from)
            .transpose()
    }
}

#[async_trait]
impl AttendanceStore for MySqlStore {
    async fn insert_attendance(&self, new: NewAttendance) -> AttendanceResult<AttendanceRecord> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance_records
                (employee_id, clock_in_time, clock_in_latitude, clock_in_longitude, is_remote, status)
            VALUES (?, ?, ?, ?, ?, 'active')
            "#,
        )
        .bind(new.employee_id)
        .bind(new.clock_in_time)
        .bind(new.clock_in_location.map(|c| c.latitude))
        .bind(new.clock_in_location.map(|c| c.longitude))
        .bind(new.is_remote)
        .execute(&self.pool)
        .await;

        let id = match result {
            Ok(done) => done.last_insert_id(),
            Err(e) if is_unique_violation(&e) => {
                return Err(AttendanceError::blocked("already clocked in"));
            }
            Err(e) => return Err(e.into()),
        };

        self.find_attendance(id)
            .await?
            .ok_or_else(|| AttendanceError::not_found("attendance record vanished after insert"))
    }

    async fn find_attendance(&self, id: u64) -> AttendanceResult<Option<AttendanceRecord>> {
        self.fetch_attendance("id = ?", id).await
    }

    async fn find_active_attendance(
        &self,
        employee_id: u64,
    ) -> AttendanceResult<Option<AttendanceRecord>> {
        self.fetch_attendance("employee_id = ? AND status = 'active' LIMIT 1", employee_id)
            .await
    }

    async fn complete_attendance(
        &self,
        id: u64,
        clock_out_time: DateTime<Utc>,
        location: Option<Coordinate>,
    ) -> AttendanceResult<Option<AttendanceRecord>> {
        let result = sqlx::query(
            r#"
            UPDATE attendance_records
            SET clock_out_time = ?,
                clock_out_latitude = ?,
                clock_out_longitude = ?,
                status = 'completed'
            WHERE id = ?
            AND status = 'active'
            "#,
        )
        .bind(clock_out_time)
        .bind(location.map(|c| c.latitude))
        .bind(location.map(|c| c.longitude))
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_attendance(id).await
    }

    async fn list_attendance(
        &self,
        employee_id: u64,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> AttendanceResult<Vec<AttendanceRecord>> {
        let mut sql = format!("SELECT {ATTENDANCE_COLUMNS} FROM attendance_records WHERE employee_id = ?");
        if from.is_some() {
            sql.push_str(" AND clock_in_time >= ?");
        }
        if to.is_some() {
            sql.push_str(" AND clock_in_time < ?");
        }
        sql.push_str(" ORDER BY clock_in_time DESC");

        let mut query = sqlx::query_as::<_, AttendanceRow>(&sql).bind(employee_id);
        if let Some(from) = from {
            query = query.bind(from);
        }
        if let Some(to) = to {
            query = query.bind(to);
        }

        query
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(AttendanceRecord::try_from)
            .collect()
    }
}

// -------------------------
// remote_clockin_requests
// -------------------------

const REMOTE_COLUMNS: &str = r#"
    id, employee_id, supervisor_id, requested_at, latitude, longitude,
    reason, status, responded_at
"#;

#[derive(FromRow)]
struct RemoteRequestRow {
    id: u64,
    employee_id: u64,
    supervisor_id: u64,
    requested_at: DateTime<Utc>,
    latitude: f64,
    longitude: f64,
    reason: Option<String>,
    status: String,
    responded_at: Option<DateTime<Utc>>,
}

impl TryFrom<RemoteRequestRow> for RemoteClockInRequest {
    type Error = AttendanceError;

    fn try_from(row: RemoteRequestRow) -> AttendanceResult<Self> {
        Ok(RemoteClockInRequest {
            id: row.id,
            employee_id: row.employee_id,
            supervisor_id: row.supervisor_id,
            requested_at: row.requested_at,
            location: Coordinate {
                latitude: row.latitude,
                longitude: row.longitude,
            },
            reason: row.reason,
            status: parse_column::<RemoteRequestStatus>("request status", &row.status)?,
            responded_at: row.responded_at,
        })
    }
}

#[async_trait]
impl RemoteRequestStore for MySqlStore {
    async fn insert_remote_request(
        &self,
        new: NewRemoteRequest,
    ) -> AttendanceResult<RemoteClockInRequest> {
        let result = sqlx::query(
            r#"
            INSERT INTO remote_clockin_requests
                (employee_id, supervisor_id, requested_at, latitude, longitude, reason, status)
            VALUES (?, ?, ?, ?, ?, ?, 'pending')
            "#,
        )
        .bind(new.employee_id)
        .bind(new.supervisor_id)
        .bind(new.requested_at)
        .bind(new.location.latitude)
        .bind(new.location.longitude)
        .bind(&new.reason)
        .execute(&self.pool)
        .await;

        let id = match result {
            Ok(done) => done.last_insert_id(),
            Err(e) if is_unique_violation(&e) => {
                return Err(AttendanceError::blocked("remote request pending"));
            }
            Err(e) => return Err(e.into()),
        };

        self.find_remote_request(id)
            .await?
            .ok_or_else(|| AttendanceError::not_found("remote request vanished after insert"))
    }

    async fn find_remote_request(&self, id: u64) -> AttendanceResult<Option<RemoteClockInRequest>> {
        let sql = format!("SELECT {REMOTE_COLUMNS} FROM remote_clockin_requests WHERE id = ?");
        sqlx::query_as::<_, RemoteRequestRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(RemoteClockInRequest::try_from)
            .transpose()
    }

    async fn find_pending_request(
        &self,
        employee_id: u64,
    ) -> AttendanceResult<Option<RemoteClockInRequest>> {
        let sql = format!(
            "SELECT {REMOTE_COLUMNS} FROM remote_clockin_requests \
             WHERE employee_id = ? AND status = 'pending' LIMIT 1"
        );
        sqlx::query_as::<_, RemoteRequestRow>(&sql)
            .bind(employee_id)
            .fetch_optional(&self.pool)
            .await?
            .map(RemoteClockInRequest::try_from)
            .transpose()
    }

    async fn list_pending_for_supervisor(
        &self,
        supervisor_id: u64,
    ) -> AttendanceResult<Vec<RemoteClockInRequest>> {
        let sql = format!(
            "SELECT {REMOTE_COLUMNS} FROM remote_clockin_requests \
             WHERE supervisor_id = ? AND status = 'pending' \
             ORDER BY requested_at DESC"
        );
        sqlx::query_as::<_, RemoteRequestRow>(&sql)
            .bind(supervisor_id)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(RemoteClockInRequest::try_from)
            .collect()
    }

    async fn resolve_remote_request(
        &self,
        id: u64,
        status: RemoteRequestStatus,
        responded_at: DateTime<Utc>,
    ) -> AttendanceResult<Option<RemoteClockInRequest>> {
        let result = sqlx::query(
            r#"
            UPDATE remote_clockin_requests
            SET status = ?, responded_at = ?
            WHERE id = ?
            AND status = 'pending'
            "#,
        )
        .bind(status.as_ref())
        .bind(responded_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_remote_request(id).await
    }
}

// -------------------------
// employee_shifts
// -------------------------

const SHIFT_COLUMNS: &str = r#"
    id, employee_id, shift_name, shift_start, shift_end, days_of_week, is_active, updated_at
"#;

#[derive(FromRow)]
struct ShiftRow {
    id: u64,
    employee_id: u64,
    shift_name: String,
    shift_start: NaiveTime,
    shift_end: NaiveTime,
    days_of_week: Json<Vec<u8>>,
    is_active: bool,
    updated_at: DateTime<Utc>,
}

impl From<ShiftRow> for ShiftDefinition {
    fn from(row: ShiftRow) -> Self {
        ShiftDefinition {
            id: row.id,
            employee_id: row.employee_id,
            name: row.shift_name,
            start_time: row.shift_start,
            end_time: row.shift_end,
            days_of_week: row.days_of_week.0,
            is_active: row.is_active,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl ShiftStore for MySqlStore {
    async fn insert_shift(
        &self,
        new: NewShift,
        now: DateTime<Utc>,
    ) -> AttendanceResult<ShiftDefinition> {
        let done = sqlx::query(
            r#"
            INSERT INTO employee_shifts
                (employee_id, shift_name, shift_start, shift_end, days_of_week, is_active, updated_at)
            VALUES (?, ?, ?, ?, ?, TRUE, ?)
            "#,
        )
        .bind(new.employee_id)
        .bind(&new.name)
        .bind(new.start_time)
        .bind(new.end_time)
        .bind(Json(&new.days_of_week))
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.find_shift(done.last_insert_id())
            .await?
            .ok_or_else(|| AttendanceError::not_found("shift vanished after insert"))
    }

    async fn find_shift(&self, id: u64) -> AttendanceResult<Option<ShiftDefinition>> {
        let sql = format!("SELECT {SHIFT_COLUMNS} FROM employee_shifts WHERE id = ?");
        let row = sqlx::query_as::<_, ShiftRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(ShiftDefinition::from))
    }

    async fn list_shifts(&self, employee_id: Option<u64>) -> AttendanceResult<Vec<ShiftDefinition>> {
        let rows = match employee_id {
            Some(employee_id) => {
                let sql = format!(
                    "SELECT {SHIFT_COLUMNS} FROM employee_shifts WHERE employee_id = ? ORDER BY id"
                );
                sqlx::query_as::<_, ShiftRow>(&sql)
                    .bind(employee_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    "SELECT {SHIFT_COLUMNS} FROM employee_shifts ORDER BY employee_id, id"
                );
                sqlx::query_as::<_, ShiftRow>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows.into_iter().map(ShiftDefinition::from).collect())
    }

    async fn list_active_shifts(&self, employee_id: u64) -> AttendanceResult<Vec<ShiftDefinition>> {
        let sql = format!(
            "SELECT {SHIFT_COLUMNS} FROM employee_shifts \
             WHERE employee_id = ? AND is_active = TRUE \
             ORDER BY updated_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, ShiftRow>(&sql)
            .bind(employee_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(ShiftDefinition::from).collect())
    }

    async fn update_shift(
        &self,
        id: u64,
        update: ShiftUpdate,
        now: DateTime<Utc>,
    ) -> AttendanceResult<Option<ShiftDefinition>> {
        let mut assignments = Vec::new();
        if let Some(name) = update.name {
            assignments.push(("shift_name", SqlValue::String(name)));
        }
        if let Some(start) = update.start_time {
            assignments.push(("shift_start", SqlValue::Time(start)));
        }
        if let Some(end) = update.end_time {
            assignments.push(("shift_end", SqlValue::Time(end)));
        }
        if let Some(days) = update.days_of_week {
            assignments.push(("days_of_week", SqlValue::Json(serde_json::json!(days))));
        }
        if let Some(active) = update.is_active {
            assignments.push(("is_active", SqlValue::Bool(active)));
        }
        if assignments.is_empty() {
            return self.find_shift(id).await;
        }
        assignments.push(("updated_at", SqlValue::DateTime(now)));

        let sql_update = build_update_sql("employee_shifts", assignments, "id", id)?;
        execute_update(&self.pool, sql_update).await?;
        self.find_shift(id).await
    }

    async fn delete_shift(&self, id: u64) -> AttendanceResult<bool> {
        let result = sqlx::query("DELETE FROM employee_shifts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// -------------------------
// office_locations
// -------------------------

const OFFICE_COLUMNS: &str = "id, name, latitude, longitude, radius_meters, company_id";

#[derive(FromRow)]
struct OfficeLocationRow {
    id: u64,
    name: String,
    latitude: f64,
    longitude: f64,
    radius_meters: f64,
    company_id: Option<u64>,
}

impl From<OfficeLocationRow> for OfficeLocation {
    fn from(row: OfficeLocationRow) -> Self {
        OfficeLocation {
            id: row.id,
            name: row.name,
            latitude: row.latitude,
            longitude: row.longitude,
            radius_meters: row.radius_meters,
            company_id: row.company_id,
        }
    }
}

impl MySqlStore {
    async fn find_office_location(&self, id: u64) -> AttendanceResult<Option<OfficeLocation>> {
        let sql = format!("SELECT {OFFICE_COLUMNS} FROM office_locations WHERE id = ?");
        let row = sqlx::query_as::<_, OfficeLocationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(OfficeLocation::from))
    }
}

#[async_trait]
impl OfficeLocationStore for MySqlStore {
    async fn insert_office_location(
        &self,
        new: NewOfficeLocation,
    ) -> AttendanceResult<OfficeLocation> {
        let done = sqlx::query(
            r#"
            INSERT INTO office_locations (name, latitude, longitude, radius_meters, company_id)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.name)
        .bind(new.center.latitude)
        .bind(new.center.longitude)
        .bind(new.radius_meters)
        .bind(new.company_id)
        .execute(&self.pool)
        .await?;

        self.find_office_location(done.last_insert_id())
            .await?
            .ok_or_else(|| AttendanceError::not_found("office location vanished after insert"))
    }

    async fn list_office_locations(&self) -> AttendanceResult<Vec<OfficeLocation>> {
        let sql = format!("SELECT {OFFICE_COLUMNS} FROM office_locations ORDER BY name");
        let rows = sqlx::query_as::<_, OfficeLocationRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(OfficeLocation::from).collect())
    }

    async fn fences_for_company(
        &self,
        company_id: Option<u64>,
    ) -> AttendanceResult<Vec<OfficeLocation>> {
        let sql = format!(
            "SELECT {OFFICE_COLUMNS} FROM office_locations \
             WHERE company_id IS NULL OR company_id = ? ORDER BY id"
        );
        // a NULL bind never equals anything, leaving only the global fences
        let rows = sqlx::query_as::<_, OfficeLocationRow>(&sql)
            .bind(company_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(OfficeLocation::from).collect())
    }

    async fn update_office_location(
        &self,
        id: u64,
        update: OfficeLocationUpdate,
    ) -> AttendanceResult<Option<OfficeLocation>> {
        let mut assignments = Vec::new();
        if let Some(name) = update.name {
            assignments.push(("name", SqlValue::String(name)));
        }
        if let Some(center) = update.center {
            assignments.push(("latitude", SqlValue::F64(center.latitude)));
            assignments.push(("longitude", SqlValue::F64(center.longitude)));
        }
        if let Some(radius) = update.radius_meters {
            assignments.push(("radius_meters", SqlValue::F64(radius)));
        }
        if assignments.is_empty() {
            return self.find_office_location(id).await;
        }

        let sql_update = build_update_sql("office_locations", assignments, "id", id)?;
        // MySQL reports 0 affected rows when values are unchanged, so re-read instead
        execute_update(&self.pool, sql_update).await?;
        self.find_office_location(id).await
    }

    async fn delete_office_location(&self, id: u64) -> AttendanceResult<bool> {
        let result = sqlx::query("DELETE FROM office_locations WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// -------------------------
// employees
// -------------------------

#[derive(FromRow)]
struct EmployeeRow {
    id: u64,
    company_id: Option<u64>,
    supervisor_id: Option<u64>,
    work_mode: String,
}

#[async_trait]
impl EmployeeDirectory for MySqlStore {
    async fn employee_profile(&self, employee_id: u64) -> AttendanceResult<Option<EmployeeProfile>> {
        let row = sqlx::query_as::<_, EmployeeRow>(
            "SELECT id, company_id, supervisor_id, work_mode FROM employees WHERE id = ?",
        )
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            Ok(EmployeeProfile {
                id: row.id,
                company_id: row.company_id,
                supervisor_id: row.supervisor_id,
                work_mode: parse_column::<WorkMode>("work mode", &row.work_mode)?,
            })
        })
        .transpose()
    }
}
