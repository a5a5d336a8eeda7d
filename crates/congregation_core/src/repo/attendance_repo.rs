//! Attendance record repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist attendance batches atomically.
//! - Serve full and registration-range reads for reports.
//!
//! # Invariants
//! - There is no update path; the schema also aborts `UPDATE` statements.
//! - `insert_records` is all-or-nothing.
//! - Range reads are inclusive on both ends.
//! - List ordering is deterministic: `registered_at ASC, id ASC`.

use crate::model::attendance::{AttendanceId, AttendanceRecord};
use crate::repo::common::{ensure_connection_ready, parse_uuid};
use crate::repo::RepoResult;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

const ATTENDANCE_SELECT_SQL: &str = "SELECT
    id,
    registered_at,
    member_id,
    member_name,
    class_id,
    class_name,
    meeting_id,
    meeting_name,
    recorded_by
FROM attendance_records";

/// Inclusive registration timestamp window, in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendanceRange {
    pub from_ms: i64,
    pub to_ms: i64,
}

impl AttendanceRange {
    pub fn new(from_ms: i64, to_ms: i64) -> Self {
        Self { from_ms, to_ms }
    }

    pub fn contains(&self, epoch_ms: i64) -> bool {
        self.from_ms <= epoch_ms && epoch_ms <= self.to_ms
    }
}

/// Repository interface for attendance records.
pub trait AttendanceRepository {
    /// Inserts all records in one transaction, or none of them.
    fn insert_records(&self, records: &[AttendanceRecord]) -> RepoResult<()>;
    fn get_record(&self, id: AttendanceId) -> RepoResult<Option<AttendanceRecord>>;
    /// Lists records, optionally restricted to an inclusive range.
    fn list_records(&self, range: Option<&AttendanceRange>) -> RepoResult<Vec<AttendanceRecord>>;
}

/// SQLite-backed attendance repository.
pub struct SqliteAttendanceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAttendanceRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "attendance_records")?;
        Ok(Self { conn })
    }
}

impl AttendanceRepository for SqliteAttendanceRepository<'_> {
    fn insert_records(&self, records: &[AttendanceRecord]) -> RepoResult<()> {
        for record in records {
            record.validate()?;
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO attendance_records (
                    id,
                    registered_at,
                    member_id,
                    member_name,
                    class_id,
                    class_name,
                    meeting_id,
                    meeting_name,
                    recorded_by
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            )?;
            for record in records {
                stmt.execute(params![
                    record.id.to_string(),
                    record.registered_at,
                    record.member_id.to_string(),
                    record.member_name.as_str(),
                    record.class_id.to_string(),
                    record.class_name.as_str(),
                    record.meeting_id.to_string(),
                    record.meeting_name.as_str(),
                    record.recorded_by.as_str(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn get_record(&self, id: AttendanceId) -> RepoResult<Option<AttendanceRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ATTENDANCE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_attendance_row(row)?));
        }
        Ok(None)
    }

    fn list_records(&self, range: Option<&AttendanceRange>) -> RepoResult<Vec<AttendanceRecord>> {
        let (from_ms, to_ms) = match range {
            Some(range) => (range.from_ms, range.to_ms),
            None => (i64::MIN, i64::MAX),
        };
        let mut stmt = self.conn.prepare(&format!(
            "{ATTENDANCE_SELECT_SQL}
             WHERE registered_at >= ?1 AND registered_at <= ?2
             ORDER BY registered_at ASC, id ASC;"
        ))?;
        let mut rows = stmt.query(params![from_ms, to_ms])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_attendance_row(row)?);
        }
        Ok(records)
    }
}

fn parse_attendance_row(row: &Row<'_>) -> RepoResult<AttendanceRecord> {
    let id_text: String = row.get("id")?;
    let member_text: String = row.get("member_id")?;
    let class_text: String = row.get("class_id")?;
    let meeting_text: String = row.get("meeting_id")?;

    let record = AttendanceRecord {
        id: parse_uuid(&id_text, "attendance_records.id")?,
        registered_at: row.get("registered_at")?,
        member_id: parse_uuid(&member_text, "attendance_records.member_id")?,
        member_name: row.get("member_name")?,
        class_id: parse_uuid(&class_text, "attendance_records.class_id")?,
        class_name: row.get("class_name")?,
        meeting_id: parse_uuid(&meeting_text, "attendance_records.meeting_id")?,
        meeting_name: row.get("meeting_name")?,
        recorded_by: row.get("recorded_by")?,
    };
    record.validate()?;
    Ok(record)
}
