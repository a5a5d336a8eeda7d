//! Attendance record model.
//!
//! # Responsibility
//! - Define the immutable presence event written by attendance sheets.
//! - Define the draft shape handed to the store before id/timestamp
//!   assignment.
//!
//! # Invariants
//! - Records are create-only; there is no update path.
//! - `member_name`, `class_name` and `meeting_name` are snapshots taken at
//!   write time and may drift from the live entity names.
//! - `registered_at` is Unix epoch milliseconds assigned by the store.

use crate::model::catalog::{ClassId, MeetingId};
use crate::model::member::MemberId;
use crate::model::validation::ModelValidationError;
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable attendance record identifier.
pub type AttendanceId = Uuid;

/// Opaque identity of the authenticated user who recorded attendance.
pub type UserId = String;

/// One (member, class, meeting, timestamp) presence event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: AttendanceId,
    pub registered_at: i64,
    pub member_id: MemberId,
    pub member_name: String,
    pub class_id: ClassId,
    pub class_name: String,
    pub meeting_id: MeetingId,
    pub meeting_name: String,
    pub recorded_by: UserId,
}

/// Attendance record content before the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceDraft {
    pub member_id: MemberId,
    pub member_name: String,
    pub class_id: ClassId,
    pub class_name: String,
    pub meeting_id: MeetingId,
    pub meeting_name: String,
    pub recorded_by: UserId,
}

impl AttendanceDraft {
    /// Materializes the draft with store-assigned identity and timestamp.
    pub fn into_record(self, id: AttendanceId, registered_at: i64) -> AttendanceRecord {
        AttendanceRecord {
            id,
            registered_at,
            member_id: self.member_id,
            member_name: self.member_name,
            class_id: self.class_id,
            class_name: self.class_name,
            meeting_id: self.meeting_id,
            meeting_name: self.meeting_name,
            recorded_by: self.recorded_by,
        }
    }
}

impl AttendanceRecord {
    /// Checks write-time invariants.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if DateTime::from_timestamp_millis(self.registered_at).is_none() {
            return Err(ModelValidationError::InvalidTimestamp(self.registered_at));
        }
        for (field, value) in [
            ("member_name", &self.member_name),
            ("class_name", &self.class_name),
            ("meeting_name", &self.meeting_name),
        ] {
            if value.trim().is_empty() {
                return Err(ModelValidationError::MissingSnapshotName(field));
            }
        }
        if self.recorded_by.trim().is_empty() {
            return Err(ModelValidationError::MissingRecorder);
        }
        Ok(())
    }
}
