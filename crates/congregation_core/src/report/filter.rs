//! Filter evaluator over attendance records.
//!
//! # Invariants
//! - A record is kept only when it matches every non-wildcard predicate.
//! - Date bounds are inclusive and compared with `registered_at`.
//! - Input order is preserved and the input slice is never mutated.

use crate::model::attendance::AttendanceRecord;
use crate::model::catalog::{ClassId, MeetingId};
use crate::repo::attendance_repo::AttendanceRange;
use serde::{Deserialize, Serialize};

/// Explicit "all" sentinel for id filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum Selector<T> {
    Any,
    Specific(T),
}

impl<T> Default for Selector<T> {
    fn default() -> Self {
        Self::Any
    }
}

impl<T: PartialEq> Selector<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Self::Any => true,
            Self::Specific(expected) => expected == value,
        }
    }
}

impl<T> From<Option<T>> for Selector<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Any, Self::Specific)
    }
}

/// Report filter: meeting, class and inclusive registration window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttendanceFilter {
    pub meeting: Selector<MeetingId>,
    pub class: Selector<ClassId>,
    /// Inclusive lower bound, epoch milliseconds.
    pub date_from: Option<i64>,
    /// Inclusive upper bound, epoch milliseconds.
    pub date_to: Option<i64>,
}

impl AttendanceFilter {
    /// Filter that keeps every record.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn with_range(mut self, range: AttendanceRange) -> Self {
        self.date_from = Some(range.from_ms);
        self.date_to = Some(range.to_ms);
        self
    }

    pub fn matches(&self, record: &AttendanceRecord) -> bool {
        self.meeting.matches(&record.meeting_id)
            && self.class.matches(&record.class_id)
            && self
                .date_from
                .map_or(true, |from| record.registered_at >= from)
            && self.date_to.map_or(true, |to| record.registered_at <= to)
    }
}

/// Returns the records matching `filter`, in input order.
pub fn filter_records(
    records: &[AttendanceRecord],
    filter: &AttendanceFilter,
) -> Vec<AttendanceRecord> {
    records
        .iter()
        .filter(|record| filter.matches(record))
        .cloned()
        .collect()
}
