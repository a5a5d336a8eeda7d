//! Snapshot shapes delivered to store subscribers.

use crate::model::attendance::AttendanceRecord;
use crate::model::catalog::{Class, Meeting};
use crate::model::member::Member;
use crate::repo::attendance_repo::AttendanceRange;

/// Collections exposed by the live store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    Members,
    Classes,
    Meetings,
    Attendance,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Members => "members",
            Self::Classes => "classes",
            Self::Meetings => "meetings",
            Self::Attendance => "attendance",
        }
    }
}

/// What a subscriber wants to observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotQuery {
    /// Every member, active or not.
    Members,
    Classes,
    Meetings,
    /// Attendance records, optionally restricted to an inclusive
    /// registration window.
    Attendance(Option<AttendanceRange>),
}

impl SnapshotQuery {
    pub fn collection(&self) -> Collection {
        match self {
            Self::Members => Collection::Members,
            Self::Classes => Collection::Classes,
            Self::Meetings => Collection::Meetings,
            Self::Attendance(_) => Collection::Attendance,
        }
    }
}

/// Complete materialized result of one query. Never a diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Snapshot {
    Members(Vec<Member>),
    Classes(Vec<Class>),
    Meetings(Vec<Meeting>),
    Attendance(Vec<AttendanceRecord>),
}

impl Snapshot {
    pub fn collection(&self) -> Collection {
        match self {
            Self::Members(_) => Collection::Members,
            Self::Classes(_) => Collection::Classes,
            Self::Meetings(_) => Collection::Meetings,
            Self::Attendance(_) => Collection::Attendance,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Members(items) => items.len(),
            Self::Classes(items) => items.len(),
            Self::Meetings(items) => items.len(),
            Self::Attendance(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One delivery to a subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotEvent {
    /// Replace the working set with this snapshot.
    Snapshot(Snapshot),
    /// The query could not be served; keep whatever was shown before.
    Failed {
        collection: Collection,
        message: String,
    },
}

impl SnapshotEvent {
    pub fn collection(&self) -> Collection {
        match self {
            Self::Snapshot(snapshot) => snapshot.collection(),
            Self::Failed { collection, .. } => *collection,
        }
    }
}

/// Handle returned by `LiveStore::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub(crate) u64);
