//! Core domain logic for congregation attendance tracking.
//!
//! Members, classes and meetings are kept in an embedded SQLite store that
//! pushes full snapshots to subscribers. Attendance is recorded in atomic
//! batches and summarized into reports by pure aggregation functions.

pub mod db;
pub mod identity;
pub mod logging;
pub mod model;
pub mod report;
pub mod repo;
pub mod service;
pub mod store;
pub mod view;

pub use identity::{IdentityProvider, StaticIdentity};
pub use logging::{init_logging, logging_status, LogLevel, LogTarget, LoggingConfig, LoggingError};
pub use model::attendance::{AttendanceDraft, AttendanceId, AttendanceRecord, UserId};
pub use model::catalog::{Class, ClassId, Meeting, MeetingId};
pub use model::member::{Member, MemberId, MemberInput};
pub use model::validation::ModelValidationError;
pub use report::{
    build_report, AttendanceFilter, AttendanceReport, MemberSummary, ReportRow, ReportSettings,
    ReportStats, Selector, SeriesPoint,
};
pub use repo::attendance_repo::AttendanceRange;
pub use repo::{EntityKind, RepoError, RepoResult};
pub use service::attendance_service::AttendanceSaveError;
pub use store::{LiveStore, Snapshot, SnapshotEvent, SnapshotQuery, StoreError, StoreResult};
pub use view::{
    AttendanceSheet, AttendanceSheetMount, LoadState, ReportsMount, ReportsView, ViewCell,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
