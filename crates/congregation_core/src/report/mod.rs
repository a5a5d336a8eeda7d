//! Attendance reporting: filtering and aggregation.
//!
//! # Responsibility
//! - Turn a snapshot of attendance records plus the member list into the
//!   presentation contract (`AttendanceReport`).
//!
//! # Invariants
//! - Reports are pure functions of (records, members, filter, settings).
//! - Distinct calendar days stand in for "meetings held"; one day with two
//!   different meetings counts once.
//! - Calendar days are computed in the configured fixed UTC offset.

pub mod aggregate;
pub mod collate;
pub mod filter;

pub use aggregate::{
    compute_stats, summarize_members, time_series, MemberSummary, ReportStats, SeriesPoint,
};
pub use filter::{filter_records, AttendanceFilter, Selector};

use crate::model::attendance::{AttendanceId, AttendanceRecord};
use crate::model::member::Member;
use crate::repo::attendance_repo::AttendanceRange;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, Utc};
use serde::Serialize;

/// Default report window length, in days, ending today.
pub const DEFAULT_REPORT_WINDOW_DAYS: i64 = 30;

/// Time zone settings for calendar-day bucketing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportSettings {
    /// Offset east of UTC, in minutes. Out-of-range values fall back to UTC.
    pub utc_offset_minutes: i32,
}

impl ReportSettings {
    pub fn with_offset_minutes(utc_offset_minutes: i32) -> Self {
        Self { utc_offset_minutes }
    }

    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix())
    }

    /// Local calendar day of an epoch-millisecond timestamp.
    pub fn calendar_day(&self, epoch_ms: i64) -> NaiveDate {
        DateTime::from_timestamp_millis(epoch_ms)
            .unwrap_or_default()
            .with_timezone(&self.offset())
            .date_naive()
    }

    /// Inclusive epoch-millisecond range covering whole local days
    /// `from..=to`.
    pub fn day_range(&self, from: NaiveDate, to: NaiveDate) -> AttendanceRange {
        let (from, to) = if from <= to { (from, to) } else { (to, from) };
        let to_ms = match to.succ_opt() {
            Some(next) => self.start_of_day_ms(next) - 1,
            None => i64::MAX,
        };
        AttendanceRange::new(self.start_of_day_ms(from), to_ms)
    }

    /// Default report window: the last `DEFAULT_REPORT_WINDOW_DAYS` days
    /// including `today`.
    pub fn default_window(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        (today - Duration::days(DEFAULT_REPORT_WINDOW_DAYS - 1), today)
    }

    /// Local "today" for the configured offset.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset()).date_naive()
    }

    fn start_of_day_ms(&self, day: NaiveDate) -> i64 {
        day.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
            - i64::from(self.offset().local_minus_utc()) * 1000
    }
}

/// One row of the attendance detail table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub id: AttendanceId,
    pub member_name: String,
    pub meeting_name: String,
    pub class_name: String,
    /// `dd/MM/yyyy` in the report offset.
    pub date: String,
}

/// Presentation contract for the reports screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceReport {
    pub stats: ReportStats,
    pub members: Vec<MemberSummary>,
    pub series: Vec<SeriesPoint>,
    pub records: Vec<ReportRow>,
}

/// Filters `records` and derives every report section from the result.
pub fn build_report(
    records: &[AttendanceRecord],
    members: &[Member],
    filter: &AttendanceFilter,
    settings: &ReportSettings,
) -> AttendanceReport {
    let filtered = filter_records(records, filter);
    AttendanceReport {
        stats: compute_stats(&filtered, members, settings),
        members: summarize_members(&filtered),
        series: time_series(&filtered, settings),
        records: filtered
            .iter()
            .map(|record| ReportRow {
                id: record.id,
                member_name: record.member_name.clone(),
                meeting_name: record.meeting_name.clone(),
                class_name: record.class_name.clone(),
                date: settings
                    .calendar_day(record.registered_at)
                    .format("%d/%m/%Y")
                    .to_string(),
            })
            .collect(),
    }
}
