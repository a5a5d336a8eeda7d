//! Attendance aggregation: scalar stats, per-member summary, time series.
//!
//! # Invariants
//! - Every function is pure over its inputs and never mutates them.
//! - Zero denominators short-circuit to `0.0`; no NaN or infinity escapes.
//! - Averages and rates are rounded to one decimal only on output.
//! - Records whose member no longer exists still count, under the
//!   denormalized name they carry.

use crate::model::attendance::AttendanceRecord;
use crate::model::member::{Member, MemberId};
use crate::report::collate::compare_names;
use crate::report::ReportSettings;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Leap year used to rebuild a comparable date from a `dd/MM` label.
const LABEL_REFERENCE_YEAR: i32 = 2000;

/// Scalar report statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStats {
    pub total_presences: usize,
    /// Distinct calendar days with at least one record.
    pub unique_meetings: usize,
    pub average_attendance: f64,
    /// Percentage in `[0, +inf)`; above 100 only when members attend more
    /// than once per day.
    pub attendance_rate: f64,
}

/// Presence count for one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummary {
    pub member_id: MemberId,
    pub member_name: String,
    pub total_count: usize,
}

/// One bar of the attendance trend chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    /// `dd/MM`, no year.
    pub date_label: String,
    pub count: usize,
}

/// Computes totals, distinct-day count, average per day and attendance rate.
///
/// The active-member denominator comes from `members`, independent of
/// which members appear in `records`.
pub fn compute_stats(
    records: &[AttendanceRecord],
    members: &[Member],
    settings: &ReportSettings,
) -> ReportStats {
    let total_presences = records.len();
    let unique_meetings = records
        .iter()
        .map(|record| settings.calendar_day(record.registered_at))
        .collect::<BTreeSet<NaiveDate>>()
        .len();
    let active_members = members.iter().filter(|member| member.is_active).count();

    let average_attendance = if unique_meetings > 0 {
        total_presences as f64 / unique_meetings as f64
    } else {
        0.0
    };
    let attendance_rate = if unique_meetings > 0 && active_members > 0 {
        total_presences as f64 / (unique_meetings as f64 * active_members as f64) * 100.0
    } else {
        0.0
    };

    ReportStats {
        total_presences,
        unique_meetings,
        average_attendance: round_one_decimal(average_attendance),
        attendance_rate: round_one_decimal(attendance_rate),
    }
}

/// Groups records by member id, sorted by member name ascending.
///
/// The name shown is the one on the first record seen for that member.
pub fn summarize_members(records: &[AttendanceRecord]) -> Vec<MemberSummary> {
    let mut index: HashMap<MemberId, usize> = HashMap::new();
    let mut summaries: Vec<MemberSummary> = Vec::new();

    for record in records {
        match index.get(&record.member_id) {
            Some(&position) => summaries[position].total_count += 1,
            None => {
                index.insert(record.member_id, summaries.len());
                summaries.push(MemberSummary {
                    member_id: record.member_id,
                    member_name: record.member_name.clone(),
                    total_count: 1,
                });
            }
        }
    }

    summaries.sort_by(|left, right| {
        compare_names(&left.member_name, &right.member_name)
            .then_with(|| left.member_id.cmp(&right.member_id))
    });
    summaries
}

/// Counts records per `dd/MM` day label, in chronological order.
///
/// Labels carry no year, so the same day of different years shares one
/// bucket. Ordering rebuilds a date from each label instead of comparing
/// label text.
pub fn time_series(records: &[AttendanceRecord], settings: &ReportSettings) -> Vec<SeriesPoint> {
    let mut buckets: HashMap<String, usize> = HashMap::new();
    for record in records {
        let label = day_month_label(settings.calendar_day(record.registered_at));
        *buckets.entry(label).or_insert(0) += 1;
    }

    let mut series = buckets
        .into_iter()
        .map(|(date_label, count)| SeriesPoint { date_label, count })
        .collect::<Vec<_>>();
    series.sort_by(|left, right| {
        parse_day_month_label(&left.date_label)
            .cmp(&parse_day_month_label(&right.date_label))
            .then_with(|| left.date_label.cmp(&right.date_label))
    });
    series
}

/// Formats a calendar day as a `dd/MM` bucket label.
pub fn day_month_label(day: NaiveDate) -> String {
    day.format("%d/%m").to_string()
}

/// Rebuilds a comparable date from a `dd/MM` label.
pub fn parse_day_month_label(label: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{label}/{LABEL_REFERENCE_YEAR}"), "%d/%m/%Y").ok()
}

/// Rounds half away from zero to one decimal place.
pub fn round_one_decimal(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::{parse_day_month_label, round_one_decimal, time_series};
    use crate::model::attendance::AttendanceRecord;
    use crate::report::ReportSettings;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn record_at(date: (i32, u32, u32)) -> AttendanceRecord {
        let registered_at = NaiveDate::from_ymd_opt(date.0, date.1, date.2)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp_millis();
        AttendanceRecord {
            id: Uuid::new_v4(),
            registered_at,
            member_id: Uuid::new_v4(),
            member_name: "Maria Souza".to_string(),
            class_id: Uuid::new_v4(),
            class_name: "Classe".to_string(),
            meeting_id: Uuid::new_v4(),
            meeting_name: "Culto".to_string(),
            recorded_by: "user-1".to_string(),
        }
    }

    #[test]
    fn rounding_keeps_one_decimal() {
        assert_eq!(round_one_decimal(1.5), 1.5);
        assert_eq!(round_one_decimal(66.666_666), 66.7);
        assert_eq!(round_one_decimal(33.333_333), 33.3);
        assert_eq!(round_one_decimal(f64::NAN), 0.0);
    }

    #[test]
    fn labels_parse_back_including_leap_day() {
        assert_eq!(
            parse_day_month_label("29/02"),
            NaiveDate::from_ymd_opt(2000, 2, 29)
        );
        assert_eq!(parse_day_month_label("31/02"), None);
    }

    #[test]
    fn series_orders_by_month_not_label_text() {
        let records = vec![
            record_at((2024, 12, 19)),
            record_at((2024, 1, 5)),
            record_at((2024, 5, 19)),
            record_at((2024, 1, 20)),
        ];
        let labels = time_series(&records, &ReportSettings::default())
            .into_iter()
            .map(|point| point.date_label)
            .collect::<Vec<_>>();
        assert_eq!(labels, vec!["05/01", "20/01", "19/05", "19/12"]);
    }

    #[test]
    fn same_day_of_different_years_shares_a_bucket() {
        let records = vec![record_at((2023, 5, 19)), record_at((2024, 5, 19))];
        let series = time_series(&records, &ReportSettings::default());
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].count, 2);
    }
}
