use chrono::NaiveDate;
use congregation_core::report::{compute_stats, summarize_members, time_series};
use congregation_core::{
    build_report, AttendanceFilter, AttendanceRecord, Member, MemberId, MemberInput,
    ReportSettings, ReportStats, Selector,
};
use uuid::Uuid;

struct Fixture {
    members: Vec<Member>,
    meeting: Uuid,
    class: Uuid,
}

impl Fixture {
    fn new(names: &[&str]) -> Self {
        let birth = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
        Self {
            members: names
                .iter()
                .map(|name| Member::from_input(Uuid::new_v4(), MemberInput::new(*name, birth, birth)))
                .collect(),
            meeting: Uuid::new_v4(),
            class: Uuid::new_v4(),
        }
    }

    fn member(&self, index: usize) -> &Member {
        &self.members[index]
    }

    fn record(&self, member: &Member, day: (i32, u32, u32)) -> AttendanceRecord {
        record_for(member.id, &member.full_name, self.meeting, self.class, day)
    }
}

fn epoch_ms(day: (i32, u32, u32), hour: u32) -> i64 {
    NaiveDate::from_ymd_opt(day.0, day.1, day.2)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
        .and_utc()
        .timestamp_millis()
}

fn record_for(
    member_id: MemberId,
    member_name: &str,
    meeting_id: Uuid,
    class_id: Uuid,
    day: (i32, u32, u32),
) -> AttendanceRecord {
    AttendanceRecord {
        id: Uuid::new_v4(),
        registered_at: epoch_ms(day, 10),
        member_id,
        member_name: member_name.to_string(),
        class_id,
        class_name: "Jovens".to_string(),
        meeting_id,
        meeting_name: "Culto de Domingo".to_string(),
        recorded_by: "user-1".to_string(),
    }
}

#[test]
fn three_presences_over_two_days_with_three_active_members() {
    let fixture = Fixture::new(&["Ana Costa", "Bruno Dias", "Carla Mendes"]);
    let (a, b) = (fixture.member(0), fixture.member(1));
    let records = vec![
        fixture.record(a, (2024, 5, 19)),
        fixture.record(b, (2024, 5, 19)),
        fixture.record(a, (2024, 5, 22)),
    ];

    let report = build_report(
        &records,
        &fixture.members,
        &AttendanceFilter::any(),
        &ReportSettings::default(),
    );

    assert_eq!(
        report.stats,
        ReportStats {
            total_presences: 3,
            unique_meetings: 2,
            average_attendance: 1.5,
            attendance_rate: 50.0,
        }
    );
    let summary = report
        .members
        .iter()
        .map(|entry| (entry.member_name.as_str(), entry.total_count))
        .collect::<Vec<_>>();
    assert_eq!(summary, vec![("Ana Costa", 2), ("Bruno Dias", 1)]);
    let series = report
        .series
        .iter()
        .map(|point| (point.date_label.as_str(), point.count))
        .collect::<Vec<_>>();
    assert_eq!(series, vec![("19/05", 2), ("22/05", 1)]);
    assert_eq!(report.records.len(), 3);
    assert_eq!(report.records[0].date, "19/05/2024");
}

#[test]
fn empty_records_give_zero_stats_and_empty_lists() {
    let fixture = Fixture::new(&["Ana Costa", "Bruno Dias"]);
    let report = build_report(
        &[],
        &fixture.members,
        &AttendanceFilter::any(),
        &ReportSettings::default(),
    );

    assert_eq!(report.stats, ReportStats::default());
    assert!(report.members.is_empty());
    assert!(report.series.is_empty());
    assert!(report.records.is_empty());
}

#[test]
fn no_active_members_gives_zero_rate_but_keeps_average() {
    let mut fixture = Fixture::new(&["Ana Costa"]);
    fixture.members[0].is_active = false;
    let records = vec![fixture.record(fixture.member(0), (2024, 5, 19))];

    let stats = compute_stats(&records, &fixture.members, &ReportSettings::default());
    assert_eq!(stats.average_attendance, 1.0);
    assert_eq!(stats.attendance_rate, 0.0);
    assert!(stats.attendance_rate.is_finite());
}

#[test]
fn inactive_members_are_excluded_from_rate_denominator() {
    let mut fixture = Fixture::new(&["Ana Costa", "Bruno Dias", "Carla Mendes"]);
    fixture.members[2].is_active = false;
    let records = vec![
        fixture.record(fixture.member(0), (2024, 5, 19)),
        fixture.record(fixture.member(2), (2024, 5, 19)),
    ];

    let stats = compute_stats(&records, &fixture.members, &ReportSettings::default());
    assert_eq!(stats.attendance_rate, 100.0);
}

#[test]
fn records_of_deleted_members_still_count_under_embedded_name() {
    let fixture = Fixture::new(&["Bruno Dias"]);
    let ghost = Uuid::new_v4();
    let records = vec![
        record_for(ghost, "Ana Antiga", fixture.meeting, fixture.class, (2024, 5, 19)),
        fixture.record(fixture.member(0), (2024, 5, 19)),
    ];

    let summary = summarize_members(&records);
    assert_eq!(summary.len(), 2);
    assert_eq!(summary[0].member_id, ghost);
    assert_eq!(summary[0].member_name, "Ana Antiga");
}

#[test]
fn summary_uses_first_seen_name_for_renamed_members() {
    let member_id = Uuid::new_v4();
    let (meeting, class) = (Uuid::new_v4(), Uuid::new_v4());
    let records = vec![
        record_for(member_id, "Maria Souza", meeting, class, (2024, 5, 19)),
        record_for(member_id, "Maria Souza Lima", meeting, class, (2024, 5, 26)),
    ];

    let summary = summarize_members(&records);
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].member_name, "Maria Souza");
    assert_eq!(summary[0].total_count, 2);
}

#[test]
fn summary_sorts_accented_names_with_their_base_letter() {
    let fixture = Fixture::new(&["Zeca Dias", "Ștefan Pop", "Sara Lima", "Æsa Nunes"]);
    let records = fixture
        .members
        .iter()
        .map(|member| fixture.record(member, (2024, 5, 19)))
        .collect::<Vec<_>>();

    let names = summarize_members(&records)
        .into_iter()
        .map(|summary| summary.member_name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Æsa Nunes", "Sara Lima", "Ștefan Pop", "Zeca Dias"]);
}

#[test]
fn filter_narrows_by_meeting_class_and_inclusive_dates() {
    let fixture = Fixture::new(&["Ana Costa"]);
    let member = fixture.member(0);
    let other_meeting = Uuid::new_v4();
    let other_class = Uuid::new_v4();
    let records = vec![
        fixture.record(member, (2024, 5, 19)),
        record_for(member.id, &member.full_name, other_meeting, fixture.class, (2024, 5, 19)),
        record_for(member.id, &member.full_name, fixture.meeting, other_class, (2024, 5, 20)),
        fixture.record(member, (2024, 5, 31)),
    ];
    let settings = ReportSettings::default();
    let may_19 = NaiveDate::from_ymd_opt(2024, 5, 19).unwrap();
    let may_20 = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();

    let by_meeting = AttendanceFilter {
        meeting: Selector::Specific(fixture.meeting),
        ..AttendanceFilter::any()
    };
    assert_eq!(build_report(&records, &fixture.members, &by_meeting, &settings).stats.total_presences, 3);

    let by_class_and_range = AttendanceFilter {
        class: Selector::Specific(fixture.class),
        ..AttendanceFilter::any()
    }
    .with_range(settings.day_range(may_19, may_20));
    let report = build_report(&records, &fixture.members, &by_class_and_range, &settings);
    assert_eq!(report.stats.total_presences, 2);
    assert_eq!(report.stats.unique_meetings, 1);
}

#[test]
fn series_buckets_follow_report_offset() {
    let member_id = Uuid::new_v4();
    let (meeting, class) = (Uuid::new_v4(), Uuid::new_v4());
    let mut late = record_for(member_id, "Ana Costa", meeting, class, (2024, 5, 20));
    late.registered_at = epoch_ms((2024, 5, 20), 1);

    let utc = time_series(std::slice::from_ref(&late), &ReportSettings::default());
    let brasilia = time_series(
        std::slice::from_ref(&late),
        &ReportSettings::with_offset_minutes(-180),
    );
    assert_eq!(utc[0].date_label, "20/05");
    assert_eq!(brasilia[0].date_label, "19/05");
}

#[test]
fn report_serializes_with_camel_case_contract() {
    let fixture = Fixture::new(&["Ana Costa"]);
    let records = vec![fixture.record(fixture.member(0), (2024, 5, 19))];
    let report = build_report(
        &records,
        &fixture.members,
        &AttendanceFilter::any(),
        &ReportSettings::default(),
    );

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["stats"]["totalPresences"], 1);
    assert_eq!(json["stats"]["uniqueMeetings"], 1);
    assert_eq!(json["stats"]["attendanceRate"], 100.0);
    assert_eq!(json["members"][0]["memberName"], "Ana Costa");
    assert_eq!(json["members"][0]["totalCount"], 1);
    assert_eq!(json["series"][0]["dateLabel"], "19/05");
}
