use chrono::NaiveDate;
use congregation_core::db::open_db_in_memory;
use congregation_core::store::ManualClock;
use congregation_core::{
    AttendanceDraft, AttendanceRecord, AttendanceSaveError, AttendanceSheet, AttendanceSheetMount,
    LiveStore, MemberInput, Snapshot, SnapshotQuery, StaticIdentity, StoreError,
};
use std::rc::Rc;
use uuid::Uuid;

const COMMIT_MS: i64 = 1_716_112_800_000;

fn store_with_clock() -> (LiveStore, Rc<ManualClock>) {
    let clock = Rc::new(ManualClock::new(COMMIT_MS));
    let store = LiveStore::with_clock(open_db_in_memory().unwrap(), Rc::clone(&clock));
    (store, clock)
}

fn draft(member_name: &str) -> AttendanceDraft {
    AttendanceDraft {
        member_id: Uuid::new_v4(),
        member_name: member_name.to_string(),
        class_id: Uuid::new_v4(),
        class_name: "Jovens".to_string(),
        meeting_id: Uuid::new_v4(),
        meeting_name: "Culto de Domingo".to_string(),
        recorded_by: "user-1".to_string(),
    }
}

fn stored_records(store: &LiveStore) -> Vec<AttendanceRecord> {
    match store.load(&SnapshotQuery::Attendance(None)).unwrap() {
        Snapshot::Attendance(records) => records,
        other => panic!("unexpected snapshot {other:?}"),
    }
}

#[test]
fn batch_gets_one_commit_timestamp_and_distinct_ids() {
    let (mut store, _clock) = store_with_clock();

    let records = store
        .write_attendance_batch(vec![draft("Ana Costa"), draft("Bruno Dias")])
        .unwrap();

    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|record| record.registered_at == COMMIT_MS));
    assert_ne!(records[0].id, records[1].id);

    let mut stored = stored_records(&store);
    stored.sort_by(|a, b| a.member_name.cmp(&b.member_name));
    assert_eq!(stored[0].member_name, "Ana Costa");
    assert_eq!(stored[1].member_name, "Bruno Dias");
    assert_eq!(stored[0].recorded_by, "user-1");
}

#[test]
fn later_batches_use_the_clock_at_commit_time() {
    let (mut store, clock) = store_with_clock();
    store.write_attendance_batch(vec![draft("Ana Costa")]).unwrap();
    clock.set(COMMIT_MS + 60_000);
    let second = store.write_attendance_batch(vec![draft("Ana Costa")]).unwrap();

    assert_eq!(second[0].registered_at, COMMIT_MS + 60_000);
    assert_eq!(stored_records(&store).len(), 2);
}

#[test]
fn empty_batch_is_rejected_by_the_store() {
    let (mut store, _clock) = store_with_clock();
    assert!(matches!(
        store.write_attendance_batch(Vec::new()),
        Err(StoreError::EmptyBatch)
    ));
    assert!(matches!(
        store.import_attendance(&[]),
        Err(StoreError::EmptyBatch)
    ));
}

#[test]
fn failing_record_rolls_back_the_whole_batch() {
    let (mut store, _clock) = store_with_clock();
    let first = draft("Ana Costa").into_record(Uuid::new_v4(), COMMIT_MS);
    let duplicate = AttendanceRecord {
        member_name: "Bruno Dias".to_string(),
        ..first.clone()
    };

    assert!(store.import_attendance(&[first, duplicate]).is_err());
    assert!(stored_records(&store).is_empty());
}

#[test]
fn invalid_record_is_rejected_before_any_insert() {
    let (mut store, _clock) = store_with_clock();
    let result = store.write_attendance_batch(vec![draft("Ana Costa"), draft("   ")]);

    assert!(matches!(result, Err(StoreError::Repo(_))));
    assert!(stored_records(&store).is_empty());
}

#[test]
fn import_keeps_explicit_ids_and_timestamps() {
    let (mut store, _clock) = store_with_clock();
    let historical = draft("Ana Costa").into_record(Uuid::new_v4(), 1_600_000_000_000);

    store.import_attendance(std::slice::from_ref(&historical)).unwrap();
    assert_eq!(stored_records(&store), vec![historical]);
}

#[test]
fn sheet_with_no_present_members_never_reaches_the_store() {
    let (mut store, _clock) = store_with_clock();
    let birth = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
    store
        .create_member(&MemberInput::new("Ana Costa", birth, birth))
        .unwrap();
    let class = store.create_class("Jovens").unwrap();
    let meeting = store.create_meeting("Culto de Domingo", None).unwrap();

    let deliveries = Rc::new(std::cell::Cell::new(0));
    let counter = Rc::clone(&deliveries);
    store.subscribe(SnapshotQuery::Attendance(None), move |_| {
        counter.set(counter.get() + 1)
    });

    let mount = AttendanceSheetMount::mount(&mut store, AttendanceSheet::new());
    mount.select_meeting(Some(meeting.id));
    mount.select_class(Some(class.id));
    let err = mount
        .save(&mut store, &StaticIdentity::signed_in("user-1"))
        .unwrap_err();

    assert!(matches!(err, AttendanceSaveError::NoMembersSelected));
    assert!(err.is_validation());
    assert_eq!(deliveries.get(), 1);
    assert!(stored_records(&store).is_empty());
}
