//! Live collection store with snapshot subscriptions.
//!
//! # Responsibility
//! - Own the persisted state (members, classes, meetings, attendance).
//! - Deliver complete snapshots to subscribers: one on subscribe and one
//!   after every committed write to the subscribed collection.
//! - Commit attendance batches atomically with one commit-time timestamp.
//!
//! # Invariants
//! - A write is committed before any subscriber is notified.
//! - Subscribers always receive full snapshots, never diffs.
//! - Subscriptions are independent; no cross-collection ordering exists.
//! - Execution is single-threaded: writes take `&mut self` and callbacks
//!   run synchronously on the writing call.

mod clock;
mod snapshot;

pub use clock::{Clock, ManualClock, SystemClock};
pub use snapshot::{Collection, Snapshot, SnapshotEvent, SnapshotQuery, SubscriptionId};

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::attendance::{AttendanceDraft, AttendanceRecord};
use crate::model::catalog::{Class, ClassId, Meeting, MeetingId};
use crate::model::member::{Member, MemberId, MemberInput};
use crate::repo::attendance_repo::{AttendanceRepository, SqliteAttendanceRepository};
use crate::repo::catalog_repo::{ClassRepository, MeetingRepository, SqliteCatalogRepository};
use crate::repo::member_repo::{MemberListQuery, MemberRepository, SqliteMemberRepository};
use crate::repo::RepoError;
use crate::service::catalog_service::CatalogService;
use crate::service::member_service::MemberService;
use chrono::NaiveDate;
use log::{debug, error, info, warn};
use rusqlite::Connection;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Instant;
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

/// Callback invoked with every snapshot delivery.
pub type SnapshotCallback = Box<dyn FnMut(SnapshotEvent)>;

/// Errors surfaced by live store reads and writes.
#[derive(Debug)]
pub enum StoreError {
    Repo(RepoError),
    /// Attendance batch contained no records.
    EmptyBatch,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::EmptyBatch => write!(f, "attendance batch is empty"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::EmptyBatch => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Repo(RepoError::Db(value))
    }
}

struct Subscription {
    query: SnapshotQuery,
    callback: SnapshotCallback,
}

/// SQLite-backed live store.
pub struct LiveStore {
    conn: Connection,
    clock: Box<dyn Clock>,
    subscriptions: BTreeMap<SubscriptionId, Subscription>,
    next_subscription_id: u64,
}

impl LiveStore {
    /// Wraps a migrated connection using the wall clock.
    pub fn new(conn: Connection) -> Self {
        Self::with_clock(conn, SystemClock)
    }

    /// Wraps a migrated connection with a caller-provided commit clock.
    pub fn with_clock(conn: Connection, clock: impl Clock + 'static) -> Self {
        Self {
            conn,
            clock: Box::new(clock),
            subscriptions: BTreeMap::new(),
            next_subscription_id: 1,
        }
    }

    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    /// Opens a migrated in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Registers a subscriber and immediately delivers the initial snapshot.
    ///
    /// Load failures are delivered as `SnapshotEvent::Failed`; the
    /// subscription stays registered and receives later snapshots.
    pub fn subscribe(
        &mut self,
        query: SnapshotQuery,
        callback: impl FnMut(SnapshotEvent) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription_id);
        self.next_subscription_id += 1;

        let mut subscription = Subscription {
            query,
            callback: Box::new(callback),
        };
        debug!(
            "event=store_subscribe module=store status=ok subscription_id={} collection={}",
            id.0,
            query.collection().as_str()
        );
        deliver(&self.conn, id, &mut subscription);
        self.subscriptions.insert(id, subscription);
        id
    }

    /// Tears down a subscription. Returns `false` for unknown ids.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let removed = self.subscriptions.remove(&id).is_some();
        debug!(
            "event=store_unsubscribe module=store status={} subscription_id={}",
            if removed { "ok" } else { "unknown" },
            id.0
        );
        removed
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// One-shot read of a query, without subscribing.
    pub fn load(&self, query: &SnapshotQuery) -> StoreResult<Snapshot> {
        load_snapshot(&self.conn, query)
    }

    pub fn create_member(&mut self, input: &MemberInput) -> StoreResult<Member> {
        let member = self.member_service()?.create_member(input)?;
        self.notify(Collection::Members);
        Ok(member)
    }

    pub fn update_member(&mut self, id: MemberId, input: &MemberInput) -> StoreResult<Member> {
        let member = self.member_service()?.update_member(id, input)?;
        self.notify(Collection::Members);
        Ok(member)
    }

    pub fn deactivate_member(&mut self, id: MemberId) -> StoreResult<()> {
        self.member_service()?.deactivate_member(id)?;
        self.notify(Collection::Members);
        Ok(())
    }

    pub fn reactivate_member(&mut self, id: MemberId) -> StoreResult<()> {
        self.member_service()?.reactivate_member(id)?;
        self.notify(Collection::Members);
        Ok(())
    }

    /// Hard-deletes a member. Attendance referencing it is kept as is.
    pub fn delete_member(&mut self, id: MemberId) -> StoreResult<()> {
        self.member_service()?.delete_member(id)?;
        self.notify(Collection::Members);
        Ok(())
    }

    pub fn create_class(&mut self, name: &str) -> StoreResult<Class> {
        let class = self.catalog_service()?.create_class(name)?;
        self.notify(Collection::Classes);
        Ok(class)
    }

    pub fn rename_class(&mut self, id: ClassId, name: &str) -> StoreResult<Class> {
        let class = self.catalog_service()?.rename_class(id, name)?;
        self.notify(Collection::Classes);
        Ok(class)
    }

    pub fn delete_class(&mut self, id: ClassId) -> StoreResult<()> {
        self.catalog_service()?.delete_class(id)?;
        self.notify(Collection::Classes);
        Ok(())
    }

    pub fn create_meeting(
        &mut self,
        name: &str,
        scheduled_on: Option<NaiveDate>,
    ) -> StoreResult<Meeting> {
        let meeting = self.catalog_service()?.create_meeting(name, scheduled_on)?;
        self.notify(Collection::Meetings);
        Ok(meeting)
    }

    pub fn update_meeting(
        &mut self,
        id: MeetingId,
        name: &str,
        scheduled_on: Option<NaiveDate>,
    ) -> StoreResult<Meeting> {
        let meeting = self
            .catalog_service()?
            .update_meeting(id, name, scheduled_on)?;
        self.notify(Collection::Meetings);
        Ok(meeting)
    }

    pub fn delete_meeting(&mut self, id: MeetingId) -> StoreResult<()> {
        self.catalog_service()?.delete_meeting(id)?;
        self.notify(Collection::Meetings);
        Ok(())
    }

    /// Commits a batch of attendance drafts as one all-or-nothing write.
    ///
    /// Every record gets a fresh id and the same commit-time timestamp.
    pub fn write_attendance_batch(
        &mut self,
        drafts: Vec<AttendanceDraft>,
    ) -> StoreResult<Vec<AttendanceRecord>> {
        if drafts.is_empty() {
            return Err(StoreError::EmptyBatch);
        }

        let started_at = Instant::now();
        let registered_at = self.clock.now_epoch_ms();
        let records = drafts
            .into_iter()
            .map(|draft| draft.into_record(Uuid::new_v4(), registered_at))
            .collect::<Vec<_>>();

        if let Err(err) = self.attendance_repo()?.insert_records(&records) {
            error!(
                "event=attendance_batch_write module=store status=error count={} duration_ms={} error={}",
                records.len(),
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
        info!(
            "event=attendance_batch_write module=store status=ok count={} duration_ms={}",
            records.len(),
            started_at.elapsed().as_millis()
        );

        self.notify(Collection::Attendance);
        Ok(records)
    }

    /// Bulk-creates historical records that already carry ids and
    /// timestamps. Same atomicity as `write_attendance_batch`.
    pub fn import_attendance(&mut self, records: &[AttendanceRecord]) -> StoreResult<()> {
        if records.is_empty() {
            return Err(StoreError::EmptyBatch);
        }
        self.attendance_repo()?.insert_records(records)?;
        info!(
            "event=attendance_import module=store status=ok count={}",
            records.len()
        );
        self.notify(Collection::Attendance);
        Ok(())
    }

    fn member_service(&self) -> StoreResult<MemberService<SqliteMemberRepository<'_>>> {
        Ok(MemberService::new(SqliteMemberRepository::try_new(
            &self.conn,
        )?))
    }

    fn catalog_service(&self) -> StoreResult<CatalogService<SqliteCatalogRepository<'_>>> {
        Ok(CatalogService::new(SqliteCatalogRepository::try_new(
            &self.conn,
        )?))
    }

    fn attendance_repo(&self) -> StoreResult<SqliteAttendanceRepository<'_>> {
        Ok(SqliteAttendanceRepository::try_new(&self.conn)?)
    }

    fn notify(&mut self, collection: Collection) {
        let conn = &self.conn;
        for (id, subscription) in self
            .subscriptions
            .iter_mut()
            .filter(|(_, subscription)| subscription.query.collection() == collection)
        {
            deliver(conn, *id, subscription);
        }
    }
}

fn deliver(conn: &Connection, id: SubscriptionId, subscription: &mut Subscription) {
    let event = match load_snapshot(conn, &subscription.query) {
        Ok(snapshot) => SnapshotEvent::Snapshot(snapshot),
        Err(err) => {
            warn!(
                "event=snapshot_deliver module=store status=error subscription_id={} collection={} error={}",
                id.0,
                subscription.query.collection().as_str(),
                err
            );
            SnapshotEvent::Failed {
                collection: subscription.query.collection(),
                message: err.to_string(),
            }
        }
    };
    (subscription.callback)(event);
}

fn load_snapshot(conn: &Connection, query: &SnapshotQuery) -> StoreResult<Snapshot> {
    let snapshot = match query {
        SnapshotQuery::Members => Snapshot::Members(
            SqliteMemberRepository::try_new(conn)?.list_members(&MemberListQuery::default())?,
        ),
        SnapshotQuery::Classes => {
            Snapshot::Classes(SqliteCatalogRepository::try_new(conn)?.list_classes()?)
        }
        SnapshotQuery::Meetings => {
            Snapshot::Meetings(SqliteCatalogRepository::try_new(conn)?.list_meetings()?)
        }
        SnapshotQuery::Attendance(range) => Snapshot::Attendance(
            SqliteAttendanceRepository::try_new(conn)?.list_records(range.as_ref())?,
        ),
    };
    Ok(snapshot)
}
