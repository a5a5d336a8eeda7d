//! Attendance recording screen state.
//!
//! # Invariants
//! - Only active members are offered, ordered by name.
//! - The present-member selection survives member snapshots; ids that
//!   vanish are skipped at save time.
//! - While a save is pending, selection changes are ignored and a second
//!   save is rejected.
//! - A successful save clears the selection; a failed one keeps it.

use crate::identity::IdentityProvider;
use crate::model::attendance::{AttendanceDraft, AttendanceRecord};
use crate::model::catalog::{Class, ClassId, Meeting, MeetingId};
use crate::model::member::{Member, MemberId, MemberInput};
use crate::report::collate::compare_names;
use crate::service::attendance_service::{
    build_attendance_batch, AttendanceContext, AttendanceSaveError, AttendanceSelection,
};
use crate::store::{
    Collection, LiveStore, Snapshot, SnapshotEvent, SnapshotQuery, StoreResult, SubscriptionId,
};
use crate::view::{subscribe_sink, LoadState, SnapshotSink, ViewCell};
use log::info;
use std::cell::Ref;
use std::collections::BTreeSet;
use std::rc::Rc;

const REQUIRED_COLLECTIONS: [Collection; 3] =
    [Collection::Members, Collection::Classes, Collection::Meetings];

/// Working state of the attendance sheet.
#[derive(Debug, Clone)]
pub struct AttendanceSheet {
    members: Vec<Member>,
    classes: Vec<Class>,
    meetings: Vec<Meeting>,
    meeting_id: Option<MeetingId>,
    class_id: Option<ClassId>,
    present: BTreeSet<MemberId>,
    received: BTreeSet<Collection>,
    failure: Option<String>,
    saving: bool,
    notification: Option<String>,
}

impl Default for AttendanceSheet {
    fn default() -> Self {
        Self::new()
    }
}

impl AttendanceSheet {
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
            classes: Vec::new(),
            meetings: Vec::new(),
            meeting_id: None,
            class_id: None,
            present: BTreeSet::new(),
            received: BTreeSet::new(),
            failure: None,
            saving: false,
            notification: None,
        }
    }

    /// `Ready` once members, classes and meetings have each arrived.
    pub fn state(&self) -> LoadState {
        if let Some(message) = &self.failure {
            return LoadState::Failed(message.clone());
        }
        if REQUIRED_COLLECTIONS
            .iter()
            .all(|collection| self.received.contains(collection))
        {
            LoadState::Ready
        } else {
            LoadState::Loading
        }
    }

    /// Active members, ordered by name.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn classes(&self) -> &[Class] {
        &self.classes
    }

    pub fn meetings(&self) -> &[Meeting] {
        &self.meetings
    }

    pub fn select_meeting(&mut self, meeting_id: Option<MeetingId>) {
        if !self.saving {
            self.meeting_id = meeting_id;
        }
    }

    pub fn select_class(&mut self, class_id: Option<ClassId>) {
        if !self.saving {
            self.class_id = class_id;
        }
    }

    /// Marks or unmarks one member as present.
    pub fn set_present(&mut self, member_id: MemberId, is_present: bool) {
        if self.saving {
            return;
        }
        if is_present {
            self.present.insert(member_id);
        } else {
            self.present.remove(&member_id);
        }
    }

    pub fn is_present(&self, member_id: MemberId) -> bool {
        self.present.contains(&member_id)
    }

    pub fn present_count(&self) -> usize {
        self.present.len()
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Validates the selection and enters the pending state.
    ///
    /// Nothing is written here; validation failures leave the sheet
    /// untouched.
    pub fn begin_save(
        &mut self,
        identity: &dyn IdentityProvider,
    ) -> Result<Vec<AttendanceDraft>, AttendanceSaveError> {
        if self.saving {
            return Err(AttendanceSaveError::SaveInProgress);
        }
        let drafts = build_attendance_batch(
            AttendanceSelection {
                meeting_id: self.meeting_id,
                class_id: self.class_id,
                present: &self.present,
            },
            AttendanceContext {
                members: &self.members,
                classes: &self.classes,
                meetings: &self.meetings,
            },
            identity,
        );
        match drafts {
            Ok(drafts) => {
                self.saving = true;
                Ok(drafts)
            }
            Err(err) => {
                self.notification = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Leaves the pending state with the store's answer.
    pub fn finish_save(&mut self, result: &StoreResult<Vec<AttendanceRecord>>) {
        self.saving = false;
        match result {
            Ok(records) => {
                self.present.clear();
                self.notification = Some(format!(
                    "attendance of {} member(s) recorded",
                    records.len()
                ));
            }
            Err(err) => {
                self.notification = Some(format!("could not record attendance: {err}"));
            }
        }
    }

    pub fn take_notification(&mut self) -> Option<String> {
        self.notification.take()
    }
}

impl SnapshotSink for AttendanceSheet {
    fn apply_event(&mut self, event: SnapshotEvent) {
        match event {
            SnapshotEvent::Snapshot(snapshot) => {
                let collection = snapshot.collection();
                match snapshot {
                    Snapshot::Members(members) => {
                        let mut active = members
                            .into_iter()
                            .filter(|member| member.is_active)
                            .collect::<Vec<_>>();
                        active.sort_by(|left, right| {
                            compare_names(&left.full_name, &right.full_name)
                                .then_with(|| left.id.cmp(&right.id))
                        });
                        self.members = active;
                    }
                    Snapshot::Classes(classes) => self.classes = classes,
                    Snapshot::Meetings(meetings) => self.meetings = meetings,
                    Snapshot::Attendance(_) => return,
                }
                self.received.insert(collection);
                self.failure = None;
            }
            SnapshotEvent::Failed {
                collection,
                message,
            } => {
                self.notification = Some(format!(
                    "could not load {}: {message}",
                    collection.as_str()
                ));
                self.failure = Some(message);
            }
        }
    }
}

/// An `AttendanceSheet` wired to a live store.
pub struct AttendanceSheetMount {
    sheet: Rc<ViewCell<AttendanceSheet>>,
    subscriptions: Vec<SubscriptionId>,
}

impl AttendanceSheetMount {
    pub fn mount(store: &mut LiveStore, sheet: AttendanceSheet) -> Self {
        let sheet = ViewCell::new(sheet);
        let subscriptions = [
            SnapshotQuery::Members,
            SnapshotQuery::Classes,
            SnapshotQuery::Meetings,
        ]
        .into_iter()
        .map(|query| subscribe_sink(store, query, &sheet))
        .collect();
        Self {
            sheet,
            subscriptions,
        }
    }

    pub fn sheet(&self) -> Ref<'_, AttendanceSheet> {
        self.sheet.borrow()
    }

    pub fn select_meeting(&self, meeting_id: Option<MeetingId>) {
        self.sheet.borrow_mut().select_meeting(meeting_id);
    }

    pub fn select_class(&self, class_id: Option<ClassId>) {
        self.sheet.borrow_mut().select_class(class_id);
    }

    pub fn set_present(&self, member_id: MemberId, is_present: bool) {
        self.sheet.borrow_mut().set_present(member_id, is_present);
    }

    /// Validates, writes one atomic batch and returns the number of
    /// records stored.
    pub fn save(
        &self,
        store: &mut LiveStore,
        identity: &dyn IdentityProvider,
    ) -> Result<usize, AttendanceSaveError> {
        let drafts = self.sheet.borrow_mut().begin_save(identity)?;
        let result = store.write_attendance_batch(drafts);
        self.sheet.borrow_mut().finish_save(&result);

        let records = result?;
        info!(
            "event=attendance_sheet_save module=view status=ok count={}",
            records.len()
        );
        Ok(records.len())
    }

    /// Registers a member from the sheet; the member list refreshes
    /// through the members subscription.
    pub fn add_member(&self, store: &mut LiveStore, input: &MemberInput) -> StoreResult<Member> {
        let result = store.create_member(input);
        let message = match &result {
            Ok(_) => "member added".to_string(),
            Err(err) => format!("could not add member: {err}"),
        };
        self.sheet.borrow_mut().notification = Some(message);
        result
    }

    pub fn take_notification(&self) -> Option<String> {
        self.sheet.borrow_mut().take_notification()
    }

    pub fn unmount(self, store: &mut LiveStore) {
        for id in self.subscriptions {
            store.unsubscribe(id);
        }
    }
}
