//! Reports screen state.

use crate::model::attendance::AttendanceRecord;
use crate::model::catalog::{Class, ClassId, Meeting, MeetingId};
use crate::model::member::Member;
use crate::report::{build_report, AttendanceFilter, AttendanceReport, ReportSettings, Selector};
use crate::store::{Collection, LiveStore, Snapshot, SnapshotEvent, SnapshotQuery, SubscriptionId};
use crate::view::{subscribe_sink, LoadState, SnapshotSink, ViewCell};
use chrono::NaiveDate;
use std::cell::Ref;
use std::rc::Rc;

/// Working state of the reports screen.
#[derive(Debug, Clone)]
pub struct ReportsView {
    settings: ReportSettings,
    date_from: NaiveDate,
    date_to: NaiveDate,
    meeting: Selector<MeetingId>,
    class: Selector<ClassId>,
    members: Vec<Member>,
    classes: Vec<Class>,
    meetings: Vec<Meeting>,
    records: Vec<AttendanceRecord>,
    attendance_state: LoadState,
    notification: Option<String>,
}

impl ReportsView {
    /// Creates a view over the default window ending at `today`.
    pub fn new(settings: ReportSettings, today: NaiveDate) -> Self {
        let (date_from, date_to) = settings.default_window(today);
        Self {
            settings,
            date_from,
            date_to,
            meeting: Selector::Any,
            class: Selector::Any,
            members: Vec::new(),
            classes: Vec::new(),
            meetings: Vec::new(),
            records: Vec::new(),
            attendance_state: LoadState::Loading,
            notification: None,
        }
    }

    pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
        (self.date_from, self.date_to)
    }

    /// Changes the window. The attendance set is stale until the next
    /// attendance snapshot arrives.
    pub fn set_date_range(&mut self, from: NaiveDate, to: NaiveDate) {
        let (from, to) = if from <= to { (from, to) } else { (to, from) };
        self.date_from = from;
        self.date_to = to;
        self.attendance_state = LoadState::Loading;
    }

    pub fn set_meeting(&mut self, meeting: Selector<MeetingId>) {
        self.meeting = meeting;
    }

    pub fn set_class(&mut self, class: Selector<ClassId>) {
        self.class = class;
    }

    /// Store query matching the current window.
    pub fn attendance_query(&self) -> SnapshotQuery {
        SnapshotQuery::Attendance(Some(self.settings.day_range(self.date_from, self.date_to)))
    }

    /// Filter applied in memory on top of the store range query.
    pub fn filter(&self) -> AttendanceFilter {
        AttendanceFilter {
            meeting: self.meeting,
            class: self.class,
            date_from: None,
            date_to: None,
        }
        .with_range(self.settings.day_range(self.date_from, self.date_to))
    }

    pub fn attendance_state(&self) -> &LoadState {
        &self.attendance_state
    }

    /// Class options for the filter picker.
    pub fn classes(&self) -> &[Class] {
        &self.classes
    }

    /// Meeting options for the filter picker.
    pub fn meetings(&self) -> &[Meeting] {
        &self.meetings
    }

    /// Current report, or `None` while attendance is loading.
    ///
    /// After a failed load the report is computed over the last delivered
    /// (possibly empty) data.
    pub fn report(&self) -> Option<AttendanceReport> {
        if self.attendance_state.is_loading() {
            return None;
        }
        Some(build_report(
            &self.records,
            &self.members,
            &self.filter(),
            &self.settings,
        ))
    }

    /// Returns and clears the pending user-facing notification.
    pub fn take_notification(&mut self) -> Option<String> {
        self.notification.take()
    }
}

impl SnapshotSink for ReportsView {
    fn apply_event(&mut self, event: SnapshotEvent) {
        match event {
            SnapshotEvent::Snapshot(Snapshot::Members(members)) => self.members = members,
            SnapshotEvent::Snapshot(Snapshot::Classes(classes)) => self.classes = classes,
            SnapshotEvent::Snapshot(Snapshot::Meetings(meetings)) => self.meetings = meetings,
            SnapshotEvent::Snapshot(Snapshot::Attendance(records)) => {
                self.records = records;
                self.attendance_state = LoadState::Ready;
            }
            SnapshotEvent::Failed {
                collection,
                message,
            } => {
                if collection == Collection::Attendance {
                    self.attendance_state = LoadState::Failed(message.clone());
                }
                self.notification = Some(format!(
                    "could not load {}: {message}",
                    collection.as_str()
                ));
            }
        }
    }
}

/// A `ReportsView` wired to a live store.
pub struct ReportsMount {
    view: Rc<ViewCell<ReportsView>>,
    reference_subscriptions: Vec<SubscriptionId>,
    attendance_subscription: SubscriptionId,
}

impl ReportsMount {
    /// Subscribes the view to members, classes, meetings and the
    /// attendance window.
    pub fn mount(store: &mut LiveStore, view: ReportsView) -> Self {
        let attendance_query = view.attendance_query();
        let view = ViewCell::new(view);
        let reference_subscriptions = [
            SnapshotQuery::Members,
            SnapshotQuery::Classes,
            SnapshotQuery::Meetings,
        ]
        .into_iter()
        .map(|query| subscribe_sink(store, query, &view))
        .collect();
        let attendance_subscription = subscribe_sink(store, attendance_query, &view);

        Self {
            view,
            reference_subscriptions,
            attendance_subscription,
        }
    }

    pub fn view(&self) -> Ref<'_, ReportsView> {
        self.view.borrow()
    }

    pub fn report(&self) -> Option<AttendanceReport> {
        self.view.borrow().report()
    }

    pub fn set_meeting(&self, meeting: Selector<MeetingId>) {
        self.view.borrow_mut().set_meeting(meeting);
    }

    pub fn set_class(&self, class: Selector<ClassId>) {
        self.view.borrow_mut().set_class(class);
    }

    /// Changes the window and replaces the attendance subscription.
    pub fn set_date_range(&mut self, store: &mut LiveStore, from: NaiveDate, to: NaiveDate) {
        let query = {
            let mut view = self.view.borrow_mut();
            view.set_date_range(from, to);
            view.attendance_query()
        };
        store.unsubscribe(self.attendance_subscription);
        self.attendance_subscription = subscribe_sink(store, query, &self.view);
    }

    pub fn take_notification(&self) -> Option<String> {
        self.view.borrow_mut().take_notification()
    }

    /// Tears down every subscription owned by this view.
    pub fn unmount(self, store: &mut LiveStore) {
        for id in self.reference_subscriptions {
            store.unsubscribe(id);
        }
        store.unsubscribe(self.attendance_subscription);
    }
}
