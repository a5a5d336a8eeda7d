//! Per-view state fed by store subscriptions.
//!
//! # Responsibility
//! - Hold the latest snapshot of every collection a screen observes.
//! - Expose loading/ready/failed state and one-shot notifications.
//!
//! # Invariants
//! - Each snapshot replaces the view's working copy wholesale.
//! - Subscription callbacks hold only weak references; a dropped view
//!   silently discards later deliveries.
//! - Mount helpers never hold a view borrow across a store call.
//! - A delivery that arrives while the view is borrowed is deferred,
//!   never dropped.

mod attendance_sheet;
mod reports;

pub use attendance_sheet::{AttendanceSheet, AttendanceSheetMount};
pub use reports::{ReportsMount, ReportsView};

use crate::store::{LiveStore, SnapshotEvent, SnapshotQuery, SubscriptionId};
use log::debug;
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

/// Data availability of a view section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Waiting for the first snapshot; distinct from "loaded but empty".
    Loading,
    Ready,
    /// Last load failed; previously delivered data, if any, is kept.
    Failed(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// Receiver of store snapshot deliveries.
pub trait SnapshotSink {
    fn apply_event(&mut self, event: SnapshotEvent);
}

/// View state shared between a mount and its store callbacks.
///
/// A delivery that finds the view borrowed is queued and applied, in
/// arrival order, on the next delivery or the next mount access.
pub struct ViewCell<S> {
    view: RefCell<S>,
    pending: RefCell<Vec<SnapshotEvent>>,
}

impl<S: SnapshotSink> ViewCell<S> {
    pub fn new(view: S) -> Rc<Self> {
        Rc::new(Self {
            view: RefCell::new(view),
            pending: RefCell::new(Vec::new()),
        })
    }

    /// Shared access, after applying any queued deliveries.
    pub fn borrow(&self) -> Ref<'_, S> {
        self.flush();
        self.view.borrow()
    }

    /// Exclusive access, after applying any queued deliveries.
    pub fn borrow_mut(&self) -> RefMut<'_, S> {
        self.flush();
        self.view.borrow_mut()
    }

    /// Number of deliveries waiting for the view to be released.
    pub fn pending_len(&self) -> usize {
        self.pending.borrow().len()
    }

    fn deliver(&self, event: SnapshotEvent) {
        let Ok(mut view) = self.view.try_borrow_mut() else {
            debug!(
                "event=snapshot_apply module=view status=deferred reason=view_busy collection={}",
                event.collection().as_str()
            );
            self.pending.borrow_mut().push(event);
            return;
        };
        let queued = std::mem::take(&mut *self.pending.borrow_mut());
        for queued_event in queued {
            view.apply_event(queued_event);
        }
        view.apply_event(event);
    }

    fn flush(&self) {
        if self.pending.borrow().is_empty() {
            return;
        }
        let Ok(mut view) = self.view.try_borrow_mut() else {
            return;
        };
        let queued = std::mem::take(&mut *self.pending.borrow_mut());
        for event in queued {
            view.apply_event(event);
        }
    }
}

/// Subscribes `cell` to `query` through a weak reference.
pub fn subscribe_sink<S: SnapshotSink + 'static>(
    store: &mut LiveStore,
    query: SnapshotQuery,
    cell: &Rc<ViewCell<S>>,
) -> SubscriptionId {
    let weak = Rc::downgrade(cell);
    store.subscribe(query, move |event| {
        if let Some(cell) = weak.upgrade() {
            cell.deliver(event);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::{SnapshotSink, ViewCell};
    use crate::store::{Collection, Snapshot, SnapshotEvent};

    #[derive(Default)]
    struct Recorder {
        applied: Vec<SnapshotEvent>,
    }

    impl SnapshotSink for Recorder {
        fn apply_event(&mut self, event: SnapshotEvent) {
            self.applied.push(event);
        }
    }

    fn failed(message: &str) -> SnapshotEvent {
        SnapshotEvent::Failed {
            collection: Collection::Members,
            message: message.to_string(),
        }
    }

    #[test]
    fn busy_view_defers_deliveries_in_arrival_order() {
        let cell = ViewCell::new(Recorder::default());

        let held = cell.borrow();
        cell.deliver(failed("first"));
        cell.deliver(SnapshotEvent::Snapshot(Snapshot::Members(Vec::new())));
        assert!(held.applied.is_empty());
        assert_eq!(cell.pending_len(), 2);
        drop(held);

        let view = cell.borrow();
        assert_eq!(cell.pending_len(), 0);
        assert_eq!(
            view.applied,
            vec![
                failed("first"),
                SnapshotEvent::Snapshot(Snapshot::Members(Vec::new()))
            ]
        );
    }

    #[test]
    fn next_delivery_applies_queued_events_first() {
        let cell = ViewCell::new(Recorder::default());

        let held = cell.borrow();
        cell.deliver(failed("stale"));
        drop(held);
        cell.deliver(failed("fresh"));

        assert_eq!(cell.pending_len(), 0);
        assert_eq!(cell.borrow().applied, vec![failed("stale"), failed("fresh")]);
    }
}
