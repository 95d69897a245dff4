//! Change notifier: dirty-category tracking, batch scopes, observer registry.
//!
//! Architecture:
//! - Mutations call `mark()` *before* touching data, recording the category's
//!   baseline value the first time it goes dirty in the current batch
//! - `enter()`/`exit()` drive the batch state machine; only the outermost
//!   `exit()` reports that a flush is due
//! - The store compares each baseline with the live value and hands the net
//!   changes to `emit()`, which invokes callbacks AND queues for `poll()`
//!
//! Callback order: FIFO (first-subscribed, first-called) for every event.
//! Event order within one flush follows `ChangeKind` ordering.
//!
//! Callbacks are `Rc`, so the notifier (and the store that owns it) is
//! neither `Send` nor `Sync`.

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use log::{trace, warn};
use uuid::Uuid;

use super::store_events::{ChangeFilter, ChangeKind, StoreEvent};
use crate::entities::{ImageSequenceState, Point};

/// Maximum events in queue before oldest are evicted
const MAX_QUEUE_SIZE: usize = 1000;

/// Type-erased observer callback
type Callback = Rc<dyn Fn(&StoreEvent)>;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Batching(usize),
}

/// Value of a category when it first went dirty in the current batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Baseline {
    Curve(Option<Vec<Point>>),
    Selection(Option<BTreeSet<usize>>),
    Active(Option<String>),
    Frame { current: i32, total: i32 },
    Images(ImageSequenceState),
}

pub struct ChangeNotifier {
    subscribers: Vec<(SubscriptionId, ChangeFilter, Callback)>,
    state: BatchState,
    dirty: BTreeMap<ChangeKind, Baseline>,
    queue: Vec<StoreEvent>,
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("subscribers", &self.subscribers.len())
            .field("state", &self.state)
            .field("dirty", &self.dirty.keys().collect::<Vec<_>>())
            .field("queue_len", &self.queue.len())
            .finish()
    }
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            state: BatchState::Idle,
            dirty: BTreeMap::new(),
            queue: Vec::new(),
        }
    }

    // ========== Observers ==========

    pub fn subscribe<F>(&mut self, filter: ChangeFilter, callback: F) -> SubscriptionId
    where
        F: Fn(&StoreEvent) + 'static,
    {
        let id = SubscriptionId(Uuid::new_v4());
        self.subscribers.push((id, filter, Rc::new(callback)));
        id
    }

    /// Returns false if the id was unknown (already unsubscribed).
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    // ========== Batch state machine ==========

    pub fn state(&self) -> BatchState {
        self.state
    }

    pub fn depth(&self) -> usize {
        match self.state {
            BatchState::Idle => 0,
            BatchState::Batching(n) => n,
        }
    }

    pub fn enter(&mut self) {
        self.state = match self.state {
            BatchState::Idle => BatchState::Batching(1),
            BatchState::Batching(n) => BatchState::Batching(n + 1),
        };
    }

    /// Leave one batch level. Returns true when the outermost level closed
    /// and a flush is due.
    ///
    /// # Panics
    /// When no batch is open: an unbalanced exit is a caller bug.
    pub fn exit(&mut self) -> bool {
        match self.state {
            BatchState::Idle => panic!("exit_batch called with no open batch"),
            BatchState::Batching(1) => {
                self.state = BatchState::Idle;
                true
            }
            BatchState::Batching(n) => {
                self.state = BatchState::Batching(n - 1);
                false
            }
        }
    }

    // ========== Dirty tracking ==========

    /// Mark `kind` dirty. `baseline` runs only on the first mark per batch.
    pub fn mark<F>(&mut self, kind: ChangeKind, baseline: F)
    where
        F: FnOnce() -> Baseline,
    {
        self.dirty.entry(kind).or_insert_with(baseline);
    }

    pub fn is_dirty(&self, kind: &ChangeKind) -> bool {
        self.dirty.contains_key(kind)
    }

    pub fn take_dirty(&mut self) -> BTreeMap<ChangeKind, Baseline> {
        std::mem::take(&mut self.dirty)
    }

    // ========== Delivery ==========

    /// Invoke matching callbacks for each event, then queue it for `poll()`.
    pub fn emit(&mut self, events: Vec<StoreEvent>) {
        for event in events {
            trace!("emit {:?}", event);
            for (_, filter, cb) in &self.subscribers {
                if filter.matches(&event) {
                    cb(&event);
                }
            }
            if self.queue.len() >= MAX_QUEUE_SIZE {
                let evict_count = self.queue.len() / 2;
                warn!(
                    "Store event queue full ({} events), evicting oldest {}",
                    self.queue.len(),
                    evict_count
                );
                self.queue.drain(0..evict_count);
            }
            self.queue.push(event);
        }
    }

    /// All events flushed since the last poll.
    pub fn poll(&mut self) -> Vec<StoreEvent> {
        std::mem::take(&mut self.queue)
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_batch_state_machine() {
        let mut n = ChangeNotifier::new();
        assert_eq!(n.state(), BatchState::Idle);
        n.enter();
        n.enter();
        assert_eq!(n.state(), BatchState::Batching(2));
        assert!(!n.exit());
        assert_eq!(n.depth(), 1);
        assert!(n.exit());
        assert_eq!(n.state(), BatchState::Idle);
    }

    #[test]
    #[should_panic(expected = "no open batch")]
    fn test_unbalanced_exit_panics() {
        let mut n = ChangeNotifier::new();
        n.exit();
    }

    #[test]
    fn test_baseline_recorded_once() {
        let mut n = ChangeNotifier::new();
        n.mark(ChangeKind::Frame, || Baseline::Frame { current: 1, total: 10 });
        n.mark(ChangeKind::Frame, || Baseline::Frame { current: 5, total: 10 });
        let dirty = n.take_dirty();
        assert_eq!(dirty.len(), 1);
        assert_eq!(dirty[&ChangeKind::Frame], Baseline::Frame { current: 1, total: 10 });
        assert!(!n.is_dirty(&ChangeKind::Frame));
    }

    #[test]
    fn test_emit_filters_and_queues() {
        let mut n = ChangeNotifier::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        n.subscribe(ChangeFilter::Frame, move |e| s.borrow_mut().push(e.clone()));

        n.emit(vec![
            StoreEvent::SelectionChanged { name: "a".into() },
            StoreEvent::FrameChanged { current: 2, total: 5 },
        ]);
        assert_eq!(*seen.borrow(), vec![StoreEvent::FrameChanged { current: 2, total: 5 }]);
        assert_eq!(n.queue_len(), 2);
        assert_eq!(n.poll().len(), 2);
        assert_eq!(n.poll().len(), 0);
    }

    #[test]
    fn test_subscription_order_and_unsubscribe() {
        let mut n = ChangeNotifier::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let l1 = Rc::clone(&log);
        let first = n.subscribe(ChangeFilter::All, move |_| l1.borrow_mut().push(1));
        let l2 = Rc::clone(&log);
        n.subscribe(ChangeFilter::All, move |_| l2.borrow_mut().push(2));

        n.emit(vec![StoreEvent::ActiveCurveChanged { active: None }]);
        assert_eq!(*log.borrow(), vec![1, 2]);

        assert!(n.unsubscribe(first));
        assert!(!n.unsubscribe(first));
        n.emit(vec![StoreEvent::ActiveCurveChanged { active: None }]);
        assert_eq!(*log.borrow(), vec![1, 2, 2]);
        assert_eq!(n.subscriber_count(), 1);
    }

    #[test]
    fn test_queue_eviction() {
        let mut n = ChangeNotifier::new();
        let events = (0..MAX_QUEUE_SIZE + 1)
            .map(|i| StoreEvent::FrameChanged { current: i as i32, total: 0 })
            .collect();
        n.emit(events);
        assert!(n.queue_len() <= MAX_QUEUE_SIZE);
        // Newest event survives eviction
        let last = n.poll().pop().unwrap();
        assert_eq!(last, StoreEvent::FrameChanged { current: MAX_QUEUE_SIZE as i32, total: 0 });
    }
}
