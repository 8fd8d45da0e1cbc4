//! Active-item tracking.
//!
//! The presentation layer reports when an item's rendered bounds cross the
//! trigger line near the top of the viewport. The tracker turns those
//! crossings into a single active item and reports changes once the crossings
//! have been quiet for the debounce window.

use crate::item::ItemId;
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::debug;

/// Direction of a trigger line crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossing {
    /// The item moved above the trigger line (scrolling down).
    Entered,
    /// The item moved back below the trigger line (scrolling up).
    Exited,
}

/// A change of the active item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveChange {
    /// Previously reported active item.
    pub previous: Option<ItemId>,
    /// Newly active item.
    pub current: Option<ItemId>,
}

/// Handle returned by [`ActiveTracker::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&ActiveChange)>;

/// Tracks which activatable item has most recently crossed the trigger line.
pub struct ActiveTracker {
    /// Quiet period before a change is reported.
    debounce: Duration,
    /// Activatable items in position order.
    order: Vec<ItemId>,
    /// Position of each ID in `order`.
    index: HashMap<ItemId, usize>,
    /// Whether each item is currently above the trigger line.
    crossed: Vec<bool>,
    /// Last active item reported to subscribers.
    emitted: Option<ItemId>,
    /// When the most recent unreported crossing arrived.
    pending_since: Option<Instant>,
    subscribers: Vec<(SubscriptionId, Callback)>,
    next_subscription: u64,
}

impl fmt::Debug for ActiveTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveTracker")
            .field("debounce", &self.debounce)
            .field("order", &self.order.len())
            .field("emitted", &self.emitted)
            .field("pending_since", &self.pending_since)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

impl ActiveTracker {
    /// Create an empty tracker.
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            order: Vec::new(),
            index: HashMap::new(),
            crossed: Vec::new(),
            emitted: None,
            pending_since: None,
            subscribers: Vec::new(),
            next_subscription: 1,
        }
    }

    /// Replace the activatable items, in position order.
    ///
    /// Clears all crossings and the active item without notifying.
    /// Subscriptions are kept.
    pub fn set_order(&mut self, ids: impl IntoIterator<Item = ItemId>) {
        self.order = ids.into_iter().collect();
        self.index = self
            .order
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        self.crossed = vec![false; self.order.len()];
        self.emitted = None;
        self.pending_since = None;
    }

    /// Forget all items and crossings. Subscriptions are kept.
    pub fn reset(&mut self) {
        self.set_order(std::iter::empty());
    }

    /// Activatable items in position order.
    pub fn order(&self) -> &[ItemId] {
        &self.order
    }

    /// Record a crossing. Returns `false` if the item is not activatable.
    pub fn record(&mut self, id: &ItemId, crossing: Crossing, now: Instant) -> bool {
        let Some(&pos) = self.index.get(id) else {
            return false;
        };
        let above = crossing == Crossing::Entered;
        if self.crossed[pos] != above {
            self.crossed[pos] = above;
            // Restart the window: rapid flips coalesce into one report.
            self.pending_since = Some(now);
        }
        true
    }

    /// The item that would be active if reported now.
    ///
    /// This is the last crossed item in position order.
    pub fn candidate(&self) -> Option<&ItemId> {
        self.crossed
            .iter()
            .rposition(|&above| above)
            .map(|pos| &self.order[pos])
    }

    /// The last reported active item.
    pub fn active(&self) -> Option<&ItemId> {
        self.emitted.as_ref()
    }

    /// Whether crossings are waiting for the debounce window to close.
    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    /// Report a change if the debounce window has closed.
    pub fn poll(&mut self, now: Instant) -> Option<ActiveChange> {
        let since = self.pending_since?;
        if now.saturating_duration_since(since) < self.debounce {
            return None;
        }
        self.flush()
    }

    /// Report a change immediately, ignoring the debounce window.
    ///
    /// Used for explicit navigation where the user asked for a specific item.
    pub fn flush(&mut self) -> Option<ActiveChange> {
        self.pending_since = None;
        let current = self.candidate().cloned();
        if current == self.emitted {
            return None;
        }

        let change = ActiveChange {
            previous: self.emitted.take(),
            current: current.clone(),
        };
        self.emitted = current;
        debug!(previous = ?change.previous, current = ?change.current, "active item changed");

        for (_, callback) in &mut self.subscribers {
            callback(&change);
        }
        Some(change)
    }

    /// Register a callback invoked on every reported change.
    pub fn subscribe(&mut self, callback: impl FnMut(&ActiveChange) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const DEBOUNCE: Duration = Duration::from_millis(50);

    fn tracker(ids: &[&str]) -> ActiveTracker {
        let mut tracker = ActiveTracker::new(DEBOUNCE);
        tracker.set_order(ids.iter().map(|id| ItemId::new(*id)));
        tracker
    }

    fn id(s: &str) -> ItemId {
        ItemId::new(s)
    }

    #[test]
    fn test_scroll_down_activates_in_order() {
        let mut t = tracker(&["a", "b", "c"]);
        let start = Instant::now();

        t.record(&id("a"), Crossing::Entered, start);
        let change = t.poll(start + DEBOUNCE).unwrap();
        assert_eq!(change.current, Some(id("a")));

        t.record(&id("b"), Crossing::Entered, start + DEBOUNCE * 2);
        let change = t.poll(start + DEBOUNCE * 3).unwrap();
        assert_eq!(change.previous, Some(id("a")));
        assert_eq!(change.current, Some(id("b")));
    }

    #[test]
    fn test_scroll_up_reverts_in_reverse_order() {
        let mut t = tracker(&["a", "b", "c"]);
        let now = Instant::now();
        for name in ["a", "b", "c"] {
            t.record(&id(name), Crossing::Entered, now);
        }
        assert_eq!(t.flush().unwrap().current, Some(id("c")));

        t.record(&id("c"), Crossing::Exited, now);
        assert_eq!(t.flush().unwrap().current, Some(id("b")));

        t.record(&id("b"), Crossing::Exited, now);
        assert_eq!(t.flush().unwrap().current, Some(id("a")));

        t.record(&id("a"), Crossing::Exited, now);
        let change = t.flush().unwrap();
        assert_eq!(change.previous, Some(id("a")));
        assert_eq!(change.current, None);
    }

    #[test]
    fn test_debounce_coalesces_flips() {
        let mut t = tracker(&["a", "b"]);
        let start = Instant::now();
        let step = Duration::from_millis(10);

        t.record(&id("a"), Crossing::Entered, start);
        t.record(&id("b"), Crossing::Entered, start + step);
        t.record(&id("b"), Crossing::Exited, start + step * 2);
        t.record(&id("b"), Crossing::Entered, start + step * 3);

        // Window restarts on every flip.
        assert!(t.poll(start + step * 3 + DEBOUNCE / 2).is_none());
        assert!(t.is_pending());

        let change = t.poll(start + step * 3 + DEBOUNCE).unwrap();
        assert_eq!(change.previous, None);
        assert_eq!(change.current, Some(id("b")));
        assert!(t.poll(start + step * 3 + DEBOUNCE * 4).is_none());
    }

    #[test]
    fn test_flip_back_to_same_item_reports_nothing() {
        let mut t = tracker(&["a", "b"]);
        let now = Instant::now();
        t.record(&id("a"), Crossing::Entered, now);
        t.flush();

        t.record(&id("b"), Crossing::Entered, now);
        t.record(&id("b"), Crossing::Exited, now);
        assert!(t.poll(now + DEBOUNCE).is_none());
        assert_eq!(t.active(), Some(&id("a")));
    }

    #[test]
    fn test_unknown_item_ignored() {
        let mut t = tracker(&["a"]);
        assert!(!t.record(&id("event"), Crossing::Entered, Instant::now()));
        assert!(!t.is_pending());
    }

    #[test]
    fn test_at_most_one_active() {
        let mut t = tracker(&["a", "b", "c", "d"]);
        let mut seen = Vec::new();
        let now = Instant::now();
        for (name, crossing) in [
            ("a", Crossing::Entered),
            ("b", Crossing::Entered),
            ("c", Crossing::Entered),
            ("c", Crossing::Exited),
            ("d", Crossing::Entered),
        ] {
            t.record(&id(name), crossing, now);
            if let Some(change) = t.flush() {
                seen.push(change.current);
            }
        }
        assert_eq!(
            seen,
            vec![Some(id("a")), Some(id("b")), Some(id("c")), Some(id("b")), Some(id("d"))]
        );
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let mut t = tracker(&["a", "b"]);
        let log: Rc<RefCell<Vec<Option<ItemId>>>> = Rc::default();
        let sink = Rc::clone(&log);
        let sub = t.subscribe(move |change| sink.borrow_mut().push(change.current.clone()));

        let now = Instant::now();
        t.record(&id("a"), Crossing::Entered, now);
        t.poll(now + DEBOUNCE);
        assert_eq!(*log.borrow(), vec![Some(id("a"))]);

        assert!(t.unsubscribe(sub));
        assert!(!t.unsubscribe(sub));

        t.record(&id("b"), Crossing::Entered, now);
        t.flush();
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_set_order_resets_state() {
        let mut t = tracker(&["a"]);
        t.record(&id("a"), Crossing::Entered, Instant::now());
        t.flush();
        assert!(t.active().is_some());

        t.set_order([id("x"), id("y")]);
        assert!(t.active().is_none());
        assert!(t.candidate().is_none());
        assert_eq!(t.order().len(), 2);
    }
}
