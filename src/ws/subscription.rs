//! Per-connection subscription manager.
//!
//! Tracks which events a WebSocket client follows and provides
//! server-side filtering of the check-in feed.

use std::collections::HashSet;

use crate::domain::EventId;

/// Manages the set of event subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed event IDs. If `subscribe_all` is true, this set is ignored.
    event_ids: HashSet<EventId>,
    /// Whether the client follows every event (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds event IDs to the subscription set, optionally enabling the
    /// wildcard.
    pub fn subscribe(&mut self, ids: &[EventId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        self.event_ids.extend(ids.iter().copied());
    }

    /// Removes event IDs from the subscription set.
    pub fn unsubscribe(&mut self, ids: &[EventId]) {
        for id in ids {
            self.event_ids.remove(id);
        }
    }

    /// Returns `true` if a notification about `event_id` should be
    /// forwarded. Notifications not tied to an event only reach wildcard
    /// subscribers.
    #[must_use]
    pub fn matches(&self, event_id: Option<EventId>) -> bool {
        self.subscribe_all || event_id.is_some_and(|id| self.event_ids.contains(&id))
    }

    /// Returns the number of explicitly subscribed event IDs.
    #[must_use]
    pub fn count(&self) -> usize {
        self.event_ids.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_matches_nothing() {
        let mgr = SubscriptionManager::new();
        assert!(!mgr.matches(Some(EventId::new())));
        assert!(!mgr.matches(None));
    }

    #[test]
    fn subscribe_specific_event() {
        let mut mgr = SubscriptionManager::new();
        let id = EventId::new();
        mgr.subscribe(&[id], false);
        assert!(mgr.matches(Some(id)));
        assert!(!mgr.matches(Some(EventId::new())));
        assert!(!mgr.matches(None));
    }

    #[test]
    fn wildcard_matches_everything() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[], true);
        assert!(mgr.matches(Some(EventId::new())));
        assert!(mgr.matches(None));
        assert!(mgr.is_subscribed_all());
    }

    #[test]
    fn unsubscribe_removes_event() {
        let mut mgr = SubscriptionManager::new();
        let id = EventId::new();
        mgr.subscribe(&[id, EventId::new()], false);
        assert_eq!(mgr.count(), 2);
        mgr.unsubscribe(&[id]);
        assert!(!mgr.matches(Some(id)));
        assert_eq!(mgr.count(), 1);
    }
}
