//! Subscription registry: event type → handler set.

use std::collections::HashMap;

use super::event::EventType;
use super::handler::HandlerRef;

/// Maps each event type to its handlers, in insertion order
///
/// A handler appears at most once per type. A type with no handlers has no
/// entry at all.
#[derive(Debug, Default)]
pub(crate) struct SubscriptionRegistry {
    handlers: HashMap<EventType, Vec<HandlerRef>>,
}

impl SubscriptionRegistry {
    /// Add a handler; returns false if it was already registered for the type
    pub(crate) fn add(&mut self, event_type: EventType, handler: HandlerRef) -> bool {
        let set = self.handlers.entry(event_type).or_default();
        if set.iter().any(|h| h.same_as(&handler)) {
            return false;
        }
        set.push(handler);
        true
    }

    /// Remove a handler; returns true if it was registered
    pub(crate) fn remove(&mut self, event_type: &str, handler: &HandlerRef) -> bool {
        let Some(set) = self.handlers.get_mut(event_type) else {
            return false;
        };
        let before = set.len();
        set.retain(|h| !h.same_as(handler));
        let removed = set.len() != before;
        if set.is_empty() {
            self.handlers.remove(event_type);
        }
        removed
    }

    /// Handlers for a type at this moment
    pub(crate) fn snapshot(&self, event_type: &str) -> Vec<HandlerRef> {
        self.handlers.get(event_type).cloned().unwrap_or_default()
    }

    pub(crate) fn contains(&self, event_type: &str, handler: &HandlerRef) -> bool {
        self.handlers
            .get(event_type)
            .is_some_and(|set| set.iter().any(|h| h.same_as(handler)))
    }

    pub(crate) fn listener_count(&self, event_type: &str) -> usize {
        self.handlers.get(event_type).map_or(0, Vec::len)
    }

    /// Types with at least one handler, sorted by name
    pub(crate) fn event_names(&self) -> Vec<EventType> {
        let mut names: Vec<EventType> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    pub(crate) fn total(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }

    pub(crate) fn clear(&mut self) {
        self.handlers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_dedupes_by_identity() {
        let mut registry = SubscriptionRegistry::default();
        let handler = HandlerRef::new(|_| {});

        assert!(registry.add("x".into(), handler.clone()));
        assert!(!registry.add("x".into(), handler.clone()));
        assert_eq!(registry.listener_count("x"), 1);

        // Same handler under another type is a separate subscription
        assert!(registry.add("y".into(), handler));
        assert_eq!(registry.total(), 2);
    }

    #[test]
    fn test_remove_last_drops_entry() {
        let mut registry = SubscriptionRegistry::default();
        let a = HandlerRef::new(|_| {});
        let b = HandlerRef::new(|_| {});
        registry.add("x".into(), a.clone());
        registry.add("x".into(), b.clone());

        assert!(registry.remove("x", &a));
        assert_eq!(registry.event_names(), vec![EventType::new("x")]);

        assert!(registry.remove("x", &b));
        assert!(registry.event_names().is_empty());
        assert_eq!(registry.listener_count("x"), 0);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut registry = SubscriptionRegistry::default();
        let a = HandlerRef::new(|_| {});
        assert!(!registry.remove("x", &a));

        registry.add("x".into(), a.clone());
        assert!(!registry.remove("x", &HandlerRef::new(|_| {})));
        assert_eq!(registry.listener_count("x"), 1);
    }

    #[test]
    fn test_snapshot_preserves_insertion_order() {
        let mut registry = SubscriptionRegistry::default();
        let a = HandlerRef::new(|_| {});
        let b = HandlerRef::new(|_| {});
        registry.add("x".into(), a.clone());
        registry.add("x".into(), b.clone());

        assert_eq!(registry.snapshot("x"), vec![a, b]);
        assert!(registry.snapshot("missing").is_empty());
    }

    #[test]
    fn test_event_names_sorted() {
        let mut registry = SubscriptionRegistry::default();
        registry.add("task.updated".into(), HandlerRef::new(|_| {}));
        registry.add("action.fired".into(), HandlerRef::new(|_| {}));
        assert_eq!(
            registry.event_names(),
            vec![EventType::new("action.fired"), EventType::new("task.updated")]
        );

        registry.clear();
        assert_eq!(registry.total(), 0);
    }
}
