//! Mount-scoped subscriptions and emit helpers.
//!
//! A component subscribes when it mounts and must unsubscribe exactly once
//! when it unmounts. [`EventSubscription`] ties both to a value: creating it
//! subscribes, dropping (or [`EventSubscription::unmount`]) unsubscribes.
//! Re-renders call [`EventSubscription::update_handler`] so the bus always
//! invokes the latest closure without resubscribing.

use builderbus_core::{
    BusEvent, Event, EventBus, EventType, HandlerOutput, HandlerRef, Unsubscribe,
};
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;

use crate::scope::current_bus;

/// A live, mount-scoped subscription
#[must_use = "dropping the subscription unsubscribes immediately"]
#[derive(Debug)]
pub struct EventSubscription {
    event_type: EventType,
    latest: Arc<RwLock<HandlerRef>>,
    unsubscribe: Option<Unsubscribe>,
}

impl EventSubscription {
    fn mount(
        event_type: EventType,
        handler: HandlerRef,
        subscribe: impl FnOnce(HandlerRef) -> Unsubscribe,
    ) -> Self {
        let latest = Arc::new(RwLock::new(handler));
        let cell = Arc::clone(&latest);
        let trampoline = HandlerRef::new(move |event: Event| {
            let current = cell.read().clone();
            current.call(event)
        });
        let unsubscribe = subscribe(trampoline);
        Self {
            event_type,
            latest,
            unsubscribe: Some(unsubscribe),
        }
    }

    /// Replace the handler; the next emission calls the new closure
    pub fn update_handler<F, R>(&self, handler: F)
    where
        F: Fn(Event) -> R + Send + Sync + 'static,
        R: HandlerOutput,
    {
        *self.latest.write() = HandlerRef::new(handler);
    }

    /// The subscribed event type
    pub fn event_type(&self) -> &EventType {
        &self.event_type
    }

    /// Whether the handler is still registered on the bus
    ///
    /// False after unmounting, and also once a one-shot subscription has
    /// fired or the bus was cleared.
    pub fn is_mounted(&self) -> bool {
        self.unsubscribe.as_ref().is_some_and(Unsubscribe::is_active)
    }

    /// Unsubscribe now; later calls and the eventual drop do nothing
    pub fn unmount(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe.unsubscribe();
            tracing::trace!(event_type = %self.event_type, "Subscription unmounted");
        }
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Subscribe for the lifetime of the returned value
pub fn use_event<F, R>(
    bus: &EventBus,
    event_type: impl Into<EventType>,
    handler: F,
) -> EventSubscription
where
    F: Fn(Event) -> R + Send + Sync + 'static,
    R: HandlerOutput,
{
    let event_type = event_type.into();
    let key = event_type.clone();
    EventSubscription::mount(event_type, HandlerRef::new(handler), |trampoline| {
        bus.subscribe(key, trampoline)
    })
}

/// Typed variant of [`use_event`]
pub fn use_typed_event<E, F, R>(bus: &EventBus, handler: F) -> EventSubscription
where
    E: BusEvent,
    F: Fn(Event<E>) -> R + Send + Sync + 'static,
    R: HandlerOutput,
{
    use_event(bus, E::TYPE, move |event: Event| -> Result<(), String> {
        let typed = event.decode::<E>().map_err(|err| err.to_string())?;
        handler(typed).into_outcome()
    })
}

/// Subscribe for at most one event, for the lifetime of the returned value
pub fn use_event_once<F, R>(
    bus: &EventBus,
    event_type: impl Into<EventType>,
    handler: F,
) -> EventSubscription
where
    F: Fn(Event) -> R + Send + Sync + 'static,
    R: HandlerOutput,
{
    let event_type = event_type.into();
    let key = event_type.clone();
    EventSubscription::mount(event_type, HandlerRef::new(handler), |trampoline| {
        bus.once(key, move |event| trampoline.call(event))
    })
}

/// Stable emit helper bound to one bus
///
/// Clones share identity: a component can create it once and hand copies to
/// children without them seeing a "new" callback on every render.
#[derive(Debug, Clone)]
pub struct Emitter {
    bus: EventBus,
}

impl Emitter {
    /// Bind an emitter to a bus
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }

    /// Forward to [`EventBus::emit`]
    pub fn emit(&self, event_type: impl Into<EventType>, payload: Value) {
        self.bus.emit(event_type, payload);
    }

    /// Forward to [`EventBus::emit_event`]
    pub fn emit_event<E: BusEvent>(&self, payload: E) {
        self.bus.emit_event(payload);
    }

    /// Whether both emitters forward to the same bus
    pub fn same_as(&self, other: &Emitter) -> bool {
        self.bus.same_bus(&other.bus)
    }
}

/// Emitter for the given bus
pub fn use_emitter(bus: &EventBus) -> Emitter {
    Emitter::new(bus.clone())
}

/// All subscriptions of one component, torn down together
#[derive(Debug)]
pub struct ComponentScope {
    bus: EventBus,
    subscriptions: Vec<EventSubscription>,
}

impl ComponentScope {
    /// Scope bound to an explicit bus
    pub fn new(bus: EventBus) -> Self {
        Self {
            bus,
            subscriptions: Vec::new(),
        }
    }

    /// Scope bound to the ambient bus (see [`current_bus`])
    pub fn from_context() -> Self {
        Self::new(current_bus())
    }

    /// Subscribe until the scope unmounts
    pub fn on<F, R>(
        &mut self,
        event_type: impl Into<EventType>,
        handler: F,
    ) -> &EventSubscription
    where
        F: Fn(Event) -> R + Send + Sync + 'static,
        R: HandlerOutput,
    {
        let subscription = use_event(&self.bus, event_type, handler);
        self.push(subscription)
    }

    /// Subscribe for one event, until the scope unmounts
    pub fn once<F, R>(
        &mut self,
        event_type: impl Into<EventType>,
        handler: F,
    ) -> &EventSubscription
    where
        F: Fn(Event) -> R + Send + Sync + 'static,
        R: HandlerOutput,
    {
        let subscription = use_event_once(&self.bus, event_type, handler);
        self.push(subscription)
    }

    /// Emitter for this scope's bus
    pub fn emitter(&self) -> Emitter {
        use_emitter(&self.bus)
    }

    /// Number of subscriptions held
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Whether the scope holds no subscriptions
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Unsubscribe everything
    pub fn unmount(&mut self) {
        for mut subscription in self.subscriptions.drain(..) {
            subscription.unmount();
        }
    }

    fn push(&mut self, subscription: EventSubscription) -> &EventSubscription {
        self.subscriptions.push(subscription);
        &self.subscriptions[self.subscriptions.len() - 1]
    }
}

impl Drop for ComponentScope {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use builderbus_core::{NotificationLevel, NotificationShown};
    use parking_lot::Mutex;
    use serde_json::json;

    fn calls() -> Arc<Mutex<Vec<&'static str>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[test]
    fn test_subscribe_on_mount_unsubscribe_on_drop() {
        let bus = EventBus::new();
        {
            let subscription = use_event(&bus, "x", |_| {});
            assert!(subscription.is_mounted());
            assert_eq!(bus.listener_count("x"), 1);
        }
        assert_eq!(bus.listener_count("x"), 0);
    }

    #[test]
    fn test_unmount_is_idempotent() {
        let bus = EventBus::new();
        let mut subscription = use_event(&bus, "x", |_| {});
        let other = bus.on("x", |_| {});

        subscription.unmount();
        assert!(!subscription.is_mounted());
        subscription.unmount();
        drop(subscription);

        assert_eq!(bus.listener_count("x"), 1);
        other.unsubscribe();
    }

    #[test]
    fn test_latest_handler_is_called() {
        let bus = EventBus::new();
        let seen = calls();

        let s = seen.clone();
        let subscription = use_event(&bus, "x", move |_| s.lock().push("first render"));
        bus.emit("x", json!({}));

        let s = seen.clone();
        subscription.update_handler(move |_| s.lock().push("second render"));
        bus.emit("x", json!({}));

        assert_eq!(*seen.lock(), vec!["first render", "second render"]);
        assert_eq!(bus.listener_count("x"), 1);
    }

    #[test]
    fn test_once_binding() {
        let bus = EventBus::new();
        let seen = calls();
        let s = seen.clone();
        let subscription = use_event_once(&bus, "x", move |_| s.lock().push("fired"));

        bus.emit("x", json!({}));
        bus.emit("x", json!({}));

        assert_eq!(*seen.lock(), vec!["fired"]);
        assert_eq!(bus.listener_count("x"), 0);
        assert!(!subscription.is_mounted());
        drop(subscription);
    }

    #[test]
    fn test_once_binding_dropped_before_firing() {
        let bus = EventBus::new();
        let seen = calls();
        let s = seen.clone();
        drop(use_event_once(&bus, "x", move |_| s.lock().push("fired")));

        bus.emit("x", json!({}));
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn test_typed_binding() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        let _subscription = use_typed_event::<NotificationShown, _, _>(&bus, move |event| {
            s.lock().push(event.payload.level)
        });

        use_emitter(&bus).emit_event(NotificationShown {
            message: "Saved".into(),
            level: NotificationLevel::Success,
        });
        assert_eq!(*seen.lock(), vec![NotificationLevel::Success]);
    }

    #[test]
    fn test_emitter_identity_is_stable() {
        let bus = EventBus::new();
        let emitter = use_emitter(&bus);
        let copy = emitter.clone();
        assert!(emitter.same_as(&copy));
        assert!(emitter.same_as(&use_emitter(&bus)));
        assert!(!emitter.same_as(&use_emitter(&EventBus::new())));
    }

    #[test]
    fn test_component_scope_teardown() {
        let bus = EventBus::new();
        let seen = calls();
        {
            let mut scope = ComponentScope::new(bus.clone());
            let s = seen.clone();
            scope.on("task.created", move |_| s.lock().push("task"));
            let s = seen.clone();
            scope.once("screen.created", move |_| s.lock().push("screen"));
            assert_eq!(scope.len(), 2);

            scope.emitter().emit("task.created", json!({"id": "t1"}));
            assert_eq!(bus.event_names().len(), 2);
        }
        assert!(bus.event_names().is_empty());

        bus.emit("task.created", json!({"id": "t2"}));
        assert_eq!(*seen.lock(), vec!["task"]);
    }
}
