//! Event Bus implementation.
//!
//! Provides the core EventBus engine and the process-wide default instance.
//!
//! Dispatch is synchronous: `emit` runs middleware, the state sink and every
//! handler on the calling thread before it returns. No lock is held while
//! user code runs, so handlers may emit, subscribe or unsubscribe re-entrantly.

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use tokio::sync::broadcast;

use super::diagnostics::{panic_message, BusFailure, FailureReporter, TracingReporter};
use super::event::{Event, EventEnvelope, EventType};
use super::events::BusEvent;
use super::handler::{HandlerOutcome, HandlerOutput, HandlerRef, WeakHandlerRef};
use super::history::HistoryBuffer;
use super::middleware::{claim, Chain, Middleware, Next};
use super::registry::SubscriptionRegistry;
use super::sink::{SinkDisposer, SinkSlot};
use crate::config::EventBusConfig;

/// Removes the subscription created by `on`/`once`
///
/// Dropping it leaves the subscription active; call
/// [`Unsubscribe::unsubscribe`] to remove it.
#[must_use = "the subscription stays active until `unsubscribe` is called"]
#[derive(Debug)]
pub struct Unsubscribe {
    target: Option<(Weak<BusInner>, EventType, HandlerRef)>,
}

impl Unsubscribe {
    /// An unsubscribe that does nothing, returned for rejected subscriptions
    pub fn noop() -> Self {
        Self { target: None }
    }

    /// Whether this came from a rejected subscription
    pub fn is_noop(&self) -> bool {
        self.target.is_none()
    }

    /// The subscribed handler, usable with [`EventBus::off`]
    pub fn handler(&self) -> Option<&HandlerRef> {
        self.target.as_ref().map(|(_, _, handler)| handler)
    }

    /// Whether the handler is still registered on a live bus
    ///
    /// Turns false once a `once` subscription has fired, or after
    /// [`EventBus::off`] or [`EventBus::clear`] removed it.
    pub fn is_active(&self) -> bool {
        self.target.as_ref().is_some_and(|(bus, event_type, handler)| {
            bus.upgrade().is_some_and(|inner| {
                inner.registry.read().contains(event_type.as_str(), handler)
            })
        })
    }

    /// Remove the subscription; safe to call after the handler is gone
    pub fn unsubscribe(self) {
        if let Some((bus, event_type, handler)) = self.target {
            if let Some(inner) = bus.upgrade() {
                EventBus { inner }.off(event_type, &handler);
            }
        }
    }
}

pub(crate) struct BusInner {
    config: EventBusConfig,
    registry: RwLock<SubscriptionRegistry>,
    middleware: RwLock<Chain>,
    history: Mutex<HistoryBuffer>,
    pub(crate) sink: Mutex<SinkSlot>,
    sender: broadcast::Sender<Event>,
    reporter: Arc<dyn FailureReporter>,
}

/// Central event bus for application-wide event distribution
///
/// Cloning is cheap and yields another handle to the same bus.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    /// Create a new event bus with default configuration
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    /// Create a new event bus with custom configuration
    pub fn with_config(config: EventBusConfig) -> Self {
        Self::with_reporter(config, Arc::new(TracingReporter))
    }

    /// Create a new event bus that reports suppressed failures to `reporter`
    pub fn with_reporter(config: EventBusConfig, reporter: Arc<dyn FailureReporter>) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            inner: Arc::new(BusInner {
                history: Mutex::new(HistoryBuffer::new(config.max_history_size)),
                registry: RwLock::new(SubscriptionRegistry::default()),
                middleware: RwLock::new(Arc::new(Vec::new())),
                sink: Mutex::new(SinkSlot::default()),
                sender,
                reporter,
                config,
            }),
        }
    }

    /// Publish an event to all subscribers
    ///
    /// An empty type is ignored with a warning. Nothing raised while
    /// emitting reaches the caller.
    pub fn emit(&self, event_type: impl Into<EventType>, payload: Value) {
        let event_type = event_type.into();
        if event_type.is_empty() {
            self.report(BusFailure::InvalidInput {
                operation: "emit",
                reason: "event type is empty".to_string(),
            });
            return;
        }

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let chain = Arc::clone(&*self.inner.middleware.read());
            self.run_chain(chain, 0, event_type.clone(), payload);
        }));
        if let Err(panic) = outcome {
            self.report(BusFailure::Emit {
                event_type,
                message: panic_message(&*panic),
            });
        }
    }

    /// Publish a typed event under its declared type
    pub fn emit_event<E: BusEvent>(&self, payload: E) {
        match serde_json::to_value(&payload) {
            Ok(value) => self.emit(E::TYPE, value),
            Err(err) => self.report(BusFailure::Emit {
                event_type: E::event_type(),
                message: format!("payload serialization failed: {err}"),
            }),
        }
    }

    /// Subscribe a handler to an event type
    ///
    /// The handler is called on the emitting thread with its own copy of
    /// each event; it should return quickly.
    pub fn on<F, R>(&self, event_type: impl Into<EventType>, handler: F) -> Unsubscribe
    where
        F: Fn(Event) -> R + Send + Sync + 'static,
        R: HandlerOutput,
    {
        self.subscribe(event_type, HandlerRef::new(handler))
    }

    /// Subscribe a typed handler to its declared event type
    ///
    /// A payload that does not decode is reported as a handler failure.
    pub fn on_event<E, F, R>(&self, handler: F) -> Unsubscribe
    where
        E: BusEvent,
        F: Fn(Event<E>) -> R + Send + Sync + 'static,
        R: HandlerOutput,
    {
        self.subscribe(E::TYPE, typed_handler(handler))
    }

    /// Subscribe an existing handler reference
    ///
    /// Subscribing the same reference twice to one type is a no-op.
    pub fn subscribe(&self, event_type: impl Into<EventType>, handler: HandlerRef) -> Unsubscribe {
        let event_type = event_type.into();
        if event_type.is_empty() {
            self.report(BusFailure::InvalidInput {
                operation: "on",
                reason: "event type is empty".to_string(),
            });
            return Unsubscribe::noop();
        }

        if self
            .inner
            .registry
            .write()
            .add(event_type.clone(), handler.clone())
        {
            tracing::debug!(event_type = %event_type, ?handler, "Subscription added");
        }
        Unsubscribe {
            target: Some((Arc::downgrade(&self.inner), event_type, handler)),
        }
    }

    /// Unsubscribe a handler; unknown handlers are ignored
    pub fn off(&self, event_type: impl Into<EventType>, handler: &HandlerRef) {
        let event_type = event_type.into();
        if self.inner.registry.write().remove(event_type.as_str(), handler) {
            tracing::debug!(event_type = %event_type, ?handler, "Subscription removed");
        }
    }

    /// Subscribe a handler that runs for the next matching event only
    ///
    /// The subscription removes itself before delegating, so the handler is
    /// invoked exactly once even if it emits the same type re-entrantly.
    pub fn once<F, R>(&self, event_type: impl Into<EventType>, handler: F) -> Unsubscribe
    where
        F: Fn(Event) -> R + Send + Sync + 'static,
        R: HandlerOutput,
    {
        let event_type = event_type.into();
        let fired = AtomicBool::new(false);
        let this: Arc<OnceLock<WeakHandlerRef>> = Arc::new(OnceLock::new());
        let bus = Arc::downgrade(&self.inner);
        let wrapper_type = event_type.clone();
        let this_ref = Arc::clone(&this);

        let wrapper = HandlerRef::new(move |event: Event| -> HandlerOutcome {
            if fired.swap(true, Ordering::SeqCst) {
                return Ok(());
            }
            let me = this_ref.get().and_then(WeakHandlerRef::upgrade);
            if let (Some(inner), Some(me)) = (bus.upgrade(), me) {
                EventBus { inner }.off(&wrapper_type, &me);
            }
            handler(event).into_outcome()
        });
        let _ = this.set(wrapper.downgrade());
        self.subscribe(event_type, wrapper)
    }

    /// Typed variant of [`EventBus::once`]
    pub fn once_event<E, F, R>(&self, handler: F) -> Unsubscribe
    where
        E: BusEvent,
        F: Fn(Event<E>) -> R + Send + Sync + 'static,
        R: HandlerOutput,
    {
        let typed = typed_handler(handler);
        self.once(E::TYPE, move |event| typed.call(event))
    }

    /// Append a middleware to the chain
    pub fn use_middleware<M: Middleware + 'static>(&self, middleware: M) {
        let mut chain = self.inner.middleware.write();
        let mut next: Vec<Arc<dyn Middleware>> = chain.iter().cloned().collect();
        next.push(Arc::new(middleware));
        *chain = Arc::new(next);
        tracing::debug!(middleware_count = chain.len(), "Middleware added");
    }

    /// Install the state sink, replacing any existing one with a warning
    ///
    /// The sink receives a copy of every dispatched event except those the
    /// store bridge republished.
    pub fn initialize<F, R>(&self, sink: F) -> SinkDisposer
    where
        F: Fn(Event) -> R + Send + Sync + 'static,
        R: HandlerOutput,
    {
        let generation = self
            .inner
            .sink
            .lock()
            .install(Arc::new(move |event| sink(event).into_outcome()));
        tracing::debug!(generation, "State sink installed");
        SinkDisposer::new(Arc::downgrade(&self.inner), generation)
    }

    /// Whether a state sink is installed
    pub fn has_sink(&self) -> bool {
        self.inner.sink.lock().is_installed()
    }

    /// Get a receiver for manual event polling
    ///
    /// Receivers see every dispatched event, for async consumers running in
    /// a tokio task. A receiver that falls behind loses the oldest events.
    pub fn receiver(&self) -> broadcast::Receiver<Event> {
        self.inner.sender.subscribe()
    }

    /// Drop all handlers, history and middleware
    pub fn clear(&self) {
        let mut registry = self.inner.registry.write();
        let mut middleware = self.inner.middleware.write();
        let mut history = self.inner.history.lock();
        registry.clear();
        *middleware = Arc::new(Vec::new());
        history.clear();
        tracing::debug!("Event bus cleared");
    }

    /// Number of handlers subscribed to a type
    pub fn listener_count(&self, event_type: impl AsRef<str>) -> usize {
        self.inner.registry.read().listener_count(event_type.as_ref())
    }

    /// Types that currently have at least one handler
    pub fn event_names(&self) -> Vec<EventType> {
        self.inner.registry.read().event_names()
    }

    /// Total number of subscriptions across all types
    pub fn subscriber_count(&self) -> usize {
        self.inner.registry.read().total()
    }

    /// Copy of the event history, oldest first (empty when disabled)
    pub fn history(&self) -> Vec<EventEnvelope> {
        if !self.inner.config.enable_history {
            return Vec::new();
        }
        self.inner.history.lock().snapshot()
    }

    /// Get the current configuration
    pub fn config(&self) -> &EventBusConfig {
        &self.inner.config
    }

    /// Hand a failure to this bus's reporter
    pub fn report(&self, failure: BusFailure) {
        self.inner.reporter.report(&failure);
    }

    /// Whether both handles refer to the same bus
    pub fn same_bus(&self, other: &EventBus) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Run middleware from `index` onwards, then dispatch
    pub(crate) fn run_chain(
        &self,
        chain: Chain,
        index: usize,
        event_type: EventType,
        payload: Value,
    ) {
        let Some(middleware) = chain.get(index).cloned() else {
            self.dispatch(event_type, payload);
            return;
        };

        let advanced = Arc::new(AtomicBool::new(false));
        let next = Next::new(
            self.clone(),
            Arc::clone(&chain),
            index + 1,
            event_type.clone(),
            Arc::clone(&advanced),
        );
        let fallback = payload.clone();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            middleware.handle(&event_type, payload, next)
        }));

        if let Err(panic) = outcome {
            self.report(BusFailure::Middleware {
                event_type: event_type.clone(),
                index,
                message: panic_message(&*panic),
            });
            if claim(&advanced) {
                self.run_chain(chain, index + 1, event_type, fallback);
            }
        }
    }

    /// Build the event and deliver it to the sink, receivers and handlers
    fn dispatch(&self, event_type: EventType, payload: Value) {
        let event = Event::new(event_type, payload);

        if !event.event_type.is_store_action() {
            let sink = self.inner.sink.lock().get();
            if let Some(sink) = sink {
                let copy = event.clone();
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| sink(copy)));
                if let Some(message) = failure_message(outcome) {
                    self.report(BusFailure::Sink {
                        event_type: event.event_type.clone(),
                        message,
                    });
                }
            }
        }

        if self.inner.sender.receiver_count() > 0 {
            // Lagging receivers are not our concern; send never blocks
            let _ = self.inner.sender.send(event.clone());
        }

        let handlers = self.inner.registry.read().snapshot(event.event_type.as_str());
        if handlers.is_empty() {
            tracing::trace!(event_type = %event.event_type, "No handlers for event");
            return;
        }

        if self.inner.config.enable_history {
            self.inner.history.lock().push(event.envelope());
        }

        for handler in handlers {
            let copy = event.clone();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler.call(copy)));
            if let Some(message) = failure_message(outcome) {
                self.report(BusFailure::Handler {
                    event_type: event.event_type.clone(),
                    message,
                });
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("middleware", &self.inner.middleware.read().len())
            .field("has_sink", &self.has_sink())
            .field("config", &self.inner.config)
            .finish()
    }
}

fn typed_handler<E, F, R>(handler: F) -> HandlerRef
where
    E: BusEvent,
    F: Fn(Event<E>) -> R + Send + Sync + 'static,
    R: HandlerOutput,
{
    HandlerRef::new(move |event: Event| -> HandlerOutcome {
        let typed = event.decode::<E>().map_err(|err| err.to_string())?;
        handler(typed).into_outcome()
    })
}

fn failure_message(
    outcome: std::thread::Result<HandlerOutcome>,
) -> Option<String> {
    match outcome {
        Ok(Ok(())) => None,
        Ok(Err(message)) => Some(message),
        Err(panic) => Some(panic_message(&*panic)),
    }
}

/// Global event bus instance
static EVENT_BUS: OnceLock<EventBus> = OnceLock::new();

/// Get or initialize the global event bus
///
/// Prefer passing an explicit [`EventBus`] from the composition root; the
/// global instance exists for code that has no such handle.
pub fn event_bus() -> &'static EventBus {
    EVENT_BUS.get_or_init(EventBus::new)
}

/// Initialize the global event bus with custom configuration
///
/// Must be called before any calls to `event_bus()`. Returns the rejected
/// configuration if the event bus has already been initialized.
pub fn init_event_bus(config: EventBusConfig) -> Result<(), EventBusConfig> {
    let mut rejected = Some(config.clone());
    EVENT_BUS.get_or_init(|| {
        rejected = None;
        EventBus::with_config(config)
    });
    match rejected {
        Some(config) => Err(config),
        None => Ok(()),
    }
}

/// Convenience macro to publish an event to the global event bus
#[macro_export]
macro_rules! emit {
    ($event_type:expr, $payload:expr) => {
        $crate::event_bus::event_bus().emit($event_type, $payload)
    };
}

/// Convenience macro to subscribe to events on the global event bus
#[macro_export]
macro_rules! on_event {
    ($event_type:expr, $handler:expr) => {
        $crate::event_bus::event_bus().on($event_type, $handler)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::diagnostics::{FailureCounters, FailureKind};
    use crate::event_bus::events::{TaskCreated, TaskDeleted};
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    fn counting_bus() -> (EventBus, Arc<FailureCounters>) {
        let counters = Arc::new(FailureCounters::new());
        let bus = EventBus::with_reporter(EventBusConfig::default(), counters.clone());
        (bus, counters)
    }

    #[test]
    fn test_event_bus_creation() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count(), 0);
        assert!(bus.event_names().is_empty());
        assert!(!bus.has_sink());
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let bus = EventBus::new();

        let sub = bus.on("x", |_| {});
        assert_eq!(bus.listener_count("x"), 1);

        sub.unsubscribe();
        assert_eq!(bus.listener_count("x"), 0);
        assert!(bus.event_names().is_empty());
    }

    #[test]
    fn test_event_delivery() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        let _sub = bus.on("task.created", move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit("task.created", json!({"id": "t1"}));
        bus.emit("task.deleted", json!({"id": "t1"}));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_type_rejected() {
        let (bus, counters) = counting_bus();

        bus.emit("", json!({}));
        let sub = bus.on("  ", |_| {});

        assert!(sub.is_noop());
        sub.unsubscribe();
        assert!(bus.event_names().is_empty());
        assert_eq!(counters.count(FailureKind::InvalidInput), 2);
    }

    #[test]
    fn test_off_is_idempotent() {
        let bus = EventBus::new();
        let handler = HandlerRef::new(|_| {});
        let _ = bus.subscribe("x", handler.clone());

        bus.off("x", &handler);
        bus.off("x", &handler);
        bus.off("never", &handler);
        assert_eq!(bus.listener_count("x"), 0);
    }

    #[test]
    fn test_duplicate_subscription_invoked_once() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();
        let handler = HandlerRef::new(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        let _ = bus.subscribe("x", handler.clone());
        let _ = bus.subscribe("x", handler);
        assert_eq!(bus.listener_count("x"), 1);

        bus.emit("x", json!({}));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_result_error_reported() {
        let (bus, counters) = counting_bus();
        let _ = bus.on("x", |_| -> Result<(), String> { Err("rejected".into()) });

        bus.emit("x", json!({}));
        assert_eq!(counters.count(FailureKind::Handler), 1);
        assert_eq!(
            counters.last(),
            Some(BusFailure::Handler {
                event_type: "x".into(),
                message: "rejected".into()
            })
        );
    }

    #[test]
    fn test_typed_round_trip() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        let _ = bus.on_event::<TaskCreated, _, _>(move |event| {
            s.lock().push(event.payload.id);
        });

        bus.emit_event(TaskCreated {
            id: "t1".into(),
            title: Some("Write docs".into()),
        });
        assert_eq!(*seen.lock(), vec!["t1".to_string()]);
    }

    #[test]
    fn test_typed_decode_failure_reported() {
        let (bus, counters) = counting_bus();
        let _ = bus.on_event::<TaskDeleted, _, _>(|_| {});

        bus.emit("task.deleted", json!({"wrong": true}));
        assert_eq!(counters.count(FailureKind::Handler), 1);
    }

    #[test]
    fn test_once_event() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();
        let _ = bus.once_event::<TaskDeleted, _, _>(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit_event(TaskDeleted { id: "a".into() });
        bus.emit_event(TaskDeleted { id: "b".into() });
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(bus.listener_count(TaskDeleted::TYPE), 0);
    }

    #[test]
    fn test_once_reentrant_emit() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();
        let inner_bus = bus.clone();
        let _ = bus.once("x", move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            inner_bus.emit("x", json!({}));
        });

        bus.emit("x", json!({}));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handler_can_unsubscribe_sibling() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let sibling = {
            let c = counter.clone();
            HandlerRef::new(move |_| {
                c.fetch_add(1, Ordering::SeqCst);
            })
        };
        let remover = {
            let bus = bus.clone();
            let sibling = sibling.clone();
            move |_: Event| bus.off("x", &sibling)
        };
        let _ = bus.on("x", remover);
        let _ = bus.subscribe("x", sibling);

        // Snapshot taken before dispatch: the sibling still runs this time
        bus.emit("x", json!({}));
        bus.emit("x", json!({}));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_middleware_panic_continues() {
        let (bus, counters) = counting_bus();
        bus.use_middleware(|_: &EventType, _: Value, _: Next| panic!("middleware broke"));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        let _ = bus.on("x", move |event| s.lock().push(event.payload));

        bus.emit("x", json!({"n": 1}));
        assert_eq!(*seen.lock(), vec![json!({"n": 1})]);
        assert_eq!(counters.count(FailureKind::Middleware), 1);
    }

    #[test]
    fn test_middleware_panic_after_next_does_not_redispatch() {
        let (bus, counters) = counting_bus();
        bus.use_middleware(|_: &EventType, payload: Value, next: Next| {
            next.run(payload);
            panic!("late failure");
        });
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();
        let _ = bus.on("x", move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit("x", json!({}));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(counters.count(FailureKind::Middleware), 1);
    }

    #[test]
    fn test_middleware_panic_after_parking_next_dispatches_once() {
        let (bus, counters) = counting_bus();
        let parked: Arc<Mutex<Option<(Value, Next)>>> = Arc::new(Mutex::new(None));
        let slot = parked.clone();
        bus.use_middleware(move |_: &EventType, payload: Value, next: Next| {
            *slot.lock() = Some((payload, next));
            panic!("failed after deferring");
        });
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();
        let _ = bus.on("x", move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit("x", json!({}));
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        let (payload, next) = parked.lock().take().unwrap();
        next.run(payload);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(counters.count(FailureKind::Middleware), 1);
    }

    #[test]
    fn test_unsubscribe_is_active_tracks_registry() {
        let bus = EventBus::new();
        let once = bus.once("x", |_| {});
        let regular = bus.on("x", |_| {});
        assert!(once.is_active());
        assert!(regular.is_active());
        assert!(!Unsubscribe::noop().is_active());

        bus.emit("x", json!({}));
        assert!(!once.is_active());
        assert!(regular.is_active());

        bus.clear();
        assert!(!regular.is_active());
    }

    #[test]
    fn test_sink_receives_copies_and_skips_store_actions() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        let disposer = bus.initialize(move |event: Event| s.lock().push(event.event_type));

        bus.emit("task.created", json!({}));
        bus.emit("redux.tasks/add", json!({}));
        bus.emit("redux.*", json!({}));
        assert_eq!(*seen.lock(), vec![EventType::new("task.created")]);

        assert!(disposer.dispose());
        assert!(!bus.has_sink());
        bus.emit("task.created", json!({}));
        assert_eq!(seen.lock().len(), 1);
    }

    #[test]
    fn test_sink_failure_does_not_block_handlers() {
        let (bus, counters) = counting_bus();
        let _disposer = bus.initialize::<_, ()>(|_| panic!("sink down"));
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();
        let _ = bus.on("x", move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit("x", json!({}));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(counters.count(FailureKind::Sink), 1);
    }

    #[test]
    fn test_sink_overwrite_keeps_newest() {
        let bus = EventBus::new();
        let first = bus.initialize(|_| {});
        let second = bus.initialize(|_| {});

        assert!(!first.dispose());
        assert!(bus.has_sink());
        assert!(second.dispose());
        assert!(!bus.has_sink());
    }

    #[test]
    fn test_history_disabled_by_default() {
        let bus = EventBus::new();
        let _ = bus.on("x", |_| {});
        bus.emit("x", json!({}));
        assert!(bus.history().is_empty());
    }

    #[test]
    fn test_history_skips_unobserved_types() {
        let bus = EventBus::with_config(EventBusConfig::with_history(10));
        let _ = bus.on("tracked", |_| {});

        bus.emit("tracked", json!({}));
        bus.emit("untracked", json!({}));

        let history = bus.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].event_type, "tracked");
    }

    #[test]
    fn test_clear_drops_everything() {
        let bus = EventBus::with_config(EventBusConfig::with_history(10));
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();
        bus.use_middleware(move |_: &EventType, payload: Value, next: Next| {
            c.fetch_add(1, Ordering::SeqCst);
            next.run(payload);
        });
        let _ = bus.on("x", |_| {});
        bus.emit("x", json!({}));
        assert_eq!(bus.history().len(), 1);

        bus.clear();
        assert_eq!(bus.listener_count("x"), 0);
        assert!(bus.event_names().is_empty());
        assert!(bus.history().is_empty());

        bus.emit("x", json!({}));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_after_bus_dropped() {
        let bus = EventBus::new();
        let sub = bus.on("x", |_| {});
        let disposer = bus.initialize(|_| {});
        drop(bus);

        sub.unsubscribe();
        assert!(!disposer.dispose());
    }

    #[test]
    fn test_same_bus() {
        let bus = EventBus::new();
        assert!(bus.same_bus(&bus.clone()));
        assert!(!bus.same_bus(&EventBus::new()));
    }

    #[test]
    fn test_global_bus() {
        let a = event_bus();
        let b = event_bus();
        assert!(a.same_bus(b));
        assert!(init_event_bus(EventBusConfig::default()).is_err());
    }

    #[tokio::test]
    async fn test_async_receiver() {
        let bus = EventBus::new();
        let mut receiver = bus.receiver();

        bus.emit("task.created", json!({"id": "t1"}));

        let received = receiver.recv().await.expect("event should be delivered");
        assert_eq!(received.event_type, "task.created");
        assert_eq!(received.payload, json!({"id": "t1"}));
    }
}
