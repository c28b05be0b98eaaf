//! Store ↔ bus bridge.
//!
//! Forward direction: every action applied to the host store is republished
//! on the bus twice, as `redux.<action type>` and as [`ANY_ACTION_EVENT`].
//!
//! Reverse direction: [`BridgedStore::connect_sink`] installs the bus's state
//! sink so bus events are projected into the store as actions. The engine
//! never hands `redux.`-prefixed events to the sink, so a projected action
//! that gets republished cannot come back around.

use builderbus_core::event_bus::panic_message;
use builderbus_core::{BusFailure, Event, EventBus, EventType, SinkDisposer, ANY_ACTION_EVENT};
use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{json, Value};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::action::{Action, StoreActionPayload};
use crate::error::BridgeError;
use crate::options::BridgeOptions;

/// Action type prefix for bus events projected into a store.
pub const BUS_EVENT_ACTION_PREFIX: &str = "bus/";

/// A host state store the bridge can wrap
pub trait StateStore: Send {
    /// Snapshot type published alongside each action.
    type State: Serialize;

    /// Apply an action (the store's reducer)
    fn apply(&mut self, action: &Action);

    /// Current state
    fn state(&self) -> &Self::State;
}

/// Republishes applied store actions on the bus
#[derive(Debug, Clone)]
pub struct StoreBridge {
    bus: EventBus,
    options: BridgeOptions,
}

impl StoreBridge {
    /// Bridge that publishes every action
    pub fn new(bus: EventBus) -> Self {
        Self::with_options(bus, BridgeOptions::default())
    }

    /// Bridge with a publishing filter
    pub fn with_options(bus: EventBus, options: BridgeOptions) -> Self {
        Self { bus, options }
    }

    /// The bus actions are published on
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// The publishing filter
    pub fn options(&self) -> &BridgeOptions {
        &self.options
    }

    /// Republish an action that has already been applied to the store
    ///
    /// Failures, including a panicking filter, are logged and reported to
    /// the bus; they never reach the caller and never undo the store update.
    pub fn publish<S: Serialize + ?Sized>(&self, action: &Action, state: &S) {
        self.isolated(action, || {
            if !self.options.allows(action) {
                tracing::trace!(action_type = %action.action_type, "Store action not bridged");
                return Ok(());
            }
            self.try_publish(action, state)
        });
    }

    /// Like [`StoreBridge::publish`] for an action whose gate already passed
    pub(crate) fn publish_unchecked<S: Serialize + ?Sized>(&self, action: &Action, state: &S) {
        self.isolated(action, || self.try_publish(action, state));
    }

    fn isolated(&self, action: &Action, f: impl FnOnce() -> Result<(), BridgeError>) {
        match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => self.report(action, err.to_string()),
            Err(panic) => self.report(action, panic_message(&*panic)),
        }
    }

    fn try_publish<S: Serialize + ?Sized>(
        &self,
        action: &Action,
        state: &S,
    ) -> Result<(), BridgeError> {
        if action.action_type.trim().is_empty() {
            return Err(BridgeError::EmptyActionType);
        }
        let state = serde_json::to_value(state).map_err(BridgeError::StateSnapshot)?;
        let payload = StoreActionPayload {
            action: action.clone(),
            state,
            timestamp: Utc::now(),
        };
        let payload = serde_json::to_value(&payload).map_err(BridgeError::Payload)?;

        self.bus
            .emit(EventType::store_action(&action.action_type), payload.clone());
        self.bus.emit(ANY_ACTION_EVENT, payload);
        Ok(())
    }

    pub(crate) fn report(&self, action: &Action, message: String) {
        self.bus.report(BusFailure::Bridge {
            action_type: action.action_type.clone(),
            message,
        });
    }
}

/// A store whose dispatches are republished through a [`StoreBridge`]
pub struct BridgedStore<S: StateStore> {
    store: Mutex<S>,
    bridge: StoreBridge,
}

impl<S: StateStore> BridgedStore<S> {
    /// Wrap a store
    pub fn new(store: S, bridge: StoreBridge) -> Self {
        Self {
            store: Mutex::new(store),
            bridge,
        }
    }

    /// Apply an action, then republish it on the bus
    ///
    /// The gate is evaluated once, under the store lock together with the
    /// state snapshot. The lock is released before publishing, so handlers
    /// may dispatch into the same store.
    pub fn dispatch(&self, action: Action) {
        let snapshot = {
            let mut store = self.store.lock();
            store.apply(&action);
            let gated = panic::catch_unwind(AssertUnwindSafe(|| {
                self.bridge
                    .options()
                    .allows(&action)
                    .then(|| serde_json::to_value(store.state()))
            }));
            gated
        };

        match snapshot {
            Ok(Some(Ok(state))) => self.bridge.publish_unchecked(&action, &state),
            Ok(Some(Err(err))) => self
                .bridge
                .report(&action, BridgeError::StateSnapshot(err).to_string()),
            Ok(None) => {
                tracing::trace!(action_type = %action.action_type, "Store action not bridged");
            }
            Err(panic) => self.bridge.report(&action, panic_message(&*panic)),
        }
    }

    /// Read the current state
    pub fn with_state<R>(&self, f: impl FnOnce(&S::State) -> R) -> R {
        f(self.store.lock().state())
    }

    /// Read the wrapped store
    pub fn with_store<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.store.lock())
    }

    /// The bridge used for publishing
    pub fn bridge(&self) -> &StoreBridge {
        &self.bridge
    }
}

impl<S: StateStore + 'static> BridgedStore<S> {
    /// Project bus events into this store through the bus's state sink
    ///
    /// `project` maps an event to the action to dispatch, or `None` to
    /// ignore it. The sink holds the store weakly.
    pub fn connect_sink<F>(self: &Arc<Self>, project: F) -> SinkDisposer
    where
        F: Fn(&Event) -> Option<Action> + Send + Sync + 'static,
    {
        let store = Arc::downgrade(self);
        self.bridge.bus().initialize(move |event: Event| {
            let Some(store) = store.upgrade() else {
                return;
            };
            if let Some(action) = project(&event) {
                store.dispatch(action);
            }
        })
    }
}

impl<S: StateStore> std::fmt::Debug for BridgedStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgedStore")
            .field("bridge", &self.bridge)
            .finish_non_exhaustive()
    }
}

/// Default projection: `bus/<event type>` carrying the event payload
pub fn bus_event_action(event: &Event) -> Option<Action> {
    Some(
        Action::new(format!("{BUS_EVENT_ACTION_PREFIX}{}", event.event_type))
            .with_payload(event.payload.clone())
            .with_meta(json!({
                "eventId": event.id.to_string(),
                "createdAt": event.created_at.to_rfc3339(),
            })),
    )
}
