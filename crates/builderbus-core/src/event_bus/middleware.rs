//! Middleware chain.
//!
//! Middleware run in registration order before an event is built and
//! dispatched. Each one receives the payload by value plus a [`Next`]
//! continuation and decides what happens to the emission:
//!
//! - `next.run(payload)` continues, possibly with a modified payload
//! - moving `next` elsewhere and running it later defers everything downstream
//! - dropping `next` cancels the emission (no sink, no handlers)
//!
//! A middleware that panics before running `next` is reported and skipped:
//! the chain continues with the payload it was given, and a `next` it parked
//! before panicking becomes inert.

use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::bus::EventBus;
use super::event::EventType;

/// Interceptor run before handler dispatch
pub trait Middleware: Send + Sync {
    /// Inspect or transform an emission, then run, defer or drop `next`
    fn handle(&self, event_type: &EventType, payload: Value, next: Next);
}

impl<F> Middleware for F
where
    F: Fn(&EventType, Value, Next) + Send + Sync,
{
    fn handle(&self, event_type: &EventType, payload: Value, next: Next) {
        self(event_type, payload, next)
    }
}

pub(crate) type Chain = Arc<Vec<Arc<dyn Middleware>>>;

/// Take the right to continue past one middleware; true for the first caller only
pub(crate) fn claim(advanced: &AtomicBool) -> bool {
    advanced
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_ok()
}

/// Continuation to the rest of the chain
///
/// Owned and `Send`, so a middleware may hand it to another task and run it
/// later. Running it consumes it; an emission continues at most once per
/// middleware.
pub struct Next {
    bus: EventBus,
    chain: Chain,
    index: usize,
    event_type: EventType,
    advanced: Arc<AtomicBool>,
}

impl Next {
    pub(crate) fn new(
        bus: EventBus,
        chain: Chain,
        index: usize,
        event_type: EventType,
        advanced: Arc<AtomicBool>,
    ) -> Self {
        Self {
            bus,
            chain,
            index,
            event_type,
            advanced,
        }
    }

    /// Continue the emission with the given payload
    ///
    /// Does nothing if the bus already continued past this middleware
    /// because it panicked while holding `next`.
    pub fn run(self, payload: Value) {
        if !claim(&self.advanced) {
            tracing::debug!(
                event_type = %self.event_type,
                index = self.index,
                "Continuation already claimed"
            );
            return;
        }
        self.bus
            .run_chain(self.chain, self.index, self.event_type, payload);
    }

    /// The event type being emitted
    pub fn event_type(&self) -> &EventType {
        &self.event_type
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("event_type", &self.event_type)
            .field("index", &self.index)
            .field("chain_len", &self.chain.len())
            .finish()
    }
}

/// Logs every emission at debug level
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingMiddleware;

impl Middleware for LoggingMiddleware {
    fn handle(&self, event_type: &EventType, payload: Value, next: Next) {
        tracing::debug!(event_type = %event_type, %payload, "Emitting event");
        next.run(payload);
    }
}

/// Drops emissions whose type is on a deny list
#[derive(Debug, Clone, Default)]
pub struct TypeFilter {
    denied: HashSet<EventType>,
}

impl TypeFilter {
    /// Deny the given event types
    pub fn deny<I, T>(types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<EventType>,
    {
        Self {
            denied: types.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether the type passes the filter
    pub fn allows(&self, event_type: &EventType) -> bool {
        !self.denied.contains(event_type)
    }
}

impl Middleware for TypeFilter {
    fn handle(&self, event_type: &EventType, payload: Value, next: Next) {
        if self.allows(event_type) {
            next.run(payload);
        } else {
            tracing::trace!(event_type = %event_type, "Emission filtered out");
        }
    }
}
