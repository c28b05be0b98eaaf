//! Subscriber handles.

use std::fmt;
use std::sync::{Arc, Weak};

use super::event::Event;

/// What a handler invocation produced; `Err` carries the failure text
pub type HandlerOutcome = std::result::Result<(), String>;

/// Return types accepted from handlers and sinks
///
/// Handlers may return nothing, or a `Result` whose error is reported
/// exactly like a panic would be.
pub trait HandlerOutput {
    /// Normalize into an outcome
    fn into_outcome(self) -> HandlerOutcome;
}

impl HandlerOutput for () {
    fn into_outcome(self) -> HandlerOutcome {
        Ok(())
    }
}

impl<E: fmt::Display> HandlerOutput for std::result::Result<(), E> {
    fn into_outcome(self) -> HandlerOutcome {
        self.map_err(|e| e.to_string())
    }
}

type HandlerFn = dyn Fn(Event) -> HandlerOutcome + Send + Sync;

/// Reference-counted handler with identity
///
/// Two `HandlerRef`s are equal when they point at the same allocation, so
/// clones of one handle refer to the same subscriber.
#[derive(Clone)]
pub struct HandlerRef(Arc<HandlerFn>);

impl HandlerRef {
    /// Wrap a closure as a handler
    pub fn new<F, R>(handler: F) -> Self
    where
        F: Fn(Event) -> R + Send + Sync + 'static,
        R: HandlerOutput,
    {
        Self(Arc::new(move |event| handler(event).into_outcome()))
    }

    /// Invoke the handler
    pub fn call(&self, event: Event) -> HandlerOutcome {
        (self.0)(event)
    }

    /// Whether both handles refer to the same handler
    pub fn same_as(&self, other: &HandlerRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Non-owning handle, used by self-removing wrappers
    pub(crate) fn downgrade(&self) -> WeakHandlerRef {
        WeakHandlerRef(Arc::downgrade(&self.0))
    }
}

impl PartialEq for HandlerRef {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl Eq for HandlerRef {}

impl fmt::Debug for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HandlerRef({:p})", Arc::as_ptr(&self.0))
    }
}

#[derive(Clone)]
pub(crate) struct WeakHandlerRef(Weak<HandlerFn>);

impl WeakHandlerRef {
    pub(crate) fn upgrade(&self) -> Option<HandlerRef> {
        self.0.upgrade().map(HandlerRef)
    }
}
