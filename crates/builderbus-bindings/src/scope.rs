//! Ambient bus resolution.
//!
//! UI code asks for "the bus" without being handed one. A composition root
//! provides a bus for the duration of a render pass with [`BusScope::provide`];
//! anything resolved inside sees that bus, and code outside any scope falls
//! back to the process-wide default.

use builderbus_core::{event_bus, EventBus};
use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};

thread_local! {
    static SCOPED: RefCell<Vec<EventBus>> = const { RefCell::new(Vec::new()) };
}

static FALLBACK_WARNED: AtomicBool = AtomicBool::new(false);

/// Provides an ambient bus to code running inside it
pub struct BusScope;

impl BusScope {
    /// Run `f` with `bus` as the current bus on this thread
    ///
    /// Scopes nest; the innermost one wins. The bus is popped even if `f`
    /// panics.
    pub fn provide<R>(bus: &EventBus, f: impl FnOnce() -> R) -> R {
        SCOPED.with(|scoped| scoped.borrow_mut().push(bus.clone()));
        let _guard = PopOnDrop;
        f()
    }

    /// Nesting depth of scopes on this thread
    pub fn depth() -> usize {
        SCOPED.with(|scoped| scoped.borrow().len())
    }
}

struct PopOnDrop;

impl Drop for PopOnDrop {
    fn drop(&mut self) {
        SCOPED.with(|scoped| {
            scoped.borrow_mut().pop();
        });
    }
}

/// The innermost scoped bus, if any
pub fn scoped_bus() -> Option<EventBus> {
    SCOPED.with(|scoped| scoped.borrow().last().cloned())
}

/// The innermost scoped bus, or the process-wide default
///
/// The first fallback logs a warning; later ones are silent.
pub fn current_bus() -> EventBus {
    if let Some(bus) = scoped_bus() {
        return bus;
    }
    if !FALLBACK_WARNED.swap(true, Ordering::Relaxed) {
        tracing::warn!("No scoped event bus; falling back to the process-wide default");
    }
    event_bus().clone()
}
