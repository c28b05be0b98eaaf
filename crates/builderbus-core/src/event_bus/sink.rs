//! The single state-sink slot.
//!
//! At most one sink is installed at a time. Each install gets a generation
//! number; a [`SinkDisposer`] only clears the sink it installed, so disposing
//! a stale disposer after an overwrite leaves the newer sink in place.

use std::sync::{Arc, Weak};

use super::bus::BusInner;
use super::event::Event;
use super::handler::HandlerOutcome;

pub(crate) type SinkFn = dyn Fn(Event) -> HandlerOutcome + Send + Sync;

#[derive(Default)]
pub(crate) struct SinkSlot {
    current: Option<(u64, Arc<SinkFn>)>,
    generation: u64,
}

impl SinkSlot {
    /// Install a sink, replacing any existing one; returns its generation
    pub(crate) fn install(&mut self, sink: Arc<SinkFn>) -> u64 {
        if let Some((previous, _)) = &self.current {
            tracing::warn!(
                previous_generation = previous,
                "State sink replaced without being disposed"
            );
        }
        self.generation += 1;
        self.current = Some((self.generation, sink));
        self.generation
    }

    /// Clear the sink if it is still the given generation
    pub(crate) fn clear_if(&mut self, generation: u64) -> bool {
        match &self.current {
            Some((current, _)) if *current == generation => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn get(&self) -> Option<Arc<SinkFn>> {
        self.current.as_ref().map(|(_, sink)| Arc::clone(sink))
    }

    pub(crate) fn is_installed(&self) -> bool {
        self.current.is_some()
    }
}

/// Clears the sink installed by [`crate::EventBus::initialize`]
///
/// Dropping the disposer does not clear the sink; call [`SinkDisposer::dispose`].
#[must_use = "the sink stays installed until `dispose` is called"]
#[derive(Debug)]
pub struct SinkDisposer {
    bus: Weak<BusInner>,
    generation: u64,
}

impl SinkDisposer {
    pub(crate) fn new(bus: Weak<BusInner>, generation: u64) -> Self {
        Self { bus, generation }
    }

    /// Clear the sink; returns false if it had already been replaced or the
    /// bus no longer exists
    pub fn dispose(self) -> bool {
        let Some(bus) = self.bus.upgrade() else {
            return false;
        };
        let cleared = bus.sink.lock().clear_if(self.generation);
        if cleared {
            tracing::debug!(generation = self.generation, "State sink disposed");
        }
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Arc<SinkFn> {
        Arc::new(|_: Event| -> HandlerOutcome { Ok(()) })
    }

    #[test]
    fn test_install_and_clear() {
        let mut slot = SinkSlot::default();
        assert!(!slot.is_installed());

        let generation = slot.install(noop());
        assert!(slot.is_installed());
        assert!(slot.get().is_some());

        assert!(slot.clear_if(generation));
        assert!(!slot.is_installed());
        assert!(!slot.clear_if(generation));
    }

    #[test]
    fn test_stale_generation_does_not_clear() {
        let mut slot = SinkSlot::default();
        let first = slot.install(noop());
        let second = slot.install(noop());
        assert_ne!(first, second);

        assert!(!slot.clear_if(first));
        assert!(slot.is_installed());
        assert!(slot.clear_if(second));
    }
}
