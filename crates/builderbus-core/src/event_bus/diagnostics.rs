//! Failure reporting.
//!
//! Nothing inside the bus propagates to callers. Every swallowed failure is
//! handed to a [`FailureReporter`] instead, so hosts can log it, count it, or
//! assert on it in tests.

use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use thiserror::Error;

use super::event::EventType;

/// A failure the bus caught and suppressed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusFailure {
    /// A call was rejected and turned into a no-op
    #[error("Invalid input to {operation}: {reason}")]
    InvalidInput {
        /// The rejected operation.
        operation: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// A subscriber panicked or returned an error
    #[error("Handler for '{event_type}' failed: {message}")]
    Handler {
        /// Event being dispatched.
        event_type: EventType,
        /// Panic message or returned error.
        message: String,
    },

    /// A middleware panicked; the chain continued
    #[error("Middleware #{index} failed while emitting '{event_type}': {message}")]
    Middleware {
        /// Event being emitted.
        event_type: EventType,
        /// Position of the middleware in the chain.
        index: usize,
        /// Panic message.
        message: String,
    },

    /// The state sink panicked or returned an error
    #[error("State sink failed on '{event_type}': {message}")]
    Sink {
        /// Event being projected.
        event_type: EventType,
        /// Panic message or returned error.
        message: String,
    },

    /// Something escaped every inner layer of an emit
    #[error("Emit of '{event_type}' failed: {message}")]
    Emit {
        /// Event being emitted.
        event_type: EventType,
        /// Panic message.
        message: String,
    },

    /// The store bridge could not republish an action
    #[error("Store bridge failed on action '{action_type}': {message}")]
    Bridge {
        /// Store action type.
        action_type: String,
        /// What went wrong.
        message: String,
    },
}

/// Failure classification, for counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// See [`BusFailure::InvalidInput`].
    InvalidInput,
    /// See [`BusFailure::Handler`].
    Handler,
    /// See [`BusFailure::Middleware`].
    Middleware,
    /// See [`BusFailure::Sink`].
    Sink,
    /// See [`BusFailure::Emit`].
    Emit,
    /// See [`BusFailure::Bridge`].
    Bridge,
}

impl BusFailure {
    /// Classification of this failure
    pub fn kind(&self) -> FailureKind {
        match self {
            BusFailure::InvalidInput { .. } => FailureKind::InvalidInput,
            BusFailure::Handler { .. } => FailureKind::Handler,
            BusFailure::Middleware { .. } => FailureKind::Middleware,
            BusFailure::Sink { .. } => FailureKind::Sink,
            BusFailure::Emit { .. } => FailureKind::Emit,
            BusFailure::Bridge { .. } => FailureKind::Bridge,
        }
    }
}

/// Receives every failure the bus suppresses
pub trait FailureReporter: Send + Sync {
    /// Called once per suppressed failure, on the emitting thread
    fn report(&self, failure: &BusFailure);
}

/// Default reporter: logs through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl FailureReporter for TracingReporter {
    fn report(&self, failure: &BusFailure) {
        match failure {
            BusFailure::InvalidInput { operation, reason } => {
                tracing::warn!(operation, %reason, "Ignoring invalid event bus call");
            }
            BusFailure::Handler {
                event_type,
                message,
            } => {
                tracing::error!(event_type = %event_type, %message, "Event handler failed");
            }
            BusFailure::Middleware {
                event_type,
                index,
                message,
            } => {
                tracing::error!(event_type = %event_type, index, %message, "Middleware failed, continuing chain");
            }
            BusFailure::Sink {
                event_type,
                message,
            } => {
                tracing::error!(event_type = %event_type, %message, "State sink failed");
            }
            BusFailure::Emit {
                event_type,
                message,
            } => {
                tracing::error!(event_type = %event_type, %message, "Emit failed");
            }
            BusFailure::Bridge {
                action_type,
                message,
            } => {
                tracing::error!(action_type = %action_type, %message, "Store bridge failed");
            }
        }
    }
}

/// Reporter that logs and keeps per-kind counts
///
/// Useful in tests, or for exporting failure counters from a host.
#[derive(Debug, Default)]
pub struct FailureCounters {
    counts: Mutex<HashMap<FailureKind, usize>>,
    last: Mutex<Option<BusFailure>>,
}

impl FailureCounters {
    /// Create an empty set of counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of failures of the given kind seen so far
    pub fn count(&self, kind: FailureKind) -> usize {
        self.counts.lock().get(&kind).copied().unwrap_or(0)
    }

    /// Total number of failures seen so far
    pub fn total(&self) -> usize {
        self.counts.lock().values().sum()
    }

    /// The most recent failure
    pub fn last(&self) -> Option<BusFailure> {
        self.last.lock().clone()
    }

    /// Reset all counters
    pub fn reset(&self) {
        self.counts.lock().clear();
        *self.last.lock() = None;
    }
}

impl FailureReporter for FailureCounters {
    fn report(&self, failure: &BusFailure) {
        TracingReporter.report(failure);
        *self.counts.lock().entry(failure.kind()).or_insert(0) += 1;
        *self.last.lock() = Some(failure.clone());
    }
}

/// Best-effort text of a caught panic payload
pub fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let counters = FailureCounters::new();
        counters.report(&BusFailure::Handler {
            event_type: "task.created".into(),
            message: "boom".into(),
        });
        counters.report(&BusFailure::Handler {
            event_type: "task.created".into(),
            message: "boom again".into(),
        });
        counters.report(&BusFailure::InvalidInput {
            operation: "emit",
            reason: "event type is empty".into(),
        });

        assert_eq!(counters.count(FailureKind::Handler), 2);
        assert_eq!(counters.count(FailureKind::InvalidInput), 1);
        assert_eq!(counters.count(FailureKind::Sink), 0);
        assert_eq!(counters.total(), 3);
        assert_eq!(
            counters.last().map(|f| f.kind()),
            Some(FailureKind::InvalidInput)
        );

        counters.reset();
        assert_eq!(counters.total(), 0);
        assert!(counters.last().is_none());
    }

    #[test]
    fn test_panic_message() {
        let static_panic = std::panic::catch_unwind(|| panic!("static text")).unwrap_err();
        assert_eq!(panic_message(&*static_panic), "static text");

        let formatted = std::panic::catch_unwind(|| panic!("code {}", 7)).unwrap_err();
        assert_eq!(panic_message(&*formatted), "code 7");

        let opaque = std::panic::catch_unwind(|| std::panic::panic_any(42u8)).unwrap_err();
        assert_eq!(panic_message(&*opaque), "unknown panic");
    }

    #[test]
    fn test_failure_display() {
        let failure = BusFailure::Middleware {
            event_type: "y".into(),
            index: 1,
            message: "bad".into(),
        };
        assert_eq!(
            failure.to_string(),
            "Middleware #1 failed while emitting 'y': bad"
        );
    }
}
