//! # builderbus Core
//!
//! Event bus engine for the builder.
//! Provides the event model, subscription registry, middleware chain,
//! bounded history, state sink slot and failure reporting.

pub mod config;
pub mod error;
pub mod event_bus;

pub use config::EventBusConfig;
pub use error::{BusError, Result};

// Re-export event bus for convenience
pub use event_bus::{
    event_bus, init_event_bus, BusEvent, BusFailure, EntityKind, Event, EventBus, EventCategory,
    EventEnvelope, EventType, FailureCounters, FailureKind, FailureReporter, HandlerOutcome,
    HandlerOutput, HandlerRef, LoggingMiddleware, Middleware, Next, SinkDisposer, TracingReporter,
    TypeFilter, Unsubscribe, ANY_ACTION_EVENT, STORE_ACTION_PREFIX,
};

// Builder event payloads
pub use event_bus::{
    ActionFired, ComponentCreated, ElementCreated, ElementDeleted, ElementUpdated,
    NotificationLevel, NotificationShown, PresetApplied, ScreenCreated, ScreenNavigated,
    TaskCompleted, TaskCreated, TaskDeleted, TaskUpdated, TokenUpdated, BUILTIN_EVENT_TYPES,
};
