//! # builderbus
//!
//! Event bus for a visual UI builder.
//!
//! ## Architecture
//!
//! builderbus is organized as a workspace with multiple crates:
//!
//! 1. **builderbus-core** - Events, subscriptions, middleware, history, sink, config
//! 2. **builderbus-bridge** - Mirrors a host state store onto the bus and back
//! 3. **builderbus-bindings** - Component lifecycle helpers (scoped subscriptions, emitters)
//! 4. **builderbus** - Re-exports, logging setup and the demo binary
//!
//! ## Features
//!
//! - **Isolation**: a failing handler, middleware or sink never affects siblings or the producer
//! - **Middleware**: ordered interceptors that can transform, defer or cancel an emission
//! - **History**: optional bounded log of recent emissions
//! - **Store bridge**: two-way wiring with a host store, free of feedback loops
//! - **Typed events**: compile-time checked payloads for the builder's event table

pub mod app;

pub use builderbus_bindings::{
    current_bus, use_emitter, use_event, use_event_once, use_typed_event, BusScope,
    ComponentScope, Emitter, EventSubscription,
};
pub use builderbus_bridge::{
    bus_event_action, Action, BridgeOptions, BridgedStore, StateStore, StoreActionPayload,
    StoreBridge,
};
pub use builderbus_core::{
    emit, event_bus, init_event_bus, on_event, BusError, BusEvent, BusFailure, Event, EventBus,
    EventBusConfig, EventCategory, EventEnvelope, EventType, FailureCounters, FailureKind,
    FailureReporter, HandlerRef, LoggingMiddleware, Middleware, Next, Result, SinkDisposer,
    TracingReporter, TypeFilter, Unsubscribe, ANY_ACTION_EVENT, STORE_ACTION_PREFIX,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Console output with `RUST_LOG` support; `info` unless overridden.
/// Calling it twice is an error.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing::Level::INFO.to_string()));

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_thread_names(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
