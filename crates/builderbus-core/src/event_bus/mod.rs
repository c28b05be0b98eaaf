//! # Event Bus Module
//!
//! Provides the publish/subscribe engine that decouples the builder's
//! producers (task, element, screen and action mutations) from whoever
//! reacts to them (analytics, notifications, activity feeds, the host store).
//!
//! ## Overview
//!
//! - Publishers emit events by type without knowing subscribers
//! - Subscribers register per type and each get their own copy of an event
//! - Middleware intercept emissions in registration order
//! - A single state sink mirrors events into a host store
//! - An optional bounded history keeps the most recent envelopes
//!
//! A failing handler, middleware or sink never reaches the emitter; failures
//! go to the bus's [`FailureReporter`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use builderbus_core::event_bus::{EventBus, TaskCreated};
//! use serde_json::json;
//!
//! let bus = EventBus::new();
//!
//! let subscription = bus.on("task.created", |event| {
//!     println!("Task created: {}", event.payload["id"]);
//! });
//!
//! bus.emit("task.created", json!({ "id": "t1" }));
//!
//! // Typed surface
//! bus.emit_event(TaskCreated { id: "t2".into(), title: None });
//!
//! subscription.unsubscribe();
//! ```

mod bus;
mod diagnostics;
mod event;
mod events;
mod handler;
mod history;
mod middleware;
mod registry;
mod sink;

pub use bus::*;
pub use diagnostics::{
    panic_message, BusFailure, FailureCounters, FailureKind, FailureReporter, TracingReporter,
};
pub use event::*;
pub use events::*;
pub use handler::{HandlerOutcome, HandlerOutput, HandlerRef};
pub use middleware::{LoggingMiddleware, Middleware, Next, TypeFilter};
pub use sink::SinkDisposer;
