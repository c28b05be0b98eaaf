//! # builderbus Bindings
//!
//! Lifecycle glue between UI components and the event bus: ambient bus
//! resolution, mount-scoped subscriptions that always call the latest
//! handler, and stable emit helpers.

pub mod hooks;
pub mod scope;

pub use hooks::{
    use_emitter, use_event, use_event_once, use_typed_event, ComponentScope, Emitter,
    EventSubscription,
};
pub use scope::{current_bus, scoped_bus, BusScope};
