//! # builderbus Bridge
//!
//! Makes a host state store and the event bus mutually observable:
//! store actions are mirrored onto the bus under the `redux.` prefix, and bus
//! events can be projected back into the store through the bus's state sink
//! without feedback loops.

pub mod action;
pub mod bridge;
pub mod error;
pub mod options;

pub use action::{Action, StoreActionPayload};
pub use bridge::{bus_event_action, BridgedStore, StateStore, StoreBridge, BUS_EVENT_ACTION_PREFIX};
pub use builderbus_core::{ANY_ACTION_EVENT, STORE_ACTION_PREFIX};
pub use error::BridgeError;
pub use options::BridgeOptions;
