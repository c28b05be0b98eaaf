//! Error types for the bridge crate.

use thiserror::Error;

/// Errors raised while composing a bridged event
///
/// These never escape the bridge; they are logged and reported to the bus.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The action has no type to publish under.
    #[error("Action type must not be empty")]
    EmptyActionType,

    /// The store state could not be snapshotted.
    #[error("Failed to snapshot store state: {0}")]
    StateSnapshot(#[source] serde_json::Error),

    /// The bridged payload could not be serialized.
    #[error("Failed to serialize bridged payload: {0}")]
    Payload(#[source] serde_json::Error),
}
