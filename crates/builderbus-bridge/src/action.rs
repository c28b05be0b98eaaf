//! Store actions and the payload the bridge publishes for them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A host store action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Action type, e.g. `elements/update`.
    #[serde(rename = "type")]
    pub action_type: String,
    /// Action payload.
    #[serde(default)]
    pub payload: Option<Value>,
    /// Free-form metadata.
    #[serde(default)]
    pub meta: Option<Value>,
    /// Whether the action represents an error.
    #[serde(default)]
    pub error: bool,
}

impl Action {
    /// Create an action with no payload
    pub fn new(action_type: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            payload: None,
            meta: None,
            error: false,
        }
    }

    /// Attach a payload
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Attach metadata
    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Mark the action as an error
    pub fn as_error(mut self) -> Self {
        self.error = true;
        self
    }
}

/// Payload of every event the bridge publishes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreActionPayload {
    /// The dispatched action.
    pub action: Action,
    /// Store state after the action was applied.
    pub state: Value,
    /// When the bridge published it.
    pub timestamp: DateTime<Utc>,
}
