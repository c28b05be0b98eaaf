//! Event records distributed by the bus.
//!
//! An [`Event`] is built once per emission and handed out by value: the sink,
//! every handler and every async receiver get their own clone, so nothing one
//! consumer does to its copy is visible to another or to the history log.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Borrow;
use std::fmt;
use uuid::Uuid;

use crate::error::{BusError, Result};

/// Prefix carried by every event the store bridge republishes.
///
/// The engine never forwards events with this prefix to the state sink.
pub const STORE_ACTION_PREFIX: &str = "redux.";

/// Generic "a store action occurred" event type published by the bridge.
pub const ANY_ACTION_EVENT: &str = "redux.*";

/// Name of an event category, e.g. `task.created`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventType(String);

impl EventType {
    /// Create an event type from a name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Event type for a store action, i.e. `redux.<action_type>`
    pub fn store_action(action_type: &str) -> Self {
        Self(format!("{STORE_ACTION_PREFIX}{action_type}"))
    }

    /// The type name
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the name is empty (or only whitespace)
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Whether this event was republished from the host store
    pub fn is_store_action(&self) -> bool {
        self.0.starts_with(STORE_ACTION_PREFIX)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventType {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for EventType {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&String> for EventType {
    fn from(name: &String) -> Self {
        Self(name.clone())
    }
}

impl From<&EventType> for EventType {
    fn from(event_type: &EventType) -> Self {
        event_type.clone()
    }
}

impl AsRef<str> for EventType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for EventType {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for EventType {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for EventType {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Entity discriminator tag; every bus record is an `"event"` entity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A bus event.
    #[default]
    Event,
}

/// Canonical record distributed to subscribers
///
/// `P` defaults to a dynamic JSON payload; typed subscribers see the payload
/// decoded into its declared shape (see [`crate::event_bus::BusEvent`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event<P = Value> {
    /// Unique identifier generated at emit time.
    pub id: Uuid,
    /// Always [`EntityKind::Event`].
    pub kind: EntityKind,
    /// Event category.
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Emit time.
    pub created_at: DateTime<Utc>,
    /// Emit time; events are never updated after construction.
    pub updated_at: DateTime<Utc>,
    /// Category-specific data.
    pub payload: P,
}

impl<P> Event<P> {
    /// Build a new event stamped with a fresh id and the current time
    pub fn new(event_type: impl Into<EventType>, payload: P) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            kind: EntityKind::Event,
            event_type: event_type.into(),
            created_at: now,
            updated_at: now,
            payload,
        }
    }
}

impl Event<Value> {
    /// Decode the dynamic payload into its typed shape
    pub fn decode<P: DeserializeOwned>(self) -> Result<Event<P>> {
        let payload =
            serde_json::from_value(self.payload).map_err(|source| BusError::Payload {
                event_type: self.event_type.to_string(),
                source,
            })?;
        Ok(Event {
            id: self.id,
            kind: self.kind,
            event_type: self.event_type,
            created_at: self.created_at,
            updated_at: self.updated_at,
            payload,
        })
    }

    /// Reduced record for the history log
    pub fn envelope(&self) -> EventEnvelope {
        EventEnvelope {
            id: self.id,
            event_type: self.event_type.clone(),
            payload: self.payload.clone(),
            created_at: self.created_at,
        }
    }
}

/// Reduced event record retained in history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    /// Id of the originating event.
    pub id: Uuid,
    /// Event category.
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Payload as dispatched.
    pub payload: Value,
    /// Emit time.
    pub created_at: DateTime<Utc>,
}
