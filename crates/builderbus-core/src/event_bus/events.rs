//! Event type definitions for the event bus.
//!
//! Each builder event is a payload struct bound to its wire name through
//! [`BusEvent`]. Typed `emit_event`/`on_event` calls are checked against
//! this table at compile time; the dynamic `emit`/`on` surface stays open for
//! names that are not listed here (e.g. bridged store actions).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::event::{EventType, STORE_ACTION_PREFIX};

/// A payload type bound to a fixed event type name
pub trait BusEvent: Serialize + DeserializeOwned + Send + 'static {
    /// Wire name of the event type.
    const TYPE: &'static str;

    /// The event type as a value
    fn event_type() -> EventType {
        EventType::from(Self::TYPE)
    }
}

macro_rules! bus_events {
    ($($payload:ty => $name:literal),* $(,)?) => {
        $(
            impl BusEvent for $payload {
                const TYPE: &'static str = $name;
            }
        )*

        /// Names of all event types declared in this module.
        pub const BUILTIN_EVENT_TYPES: &[&str] = &[$($name),*];
    };
}

bus_events! {
    TaskCreated => "task.created",
    TaskUpdated => "task.updated",
    TaskCompleted => "task.completed",
    TaskDeleted => "task.deleted",
    ActionFired => "action.fired",
    ElementCreated => "element.created",
    ElementUpdated => "element.updated",
    ElementDeleted => "element.deleted",
    ComponentCreated => "component.created",
    ScreenCreated => "screen.created",
    ScreenNavigated => "screen.navigated",
    TokenUpdated => "token.updated",
    PresetApplied => "preset.applied",
    NotificationShown => "notification.shown",
}

/// Event category for coarse routing and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Task lifecycle events.
    Task,
    /// Interactive actions fired from the canvas.
    Action,
    /// Element tree changes.
    Element,
    /// Component library changes.
    Component,
    /// Screen creation and navigation.
    Screen,
    /// Design token changes.
    Token,
    /// Preset application.
    Preset,
    /// User-facing notifications.
    Notification,
    /// Actions republished from the host store.
    Store,
    /// Anything else.
    Other,
}

impl EventCategory {
    /// Category of an event type, derived from its leading segment
    pub fn of(event_type: &EventType) -> Self {
        if event_type.as_str().starts_with(STORE_ACTION_PREFIX) {
            return EventCategory::Store;
        }
        match event_type.as_str().split('.').next().unwrap_or_default() {
            "task" => EventCategory::Task,
            "action" => EventCategory::Action,
            "element" => EventCategory::Element,
            "component" => EventCategory::Component,
            "screen" => EventCategory::Screen,
            "token" => EventCategory::Token,
            "preset" => EventCategory::Preset,
            "notification" => EventCategory::Notification,
            _ => EventCategory::Other,
        }
    }
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Task => write!(f, "Task"),
            EventCategory::Action => write!(f, "Action"),
            EventCategory::Element => write!(f, "Element"),
            EventCategory::Component => write!(f, "Component"),
            EventCategory::Screen => write!(f, "Screen"),
            EventCategory::Token => write!(f, "Token"),
            EventCategory::Preset => write!(f, "Preset"),
            EventCategory::Notification => write!(f, "Notification"),
            EventCategory::Store => write!(f, "Store"),
            EventCategory::Other => write!(f, "Other"),
        }
    }
}

/// A task was created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskCreated {
    /// Task id.
    pub id: String,
    /// Task title, if known at creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A task's fields changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskUpdated {
    /// Task id.
    pub id: String,
    /// Changed fields and their new values.
    #[serde(default)]
    pub changes: Value,
}

/// A task was marked done
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskCompleted {
    /// Task id.
    pub id: String,
}

/// A task was removed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDeleted {
    /// Task id.
    pub id: String,
}

/// An interactive action fired on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionFired {
    /// Action id.
    pub action_id: String,
    /// Element the action is attached to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_id: Option<String>,
    /// Trigger that fired it (`click`, `load`, ...).
    pub trigger: String,
}

/// An element was added to a screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementCreated {
    /// Element id.
    pub id: String,
    /// Element kind (`button`, `frame`, ...).
    pub element_type: String,
    /// Owning screen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_id: Option<String>,
}

/// An element's properties changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementUpdated {
    /// Element id.
    pub id: String,
    /// Changed properties and their new values.
    #[serde(default)]
    pub changes: Value,
}

/// An element was removed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDeleted {
    /// Element id.
    pub id: String,
}

/// A reusable component was created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentCreated {
    /// Component id.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// A screen was created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenCreated {
    /// Screen id.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// The active screen changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenNavigated {
    /// Previous screen, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// New screen.
    pub to: String,
}

/// A design token value changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenUpdated {
    /// Token id.
    pub id: String,
    /// Token name (`color.primary`, ...).
    pub name: String,
    /// New value.
    pub value: Value,
}

/// A style preset was applied to an element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetApplied {
    /// Preset id.
    pub preset_id: String,
    /// Element receiving the preset.
    pub target_id: String,
}

/// Severity of a user notification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    /// Informational.
    #[default]
    Info,
    /// Operation succeeded.
    Success,
    /// Needs attention.
    Warning,
    /// Operation failed.
    Error,
}

/// A notification should be shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationShown {
    /// Message text.
    pub message: String,
    /// Severity.
    #[serde(default)]
    pub level: NotificationLevel,
}
