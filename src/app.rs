//! Demo wiring: a small task store bridged to the bus, plus the usual
//! reactive consumers (activity feed, notifications).

use builderbus_bindings::ComponentScope;
use builderbus_bridge::{
    bus_event_action, Action, BridgeOptions, BridgedStore, StateStore, StoreBridge,
    BUS_EVENT_ACTION_PREFIX,
};
use builderbus_core::{
    Event, EventBus, EventBusConfig, LoggingMiddleware, NotificationLevel, NotificationShown,
    SinkDisposer, TaskCompleted, TaskCreated, ANY_ACTION_EVENT,
};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Action types understood by [`TaskStore`].
pub mod actions {
    pub const ADD_TASK: &str = "tasks/add";
    pub const COMPLETE_TASK: &str = "tasks/complete";
    pub const REMOVE_TASK: &str = "tasks/remove";
    pub const HOVER: &str = "ui/hover";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub done: bool,
}

#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskState {
    pub tasks: BTreeMap<String, Task>,
    /// Bus event types projected into the store, in arrival order.
    pub activity: Vec<String>,
}

/// Reducer for the demo
#[derive(Debug, Default)]
pub struct TaskStore {
    state: TaskState,
}

impl StateStore for TaskStore {
    type State = TaskState;

    fn apply(&mut self, action: &Action) {
        let payload = action.payload.as_ref();
        let id = payload
            .and_then(|p| p["id"].as_str())
            .map(str::to_string);

        match (action.action_type.as_str(), id) {
            (actions::ADD_TASK, Some(id)) => {
                let title = payload
                    .and_then(|p| p["title"].as_str())
                    .unwrap_or_default()
                    .to_string();
                self.state.tasks.insert(
                    id.clone(),
                    Task {
                        id,
                        title,
                        done: false,
                    },
                );
            }
            (actions::COMPLETE_TASK, Some(id)) => {
                if let Some(task) = self.state.tasks.get_mut(&id) {
                    task.done = true;
                }
            }
            (actions::REMOVE_TASK, Some(id)) => {
                self.state.tasks.remove(&id);
            }
            (other, _) => {
                if let Some(event_type) = other.strip_prefix(BUS_EVENT_ACTION_PREFIX) {
                    self.state.activity.push(event_type.to_string());
                }
            }
        }
    }

    fn state(&self) -> &TaskState {
        &self.state
    }
}

/// The wired-up demo application
pub struct App {
    bus: EventBus,
    store: Arc<BridgedStore<TaskStore>>,
    sink: Option<SinkDisposer>,
    consumers: ComponentScope,
}

impl App {
    /// Build the bus, bridge the store and mount the consumers
    pub fn new(config: EventBusConfig) -> Self {
        let bus = EventBus::with_config(config);
        bus.use_middleware(LoggingMiddleware);

        let bridge = StoreBridge::with_options(
            bus.clone(),
            BridgeOptions::new().exclude([actions::HOVER]),
        );
        let store = Arc::new(BridgedStore::new(TaskStore::default(), bridge));

        // Only builder events are projected; the store's own actions never
        // reach the sink.
        let sink = store.connect_sink(|event: &Event| {
            (!event.event_type.as_str().starts_with("notification."))
                .then(|| bus_event_action(event))
                .flatten()
        });

        let mut consumers = ComponentScope::new(bus.clone());
        let emitter = consumers.emitter();
        consumers.on(ANY_ACTION_EVENT, move |event: Event| {
            let action_type = event.payload["action"]["type"].as_str().unwrap_or_default();
            if action_type == actions::COMPLETE_TASK {
                let id = event.payload["action"]["payload"]["id"].clone();
                emitter.emit_event(TaskCompleted {
                    id: id.as_str().unwrap_or_default().to_string(),
                });
            }
        });
        let emitter = consumers.emitter();
        consumers.on("task.completed", move |event: Event| {
            emitter.emit_event(NotificationShown {
                message: format!("Task {} done", event.payload["id"].as_str().unwrap_or("?")),
                level: NotificationLevel::Success,
            });
        });
        consumers.on("notification.shown", |event: Event| {
            tracing::info!(
                message = %event.payload["message"],
                level = %event.payload["level"],
                "Notification"
            );
        });

        Self {
            bus,
            store,
            sink: Some(sink),
            consumers,
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn store(&self) -> &BridgedStore<TaskStore> {
        &self.store
    }

    /// Add a task through the store and announce it on the bus
    pub fn add_task(&self, id: &str, title: &str) {
        self.store.dispatch(
            Action::new(actions::ADD_TASK).with_payload(json!({ "id": id, "title": title })),
        );
        self.bus.emit_event(TaskCreated {
            id: id.to_string(),
            title: Some(title.to_string()),
        });
    }

    pub fn complete_task(&self, id: &str) {
        self.store
            .dispatch(Action::new(actions::COMPLETE_TASK).with_payload(json!({ "id": id })));
    }

    pub fn hover(&self, element_id: &str) {
        self.store
            .dispatch(Action::new(actions::HOVER).with_payload(json!({ "id": element_id })));
    }

    /// Tear down consumers and detach the store from the bus
    pub fn shutdown(&mut self) {
        self.consumers.unmount();
        if let Some(sink) = self.sink.take() {
            sink.dispose();
        }
        tracing::debug!(remaining = self.bus.subscriber_count(), "App shut down");
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.shutdown();
    }
}
