//! Event bus configuration
//!
//! Configuration is fixed once a bus is constructed. It can be built in code,
//! embedded in a host settings file, or loaded from a standalone TOML file:
//!
//! ```toml
//! enable_history = true
//! max_history_size = 250
//! channel_capacity = 512
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{BusError, Result};

/// Default number of envelopes retained when history is enabled.
pub const DEFAULT_MAX_HISTORY_SIZE: usize = 100;

/// Default capacity of the broadcast channel used by async receivers.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Configuration for the event bus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventBusConfig {
    /// Whether to keep event history.
    pub enable_history: bool,
    /// Maximum number of envelopes to retain in history.
    pub max_history_size: usize,
    /// Channel capacity for async broadcast receivers.
    pub channel_capacity: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            enable_history: false,
            max_history_size: DEFAULT_MAX_HISTORY_SIZE,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl EventBusConfig {
    /// Configuration with history enabled and the given bound
    pub fn with_history(max_history_size: usize) -> Self {
        Self {
            enable_history: true,
            max_history_size,
            ..Default::default()
        }
    }

    /// Parse and validate configuration from a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!(path = %path.display(), ?config, "Loaded event bus configuration");
        Ok(config)
    }

    /// Check that the configuration values are usable
    pub fn validate(&self) -> Result<()> {
        if self.enable_history && self.max_history_size == 0 {
            return Err(BusError::invalid_config(
                "max_history_size",
                "must be at least 1 when history is enabled",
            ));
        }
        if self.channel_capacity == 0 {
            return Err(BusError::invalid_config(
                "channel_capacity",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}
