//! Error handling for the event bus
//!
//! The bus itself never returns errors to producers or subscribers; failures
//! during dispatch are reported through [`crate::event_bus::FailureReporter`].
//! The types here cover the fallible edges around the bus:
//! - Configuration loading and validation
//! - Decoding a dynamic payload into its typed shape
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for the bus crate
#[derive(Error, Debug)]
pub enum BusError {
    /// A payload did not match the shape declared for its event type
    #[error("Payload for '{event_type}' does not match its declared shape: {source}")]
    Payload {
        /// The event type whose payload failed to decode.
        event_type: String,
        /// The underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// A configuration value is invalid
    #[error("Invalid configuration '{key}': {reason}")]
    InvalidConfig {
        /// The offending configuration key.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML deserialization error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl BusError {
    /// Create an invalid configuration error
    pub fn invalid_config(key: impl Into<String>, reason: impl Into<String>) -> Self {
        BusError::InvalidConfig {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Check if this is a payload shape error
    pub fn is_payload_error(&self) -> bool {
        matches!(self, BusError::Payload { .. })
    }

    /// Check if this is a configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            BusError::InvalidConfig { .. } | BusError::Toml(_) | BusError::Io(_)
        )
    }
}

/// Result type using BusError
pub type Result<T> = std::result::Result<T, BusError>;
