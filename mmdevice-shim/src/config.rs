//! Discovery configuration.
//!
//! Read from JSON, either inline through the C ABI or from a file passed to
//! the probe binary. Every field has a default, so `{}` is a valid config.

use crate::audio::{DataFlow, DeviceRole};
use crate::interfaces::{DEVICE_STATE, DEVICE_STATEMASK_ALL, DEVICE_STATE_ACTIVE};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing_subscriber::filter::{EnvFilter, ParseError};

/// What to discover and whether to watch for changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscoveryConfig {
    /// Data flow to enumerate
    pub flow: DataFlow,

    /// Role used when falling back to the default endpoint
    pub role: DeviceRole,

    /// `DEVICE_STATE_*` filter for enumeration
    pub state_mask: u32,

    /// Register a notification client after discovery
    pub watch_notifications: bool,

    /// `tracing` filter directive, e.g. `mmdevice_shim=debug`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            flow: DataFlow::Render,
            role: DeviceRole::Console,
            state_mask: DEVICE_STATE_ACTIVE.0,
            watch_notifications: true,
            log_filter: None,
        }
    }
}

impl DiscoveryConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// The state filter must name at least one state and nothing outside
    /// `DEVICE_STATEMASK_ALL`, and an explicit log filter must parse.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.state_mask == 0 || self.state_mask & !DEVICE_STATEMASK_ALL.0 != 0 {
            return Err(ConfigError::InvalidStateMask(self.state_mask));
        }
        if let Some(filter) = &self.log_filter {
            EnvFilter::try_new(filter).map_err(|source| ConfigError::InvalidLogFilter {
                filter: filter.clone(),
                source,
            })?;
        }
        Ok(())
    }

    pub fn state_mask(&self) -> DEVICE_STATE {
        DEVICE_STATE(self.state_mask)
    }
}

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid device state mask: {0:#x}")]
    InvalidStateMask(u32),

    #[error("Invalid log filter `{filter}`: {source}")]
    InvalidLogFilter {
        filter: String,
        #[source]
        source: ParseError,
    },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
