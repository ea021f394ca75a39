//! TOML configuration for the eID client.
//!
//! ```toml
//! [engine]
//! url = "ws://127.0.0.1:24727/eID-Kernel"
//! connect_timeout_secs = 10
//!
//! [workflow]
//! developer_mode = false
//! status_messages = true
//! ```
//!
//! # Serde default values
//!
//! Every field has a `#[serde(default = "...")]`, so a missing section, a
//! missing field or an empty file all produce the defaults above.  A missing
//! file is treated the same as an empty one.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::options::{AuthenticationOptions, ChangePinOptions};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub workflow: WorkflowDefaults,
}

/// Where and how to reach the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// WebSocket endpoint of the engine.
    #[serde(default = "default_url")]
    pub url: String,
    /// Upper bound for the WebSocket handshake.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

/// Defaults applied when starting workflows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkflowDefaults {
    #[serde(default)]
    pub developer_mode: bool,
    #[serde(default = "default_true")]
    pub status_messages: bool,
}

// ── Default value functions ───────────────────────────────────────────────────

fn default_url() -> String {
    "ws://127.0.0.1:24727/eID-Kernel".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl Default for WorkflowDefaults {
    fn default() -> Self {
        Self {
            developer_mode: false,
            status_messages: default_true(),
        }
    }
}

// ── Conversions ───────────────────────────────────────────────────────────────

impl EngineConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl WorkflowDefaults {
    pub fn authentication_options(&self) -> AuthenticationOptions {
        AuthenticationOptions {
            developer_mode: self.developer_mode,
            user_info_messages: None,
            status_messages: self.status_messages,
        }
    }

    pub fn change_pin_options(&self) -> ChangePinOptions {
        ChangePinOptions {
            user_info_messages: None,
            status_messages: self.status_messages,
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl ClientConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the TOML is malformed.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Loads the config at `path`, returning `ClientConfig::default()` if the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] for file-system errors other than "not found",
    /// and [`ConfigError::Parse`] if the TOML is malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
