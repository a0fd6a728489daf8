//! Configuration management for pubsync
//!
//! Configuration is layered: built-in defaults, then an optional YAML, TOML
//! or JSON file, then `PUBSYNC__*` environment variables. Credentials are
//! never part of the configuration; they come from the invocation.
//!
//! The sync root and the exclusion rules are fixed and therefore not
//! configurable here.
//!
//! # Examples
//!
//! ```rust
//! use pubsync_config::ConfigBuilder;
//!
//! # fn main() -> Result<(), pubsync_config::ConfigError> {
//! let config = ConfigBuilder::new().add_defaults().build()?;
//! assert_eq!(config.sync.concurrency, 1);
//! println!("Publishing to {}", config.remote.base_url);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use pubsync_types::{SymlinkPolicy, TimeoutConfig};
use serde::{Deserialize, Serialize};

pub mod builder;
pub mod error;
pub mod loader;

pub use builder::ConfigBuilder;
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

/// Base URL of the default publishing service
pub const DEFAULT_BASE_URL: &str = "https://publish-01.obsidian.md";

/// Upper bound for in-flight operations within one phase
pub const MAX_CONCURRENCY: usize = 64;

/// Main configuration structure for pubsync
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Remote store configuration
    #[serde(default)]
    pub remote: RemoteConfig,
    /// Sync behaviour configuration
    #[serde(default)]
    pub sync: SyncConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the publishing API
    pub base_url: String,
    /// User agent sent with every request
    pub user_agent: String,
    /// Connection and request timeouts
    pub timeouts: TimeoutConfig,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: format!("pubsync/{}", env!("CARGO_PKG_VERSION")),
            timeouts: TimeoutConfig::default(),
        }
    }
}

/// Sync behaviour configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// In-flight operations within one phase (1 = strictly sequential)
    pub concurrency: usize,
    /// Symbolic link handling during the tree walk
    pub symlinks: SymlinkPolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            symlinks: SymlinkPolicy::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Enable JSON formatting
    pub json_format: bool,
    /// Enable colored output
    pub colored_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            colored_output: true,
        }
    }
}
