//! Configuration value types for pubsync
//!
//! Small validated types shared by the configuration layer, the scanner and
//! the HTTP client.

use std::time::Duration;

/// How the scanner treats symbolic links
///
/// Links are never traversed as directories, so a link cycle cannot make
/// the walk loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SymlinkPolicy {
    /// Publish a link to a regular file with the target's content; a link to
    /// a directory or a dangling link is a filesystem error
    #[default]
    FileContents,
    /// Leave every link out of the manifest
    Skip,
    /// Treat any link as a filesystem error
    Reject,
}

/// Timeout configuration for remote calls
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeoutConfig {
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Timeout of one whole request, body included
    pub request_timeout: Duration,
}

impl TimeoutConfig {
    /// Create a timeout configuration, rejecting zero durations
    pub fn new(connect_timeout: Duration, request_timeout: Duration) -> Result<Self, String> {
        if connect_timeout.is_zero() {
            return Err("Connect timeout must be greater than zero".to_string());
        }
        if request_timeout < connect_timeout {
            return Err("Request timeout cannot be shorter than connect timeout".to_string());
        }
        Ok(Self {
            connect_timeout,
            request_timeout,
        })
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(300),
        }
    }
}
