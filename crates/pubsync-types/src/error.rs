//! Error types and handling for pubsync
//!
//! Every I/O boundary of a run (hashing, scanning, listing, uploading,
//! removing) returns one of these errors. None of them is recovered locally:
//! the first one aborts the run and is surfaced as the failure reason.

use std::fmt::Display;
use std::path::{Path, PathBuf};

/// Main error type for pubsync operations
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A local entry could not be read or is not publishable
    #[error("Filesystem error at '{}': {message}", path.display())]
    Filesystem {
        /// Path of the offending entry
        path: PathBuf,
        /// Error message describing the failure
        message: String,
    },

    /// The remote store rejected the credentials
    #[error("Authentication failed: {message}")]
    Auth {
        /// Error message returned by the remote store
        message: String,
    },

    /// The remote store could not be reached
    #[error("Transport error: {message}")]
    Transport {
        /// Error message describing the connectivity issue
        message: String,
    },

    /// The remote store answered with something that is not well formed
    #[error("Protocol error: {message}")]
    Protocol {
        /// Error message describing the malformed response
        message: String,
    },

    /// Configuration or invocation error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration issue
        message: String,
    },
}

/// Error kind for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Local filesystem errors
    Filesystem,
    /// Rejected credentials
    Auth,
    /// Connectivity and timeout errors
    Transport,
    /// Malformed remote responses
    Protocol,
    /// Configuration errors
    Config,
}

impl Error {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Filesystem { .. } => ErrorKind::Filesystem,
            Self::Auth { .. } => ErrorKind::Auth,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Protocol { .. } => ErrorKind::Protocol,
            Self::Config { .. } => ErrorKind::Config,
        }
    }

    /// Whether the error originated at the remote store boundary
    pub fn is_remote(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Auth | ErrorKind::Transport | ErrorKind::Protocol
        )
    }

    /// Path of the local entry involved, for filesystem errors
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Filesystem { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Create a new filesystem error for `path`
    pub fn filesystem<P: AsRef<Path>, E: Display>(path: P, error: E) -> Self {
        Self::Filesystem {
            path: path.as_ref().to_path_buf(),
            message: error.to_string(),
        }
    }

    /// Create a new authentication error
    pub fn auth<S: Into<String>>(message: S) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a new protocol error
    pub fn protocol<S: Into<String>>(message: S) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
