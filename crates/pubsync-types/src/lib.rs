//! Core type system and error handling for pubsync
//!
//! This crate provides the foundational types shared by every pubsync crate:
//!
//! - **Fingerprints**: SHA-256 content digests, the only notion of "changed"
//! - **Manifests**: normalized path to fingerprint mappings, local or remote
//! - **Change sets**: the add/update/remove partition produced by reconciliation
//! - **Error handling**: the filesystem/auth/transport/protocol error taxonomy
//! - **Traits**: the async remote store boundary (`async` feature)
//!
//! # Features
//!
//! - `async`: Enable the [`RemoteStore`] trait
//! - `serde`: Enable serialization support
//!
//! # Examples
//!
//! ```rust
//! use pubsync_types::{Fingerprint, Manifest};
//!
//! let mut local = Manifest::new();
//! local.insert("index.md", Fingerprint::of(b"# Hello"));
//! assert_eq!(local.len(), 1);
//! assert_eq!(local.get("index.md"), Some(&Fingerprint::of(b"# Hello")));
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod manifest;
pub mod result;
#[cfg(feature = "async")]
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::{SymlinkPolicy, TimeoutConfig};
pub use error::{Error, ErrorKind};
pub use fingerprint::{Fingerprint, ParseFingerprintError};
pub use manifest::{ChangeSet, Manifest};
pub use result::Result;
#[cfg(feature = "async")]
pub use traits::*;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_stats_creation() {
        let stats = SyncStats::new();
        assert_eq!(stats.added, 0);
        assert_eq!(stats.updated, 0);
        assert_eq!(stats.removed, 0);
        assert_eq!(stats.operations(), 0);
    }

    #[test]
    fn test_sync_stats_record() {
        let mut stats = SyncStats::new();
        stats.record(ChangeAction::Add, 100);
        stats.record(ChangeAction::Update, 50);
        stats.record(ChangeAction::Remove, 0);
        stats.record(ChangeAction::Add, 10);

        assert_eq!(stats.added, 2);
        assert_eq!(stats.updated, 1);
        assert_eq!(stats.removed, 1);
        assert_eq!(stats.bytes_uploaded, 160);
        assert_eq!(stats.operations(), 4);
    }

    #[test]
    fn test_error_kind() {
        let error = Error::transport("connection reset");
        assert_eq!(error.kind(), ErrorKind::Transport);
        assert!(error.is_remote());

        let error = Error::config("missing site");
        assert_eq!(error.kind(), ErrorKind::Config);
        assert!(!error.is_remote());
    }
}
