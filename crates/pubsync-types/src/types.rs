//! Core data types for pubsync
//!
//! Run statistics, change actions and remote-store credentials.

use std::fmt;

use crate::{Error, Result};

/// Statistics of a sync run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SyncStats {
    /// Number of files added to the remote store
    pub added: u64,
    /// Number of files updated on the remote store
    pub updated: u64,
    /// Number of files removed from the remote store
    pub removed: u64,
    /// Number of files already up to date
    pub unchanged: u64,
    /// Number of local files dropped by the exclusion predicate
    pub excluded: u64,
    /// Total bytes sent by uploads
    pub bytes_uploaded: u64,
}

impl SyncStats {
    /// Create a new empty statistics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one applied change
    pub fn record(&mut self, action: ChangeAction, bytes: u64) {
        match action {
            ChangeAction::Add => self.added += 1,
            ChangeAction::Update => self.updated += 1,
            ChangeAction::Remove => self.removed += 1,
        }
        self.bytes_uploaded += bytes;
    }

    /// Number of applied add, update and remove operations
    pub fn operations(&self) -> u64 {
        self.added + self.updated + self.removed
    }
}

/// Kind of remote operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ChangeAction {
    /// Upload of a file the remote store does not have
    Add,
    /// Upload of a file whose content changed
    Update,
    /// Removal of a file that no longer exists locally
    Remove,
}

impl ChangeAction {
    /// Whether the action uploads local bytes
    pub fn is_upload(self) -> bool {
        matches!(self, Self::Add | Self::Update)
    }
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "add",
            Self::Update => "update",
            Self::Remove => "remove",
        })
    }
}

/// Secret access token for the remote store
///
/// `Debug` and `Display` never render the secret; use [`AccessToken::expose`]
/// at the point where it goes on the wire.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Placeholder rendered instead of the secret
    pub const REDACTED: &'static str = "********";

    /// Wrap a secret token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw secret
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the token is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy of `text` with every occurrence of the secret replaced
    pub fn redact(&self, text: &str) -> String {
        if self.0.is_empty() {
            return text.to_string();
        }
        text.replace(&self.0, Self::REDACTED)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken({})", Self::REDACTED)
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::REDACTED)
    }
}

/// Site identifier and access token for one remote site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    site: String,
    token: AccessToken,
}

impl Credentials {
    /// Create credentials, rejecting blank values
    pub fn new(site: impl Into<String>, token: AccessToken) -> Result<Self> {
        let site = site.into().trim().to_string();
        if site.is_empty() {
            return Err(Error::config("site identifier must not be empty"));
        }
        if token.expose().trim().is_empty() {
            return Err(Error::config("access token must not be empty"));
        }
        Ok(Self { site, token })
    }

    /// Site identifier
    pub fn site(&self) -> &str {
        &self.site
    }

    /// Access token
    pub fn token(&self) -> &AccessToken {
        &self.token
    }
}
