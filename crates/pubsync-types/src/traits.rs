//! Core traits for pubsync operations
//!
//! The remote store is the external capability the sync core consumes. The
//! HTTP implementation lives in `pubsync-remote`; tests substitute in-memory
//! stores.

use crate::{Credentials, Fingerprint, Manifest, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Remote content store holding the published files of a site
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch the current path to fingerprint mapping of the site
    ///
    /// Fails with [`crate::Error::Auth`] when the credentials are rejected,
    /// [`crate::Error::Transport`] when the store cannot be reached and
    /// [`crate::Error::Protocol`] when the answer is not a well-formed
    /// manifest.
    async fn list(&self, credentials: &Credentials) -> Result<Manifest>;

    /// Store `bytes` under `path`, advertising `fingerprint`
    ///
    /// Uploading the same path with the same bytes twice leaves the remote
    /// state unchanged after the second call.
    async fn upload(
        &self,
        credentials: &Credentials,
        path: &str,
        bytes: Vec<u8>,
        fingerprint: &Fingerprint,
    ) -> Result<()>;

    /// Delete `path`; removing an absent path succeeds
    async fn remove(&self, credentials: &Credentials, path: &str) -> Result<()>;
}

#[async_trait]
impl<T: RemoteStore + ?Sized> RemoteStore for Arc<T> {
    async fn list(&self, credentials: &Credentials) -> Result<Manifest> {
        (**self).list(credentials).await
    }

    async fn upload(
        &self,
        credentials: &Credentials,
        path: &str,
        bytes: Vec<u8>,
        fingerprint: &Fingerprint,
    ) -> Result<()> {
        (**self).upload(credentials, path, bytes, fingerprint).await
    }

    async fn remove(&self, credentials: &Credentials, path: &str) -> Result<()> {
        (**self).remove(credentials, path).await
    }
}
