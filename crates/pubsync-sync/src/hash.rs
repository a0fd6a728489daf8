//! Reading and fingerprinting local files

use pubsync_types::{Error, Fingerprint, Result};
use std::path::Path;
use tokio::fs;

/// Read the whole file at `path` and fingerprint its content
///
/// The scanner and the executor both go through this function, so a file
/// that did not change between scan and upload always yields the same
/// fingerprint.
pub async fn read_and_fingerprint(path: &Path) -> Result<(Vec<u8>, Fingerprint)> {
    let bytes = fs::read(path)
        .await
        .map_err(|e| Error::filesystem(path, e))?;
    let fingerprint = Fingerprint::of(&bytes);
    Ok((bytes, fingerprint))
}
