//! Wire format of the publishing API

use pubsync_types::{Error, Fingerprint, Manifest, Result};
use serde::{Deserialize, Serialize};

/// Endpoint returning the remote manifest
pub const LIST_ENDPOINT: &str = "/api/list";
/// Endpoint storing one file
pub const UPLOAD_ENDPOINT: &str = "/api/upload";
/// Endpoint deleting one file
pub const REMOVE_ENDPOINT: &str = "/api/remove";

/// Upload header carrying the hex fingerprint
pub const HASH_HEADER: &str = "obs-hash";
/// Upload header carrying the site identifier
pub const SITE_HEADER: &str = "obs-id";
/// Upload header carrying the normalized path
pub const PATH_HEADER: &str = "obs-path";
/// Upload header carrying the access token
pub const TOKEN_HEADER: &str = "obs-token";

/// Body of a list request
#[derive(Serialize)]
pub struct ListRequest<'a> {
    /// Site identifier
    pub id: &'a str,
    /// Access token
    pub token: &'a str,
}

/// Body of a remove request
#[derive(Serialize)]
pub struct RemoveRequest<'a> {
    /// Site identifier
    pub id: &'a str,
    /// Path to delete
    pub path: &'a str,
    /// Access token
    pub token: &'a str,
}

/// One file in a list response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListEntry {
    /// Normalized path
    pub path: String,
    /// Hex SHA-256 of the stored content
    pub hash: String,
}

/// Parse a list response body into a manifest
///
/// The body must be a JSON array of entries with unique paths and valid
/// fingerprints.
pub fn parse_list_response(body: &[u8]) -> Result<Manifest> {
    let entries: Vec<ListEntry> = serde_json::from_slice(body)
        .map_err(|e| Error::protocol(format!("Malformed list response: {}", e)))?;

    let mut manifest = Manifest::new();
    for entry in entries {
        let fingerprint = Fingerprint::from_hex(&entry.hash).map_err(|e| {
            Error::protocol(format!("Invalid hash for '{}': {}", entry.path, e))
        })?;
        if manifest.insert(entry.path.as_str(), fingerprint).is_some() {
            return Err(Error::protocol(format!(
                "Duplicate path in list response: '{}'",
                entry.path
            )));
        }
    }

    Ok(manifest)
}
