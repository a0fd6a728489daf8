//! Content fingerprints
//!
//! A [`Fingerprint`] is the SHA-256 digest of a file's bytes. The same
//! function fingerprints files found by the scanner and the bytes sent with
//! an upload, so a fingerprint computed locally compares equal to the one
//! the remote store reports for identical content.

use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// SHA-256 digest of a byte sequence
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; Fingerprint::LEN]);

/// Error returned when a string is not a hex encoded fingerprint
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid fingerprint '{input}': {reason}")]
pub struct ParseFingerprintError {
    input: String,
    reason: String,
}

impl Fingerprint {
    /// Digest length in bytes
    pub const LEN: usize = 32;

    /// Fingerprint a byte sequence
    pub fn of(bytes: &[u8]) -> Self {
        Self(Sha256::digest(bytes).into())
    }

    /// Wrap a raw digest
    pub fn from_bytes(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    /// Lowercase hex rendering, as sent over the wire
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a hex rendering (either case)
    pub fn from_hex(input: &str) -> Result<Self, ParseFingerprintError> {
        let mut bytes = [0u8; Self::LEN];
        hex::decode_to_slice(input, &mut bytes).map_err(|e| ParseFingerprintError {
            // Keep error messages bounded when the remote sends garbage.
            input: input.chars().take(2 * Self::LEN + 8).collect(),
            reason: e.to_string(),
        })?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.to_hex())
    }
}

impl FromStr for Fingerprint {
    type Err = ParseFingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Fingerprint {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Fingerprint {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
