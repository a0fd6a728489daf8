//! Result type alias for pubsync operations

use crate::Error;

/// Result type alias for pubsync operations
pub type Result<T> = std::result::Result<T, Error>;
