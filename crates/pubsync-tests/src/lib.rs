//! pubsync integration testing support
//!
//! This crate hosts the end-to-end tests of the publishing pipeline and the
//! helpers they share: an in-process fake of the publishing API and site
//! tree builders.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Unified test utilities
///
/// Shared by the integration tests so every scenario drives the same fake
/// publishing API.
pub mod test_utils;
