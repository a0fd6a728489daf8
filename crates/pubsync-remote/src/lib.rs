//! HTTP remote store for pubsync
//!
//! [`HttpRemoteStore`] implements [`pubsync_types::RemoteStore`] against the
//! publishing API: a manifest listing endpoint, a raw-bytes upload endpoint
//! and a removal endpoint, all authenticated by site identifier and token.
//!
//! # Examples
//!
//! ```rust,no_run
//! use pubsync_config::RemoteConfig;
//! use pubsync_remote::HttpRemoteStore;
//! use pubsync_types::{AccessToken, Credentials, RemoteStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = HttpRemoteStore::from_config(&RemoteConfig::default())?;
//! let credentials = Credentials::new("my-site", AccessToken::new("token"))?;
//! let manifest = store.list(&credentials).await?;
//! println!("Site holds {} files", manifest.len());
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod protocol;

pub use client::HttpRemoteStore;
pub use protocol::{parse_list_response, ListEntry};
