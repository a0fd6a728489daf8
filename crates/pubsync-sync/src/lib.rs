//! Publishing engine for pubsync
//!
//! This crate turns a local directory into the exact content of a remote
//! site:
//!
//! - **Scanning**: walk the sync root and fingerprint every included file
//! - **Exclusions**: keep version control and tool metadata out of the site
//! - **Reconciliation**: compare local and remote manifests into a change set
//! - **Execution**: apply additions, updates and removals phase by phase
//! - **Progress Tracking**: phase and operation events for observers
//!
//! # Examples
//!
//! ```rust,no_run
//! use pubsync_sync::{ExecutorOptions, Publisher};
//! use pubsync_types::{AccessToken, Credentials, RemoteStore};
//!
//! # async fn example<S: RemoteStore>(store: S) -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = Credentials::new("my-site", AccessToken::new("token"))?;
//! let report = Publisher::new(store, credentials)
//!     .with_options(ExecutorOptions::default().with_concurrency(4))
//!     .publish()
//!     .await?
//!     .into_result()?;
//! println!("Applied {} changes", report.stats.operations());
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod exclude;
pub mod executor;
pub mod hash;
pub mod progress;
pub mod publisher;
pub mod reconcile;
pub mod scanner;

pub use exclude::{Exclusions, DEFAULT_EXCLUDE_PATTERN};
pub use executor::{AppliedChange, ExecutorOptions, RunFailure, RunReport, SyncExecutor};
pub use hash::read_and_fingerprint;
pub use progress::{ProgressEvent, ProgressReporter, SyncPhase, SyncProgress};
pub use publisher::Publisher;
pub use reconcile::reconcile;
pub use scanner::{LocalScanner, ScanOutcome};
