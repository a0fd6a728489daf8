//! Applying a change set to the remote store

use crate::hash::read_and_fingerprint;
use crate::progress::{ProgressReporter, SyncPhase};
use futures::stream::{self, StreamExt};
use pubsync_types::{
    ChangeAction, ChangeSet, Credentials, Error, Fingerprint, Manifest, RemoteStore, Result,
    SyncStats,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Execution options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorOptions {
    /// Maximum number of in-flight operations within one phase
    pub concurrency: usize,
    /// Log the planned operations without reading files or touching the store
    pub dry_run: bool,
}

impl ExecutorOptions {
    /// Set the per-phase concurrency (values below 1 mean 1)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Enable or disable dry run
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            dry_run: false,
        }
    }
}

/// A remote operation that completed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedChange {
    /// Kind of operation
    pub action: ChangeAction,
    /// Normalized path
    pub path: String,
    /// Fingerprint that was uploaded (absent for removals and dry runs)
    pub fingerprint: Option<Fingerprint>,
    /// Bytes uploaded
    pub bytes: u64,
}

/// The operation that aborted a run
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Failed to {action} '{path}': {error}")]
pub struct RunFailure {
    /// Operation being attempted
    pub action: ChangeAction,
    /// Path being processed
    pub path: String,
    /// Terminal error
    #[source]
    pub error: Error,
}

/// Outcome of a run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Run identifier
    pub run_id: uuid::Uuid,
    /// Counts of applied operations
    pub stats: SyncStats,
    /// Completed operations in completion order
    pub applied: Vec<AppliedChange>,
    /// Set when the run aborted
    pub failure: Option<RunFailure>,
    /// Elapsed time
    pub duration: Duration,
    /// Whether this was a dry run
    pub dry_run: bool,
}

impl RunReport {
    /// Create an empty report
    pub fn new(run_id: uuid::Uuid) -> Self {
        Self {
            run_id,
            stats: SyncStats::new(),
            applied: Vec::new(),
            failure: None,
            duration: Duration::ZERO,
            dry_run: false,
        }
    }

    /// Whether every planned operation was applied
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Convert a failed report into its failure
    pub fn into_result(self) -> std::result::Result<Self, RunFailure> {
        match self.failure {
            Some(failure) => Err(failure),
            None => Ok(self),
        }
    }

    fn record(&mut self, change: AppliedChange) {
        self.stats.record(change.action, change.bytes);
        self.applied.push(change);
    }
}

/// Applies change sets to a remote store
///
/// Additions run first, then updates, then removals. A phase starts only
/// once the previous one finished, and the first failure ends the run.
pub struct SyncExecutor<S> {
    store: S,
    credentials: Credentials,
    root: PathBuf,
    options: ExecutorOptions,
    remote: Manifest,
    progress: Option<ProgressReporter>,
}

impl<S: RemoteStore> SyncExecutor<S> {
    /// Create an executor uploading files found under `root`
    pub fn new<P: AsRef<Path>>(store: S, credentials: Credentials, root: P) -> Self {
        Self {
            store,
            credentials,
            root: root.as_ref().to_path_buf(),
            options: ExecutorOptions::default(),
            remote: Manifest::new(),
            progress: None,
        }
    }

    /// Set execution options
    pub fn with_options(mut self, options: ExecutorOptions) -> Self {
        self.options = options;
        self
    }

    /// Remote manifest the change set was computed against, used for logging
    pub fn with_remote_manifest(mut self, remote: Manifest) -> Self {
        self.remote = remote;
        self
    }

    /// Report progress through `progress`
    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Execution options in use
    pub fn options(&self) -> &ExecutorOptions {
        &self.options
    }

    /// Apply `changes` and report what happened
    pub async fn execute(&self, changes: &ChangeSet) -> RunReport {
        self.execute_with_id(changes, uuid::Uuid::new_v4()).await
    }

    /// Apply `changes` under a caller-chosen run identifier
    pub async fn execute_with_id(&self, changes: &ChangeSet, run_id: uuid::Uuid) -> RunReport {
        let start_time = Instant::now();
        let mut report = RunReport::new(run_id);
        report.dry_run = self.options.dry_run;
        report.stats.unchanged = changes.unchanged.len() as u64;

        if let Some(progress) = &self.progress {
            progress.set_total(changes.len() as u64).await;
        }

        let phases = [
            (ChangeAction::Add, &changes.to_add),
            (ChangeAction::Update, &changes.to_update),
            (ChangeAction::Remove, &changes.to_remove),
        ];

        for (action, paths) in phases {
            info!("{}", phase_header(action, paths.len()));
            if paths.is_empty() {
                continue;
            }

            if let Some(progress) = &self.progress {
                progress.set_phase(SyncPhase::for_action(action)).await;
            }

            if let Err(failure) = self.run_phase(action, paths, &mut report).await {
                error!("{}", failure);
                if let Some(progress) = &self.progress {
                    progress.failed(failure.to_string()).await;
                }
                report.failure = Some(failure);
                break;
            }
        }

        report.duration = start_time.elapsed();
        if report.is_success() {
            if let Some(progress) = &self.progress {
                progress.completed().await;
            }
        }

        report
    }

    async fn run_phase(
        &self,
        action: ChangeAction,
        paths: &BTreeSet<String>,
        report: &mut RunReport,
    ) -> std::result::Result<(), RunFailure> {
        let mut operations = stream::iter(paths.iter().map(|path| self.apply(action, path)))
            .buffer_unordered(self.options.concurrency.max(1));

        // Returning early drops the stream, cancelling operations in flight.
        while let Some(result) = operations.next().await {
            report.record(result?);
        }

        Ok(())
    }

    async fn apply(
        &self,
        action: ChangeAction,
        path: &str,
    ) -> std::result::Result<AppliedChange, RunFailure> {
        if let Some(progress) = &self.progress {
            progress.operation_started(action, path).await;
        }

        let result = if action.is_upload() {
            self.upload(action, path).await
        } else {
            self.remove(path).await
        };

        let applied = result.map_err(|error| RunFailure {
            action,
            path: path.to_string(),
            error,
        })?;

        if let Some(progress) = &self.progress {
            progress
                .operation_completed(action, path, applied.bytes)
                .await;
        }

        Ok(applied)
    }

    async fn upload(&self, action: ChangeAction, path: &str) -> Result<AppliedChange> {
        if self.options.dry_run {
            info!("DRY RUN: Would {} {}", action, path);
            return Ok(AppliedChange {
                action,
                path: path.to_string(),
                fingerprint: None,
                bytes: 0,
            });
        }

        // Re-read so the uploaded bytes and the advertised fingerprint agree.
        let (bytes, fingerprint) = read_and_fingerprint(&self.local_path(path)).await?;

        match (action, self.remote.get(path)) {
            (ChangeAction::Update, Some(old)) => {
                info!("Updating {} ({} -> {})", path, old, fingerprint);
            }
            (ChangeAction::Update, None) => info!("Updating {} ({})", path, fingerprint),
            _ => info!("Adding {} ({})", path, fingerprint),
        }

        let size = bytes.len() as u64;
        self.store
            .upload(&self.credentials, path, bytes, &fingerprint)
            .await?;

        Ok(AppliedChange {
            action,
            path: path.to_string(),
            fingerprint: Some(fingerprint),
            bytes: size,
        })
    }

    async fn remove(&self, path: &str) -> Result<AppliedChange> {
        if self.options.dry_run {
            info!("DRY RUN: Would remove {}", path);
        } else {
            match self.remote.get(path) {
                Some(fingerprint) => info!("Removing {} ({})", path, fingerprint),
                None => info!("Removing {}", path),
            }
            self.store.remove(&self.credentials, path).await?;
        }

        Ok(AppliedChange {
            action: ChangeAction::Remove,
            path: path.to_string(),
            fingerprint: None,
            bytes: 0,
        })
    }

    fn local_path(&self, path: &str) -> PathBuf {
        path.split('/')
            .fold(self.root.clone(), |local, part| local.join(part))
    }
}

impl<S> std::fmt::Debug for SyncExecutor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncExecutor")
            .field("credentials", &self.credentials)
            .field("root", &self.root)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// `"Adding 3 files"`, logged for every phase including empty ones
fn phase_header(action: ChangeAction, count: usize) -> String {
    format!("{} {}", phase_verb(action), pluralize(count, "file"))
}

fn phase_verb(action: ChangeAction) -> &'static str {
    match action {
        ChangeAction::Add => "Adding",
        ChangeAction::Update => "Updating",
        ChangeAction::Remove => "Removing",
    }
}

/// `"1 file"`, `"3 files"`
pub fn pluralize(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}
