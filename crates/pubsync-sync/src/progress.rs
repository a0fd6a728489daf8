//! Progress tracking for publishing runs

use pubsync_types::ChangeAction;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, RwLock};
use tracing::debug;

/// Progress information for a publishing run
#[derive(Debug, Clone)]
pub struct SyncProgress {
    /// Run identifier
    pub run_id: uuid::Uuid,
    /// Current phase
    pub phase: SyncPhase,
    /// Path of the operation currently in flight, if any
    pub current_path: Option<String>,
    /// Remote operations finished so far
    pub operations_done: u64,
    /// Remote operations planned for the run
    pub operations_total: u64,
    /// Bytes uploaded so far
    pub bytes_uploaded: u64,
    /// Start time of the run
    pub start_time: Instant,
}

/// Phases of a publishing run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    /// Nothing started yet
    Initializing,
    /// Walking and hashing the local tree
    ScanningLocal,
    /// Fetching the remote manifest
    ListingRemote,
    /// Computing the change set
    Reconciling,
    /// Uploading new files
    Adding,
    /// Uploading changed files
    Updating,
    /// Removing stale files
    Removing,
    /// Run finished
    Completed,
    /// Run aborted
    Failed,
}

impl SyncPhase {
    /// Executor phase for an action
    pub fn for_action(action: ChangeAction) -> Self {
        match action {
            ChangeAction::Add => Self::Adding,
            ChangeAction::Update => Self::Updating,
            ChangeAction::Remove => Self::Removing,
        }
    }
}

impl SyncProgress {
    /// Create a new sync progress
    pub fn new(run_id: uuid::Uuid) -> Self {
        Self {
            run_id,
            phase: SyncPhase::Initializing,
            current_path: None,
            operations_done: 0,
            operations_total: 0,
            bytes_uploaded: 0,
            start_time: Instant::now(),
        }
    }

    /// Update the current phase
    pub fn set_phase(&mut self, phase: SyncPhase) {
        self.phase = phase;
        debug!("Sync phase changed to: {:?}", phase);
    }

    /// Percentage of planned operations finished
    pub fn percent_complete(&self) -> f64 {
        if self.operations_total > 0 {
            (self.operations_done as f64 / self.operations_total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Get elapsed time
    pub fn elapsed_time(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Check if the run is over
    pub fn is_complete(&self) -> bool {
        matches!(self.phase, SyncPhase::Completed | SyncPhase::Failed)
    }
}

/// Progress event types
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Phase changed
    PhaseChanged(SyncPhase),
    /// Remote operation started
    OperationStarted(ChangeAction, String),
    /// Remote operation finished
    OperationCompleted(ChangeAction, String, u64), // action, path, bytes
    /// Run completed
    Completed(SyncProgress),
    /// Run failed
    Failed(String),
}

/// Progress reporter shared by the pipeline stages
#[derive(Debug)]
pub struct ProgressReporter {
    progress: Arc<RwLock<SyncProgress>>,
    event_tx: mpsc::UnboundedSender<ProgressEvent>,
    event_rx: Option<mpsc::UnboundedReceiver<ProgressEvent>>,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new(run_id: uuid::Uuid) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let progress = Arc::new(RwLock::new(SyncProgress::new(run_id)));

        Self {
            progress,
            event_tx,
            event_rx: Some(event_rx),
        }
    }

    /// Get the current progress
    pub async fn get_progress(&self) -> SyncProgress {
        self.progress.read().await.clone()
    }

    /// Take the event receiver (can only be called once)
    pub fn take_event_receiver(&mut self) -> Option<mpsc::UnboundedReceiver<ProgressEvent>> {
        self.event_rx.take()
    }

    /// Update the current phase
    pub async fn set_phase(&self, phase: SyncPhase) {
        self.progress.write().await.set_phase(phase);
        let _ = self.event_tx.send(ProgressEvent::PhaseChanged(phase));
    }

    /// Set the number of planned remote operations
    pub async fn set_total(&self, operations_total: u64) {
        self.progress.write().await.operations_total = operations_total;
    }

    /// Report an operation started
    pub async fn operation_started(&self, action: ChangeAction, path: &str) {
        self.progress.write().await.current_path = Some(path.to_string());
        let _ = self
            .event_tx
            .send(ProgressEvent::OperationStarted(action, path.to_string()));
    }

    /// Report an operation finished
    pub async fn operation_completed(&self, action: ChangeAction, path: &str, bytes: u64) {
        {
            let mut progress = self.progress.write().await;
            progress.operations_done += 1;
            progress.bytes_uploaded += bytes;
            progress.current_path = None;
        }

        let _ = self.event_tx.send(ProgressEvent::OperationCompleted(
            action,
            path.to_string(),
            bytes,
        ));
    }

    /// Report the run completed
    pub async fn completed(&self) {
        self.progress.write().await.set_phase(SyncPhase::Completed);
        let progress = self.get_progress().await;
        let _ = self.event_tx.send(ProgressEvent::Completed(progress));
    }

    /// Report the run failed
    pub async fn failed(&self, error: String) {
        self.progress.write().await.set_phase(SyncPhase::Failed);
        let _ = self.event_tx.send(ProgressEvent::Failed(error));
    }
}

impl Clone for ProgressReporter {
    fn clone(&self) -> Self {
        Self {
            progress: Arc::clone(&self.progress),
            event_tx: self.event_tx.clone(),
            event_rx: None, // Clone doesn't get the receiver
        }
    }
}
