//! The publishing pipeline: scan, list, reconcile, execute

use crate::exclude::Exclusions;
use crate::executor::{pluralize, ExecutorOptions, RunReport, SyncExecutor};
use crate::progress::{ProgressReporter, SyncPhase};
use crate::reconcile::reconcile;
use crate::scanner::LocalScanner;
use pubsync_types::{Credentials, RemoteStore, Result, SymlinkPolicy};
use std::path::{Path, PathBuf};
use tracing::info;

/// Publishes a local directory to a remote store
///
/// Errors while scanning the local tree or listing the remote store are
/// returned as `Err`; nothing was changed remotely at that point. Failures
/// while applying changes are carried in the returned [`RunReport`].
pub struct Publisher<S> {
    store: S,
    credentials: Credentials,
    root: PathBuf,
    exclusions: Exclusions,
    symlinks: SymlinkPolicy,
    options: ExecutorOptions,
    progress: Option<ProgressReporter>,
}

impl<S: RemoteStore> Publisher<S> {
    /// Create a publisher for the current directory with the default exclusions
    pub fn new(store: S, credentials: Credentials) -> Self {
        Self {
            store,
            credentials,
            root: PathBuf::from("."),
            exclusions: Exclusions::default(),
            symlinks: SymlinkPolicy::default(),
            options: ExecutorOptions::default(),
            progress: None,
        }
    }

    /// Set the sync root
    pub fn with_root<P: AsRef<Path>>(mut self, root: P) -> Self {
        self.root = root.as_ref().to_path_buf();
        self
    }

    /// Set the exclusion rules
    pub fn with_exclusions(mut self, exclusions: Exclusions) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Set the symbolic link policy
    pub fn with_symlinks(mut self, symlinks: SymlinkPolicy) -> Self {
        self.symlinks = symlinks;
        self
    }

    /// Set execution options
    pub fn with_options(mut self, options: ExecutorOptions) -> Self {
        self.options = options;
        self
    }

    /// Report progress through `progress`
    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Run the pipeline once
    pub async fn publish(self) -> Result<RunReport> {
        let run_id = uuid::Uuid::new_v4();
        info!(
            "Publishing '{}' to site {} (run {})",
            self.root.display(),
            self.credentials.site(),
            run_id
        );

        self.set_phase(SyncPhase::ScanningLocal).await;
        let scan = LocalScanner::new(&self.root, self.exclusions.clone())
            .with_symlinks(self.symlinks)
            .scan()
            .await;
        let scan = self.check(scan).await?;
        info!("Got {} locally", pluralize(scan.manifest.len(), "file"));

        self.set_phase(SyncPhase::ListingRemote).await;
        let remote = self.store.list(&self.credentials).await;
        let remote = self.check(remote).await?;
        info!("Got {} remotely", pluralize(remote.len(), "file"));

        self.set_phase(SyncPhase::Reconciling).await;
        let changes = reconcile(&scan.manifest, &remote);
        if changes.is_empty() {
            info!(
                "Remote site is up to date ({} unchanged)",
                pluralize(changes.unchanged.len(), "file")
            );
        } else {
            info!(
                "Planned {}: {} to add, {} to update, {} to remove",
                pluralize(changes.len(), "operation"),
                changes.to_add.len(),
                changes.to_update.len(),
                changes.to_remove.len()
            );
        }

        let mut executor = SyncExecutor::new(self.store, self.credentials, &self.root)
            .with_options(self.options)
            .with_remote_manifest(remote);
        if let Some(progress) = self.progress {
            executor = executor.with_progress(progress);
        }

        let mut report = executor.execute_with_id(&changes, run_id).await;
        report.stats.excluded = scan.excluded.len() as u64;

        if report.is_success() {
            info!(
                "Published {} in {:?}",
                pluralize(report.stats.operations() as usize, "change"),
                report.duration
            );
        }

        Ok(report)
    }

    async fn set_phase(&self, phase: SyncPhase) {
        if let Some(progress) = &self.progress {
            progress.set_phase(phase).await;
        }
    }

    async fn check<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(error) = &result {
            if let Some(progress) = &self.progress {
                progress.failed(error.to_string()).await;
            }
        }
        result
    }
}

impl<S> std::fmt::Debug for Publisher<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("credentials", &self.credentials)
            .field("root", &self.root)
            .field("exclusions", &self.exclusions)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pubsync_types::{AccessToken, ChangeAction, Error, ErrorKind, Fingerprint, Manifest};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Default)]
    struct MemoryStore {
        files: Mutex<Manifest>,
        uploads: Mutex<Vec<String>>,
        list_error: Option<Error>,
    }

    #[async_trait]
    impl RemoteStore for MemoryStore {
        async fn list(&self, _credentials: &Credentials) -> Result<Manifest> {
            match &self.list_error {
                Some(error) => Err(error.clone()),
                None => Ok(self.files.lock().unwrap().clone()),
            }
        }

        async fn upload(
            &self,
            _credentials: &Credentials,
            path: &str,
            _bytes: Vec<u8>,
            fingerprint: &Fingerprint,
        ) -> Result<()> {
            self.uploads.lock().unwrap().push(path.to_string());
            self.files.lock().unwrap().insert(path, *fingerprint);
            Ok(())
        }

        async fn remove(&self, _credentials: &Credentials, path: &str) -> Result<()> {
            self.files.lock().unwrap().remove(path);
            Ok(())
        }
    }

    fn credentials() -> Credentials {
        Credentials::new("site-id", AccessToken::new("secret-token")).unwrap()
    }

    async fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        tokio::fs::create_dir_all(path.parent().unwrap())
            .await
            .unwrap();
        tokio::fs::write(path, content).await.unwrap();
    }

    fn publisher(store: &Arc<MemoryStore>, root: &Path) -> Publisher<Arc<MemoryStore>> {
        Publisher::new(store.clone(), credentials()).with_root(root)
    }

    #[tokio::test]
    async fn test_fresh_publish_then_no_op() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "a.md", "A").await;
        write(temp_dir.path(), "img/b.png", "B").await;
        write(temp_dir.path(), ".obsidian/workspace.json", "{}").await;
        let store = Arc::new(MemoryStore::default());

        let first = publisher(&store, temp_dir.path()).publish().await.unwrap();
        assert!(first.is_success());
        assert_eq!(first.stats.added, 2);
        assert_eq!(first.stats.excluded, 1);
        assert_eq!(
            *store.uploads.lock().unwrap(),
            vec!["a.md".to_string(), "img/b.png".to_string()]
        );

        let second = publisher(&store, temp_dir.path()).publish().await.unwrap();
        assert!(second.applied.is_empty());
        assert_eq!(second.stats.unchanged, 2);
        assert_eq!(store.uploads.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_and_stale_removal() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "a.md", "A2").await;
        let store = Arc::new(MemoryStore::default());
        {
            let mut files = store.files.lock().unwrap();
            files.insert("a.md", Fingerprint::of(b"A"));
            files.insert("old.md", Fingerprint::of(b"O"));
        }

        let report = publisher(&store, temp_dir.path()).publish().await.unwrap();
        let actions: Vec<ChangeAction> = report.applied.iter().map(|c| c.action).collect();
        assert_eq!(actions, vec![ChangeAction::Update, ChangeAction::Remove]);

        let files = store.files.lock().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files.get("a.md"), Some(&Fingerprint::of(b"A2")));
    }

    #[tokio::test]
    async fn test_list_error_is_returned_before_any_change() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "a.md", "A").await;
        let store = Arc::new(MemoryStore {
            list_error: Some(Error::auth("invalid token")),
            ..MemoryStore::default()
        });
        let mut reporter = ProgressReporter::new(uuid::Uuid::new_v4());
        let _events = reporter.take_event_receiver();

        let error = publisher(&store, temp_dir.path())
            .with_progress(reporter.clone())
            .publish()
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Auth);
        assert!(store.uploads.lock().unwrap().is_empty());
        assert_eq!(reporter.get_progress().await.phase, SyncPhase::Failed);
    }

    #[tokio::test]
    async fn test_dry_run_publish() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "a.md", "A").await;
        let store = Arc::new(MemoryStore::default());

        let report = publisher(&store, temp_dir.path())
            .with_options(ExecutorOptions::default().with_dry_run(true))
            .publish()
            .await
            .unwrap();

        assert_eq!(report.stats.added, 1);
        assert!(store.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_root_is_filesystem_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(MemoryStore::default());

        let error = publisher(&store, &temp_dir.path().join("missing"))
            .publish()
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Filesystem);
    }

    #[tokio::test]
    async fn test_into_result_on_success() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(MemoryStore::default());
        store
            .files
            .lock()
            .unwrap()
            .insert("gone.md", Fingerprint::of(b"G"));

        let report = publisher(&store, temp_dir.path())
            .publish()
            .await
            .unwrap()
            .into_result()
            .unwrap();
        assert_eq!(report.stats.removed, 1);
        assert!(store.files.lock().unwrap().is_empty());
    }
}
