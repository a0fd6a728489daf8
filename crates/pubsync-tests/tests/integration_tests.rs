//! Integration tests for pubsync
//!
//! These tests run the whole pipeline (scan, list, reconcile, execute)
//! against a stateful fake of the publishing API over real HTTP.

use pubsync_config::RemoteConfig;
use pubsync_remote::HttpRemoteStore;
use pubsync_sync::{ExecutorOptions, Publisher, RunReport};
use pubsync_tests::test_utils::{create_site_tree, credentials, FakePublishApi};
use pubsync_types::{AccessToken, ChangeAction, Credentials, ErrorKind, Fingerprint};
use std::path::Path;
use tempfile::TempDir;
use wiremock::MockServer;

fn store_for(server: &MockServer) -> HttpRemoteStore {
    let config = RemoteConfig {
        base_url: server.uri(),
        ..RemoteConfig::default()
    };
    HttpRemoteStore::from_config(&config).unwrap()
}

async fn publish(server: &MockServer, root: &Path) -> RunReport {
    publish_with(server, root, ExecutorOptions::default()).await
}

async fn publish_with(server: &MockServer, root: &Path, options: ExecutorOptions) -> RunReport {
    Publisher::new(store_for(server), credentials())
        .with_root(root)
        .with_options(options)
        .publish()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_fresh_publish_then_second_run_is_no_op() {
    let temp_dir = TempDir::new().unwrap();
    create_site_tree(
        temp_dir.path(),
        &[
            ("index.md", "# Home"),
            ("notes/a.md", "alpha"),
            ("assets/img/logo.svg", "<svg/>"),
        ],
    );
    let (server, api) = FakePublishApi::start().await;

    let first = publish(&server, temp_dir.path()).await;
    assert!(first.is_success());
    assert_eq!(first.stats.added, 3);
    assert_eq!(
        api.files().get("notes/a.md"),
        Some(&Fingerprint::of(b"alpha"))
    );

    let second = publish(&server, temp_dir.path()).await;
    assert!(second.is_success());
    assert!(second.applied.is_empty());
    assert_eq!(second.stats.unchanged, 3);
    assert_eq!(api.uploads().len(), 3);
    assert!(api.removals().is_empty());
}

#[tokio::test]
async fn test_excluded_files_are_never_uploaded() {
    let temp_dir = TempDir::new().unwrap();
    create_site_tree(
        temp_dir.path(),
        &[
            ("a.md", "A"),
            (".git/HEAD", "ref: refs/heads/main"),
            (".git/config", "[core]"),
            (".obsidian/app.json", "{}"),
            ("node_modules/pkg/index.js", "module.exports = 1"),
            (".github/workflows/publish.yml", "on: push"),
        ],
    );
    let (server, api) = FakePublishApi::start().await;

    let report = publish(&server, temp_dir.path()).await;
    assert_eq!(report.stats.added, 1);
    assert_eq!(report.stats.excluded, 5);
    assert_eq!(api.uploads(), vec!["a.md".to_string()]);
}

#[tokio::test]
async fn test_content_change_and_stale_removal() {
    let temp_dir = TempDir::new().unwrap();
    create_site_tree(temp_dir.path(), &[("a.md", "new"), ("b.md", "same")]);
    let (server, api) = FakePublishApi::start().await;
    api.seed("a.md", b"old");
    api.seed("b.md", b"same");
    api.seed("deleted.md", b"gone");

    let report = publish(&server, temp_dir.path()).await;
    assert!(report.is_success());

    let actions: Vec<(ChangeAction, &str)> = report
        .applied
        .iter()
        .map(|change| (change.action, change.path.as_str()))
        .collect();
    assert_eq!(
        actions,
        vec![
            (ChangeAction::Update, "a.md"),
            (ChangeAction::Remove, "deleted.md"),
        ]
    );

    let files = api.files();
    assert_eq!(files.len(), 2);
    assert_eq!(files.get("a.md"), Some(&Fingerprint::of(b"new")));
    assert_eq!(api.uploads(), vec!["a.md".to_string()]);
}

#[tokio::test]
async fn test_failed_upload_aborts_before_removals() {
    let temp_dir = TempDir::new().unwrap();
    create_site_tree(temp_dir.path(), &[("a.md", "A"), ("b.md", "B")]);
    let (server, api) = FakePublishApi::start().await;
    api.seed("stale.md", b"S");
    api.fail_upload("b.md", 500);

    let report = publish(&server, temp_dir.path()).await;

    let failure = report.failure.clone().unwrap();
    assert_eq!(failure.path, "b.md");
    assert_eq!(failure.error.kind(), ErrorKind::Protocol);
    assert_eq!(report.applied.len(), 1);
    assert_eq!(report.applied[0].path, "a.md");
    assert!(api.removals().is_empty());
    assert!(api.files().contains_key("stale.md"));
}

#[tokio::test]
async fn test_rejected_token_fails_before_any_change() {
    let temp_dir = TempDir::new().unwrap();
    create_site_tree(temp_dir.path(), &[("a.md", "A")]);
    let (server, api) = FakePublishApi::start().await;

    let wrong = Credentials::new("test-site", AccessToken::new("wrong-token")).unwrap();
    let error = Publisher::new(store_for(&server), wrong)
        .with_root(temp_dir.path())
        .publish()
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Auth);
    assert!(!error.to_string().contains("wrong-token"));
    assert!(api.uploads().is_empty());
}

#[tokio::test]
async fn test_dry_run_leaves_site_untouched() {
    let temp_dir = TempDir::new().unwrap();
    create_site_tree(temp_dir.path(), &[("a.md", "A")]);
    let (server, api) = FakePublishApi::start().await;
    api.seed("old.md", b"O");

    let report = publish_with(
        &server,
        temp_dir.path(),
        ExecutorOptions::default().with_dry_run(true),
    )
    .await;

    assert!(report.dry_run);
    assert_eq!(report.stats.added, 1);
    assert_eq!(report.stats.removed, 1);
    assert!(api.uploads().is_empty());
    assert!(api.removals().is_empty());
    assert!(api.files().contains_key("old.md"));
}

#[tokio::test]
async fn test_concurrent_publish_converges() {
    let temp_dir = TempDir::new().unwrap();
    let files: Vec<(String, String)> = (0..20)
        .map(|i| (format!("notes/{:02}.md", i), format!("note {}", i)))
        .collect();
    let refs: Vec<(&str, &str)> = files
        .iter()
        .map(|(path, content)| (path.as_str(), content.as_str()))
        .collect();
    create_site_tree(temp_dir.path(), &refs);
    let (server, api) = FakePublishApi::start().await;
    for i in 0..5 {
        api.seed(&format!("old/{}.md", i), b"old");
    }

    let report = publish_with(
        &server,
        temp_dir.path(),
        ExecutorOptions::default().with_concurrency(4),
    )
    .await;

    assert!(report.is_success());
    assert_eq!(report.stats.added, 20);
    assert_eq!(report.stats.removed, 5);

    let published = api.files();
    assert_eq!(published.len(), 20);
    for (path, content) in &files {
        assert_eq!(
            published.get(path),
            Some(&Fingerprint::of(content.as_bytes()))
        );
    }

    let second = publish(&server, temp_dir.path()).await;
    assert!(second.applied.is_empty());
}

#[tokio::test]
async fn test_unicode_paths_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    create_site_tree(temp_dir.path(), &[("Notizen/Café über.md", "grüße")]);
    let (server, api) = FakePublishApi::start().await;

    let report = publish(&server, temp_dir.path()).await;
    assert!(report.is_success());
    assert!(api.files().contains_key("Notizen/Café über.md"));

    let second = publish(&server, temp_dir.path()).await;
    assert!(second.applied.is_empty());
}
