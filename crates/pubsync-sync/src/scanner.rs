//! Local tree scanning
//!
//! The scanner walks the sync root with an explicit worklist of directories,
//! fingerprints every regular file that the exclusion rules let through and
//! records it under its normalized relative path.

use crate::exclude::Exclusions;
use crate::hash::read_and_fingerprint;
use pubsync_types::{Error, Manifest, Result, SymlinkPolicy};
use std::fs::FileType;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Result of a completed scan
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Fingerprints of every included file
    pub manifest: Manifest,
    /// Normalized paths skipped by the exclusion rules, sorted
    pub excluded: Vec<String>,
    /// Total number of bytes read and hashed
    pub bytes_hashed: u64,
}

/// Walks a local directory tree and builds its manifest
#[derive(Debug, Clone)]
pub struct LocalScanner {
    root: PathBuf,
    exclusions: Exclusions,
    symlinks: SymlinkPolicy,
}

/// What a directory entry turned out to be
enum EntryKind {
    Directory,
    File,
    Skipped,
}

impl LocalScanner {
    /// Create a scanner for `root` using the given exclusion rules
    pub fn new<P: AsRef<Path>>(root: P, exclusions: Exclusions) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            exclusions,
            symlinks: SymlinkPolicy::default(),
        }
    }

    /// Set the symbolic link policy
    pub fn with_symlinks(mut self, symlinks: SymlinkPolicy) -> Self {
        self.symlinks = symlinks;
        self
    }

    /// Root directory being scanned
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scan the tree
    ///
    /// Any entry that cannot be read aborts the scan with
    /// [`Error::Filesystem`] naming that entry; no partial manifest is
    /// returned.
    pub async fn scan(&self) -> Result<ScanOutcome> {
        let mut outcome = ScanOutcome::default();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir)
                .await
                .map_err(|e| Error::filesystem(&dir, e))?;

            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| Error::filesystem(&dir, e))?
            {
                let entry_path = entry.path();
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| Error::filesystem(&entry_path, e))?;

                match self.classify(&entry_path, file_type).await? {
                    EntryKind::Directory => pending.push(entry_path),
                    EntryKind::Skipped => {}
                    EntryKind::File => {
                        let relative = self.normalize(&entry_path)?;
                        if self.exclusions.matches(&relative) {
                            debug!("Ignoring {}", relative);
                            outcome.excluded.push(relative);
                            continue;
                        }

                        let (bytes, fingerprint) = read_and_fingerprint(&entry_path).await?;
                        debug!("Hashed {} ({})", relative, fingerprint);
                        outcome.bytes_hashed += bytes.len() as u64;
                        outcome.manifest.insert(relative, fingerprint);
                    }
                }
            }
        }

        outcome.excluded.sort();
        if !outcome.excluded.is_empty() {
            info!("Ignored {} excluded files", outcome.excluded.len());
        }
        info!(
            "Scanned {} files in '{}'",
            outcome.manifest.len(),
            self.root.display()
        );

        Ok(outcome)
    }

    async fn classify(&self, path: &Path, file_type: FileType) -> Result<EntryKind> {
        if file_type.is_dir() {
            return Ok(EntryKind::Directory);
        }
        if file_type.is_file() {
            return Ok(EntryKind::File);
        }
        if !file_type.is_symlink() {
            return Err(Error::filesystem(path, "not a regular file or directory"));
        }

        match self.symlinks {
            SymlinkPolicy::Skip => {
                warn!("Skipping symlink: {}", path.display());
                Ok(EntryKind::Skipped)
            }
            SymlinkPolicy::Reject => Err(Error::filesystem(path, "symbolic links are rejected")),
            SymlinkPolicy::FileContents => {
                // Follows the link; a dangling link fails here.
                let target = fs::metadata(path)
                    .await
                    .map_err(|e| Error::filesystem(path, e))?;
                if target.is_file() {
                    Ok(EntryKind::File)
                } else if target.is_dir() {
                    Err(Error::filesystem(
                        path,
                        "symbolic link to a directory is not followed",
                    ))
                } else {
                    Err(Error::filesystem(
                        path,
                        "symbolic link target is not a regular file",
                    ))
                }
            }
        }
    }

    /// Forward-slash path relative to the root
    fn normalize(&self, path: &Path) -> Result<String> {
        let relative = path
            .strip_prefix(&self.root)
            .map_err(|_| Error::filesystem(path, "entry lies outside the sync root"))?;

        let mut parts = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => {
                    let part = part
                        .to_str()
                        .ok_or_else(|| Error::filesystem(path, "path is not valid UTF-8"))?;
                    parts.push(part);
                }
                Component::CurDir => {}
                _ => return Err(Error::filesystem(path, "unexpected path component")),
            }
        }

        Ok(parts.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pubsync_types::{ErrorKind, Fingerprint};
    use tempfile::TempDir;

    async fn write(root: &Path, relative: &str, content: &[u8]) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.unwrap();
        }
        fs::write(path, content).await.unwrap();
    }

    #[tokio::test]
    async fn test_scan_nested_tree() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "a.md", b"alpha").await;
        write(temp_dir.path(), "notes/b.md", b"beta").await;
        write(temp_dir.path(), "notes/deep/er/c.png", b"\x89PNG").await;
        fs::create_dir_all(temp_dir.path().join("empty/dir"))
            .await
            .unwrap();

        let outcome = LocalScanner::new(temp_dir.path(), Exclusions::none())
            .scan()
            .await
            .unwrap();

        let paths: Vec<&str> = outcome.manifest.paths().collect();
        assert_eq!(paths, vec!["a.md", "notes/b.md", "notes/deep/er/c.png"]);
        assert_eq!(outcome.manifest.get("a.md"), Some(&Fingerprint::of(b"alpha")));
        assert_eq!(outcome.bytes_hashed, 13);
        assert!(outcome.excluded.is_empty());
    }

    #[tokio::test]
    async fn test_excluded_paths_never_enter_manifest() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "a.md", b"alpha").await;
        write(temp_dir.path(), ".git/HEAD", b"ref: refs/heads/main").await;
        write(temp_dir.path(), ".obsidian/app.json", b"{}").await;
        write(temp_dir.path(), "node_modules/x/index.js", b"").await;
        write(temp_dir.path(), ".gitignore", b"target").await;

        let outcome = LocalScanner::new(temp_dir.path(), Exclusions::default())
            .scan()
            .await
            .unwrap();

        assert_eq!(outcome.manifest.len(), 1);
        assert!(outcome.manifest.contains("a.md"));
        assert_eq!(
            outcome.excluded,
            vec![
                ".git/HEAD",
                ".gitignore",
                ".obsidian/app.json",
                "node_modules/x/index.js"
            ]
        );
        assert_eq!(outcome.bytes_hashed, 5);
    }

    #[tokio::test]
    async fn test_empty_root() {
        let temp_dir = TempDir::new().unwrap();
        let outcome = LocalScanner::new(temp_dir.path(), Exclusions::default())
            .scan()
            .await
            .unwrap();
        assert!(outcome.manifest.is_empty());
    }

    #[tokio::test]
    async fn test_missing_root_is_filesystem_error() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("missing");

        let error = LocalScanner::new(&root, Exclusions::none())
            .scan()
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Filesystem);
        assert_eq!(error.path(), Some(root.as_path()));
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::os::unix::fs::symlink;

        #[tokio::test]
        async fn test_file_link_publishes_target_contents() {
            let temp_dir = TempDir::new().unwrap();
            write(temp_dir.path(), "a.md", b"alpha").await;
            symlink(temp_dir.path().join("a.md"), temp_dir.path().join("link.md")).unwrap();

            let outcome = LocalScanner::new(temp_dir.path(), Exclusions::none())
                .scan()
                .await
                .unwrap();
            assert_eq!(
                outcome.manifest.get("link.md"),
                Some(&Fingerprint::of(b"alpha"))
            );
        }

        #[tokio::test]
        async fn test_directory_link_is_error() {
            let temp_dir = TempDir::new().unwrap();
            fs::create_dir(temp_dir.path().join("dir")).await.unwrap();
            symlink(temp_dir.path().join("dir"), temp_dir.path().join("loop")).unwrap();

            let error = LocalScanner::new(temp_dir.path(), Exclusions::none())
                .scan()
                .await
                .unwrap_err();
            assert_eq!(error.kind(), ErrorKind::Filesystem);
            assert_eq!(error.path(), Some(temp_dir.path().join("loop").as_path()));
        }

        #[tokio::test]
        async fn test_dangling_link_is_error() {
            let temp_dir = TempDir::new().unwrap();
            symlink(temp_dir.path().join("nowhere"), temp_dir.path().join("x.md")).unwrap();

            let error = LocalScanner::new(temp_dir.path(), Exclusions::none())
                .scan()
                .await
                .unwrap_err();
            assert_eq!(error.kind(), ErrorKind::Filesystem);
        }

        #[tokio::test]
        async fn test_skip_and_reject_policies() {
            let temp_dir = TempDir::new().unwrap();
            write(temp_dir.path(), "a.md", b"alpha").await;
            symlink(temp_dir.path().join("a.md"), temp_dir.path().join("link.md")).unwrap();

            let skipped = LocalScanner::new(temp_dir.path(), Exclusions::none())
                .with_symlinks(SymlinkPolicy::Skip)
                .scan()
                .await
                .unwrap();
            assert_eq!(skipped.manifest.len(), 1);
            assert!(!skipped.manifest.contains("link.md"));

            let rejected = LocalScanner::new(temp_dir.path(), Exclusions::none())
                .with_symlinks(SymlinkPolicy::Reject)
                .scan()
                .await;
            assert!(rejected.is_err());
        }

        #[test]
        fn test_non_utf8_name_is_error() {
            use std::ffi::OsStr;
            use std::os::unix::ffi::OsStrExt;

            let scanner = LocalScanner::new("/root", Exclusions::none());
            let path = Path::new("/root").join(OsStr::from_bytes(b"bad\xff.md"));
            let error = scanner.normalize(&path).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::Filesystem);
        }
    }
}
