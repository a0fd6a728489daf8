//! Manifest reconciliation

use pubsync_types::{ChangeSet, Manifest};

/// Compute the operations that make `remote` match `local`
///
/// Every path of either manifest lands in exactly one partition of the
/// result: local only paths are added, paths present on both sides with a
/// different fingerprint are updated, remote only paths are removed and the
/// rest are unchanged. Renames show up as one add plus one remove.
pub fn reconcile(local: &Manifest, remote: &Manifest) -> ChangeSet {
    let mut changes = ChangeSet::new();

    for (path, fingerprint) in local {
        match remote.get(path) {
            None => {
                changes.to_add.insert(path.clone());
            }
            Some(remote_fingerprint) if remote_fingerprint != fingerprint => {
                changes.to_update.insert(path.clone());
            }
            Some(_) => {
                changes.unchanged.insert(path.clone());
            }
        }
    }

    for path in remote.paths() {
        if !local.contains(path) {
            changes.to_remove.insert(path.to_string());
        }
    }

    changes
}
