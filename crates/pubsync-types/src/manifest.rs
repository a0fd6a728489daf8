//! Manifests and change sets
//!
//! A [`Manifest`] maps normalized relative paths (forward slashes, no
//! leading `./`) to fingerprints. A [`ChangeSet`] partitions the union of two
//! manifests' paths into additions, updates, removals and unchanged paths.

use crate::Fingerprint;
use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet};

/// Path to fingerprint mapping of a file set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Manifest {
    entries: BTreeMap<String, Fingerprint>,
}

impl Manifest {
    /// Create an empty manifest
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path`, returning the fingerprint it replaced, if any
    pub fn insert(
        &mut self,
        path: impl Into<String>,
        fingerprint: Fingerprint,
    ) -> Option<Fingerprint> {
        self.entries.insert(path.into(), fingerprint)
    }

    /// Forget `path`, returning its fingerprint, if any
    pub fn remove(&mut self, path: &str) -> Option<Fingerprint> {
        self.entries.remove(path)
    }

    /// Fingerprint recorded for `path`
    pub fn get(&self, path: &str) -> Option<&Fingerprint> {
        self.entries.get(path)
    }

    /// Whether `path` is recorded
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Number of files
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest holds no files
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(path, fingerprint)` pairs in path order
    pub fn iter(&self) -> btree_map::Iter<'_, String, Fingerprint> {
        self.entries.iter()
    }

    /// Iterate over recorded paths in path order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<P: Into<String>> FromIterator<(P, Fingerprint)> for Manifest {
    fn from_iter<I: IntoIterator<Item = (P, Fingerprint)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(path, fingerprint)| (path.into(), fingerprint))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = (&'a String, &'a Fingerprint);
    type IntoIter = btree_map::Iter<'a, String, Fingerprint>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Operations needed to make a remote manifest match a local one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChangeSet {
    /// Paths present only locally
    pub to_add: BTreeSet<String>,
    /// Paths present on both sides with different fingerprints
    pub to_update: BTreeSet<String>,
    /// Paths present only remotely
    pub to_remove: BTreeSet<String>,
    /// Paths present on both sides with equal fingerprints
    pub unchanged: BTreeSet<String>,
}

impl ChangeSet {
    /// Create an empty change set
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no add, update or remove operation is needed
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_update.is_empty() && self.to_remove.is_empty()
    }

    /// Number of add, update and remove operations
    pub fn len(&self) -> usize {
        self.to_add.len() + self.to_update.len() + self.to_remove.len()
    }

    /// Total number of distinct paths covered, unchanged included
    pub fn total_paths(&self) -> usize {
        self.len() + self.unchanged.len()
    }
}
