//! Exclusion rules for the local tree walk

use pubsync_types::{Error, Result};
use regex::RegexSet;

/// Pattern of the fixed publishing rule: version control metadata, editor
/// configuration and dependency caches
pub const DEFAULT_EXCLUDE_PATTERN: &str = r"^(\.git|\.obsidian|node_modules)";

/// Predicate deciding which normalized relative paths stay out of the manifest
///
/// Patterns are matched against the forward-slash path relative to the sync
/// root. The default rule is anchored at the start only, so it excludes
/// `.gitignore` and `.github/workflows/ci.yml` as well as `.git/HEAD`.
#[derive(Debug, Clone)]
pub struct Exclusions {
    patterns: RegexSet,
}

impl Exclusions {
    /// Build exclusions from a list of regular expressions
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = RegexSet::new(patterns)
            .map_err(|e| Error::config(format!("Invalid exclusion pattern: {}", e)))?;
        Ok(Self { patterns })
    }

    /// Exclusions that let every path through
    pub fn none() -> Self {
        Self {
            patterns: RegexSet::empty(),
        }
    }

    /// Whether `path` is excluded
    pub fn matches(&self, path: &str) -> bool {
        self.patterns.is_match(path)
    }

    /// Number of configured patterns
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether no pattern is configured
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for Exclusions {
    fn default() -> Self {
        Self {
            patterns: RegexSet::new([DEFAULT_EXCLUDE_PATTERN])
                .expect("default exclusion pattern is a valid regex"),
        }
    }
}
