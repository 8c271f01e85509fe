//! Compilation Cache
//!
//! Maps each script path to its most recent successfully committed compiled
//! unit plus the diagnostics from the most recent attempt. Entries are
//! replaced wholesale per key; keys never block each other.

use std::path::{Path, PathBuf};

use dashmap::DashMap;

use spadework_script::Diagnostic;

#[derive(Clone)]
struct CacheEntry<U> {
    compiled: Option<U>,
    diagnostics: Vec<Diagnostic>,
}

impl<U> Default for CacheEntry<U> {
    fn default() -> Self {
        Self {
            compiled: None,
            diagnostics: Vec::new(),
        }
    }
}

/// Per-script cache of last-good compiled units.
pub struct ScriptCache<U> {
    entries: DashMap<PathBuf, CacheEntry<U>>,
}

impl<U: Clone> ScriptCache<U> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// The last committed unit for `path`, if any. The clone is handed out
    /// so no lock is held by the caller.
    pub fn previous(&self, path: &Path) -> Option<U> {
        self.entries
            .get(path)
            .and_then(|entry| entry.compiled.clone())
    }

    /// Make `unit` the authoritative representation for `path` and clear
    /// recorded diagnostics.
    pub fn commit(&self, path: &Path, unit: U) {
        let mut entry = self.entries.entry(path.to_path_buf()).or_default();
        entry.compiled = Some(unit);
        entry.diagnostics.clear();
    }

    /// Record the diagnostics of a failed attempt. The committed unit, if
    /// any, stays authoritative.
    pub fn record_diagnostics(&self, path: &Path, diagnostics: Vec<Diagnostic>) {
        let mut entry = self.entries.entry(path.to_path_buf()).or_default();
        entry.diagnostics = diagnostics;
    }

    /// Diagnostics from the most recent attempt for `path`.
    pub fn diagnostics(&self, path: &Path) -> Vec<Diagnostic> {
        self.entries
            .get(path)
            .map(|entry| entry.diagnostics.clone())
            .unwrap_or_default()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries
            .get(path)
            .map(|entry| entry.compiled.is_some())
            .unwrap_or(false)
    }

    /// Number of scripts with a committed unit.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.compiled.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<U: Clone> Default for ScriptCache<U> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_and_lookup() {
        let cache: ScriptCache<u32> = ScriptCache::new();
        let path = PathBuf::from("scripts/a.js");

        assert!(cache.previous(&path).is_none());
        cache.commit(&path, 1);
        assert_eq!(cache.previous(&path), Some(1));

        cache.commit(&path, 2);
        assert_eq!(cache.previous(&path), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_failure_leaves_committed_unit() {
        let cache: ScriptCache<u32> = ScriptCache::new();
        let path = PathBuf::from("scripts/a.js");

        cache.commit(&path, 1);
        cache.record_diagnostics(&path, vec![Diagnostic::error("unexpected token")]);

        assert_eq!(cache.previous(&path), Some(1));
        assert_eq!(cache.diagnostics(&path).len(), 1);

        // A later successful commit clears the stale diagnostics.
        cache.commit(&path, 2);
        assert!(cache.diagnostics(&path).is_empty());
    }

    #[test]
    fn test_keys_are_independent() {
        let cache: ScriptCache<u32> = ScriptCache::new();
        let a = PathBuf::from("scripts/a.js");
        let b = PathBuf::from("scripts/b.js");

        cache.commit(&a, 1);
        cache.record_diagnostics(&b, vec![Diagnostic::error("bad")]);

        assert_eq!(cache.previous(&a), Some(1));
        assert!(cache.previous(&b).is_none());
        assert!(cache.contains(&a));
        assert!(!cache.contains(&b));
    }
}
