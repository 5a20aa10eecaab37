//! Per-source "last processed" markers.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use responder_models::SourceKind;

use crate::atomic::{atomic_write_json, read_json_optional};
use crate::error::Result;

/// Last processed row id for each communication source.
///
/// Owned by the watcher task alone; nothing else reads or writes it.
/// Markers only ever move forward.
#[derive(Debug)]
pub struct MarkerStore {
    path: PathBuf,
    markers: BTreeMap<SourceKind, i64>,
}

impl MarkerStore {
    /// Loads markers from `path`. A missing file yields no markers.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let markers = read_json_optional(&path)?.unwrap_or_default();
        Ok(Self { path, markers })
    }

    /// Creates a store with no markers that will persist to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            markers: BTreeMap::new(),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current marker for `source`, if one has been established.
    pub fn get(&self, source: SourceKind) -> Option<i64> {
        self.markers.get(&source).copied()
    }

    /// Moves the marker for `source` forward to `key`.
    ///
    /// Returns `false` (and changes nothing) if `key` is not past the
    /// current marker.
    pub fn advance(&mut self, source: SourceKind, key: i64) -> bool {
        match self.markers.get(&source) {
            Some(&current) if key <= current => false,
            _ => {
                self.markers.insert(source, key);
                true
            }
        }
    }

    /// Writes all markers to disk.
    pub fn save(&self) -> Result<()> {
        atomic_write_json(&self.path, &self.markers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PersistenceError;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_has_no_markers() {
        let dir = tempdir().unwrap();
        let store = MarkerStore::load(dir.path().join("markers.json")).unwrap();
        assert_eq!(store.get(SourceKind::Call), None);
        assert_eq!(store.get(SourceKind::Text), None);
    }

    #[test]
    fn test_advance_is_monotonic() {
        let dir = tempdir().unwrap();
        let mut store = MarkerStore::empty(dir.path().join("markers.json"));

        assert!(store.advance(SourceKind::Call, 10));
        assert!(!store.advance(SourceKind::Call, 10));
        assert!(!store.advance(SourceKind::Call, 3));
        assert!(store.advance(SourceKind::Call, 11));
        assert_eq!(store.get(SourceKind::Call), Some(11));
        assert_eq!(store.get(SourceKind::Text), None);
    }

    #[test]
    fn test_markers_survive_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("markers.json");

        let mut store = MarkerStore::empty(&path);
        store.advance(SourceKind::Call, 42);
        store.advance(SourceKind::Text, 7);
        store.save().unwrap();

        let reloaded = MarkerStore::load(&path).unwrap();
        assert_eq!(reloaded.get(SourceKind::Call), Some(42));
        assert_eq!(reloaded.get(SourceKind::Text), Some(7));

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"call\": 42"));
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("markers.json");
        fs::write(&path, "[1, 2").unwrap();

        assert!(matches!(
            MarkerStore::load(&path),
            Err(PersistenceError::Json(_))
        ));
    }
}
