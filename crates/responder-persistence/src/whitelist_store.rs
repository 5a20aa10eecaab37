//! Whitelist store backed by a hand-editable JSON file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use responder_models::{PhoneNumber, WhitelistEntry};

use crate::atomic::{atomic_write_json, read_json};
use crate::error::{PersistenceError, Result};

const DEFAULT_DESCRIPTION: &str =
    "Phone numbers that should receive automated responses while Do Not Disturb is on";
const DEFAULT_NOTE: &str = "Add phone numbers in international format (e.g., +15551234567)";

/// On-disk layout of the whitelist file.
///
/// ```json
/// {
///   "phone_numbers": ["+15551234567"],
///   "names": { "+15551234567": "Jo" },
///   "description": "...",
///   "note": "..."
/// }
/// ```
///
/// Only `phone_numbers` is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistFile {
    /// Canonical phone numbers in insertion order.
    pub phone_numbers: Vec<String>,

    /// Display names keyed by phone number.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub names: BTreeMap<String, String>,

    /// Free-form description kept for people editing the file by hand.
    #[serde(default = "default_description")]
    pub description: String,

    /// Free-form note kept for people editing the file by hand.
    #[serde(default = "default_note")]
    pub note: String,
}

fn default_description() -> String {
    DEFAULT_DESCRIPTION.to_string()
}

fn default_note() -> String {
    DEFAULT_NOTE.to_string()
}

impl Default for WhitelistFile {
    fn default() -> Self {
        Self {
            phone_numbers: Vec::new(),
            names: BTreeMap::new(),
            description: default_description(),
            note: default_note(),
        }
    }
}

struct Inner {
    entries: Vec<WhitelistEntry>,
    description: String,
    note: String,
}

impl Inner {
    fn from_file(file: WhitelistFile) -> Result<Self> {
        let names: BTreeMap<PhoneNumber, String> = file
            .names
            .into_iter()
            .map(|(number, name)| PhoneNumber::parse(&number).map(|n| (n, name)))
            .collect::<std::result::Result<_, _>>()?;

        let mut entries: Vec<WhitelistEntry> = Vec::with_capacity(file.phone_numbers.len());
        for raw in &file.phone_numbers {
            let number = PhoneNumber::parse(raw)?;
            if entries.iter().any(|e| e.phone_number == number) {
                debug!(number = %number, "dropping duplicate whitelist entry");
                continue;
            }
            let display_name = names.get(&number).cloned();
            entries.push(WhitelistEntry {
                phone_number: number,
                display_name,
            });
        }

        Ok(Self {
            entries,
            description: file.description,
            note: file.note,
        })
    }

    fn to_file(&self, entries: &[WhitelistEntry]) -> WhitelistFile {
        WhitelistFile {
            phone_numbers: entries
                .iter()
                .map(|e| e.phone_number.as_str().to_string())
                .collect(),
            names: entries
                .iter()
                .filter_map(|e| {
                    e.display_name
                        .as_ref()
                        .map(|name| (e.phone_number.as_str().to_string(), name.clone()))
                })
                .collect(),
            description: self.description.clone(),
            note: self.note.clone(),
        }
    }
}

/// The set of contacts eligible for automated replies.
///
/// Loaded once at startup. Every mutation rewrites the file before the
/// in-memory list changes, so memory and disk never disagree.
pub struct WhitelistStore {
    path: PathBuf,
    inner: RwLock<Inner>,
}

impl WhitelistStore {
    /// Loads the whitelist from `path`.
    ///
    /// # Errors
    /// A missing file, invalid JSON, a missing `phone_numbers` key, or an
    /// unparseable number are all errors. There is no empty-list fallback.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file: WhitelistFile = read_json(&path)?;
        let inner = Inner::from_file(file)?;
        info!(
            path = %path.display(),
            count = inner.entries.len(),
            "loaded whitelist"
        );
        Ok(Self {
            path,
            inner: RwLock::new(inner),
        })
    }

    /// Creates a new, empty whitelist file at `path` and returns its store.
    ///
    /// # Errors
    /// Returns `PersistenceError::AlreadyExists` rather than clobbering an
    /// existing whitelist.
    pub fn init(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if path.exists() {
            return Err(PersistenceError::AlreadyExists { path });
        }
        atomic_write_json(&path, &WhitelistFile::default())?;
        info!(path = %path.display(), "created empty whitelist");
        Self::load(path)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Whether `number` is whitelisted. Malformed input is never contained.
    pub fn contains(&self, number: &str) -> bool {
        self.find(number).is_some()
    }

    /// Returns the entry matching `number`, if any.
    pub fn find(&self, number: &str) -> Option<WhitelistEntry> {
        let number = PhoneNumber::parse(number).ok()?;
        self.read()
            .entries
            .iter()
            .find(|e| e.phone_number == number)
            .cloned()
    }

    /// Adds `number`, or updates its name if it is already present.
    ///
    /// Returns `true` when a new entry was inserted. A `None` name keeps the
    /// existing name of an already-present entry.
    ///
    /// # Errors
    /// Rejects malformed numbers before touching the file.
    pub fn add(&self, number: &str, name: Option<&str>) -> Result<bool> {
        let number = PhoneNumber::parse(number)?;
        let name = name.map(str::trim).filter(|n| !n.is_empty());

        let mut inner = self.write();
        let mut entries = inner.entries.clone();

        let inserted = match entries.iter_mut().find(|e| e.phone_number == number) {
            Some(existing) => {
                if let Some(name) = name {
                    existing.display_name = Some(name.to_string());
                }
                false
            }
            None => {
                let mut entry = WhitelistEntry::new(number.clone());
                entry.display_name = name.map(str::to_string);
                entries.push(entry);
                true
            }
        };

        atomic_write_json(&self.path, &inner.to_file(&entries))?;
        inner.entries = entries;

        if inserted {
            info!(number = %number, name = ?name, "added to whitelist");
        } else {
            debug!(number = %number, "already whitelisted");
        }
        Ok(inserted)
    }

    /// Removes `number`. Returns whether an entry existed.
    ///
    /// # Errors
    /// Rejects malformed numbers before touching the file.
    pub fn remove(&self, number: &str) -> Result<bool> {
        let number = PhoneNumber::parse(number)?;

        let mut inner = self.write();
        let Some(index) = inner.entries.iter().position(|e| e.phone_number == number) else {
            debug!(number = %number, "not in whitelist");
            return Ok(false);
        };

        let mut entries = inner.entries.clone();
        entries.remove(index);
        atomic_write_json(&self.path, &inner.to_file(&entries))?;
        inner.entries = entries;

        info!(number = %number, "removed from whitelist");
        Ok(true)
    }

    /// All entries in insertion order.
    pub fn list(&self) -> Vec<WhitelistEntry> {
        self.read().entries.clone()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    /// Whether the whitelist is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
