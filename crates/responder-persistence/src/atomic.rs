//! Atomic file operations for crash-safe state files.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{PersistenceError, Result};

/// Writes `data` to `path` atomically.
///
/// The bytes go to a temporary file in the same directory which is then
/// renamed over the target, so readers never observe a half-written
/// whitelist or marker file. Missing parent directories are created.
///
/// # Errors
/// Returns an error if the directory, the temp file, or the rename fails.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|source| PersistenceError::DirectoryError {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let write_err = |source| PersistenceError::WriteError {
        path: path.to_path_buf(),
        source,
    };

    let mut temp_file = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    temp_file.write_all(data).map_err(write_err)?;
    temp_file.as_file().sync_all().map_err(write_err)?;
    temp_file.persist(path).map_err(|e| write_err(e.error))?;

    Ok(())
}

/// Serializes `value` as pretty JSON and writes it atomically.
pub fn atomic_write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    atomic_write(path, json.as_bytes())
}

/// Reads and deserializes a JSON file.
///
/// # Errors
/// Returns `PersistenceError::Missing` when the file does not exist, so
/// callers can tell "never created" apart from "unreadable".
pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            PersistenceError::Missing {
                path: path.to_path_buf(),
            }
        } else {
            PersistenceError::ReadError {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    Ok(serde_json::from_str(&data)?)
}

/// Reads a JSON file, returning `None` if it doesn't exist.
pub fn read_json_optional<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match read_json(path) {
        Ok(value) => Ok(Some(value)),
        Err(PersistenceError::Missing { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}
