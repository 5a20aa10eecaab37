//! Missed calls from the macOS call history database.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{params, Connection, OpenFlags};
use tracing::trace;

use responder_models::{CommunicationEvent, SourceKind};

use crate::error::SourceError;
use crate::source::{apple_epoch, apple_seconds_to_utc, real_value, text_value, CommunicationSource};

const MISSED_CALLS_QUERY: &str = "SELECT Z_PK, ZADDRESS, ZDATE, ZNAME
     FROM ZCALLRECORD
     WHERE ZANSWERED = 0 AND ZORIGINATED = 0 AND Z_PK > ?1
     ORDER BY Z_PK ASC
     LIMIT ?2";

const LATEST_KEY_QUERY: &str = "SELECT MAX(Z_PK) FROM ZCALLRECORD";

/// Opens a history database read-only.
pub(crate) fn open_read_only(path: &Path) -> Result<Connection, SourceError> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|source| SourceError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    conn.busy_timeout(Duration::from_secs(2))?;
    Ok(conn)
}

/// Reads `CallHistory.storedata`.
#[derive(Debug, Clone)]
pub struct CallHistorySource {
    path: PathBuf,
}

impl CallHistorySource {
    /// Creates a source reading the database at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Database path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CommunicationSource for CallHistorySource {
    fn kind(&self) -> SourceKind {
        SourceKind::Call
    }

    fn latest_key(&self) -> Result<Option<i64>, SourceError> {
        let conn = open_read_only(&self.path)?;
        let key = conn.query_row(LATEST_KEY_QUERY, [], |row| row.get::<_, Option<i64>>(0))?;
        Ok(key)
    }

    fn fetch_after(
        &self,
        marker: i64,
        limit: usize,
    ) -> Result<Vec<CommunicationEvent>, SourceError> {
        let conn = open_read_only(&self.path)?;
        let mut stmt = conn.prepare(MISSED_CALLS_QUERY)?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows = stmt.query_map(params![marker, limit], |row| {
            let key: i64 = row.get(0)?;
            let address = text_value(row.get_ref(1)?);
            let timestamp = real_value(row.get_ref(2)?)
                .and_then(apple_seconds_to_utc)
                .unwrap_or_else(apple_epoch);
            let name = text_value(row.get_ref(3)?);
            Ok((key, address, timestamp, name))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (key, address, timestamp, name) = row?;
            let mut event = CommunicationEvent::call(key, address.unwrap_or_default(), timestamp);
            if let Some(name) = name {
                event = event.with_contact_name(name);
            }
            events.push(event);
        }

        trace!(marker, count = events.len(), "read missed calls");
        Ok(events)
    }
}
