//! Unread texts from the Messages database.

use std::path::{Path, PathBuf};

use rusqlite::params;
use tracing::trace;

use responder_models::{CommunicationEvent, SourceKind};

use crate::call_history::open_read_only;
use crate::error::SourceError;
use crate::source::{
    apple_epoch, apple_message_date_to_utc, integer_value, text_value, CommunicationSource,
};

// A message can belong to several chats; duplicates are dropped by row id.
const UNREAD_MESSAGES_QUERY: &str = "SELECT m.ROWID, m.text, m.date, h.id, c.display_name
     FROM message m
     LEFT JOIN handle h ON m.handle_id = h.ROWID
     LEFT JOIN chat_message_join cmj ON m.ROWID = cmj.message_id
     LEFT JOIN chat c ON cmj.chat_id = c.ROWID
     WHERE m.is_from_me = 0 AND m.is_read = 0 AND m.ROWID > ?1
     ORDER BY m.ROWID ASC
     LIMIT ?2";

const LATEST_KEY_QUERY: &str = "SELECT MAX(ROWID) FROM message";

/// Reads `chat.db`.
#[derive(Debug, Clone)]
pub struct MessageHistorySource {
    path: PathBuf,
}

impl MessageHistorySource {
    /// Creates a source reading the database at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Database path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CommunicationSource for MessageHistorySource {
    fn kind(&self) -> SourceKind {
        SourceKind::Text
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
        let mut stmt = conn.prepare(UNREAD_MESSAGES_QUERY)?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows = stmt.query_map(params![marker, limit], |row| {
            let key: i64 = row.get(0)?;
            let text = text_value(row.get_ref(1)?);
            let timestamp = integer_value(row.get_ref(2)?)
                .and_then(apple_message_date_to_utc)
                .unwrap_or_else(apple_epoch);
            let handle = text_value(row.get_ref(3)?);
            let chat_name = text_value(row.get_ref(4)?);
            Ok((key, text, timestamp, handle, chat_name))
        })?;

        let mut events: Vec<CommunicationEvent> = Vec::new();
        for row in rows {
            let (key, text, timestamp, handle, chat_name) = row?;
            if events.last().is_some_and(|e| e.key == key) {
                continue;
            }
            let contact = handle.unwrap_or_default();
            let mut event = CommunicationEvent::text(key, contact, timestamp, text);
            if let Some(name) = chat_name {
                event = event.with_contact_name(name);
            }
            events.push(event);
        }

        trace!(marker, count = events.len(), "read unread messages");
        Ok(events)
    }
}
