//! Communication events read from the local call and message history.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which history database an event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Missed phone/FaceTime call.
    Call,
    /// Unread incoming text message.
    Text,
}

impl SourceKind {
    /// Returns the lowercase name used in logs and marker files.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Call => "call",
            SourceKind::Text => "text",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A missed call or unread text.
///
/// `key` is the row id in the originating database. It increases
/// monotonically per source and is the only thing compared against the
/// source marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunicationEvent {
    /// Originating source.
    pub source: SourceKind,

    /// Row id in the source database.
    pub key: i64,

    /// Raw contact address as stored by the source (phone number or handle).
    pub contact: String,

    /// Contact name as known to the source, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,

    /// When the call or message arrived.
    pub timestamp: DateTime<Utc>,

    /// Message body (texts only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl CommunicationEvent {
    /// Creates a missed call event.
    pub fn call(key: i64, contact: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            source: SourceKind::Call,
            key,
            contact: contact.into(),
            contact_name: None,
            timestamp,
            content: None,
        }
    }

    /// Creates an unread text event.
    pub fn text(
        key: i64,
        contact: impl Into<String>,
        timestamp: DateTime<Utc>,
        content: Option<String>,
    ) -> Self {
        Self {
            source: SourceKind::Text,
            key,
            contact: contact.into(),
            contact_name: None,
            timestamp,
            content,
        }
    }

    /// Sets the contact name.
    pub fn with_contact_name(mut self, name: impl Into<String>) -> Self {
        self.contact_name = Some(name.into());
        self
    }
}
