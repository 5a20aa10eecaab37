//! Response DTOs for the API.

use chrono::{DateTime, Utc};
use serde::Serialize;

use responder_models::{CalendarEvent, WhitelistEntry};

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
    /// Uptime in seconds.
    pub uptime_seconds: u64,
}

/// Acknowledgement of a DND webhook.
#[derive(Debug, Clone, Serialize)]
pub struct DndWebhookResponse {
    /// Always `"success"`.
    pub status: String,
    /// State now in effect.
    pub dnd_enabled: bool,
    /// When the change was applied.
    pub timestamp: DateTime<Utc>,
}

/// Current responder status.
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    /// Whether DND is on.
    pub dnd_enabled: bool,
    /// When DND was last set, `null` if never.
    pub dnd_updated_at: Option<DateTime<Utc>>,
    /// Event the user is in right now, if any.
    pub current_event: Option<CalendarEvent>,
    /// Number of whitelisted contacts.
    pub whitelist_count: usize,
    /// Server time.
    pub timestamp: DateTime<Utc>,
}

/// Whitelist entry as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct WhitelistEntryView {
    /// Canonical phone number.
    pub phone_number: String,
    /// Display name, `null` if unset.
    pub display_name: Option<String>,
}

impl From<&WhitelistEntry> for WhitelistEntryView {
    fn from(entry: &WhitelistEntry) -> Self {
        Self {
            phone_number: entry.phone_number.as_str().to_string(),
            display_name: entry.display_name.clone(),
        }
    }
}

/// Whitelist listing.
#[derive(Debug, Clone, Serialize)]
pub struct WhitelistResponse {
    /// Entries in insertion order.
    pub entries: Vec<WhitelistEntryView>,
    /// Total count.
    pub total: usize,
}

impl From<Vec<WhitelistEntry>> for WhitelistResponse {
    fn from(entries: Vec<WhitelistEntry>) -> Self {
        let entries: Vec<WhitelistEntryView> = entries.iter().map(WhitelistEntryView::from).collect();
        let total = entries.len();
        Self { entries, total }
    }
}

/// Result of a whitelist add or remove, with the updated listing.
#[derive(Debug, Clone, Serialize)]
pub struct WhitelistUpdateResponse {
    /// Canonical form of the number that was changed.
    pub phone_number: String,
    /// Human-readable summary.
    pub message: String,
    /// Updated whitelist.
    #[serde(flatten)]
    pub whitelist: WhitelistResponse,
}
