//! Do-Not-Disturb status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current DND status. Last write wins; no history is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DndStatus {
    /// Whether DND is on.
    pub enabled: bool,

    /// When the status was last set by the inbound signal.
    pub updated_at: Option<DateTime<Utc>>,
}

impl DndStatus {
    /// Creates a status stamped with the current time.
    pub fn now(enabled: bool) -> Self {
        Self {
            enabled,
            updated_at: Some(Utc::now()),
        }
    }
}
