//! Whitelist entry type.

use serde::{Deserialize, Serialize};

use crate::phone::PhoneNumber;

/// A contact eligible for automated replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistEntry {
    /// Normalized phone number, unique within the whitelist.
    pub phone_number: PhoneNumber,

    /// Optional human-readable name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl WhitelistEntry {
    /// Creates an entry without a display name.
    pub fn new(phone_number: PhoneNumber) -> Self {
        Self {
            phone_number,
            display_name: None,
        }
    }
}
