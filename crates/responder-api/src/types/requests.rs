//! Request DTOs for the API.

use serde::Deserialize;

/// DND webhook body sent by the phone automation.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DndWebhookRequest {
    /// New DND state.
    pub dnd_enabled: bool,
}

/// Add to whitelist request.
#[derive(Debug, Clone, Deserialize)]
pub struct AddWhitelistRequest {
    /// Phone number in any common format.
    pub phone_number: String,
    /// Optional display name.
    #[serde(default)]
    pub name: Option<String>,
}

/// Remove from whitelist request.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoveWhitelistRequest {
    /// Phone number in any common format.
    pub phone_number: String,
}
