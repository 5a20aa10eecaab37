//! DND webhook handler.

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::error::Result;
use crate::state::AppState;
use crate::types::{DndWebhookRequest, DndWebhookResponse};

/// POST /webhook/dnd - Set the DND state.
///
/// Anything other than `{"dnd_enabled": <bool>}` is rejected with 400 and
/// leaves the state untouched.
pub async fn dnd_webhook(
    State(state): State<AppState>,
    payload: std::result::Result<Json<DndWebhookRequest>, JsonRejection>,
) -> Result<Json<DndWebhookResponse>> {
    let Json(req) = payload?;
    let status = state.dnd.set(req.dnd_enabled);

    Ok(Json(DndWebhookResponse {
        status: "success".to_string(),
        dnd_enabled: status.enabled,
        timestamp: status.updated_at.unwrap_or_else(chrono::Utc::now),
    }))
}
