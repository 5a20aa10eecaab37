//! Status handler.

use axum::{extract::State, Json};
use chrono::Utc;

use responder_core::current_event;

use crate::state::AppState;
use crate::types::StatusResponse;

/// GET /api/status - DND state, current event and whitelist size.
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let now = Utc::now();
    let dnd = state.dnd.status();
    let event = current_event(state.calendar.as_ref(), now, state.calendar_window).await;

    Json(StatusResponse {
        dnd_enabled: dnd.enabled,
        dnd_updated_at: dnd.updated_at,
        current_event: event,
        whitelist_count: state.whitelist.len(),
        timestamp: now,
    })
}
