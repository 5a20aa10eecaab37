//! Whitelist handlers.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use responder_models::PhoneNumber;

use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::{
    AddWhitelistRequest, RemoveWhitelistRequest, WhitelistResponse, WhitelistUpdateResponse,
};

/// GET /api/whitelist - List whitelisted contacts.
pub async fn list_whitelist(State(state): State<AppState>) -> Json<WhitelistResponse> {
    Json(state.whitelist.list().into())
}

/// POST /api/whitelist/add - Add a contact, or rename an existing one.
pub async fn add_to_whitelist(
    State(state): State<AppState>,
    payload: std::result::Result<Json<AddWhitelistRequest>, JsonRejection>,
) -> Result<Json<WhitelistUpdateResponse>> {
    let Json(req) = payload?;
    let number = PhoneNumber::parse(&req.phone_number)?;

    let inserted = state.whitelist.add(number.as_str(), req.name.as_deref())?;
    let message = if inserted {
        "added to whitelist"
    } else {
        "already in whitelist"
    };

    Ok(Json(WhitelistUpdateResponse {
        phone_number: number.to_string(),
        message: message.to_string(),
        whitelist: state.whitelist.list().into(),
    }))
}

/// POST /api/whitelist/remove - Remove a contact.
pub async fn remove_from_whitelist(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RemoveWhitelistRequest>, JsonRejection>,
) -> Result<Json<WhitelistUpdateResponse>> {
    let Json(req) = payload?;
    let number = PhoneNumber::parse(&req.phone_number)?;

    if !state.whitelist.remove(number.as_str())? {
        return Err(ApiError::NotFound(format!("{} is not whitelisted", number)));
    }

    Ok(Json(WhitelistUpdateResponse {
        phone_number: number.to_string(),
        message: "removed from whitelist".to_string(),
        whitelist: state.whitelist.list().into(),
    }))
}
