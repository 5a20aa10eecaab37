//! HTTP surface of the DND responder.
//!
//! - `POST /webhook/dnd` - the phone automation reports DND on/off
//! - `GET /api/status` - DND state, current calendar event, whitelist size
//! - `GET /api/whitelist`, `POST /api/whitelist/add|remove` - whitelist management
//! - `GET /api/health` - liveness
//!
//! # Example
//!
//! ```ignore
//! use responder_api::{ApiConfig, AppState, serve};
//!
//! let state = AppState::new(ApiConfig::default(), dnd, whitelist, calendar);
//! serve(ApiConfig::default(), state, async {
//!     let _ = tokio::signal::ctrl_c().await;
//! })
//! .await?;
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;
pub mod types;

#[cfg(test)]
mod testing;

pub use config::ApiConfig;
pub use error::{ApiError, Result};
pub use router::{create_router, serve};
pub use state::AppState;
