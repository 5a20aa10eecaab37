//! Shared fixtures for handler and router tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tempfile::TempDir;

use responder_core::{CalendarError, CalendarLookup};
use responder_models::CalendarEvent;
use responder_persistence::WhitelistStore;
use responder_runtime::DndSwitch;

use crate::config::ApiConfig;
use crate::state::AppState;

/// Calendar that reports one event spanning the query window, or nothing.
pub struct StaticCalendar(pub Option<String>);

#[async_trait]
impl CalendarLookup for StaticCalendar {
    async fn events_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        Ok(self
            .0
            .iter()
            .map(|title| CalendarEvent::new(title, start + Duration::minutes(1), end))
            .collect())
    }
}

fn state_with(calendar: StaticCalendar) -> (AppState, TempDir) {
    let dir = TempDir::new().unwrap();
    let whitelist = WhitelistStore::init(dir.path().join("whitelist.json")).unwrap();
    let state = AppState::new(
        ApiConfig::default(),
        DndSwitch::default(),
        Arc::new(whitelist),
        Arc::new(calendar),
    );
    (state, dir)
}

/// State with an empty whitelist and no calendar events.
pub fn make_test_state() -> (AppState, TempDir) {
    state_with(StaticCalendar(None))
}

/// State whose calendar reports the user in `title` right now.
pub fn make_test_state_with_event(title: &str) -> (AppState, TempDir) {
    state_with(StaticCalendar(Some(title.to_string())))
}
