//! Application state shared across handlers.

use std::sync::Arc;

use responder_core::{CalendarLookup, CalendarWindow};
use responder_persistence::WhitelistStore;
use responder_runtime::DndSwitch;

use crate::config::ApiConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// DND flag; the webhook is its only writer.
    pub dnd: DndSwitch,
    /// Whitelist, shared with the watcher.
    pub whitelist: Arc<WhitelistStore>,
    /// Calendar used by the status endpoint.
    pub calendar: Arc<dyn CalendarLookup>,
    /// Calendar query window.
    pub calendar_window: CalendarWindow,
}

impl AppState {
    /// Creates a new AppState with all components.
    pub fn new(
        config: ApiConfig,
        dnd: DndSwitch,
        whitelist: Arc<WhitelistStore>,
        calendar: Arc<dyn CalendarLookup>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            dnd,
            whitelist,
            calendar,
            calendar_window: CalendarWindow::default(),
        }
    }

    /// Sets the calendar query window.
    pub fn with_calendar_window(mut self, window: CalendarWindow) -> Self {
        self.calendar_window = window;
        self
    }
}
