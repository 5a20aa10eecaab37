//! Watcher configuration.

use std::time::Duration;

/// Configuration for the polling watcher.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// How often to poll the history databases.
    pub poll_interval: Duration,
    /// Events older than this when first seen are skipped.
    pub max_event_age: Duration,
    /// Maximum rows read per source per interval.
    pub batch_limit: usize,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            max_event_age: Duration::from_secs(5 * 60),
            batch_limit: 100,
        }
    }
}

impl WatcherConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the maximum event age.
    pub fn with_max_event_age(mut self, age: Duration) -> Self {
        self.max_event_age = age;
        self
    }

    /// Sets the per-interval batch limit.
    pub fn with_batch_limit(mut self, limit: usize) -> Self {
        self.batch_limit = limit.max(1);
        self
    }
}
