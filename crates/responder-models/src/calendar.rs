//! Calendar event type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A timed calendar event. Fetched on demand and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Event title.
    pub title: String,

    /// Start instant.
    pub start: DateTime<Utc>,

    /// End instant.
    pub end: DateTime<Utc>,

    /// Location, if one was set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl CalendarEvent {
    /// Creates an event without a location.
    pub fn new(title: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            start,
            end,
            location: None,
        }
    }

    /// Sets the location. Blank locations are treated as absent.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        let location = location.into();
        self.location = if location.trim().is_empty() {
            None
        } else {
            Some(location)
        };
        self
    }

    /// Whether `now` falls inside `[start, end]`.
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && now <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_contains_is_inclusive() {
        let now = Utc::now();
        let event = CalendarEvent::new("Standup", now - Duration::minutes(5), now);
        assert!(event.contains(now));
        assert!(event.contains(now - Duration::minutes(5)));
        assert!(!event.contains(now + Duration::seconds(1)));
    }

    #[test]
    fn test_blank_location_is_none() {
        let now = Utc::now();
        let event = CalendarEvent::new("Gym", now, now).with_location("  ");
        assert!(event.location.is_none());
        let event = event.with_location("Downtown");
        assert_eq!(event.location.as_deref(), Some("Downtown"));
    }
}
