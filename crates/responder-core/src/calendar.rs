//! Calendar lookup.
//!
//! The bot only ever asks one question of the calendar: "what am I in the
//! middle of right now?". Everything that can go wrong on the way to the
//! answer (missing token, network, quota, bad JSON) collapses into "no
//! event", so a broken calendar never stops a reply from going out.

use std::path::PathBuf;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use responder_models::CalendarEvent;

/// Default Google Calendar API base URL.
pub const GOOGLE_CALENDAR_API_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Errors that can occur while fetching calendar events.
#[derive(Debug, Error)]
pub enum CalendarError {
    /// No usable access token.
    #[error("not authenticated: {0}")]
    NotAuthenticated(String),

    /// The HTTP request failed (connect, timeout, ...).
    #[error("calendar request failed: {0}")]
    RequestFailed(String),

    /// The API answered with a non-success status.
    #[error("calendar API error {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The response did not have the expected shape.
    #[error("failed to parse calendar response: {0}")]
    ParseError(String),
}

/// Source of calendar events.
#[async_trait]
pub trait CalendarLookup: Send + Sync {
    /// Returns timed events overlapping `[start, end]`.
    async fn events_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, CalendarError>;
}

/// How far around "now" to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarWindow {
    /// Look back this far.
    pub before: Duration,
    /// Look ahead this far.
    pub after: Duration,
}

impl Default for CalendarWindow {
    fn default() -> Self {
        Self {
            before: Duration::minutes(30),
            after: Duration::hours(2),
        }
    }
}

/// Picks the event containing `now`, preferring the one that ends first.
pub fn select_current(events: Vec<CalendarEvent>, now: DateTime<Utc>) -> Option<CalendarEvent> {
    events
        .into_iter()
        .filter(|e| e.contains(now))
        .min_by_key(|e| e.end)
}

/// Returns the event the user is currently in, if any.
///
/// Lookup failures are logged and reported as `None`.
pub async fn current_event(
    lookup: &dyn CalendarLookup,
    now: DateTime<Utc>,
    window: CalendarWindow,
) -> Option<CalendarEvent> {
    match lookup
        .events_between(now - window.before, now + window.after)
        .await
    {
        Ok(events) => {
            let count = events.len();
            let current = select_current(events, now);
            debug!(
                candidates = count,
                current = current.as_ref().map(|e| e.title.as_str()),
                "calendar lookup complete"
            );
            current
        }
        Err(CalendarError::NotAuthenticated(reason)) => {
            debug!(reason = %reason, "calendar not authenticated, assuming no event");
            None
        }
        Err(e) => {
            warn!(error = %e, "calendar lookup failed, assuming no event");
            None
        }
    }
}

/// Token file written by whatever tool performs the OAuth dance.
#[derive(Debug, Deserialize)]
struct StoredToken {
    access_token: String,
    #[serde(default)]
    expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    items: Vec<GoogleEvent>,
}

#[derive(Debug, Deserialize)]
struct GoogleEvent {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    status: Option<String>,
    start: GoogleEventTime,
    end: GoogleEventTime,
}

#[derive(Debug, Deserialize)]
struct GoogleEventTime {
    #[serde(rename = "dateTime", default)]
    date_time: Option<DateTime<FixedOffset>>,
}

impl GoogleEvent {
    /// Converts to a `CalendarEvent`. All-day and cancelled events yield `None`.
    fn into_event(self) -> Option<CalendarEvent> {
        if self.status.as_deref() == Some("cancelled") {
            return None;
        }
        let start = self.start.date_time?.with_timezone(&Utc);
        let end = self.end.date_time?.with_timezone(&Utc);
        let title = self
            .summary
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "Busy".to_string());

        let event = CalendarEvent::new(title, start, end);
        Some(match self.location {
            Some(location) => event.with_location(location),
            None => event,
        })
    }
}

/// Google Calendar client.
///
/// Authentication is delegated: the access token is read from a JSON token
/// file on every lookup, and a missing or expired token is reported as
/// `CalendarError::NotAuthenticated`.
pub struct GoogleCalendar {
    client: reqwest::Client,
    base_url: String,
    calendar_id: String,
    token_file: PathBuf,
}

impl GoogleCalendar {
    /// Creates a client for the `primary` calendar.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(token_file: impl Into<PathBuf>, timeout: StdDuration) -> Result<Self, CalendarError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CalendarError::RequestFailed(e.to_string()))?;
        Ok(Self {
            client,
            base_url: GOOGLE_CALENDAR_API_URL.to_string(),
            calendar_id: "primary".to_string(),
            token_file: token_file.into(),
        })
    }

    /// Overrides the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Uses a calendar other than `primary`.
    pub fn with_calendar_id(mut self, calendar_id: impl Into<String>) -> Self {
        self.calendar_id = calendar_id.into();
        self
    }

    async fn access_token(&self) -> Result<String, CalendarError> {
        let raw = tokio::fs::read_to_string(&self.token_file)
            .await
            .map_err(|e| {
                CalendarError::NotAuthenticated(format!(
                    "cannot read {}: {}",
                    self.token_file.display(),
                    e
                ))
            })?;
        let token: StoredToken = serde_json::from_str(&raw)
            .map_err(|e| CalendarError::NotAuthenticated(format!("invalid token file: {}", e)))?;

        if let Some(expires_at) = token.expires_at {
            if expires_at <= Utc::now() {
                return Err(CalendarError::NotAuthenticated(format!(
                    "access token expired at {}",
                    expires_at
                )));
            }
        }
        Ok(token.access_token)
    }

    fn events_url(&self) -> Result<reqwest::Url, CalendarError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| CalendarError::RequestFailed(format!("invalid base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| CalendarError::RequestFailed("base URL cannot have a path".to_string()))?
            .pop_if_empty()
            .extend(["calendars", self.calendar_id.as_str(), "events"]);
        Ok(url)
    }
}

#[async_trait]
impl CalendarLookup for GoogleCalendar {
    async fn events_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        let token = self.access_token().await?;
        let url = self.events_url()?;

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(&[
                ("timeMin", start.to_rfc3339()),
                ("timeMax", end.to_rfc3339()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ])
            .send()
            .await
            .map_err(|e| CalendarError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CalendarError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: EventsResponse = response
            .json()
            .await
            .map_err(|e| CalendarError::ParseError(e.to_string()))?;

        Ok(parsed
            .items
            .into_iter()
            .filter_map(GoogleEvent::into_event)
            .collect())
    }
}
