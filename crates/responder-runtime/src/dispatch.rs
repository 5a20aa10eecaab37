//! Calendar lookup, reply composition and delivery for one entry.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use responder_core::{
    current_event, truncate_for_log, CalendarLookup, CalendarWindow, Notifier, ReplySource,
    ResponseComposer,
};
use responder_models::CommunicationEvent;

/// What happened to a single missed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A reply was handed to the notifier.
    Sent {
        /// How the reply text was produced.
        source: ReplySource,
    },
    /// Composition succeeded but delivery failed.
    SendFailed,
    /// The contact is not on the whitelist.
    SkippedNotWhitelisted,
    /// DND was off when the entry was seen.
    SkippedDndOff,
    /// The entry was too old when first seen.
    SkippedStale,
}

impl DispatchOutcome {
    /// Short label used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchOutcome::Sent {
                source: ReplySource::Fallback,
            } => "sent_fallback",
            DispatchOutcome::Sent { .. } => "sent",
            DispatchOutcome::SendFailed => "send_failed",
            DispatchOutcome::SkippedNotWhitelisted => "skipped_not_whitelisted",
            DispatchOutcome::SkippedDndOff => "skipped_dnd_off",
            DispatchOutcome::SkippedStale => "skipped_stale",
        }
    }

    /// Whether a reply went out.
    pub fn is_sent(&self) -> bool {
        matches!(self, DispatchOutcome::Sent { .. })
    }

    /// Whether the template stood in for a failed generation.
    pub fn fallback_used(&self) -> bool {
        matches!(
            self,
            DispatchOutcome::Sent {
                source: ReplySource::Fallback
            }
        )
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Replies to entries that passed the DND, age and whitelist gates.
pub struct Dispatcher {
    calendar: Arc<dyn CalendarLookup>,
    composer: Arc<ResponseComposer>,
    notifier: Arc<dyn Notifier>,
    window: CalendarWindow,
}

impl Dispatcher {
    /// Creates a dispatcher with the default calendar window.
    pub fn new(
        calendar: Arc<dyn CalendarLookup>,
        composer: Arc<ResponseComposer>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            calendar,
            composer,
            notifier,
            window: CalendarWindow::default(),
        }
    }

    /// Sets the calendar query window.
    pub fn with_window(mut self, window: CalendarWindow) -> Self {
        self.window = window;
        self
    }

    /// Looks up the current event, composes a reply and sends it.
    ///
    /// Never fails: calendar and generation problems degrade to templates,
    /// delivery problems become [`DispatchOutcome::SendFailed`].
    pub async fn reply(
        &self,
        entry: &CommunicationEvent,
        contact_name: Option<&str>,
        now: DateTime<Utc>,
    ) -> DispatchOutcome {
        let event = current_event(self.calendar.as_ref(), now, self.window).await;
        let composed = self.composer.compose(event.as_ref(), contact_name).await;

        match self.notifier.send(&entry.contact, &composed.text).await {
            Ok(()) => {
                info!(
                    source = %entry.source,
                    contact = %entry.contact,
                    event = event.as_ref().map(|e| e.title.as_str()),
                    reply = ?composed.source,
                    text = %truncate_for_log(&composed.text, 80),
                    "auto-reply sent"
                );
                DispatchOutcome::Sent {
                    source: composed.source,
                }
            }
            Err(e) => {
                warn!(
                    source = %entry.source,
                    contact = %entry.contact,
                    text = %truncate_for_log(&composed.text, 80),
                    error = %e,
                    "failed to send auto-reply"
                );
                DispatchOutcome::SendFailed
            }
        }
    }
}
