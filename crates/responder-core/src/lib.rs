//! DND Responder core - the external collaborators behind each reply.
//!
//! - **calendar**: "what is the user in right now?" via Google Calendar
//! - **composer**: reply text from Claude, with deterministic template fallback
//! - **notifier**: delivery through Messages.app
//! - **config**: state directory and file locations

pub mod calendar;
pub mod composer;
pub mod config;
pub mod notifier;

pub use calendar::{
    current_event, select_current, CalendarError, CalendarLookup, CalendarWindow, GoogleCalendar,
};
pub use composer::{
    ClaudeConfig, ClaudeGenerator, ComposeError, Composed, LocalZone, Persona, ReplyRequest,
    ReplySource, ResponseComposer, ResponseGenerator, TemplateGenerator,
};
pub use notifier::{truncate_for_log, MessagesNotifier, NotifyError, Notifier};
