//! Reply composition.
//!
//! Replies come from a [`ResponseGenerator`]. There are two: the remote
//! [`ClaudeGenerator`] and the static [`TemplateGenerator`].
//! [`ResponseComposer`] wraps an optional remote generator and substitutes
//! the template output whenever generation fails, so callers always get a
//! non-empty reply.

pub mod claude;
pub mod persona;
pub mod template;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use responder_models::CalendarEvent;

pub use claude::{ClaudeConfig, ClaudeGenerator};
pub use persona::{LocalZone, Persona};
pub use template::TemplateGenerator;

/// Errors from a generation attempt.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// The request could not be sent or timed out.
    #[error("generation request failed: {0}")]
    RequestFailed(String),

    /// The API answered with a non-success status (quota, auth, ...).
    #[error("generation API error {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The response did not have the expected shape.
    #[error("failed to parse generation response: {0}")]
    ParseError(String),

    /// The model returned nothing usable.
    #[error("generation returned empty text")]
    Empty,
}

/// Input to a generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplyRequest<'a> {
    /// Event the user is currently in.
    pub event: Option<&'a CalendarEvent>,
    /// Name of the contact being answered.
    pub contact_name: Option<&'a str>,
}

/// Capability to produce a reply text.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Produces a reply for `request`.
    async fn generate(&self, request: &ReplyRequest<'_>) -> Result<String, ComposeError>;
}

/// Where a composed reply came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    /// Produced by the remote generator.
    Generated,
    /// Template chosen directly: no event, or no remote generator configured.
    Template,
    /// Template substituted after the remote generator failed.
    Fallback,
}

/// A finished reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composed {
    /// Text to send.
    pub text: String,
    /// How it was produced.
    pub source: ReplySource,
}

/// Builds replies, falling back to templates on any generation failure.
pub struct ResponseComposer {
    primary: Option<Arc<dyn ResponseGenerator>>,
    templates: TemplateGenerator,
}

impl ResponseComposer {
    /// Template-only composer.
    pub fn new(persona: Persona) -> Self {
        Self {
            primary: None,
            templates: TemplateGenerator::new(persona),
        }
    }

    /// Sets the remote generator tried first for event replies.
    pub fn with_generator(mut self, generator: Arc<dyn ResponseGenerator>) -> Self {
        self.primary = Some(generator);
        self
    }

    /// Composes a reply. Never fails and never returns an empty string.
    ///
    /// Without an event the no-event template is used directly.
    pub async fn compose(
        &self,
        event: Option<&CalendarEvent>,
        contact_name: Option<&str>,
    ) -> Composed {
        let Some(event) = event else {
            return Composed {
                text: self.templates.without_event(),
                source: ReplySource::Template,
            };
        };

        let Some(primary) = &self.primary else {
            return Composed {
                text: self.templates.with_event(event),
                source: ReplySource::Template,
            };
        };

        let request = ReplyRequest {
            event: Some(event),
            contact_name,
        };

        match primary.generate(&request).await {
            Ok(text) if !text.trim().is_empty() => {
                debug!(generator = primary.name(), "reply generated");
                Composed {
                    text: self.templates.persona().ensure_signed(&text),
                    source: ReplySource::Generated,
                }
            }
            Ok(_) => {
                warn!(generator = primary.name(), "generator returned empty text, using template");
                self.fallback(event)
            }
            Err(e) => {
                warn!(generator = primary.name(), error = %e, "generation failed, using template");
                self.fallback(event)
            }
        }
    }

    fn fallback(&self, event: &CalendarEvent) -> Composed {
        Composed {
            text: self.templates.with_event(event),
            source: ReplySource::Fallback,
        }
    }
}
