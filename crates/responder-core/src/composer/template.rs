//! Static reply templates.

use async_trait::async_trait;

use responder_models::CalendarEvent;

use super::persona::Persona;
use super::{ComposeError, ReplyRequest, ResponseGenerator};

/// Fixed-string replies. Deterministic and infallible.
#[derive(Debug, Clone)]
pub struct TemplateGenerator {
    persona: Persona,
}

impl TemplateGenerator {
    /// Creates templates for `persona`.
    pub fn new(persona: Persona) -> Self {
        Self { persona }
    }

    /// The persona the templates speak for.
    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    /// Reply naming the current event and when it ends.
    pub fn with_event(&self, event: &CalendarEvent) -> String {
        let until = self.persona.zone.format_time(event.end);
        let place = match &event.location {
            Some(location) => format!("{} ({})", event.title, location),
            None => event.title.clone(),
        };
        format!(
            "{} is currently at {} until {}... try calling them then! {}",
            self.persona.owner_name,
            place,
            until,
            self.persona.sign_off()
        )
    }

    /// Generic "unavailable" reply.
    pub fn without_event(&self) -> String {
        format!(
            "{} is currently unavailable and will get back to you soon! {}",
            self.persona.owner_name,
            self.persona.sign_off()
        )
    }
}

#[async_trait]
impl ResponseGenerator for TemplateGenerator {
    fn name(&self) -> &'static str {
        "template"
    }

    async fn generate(&self, request: &ReplyRequest<'_>) -> Result<String, ComposeError> {
        Ok(match request.event {
            Some(event) => self.with_event(event),
            None => self.without_event(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::LocalZone;
    use chrono::{FixedOffset, TimeZone, Utc};

    fn templates() -> TemplateGenerator {
        TemplateGenerator::new(Persona::new(
            "Tomas",
            "TomasBot",
            LocalZone::new(FixedOffset::west_opt(5 * 3600).unwrap(), "EST"),
        ))
    }

    fn gym() -> CalendarEvent {
        CalendarEvent::new(
            "Gym",
            Utc.with_ymd_and_hms(2024, 1, 15, 21, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 15, 22, 30, 0).unwrap(),
        )
    }

    #[test]
    fn test_with_event_and_location() {
        let text = templates().with_event(&gym().with_location("Downtown YMCA"));
        assert_eq!(
            text,
            "Tomas is currently at Gym (Downtown YMCA) until 05:30PM EST... try calling them then! - TomasBot"
        );
    }

    #[test]
    fn test_with_event_without_location() {
        let text = templates().with_event(&gym());
        assert_eq!(
            text,
            "Tomas is currently at Gym until 05:30PM EST... try calling them then! - TomasBot"
        );
    }

    #[tokio::test]
    async fn test_generate_never_fails() {
        let templates = templates();
        let event = gym();

        let with = templates
            .generate(&ReplyRequest {
                event: Some(&event),
                contact_name: None,
            })
            .await
            .unwrap();
        assert_eq!(with, templates.with_event(&event));

        let without = templates.generate(&ReplyRequest::default()).await.unwrap();
        assert_eq!(without, templates.without_event());
    }
}
