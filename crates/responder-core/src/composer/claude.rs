//! Claude Messages API generator.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::persona::Persona;
use super::{ComposeError, ReplyRequest, ResponseGenerator};

/// Default Anthropic API base URL.
pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com";

/// Default model.
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20240620";

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Settings for the Claude generator.
#[derive(Debug, Clone)]
pub struct ClaudeConfig {
    /// API key.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// API base URL.
    pub base_url: String,
    /// Token limit for the reply.
    pub max_tokens: u32,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl ClaudeConfig {
    /// Creates a config with defaults for everything but the key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: ANTHROPIC_API_URL.to_string(),
            max_tokens: 200,
            timeout: Duration::from_secs(10),
        }
    }

    /// Sets the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: String,
    messages: Vec<RequestMessage>,
}

#[derive(Debug, Serialize)]
struct RequestMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Generates replies with Claude.
pub struct ClaudeGenerator {
    client: reqwest::Client,
    config: ClaudeConfig,
    persona: Persona,
}

impl ClaudeGenerator {
    /// Creates a generator.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: ClaudeConfig, persona: Persona) -> Result<Self, ComposeError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ComposeError::RequestFailed(e.to_string()))?;
        Ok(Self {
            client,
            config,
            persona,
        })
    }

    fn system_prompt(&self) -> String {
        format!(
            "You are {signature}, an automated assistant that sends brief, friendly replies when {owner} is unavailable.\n\
             \n\
             Your replies should be:\n\
             - Brief and conversational (1-2 sentences max)\n\
             - Friendly and helpful\n\
             - Mention what {owner} is doing if a calendar event is given\n\
             - Suggest when to try again based on the event's end time\n\
             - End with \"{sign_off}\"\n\
             \n\
             Keep it polite and professional.",
            signature = self.persona.signature,
            owner = self.persona.owner_name,
            sign_off = self.persona.sign_off(),
        )
    }

    fn user_prompt(&self, request: &ReplyRequest<'_>) -> String {
        let owner = &self.persona.owner_name;
        let mut prompt = match request.event {
            Some(event) => format!(
                "{owner} is currently at: {title}\nEnd time: {end}\nLocation: {location}\n\n\
                 Write a brief reply letting them know {owner} is busy and when to try again.",
                title = event.title,
                end = self.persona.zone.format_time(event.end),
                location = event.location.as_deref().unwrap_or("No location specified"),
            ),
            None => format!(
                "{owner} has no calendar event right now. Write a brief reply saying {owner} \
                 is busy and will get back to them soon."
            ),
        };
        if let Some(name) = request.contact_name {
            prompt.push_str(&format!("\nThe reply is addressed to {}.", name));
        }
        prompt
    }
}

#[async_trait]
impl ResponseGenerator for ClaudeGenerator {
    fn name(&self) -> &'static str {
        "claude"
    }

    async fn generate(&self, request: &ReplyRequest<'_>) -> Result<String, ComposeError> {
        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            system: self.system_prompt(),
            messages: vec![RequestMessage {
                role: "user",
                content: self.user_prompt(request),
            }],
        };

        trace!(model = %self.config.model, "sending generation request");

        let url = format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| ComposeError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ComposeError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ComposeError::ParseError(e.to_string()))?;

        let text = parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join(" ");

        let text = text.trim();
        if text.is_empty() {
            return Err(ComposeError::Empty);
        }
        Ok(text.to_string())
    }
}
