//! Delivery of replies through the local Messages app.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, trace};

/// Errors from a send attempt.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The recipient is blank.
    #[error("recipient is empty")]
    EmptyRecipient,

    /// The helper process could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The helper process exited unsuccessfully.
    #[error("send failed ({status}): {stderr}")]
    Failed {
        /// Exit status description.
        status: String,
        /// Captured stderr.
        stderr: String,
    },

    /// The helper process did not finish in time.
    #[error("send timed out after {0:?}")]
    Timeout(Duration),
}

/// Sends a reply to a contact.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers `text` to `contact`.
    async fn send(&self, contact: &str, text: &str) -> Result<(), NotifyError>;
}

/// Sends iMessages by driving Messages.app through `osascript`.
#[derive(Debug, Clone)]
pub struct MessagesNotifier {
    program: String,
    timeout: Duration,
}

impl Default for MessagesNotifier {
    fn default() -> Self {
        Self {
            program: "osascript".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl MessagesNotifier {
    /// Creates a notifier using `osascript` with a 10 second timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a different script runner.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Sets the per-send timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the AppleScript that sends `text` to `recipient`.
    pub fn script(recipient: &str, text: &str) -> String {
        format!(
            r#"tell application "Messages"
    set targetService to 1st account whose service type = iMessage
    set targetBuddy to participant "{}" of targetService
    send "{}" to targetBuddy
end tell"#,
            escape_applescript(recipient),
            escape_applescript(text)
        )
    }
}

#[async_trait]
impl Notifier for MessagesNotifier {
    async fn send(&self, contact: &str, text: &str) -> Result<(), NotifyError> {
        let contact = contact.trim();
        if contact.is_empty() {
            return Err(NotifyError::EmptyRecipient);
        }

        trace!(program = %self.program, contact = %contact, "running send script");

        let child = Command::new(&self.program)
            .arg("-e")
            .arg(Self::script(contact, text))
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| NotifyError::Timeout(self.timeout))?
            .map_err(|source| NotifyError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(NotifyError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        debug!(contact = %contact, "message handed to Messages");
        Ok(())
    }
}

/// Escapes a value for use inside an AppleScript string literal.
pub fn escape_applescript(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\r' | '\n' => escaped.push(' '),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Shortens `text` to at most `max_chars` characters for log lines.
pub fn truncate_for_log(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
