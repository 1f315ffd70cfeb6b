//! Message accumulation for load and decode runs.

use crate::normalize::to_ascii;

/// Accumulates human-readable messages.
///
/// The first recorded error is kept apart so callers can answer with a
/// single line while logging the whole run.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    ascii_output: bool,
    messages: Vec<String>,
    first_error: Option<String>,
}

impl Diagnostics {
    /// Creates an empty log. With `ascii_output`, messages are stored as
    /// their ASCII equivalent.
    pub fn new(ascii_output: bool) -> Self {
        Self {
            ascii_output,
            ..Self::default()
        }
    }

    /// Records an error. The first one becomes [`first_error`](Self::first_error).
    pub fn record(&mut self, message: impl Into<String>) {
        let message = self.render(message.into());
        if self.first_error.is_none() {
            self.first_error = Some(message.clone());
        }
        self.messages.push(message);
    }

    /// Records an informational line without flagging an error.
    pub fn record_info(&mut self, message: impl Into<String>) {
        let message = self.render(message.into());
        self.messages.push(message);
    }

    pub fn has_error(&self) -> bool {
        self.first_error.is_some()
    }

    /// First recorded error, or an empty string when there is none.
    pub fn first_error(&self) -> &str {
        self.first_error.as_deref().unwrap_or("")
    }

    /// Every recorded line, one per line.
    pub fn full_log(&self) -> String {
        self.messages.join("\n")
    }

    fn render(&self, message: String) -> String {
        if self.ascii_output {
            to_ascii(&message)
        } else {
            message
        }
    }
}
