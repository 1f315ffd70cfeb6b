//! Four-slot command resolution.
//!
//! A command reads `[command] [device class] [device] [value]`, for example
//! "allume lampe cuisine" or "règle clim séjour 21". Slots are resolved left
//! to right against the [`Tables`]; the first slot that cannot be resolved
//! stops the run.
//!
//! # Examples
//!
//! ```
//! use sms_command_core::{Tables, analyze};
//!
//! let tables = Tables::builder()
//!     .ignore("la")
//!     .ignore("de")
//!     .mapping_value("on", 1, false)
//!     .mapping("switch", ["on"])
//!     .command("allume", "on")
//!     .device_class("lampe", "switch")
//!     .device("lampe cuisine", 3, "Kitchen")
//!     .build();
//!
//! let outcome = analyze(&tables, "allume la lampe de la cuisine");
//! assert!(outcome.is_ok());
//! assert_eq!(outcome.result.device_name, "lampe cuisine");
//! assert_eq!(outcome.result.understood(), "allume lampe cuisine");
//! ```

use tracing::debug;

use crate::diagnostics::Diagnostics;
use crate::error::{DecodeError, Slot};
use crate::matcher::match_at;
use crate::normalize::normalize;
use crate::types::{ParseResult, Tables};

/// Result of [`analyze`].
#[derive(Debug, Clone)]
pub struct AnalyzeOutcome {
    /// First error line, empty on success.
    pub first_error: String,
    /// Every diagnostic line of the run.
    pub full_log: String,
    /// Decoded fields. Only complete when `first_error` is empty.
    pub result: ParseResult,
    /// Typed form of `first_error`.
    pub error: Option<DecodeError>,
}

impl AnalyzeOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Decodes `text` against `tables`.
///
/// Never fails: every problem is reported through the returned outcome.
pub fn analyze(tables: &Tables, text: &str) -> AnalyzeOutcome {
    let options = tables.options();
    let mut diagnostics = Diagnostics::new(options.ascii_output);
    let tokens = normalize(text, tables.ignores(), options);
    debug!(?tokens, "analyzing command");

    let mut resolver = Resolver {
        tables,
        tokens: &tokens,
        result: ParseResult::default(),
    };
    let error = resolver.run().err();
    if let Some(err) = &error {
        debug!(%err, "command rejected");
        diagnostics.record(err.to_string());
    }

    AnalyzeOutcome {
        first_error: diagnostics.first_error().to_string(),
        full_log: diagnostics.full_log(),
        result: resolver.result,
        error,
    }
}

struct Resolver<'t> {
    tables: &'t Tables,
    tokens: &'t [String],
    result: ParseResult,
}

impl Resolver<'_> {
    fn run(&mut self) -> Result<(), DecodeError> {
        let tables = self.tables;
        let options = tables.options();

        let command = match_at(
            self.tokens,
            0,
            tables.commands().iter().map(|c| c.name.as_str()),
            Slot::Command,
            options,
        )?;
        self.result.command = command.key.to_string();
        let mut cursor = command.word_count;

        if cursor >= self.tokens.len() {
            return Err(DecodeError::MissingSlot(Slot::DeviceClass));
        }
        let class = match_at(
            self.tokens,
            cursor,
            tables.device_classes().iter().map(|c| c.name.as_str()),
            Slot::DeviceClass,
            options,
        )?;
        self.result.device_class = class.key.to_string();
        // Device keys start with their class name, so the cursor stays on it.
        if self.tokens.len() < cursor + 2 {
            return Err(DecodeError::MissingSlot(Slot::Device));
        }

        let device_class = tables
            .device_class(class.key)
            .ok_or_else(|| missing("device class", class.key))?;
        let mapping = tables
            .mapping(&device_class.mapping)
            .ok_or_else(|| missing("mapping", &device_class.mapping))?;
        let command_def = tables
            .command(command.key)
            .ok_or_else(|| missing("command", command.key))?;
        if !mapping.permits(&command_def.mapping_value) {
            return Err(DecodeError::IncompatibleCommand {
                command: command.key.to_string(),
                device_class: class.key.to_string(),
            });
        }
        let mapping_value = tables
            .mapping_value(&command_def.mapping_value)
            .ok_or_else(|| missing("mapping value", &command_def.mapping_value))?;

        let device = match_at(
            self.tokens,
            cursor,
            tables
                .devices_of_class(&device_class.name)
                .map(|d| d.key.as_str()),
            Slot::Device,
            options,
        )?;
        self.result.device_name = device.key.to_string();
        cursor += device.word_count;

        let remaining = &self.tokens[cursor.min(self.tokens.len())..];
        if mapping_value.settable {
            if remaining.is_empty() {
                return Err(DecodeError::MissingSlot(Slot::Value));
            }
            match &device_class.values {
                Some(choices) => {
                    let value = match_at(
                        self.tokens,
                        cursor,
                        choices.iter().map(|c| c.name.as_str()),
                        Slot::Value,
                        options,
                    )?;
                    self.result.value_to_set = Some(value.key.to_string());
                    self.result.value_to_set_remapped =
                        device_class.value(value.key).map(|c| c.remapped.clone());
                    cursor += value.word_count;
                    if cursor < self.tokens.len() {
                        return Err(DecodeError::TrailingTokens {
                            remaining: self.tokens[cursor..].to_vec(),
                            after: value.key.to_string(),
                        });
                    }
                }
                None => self.result.value_to_set = Some(remaining.join(" ")),
            }
        } else if !remaining.is_empty() {
            return Err(DecodeError::TrailingTokens {
                remaining: remaining.to_vec(),
                after: device.key.to_string(),
            });
        }

        let device_def = tables
            .device(device.key)
            .ok_or_else(|| missing("device", device.key))?;
        self.result.device_id = Some(device_def.index.clone());
        self.result.device_id_name = device_def.name.clone();
        self.result.command_value = mapping_value.code;
        self.result.command_value_text = mapping_value.name.clone();
        debug!(understood = %self.result.understood(), "command resolved");
        Ok(())
    }
}

fn missing(kind: &'static str, name: &str) -> DecodeError {
    DecodeError::MissingReference {
        kind,
        name: name.to_string(),
    }
}
