//! Errors reported while decoding a command.
//!
//! Each variant describes why resolution stopped. The `Display` impl is the
//! single line handed back to whoever sent the command.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// One of the four grammar positions of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Slot {
    Command,
    DeviceClass,
    Device,
    Value,
}

impl Slot {
    /// Label used in diagnostics and table listings.
    pub fn label(self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::DeviceClass => "deviceClass",
            Self::Device => "device",
            Self::Value => "value",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Reasons a command could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// No keyword of the slot's table matches the remaining tokens.
    #[error("{remaining:?} is not a known {label}, use {available:?}")]
    UnknownKeyword {
        label: Slot,
        remaining: Vec<String>,
        available: Vec<String>,
    },
    /// More than one keyword matches; ties are never resolved silently.
    #[error("{remaining:?} is ambiguous {label}, could be {candidates:?}")]
    AmbiguousKeyword {
        label: Slot,
        remaining: Vec<String>,
        candidates: Vec<String>,
    },
    /// A required slot has no token left to match.
    #[error("{}", missing_slot_message(.0))]
    MissingSlot(Slot),
    /// The command's mapping value is not allowed by the device class.
    #[error("Can't do command {command} on device class {device_class}")]
    IncompatibleCommand {
        command: String,
        device_class: String,
    },
    /// Input is left over once every slot was resolved.
    #[error("Can't understand {remaining:?} after {after}")]
    TrailingTokens { remaining: Vec<String>, after: String },
    /// Tables refer to an entry they do not contain. Loaded tables never
    /// produce this; hand-built ones can.
    #[error("Can't find {kind} {name}")]
    MissingReference { kind: &'static str, name: String },
}

fn missing_slot_message(slot: &Slot) -> String {
    match slot {
        Slot::Command => "No command given!".to_string(),
        Slot::DeviceClass => "No device class given!".to_string(),
        Slot::Device => "No device given!".to_string(),
        Slot::Value => "Value to set is missing".to_string(),
    }
}

impl DecodeError {
    /// Slot the error is attached to, when there is one.
    pub fn slot(&self) -> Option<Slot> {
        match self {
            Self::UnknownKeyword { label, .. } | Self::AmbiguousKeyword { label, .. } => {
                Some(*label)
            }
            Self::MissingSlot(slot) => Some(*slot),
            Self::IncompatibleCommand { .. } => Some(Slot::DeviceClass),
            Self::TrailingTokens { .. } | Self::MissingReference { .. } => None,
        }
    }
}
