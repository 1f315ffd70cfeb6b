//! Keyword tables and command resolution for home-automation text commands.
//!
//! A command such as "allume la lampe de la cuisine" is decoded into four
//! slots, each matched against a keyword table:
//!
//! - **command**: what to do ("allume"), bound to a [`MappingValue`].
//! - **device class**: the kind of device ("lampe"), bound to a
//!   [`Mapping`] listing the mapping values it accepts.
//! - **device**: the instance ("lampe cuisine"), with its index and
//!   display name.
//! - **value**: for settable commands only, either one of the class's
//!   enumerated values or the remaining text taken literally.
//!
//! Matching folds case and accents ([`fold`]) and accepts abbreviations, but
//! never picks between two matching keywords: [`match_at`] returns a single
//! match or a diagnostic.
//!
//! [`analyze`] is a pure function of the [`Tables`] and the text; it returns
//! a fresh [`AnalyzeOutcome`] every time, so one `Tables` value can serve
//! any number of concurrent callers.
//!
//! # Example
//!
//! ```
//! use sms_command_core::*;
//!
//! let tables = Tables::builder()
//!     .ignore("la")
//!     .ignore("du")
//!     .ignore("sur")
//!     .mapping_value("setTemp", 20, true)
//!     .mapping("climate", ["setTemp"])
//!     .command("règle", "setTemp")
//!     .device_class("clim", "climate")
//!     .device("clim séjour", 12, "Living AC")
//!     .build();
//!
//! let outcome = analyze(&tables, "regle la clim du sejour sur 21");
//! assert_eq!(outcome.first_error, "");
//! assert_eq!(outcome.result.value_to_set.as_deref(), Some("21"));
//! assert_eq!(outcome.result.command_value, 20);
//! ```

mod diagnostics;
mod error;
mod matcher;
mod normalize;
mod resolver;
mod types;

pub use diagnostics::Diagnostics;
pub use error::{DecodeError, Slot};
pub use matcher::{KeywordMatch, match_at};
pub use normalize::{FoldOptions, equal_prefix, fold, normalize, strip_prefix, to_ascii};
pub use resolver::{AnalyzeOutcome, analyze};
pub use types::*;
