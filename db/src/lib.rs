//! Keyword table loading, validation and reload.
//!
//! This crate turns a tables document (JSON or YAML) into the immutable
//! [`Tables`](sms_command_core::Tables) used to decode commands, and keeps
//! the published tables swappable at runtime.
//!
//! # Quick start
//!
//! ```no_run
//! use sms_command_db::{DecoderSettings, TableLoader, TableStore};
//!
//! let settings = DecoderSettings::load("decoder.yml").unwrap();
//! let loader = TableLoader::new(settings.fold_options());
//!
//! let outcome = loader.load_path(settings.tables_path().unwrap()).unwrap();
//! if !outcome.is_ok() {
//!     eprintln!("{}", outcome.full_log);
//!     std::process::exit(2);
//! }
//!
//! let store = TableStore::new(outcome.tables);
//! let decoded = store.analyze("allume la lampe de la cuisine");
//! println!("{}", decoded.result.understood());
//!
//! // Later, pick up edited tables without stopping readers
//! store.reload_path(&loader, settings.tables_path().unwrap()).unwrap();
//! ```
//!
//! # Document shape
//!
//! ```text
//! ignores: [string]
//! mappingValues: { name: { mappingValue: int, set?: bool } }
//! mappings: { name: { mapping: [mappingValueName] } }
//! commands: { name: { command: mappingValueName } }
//! deviceClasses: { name: { deviceClass: mappingName, values?: { valueName: remappedValue } } }
//! devices: { "<deviceClass> <instance...>": { index: int|string, name: string } }
//! ```

mod config;
mod document;
mod error;
mod loader;
mod store;

pub use config::DecoderSettings;
pub use document::Document;
pub use error::{DatabaseError, Result};
pub use loader::{LoadIssue, LoadOutcome, Section, TableLoader, load};
pub use store::TableStore;
