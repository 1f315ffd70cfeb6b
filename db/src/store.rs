//! Published tables with atomic reload.
//!
//! [`TableStore`] holds the current [`Tables`] behind an `Arc`. Readers take
//! a snapshot (an `Arc` clone) and decode against it for as long as they
//! need; a reload builds a complete new `Tables` value and swaps the `Arc`,
//! so a reader sees either the old tables or the new ones, never a mix.

use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use sms_command_core::{AnalyzeOutcome, Tables, analyze};
use tracing::{info, warn};

use crate::document::Document;
use crate::error::Result;
use crate::loader::{LoadOutcome, TableLoader};

/// Shared, swappable tables.
#[derive(Debug, Default)]
pub struct TableStore {
    current: ArcSwap<Tables>,
}

impl TableStore {
    pub fn new(tables: Tables) -> Self {
        Self {
            current: ArcSwap::from_pointee(tables),
        }
    }

    /// Tables currently published.
    pub fn snapshot(&self) -> Arc<Tables> {
        self.current.load_full()
    }

    /// Publishes `tables`, returning the previous ones.
    pub fn publish(&self, tables: Tables) -> Arc<Tables> {
        self.current.swap(Arc::new(tables))
    }

    /// Validates `document` and publishes the result if it has no error.
    /// On error the published tables are left untouched.
    pub fn reload(&self, loader: &TableLoader, document: &Document) -> LoadOutcome {
        let outcome = loader.load(document);
        if outcome.is_ok() {
            self.publish(outcome.tables.clone());
            info!("published reloaded tables");
        } else {
            warn!(error = %outcome.first_error, "kept previous tables");
        }
        outcome
    }

    /// Reads a tables file and reloads from it.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`](crate::DatabaseError) when the file cannot
    /// be read or parsed; the published tables are left untouched.
    pub fn reload_path(&self, loader: &TableLoader, path: impl AsRef<Path>) -> Result<LoadOutcome> {
        let outcome = loader.load_path(path)?;
        if outcome.is_ok() {
            self.publish(outcome.tables.clone());
            info!(
                commands = outcome.tables.commands().len(),
                devices = outcome.tables.devices().len(),
                "published reloaded tables"
            );
        } else {
            warn!(error = %outcome.first_error, "kept previous tables");
        }
        Ok(outcome)
    }

    /// Decodes `text` against the tables published at call time.
    pub fn analyze(&self, text: &str) -> AnalyzeOutcome {
        analyze(&self.snapshot(), text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables(index: i64, name: &str) -> Tables {
        Tables::builder()
            .mapping_value("on", 1, false)
            .mapping("switch", ["on"])
            .command("allume", "on")
            .device_class("lampe", "switch")
            .device("lampe cuisine", index, name)
            .build()
    }

    #[test]
    fn test_publish_swaps_and_returns_previous() {
        let store = TableStore::new(tables(1, "old"));
        let before = store.snapshot();
        let previous = store.publish(tables(2, "new"));

        assert!(Arc::ptr_eq(&before, &previous));
        assert_eq!(before.device("lampe cuisine").unwrap().name, "old");
        assert_eq!(store.snapshot().device("lampe cuisine").unwrap().name, "new");
    }

    #[test]
    fn test_analyze_uses_current_tables() {
        let store = TableStore::new(tables(1, "old"));
        assert_eq!(
            store.analyze("allume lampe cuisine").result.device_id_name,
            "old"
        );
        store.publish(tables(2, "new"));
        assert_eq!(
            store.analyze("allume lampe cuisine").result.device_id_name,
            "new"
        );
    }

    #[test]
    fn test_failed_reload_keeps_tables() {
        let store = TableStore::new(tables(1, "old"));
        let broken = Document::from_json_str(r#"{ "ignores": 3 }"#).unwrap();
        let outcome = store.reload(&TableLoader::default(), &broken);
        assert!(!outcome.is_ok());
        assert_eq!(store.snapshot().device("lampe cuisine").unwrap().name, "old");
    }
}
