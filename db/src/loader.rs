//! Table loading and validation.
//!
//! Turns a [`Document`] into [`Tables`]. Validation is exhaustive: every
//! section and every entry is checked even after an error, and all problems
//! are returned together in a [`LoadOutcome`]. Entries with errors are left
//! out of the produced tables; the rest are kept so callers can still
//! inspect them, but only an outcome without error should be published.
//!
//! Duplicate keys are warnings: the last definition wins and keeps the
//! position of the first one.
//!
//! # Example
//!
//! ```
//! use sms_command_db::{Document, TableLoader};
//!
//! let document = Document::from_json_str(r#"{
//!     "ignores": ["la", "de"],
//!     "mappingValues": { "on": { "mappingValue": 1 } },
//!     "mappings": { "switch": { "mapping": ["on"] } },
//!     "commands": { "allume": { "command": "on" } },
//!     "deviceClasses": { "lampe": { "deviceClass": "switch" } },
//!     "devices": { "lampe cuisine": { "index": 3, "name": "Kitchen" } }
//! }"#).unwrap();
//!
//! let outcome = TableLoader::default().load(&document);
//! assert_eq!(outcome.first_error, "");
//! assert_eq!(outcome.tables.devices().len(), 1);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use sms_command_core::{
    DeviceIndex, Diagnostics, FoldOptions, Scalar, Tables, TablesBuilder, ValueChoice,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::document::Document;
use crate::error::Result;

/// Top-level sections of a tables document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Ignores,
    MappingValues,
    Mappings,
    Commands,
    DeviceClasses,
    Devices,
}

impl Section {
    /// Key of the section in the document.
    pub fn key(self) -> &'static str {
        match self {
            Self::Ignores => "ignores",
            Self::MappingValues => "mappingValues",
            Self::Mappings => "mappings",
            Self::Commands => "commands",
            Self::DeviceClasses => "deviceClasses",
            Self::Devices => "devices",
        }
    }

    fn phase(self) -> &'static str {
        match self {
            Self::Ignores => "checking ignores",
            Self::MappingValues => "checking mapping values",
            Self::Mappings => "checking mappings",
            Self::Commands => "checking commands",
            Self::DeviceClasses => "checking device classes",
            Self::Devices => "checking devices",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A problem found while loading a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadIssue {
    /// A value has the wrong shape or type, or is missing.
    #[error("{path} is {found}, should be {expected}")]
    SchemaError {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
    /// A value has the right type but an unusable content.
    #[error("{path} {reason}")]
    InvalidValue { path: String, reason: &'static str },
    /// An entry names something another table does not declare.
    #[error("{path} is {name:?}, should be one of {known:?}")]
    ReferenceError {
        path: String,
        name: String,
        known: Vec<String>,
    },
    /// The same key is declared twice in one object. Not fatal.
    #[error("duplicate definition of {key:?} in {path}, last one is kept")]
    DuplicateKeyWarning { path: String, key: String },
}

impl LoadIssue {
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::DuplicateKeyWarning { .. })
    }
}

/// Result of loading a document.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    /// First error line, empty when the document is valid.
    pub first_error: String,
    /// Every diagnostic line, warnings included.
    pub full_log: String,
    /// Tables built from the valid entries.
    pub tables: Tables,
    /// Every issue found, in order.
    pub issues: Vec<LoadIssue>,
}

impl LoadOutcome {
    pub fn is_ok(&self) -> bool {
        self.first_error.is_empty()
    }

    pub fn errors(&self) -> impl Iterator<Item = &LoadIssue> {
        self.issues.iter().filter(|issue| issue.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &LoadIssue> {
        self.issues.iter().filter(|issue| !issue.is_error())
    }
}

/// Builds [`Tables`] from documents.
#[derive(Debug, Clone)]
pub struct TableLoader {
    options: FoldOptions,
    source: String,
}

impl Default for TableLoader {
    fn default() -> Self {
        Self::new(FoldOptions::default())
    }
}

impl TableLoader {
    pub fn new(options: FoldOptions) -> Self {
        Self {
            options,
            source: "tables".to_string(),
        }
    }

    /// Names the document in diagnostics, typically its file name.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Reads and validates a tables file.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`](crate::DatabaseError) when the file cannot
    /// be read or parsed. Validation problems are reported in the outcome.
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<LoadOutcome> {
        let path = path.as_ref();
        let document = Document::from_path(path)?;
        let source = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Ok(self.clone().with_source(source).load(&document))
    }

    /// Validates `document` and builds tables from it.
    pub fn load(&self, document: &Document) -> LoadOutcome {
        let mut run = LoadRun {
            options: self.options,
            source: &self.source,
            diagnostics: Diagnostics::new(self.options.ascii_output),
            issues: Vec::new(),
            phase: "checking file",
        };
        let tables = run.load(document);

        let errors = run.issues.iter().filter(|issue| issue.is_error()).count();
        if errors > 0 {
            run.diagnostics
                .record_info(format!("Error detected, please check {}!", self.source));
        }
        info!(
            source = %self.source,
            commands = tables.commands().len(),
            device_classes = tables.device_classes().len(),
            devices = tables.devices().len(),
            errors,
            "loaded tables"
        );

        LoadOutcome {
            first_error: run.diagnostics.first_error().to_string(),
            full_log: run.diagnostics.full_log(),
            tables,
            issues: run.issues,
        }
    }
}

/// Validates `document` with default options.
pub fn load(document: &Document) -> LoadOutcome {
    TableLoader::default().load(document)
}

struct LoadRun<'a> {
    options: FoldOptions,
    source: &'a str,
    diagnostics: Diagnostics,
    issues: Vec<LoadIssue>,
    phase: &'static str,
}

impl LoadRun<'_> {
    fn load(&mut self, document: &Document) -> Tables {
        let mut builder = Tables::builder().options(self.options);
        if document.entries().is_none() {
            self.schema_error("document", "object", document, None);
            return builder.build();
        }
        self.dedupe(document.entries().unwrap_or_default(), "document");

        self.phase = Section::Ignores.phase();
        builder = self.load_ignores(document, builder);

        self.phase = Section::MappingValues.phase();
        builder = self.load_mapping_values(document, builder);
        let mapping_values = names(builder.current().mapping_values().iter().map(|v| &v.name));

        self.phase = Section::Mappings.phase();
        builder = self.load_mappings(document, builder, &mapping_values);
        let mappings = names(builder.current().mappings().iter().map(|m| &m.name));

        self.phase = Section::Commands.phase();
        builder = self.load_commands(document, builder, &mapping_values);

        self.phase = Section::DeviceClasses.phase();
        builder = self.load_device_classes(document, builder, &mappings);
        let classes = names(builder.current().device_classes().iter().map(|c| &c.name));

        self.phase = Section::Devices.phase();
        builder = self.load_devices(document, builder, &classes);

        builder.build()
    }

    fn load_ignores(&mut self, document: &Document, mut builder: TablesBuilder) -> TablesBuilder {
        let Some(section) = self.section(document, Section::Ignores, "list") else {
            return builder;
        };
        let Some(items) = section.as_list() else {
            self.schema_error("ignores", "list", section, None);
            return builder;
        };
        for (i, item) in items.iter().enumerate() {
            match item.as_str() {
                Some(token) => builder = builder.ignore(token),
                None => self.schema_error(&format!("ignores[{i}]"), "string", item, None),
            }
        }
        builder
    }

    fn load_mapping_values(
        &mut self,
        document: &Document,
        mut builder: TablesBuilder,
    ) -> TablesBuilder {
        for (name, entry) in self.object_entries(document, Section::MappingValues) {
            let path = format!("mappingValues.{name}");
            if entry.entries().is_none() {
                self.schema_error(&path, "object", entry, None);
                continue;
            }
            let code = match entry.get("mappingValue") {
                Some(Document::Integer(code)) => Some(*code),
                other => {
                    self.field_error(&path, "mappingValue", "int", other, entry);
                    None
                }
            };
            let settable = match entry.get("set") {
                None | Some(Document::Null) => Some(false),
                Some(Document::Bool(set)) => Some(*set),
                other => {
                    self.field_error(&path, "set", "bool", other, entry);
                    None
                }
            };
            if let (Some(code), Some(settable)) = (code, settable) {
                builder = builder.mapping_value(name, code, settable);
            }
        }
        builder
    }

    fn load_mappings(
        &mut self,
        document: &Document,
        mut builder: TablesBuilder,
        mapping_values: &[String],
    ) -> TablesBuilder {
        for (name, entry) in self.object_entries(document, Section::Mappings) {
            let path = format!("mappings.{name}");
            if entry.entries().is_none() {
                self.schema_error(&path, "object", entry, None);
                continue;
            }
            let Some(items) = entry.get("mapping").and_then(Document::as_list) else {
                self.field_error(&path, "mapping", "list", entry.get("mapping"), entry);
                continue;
            };
            let mut values = Vec::with_capacity(items.len());
            let mut valid = true;
            for (i, item) in items.iter().enumerate() {
                let item_path = format!("{path}.mapping[{i}]");
                let Some(value) = item.as_str() else {
                    self.schema_error(&item_path, "string", item, Some(entry));
                    valid = false;
                    continue;
                };
                match self.resolve(&item_path, value, mapping_values, entry) {
                    Some(canonical) => values.push(canonical),
                    None => valid = false,
                }
            }
            if valid {
                builder = builder.mapping(name, values);
            }
        }
        builder
    }

    fn load_commands(
        &mut self,
        document: &Document,
        mut builder: TablesBuilder,
        mapping_values: &[String],
    ) -> TablesBuilder {
        for (name, entry) in self.object_entries(document, Section::Commands) {
            let path = format!("commands.{name}");
            if entry.entries().is_none() {
                self.schema_error(&path, "object", entry, None);
                continue;
            }
            let Some(value) = entry.get("command").and_then(Document::as_str) else {
                self.field_error(&path, "command", "string", entry.get("command"), entry);
                continue;
            };
            if let Some(canonical) =
                self.resolve(&format!("{path}.command"), value, mapping_values, entry)
            {
                builder = builder.command(name, canonical);
            }
        }
        builder
    }

    fn load_device_classes(
        &mut self,
        document: &Document,
        mut builder: TablesBuilder,
        mappings: &[String],
    ) -> TablesBuilder {
        for (name, entry) in self.object_entries(document, Section::DeviceClasses) {
            let path = format!("deviceClasses.{name}");
            if entry.entries().is_none() {
                self.schema_error(&path, "object", entry, None);
                continue;
            }
            let Some(value) = entry.get("deviceClass").and_then(Document::as_str) else {
                self.field_error(&path, "deviceClass", "string", entry.get("deviceClass"), entry);
                continue;
            };
            let mapping = self.resolve(&format!("{path}.deviceClass"), value, mappings, entry);
            let values = match entry.get("values") {
                None | Some(Document::Null) => Some(None),
                Some(values) if values.entries().is_some() => {
                    self.value_choices(&format!("{path}.values"), values, entry)
                        .map(Some)
                }
                other => {
                    self.field_error(&path, "values", "object", other, entry);
                    None
                }
            };
            if let (Some(mapping), Some(values)) = (mapping, values) {
                builder = builder.device_class_with_values(name, mapping, values);
            }
        }
        builder
    }

    fn value_choices(
        &mut self,
        path: &str,
        values: &Document,
        context: &Document,
    ) -> Option<Vec<ValueChoice>> {
        let mut choices: Vec<ValueChoice> = Vec::new();
        let mut valid = true;
        for (name, value) in self.dedupe(values.entries().unwrap_or_default(), path) {
            let remapped = match value {
                Document::Bool(b) => Scalar::Bool(*b),
                Document::Integer(i) => Scalar::Integer(*i),
                Document::Float(x) => Scalar::Float(*x),
                Document::String(s) => Scalar::Text(s.clone()),
                other => {
                    self.schema_error(&format!("{path}.{name}"), "scalar", other, Some(context));
                    valid = false;
                    continue;
                }
            };
            choices.push(ValueChoice {
                name: name.to_string(),
                remapped,
            });
        }
        valid.then_some(choices)
    }

    fn load_devices(
        &mut self,
        document: &Document,
        mut builder: TablesBuilder,
        classes: &[String],
    ) -> TablesBuilder {
        for (key, entry) in self.object_entries(document, Section::Devices) {
            let path = format!("devices.{key}");
            if entry.entries().is_none() {
                self.schema_error(&path, "object", entry, None);
                continue;
            }
            let leading = key.split(' ').next().unwrap_or_default();
            let class = if leading.is_empty() {
                self.invalid_value(&path, "device class should not be empty", entry);
                None
            } else {
                self.resolve(&format!("{path} device class"), leading, classes, entry)
            };

            let index = match entry.get("index") {
                Some(Document::Integer(0)) => {
                    self.invalid_value(&format!("{path}.index"), "should not be 0", entry);
                    None
                }
                Some(Document::Integer(index)) => Some(DeviceIndex::Number(*index)),
                Some(Document::String(index)) if index.is_empty() => {
                    self.invalid_value(&format!("{path}.index"), "should not be empty", entry);
                    None
                }
                Some(Document::String(index)) => Some(DeviceIndex::Text(index.clone())),
                other => {
                    self.field_error(&path, "index", "int or string", other, entry);
                    None
                }
            };

            let name = match entry.get("name") {
                None | Some(Document::Null) => Some(String::new()),
                Some(Document::String(name)) => Some(name.clone()),
                other => {
                    self.field_error(&path, "name", "string", other, entry);
                    None
                }
            };

            if let (Some(class), Some(index), Some(name)) = (class, index, name) {
                builder = builder.device_in_class(key, class, index, name);
            }
        }
        builder
    }

    /// Returns the section if present, recording an error otherwise.
    fn section<'d>(
        &mut self,
        document: &'d Document,
        section: Section,
        expected: &'static str,
    ) -> Option<&'d Document> {
        let found = document.get(section.key());
        if found.is_none() {
            self.record(LoadIssue::SchemaError {
                path: section.key().to_string(),
                expected,
                found: "missing",
            });
        }
        found
    }

    /// Entries of an object section, duplicates collapsed.
    fn object_entries<'d>(
        &mut self,
        document: &'d Document,
        section: Section,
    ) -> Vec<(&'d str, &'d Document)> {
        let Some(node) = self.section(document, section, "object") else {
            return Vec::new();
        };
        match node.entries() {
            Some(entries) => self.dedupe(entries, section.key()),
            None => {
                self.schema_error(section.key(), "object", node, None);
                Vec::new()
            }
        }
    }

    /// Collapses repeated keys: the last value wins, the first position is
    /// kept, and each repeat is reported as a warning.
    fn dedupe<'d>(
        &mut self,
        entries: &'d [(String, Document)],
        path: &str,
    ) -> Vec<(&'d str, &'d Document)> {
        let mut out: Vec<(&'d str, &'d Document)> = Vec::with_capacity(entries.len());
        let mut positions: HashMap<&'d str, usize> = HashMap::new();
        for (key, value) in entries {
            match positions.get(key.as_str()) {
                Some(&position) => {
                    out[position].1 = value;
                    self.duplicate(path, key);
                }
                None => {
                    positions.insert(key.as_str(), out.len());
                    out.push((key.as_str(), value));
                }
            }
        }
        out
    }

    fn duplicate(&mut self, path: &str, key: &str) {
        let issue = LoadIssue::DuplicateKeyWarning {
            path: path.to_string(),
            key: key.to_string(),
        };
        warn!(source = self.source, path, key, "duplicate key in tables");
        self.diagnostics.record_info(format!("Warning: {issue}"));
        self.issues.push(issue);
    }

    /// Finds the declared name a reference points to, recording a
    /// reference error when there is none.
    fn resolve(
        &mut self,
        path: &str,
        name: &str,
        known: &[String],
        context: &Document,
    ) -> Option<String> {
        match Tables::canonical(known.iter().map(String::as_str), name, &self.options) {
            Some(canonical) => Some(canonical.to_string()),
            None => {
                self.record(LoadIssue::ReferenceError {
                    path: path.to_string(),
                    name: name.to_string(),
                    known: known.to_vec(),
                });
                self.context(context);
                None
            }
        }
    }

    fn field_error(
        &mut self,
        path: &str,
        field: &str,
        expected: &'static str,
        found: Option<&Document>,
        context: &Document,
    ) {
        self.record(LoadIssue::SchemaError {
            path: format!("{path}.{field}"),
            expected,
            found: found.map_or("missing", Document::type_name),
        });
        self.context(context);
    }

    fn schema_error(
        &mut self,
        path: &str,
        expected: &'static str,
        found: &Document,
        context: Option<&Document>,
    ) {
        self.record(LoadIssue::SchemaError {
            path: path.to_string(),
            expected,
            found: found.type_name(),
        });
        self.diagnostics.record_info(format!("Content is {found}"));
        if let Some(context) = context {
            self.context(context);
        }
    }

    fn invalid_value(&mut self, path: &str, reason: &'static str, context: &Document) {
        self.record(LoadIssue::InvalidValue {
            path: path.to_string(),
            reason,
        });
        self.context(context);
    }

    fn record(&mut self, issue: LoadIssue) {
        self.diagnostics.record(format!(
            "Error analyzing {}, when {}: {issue}",
            self.source, self.phase
        ));
        self.issues.push(issue);
    }

    fn context(&mut self, context: &Document) {
        self.diagnostics.record_info(format!("Context is {context}"));
    }
}

fn names<'a>(names: impl Iterator<Item = &'a String>) -> Vec<String> {
    names.cloned().collect()
}

#[cfg(test)]
mod tests {
    use sms_command_core::analyze;

    use super::*;

    fn valid_json() -> &'static str {
        r#"{
            "ignores": ["la", "le", "de", "du", "sur"],
            "mappingValues": {
                "on": { "mappingValue": 1 },
                "off": { "mappingValue": 0, "set": false },
                "setTemp": { "mappingValue": 20, "set": true },
                "setMode": { "mappingValue": 21, "set": true }
            },
            "mappings": {
                "switch": { "mapping": ["on", "off"] },
                "climate": { "mapping": ["on", "off", "setTemp", "setMode"] }
            },
            "commands": {
                "allume": { "command": "on" },
                "éteins": { "command": "off" },
                "règle": { "command": "setTemp" },
                "mets mode": { "command": "setMode" }
            },
            "deviceClasses": {
                "lampe": { "deviceClass": "switch" },
                "clim": { "deviceClass": "climate", "values": null },
                "chauffage": { "deviceClass": "climate", "values": { "auto": 0, "hors gel": "frost" } }
            },
            "devices": {
                "lampe cuisine": { "index": 3, "name": "Kitchen" },
                "clim séjour": { "index": "12", "name": "Living AC" },
                "chauffage chambre": { "index": 8, "name": "Bedroom heater" }
            }
        }"#
    }

    fn load_str(json: &str) -> LoadOutcome {
        load(&Document::from_json_str(json).unwrap())
    }

    #[test]
    fn test_valid_document_loads() {
        let outcome = load_str(valid_json());
        assert!(outcome.is_ok(), "{}", outcome.full_log);
        assert_eq!(outcome.full_log, "");
        assert!(outcome.issues.is_empty());

        let tables = &outcome.tables;
        assert_eq!(tables.ignores().len(), 5);
        assert_eq!(tables.mapping_values().len(), 4);
        assert!(tables.mapping_value("setTemp").unwrap().settable);
        assert!(!tables.mapping_value("on").unwrap().settable);
        assert_eq!(tables.command("mets mode").unwrap().mapping_value, "setMode");
        assert_eq!(tables.device_class("clim").unwrap().values, None);
        let chauffage = tables.device_class("chauffage").unwrap();
        assert_eq!(
            chauffage.value("hors gel").map(|c| c.remapped.clone()),
            Some(Scalar::Text("frost".into()))
        );
        assert_eq!(
            tables.device("clim séjour").unwrap().index,
            DeviceIndex::Text("12".into())
        );
    }

    #[test]
    fn test_every_reference_resolves() {
        let outcome = load_str(valid_json());
        let tables = &outcome.tables;
        for command in tables.commands() {
            assert!(tables.mapping_value(&command.mapping_value).is_some());
        }
        for mapping in tables.mappings() {
            for value in &mapping.values {
                assert!(tables.mapping_value(value).is_some());
            }
        }
        for class in tables.device_classes() {
            assert!(tables.mapping(&class.mapping).is_some());
        }
        for device in tables.devices() {
            assert!(tables.device_class(&device.class).is_some());
            assert!(device.key.starts_with(&device.class));
        }
    }

    #[test]
    fn test_command_with_unknown_mapping_value() {
        let json = valid_json().replace(r#""allume": { "command": "on" }"#, r#""allume": { "command": "glow" }"#);
        let outcome = load_str(&json);
        assert!(!outcome.is_ok());
        assert!(outcome.first_error.contains("allume"), "{}", outcome.first_error);
        assert!(outcome.first_error.contains("glow"));
        assert!(outcome.tables.command("allume").is_none());
        assert!(outcome.tables.command("mets mode").is_some());
        assert!(outcome.full_log.ends_with("Error detected, please check tables!"));
    }

    #[test]
    fn test_references_are_folded_to_canonical_names() {
        let json = valid_json().replace(r#""command": "setTemp""#, r#""command": "SETTEMP""#);
        let outcome = load_str(&json);
        assert!(outcome.is_ok(), "{}", outcome.full_log);
        assert_eq!(outcome.tables.command("règle").unwrap().mapping_value, "setTemp");
    }

    #[test]
    fn test_validation_is_exhaustive() {
        let json = r#"{
            "ignores": "la",
            "mappingValues": { "on": { "mappingValue": "one" } },
            "mappings": [],
            "commands": { "allume": { "command": "on" } },
            "deviceClasses": { "lampe": { "deviceClass": "switch" } },
            "devices": { "lampe cuisine": { "index": 0, "name": "Kitchen" } }
        }"#;
        let outcome = load_str(json);
        let paths: Vec<String> = outcome
            .errors()
            .map(|issue| match issue {
                LoadIssue::SchemaError { path, .. }
                | LoadIssue::InvalidValue { path, .. }
                | LoadIssue::ReferenceError { path, .. } => path.clone(),
                LoadIssue::DuplicateKeyWarning { .. } => unreachable!(),
            })
            .collect();
        assert_eq!(
            paths,
            vec![
                "ignores",
                "mappingValues.on.mappingValue",
                "mappings",
                "commands.allume.command",
                "deviceClasses.lampe.deviceClass",
                "devices.lampe cuisine device class",
                "devices.lampe cuisine.index",
            ]
        );
        assert!(outcome.first_error.contains("ignores is string, should be list"));
    }

    #[test]
    fn test_missing_sections_are_reported() {
        let outcome = load_str(r#"{ "ignores": [] }"#);
        let missing = outcome
            .errors()
            .filter(|issue| matches!(issue, LoadIssue::SchemaError { found: "missing", .. }))
            .count();
        assert_eq!(missing, 5);
    }

    #[test]
    fn test_document_must_be_an_object() {
        let outcome = load_str("[1, 2]");
        assert_eq!(
            outcome.issues,
            vec![LoadIssue::SchemaError {
                path: "document".into(),
                expected: "object",
                found: "list",
            }]
        );
    }

    #[test]
    fn test_device_checks() {
        let json = valid_json().replace(
            r#""lampe cuisine": { "index": 3, "name": "Kitchen" }"#,
            r#""lampe cuisine": { "index": "", "name": "Kitchen" },
               "garage porte": { "index": 9 },
               " lampe bureau": { "index": 4 },
               "lampe cave": { "index": 5, "name": 5 },
               "lampe entrée": { "index": [1] }"#,
        );
        let outcome = load_str(&json);
        let errors: Vec<&LoadIssue> = outcome.errors().collect();
        assert_eq!(errors.len(), 5, "{}", outcome.full_log);
        assert!(matches!(
            errors[0],
            LoadIssue::InvalidValue { reason: "should not be empty", .. }
        ));
        assert!(matches!(errors[1], LoadIssue::ReferenceError { name, .. } if name == "garage"));
        assert!(matches!(
            errors[2],
            LoadIssue::InvalidValue { reason: "device class should not be empty", .. }
        ));
        assert!(matches!(errors[3], LoadIssue::SchemaError { found: "int", .. }));
        assert!(matches!(errors[4], LoadIssue::SchemaError { found: "list", .. }));
    }

    #[test]
    fn test_duplicate_keys_warn_and_last_wins() {
        let json = valid_json().replace(
            r#""allume": { "command": "on" },"#,
            r#""allume": { "command": "on" }, "allume": { "command": "off" },"#,
        );
        let outcome = load_str(&json);
        assert!(outcome.is_ok(), "{}", outcome.full_log);
        assert_eq!(
            outcome.warnings().collect::<Vec<_>>(),
            vec![&LoadIssue::DuplicateKeyWarning {
                path: "commands".into(),
                key: "allume".into(),
            }]
        );
        assert!(outcome.full_log.contains("Warning: duplicate definition of \"allume\" in commands"));
        assert_eq!(outcome.tables.command("allume").unwrap().mapping_value, "off");
        assert_eq!(outcome.tables.commands()[0].name, "allume");
    }

    #[test]
    fn test_loaded_tables_decode_commands() {
        let outcome = load_str(valid_json());
        let decoded = analyze(&outcome.tables, "mets mode chauffage chambre hors gel");
        assert!(decoded.is_ok(), "{}", decoded.full_log);
        assert_eq!(
            decoded.result.value_to_set_remapped,
            Some(Scalar::Text("frost".into()))
        );
    }

    #[test]
    fn test_load_path_names_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("smsTables.json");
        std::fs::write(&path, r#"{ "ignores": [] }"#).unwrap();

        let outcome = TableLoader::default().load_path(&path).unwrap();
        assert!(outcome.first_error.starts_with("Error analyzing smsTables.json"));
        assert!(outcome.full_log.ends_with("Error detected, please check smsTables.json!"));
    }

    #[test]
    fn test_load_path_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{").unwrap();
        assert!(matches!(
            TableLoader::default().load_path(&path),
            Err(crate::DatabaseError::JsonError(_))
        ));
    }
}
