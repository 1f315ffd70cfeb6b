//! Keyword tables and decode results.
//!
//! [`Tables`] is the immutable set of keyword tables a command is decoded
//! against. It is normally produced by the loader in `sms-command-db`, but
//! [`TablesBuilder`] builds one directly, which is how the unit tests here
//! describe their grammars.
//!
//! Table names are canonical: cross references between tables (command →
//! mapping value, device class → mapping, ...) hold the exact declared name,
//! so lookups by name are exact while matching input against keys is folded.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::normalize::{FoldOptions, fold};

/// An action or value identifier with its numeric code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingValue {
    pub name: String,
    pub code: i64,
    /// Whether commands using this value take a trailing value to set.
    pub settable: bool,
}

/// Named set of mapping values permitted for a family of device classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    pub name: String,
    pub values: Vec<String>,
}

impl Mapping {
    pub fn permits(&self, mapping_value: &str) -> bool {
        self.values.iter().any(|v| v == mapping_value)
    }
}

/// A command keyword (possibly several words) and the mapping value it
/// triggers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub name: String,
    pub mapping_value: String,
}

/// Scalar a value keyword is remapped to before being sent downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// A value keyword accepted by a device class, e.g. `"auto"` → `0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueChoice {
    pub name: String,
    pub remapped: Scalar,
}

/// A category of devices bound to one mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceClass {
    pub name: String,
    pub mapping: String,
    /// Value keywords for settable commands. `None` means any remaining
    /// text is taken literally.
    pub values: Option<Vec<ValueChoice>>,
}

impl DeviceClass {
    pub fn value(&self, name: &str) -> Option<&ValueChoice> {
        self.values.as_ref()?.iter().find(|choice| choice.name == name)
    }
}

/// Device index as declared, either numeric or textual.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeviceIndex {
    Number(i64),
    Text(String),
}

impl fmt::Display for DeviceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for DeviceIndex {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for DeviceIndex {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// A device instance. `key` is `"<class> <instance words...>"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub key: String,
    /// Canonical name of the device class the key starts with.
    pub class: String,
    pub index: DeviceIndex,
    /// Display name sent back with the result.
    pub name: String,
}

/// Immutable keyword tables.
///
/// Entries keep their declaration order, which is also the order keys are
/// listed in diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Tables {
    ignores: Vec<String>,
    mapping_values: Vec<MappingValue>,
    mappings: Vec<Mapping>,
    commands: Vec<Command>,
    device_classes: Vec<DeviceClass>,
    devices: Vec<Device>,
    options: FoldOptions,
}

impl Tables {
    pub fn builder() -> TablesBuilder {
        TablesBuilder::default()
    }

    pub fn options(&self) -> &FoldOptions {
        &self.options
    }

    pub fn ignores(&self) -> &[String] {
        &self.ignores
    }

    pub fn mapping_values(&self) -> &[MappingValue] {
        &self.mapping_values
    }

    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn device_classes(&self) -> &[DeviceClass] {
        &self.device_classes
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn mapping_value(&self, name: &str) -> Option<&MappingValue> {
        self.mapping_values.iter().find(|v| v.name == name)
    }

    pub fn mapping(&self, name: &str) -> Option<&Mapping> {
        self.mappings.iter().find(|m| m.name == name)
    }

    pub fn command(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.name == name)
    }

    pub fn device_class(&self, name: &str) -> Option<&DeviceClass> {
        self.device_classes.iter().find(|c| c.name == name)
    }

    pub fn device(&self, key: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.key == key)
    }

    /// Devices whose key starts with the given class.
    pub fn devices_of_class<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a Device> {
        self.devices.iter().filter(move |d| d.class == class)
    }

    /// Finds the declared name equal to `name` once folded.
    ///
    /// Used to turn references written in any case or accent form into the
    /// canonical name stored in the tables.
    pub fn canonical<'a, I>(names: I, name: &str, options: &FoldOptions) -> Option<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let wanted = fold(name, options);
        names.into_iter().find(|candidate| fold(candidate, options) == wanted)
    }
}

/// Builds [`Tables`] entry by entry.
///
/// Inserting an entry whose name already exists replaces it in place, the
/// same last-wins rule the loader applies to duplicate keys. The builder
/// does not check references; the loader does.
#[derive(Debug, Clone, Default)]
pub struct TablesBuilder {
    tables: Tables,
}

impl TablesBuilder {
    pub fn options(mut self, options: FoldOptions) -> Self {
        self.tables.options = options;
        self
    }

    pub fn ignore(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        if !self.tables.ignores.contains(&token) {
            self.tables.ignores.push(token);
        }
        self
    }

    pub fn mapping_value(mut self, name: impl Into<String>, code: i64, settable: bool) -> Self {
        let value = MappingValue {
            name: name.into(),
            code,
            settable,
        };
        upsert(&mut self.tables.mapping_values, value, |v| &v.name);
        self
    }

    pub fn mapping<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mapping = Mapping {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        };
        upsert(&mut self.tables.mappings, mapping, |m| &m.name);
        self
    }

    pub fn command(mut self, name: impl Into<String>, mapping_value: impl Into<String>) -> Self {
        let command = Command {
            name: name.into(),
            mapping_value: mapping_value.into(),
        };
        upsert(&mut self.tables.commands, command, |c| &c.name);
        self
    }

    pub fn device_class(self, name: impl Into<String>, mapping: impl Into<String>) -> Self {
        self.device_class_with_values(name, mapping, None)
    }

    pub fn device_class_with_values(
        mut self,
        name: impl Into<String>,
        mapping: impl Into<String>,
        values: Option<Vec<ValueChoice>>,
    ) -> Self {
        let class = DeviceClass {
            name: name.into(),
            mapping: mapping.into(),
            values: values.filter(|values| !values.is_empty()),
        };
        upsert(&mut self.tables.device_classes, class, |c| &c.name);
        self
    }

    /// Adds a device. Its class is the key's first word.
    pub fn device(
        self,
        key: impl Into<String>,
        index: impl Into<DeviceIndex>,
        name: impl Into<String>,
    ) -> Self {
        let key = key.into();
        let class = key.split(' ').next().unwrap_or_default().to_string();
        self.device_in_class(key, class, index, name)
    }

    /// Adds a device attached to an explicit canonical class name.
    pub fn device_in_class(
        mut self,
        key: impl Into<String>,
        class: impl Into<String>,
        index: impl Into<DeviceIndex>,
        name: impl Into<String>,
    ) -> Self {
        let device = Device {
            key: key.into(),
            class: class.into(),
            index: index.into(),
            name: name.into(),
        };
        upsert(&mut self.tables.devices, device, |d| &d.key);
        self
    }

    /// Tables as built so far.
    pub fn current(&self) -> &Tables {
        &self.tables
    }

    pub fn build(self) -> Tables {
        self.tables
    }
}

fn upsert<T>(entries: &mut Vec<T>, entry: T, name: impl Fn(&T) -> &String) {
    match entries.iter().position(|e| name(e) == name(&entry)) {
        Some(index) => entries[index] = entry,
        None => entries.push(entry),
    }
}

/// Outcome of decoding one command.
///
/// Fields resolved before a failure are kept; the numeric device and command
/// fields are only filled in once every slot resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub command: String,
    pub device_class: String,
    pub device_name: String,
    pub device_id: Option<DeviceIndex>,
    pub device_id_name: String,
    pub command_value: i64,
    pub command_value_text: String,
    pub value_to_set: Option<String>,
    pub value_to_set_remapped: Option<Scalar>,
}

impl ParseResult {
    /// Rebuilds the command in full words, e.g. `"allume lampe cuisine"`.
    pub fn understood(&self) -> String {
        let mut words = vec![self.command.as_str(), self.device_name.as_str()];
        if let Some(value) = &self.value_to_set {
            words.push(value);
        }
        words.join(" ")
    }
}
