//! Decoder settings.
//!
//! Defines the YAML-serializable settings of a decoder deployment: where
//! the tables live, how text is folded and which message prefix is expected.
//!
//! # Example YAML
//!
//! ```yaml
//! tables: /etc/sms-command/smsTables.json
//! fold_diacritics: true
//! ascii_output: true
//! prefix: myPrefix
//! prefix_min_length: 4
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sms_command_core::FoldOptions;

use crate::error::{DatabaseError, Result};

/// Settings shared by every component that decodes commands.
///
/// Missing fields take their [`Default`] value.
///
/// # Examples
///
/// ```
/// # use sms_command_db::DecoderSettings;
/// let settings: DecoderSettings = serde_yaml::from_str("tables: smsTables.json").unwrap();
/// assert!(settings.fold_diacritics);
/// assert_eq!(settings.prefix_min_length, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderSettings {
    /// Tables file (JSON, or YAML with a `.yml`/`.yaml` extension).
    pub tables: PathBuf,
    /// Compare input with accents removed.
    pub fold_diacritics: bool,
    /// Render diagnostics as ASCII.
    pub ascii_output: bool,
    /// Prefix every message must start with; empty accepts every message.
    pub prefix: String,
    /// Minimal number of prefix characters that must match.
    pub prefix_min_length: usize,
}

impl Default for DecoderSettings {
    fn default() -> Self {
        Self {
            tables: PathBuf::new(),
            fold_diacritics: true,
            ascii_output: true,
            prefix: String::new(),
            prefix_min_length: 4,
        }
    }
}

impl DecoderSettings {
    /// Loads settings from a YAML file.
    ///
    /// A relative `tables` path is resolved against the settings file's
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](DatabaseError::IoError) if the file cannot be
    /// read, or [`YamlError`](DatabaseError::YamlError) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let mut settings: Self = serde_yaml::from_reader(reader)?;
        if settings.tables.is_relative() && !settings.tables.as_os_str().is_empty() {
            if let Some(dir) = path.parent() {
                settings.tables = dir.join(&settings.tables);
            }
        }
        Ok(settings)
    }

    /// Saves the settings as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](DatabaseError::IoError) if the file cannot be
    /// written, or [`YamlError`](DatabaseError::YamlError) if serialization
    /// fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Tables path, required before loading.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSettings`](DatabaseError::InvalidSettings) when no
    /// tables path is set.
    pub fn tables_path(&self) -> Result<&Path> {
        if self.tables.as_os_str().is_empty() {
            return Err(DatabaseError::InvalidSettings(
                "no tables file configured".to_string(),
            ));
        }
        Ok(&self.tables)
    }

    pub fn fold_options(&self) -> FoldOptions {
        FoldOptions {
            fold_case: true,
            fold_diacritics: self.fold_diacritics,
            ascii_output: self.ascii_output,
        }
    }
}
