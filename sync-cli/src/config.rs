//! Filter configuration for formurl.
//!
//! A filter is described by a TOML file:
//!
//! ```toml
//! debounce_ms = 200
//!
//! [schema]
//! title = "scalar"
//! level = "array"
//! range = "dateRange"
//!
//! [defaults]
//! level = "error,warn"
//!
//! [[exclude]]
//! field = "compareRange"
//! unless = "compare"
//! ```
//!
//! Defaults are written in their URL encoding and decoded per field kind.

use formurl_sync_core::decode;
use formurl_sync_engine::SyncConfig;
use formurl_sync_types::{FieldValue, Schema, Snapshot};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Root configuration for a filter form.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    /// Quiet period before form edits are written (default: 200).
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Field names and kinds.
    pub schema: Schema,
    /// Fallback values, in URL encoding.
    #[serde(default)]
    pub defaults: BTreeMap<String, String>,
    /// Fields kept out of the URL while a toggle is off.
    #[serde(default)]
    pub exclude: Vec<ExcludeRule>,
}

/// Keep `field` out of the URL unless `unless` holds a truthy value.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExcludeRule {
    /// Field to exclude.
    pub field: String,
    /// Toggle field that re-includes it.
    pub unless: String,
}

fn default_debounce_ms() -> u64 {
    200
}

impl FilterConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Decode the wire-encoded defaults.
    pub fn decoded_defaults(&self) -> Result<Snapshot, ConfigError> {
        let mut defaults = Snapshot::new();
        for (field, raw) in &self.defaults {
            let kind = self.schema.kind_of(field).ok_or_else(|| {
                ConfigError::Invalid(format!("default for unknown field '{}'", field))
            })?;
            let value = decode(raw, kind).ok_or_else(|| {
                ConfigError::Invalid(format!("default for '{}' is not a valid {}", field, kind))
            })?;
            defaults.insert(field.clone(), value);
        }
        Ok(defaults)
    }

    /// Build the engine configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an empty schema, a default that
    /// does not decode, or a rule naming a field outside the schema.
    pub fn sync_config(&self) -> Result<SyncConfig, ConfigError> {
        if self.schema.is_empty() {
            return Err(ConfigError::Invalid("schema has no fields".to_string()));
        }
        for rule in &self.exclude {
            for name in [&rule.field, &rule.unless] {
                if !self.schema.contains(name) {
                    return Err(ConfigError::Invalid(format!(
                        "exclude rule names unknown field '{}'",
                        name
                    )));
                }
            }
        }

        let mut config = SyncConfig::new(self.schema.clone())
            .with_defaults(self.decoded_defaults()?)
            .with_debounce(Duration::from_millis(self.debounce_ms));

        if !self.exclude.is_empty() {
            let rules = self.exclude.clone();
            config = config.with_exclude_keys(move |value| excluded_fields(&rules, value));
        }
        Ok(config)
    }
}

impl FromStr for FilterConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s).map_err(|e| ConfigError::ParseError {
            path: PathBuf::from("<inline>"),
            source: e,
        })
    }
}

fn excluded_fields(rules: &[ExcludeRule], value: &Snapshot) -> Vec<String> {
    rules
        .iter()
        .filter(|rule| !value.get(&rule.unless).is_some_and(is_switched_on))
        .map(|rule| rule.field.clone())
        .collect()
}

fn is_switched_on(value: &FieldValue) -> bool {
    match value {
        FieldValue::Scalar(scalar) => scalar.is_truthy(),
        FieldValue::Range(range) => range.is_complete(),
        FieldValue::List(items) => !items.is_empty(),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
    /// Parsed, but unusable.
    #[error("invalid filter config: {0}")]
    Invalid(String),
}
