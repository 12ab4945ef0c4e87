//! # Tool Manifests
//!
//! A manifest describes one tool command in TOML: the command binding plus an
//! ordered list of option descriptors. It is the runtime counterpart of a
//! hand-written option-set type, used by the `toolwire` binary.
//!
//! ```toml
//! [command]
//! id = "restore"
//! executable = "dotnet"
//! arguments = ["restore"]
//!
//! [[options]]
//! name = "Verbosity"
//! kind = "scalar"
//! format = "--verbosity {value}"
//!
//! [[options]]
//! name = "Properties"
//! kind = "dictionary"
//! valueType = "string"
//! format = "/p:{key}={value}"
//! altFormat = "/property:{key}={value}"
//! ```

use crate::core::mutate::{self, CollisionError};
use crate::core::registry::CommandBinding;
use crate::core::schema::{ConfigurationError, OptionDef, OptionKind, Schema};
use crate::core::store::OptionStore;
use crate::models::Value;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading a manifest or applying assignments.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("Could not read manifest '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The manifest is not valid TOML.
    #[error("Manifest '{path}' is not valid TOML")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// The manifest declares an invalid schema.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// An assignment added a dictionary key twice.
    #[error(transparent)]
    Collision(#[from] CollisionError),
    /// An assignment is not of the form `Name=value`.
    #[error("Invalid assignment '{assignment}': {reason}")]
    InvalidAssignment { assignment: String, reason: String },
    /// A value does not parse as the declared value type.
    #[error("Option '{option}' expects a {expected} value, got '{value}'.")]
    InvalidValue {
        option: String,
        value: String,
        expected: &'static str,
    },
}

/// A tool described in TOML: one command and its options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolManifest {
    /// The `[command]` table.
    pub command: CommandSection,
    /// The `[[options]]` tables, in rendering order.
    #[serde(default)]
    pub options: Vec<OptionDescriptor>,
}

/// The command an option set is bound to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandSection {
    /// Unique command id.
    pub id: String,
    /// Executable name or path.
    pub executable: String,
    /// Literal prefix arguments.
    #[serde(default)]
    pub arguments: Vec<String>,
    /// Shown by `describe`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One `[[options]]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionDescriptor {
    /// Option name used in assignments.
    pub name: String,
    /// Declared kind.
    pub kind: DescriptorKind,
    /// Parse type of dictionary and lookup keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_type: Option<ValueType>,
    /// Parse type of values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
    /// Primary format template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Alternative format template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_format: Option<String>,
    /// Joins collection elements into one token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
    /// Redact the value in logs.
    #[serde(default)]
    pub secret: bool,
    /// Rendering fails while the option is unset.
    #[serde(default)]
    pub required: bool,
    /// Shown by `describe`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Option kinds expressible in a manifest. Nested sets need a static schema
/// and are only available to compiled option-set types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptorKind {
    /// A presence flag or a `{value}` boolean.
    Bool,
    /// A single value.
    Scalar,
    /// An ordered list.
    List,
    /// Unique keys, one value each.
    Dictionary,
    /// Keys with a sequence of values each.
    Lookup,
}

impl DescriptorKind {
    fn option_kind(self) -> OptionKind {
        match self {
            Self::Bool => OptionKind::Bool,
            Self::Scalar => OptionKind::Scalar,
            Self::List => OptionKind::List,
            Self::Dictionary => OptionKind::Dictionary,
            Self::Lookup => OptionKind::Lookup,
        }
    }
}

/// The type a textual value is parsed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Kept as text.
    #[default]
    String,
    /// A signed 64-bit integer.
    Integer,
    /// A 64-bit float.
    Float,
    /// `true`/`false`, `yes`/`no`, `on`/`off` or `1`/`0`.
    Bool,
    /// Kept as text, for file system paths.
    Path,
}

impl ValueType {
    /// The lowercase name used in manifests and messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Path => "path",
        }
    }

    /// Parses `text` as a value of this type.
    pub fn parse(self, option: &str, text: &str) -> Result<Value, ManifestError> {
        let invalid = || ManifestError::InvalidValue {
            option: option.to_string(),
            value: text.to_string(),
            expected: self.name(),
        };
        match self {
            Self::String | Self::Path => Ok(Value::Text(text.to_string())),
            Self::Integer => text.trim().parse::<i64>().map(Value::Integer).map_err(|_| invalid()),
            Self::Float => text.trim().parse::<f64>().map(Value::Float).map_err(|_| invalid()),
            Self::Bool => parse_bool(text).map(Value::Bool).ok_or_else(invalid),
        }
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

impl ToolManifest {
    /// Reads, parses and validates a manifest file.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        log::debug!("Loading tool manifest from {}", path.display());
        let text = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest: Self = toml::from_str(&text).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        manifest.schema()?;
        Ok(manifest)
    }

    /// Builds and validates the runtime schema, in descriptor order.
    pub fn schema(&self) -> Result<Schema, ConfigurationError> {
        let defs = self.options.iter().map(OptionDescriptor::to_def).collect();
        let schema = Schema::new(defs);
        schema.validate()?;
        Ok(schema)
    }

    /// The command binding declared by `[command]`.
    pub fn binding(&self) -> CommandBinding {
        CommandBinding::new(
            self.command.id.clone(),
            self.command.executable.clone(),
            self.command.arguments.iter().cloned(),
        )
    }

    /// Looks up an option descriptor by name.
    pub fn descriptor(&self, name: &str) -> Option<&OptionDescriptor> {
        self.options.iter().find(|d| d.name == name)
    }

    /// Applies `Name=value` assignments left to right onto `store`.
    pub fn apply_assignments<'a>(
        &self,
        store: &OptionStore,
        assignments: impl IntoIterator<Item = &'a str>,
    ) -> Result<OptionStore, ManifestError> {
        assignments
            .into_iter()
            .try_fold(store.clone(), |acc, a| self.apply_assignment(&acc, a))
    }

    /// Applies one assignment.
    ///
    /// Booleans accept a bare name (`NoRestore`), scalars are replaced, lists
    /// append one element, dictionaries add `key=value` (colliding keys fail)
    /// and lookups append `key=value`.
    pub fn apply_assignment(
        &self,
        store: &OptionStore,
        assignment: &str,
    ) -> Result<OptionStore, ManifestError> {
        let invalid = |reason: &str| ManifestError::InvalidAssignment {
            assignment: assignment.to_string(),
            reason: reason.to_string(),
        };

        let (name, raw) = match assignment.split_once('=') {
            Some((name, raw)) => (name.trim(), Some(raw)),
            None => (assignment.trim(), None),
        };
        let descriptor = self
            .descriptor(name)
            .ok_or_else(|| ConfigurationError::UnknownOption {
                name: name.to_string(),
            })?;
        let value_type = descriptor.value_type.unwrap_or_default();

        let next = match descriptor.kind {
            DescriptorKind::Bool => {
                let enabled = match raw {
                    None => true,
                    Some(text) => ValueType::Bool.parse(name, text)?.as_bool().unwrap_or(false),
                };
                mutate::set(store, name, enabled)
            }
            DescriptorKind::Scalar => {
                let raw = raw.ok_or_else(|| invalid("a value is required"))?;
                mutate::set(store, name, value_type.parse(name, raw)?)
            }
            DescriptorKind::List => {
                let raw = raw.ok_or_else(|| invalid("a value is required"))?;
                mutate::add_to_list(store, name, [value_type.parse(name, raw)?])
            }
            DescriptorKind::Dictionary | DescriptorKind::Lookup => {
                let (key, raw) = raw
                    .and_then(|r| r.split_once('='))
                    .ok_or_else(|| invalid("expected Name=key=value"))?;
                if let Some(key_type) = descriptor.key_type {
                    key_type.parse(name, key)?;
                }
                let value = value_type.parse(name, raw)?;
                if descriptor.kind == DescriptorKind::Dictionary {
                    mutate::add_dictionary_entry(store, name, key, value)?
                } else {
                    mutate::add_lookup_entry(store, name, key, [value])
                }
            }
        };
        Ok(next)
    }
}

impl OptionDescriptor {
    fn to_def(&self) -> OptionDef {
        let mut def = OptionDef::new(self.name.clone(), self.kind.option_kind());
        if let Some(format) = &self.format {
            def = def.format(format.clone());
            if let Some(alt) = &self.alt_format {
                def = def.alt_format(alt.clone());
            }
            if let Some(separator) = &self.separator {
                def = def.separator(separator.clone());
            }
        }
        if self.required {
            def = def.required();
        }
        if self.secret {
            def = def.secret();
        }
        if let Some(description) = &self.description {
            def = def.description(description.clone());
        }
        def
    }
}
