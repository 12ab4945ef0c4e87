//! # Option Schemas
//!
//! A schema is the static table attached to an option-set type: for every
//! declared option its name, kind and render rule. Schemas are built once
//! (usually inside `lazy_static!`) and validated when the type is registered
//! with a [`crate::core::registry::CommandRegistry`] or a manifest is loaded.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Static wiring errors. Always fatal and always raised before any process is launched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A required option has no value.
    #[error("Required option '{option}' is not set.")]
    MissingRequired { option: String },
    /// The option-set type has no command binding.
    #[error("No command binding is registered for option set '{type_name}'.")]
    NotRegistered { type_name: String },
    /// The option-set type is already bound.
    #[error("Option set '{type_name}' is already bound to command '{command_id}'.")]
    AlreadyRegistered {
        type_name: String,
        command_id: String,
    },
    /// Another type already uses this command id.
    #[error("Command id '{command_id}' is already registered.")]
    DuplicateCommand { command_id: String },
    /// A format template does not parse.
    #[error("Option '{option}' has an invalid format '{format}': {reason}")]
    InvalidFormat {
        option: String,
        format: String,
        reason: String,
    },
    /// Two options share a name.
    #[error("Option '{name}' is declared more than once.")]
    DuplicateOption { name: String },
    /// A stored value does not match the declared kind.
    #[error("Option '{option}' is declared as {expected} but holds a {found} value.")]
    KindMismatch {
        option: String,
        expected: &'static str,
        found: &'static str,
    },
    /// An assignment names an undeclared option.
    #[error("Unknown option '{name}'.")]
    UnknownOption { name: String },
}

/// The declared kind of an option.
#[derive(Clone, Copy)]
pub enum OptionKind {
    /// A presence flag or a `{value}` boolean.
    Bool,
    /// Any single non-boolean value (text, integer, float, path).
    Scalar,
    /// An ordered list of values.
    List,
    /// Unique keys, one value each.
    Dictionary,
    /// Keys with a sequence of values each.
    Lookup,
    /// A nested option set, rendered in place with its own schema.
    Nested(fn() -> &'static Schema),
    /// A list of nested option sets sharing one schema.
    NestedList(fn() -> &'static Schema),
}

impl OptionKind {
    /// The kind name used in messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Scalar => "scalar",
            Self::List => "list",
            Self::Dictionary => "dictionary",
            Self::Lookup => "lookup",
            Self::Nested(_) => "nested",
            Self::NestedList(_) => "nested list",
        }
    }

    fn is_keyed(&self) -> bool {
        matches!(self, Self::Dictionary | Self::Lookup)
    }
}

impl fmt::Debug for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How an option's value turns into argument tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRule {
    /// Primary format template.
    pub format: String,
    /// Used instead of `format` for the alternative variant.
    pub alt_format: Option<String>,
    /// Joins collection elements into one token.
    pub separator: Option<String>,
}

impl RenderRule {
    /// A rule with only a primary format.
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            alt_format: None,
            separator: None,
        }
    }
}

/// A single declared option.
#[derive(Debug, Clone)]
pub struct OptionDef {
    /// Name used for lookups and messages.
    pub name: String,
    /// Declared kind.
    pub kind: OptionKind,
    /// How to render. Options without a rule are never rendered.
    pub rule: Option<RenderRule>,
    /// Rendering fails while the option is unset.
    pub required: bool,
    /// Secret values are masked when rendering for logs.
    pub secret: bool,
    /// Shown by `describe`.
    pub description: Option<String>,
}

impl OptionDef {
    /// An unformatted, optional option.
    pub fn new(name: impl Into<String>, kind: OptionKind) -> Self {
        Self {
            name: name.into(),
            kind,
            rule: None,
            required: false,
            secret: false,
            description: None,
        }
    }

    /// Declares a boolean option.
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, OptionKind::Bool)
    }

    /// Declares a scalar option.
    pub fn scalar(name: impl Into<String>) -> Self {
        Self::new(name, OptionKind::Scalar)
    }

    /// Declares a list option.
    pub fn list(name: impl Into<String>) -> Self {
        Self::new(name, OptionKind::List)
    }

    /// Declares a dictionary option.
    pub fn dictionary(name: impl Into<String>) -> Self {
        Self::new(name, OptionKind::Dictionary)
    }

    /// Declares a lookup option.
    pub fn lookup(name: impl Into<String>) -> Self {
        Self::new(name, OptionKind::Lookup)
    }

    /// Declares a nested option set.
    pub fn nested(name: impl Into<String>, schema: fn() -> &'static Schema) -> Self {
        Self::new(name, OptionKind::Nested(schema))
    }

    /// Declares a list of nested option sets.
    pub fn nested_list(name: impl Into<String>, schema: fn() -> &'static Schema) -> Self {
        Self::new(name, OptionKind::NestedList(schema))
    }

    /// Sets the primary format.
    pub fn format(mut self, format: impl Into<String>) -> Self {
        match self.rule.as_mut() {
            Some(rule) => rule.format = format.into(),
            None => self.rule = Some(RenderRule::new(format)),
        }
        self
    }

    /// Sets the alternative format. Has no effect before `format`.
    pub fn alt_format(mut self, alt_format: impl Into<String>) -> Self {
        if let Some(rule) = self.rule.as_mut() {
            rule.alt_format = Some(alt_format.into());
        }
        self
    }

    /// Sets the collection separator. Has no effect before `format`.
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        if let Some(rule) = self.rule.as_mut() {
            rule.separator = Some(separator.into());
        }
        self
    }

    /// Marks the option as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Marks the value as secret.
    pub fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// The ordered option table of an option-set type.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    options: Vec<OptionDef>,
}

impl Schema {
    /// A schema with options in declaration order.
    pub fn new(options: Vec<OptionDef>) -> Self {
        Self { options }
    }

    /// Looks up an option by name.
    pub fn get(&self, name: &str) -> Option<&OptionDef> {
        self.options.iter().find(|def| def.name == name)
    }

    /// Options in declaration order, which is also the rendering order.
    pub fn iter(&self) -> impl Iterator<Item = &OptionDef> {
        self.options.iter()
    }

    /// Number of declared options.
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Whether no option is declared.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Checks option names for duplicates and every format template for syntax.
    /// Nested schemas are validated recursively (each schema at most once).
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let mut visited = HashSet::new();
        self.validate_inner(&mut visited)
    }

    fn validate_inner(&self, visited: &mut HashSet<*const Schema>) -> Result<(), ConfigurationError> {
        if !visited.insert(self as *const Schema) {
            return Ok(());
        }

        let mut names = HashSet::new();
        for def in &self.options {
            if !names.insert(def.name.as_str()) {
                return Err(ConfigurationError::DuplicateOption {
                    name: def.name.clone(),
                });
            }
            if let Some(rule) = &def.rule {
                FormatTemplate::validate(&def.name, &rule.format, def.kind)?;
                if let Some(alt) = &rule.alt_format {
                    FormatTemplate::validate(&def.name, alt, def.kind)?;
                }
            }
            match def.kind {
                OptionKind::Nested(schema) | OptionKind::NestedList(schema) => {
                    schema().validate_inner(visited)?;
                }
                _ => {}
            }
        }
        Ok(())
    }
}

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{([A-Za-z]+)\}").expect("placeholder regex is valid");
}

/// A format split into its optional standalone token and its value pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatTemplate<'a> {
    /// Token emitted before the value, if any.
    pub standalone: Option<&'a str>,
    /// The part holding the placeholders.
    pub pattern: &'a str,
}

impl<'a> FormatTemplate<'a> {
    /// Splits `format` at its single space. More than one space is an error.
    pub fn parse(option: &str, format: &'a str) -> Result<Self, ConfigurationError> {
        let invalid = |reason: &str| ConfigurationError::InvalidFormat {
            option: option.to_string(),
            format: format.to_string(),
            reason: reason.to_string(),
        };

        if format.trim().is_empty() {
            return Err(invalid("format is empty"));
        }

        match format.split_once(' ') {
            None => Ok(Self {
                standalone: None,
                pattern: format,
            }),
            Some((standalone, pattern)) => {
                if pattern.contains(' ') {
                    return Err(invalid("a format may contain at most one space"));
                }
                if standalone.is_empty() || pattern.is_empty() {
                    return Err(invalid("the space must separate two non-empty parts"));
                }
                Ok(Self {
                    standalone: Some(standalone),
                    pattern,
                })
            }
        }
    }

    /// Whether the pattern holds `{value}`.
    pub fn has_value(&self) -> bool {
        self.pattern.contains("{value}")
    }

    /// Whether the pattern holds `{key}`.
    pub fn has_key(&self) -> bool {
        self.pattern.contains("{key}")
    }

    fn validate(option: &str, format: &str, kind: OptionKind) -> Result<(), ConfigurationError> {
        let template = FormatTemplate::parse(option, format)?;
        let invalid = |reason: String| ConfigurationError::InvalidFormat {
            option: option.to_string(),
            format: format.to_string(),
            reason,
        };

        for capture in PLACEHOLDER.captures_iter(format) {
            let name = capture.get(1).map_or("", |m| m.as_str());
            match name {
                "value" => {}
                "key" if kind.is_keyed() => {}
                other => {
                    return Err(invalid(format!(
                        "placeholder '{{{}}}' is not valid for a {} option",
                        other,
                        kind.name()
                    )));
                }
            }
        }

        match kind {
            OptionKind::Scalar | OptionKind::List if !template.has_value() => Err(invalid(
                format!("a {} option needs a '{{value}}' placeholder", kind.name()),
            )),
            OptionKind::Dictionary | OptionKind::Lookup
                if !template.has_key() && !template.has_value() =>
            {
                Err(invalid(format!(
                    "a {} option needs a '{{key}}' or '{{value}}' placeholder",
                    kind.name()
                )))
            }
            _ => Ok(()),
        }
    }
}
