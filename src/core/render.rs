//! # Argument Renderer
//!
//! Flattens an option set into argument tokens, walking the options in schema
//! declaration order and applying each option's format template.
//!
//! Format recap: a format holds at most one space. The part before it is a
//! standalone token, the part after it is the value pattern carrying `{value}`
//! (and `{key}` for dictionaries and lookups). A boolean whose pattern has no
//! `{value}` is a presence flag.

use crate::constants::REDACTED;
use crate::core::options::OptionSet;
use crate::core::schema::{ConfigurationError, FormatTemplate, OptionDef, OptionKind, Schema};
use crate::core::store::OptionStore;
use crate::models::Value;

/// Which of an option's formats to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatVariant {
    /// Use `format`.
    #[default]
    Primary,
    /// Use `alt_format` wherever one is declared. Deciding when a tool needs
    /// this is up to the caller.
    Alternative,
}

/// Settings for one render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
    /// Which format to use.
    pub variant: FormatVariant,
    /// Replace the values of secret options with a placeholder.
    pub redact_secrets: bool,
}

impl RenderOptions {
    /// Settings for a string that is going to be logged.
    pub fn redacted() -> Self {
        Self {
            redact_secrets: true,
            ..Self::default()
        }
    }
}

/// Renders `options` into argument tokens with the primary formats.
pub fn render<T: OptionSet>(options: &T) -> Result<Vec<String>, ConfigurationError> {
    render_store(T::schema(), options.store(), RenderOptions::default())
}

/// Renders `options` with explicit settings.
pub fn render_with<T: OptionSet>(
    options: &T,
    settings: RenderOptions,
) -> Result<Vec<String>, ConfigurationError> {
    render_store(T::schema(), options.store(), settings)
}

/// Renders a raw store against a schema. Used for nested sets and for
/// schemas loaded at runtime.
pub fn render_store(
    schema: &Schema,
    store: &OptionStore,
    settings: RenderOptions,
) -> Result<Vec<String>, ConfigurationError> {
    let mut tokens = Vec::with_capacity(store.len() * 2);
    render_into(schema, store, settings, &mut tokens)?;
    Ok(tokens)
}

/// Joins the literal prefix and the rendered tokens with single spaces.
pub fn command_line(prefix: &[String], tokens: &[String]) -> String {
    prefix
        .iter()
        .chain(tokens)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_into(
    schema: &Schema,
    store: &OptionStore,
    settings: RenderOptions,
    tokens: &mut Vec<String>,
) -> Result<(), ConfigurationError> {
    for def in schema.iter() {
        let Some(value) = store.get(&def.name) else {
            if def.required {
                return Err(ConfigurationError::MissingRequired {
                    option: def.name.clone(),
                });
            }
            continue;
        };

        let start = tokens.len();
        render_option(def, value, settings, tokens)?;
        log::trace!(
            "Rendered option '{}' -> {:?}",
            def.name,
            tokens.get(start..).unwrap_or_default()
        );
    }
    Ok(())
}

fn render_option(
    def: &OptionDef,
    value: &Value,
    settings: RenderOptions,
    tokens: &mut Vec<String>,
) -> Result<(), ConfigurationError> {
    let mismatch = |expected: &'static str| ConfigurationError::KindMismatch {
        option: def.name.clone(),
        expected,
        found: value.shape(),
    };

    // Nested sets splice their own tokens in place, with no wrapper tokens.
    match def.kind {
        OptionKind::Nested(schema) => {
            let inner = value.as_nested().ok_or_else(|| mismatch("nested"))?;
            return render_into(schema(), inner, settings, tokens);
        }
        OptionKind::NestedList(schema) => {
            let items = value.as_list().ok_or_else(|| mismatch("nested list"))?;
            for item in items {
                let inner = item.as_nested().ok_or_else(|| mismatch("nested list"))?;
                render_into(schema(), inner, settings, tokens)?;
            }
            return Ok(());
        }
        _ => {}
    }

    let Some(rule) = &def.rule else {
        return Ok(());
    };
    let format = match settings.variant {
        FormatVariant::Alternative => rule.alt_format.as_deref().unwrap_or(&rule.format),
        FormatVariant::Primary => &rule.format,
    };
    let template = FormatTemplate::parse(&def.name, format)?;
    let text = |v: &Value| -> String {
        if def.secret && settings.redact_secrets {
            REDACTED.to_string()
        } else {
            v.to_string()
        }
    };

    match def.kind {
        OptionKind::Bool => {
            let enabled = value.as_bool().ok_or_else(|| mismatch("bool"))?;
            if template.has_value() {
                emit(tokens, &template, substitute(template.pattern, None, &text(value)));
            } else if enabled {
                emit(tokens, &template, template.pattern.to_string());
            }
        }
        OptionKind::Scalar => {
            if matches!(
                value,
                Value::List(_) | Value::Dictionary(_) | Value::Lookup(_) | Value::Nested(_)
            ) {
                return Err(mismatch("scalar"));
            }
            emit(tokens, &template, substitute(template.pattern, None, &text(value)));
        }
        OptionKind::List => {
            let items = value.as_list().ok_or_else(|| mismatch("list"))?;
            if items.is_empty() {
                return Ok(());
            }
            match &rule.separator {
                Some(separator) => {
                    let joined = items.iter().map(text).collect::<Vec<_>>().join(separator);
                    emit(tokens, &template, substitute(template.pattern, None, &joined));
                }
                None => {
                    for item in items {
                        emit(tokens, &template, substitute(template.pattern, None, &text(item)));
                    }
                }
            }
        }
        OptionKind::Dictionary => {
            let map = value.as_dictionary().ok_or_else(|| mismatch("dictionary"))?;
            let rendered: Vec<String> = map
                .iter()
                .map(|(k, v)| substitute(template.pattern, Some(k), &text(v)))
                .collect();
            emit_all(tokens, &template, rendered, rule.separator.as_deref());
        }
        OptionKind::Lookup => {
            let lookup = value.as_lookup().ok_or_else(|| mismatch("lookup"))?;
            for (key, values) in lookup.iter() {
                if values.is_empty() {
                    continue;
                }
                match &rule.separator {
                    Some(separator) => {
                        let joined = values.iter().map(text).collect::<Vec<_>>().join(separator);
                        emit(tokens, &template, substitute(template.pattern, Some(key), &joined));
                    }
                    None => {
                        for v in values {
                            emit(tokens, &template, substitute(template.pattern, Some(key), &text(v)));
                        }
                    }
                }
            }
        }
        OptionKind::Nested(_) | OptionKind::NestedList(_) => {}
    }
    Ok(())
}

fn substitute(pattern: &str, key: Option<&str>, value: &str) -> String {
    let with_key = match key {
        Some(key) => pattern.replace("{key}", key),
        None => pattern.to_string(),
    };
    with_key.replace("{value}", value)
}

/// Pushes the standalone token (if any) followed by one rendered pattern.
fn emit(tokens: &mut Vec<String>, template: &FormatTemplate<'_>, rendered: String) {
    if let Some(standalone) = template.standalone {
        tokens.push(standalone.to_string());
    }
    tokens.push(rendered);
}

fn emit_all(
    tokens: &mut Vec<String>,
    template: &FormatTemplate<'_>,
    rendered: Vec<String>,
    separator: Option<&str>,
) {
    if rendered.is_empty() {
        return;
    }
    match separator {
        Some(separator) => emit(tokens, template, rendered.join(separator)),
        None => {
            for r in rendered {
                emit(tokens, template, r);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mutate::OptionSetExt;
    use crate::core::schema::OptionDef;
    use crate::core::test_support::FakeOptions;
    use lazy_static::lazy_static;

    fn tokens(options: &FakeOptions) -> Vec<String> {
        render(options).unwrap()
    }

    #[test]
    fn test_flag_emitted_only_when_true() {
        assert_eq!(tokens(&FakeOptions::default().enable_flag()), vec!["--flag"]);
        assert!(tokens(&FakeOptions::default().disable_flag()).is_empty());
        assert!(tokens(&FakeOptions::default()).is_empty());
    }

    #[test]
    fn test_boolean_with_value_placeholder_renders_its_value() {
        assert_eq!(
            tokens(&FakeOptions::default().set_boolean(false)),
            vec!["--boolean", "false"]
        );
        assert_eq!(
            tokens(&FakeOptions::default().set_boolean(true)),
            vec!["--boolean", "true"]
        );
    }

    #[test]
    fn test_scalar_splits_into_standalone_and_value() {
        let rendered = tokens(&FakeOptions::default().set_integer(5));
        assert_eq!(rendered, vec!["--integer", "5"]);
        // Two tokens or one, the joined argument string is the same.
        assert_eq!(command_line(&[], &rendered), "--integer 5");
        assert_eq!(command_line(&[], &["--integer 5".to_string()]), "--integer 5");
    }

    #[test]
    fn test_rendering_follows_declaration_order() {
        let options = FakeOptions::default()
            .set_integer(5)
            .set_string("spacy value")
            .enable_flag();
        assert_eq!(
            tokens(&options),
            vec!["--flag", "--string", "spacy value", "--integer", "5"]
        );
    }

    #[test]
    fn test_list_renders_one_pair_per_element() {
        let options = FakeOptions::default().set_lists(["console", "trx"]);
        assert_eq!(
            tokens(&options),
            vec!["--logger", "console", "--logger", "trx"]
        );
    }

    #[test]
    fn test_list_with_separator_renders_one_token() {
        let options = FakeOptions::default().add_flags(["Static", "DeclaredOnly"]);
        assert_eq!(tokens(&options), vec!["--flags", "Static,DeclaredOnly"]);
    }

    #[test]
    fn test_empty_list_renders_nothing() {
        assert!(tokens(&FakeOptions::default().clear_lists()).is_empty());
    }

    #[test]
    fn test_dictionary_renders_entries_in_insertion_order() {
        let options = FakeOptions::default().set_dictionaries([("foo", 1), ("baz", 2)]);
        assert_eq!(tokens(&options), vec!["/p:foo=1", "/p:baz=2"]);

        let alternative = render_with(
            &options,
            RenderOptions {
                variant: FormatVariant::Alternative,
                ..RenderOptions::default()
            },
        )
        .unwrap();
        assert_eq!(alternative, vec!["/property:foo=1", "/property:baz=2"]);
    }

    #[test]
    fn test_lookup_renders_each_key_value_pair() {
        let options = FakeOptions::default()
            .add_lookup("a", &["1", "2"])
            .add_lookup("b", &["3"]);
        assert_eq!(
            tokens(&options),
            vec!["--lookup", "a=1", "--lookup", "a=2", "--lookup", "b=3"]
        );
    }

    #[test]
    fn test_options_without_format_are_not_rendered() {
        let options = FakeOptions::default().add_trait("foo", [1, 2]);
        assert!(tokens(&options).is_empty());
    }

    #[test]
    fn test_nested_set_is_spliced_in_place() {
        let inner = FakeOptions::default().set_integer(1);
        let options = FakeOptions::default()
            .enable_flag()
            .set_nested(&inner)
            .add_nested_list(&FakeOptions::default().set_string("a"))
            .add_nested_list(&FakeOptions::default().set_string("b"));
        assert_eq!(
            tokens(&options),
            vec!["--flag", "--integer", "1", "--string", "a", "--string", "b"]
        );
    }

    #[test]
    fn test_secret_values_are_redacted_on_request() {
        let options = FakeOptions::default().set_secret("hunter2");
        assert_eq!(tokens(&options), vec!["--secret", "hunter2"]);
        assert_eq!(
            render_with(&options, RenderOptions::redacted()).unwrap(),
            vec!["--secret", REDACTED]
        );
    }

    #[test]
    fn test_kind_mismatch_is_a_configuration_error() {
        let options = FakeOptions::default().set("Lists", "not a list");
        assert_eq!(
            render(&options),
            Err(ConfigurationError::KindMismatch {
                option: "Lists".to_string(),
                expected: "list",
                found: "text",
            })
        );
    }

    lazy_static! {
        static ref REQUIRED_SCHEMA: Schema = Schema::new(vec![
            OptionDef::scalar("Project").format("{value}").required(),
            OptionDef::boolean("NoRestore").format("--no-restore"),
        ]);
    }

    #[test]
    fn test_missing_required_option_fails() {
        let result = render_store(&REQUIRED_SCHEMA, &OptionStore::new(), RenderOptions::default());
        assert_eq!(
            result,
            Err(ConfigurationError::MissingRequired {
                option: "Project".to_string()
            })
        );

        let store = OptionStore::new()
            .with_set("NoRestore", true)
            .with_set("Project", "app.csproj");
        let rendered = render_store(&REQUIRED_SCHEMA, &store, RenderOptions::default()).unwrap();
        assert_eq!(rendered, vec!["app.csproj", "--no-restore"]);
    }

    #[test]
    fn test_command_line_joins_prefix_and_tokens() {
        let prefix = vec!["restore".to_string()];
        let tokens = vec!["--flag".to_string()];
        assert_eq!(command_line(&prefix, &tokens), "restore --flag");
        assert_eq!(command_line(&[], &[]), "");
    }

    #[test]
    fn test_empty_string_value_is_kept_in_command_line() {
        let rendered = tokens(&FakeOptions::default().set_string(""));
        assert_eq!(rendered, vec!["--string", ""]);
        assert_eq!(command_line(&[], &rendered), rendered.join(" "));
        assert_eq!(command_line(&[], &rendered), "--string ");
    }
}
