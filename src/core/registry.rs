//! # Command Binding Registry
//!
//! Maps an option-set type to the executable it configures and the literal
//! arguments that precede the rendered options (`dotnet restore ...`).
//! Bindings are written once at registration and read many times afterwards.

use crate::core::options::OptionSet;
use crate::core::render::{self, RenderOptions};
use crate::core::schema::ConfigurationError;
use lazy_static::lazy_static;
use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// The immutable association between an option-set type and a tool command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBinding {
    /// Unique id of the command.
    pub command_id: String,
    /// Executable name or path.
    pub executable: String,
    /// Literal prefix arguments, e.g. `["restore"]`.
    pub arguments: Vec<String>,
}

impl CommandBinding {
    /// Creates a binding with a literal argument prefix.
    pub fn new<S: Into<String>>(
        command_id: impl Into<String>,
        executable: impl Into<String>,
        arguments: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            command_id: command_id.into(),
            executable: executable.into(),
            arguments: arguments.into_iter().map(Into::into).collect(),
        }
    }

    /// The literal prefix followed by already rendered tokens.
    pub fn command_line(&self, tokens: &[String]) -> String {
        render::command_line(&self.arguments, tokens)
    }
}

#[derive(Debug)]
struct Registration {
    type_name: &'static str,
    binding: Arc<CommandBinding>,
}

/// Maps option-set types to their command bindings.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    bindings: RwLock<HashMap<TypeId, Registration>>,
}

impl CommandRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `T` to a command. The schema of `T` is validated first, so a bad
    /// format template surfaces here rather than at the first render.
    pub fn register<T: OptionSet>(
        &self,
        binding: CommandBinding,
    ) -> Result<Arc<CommandBinding>, ConfigurationError> {
        T::schema().validate()?;

        // A poisoned lock only means another registration panicked; the map
        // itself is never left half-written.
        let mut bindings = self.bindings.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = bindings.get(&TypeId::of::<T>()) {
            return Err(ConfigurationError::AlreadyRegistered {
                type_name: existing.type_name.to_string(),
                command_id: existing.binding.command_id.clone(),
            });
        }
        if bindings
            .values()
            .any(|r| r.binding.command_id == binding.command_id)
        {
            return Err(ConfigurationError::DuplicateCommand {
                command_id: binding.command_id,
            });
        }

        log::debug!(
            "Registered '{}' -> {} {:?}",
            binding.command_id,
            binding.executable,
            binding.arguments
        );
        let binding = Arc::new(binding);
        bindings.insert(
            TypeId::of::<T>(),
            Registration {
                type_name: type_name::<T>(),
                binding: Arc::clone(&binding),
            },
        );
        Ok(binding)
    }

    /// The binding of `T`, or `NotRegistered`.
    pub fn resolve<T: OptionSet>(&self) -> Result<Arc<CommandBinding>, ConfigurationError> {
        self.bindings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<T>())
            .map(|r| Arc::clone(&r.binding))
            .ok_or_else(|| ConfigurationError::NotRegistered {
                type_name: type_name::<T>().to_string(),
            })
    }

    /// Whether `T` has a binding.
    pub fn is_registered<T: OptionSet>(&self) -> bool {
        self.resolve::<T>().is_ok()
    }

    /// Number of bound types.
    pub fn len(&self) -> usize {
        self.bindings.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing is bound yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The full argument string for `options`: prefix then rendered options.
    pub fn command_line<T: OptionSet>(&self, options: &T) -> Result<String, ConfigurationError> {
        self.command_line_with(options, RenderOptions::default())
    }

    /// Like `command_line`, with explicit render settings.
    pub fn command_line_with<T: OptionSet>(
        &self,
        options: &T,
        settings: RenderOptions,
    ) -> Result<String, ConfigurationError> {
        let binding = self.resolve::<T>()?;
        let tokens = render::render_with(options, settings)?;
        Ok(binding.command_line(&tokens))
    }
}

lazy_static! {
    static ref GLOBAL_REGISTRY: CommandRegistry = CommandRegistry::new();
}

/// The process-wide registry.
pub fn global() -> &'static CommandRegistry {
    &GLOBAL_REGISTRY
}
