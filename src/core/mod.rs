// src/core/mod.rs

/// `toolwire.toml` discovery and parsing.
pub mod config_loader;
/// TOML tool manifests.
pub mod manifest;
/// Mutation verbs for option sets.
pub mod mutate;
/// The option-set trait and typed getters.
pub mod options;
/// Type-keyed command bindings.
pub mod registry;
/// Option rendering into argument tokens.
pub mod render;
/// Option declarations and format templates.
pub mod schema;
/// The immutable option store.
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;
