// Shared fixtures for unit tests.

use crate::core::mutate::{CollisionError, OptionSetExt};
use crate::core::options::OptionSet;
use crate::core::schema::{OptionDef, Schema};
use crate::core::store::OptionStore;
use crate::models::Lookup;
use lazy_static::lazy_static;

lazy_static! {
    static ref FAKE_SCHEMA: Schema = Schema::new(vec![
        OptionDef::boolean("Boolean").format("--boolean {value}"),
        OptionDef::boolean("Flag").format("--flag"),
        OptionDef::scalar("String").format("--string {value}"),
        OptionDef::scalar("Integer").format("--integer {value}"),
        OptionDef::scalar("Secret").format("--secret {value}").secret(),
        OptionDef::list("Lists").format("--logger {value}"),
        OptionDef::list("Flags").format("--flags {value}").separator(","),
        OptionDef::dictionary("Dictionaries")
            .format("/p:{key}={value}")
            .alt_format("/property:{key}={value}"),
        OptionDef::lookup("Lookups").format("--lookup {key}={value}"),
        OptionDef::lookup("Traits"),
        OptionDef::nested("Nested", fake_schema),
        OptionDef::nested_list("NestedList", fake_schema),
    ]);
}

fn fake_schema() -> &'static Schema {
    &FAKE_SCHEMA
}

/// An option set exercising every option kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct FakeOptions(OptionStore);

impl OptionSet for FakeOptions {
    fn schema() -> &'static Schema {
        fake_schema()
    }

    fn store(&self) -> &OptionStore {
        &self.0
    }

    fn from_store(store: OptionStore) -> Self {
        Self(store)
    }
}

#[allow(dead_code)]
impl FakeOptions {
    pub(crate) fn boolean(&self) -> Option<bool> {
        self.get_scalar("Boolean")
    }
    pub(crate) fn set_boolean(&self, value: bool) -> Self {
        self.set("Boolean", value)
    }

    pub(crate) fn flag(&self) -> Option<bool> {
        self.get_scalar("Flag")
    }
    pub(crate) fn set_flag(&self, value: bool) -> Self {
        self.set("Flag", value)
    }
    pub(crate) fn enable_flag(&self) -> Self {
        self.enable("Flag")
    }
    pub(crate) fn disable_flag(&self) -> Self {
        self.disable("Flag")
    }
    pub(crate) fn toggle_flag(&self) -> Self {
        self.toggle("Flag")
    }

    pub(crate) fn string(&self) -> Option<String> {
        self.get_scalar("String")
    }
    pub(crate) fn set_string(&self, value: &str) -> Self {
        self.set("String", value)
    }
    pub(crate) fn reset_string(&self) -> Self {
        self.reset("String")
    }

    pub(crate) fn integer(&self) -> Option<i64> {
        self.get_scalar("Integer")
    }
    pub(crate) fn set_integer(&self, value: i64) -> Self {
        self.set("Integer", value)
    }
    pub(crate) fn reset_integer(&self) -> Self {
        self.reset("Integer")
    }

    pub(crate) fn set_secret(&self, value: &str) -> Self {
        self.set("Secret", value)
    }

    pub(crate) fn lists(&self) -> Vec<String> {
        self.get_list("Lists")
    }
    pub(crate) fn set_lists<'a>(&self, values: impl IntoIterator<Item = &'a str>) -> Self {
        self.set_list("Lists", values)
    }
    pub(crate) fn add_lists<'a>(&self, values: impl IntoIterator<Item = &'a str>) -> Self {
        self.add_to_list("Lists", values)
    }
    pub(crate) fn remove_lists<'a>(&self, values: impl IntoIterator<Item = &'a str>) -> Self {
        self.remove_from_list("Lists", values)
    }
    pub(crate) fn clear_lists(&self) -> Self {
        self.clear_list("Lists")
    }
    pub(crate) fn reset_lists(&self) -> Self {
        self.reset("Lists")
    }

    pub(crate) fn add_flags<'a>(&self, values: impl IntoIterator<Item = &'a str>) -> Self {
        self.add_to_list("Flags", values)
    }

    pub(crate) fn dictionaries(&self) -> Vec<(String, i64)> {
        self.get_dictionary("Dictionaries")
    }
    pub(crate) fn set_dictionaries<'a>(
        &self,
        entries: impl IntoIterator<Item = (&'a str, i64)>,
    ) -> Self {
        OptionSetExt::set_dictionary(self, "Dictionaries", entries)
    }
    pub(crate) fn add_dictionary(&self, key: &str, value: i64) -> Result<Self, CollisionError> {
        self.add_dictionary_entry("Dictionaries", key, value)
    }
    pub(crate) fn set_dictionary(&self, key: &str, value: i64) -> Self {
        self.set_dictionary_entry("Dictionaries", key, value)
    }
    pub(crate) fn remove_dictionary(&self, key: &str) -> Self {
        self.remove_dictionary_entry("Dictionaries", key)
    }
    pub(crate) fn clear_dictionaries(&self) -> Self {
        self.clear_dictionary("Dictionaries")
    }
    pub(crate) fn reset_dictionaries(&self) -> Self {
        self.reset("Dictionaries")
    }

    pub(crate) fn add_lookup(&self, key: &str, values: &[&str]) -> Self {
        self.add_lookup_entry("Lookups", key, values.iter().copied())
    }

    pub(crate) fn set_traits(&self, traits: Lookup) -> Self {
        self.set_lookup("Traits", traits)
    }
    pub(crate) fn trait_values(&self, key: &str) -> Vec<i64> {
        self.get_lookup_entry("Traits", key)
    }
    pub(crate) fn set_trait(&self, key: &str, values: impl IntoIterator<Item = i64>) -> Self {
        self.set_lookup_entry("Traits", key, values)
    }
    pub(crate) fn add_trait(&self, key: &str, values: impl IntoIterator<Item = i64>) -> Self {
        self.add_lookup_entry("Traits", key, values)
    }
    pub(crate) fn remove_trait_value(&self, key: &str, value: i64) -> Self {
        self.remove_lookup_value("Traits", key, value)
    }
    pub(crate) fn remove_trait(&self, key: &str) -> Self {
        self.remove_lookup_key("Traits", key)
    }
    pub(crate) fn clear_traits(&self) -> Self {
        self.clear_lookup("Traits")
    }
    pub(crate) fn reset_traits(&self) -> Self {
        self.reset("Traits")
    }

    pub(crate) fn nested(&self) -> Option<Self> {
        self.get_nested("Nested")
    }
    pub(crate) fn set_nested(&self, nested: &Self) -> Self {
        OptionSetExt::set_nested(self, "Nested", nested)
    }

    pub(crate) fn nested_list(&self) -> Vec<Self> {
        self.get_nested_list("NestedList")
    }
    pub(crate) fn add_nested_list(&self, nested: &Self) -> Self {
        self.add_nested("NestedList", nested)
    }
    pub(crate) fn remove_nested_list(&self, nested: &Self) -> Self {
        self.remove_nested("NestedList", nested)
    }
    pub(crate) fn clear_nested_list(&self) -> Self {
        self.clear_list("NestedList")
    }
}
