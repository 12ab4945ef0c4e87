//! # Mutation Operators
//!
//! The generic verbs applied per option kind. Each function takes a store and
//! returns a new one built from the two store primitives (`get` + `with_set` /
//! `with_removed`); [`OptionSetExt`] exposes the same verbs on any
//! [`OptionSet`] through its copy-on-write entry point.
//!
//! Operating on an absent collection starts from an empty one; removing from
//! an absent collection leaves it absent. Only a duplicate-key dictionary add
//! can fail.

use crate::core::options::OptionSet;
use crate::core::store::OptionStore;
use crate::models::{Dictionary, Lookup, Value};
use thiserror::Error;

/// Raised when `add` meets a dictionary key that already exists.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Key '{key}' already exists in dictionary option '{option}'.")]
pub struct CollisionError {
    /// The dictionary option.
    pub option: String,
    /// The duplicate key.
    pub key: String,
}

// --- Scalars ---

/// Sets a scalar or boolean option.
pub fn set(store: &OptionStore, name: &str, value: impl Into<Value>) -> OptionStore {
    store.with_set(name, value)
}

/// Resets any option back to absent.
pub fn reset(store: &OptionStore, name: &str) -> OptionStore {
    store.with_removed(name)
}

/// Flips a boolean option. An absent boolean toggles to `true`.
pub fn toggle(store: &OptionStore, name: &str) -> OptionStore {
    let current = store.get(name).and_then(Value::as_bool).unwrap_or(false);
    store.with_set(name, !current)
}

// --- Lists ---

fn current_list(store: &OptionStore, name: &str) -> Option<Vec<Value>> {
    store.get(name).and_then(Value::as_list).map(<[Value]>::to_vec)
}

/// Replaces the whole list.
pub fn set_list<V: Into<Value>>(
    store: &OptionStore,
    name: &str,
    values: impl IntoIterator<Item = V>,
) -> OptionStore {
    let items = values.into_iter().map(Into::into).collect();
    store.with_set(name, Value::List(items))
}

/// Appends in order. Duplicates are allowed.
pub fn add_to_list<V: Into<Value>>(
    store: &OptionStore,
    name: &str,
    values: impl IntoIterator<Item = V>,
) -> OptionStore {
    let mut items = current_list(store, name).unwrap_or_default();
    items.extend(values.into_iter().map(Into::into));
    store.with_set(name, Value::List(items))
}

/// Removes the first matching occurrence of each given value.
pub fn remove_from_list<V: Into<Value>>(
    store: &OptionStore,
    name: &str,
    values: impl IntoIterator<Item = V>,
) -> OptionStore {
    let Some(mut items) = current_list(store, name) else {
        return store.clone();
    };
    for value in values {
        let value = value.into();
        if let Some(position) = items.iter().position(|item| *item == value) {
            items.remove(position);
        }
    }
    store.with_set(name, Value::List(items))
}

/// Leaves an empty but present list.
pub fn clear_list(store: &OptionStore, name: &str) -> OptionStore {
    store.with_set(name, Value::List(Vec::new()))
}

// --- Dictionaries ---

fn current_dictionary(store: &OptionStore, name: &str) -> Option<Dictionary> {
    store.get(name).and_then(Value::as_dictionary).cloned()
}

/// Replaces the whole dictionary.
pub fn set_dictionary<K: Into<String>, V: Into<Value>>(
    store: &OptionStore,
    name: &str,
    entries: impl IntoIterator<Item = (K, V)>,
) -> OptionStore {
    let map: Dictionary = entries.into_iter().collect();
    store.with_set(name, map)
}

/// Adds a new key. Fails without producing a store if the key already exists.
pub fn add_dictionary_entry(
    store: &OptionStore,
    name: &str,
    key: impl Into<String>,
    value: impl Into<Value>,
) -> Result<OptionStore, CollisionError> {
    add_dictionary_entries(store, name, [(key.into(), value.into())])
}

/// Bulk add with the same collision rule per key. All or nothing.
pub fn add_dictionary_entries<K: Into<String>, V: Into<Value>>(
    store: &OptionStore,
    name: &str,
    entries: impl IntoIterator<Item = (K, V)>,
) -> Result<OptionStore, CollisionError> {
    let mut map = current_dictionary(store, name).unwrap_or_default();
    for (key, value) in entries {
        let key = key.into();
        if map.contains_key(&key) {
            return Err(CollisionError {
                option: name.to_string(),
                key,
            });
        }
        map.insert(key, value);
    }
    Ok(store.with_set(name, map))
}

/// Upsert: overwrites an existing key in place.
pub fn set_dictionary_entry(
    store: &OptionStore,
    name: &str,
    key: impl Into<String>,
    value: impl Into<Value>,
) -> OptionStore {
    let mut map = current_dictionary(store, name).unwrap_or_default();
    map.insert(key, value);
    store.with_set(name, map)
}

/// Removes `key`. A missing key leaves the store unchanged.
pub fn remove_dictionary_entry(store: &OptionStore, name: &str, key: &str) -> OptionStore {
    let Some(mut map) = current_dictionary(store, name) else {
        return store.clone();
    };
    map.remove(key);
    store.with_set(name, map)
}

/// Sets an empty dictionary.
pub fn clear_dictionary(store: &OptionStore, name: &str) -> OptionStore {
    store.with_set(name, Dictionary::new())
}

// --- Lookups ---

fn current_lookup(store: &OptionStore, name: &str) -> Option<Lookup> {
    store.get(name).and_then(Value::as_lookup).cloned()
}

/// Replaces the whole lookup.
pub fn set_lookup(store: &OptionStore, name: &str, lookup: Lookup) -> OptionStore {
    store.with_set(name, lookup)
}

/// Replaces the value sequence of `key`.
pub fn set_lookup_entry<V: Into<Value>>(
    store: &OptionStore,
    name: &str,
    key: &str,
    values: impl IntoIterator<Item = V>,
) -> OptionStore {
    let mut lookup = current_lookup(store, name).unwrap_or_default();
    lookup.set(key, values.into_iter().map(Into::into).collect());
    store.with_set(name, lookup)
}

/// Appends to the value sequence of `key`, creating the key if absent.
pub fn add_lookup_entry<V: Into<Value>>(
    store: &OptionStore,
    name: &str,
    key: &str,
    values: impl IntoIterator<Item = V>,
) -> OptionStore {
    let mut lookup = current_lookup(store, name).unwrap_or_default();
    lookup.extend(key, values.into_iter().map(Into::into));
    store.with_set(name, lookup)
}

/// Removes one occurrence of `value` from the sequence of `key`.
pub fn remove_lookup_value(
    store: &OptionStore,
    name: &str,
    key: &str,
    value: impl Into<Value>,
) -> OptionStore {
    let Some(mut lookup) = current_lookup(store, name) else {
        return store.clone();
    };
    lookup.remove_value(key, &value.into());
    store.with_set(name, lookup)
}

/// Clears the values of `key`; the key itself is retained.
pub fn remove_lookup_key(store: &OptionStore, name: &str, key: &str) -> OptionStore {
    let Some(mut lookup) = current_lookup(store, name) else {
        return store.clone();
    };
    lookup.clear_key(key);
    store.with_set(name, lookup)
}

/// Sets an empty lookup.
pub fn clear_lookup(store: &OptionStore, name: &str) -> OptionStore {
    store.with_set(name, Lookup::new())
}

// --- Nested option sets ---

/// Sets a nested option set.
pub fn set_nested<N: OptionSet>(store: &OptionStore, name: &str, nested: &N) -> OptionStore {
    store.with_set(name, Value::Nested(nested.store().clone()))
}

/// Replaces a nested-set list.
pub fn set_nested_list<'a, N: OptionSet>(
    store: &OptionStore,
    name: &str,
    items: impl IntoIterator<Item = &'a N>,
) -> OptionStore {
    set_list(
        store,
        name,
        items.into_iter().map(|n| Value::Nested(n.store().clone())),
    )
}

/// Appends a nested set to a nested-set list.
pub fn add_nested<N: OptionSet>(store: &OptionStore, name: &str, nested: &N) -> OptionStore {
    add_to_list(store, name, [Value::Nested(nested.store().clone())])
}

/// Removes the first element equal to `nested`.
pub fn remove_nested<N: OptionSet>(store: &OptionStore, name: &str, nested: &N) -> OptionStore {
    remove_from_list(store, name, [Value::Nested(nested.store().clone())])
}

/// The mutation verbs as copy-on-write methods on every [`OptionSet`].
///
/// Generated tool wrappers are one-liners over these, e.g.
/// `fn set_configuration(&self, v: &str) -> Self { self.set("Configuration", v) }`.
pub trait OptionSetExt: OptionSet {
    /// Copy with the free function `set` applied.
    fn set(&self, name: &str, value: impl Into<Value>) -> Self {
        self.copy(|s| set(s, name, value))
    }

    /// Copy with the free function `reset` applied.
    fn reset(&self, name: &str) -> Self {
        self.copy(|s| reset(s, name))
    }

    /// Copy with the boolean `name` set to true.
    fn enable(&self, name: &str) -> Self {
        self.copy(|s| set(s, name, true))
    }

    /// Copy with the boolean `name` set to false.
    fn disable(&self, name: &str) -> Self {
        self.copy(|s| set(s, name, false))
    }

    /// Copy with the free function `toggle` applied.
    fn toggle(&self, name: &str) -> Self {
        self.copy(|s| toggle(s, name))
    }

    /// Copy with the free function `set_list` applied.
    fn set_list<V: Into<Value>>(&self, name: &str, values: impl IntoIterator<Item = V>) -> Self {
        self.copy(|s| set_list(s, name, values))
    }

    /// Copy with the free function `add_to_list` applied.
    fn add_to_list<V: Into<Value>>(&self, name: &str, values: impl IntoIterator<Item = V>) -> Self {
        self.copy(|s| add_to_list(s, name, values))
    }

    /// Copy with the free function `remove_from_list` applied.
    fn remove_from_list<V: Into<Value>>(
        &self,
        name: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.copy(|s| remove_from_list(s, name, values))
    }

    /// Copy with the free function `clear_list` applied.
    fn clear_list(&self, name: &str) -> Self {
        self.copy(|s| clear_list(s, name))
    }

    /// Copy with the free function `set_dictionary` applied.
    fn set_dictionary<K: Into<String>, V: Into<Value>>(
        &self,
        name: &str,
        entries: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        self.copy(|s| set_dictionary(s, name, entries))
    }

    /// Copy with the free function `add_dictionary_entry` applied.
    fn add_dictionary_entry(
        &self,
        name: &str,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Self, CollisionError> {
        self.try_copy(|s| add_dictionary_entry(s, name, key, value))
    }

    /// Copy with the free function `add_dictionary_entries` applied.
    fn add_dictionary_entries<K: Into<String>, V: Into<Value>>(
        &self,
        name: &str,
        entries: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self, CollisionError> {
        self.try_copy(|s| add_dictionary_entries(s, name, entries))
    }

    /// Copy with the free function `set_dictionary_entry` applied.
    fn set_dictionary_entry(
        &self,
        name: &str,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.copy(|s| set_dictionary_entry(s, name, key, value))
    }

    /// Copy with the free function `remove_dictionary_entry` applied.
    fn remove_dictionary_entry(&self, name: &str, key: &str) -> Self {
        self.copy(|s| remove_dictionary_entry(s, name, key))
    }

    /// Copy with the free function `clear_dictionary` applied.
    fn clear_dictionary(&self, name: &str) -> Self {
        self.copy(|s| clear_dictionary(s, name))
    }

    /// Copy with the free function `set_lookup` applied.
    fn set_lookup(&self, name: &str, lookup: Lookup) -> Self {
        self.copy(|s| set_lookup(s, name, lookup))
    }

    /// Copy with the free function `set_lookup_entry` applied.
    fn set_lookup_entry<V: Into<Value>>(
        &self,
        name: &str,
        key: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.copy(|s| set_lookup_entry(s, name, key, values))
    }

    /// Copy with the free function `add_lookup_entry` applied.
    fn add_lookup_entry<V: Into<Value>>(
        &self,
        name: &str,
        key: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.copy(|s| add_lookup_entry(s, name, key, values))
    }

    /// Copy with the free function `remove_lookup_value` applied.
    fn remove_lookup_value(&self, name: &str, key: &str, value: impl Into<Value>) -> Self {
        self.copy(|s| remove_lookup_value(s, name, key, value))
    }

    /// Copy with the free function `remove_lookup_key` applied.
    fn remove_lookup_key(&self, name: &str, key: &str) -> Self {
        self.copy(|s| remove_lookup_key(s, name, key))
    }

    /// Copy with the free function `clear_lookup` applied.
    fn clear_lookup(&self, name: &str) -> Self {
        self.copy(|s| clear_lookup(s, name))
    }

    /// Copy with the free function `set_nested` applied.
    fn set_nested<N: OptionSet>(&self, name: &str, nested: &N) -> Self {
        self.copy(|s| set_nested(s, name, nested))
    }

    /// Copy with the free function `set_nested_list` applied.
    fn set_nested_list<'a, N: OptionSet>(
        &self,
        name: &str,
        items: impl IntoIterator<Item = &'a N>,
    ) -> Self {
        self.copy(|s| set_nested_list(s, name, items))
    }

    /// Copy with the free function `add_nested` applied.
    fn add_nested<N: OptionSet>(&self, name: &str, nested: &N) -> Self {
        self.copy(|s| add_nested(s, name, nested))
    }

    /// Copy with the free function `remove_nested` applied.
    fn remove_nested<N: OptionSet>(&self, name: &str, nested: &N) -> Self {
        self.copy(|s| remove_nested(s, name, nested))
    }
}

impl<T: OptionSet> OptionSetExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::FakeOptions;

    #[test]
    fn test_integer_scalar_round_trip() {
        let options = FakeOptions::default().set_integer(1);
        assert_eq!(options.integer(), Some(1));

        let options = options.reset_integer();
        assert_eq!(options.integer(), None);
        assert!(options.is_absent("Integer"));
    }

    #[test]
    fn test_string_scalar_round_trip() {
        let options = FakeOptions::default().set_string("foo");
        assert_eq!(options.string().as_deref(), Some("foo"));
        assert_eq!(options.reset_string().string(), None);
    }

    #[test]
    fn test_mutation_never_alters_the_original() {
        let original = FakeOptions::default().set_integer(1).add_lists(["a"]);
        let mutated = original.set_integer(2).add_lists(["b"]).enable_flag();

        assert_eq!(original.integer(), Some(1));
        assert_eq!(original.lists(), vec!["a".to_string()]);
        assert_eq!(original.flag(), None);
        assert!(!original.store().ptr_eq(mutated.store()));
        assert_eq!(mutated.integer(), Some(2));
        assert_eq!(mutated.lists(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_boolean_enable_disable_toggle() {
        let options = FakeOptions::default().enable_flag();
        assert_eq!(options.flag(), Some(true));
        assert_eq!(options.disable_flag().flag(), Some(false));
        assert_eq!(options.toggle_flag().flag(), Some(false));
        assert_eq!(FakeOptions::default().toggle_flag().flag(), Some(true));
    }

    #[test]
    fn test_list_operations() {
        let options = FakeOptions::default().set_lists(["static", "declared"]);
        assert_eq!(options.lists(), vec!["static", "declared"]);

        let options = options.add_lists(["instance", "static"]);
        assert_eq!(options.lists(), vec!["static", "declared", "instance", "static"]);

        // Only the first matching occurrence goes.
        let options = options.remove_lists(["static"]);
        assert_eq!(options.lists(), vec!["declared", "instance", "static"]);

        let cleared = options.clear_lists();
        assert!(cleared.lists().is_empty());
        assert!(!cleared.is_absent("Lists"));

        let reset = cleared.reset_lists();
        assert!(reset.is_absent("Lists"));
    }

    #[test]
    fn test_remove_from_absent_list_stays_absent() {
        let options = FakeOptions::default().remove_lists(["x"]);
        assert!(options.is_absent("Lists"));
    }

    #[test]
    fn test_dictionary_operations() {
        let options = FakeOptions::default().set_dictionaries([("foo", 1), ("baz", 2)]);
        assert_eq!(
            options.dictionaries(),
            vec![("foo".to_string(), 1), ("baz".to_string(), 2)]
        );

        let options = options.set_dictionary("foo", 10);
        assert_eq!(options.get_dictionary_entry::<i64>("Dictionaries", "foo"), Some(10));

        let options = options.remove_dictionary("baz");
        assert_eq!(options.get_dictionary_entry::<i64>("Dictionaries", "baz"), None);

        let cleared = options.clear_dictionaries();
        assert!(cleared.dictionaries().is_empty());
        assert!(!cleared.is_absent("Dictionaries"));
        assert!(cleared.reset_dictionaries().is_absent("Dictionaries"));
    }

    #[test]
    fn test_dictionary_add_collision_leaves_state_untouched() {
        let options = FakeOptions::default().add_dictionary("k", 1).unwrap();
        let result = options.add_dictionary("k", 2);

        assert_eq!(
            result.err(),
            Some(CollisionError {
                option: "Dictionaries".to_string(),
                key: "k".to_string()
            })
        );
        assert_eq!(options.dictionaries(), vec![("k".to_string(), 1)]);
    }

    #[test]
    fn test_dictionary_bulk_add_is_all_or_nothing() {
        let options = FakeOptions::default().add_dictionary("b", 1).unwrap();
        let result = options.add_dictionary_entries("Dictionaries", [("a", 1), ("b", 2)]);
        assert!(result.is_err());
        assert_eq!(options.dictionaries(), vec![("b".to_string(), 1)]);
    }

    #[test]
    fn test_dictionary_upsert() {
        let options = FakeOptions::default()
            .set_dictionary("k", 1)
            .set_dictionary("k", 2);
        assert_eq!(options.dictionaries(), vec![("k".to_string(), 2)]);
    }

    #[test]
    fn test_lookup_operations() {
        let traits: Lookup = [("foo", vec![1, 2, 3]), ("bar", vec![3, 4, 5])]
            .into_iter()
            .collect();
        let options = FakeOptions::default().set_traits(traits);
        assert_eq!(options.trait_values("bar"), vec![3, 4, 5]);

        let options = options.set_trait("buzz", [1000]);
        assert_eq!(options.trait_values("buzz"), vec![1000]);

        let options = options.add_trait("foo", [4, 5]);
        assert_eq!(options.trait_values("foo"), vec![1, 2, 3, 4, 5]);

        let options = options.remove_trait_value("foo", 2);
        assert_eq!(options.trait_values("foo"), vec![1, 3, 4, 5]);

        let options = options.remove_trait("foo");
        assert!(options.trait_values("foo").is_empty());
        let keys: Vec<String> = options
            .get_lookup::<i64>("Traits")
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert!(keys.contains(&"foo".to_string()));

        let options = options.set_trait("buzz", [9]);
        assert_eq!(options.trait_values("buzz"), vec![9]);

        let cleared = options.clear_traits();
        assert!(cleared.get_lookup::<i64>("Traits").is_empty());
        assert!(!cleared.is_absent("Traits"));
        assert!(cleared.reset_traits().is_absent("Traits"));
    }

    #[test]
    fn test_add_lookup_entry_on_absent_lookup_creates_key() {
        let options = FakeOptions::default().add_trait("foo", [1, 2, 3]).add_trait("foo", [4, 5]);
        assert_eq!(options.trait_values("foo"), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_nested_operations() {
        let inner = FakeOptions::default().set_integer(1);
        let options = FakeOptions::default().set_nested(&inner);
        assert_eq!(options.nested().and_then(|n| n.integer()), Some(1));

        let options = options
            .add_nested_list(&FakeOptions::default().set_integer(1))
            .add_nested_list(&FakeOptions::default().set_integer(5));
        let integers: Vec<_> = options
            .nested_list()
            .iter()
            .filter_map(FakeOptions::integer)
            .collect();
        assert_eq!(integers, vec![1, 5]);

        let options = options.remove_nested_list(&FakeOptions::default().set_integer(1));
        assert_eq!(options.nested_list().len(), 1);
        assert!(options.clear_nested_list().nested_list().is_empty());
    }
}
