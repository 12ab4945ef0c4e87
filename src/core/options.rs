//! # Option Sets
//!
//! An option set is a typed façade over an [`OptionStore`] plus the static
//! [`Schema`] of its type. It is read-only: the only way to "change" one is
//! [`OptionSet::copy`], which hands the store to a transformation and wraps the
//! result in a new instance of the same concrete type.

use crate::core::schema::Schema;
use crate::core::store::OptionStore;
use crate::models::{FromValue, Value};

/// A typed, immutable set of options for one kind of tool invocation.
///
/// Implementors are thin newtypes around an [`OptionStore`]:
///
/// ```ignore
/// #[derive(Debug, Clone, Default)]
/// pub struct RestoreOptions(OptionStore);
///
/// impl OptionSet for RestoreOptions {
///     fn schema() -> &'static Schema { &RESTORE_SCHEMA }
///     fn store(&self) -> &OptionStore { &self.0 }
///     fn from_store(store: OptionStore) -> Self { Self(store) }
/// }
/// ```
pub trait OptionSet: Clone + Default + Send + Sync + 'static {
    /// The schema shared by every instance of this type.
    fn schema() -> &'static Schema;

    /// The current option values.
    fn store(&self) -> &OptionStore;

    /// Wraps a store into a new instance.
    fn from_store(store: OptionStore) -> Self;

    /// The copy-on-write entry point. `self` is never altered.
    fn copy(&self, transform: impl FnOnce(&OptionStore) -> OptionStore) -> Self {
        Self::from_store(transform(self.store()))
    }

    /// Like [`OptionSet::copy`], for transformations that may fail. On failure
    /// no new instance is produced.
    fn try_copy<E>(
        &self,
        transform: impl FnOnce(&OptionStore) -> Result<OptionStore, E>,
    ) -> Result<Self, E> {
        transform(self.store()).map(Self::from_store)
    }

    /// The raw stored value, `None` when the option is absent.
    fn raw(&self, name: &str) -> Option<&Value> {
        self.store().get(name)
    }

    /// Whether `name` holds no value.
    fn is_absent(&self, name: &str) -> bool {
        !self.store().contains(name)
    }

    /// A scalar or boolean value, `None` when absent or of another type.
    fn get_scalar<V: FromValue>(&self, name: &str) -> Option<V> {
        self.raw(name).and_then(V::from_value)
    }

    /// Absent lists read as empty.
    fn get_list<V: FromValue>(&self, name: &str) -> Vec<V> {
        self.raw(name)
            .and_then(Value::as_list)
            .map(|items| items.iter().filter_map(V::from_value).collect())
            .unwrap_or_default()
    }

    /// Dictionary entries in insertion order. Absent dictionaries read as empty.
    fn get_dictionary<V: FromValue>(&self, name: &str) -> Vec<(String, V)> {
        self.raw(name)
            .and_then(Value::as_dictionary)
            .map(|map| {
                map.iter()
                    .filter_map(|(k, v)| V::from_value(v).map(|v| (k.to_string(), v)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The value of one dictionary key.
    fn get_dictionary_entry<V: FromValue>(&self, name: &str, key: &str) -> Option<V> {
        self.raw(name)
            .and_then(Value::as_dictionary)
            .and_then(|map| map.get(key))
            .and_then(V::from_value)
    }

    /// Every key with its values, in insertion order. Absent lookups read as empty.
    fn get_lookup<V: FromValue>(&self, name: &str) -> Vec<(String, Vec<V>)> {
        self.raw(name)
            .and_then(Value::as_lookup)
            .map(|lookup| {
                lookup
                    .iter()
                    .map(|(k, values)| {
                        (
                            k.to_string(),
                            values.iter().filter_map(V::from_value).collect(),
                        )
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The values under one lookup key; empty when the key or the option is missing.
    fn get_lookup_entry<V: FromValue>(&self, name: &str, key: &str) -> Vec<V> {
        self.raw(name)
            .and_then(Value::as_lookup)
            .map(|lookup| lookup.get(key).iter().filter_map(V::from_value).collect())
            .unwrap_or_default()
    }

    /// A nested option set, `None` when absent.
    fn get_nested<N: OptionSet>(&self, name: &str) -> Option<N> {
        self.raw(name)
            .and_then(Value::as_nested)
            .map(|store| N::from_store(store.clone()))
    }

    /// A nested-set list. Absent lists read as empty.
    fn get_nested_list<N: OptionSet>(&self, name: &str) -> Vec<N> {
        self.raw(name)
            .and_then(Value::as_list)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_nested)
                    .map(|store| N::from_store(store.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}
