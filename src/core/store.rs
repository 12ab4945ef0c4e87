//! # Option Value Store
//!
//! The immutable, insertion-ordered property bag underneath every option set.
//! It only knows two primitives, `with_set` and `with_removed`; all the richer
//! semantics (add, clear, upsert...) live in [`crate::core::mutate`] and are
//! expressed in terms of these two.

use crate::models::Value;
use std::sync::Arc;

/// An immutable ordered mapping from option name to [`Value`].
///
/// Cloning is cheap: entries are reference counted, so a derived store shares
/// every entry it did not change with the store it was derived from.
#[derive(Debug, Clone, Default)]
pub struct OptionStore {
    entries: Arc<Vec<(Arc<str>, Arc<Value>)>>,
}

impl OptionStore {
    /// An empty store. Every option is absent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of `name`, or `None` if the option is absent.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(key, _)| key.as_ref() == name)
            .map(|(_, value)| value.as_ref())
    }

    /// Whether `name` holds a value.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(key, _)| key.as_ref() == name)
    }

    /// Returns a new store where `name` holds `value`. A key that already
    /// exists keeps its position; a new key is appended.
    pub fn with_set(&self, name: &str, value: impl Into<Value>) -> Self {
        let value = Arc::new(value.into());
        let mut entries: Vec<(Arc<str>, Arc<Value>)> = self.entries.as_ref().clone();
        match entries.iter_mut().find(|(key, _)| key.as_ref() == name) {
            Some(entry) => entry.1 = value,
            None => entries.push((Arc::from(name), value)),
        }
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Returns a new store where `name` is absent.
    pub fn with_removed(&self, name: &str) -> Self {
        if !self.contains(name) {
            return self.clone();
        }
        let entries = self
            .entries
            .iter()
            .filter(|(key, _)| key.as_ref() != name)
            .cloned()
            .collect();
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Number of present options.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no option is present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the present options in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_ref(), value.as_ref()))
    }

    /// Whether both stores share the same underlying entry table.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }
}

impl PartialEq for OptionStore {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b))
    }
}

impl<K: AsRef<str>, V: Into<Value>> FromIterator<(K, V)> for OptionStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |store, (k, v)| store.with_set(k.as_ref(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_set_leaves_original_untouched() {
        let original = OptionStore::new().with_set("Integer", 1);
        let derived = original.with_set("Integer", 2);

        assert_eq!(original.get("Integer"), Some(&Value::Integer(1)));
        assert_eq!(derived.get("Integer"), Some(&Value::Integer(2)));
        assert!(!original.ptr_eq(&derived));
    }

    #[test]
    fn test_insertion_order_is_preserved_on_overwrite() {
        let store = OptionStore::new()
            .with_set("b", 1)
            .with_set("a", 2)
            .with_set("b", 3);
        let keys: Vec<_> = store.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_with_removed_makes_option_absent() {
        let store = OptionStore::new().with_set("String", "foo");
        let removed = store.with_removed("String");
        assert!(removed.get("String").is_none());
        assert!(!removed.contains("String"));
        assert!(store.contains("String"));
    }

    #[test]
    fn test_removing_absent_option_is_a_no_op() {
        let store = OptionStore::new().with_set("a", true);
        let same = store.with_removed("missing");
        assert_eq!(store, same);
    }

    #[test]
    fn test_empty_list_is_present_not_absent() {
        let store = OptionStore::new().with_set("Lists", Value::List(Vec::new()));
        assert!(store.contains("Lists"));
        assert_eq!(store.get("Lists"), Some(&Value::List(Vec::new())));
    }

    #[test]
    fn test_unchanged_entries_are_shared() {
        let store = OptionStore::new().with_set("a", "x").with_set("b", "y");
        let derived = store.with_set("b", "z");
        let original_a = store.entries.first().map(|(_, v)| Arc::clone(v));
        let derived_a = derived.entries.first().map(|(_, v)| Arc::clone(v));
        match (original_a, derived_a) {
            (Some(a), Some(b)) => assert!(Arc::ptr_eq(&a, &b)),
            _ => panic!("both stores should hold 'a'"),
        }
    }
}
