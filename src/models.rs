// src/models.rs

use crate::core::store::OptionStore;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

// --- OPTION VALUES ---
// Everything an option store can hold. The declared kind of an option decides
// which variant is expected; the store itself stays untyped.

/// A single option value as held by an [`OptionStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A boolean.
    Bool(bool),
    /// An integer.
    Integer(i64),
    /// A float.
    Float(f64),
    /// Text or a path.
    Text(String),
    /// An ordered list. A nested-set list is a `List` of `Nested` values.
    List(Vec<Value>),
    /// Unique keys in insertion order.
    Dictionary(Dictionary),
    /// Keys with value sequences.
    Lookup(Lookup),
    /// A nested option set.
    Nested(OptionStore),
}

impl Value {
    /// The boolean, if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The elements, if this is a `List`.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// The map, if this is a `Dictionary`.
    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            Self::Dictionary(map) => Some(map),
            _ => None,
        }
    }

    /// The lookup, if this is a `Lookup`.
    pub fn as_lookup(&self) -> Option<&Lookup> {
        match self {
            Self::Lookup(lookup) => Some(lookup),
            _ => None,
        }
    }

    /// The store, if this is a `Nested` set.
    pub fn as_nested(&self) -> Option<&OptionStore> {
        match self {
            Self::Nested(store) => Some(store),
            _ => None,
        }
    }

    /// A short name of the variant, used in error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::List(_) => "list",
            Self::Dictionary(_) => "dictionary",
            Self::Lookup(_) => "lookup",
            Self::Nested(_) => "nested",
        }
    }
}

/// The textual form used when a value is substituted into a format template.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Text(s) => f.write_str(s),
            Self::List(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                f.write_str(&parts.join(","))
            }
            Self::Dictionary(map) => {
                let parts: Vec<String> = map.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
                f.write_str(&parts.join(","))
            }
            Self::Lookup(lookup) => {
                let parts: Vec<String> = lookup
                    .iter()
                    .flat_map(|(k, values)| values.iter().map(move |v| format!("{}={}", k, v)))
                    .collect();
                f.write_str(&parts.join(","))
            }
            Self::Nested(store) => write!(f, "<{} options>", store.len()),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<PathBuf> for Value {
    fn from(value: PathBuf) -> Self {
        Self::Text(value.to_string_lossy().into_owned())
    }
}

impl From<&Path> for Value {
    fn from(value: &Path) -> Self {
        Self::Text(value.to_string_lossy().into_owned())
    }
}

impl From<Dictionary> for Value {
    fn from(value: Dictionary) -> Self {
        Self::Dictionary(value)
    }
}

impl From<Lookup> for Value {
    fn from(value: Lookup) -> Self {
        Self::Lookup(value)
    }
}

/// Conversion from a stored [`Value`] back into a typed value for getters.
pub trait FromValue: Sized {
    /// `None` when `value` holds another variant.
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(i) => i32::try_from(*i).ok(),
            _ => None,
        }
    }
}

impl FromValue for u32 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(i) => u32::try_from(*i).ok(),
            _ => None,
        }
    }
}

/// Largest integer magnitude an `f64` holds without rounding (2^53).
const MAX_EXACT_FLOAT_INT: u64 = 1 << f64::MANTISSA_DIGITS;

/// Integers read as floats only while they convert exactly; larger ones give
/// `None` instead of a rounded value.
impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(x) => Some(*x),
            Value::Integer(i) if i.unsigned_abs() <= MAX_EXACT_FLOAT_INT => Some(*i as f64),
            _ => None,
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromValue for PathBuf {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(s) => Some(PathBuf::from(s)),
            _ => None,
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

// --- ORDERED COLLECTIONS ---

/// An insertion-ordered map with unique string keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary {
    entries: Vec<(String, Value)>,
}

impl Dictionary {
    /// An empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The value of `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Inserts or overwrites. An overwritten key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Removes `key` and returns its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let position = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(position).1)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// A "lookup": each key holds an ordered, possibly duplicated sequence of values.
/// A key may be present with an empty sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lookup {
    entries: Vec<(String, Vec<Value>)>,
}

impl Lookup {
    /// An empty lookup.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys (not values).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `key` is present, even with no values.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// The values of `key`. A missing key yields an empty slice.
    pub fn get(&self, key: &str) -> &[Value] {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    /// Replaces the value sequence of `key`, creating the key if needed.
    pub fn set(&mut self, key: &str, values: Vec<Value>) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = values,
            None => self.entries.push((key.to_string(), values)),
        }
    }

    /// Appends to the value sequence of `key`, creating the key if needed.
    pub fn extend(&mut self, key: &str, values: impl IntoIterator<Item = Value>) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => existing.extend(values),
            None => self
                .entries
                .push((key.to_string(), values.into_iter().collect())),
        }
    }

    /// Removes the first occurrence of `value` under `key`. Returns whether
    /// anything was removed.
    pub fn remove_value(&mut self, key: &str, value: &Value) -> bool {
        let Some((_, values)) = self.entries.iter_mut().find(|(k, _)| k == key) else {
            return false;
        };
        match values.iter().position(|v| v == value) {
            Some(position) => {
                values.remove(position);
                true
            }
            None => false,
        }
    }

    /// Empties the value sequence of `key` but keeps the key.
    pub fn clear_key(&mut self, key: &str) {
        if let Some((_, values)) = self.entries.iter_mut().find(|(k, _)| k == key) {
            values.clear();
        }
    }

    /// Keys and their values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl<K: AsRef<str>, V: Into<Value>> FromIterator<(K, Vec<V>)> for Lookup {
    fn from_iter<I: IntoIterator<Item = (K, Vec<V>)>>(iter: I) -> Self {
        let mut lookup = Self::new();
        for (k, values) in iter {
            lookup.extend(k.as_ref(), values.into_iter().map(Into::into));
        }
        lookup
    }
}

// --- PROCESS EXECUTION ---

/// The stream an output line was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Standard output.
    Std,
    /// Standard error.
    Err,
}

/// One line of output observed while a process was running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputEvent {
    /// The stream the line came from.
    pub kind: OutputKind,
    /// The line without its terminator.
    pub text: String,
}

impl OutputEvent {
    /// Creates an event.
    pub fn new(kind: OutputKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// The record of a single process invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessOutcome {
    /// Captured lines, in the order they were observed across both streams.
    pub events: Vec<OutputEvent>,
    /// `None` when the process was cancelled or killed by a signal.
    pub exit_code: Option<i32>,
    /// Set when the timeout or the token stopped the process.
    pub cancelled: bool,
}

impl ProcessOutcome {
    /// Standard output lines in order.
    pub fn stdout(&self) -> impl Iterator<Item = &str> {
        self.lines(OutputKind::Std)
    }

    /// Standard error lines in order.
    pub fn stderr(&self) -> impl Iterator<Item = &str> {
        self.lines(OutputKind::Err)
    }

    fn lines(&self, kind: OutputKind) -> impl Iterator<Item = &str> {
        self.events
            .iter()
            .filter(move |e| e.kind == kind)
            .map(|e| e.text.as_str())
    }

    /// Exited with code 0 and was not cancelled.
    pub fn success(&self) -> bool {
        !self.cancelled && self.exit_code == Some(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dictionary_overwrite_keeps_position() {
        let mut map: Dictionary = [("a", 1), ("b", 2)].into_iter().collect();
        map.insert("a", 10);
        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(map.get("a"), Some(&Value::Integer(10)));
    }

    #[test]
    fn test_lookup_clear_key_retains_key() {
        let mut lookup = Lookup::new();
        lookup.extend("foo", vec![Value::from(1), Value::from(2)]);
        lookup.clear_key("foo");
        assert!(lookup.contains_key("foo"));
        assert!(lookup.get("foo").is_empty());
        assert!(lookup.get("missing").is_empty());
        assert!(!lookup.contains_key("missing"));
    }

    #[test]
    fn test_lookup_remove_value_removes_first_occurrence_only() {
        let mut lookup = Lookup::new();
        lookup.extend("k", vec![Value::from(1), Value::from(2), Value::from(1)]);
        assert!(lookup.remove_value("k", &Value::from(1)));
        assert_eq!(lookup.get("k"), &[Value::from(2), Value::from(1)]);
        assert!(!lookup.remove_value("k", &Value::from(9)));
    }

    #[test]
    fn test_float_from_integer_is_exact_or_none() {
        assert_eq!(f64::from_value(&Value::Float(1.5)), Some(1.5));
        assert_eq!(f64::from_value(&Value::Integer(3_000_000_000)), Some(3_000_000_000.0));
        assert_eq!(f64::from_value(&Value::Integer(-(1 << 53))), Some(-9_007_199_254_740_992.0));
        assert_eq!(f64::from_value(&Value::Integer((1 << 53) + 1)), None);
        assert_eq!(f64::from_value(&Value::Text("1".into())), None);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from(5).to_string(), "5");
        assert_eq!(Value::from("spacy value").to_string(), "spacy value");
    }

    #[test]
    fn test_outcome_success_and_streams() {
        let outcome = ProcessOutcome {
            events: vec![
                OutputEvent::new(OutputKind::Std, "a"),
                OutputEvent::new(OutputKind::Err, "b"),
            ],
            exit_code: Some(0),
            cancelled: false,
        };
        assert!(outcome.success());
        assert_eq!(outcome.stdout().collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(outcome.stderr().collect::<Vec<_>>(), vec!["b"]);
    }
}
