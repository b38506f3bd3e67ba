//! Request attributes with copy-on-write storage
//!
//! Attributes carry route parameters and values injected by middleware. They
//! keep insertion order and are stored behind an `Arc`, so cloning a request is
//! cheap and adding an attribute only copies the table when it is shared.

use serde_json::Value;
use smallvec::SmallVec;
use std::sync::Arc;

/// Maximum number of attributes to store inline.
/// Most requests carry a handful of route parameters plus one or two
/// middleware values, so this covers the common case without spilling.
pub const STACK_ATTRIBUTES_CAPACITY: usize = 4;

type Table = SmallVec<[(String, Value); STACK_ATTRIBUTES_CAPACITY]>;

/// Ordered, named request attributes.
#[derive(Debug, Clone, Default)]
pub struct Attributes {
    inner: Arc<Table>,
}

impl Attributes {
    /// Create an empty attribute table.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute, replacing an existing value in place.
    ///
    /// A table shared with another request is copied first.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        let table = Arc::make_mut(&mut self.inner);
        match table.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => table.push((key, value)),
        }
    }

    /// Get a value by key.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.inner.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Get a string value by key.
    #[inline]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Check if a key exists.
    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.iter().any(|(k, _)| k == key)
    }

    /// Check if the table is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Get the number of attributes.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Iterate over key-value pairs in insertion order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.inner.iter().map(|(k, _)| k.as_str())
    }

    #[cfg(test)]
    fn shares_storage_with(&self, other: &Attributes) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        for (k, v) in iter {
            attributes.insert(k, v);
        }
        attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insertion_order_is_kept() {
        let attributes: Attributes = [("year", "2024"), ("month", "01"), ("slug", "new-year")]
            .into_iter()
            .collect();

        let keys: Vec<&str> = attributes.keys().collect();
        assert_eq!(keys, vec!["year", "month", "slug"]);
        assert_eq!(attributes.get_str("month"), Some("01"));
    }

    #[test]
    fn test_insert_replaces_existing_value() {
        let mut attributes = Attributes::new();
        attributes.insert("id", "1");
        attributes.insert("id", "2");

        assert_eq!(attributes.len(), 1);
        assert_eq!(attributes.get_str("id"), Some("2"));
    }

    #[test]
    fn test_clone_shares_until_written() {
        let mut original = Attributes::new();
        original.insert("user", json!({"id": 7}));

        let mut copy = original.clone();
        assert!(copy.shares_storage_with(&original));

        copy.insert("role", "admin");
        assert!(!copy.shares_storage_with(&original));
        assert!(original.get("role").is_none());
        assert_eq!(copy.get("user"), Some(&json!({"id": 7})));
    }

    #[test]
    fn test_non_string_values() {
        let mut attributes = Attributes::new();
        attributes.insert("trail", json!(["A", "B"]));

        assert!(attributes.get_str("trail").is_none());
        assert_eq!(attributes.get("trail"), Some(&json!(["A", "B"])));
    }
}
