//! String key-value store module
//!
//! Backs the two per-response maps: outgoing headers and the client's
//! parsed accept set. Both call sites use it as a presence/value map,
//! so no ordering is guaranteed.

use std::collections::HashMap;

/// String-keyed associative container with unique keys.
///
/// Inserting an existing key overwrites it (last write wins). An absent
/// accept set is simply an empty store; lookups on it return `None`.
#[derive(Debug, Default, Clone)]
pub struct Store {
    entries: HashMap<String, String>,
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Look up a key, returning its value when present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Membership test.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, value)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
