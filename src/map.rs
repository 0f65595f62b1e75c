//! Ordered, text-keyed map type for dynamic CBOR values.
//!
//! [`CborMap`] wraps an [`IndexMap`] so that pairs are encoded in insertion order.
//! The encoder never reorders keys; deterministic output for a map depends on the
//! order the caller inserted its entries.
//!
//! ## Examples
//!
//! ```rust
//! use serde_cbor_writer::{CborMap, CborValue};
//!
//! let mut map = CborMap::new();
//! map.insert("name".to_string(), CborValue::from("Alice"));
//! map.insert("age".to_string(), CborValue::from(30));
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get("name").and_then(|v| v.as_str()), Some("Alice"));
//! ```

use crate::CborValue;
use indexmap::IndexMap;
use std::collections::HashMap;

/// An ordered map of text keys to CBOR values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CborMap(IndexMap<String, CborValue>);

impl CborMap {
    #[must_use]
    pub fn new() -> Self {
        CborMap(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        CborMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map already contained this key, the old value is returned and the key
    /// keeps its original position.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_cbor_writer::{CborMap, CborValue};
    ///
    /// let mut map = CborMap::new();
    /// assert!(map.insert("key".to_string(), CborValue::from(42)).is_none());
    /// assert!(map.insert("key".to_string(), CborValue::from(43)).is_some());
    /// ```
    pub fn insert(&mut self, key: String, value: CborValue) -> Option<CborValue> {
        self.0.insert(key, value)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&CborValue> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<CborValue> {
        self.0.shift_remove(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of key/value pairs, which is the magnitude of the map header.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the keys of the map, in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, CborValue> {
        self.0.keys()
    }

    /// Returns an iterator over the values of the map, in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, CborValue> {
        self.0.values()
    }

    /// Returns an iterator over the key-value pairs of the map, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, CborValue> {
        self.0.iter()
    }
}

impl From<HashMap<String, CborValue>> for CborMap {
    fn from(map: HashMap<String, CborValue>) -> Self {
        CborMap(map.into_iter().collect())
    }
}

impl IntoIterator for CborMap {
    type Item = (String, CborValue);
    type IntoIter = indexmap::map::IntoIter<String, CborValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a CborMap {
    type Item = (&'a String, &'a CborValue);
    type IntoIter = indexmap::map::Iter<'a, String, CborValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, CborValue)> for CborMap {
    fn from_iter<T: IntoIterator<Item = (String, CborValue)>>(iter: T) -> Self {
        CborMap(IndexMap::from_iter(iter))
    }
}
