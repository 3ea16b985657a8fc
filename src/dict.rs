use std::collections::btree_map::{self, BTreeMap};
use thiserror::Error;

use crate::byte_string::ByteString;
use crate::value::Value;

/// A key was inserted into a [`Dictionary`] that already contains it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("dictionary already contains key {key}")]
pub struct DuplicateKeyError {
    /// The rejected key.
    pub key: ByteString,
}

/// A bencode dictionary.
///
/// Entries are kept sorted by the raw bytes of their keys, so iteration and
/// encoding always follow canonical order no matter how the dictionary was
/// filled.
///
/// # Examples
///
/// ```
/// use rbencode::{encode, Dictionary, Value};
///
/// let mut dict = Dictionary::new();
/// dict.try_insert("spam", Value::Integer(1)).unwrap();
/// dict.try_insert("bar", Value::Integer(2)).unwrap();
/// assert!(dict.try_insert("spam", Value::Integer(3)).is_err());
///
/// let keys: Vec<_> = dict.keys().map(|k| k.to_string()).collect();
/// assert_eq!(keys, ["bar", "spam"]);
/// assert_eq!(encode(&Value::Dict(dict)).unwrap(), b"d3:bari2e4:spami1ee");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    entries: BTreeMap<ByteString, Value>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a dictionary from key/value pairs, rejecting repeated keys.
    pub fn try_from_pairs<K, V, I>(pairs: I) -> Result<Self, DuplicateKeyError>
    where
        K: Into<ByteString>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut dict = Self::new();
        for (key, value) in pairs {
            dict.try_insert(key, value)?;
        }
        Ok(dict)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &[u8]) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &[u8]) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts a new entry, failing if the key is already present.
    ///
    /// The existing entry is left untouched on failure.
    pub fn try_insert(
        &mut self,
        key: impl Into<ByteString>,
        value: impl Into<Value>,
    ) -> Result<&mut Value, DuplicateKeyError> {
        match self.entries.entry(key.into()) {
            btree_map::Entry::Vacant(slot) => Ok(slot.insert(value.into())),
            btree_map::Entry::Occupied(slot) => Err(DuplicateKeyError {
                key: slot.key().clone(),
            }),
        }
    }

    /// Inserts or replaces an entry, returning the previous value.
    pub fn set(&mut self, key: impl Into<ByteString>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &[u8]) -> Option<Value> {
        self.entries.remove(key)
    }

    /// Iterates entries in ascending key order.
    pub fn iter(&self) -> btree_map::Iter<'_, ByteString, Value> {
        self.entries.iter()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, ByteString, Value> {
        self.entries.keys()
    }

    pub fn values(&self) -> btree_map::Values<'_, ByteString, Value> {
        self.entries.values()
    }
}

impl<'a> IntoIterator for &'a Dictionary {
    type Item = (&'a ByteString, &'a Value);
    type IntoIter = btree_map::Iter<'a, ByteString, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for Dictionary {
    type Item = (ByteString, Value);
    type IntoIter = btree_map::IntoIter<ByteString, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
