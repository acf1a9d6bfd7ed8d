//! Ordered multimap: key → values in insertion order.

use std::hash::Hash;

use rustc_hash::FxHashMap;

/// A key → `Vec<value>` multimap.
///
/// Values under one key keep insertion order. The order of keys is
/// unspecified.
#[derive(Clone, Debug)]
pub struct Lookup<K, V> {
    map: FxHashMap<K, Vec<V>>,
}

impl<K, V> Default for Lookup<K, V> {
    fn default() -> Self {
        Lookup {
            map: FxHashMap::default(),
        }
    }
}

impl<K: Eq + Hash, V> Lookup<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` under `key`.
    pub fn add(&mut self, key: K, value: V) {
        self.map.entry(key).or_default().push(value);
    }

    /// Values under `key`, empty if the key is absent.
    pub fn get(&self, key: &K) -> &[V] {
        self.map.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of values across all keys.
    pub fn len(&self) -> usize {
        self.map.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
