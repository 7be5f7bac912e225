use std::{borrow::Borrow, hash::Hash, sync::RwLock};

use ahash::AHashMap;

/// A memoization map protected by a `RwLock`.
///
/// The first value stored for a key wins: later insertions for the same key
/// return the stored value instead of replacing it.
pub struct Memo<K, V>(RwLock<AHashMap<K, V>>);

impl<K, V> Memo<K, V> {
    pub fn new() -> Memo<K, V> {
        Memo(Default::default())
    }

    pub fn len(&self) -> usize {
        self.0.read().expect("read lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> Default for Memo<K, V> {
    fn default() -> Self {
        Memo::new()
    }
}

impl<K: Hash + Eq, V: Clone> Memo<K, V> {
    /// Retrieves a clone of the value stored for `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.0.read().expect("read lock").get(key).cloned()
    }

    /// Stores `value` unless a value is already present for `key`, and
    /// returns the stored value.
    pub fn get_or_put(&self, key: K, value: V) -> V {
        self.0
            .write()
            .expect("write lock")
            .entry(key)
            .or_insert(value)
            .clone()
    }
}
