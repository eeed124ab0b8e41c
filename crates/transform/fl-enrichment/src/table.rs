//! LookupTable - O(1) exact-match table keyed by IATA code.

use ahash::RandomState;
use hashbrown::HashMap;

/// O(1) exact-match lookup table using hashbrown with ahash.
///
/// Keys are matched exactly; no case folding is applied.
#[derive(Debug, Clone)]
pub struct LookupTable<V> {
    data: HashMap<String, V, RandomState>,
}

impl<V> LookupTable<V> {
    /// Creates a new empty table.
    pub fn new() -> Self {
        Self {
            data: HashMap::with_hasher(RandomState::new()),
        }
    }

    /// Inserts a value, replacing any previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        self.data.insert(key.into(), value);
    }

    /// Looks up a key.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.data.get(key)
    }

    /// Returns true if the key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Returns the number of entries in the table.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<V> Default for LookupTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for LookupTable<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (key, value) in iter {
            table.insert(key, value);
        }
        table
    }
}
