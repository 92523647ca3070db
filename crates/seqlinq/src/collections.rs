//! Owned collections that plug into query pipelines.
//!
//! [`List`] is a growable array with checked positional access.
//! [`Dictionary`] is an insertion-ordered map and [`HashSet`] an
//! insertion-ordered set, both with identity from an [`EqualityComparer`]. Bracket indexing on both is sugar over `get` and,
//! like slice indexing, panics where `get` would return an error.

use std::fmt;
use std::hash::Hash;
use std::ops::{Index, IndexMut};
use std::rc::Rc;

use crate::comparer::{DefaultComparer, EqualityComparer};
use crate::enumerable::Enumerable;
use crate::error::{LinqError, Result};
use crate::lookup::{KeyIndex, KeySet, SharedComparer};

// ============================================================================
// List
// ============================================================================

/// A growable list with explicit, checked indexers.
///
/// # Example
///
/// ```
/// use seqlinq::{LinqError, List};
///
/// let mut list: List<i32> = vec![10, 20].into();
/// list.add(30);
/// list.set(0, 5)?;
///
/// assert_eq!(list.get(0), Ok(&5));
/// assert_eq!(list.get(9), Err(LinqError::out_of_range(9, 3)));
/// assert_eq!(list.as_enumerable().filter(|n| **n > 5).count(), 2);
/// # Ok::<(), LinqError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct List<T> {
    items: Vec<T>,
}

impl<T> List<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        List { items: Vec::new() }
    }

    /// Creates an empty list with room for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        List {
            items: Vec::with_capacity(capacity),
        }
    }

    /// The element at `index`.
    pub fn get(&self, index: usize) -> Result<&T> {
        let len = self.items.len();
        self.items
            .get(index)
            .ok_or(LinqError::out_of_range(index, len))
    }

    /// Mutable access to the element at `index`.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.items.len();
        self.items
            .get_mut(index)
            .ok_or(LinqError::out_of_range(index, len))
    }

    /// Replaces the element at `index`, returning the previous one.
    pub fn set(&mut self, index: usize, value: T) -> Result<T> {
        let slot = self.get_mut(index)?;
        Ok(std::mem::replace(slot, value))
    }

    /// Appends `value`.
    pub fn add(&mut self, value: T) {
        self.items.push(value);
    }

    /// Inserts `value` at `index`, shifting later elements. `index` may equal
    /// the length.
    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        if index > self.items.len() {
            return Err(LinqError::out_of_range(index, self.items.len()));
        }
        self.items.insert(index, value);
        Ok(())
    }

    /// Removes and returns the element at `index`.
    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        if index >= self.items.len() {
            return Err(LinqError::out_of_range(index, self.items.len()));
        }
        Ok(self.items.remove(index))
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list has no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Borrowing iterator in index order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// The elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Unwraps the backing vector.
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    /// A random-access pipeline over the borrowed elements.
    pub fn as_enumerable(&self) -> Enumerable<'_, &T> {
        Enumerable::from_slice(&self.items)
    }
}

impl<T> From<Vec<T>> for List<T> {
    fn from(items: Vec<T>) -> Self {
        List { items }
    }
}

impl<T> FromIterator<T> for List<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        List {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T> Index<usize> for List<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<T> IndexMut<usize> for List<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.items[index]
    }
}

impl<'l, T> IntoIterator for &'l List<T> {
    type Item = &'l T;
    type IntoIter = std::slice::Iter<'l, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> IntoIterator for List<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

// ============================================================================
// Dictionary
// ============================================================================

/// One dictionary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyValuePair<K, V> {
    /// The entry key.
    pub key: K,
    /// The entry value.
    pub value: V,
}

/// An insertion-ordered map with comparer-defined key identity.
///
/// # Example
///
/// ```
/// use seqlinq::{Dictionary, IgnoreAsciiCase, LinqError};
///
/// let mut headers = Dictionary::with_comparer(IgnoreAsciiCase::new());
/// headers.add("Content-Type", "text/plain")?;
/// assert!(headers.add("content-type", "text/html").is_err());
///
/// headers.set("CONTENT-TYPE", "text/html");
/// assert_eq!(headers.get(&"content-type"), Some(&"text/html"));
/// assert_eq!(headers.keys().collect::<Vec<_>>(), vec![&"Content-Type"]);
/// # Ok::<(), LinqError>(())
/// ```
pub struct Dictionary<'a, K, V> {
    comparer: SharedComparer<'a, K>,
    index: KeyIndex,
    entries: Vec<Option<KeyValuePair<K, V>>>,
    len: usize,
}

impl<'a, K: Hash + Eq, V> Dictionary<'a, K, V> {
    /// Creates an empty dictionary keyed by `Hash + Eq`.
    pub fn new() -> Self {
        Dictionary::with_comparer(DefaultComparer::new())
    }
}

impl<'a, K, V> Dictionary<'a, K, V> {
    /// Creates an empty dictionary keyed through `comparer`.
    pub fn with_comparer<C>(comparer: C) -> Self
    where
        C: EqualityComparer<K> + 'a,
    {
        Dictionary::with_shared(Rc::new(comparer))
    }

    pub(crate) fn with_shared(comparer: SharedComparer<'a, K>) -> Self {
        Dictionary {
            comparer,
            index: KeyIndex::default(),
            entries: Vec::new(),
            len: 0,
        }
    }

    fn slot_of(&self, hash: u64, key: &K) -> Option<usize> {
        let entries = &self.entries;
        let comparer = &self.comparer;
        self.index.find(hash, |slot| match &entries[slot] {
            Some(entry) => comparer.equals(&entry.key, key),
            None => false,
        })
    }

    fn entry(&self, key: &K) -> Option<&KeyValuePair<K, V>> {
        let slot = self.slot_of(self.comparer.hash(key), key)?;
        self.entries[slot].as_ref()
    }

    fn push(&mut self, hash: u64, key: K, value: V) {
        self.index.insert(hash, self.entries.len());
        self.entries.push(Some(KeyValuePair { key, value }));
        self.len += 1;
    }

    /// Inserts a new entry; fails if an equal key is already present.
    pub fn add(&mut self, key: K, value: V) -> Result<()> {
        let hash = self.comparer.hash(&key);
        if self.slot_of(hash, &key).is_some() {
            return Err(LinqError::invalid(
                "an element with the same key already exists",
            ));
        }
        self.push(hash, key, value);
        Ok(())
    }

    /// Inserts or overwrites. An overwritten entry keeps its position and its
    /// original key; the previous value is returned.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.comparer.hash(&key);
        match self.slot_of(hash, &key) {
            Some(slot) => self.entries[slot]
                .as_mut()
                .map(|entry| std::mem::replace(&mut entry.value, value)),
            None => {
                self.push(hash, key, value);
                None
            }
        }
    }

    /// The value stored under `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entry(key).map(|entry| &entry.value)
    }

    /// Mutable access to the value stored under `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let slot = self.slot_of(self.comparer.hash(key), key)?;
        self.entries[slot].as_mut().map(|entry| &mut entry.value)
    }

    /// Removes the entry for `key`, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let hash = self.comparer.hash(key);
        let slot = self.slot_of(hash, key)?;
        self.index.remove(hash, slot);
        let entry = self.entries[slot].take()?;
        self.len -= 1;
        if self.entries.len() - self.len > self.len {
            self.compact();
        }
        Some(entry.value)
    }

    /// Drops removed slots and reindexes the survivors, keeping their order.
    fn compact(&mut self) {
        self.entries.retain(Option::is_some);
        let mut index = KeyIndex::default();
        for (slot, entry) in self.entries.iter().enumerate() {
            if let Some(entry) = entry {
                index.insert(self.comparer.hash(&entry.key), slot);
            }
        }
        self.index = index;
    }

    /// Whether an equal key is present.
    pub fn contains_key(&self, key: &K) -> bool {
        self.entry(key).is_some()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the dictionary has no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &KeyValuePair<K, V>> + '_ {
        self.entries.iter().flatten()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|entry| &entry.key)
    }

    /// Values in key insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|entry| &entry.value)
    }

    /// A pipeline over borrowed entries, in insertion order.
    pub fn as_enumerable(&self) -> Enumerable<'_, KeyValuePair<&K, &V>> {
        Enumerable::from_fn(move || {
            self.iter().map(|entry| KeyValuePair {
                key: &entry.key,
                value: &entry.value,
            })
        })
    }
}

impl<'a, K: Hash + Eq, V> Default for Dictionary<'a, K, V> {
    fn default() -> Self {
        Dictionary::new()
    }
}

impl<'a, K, V> Index<&K> for Dictionary<'a, K, V> {
    type Output = V;

    fn index(&self, key: &K) -> &V {
        match self.get(key) {
            Some(value) => value,
            None => panic!("key not found in dictionary"),
        }
    }
}

impl<'a, K: fmt::Debug, V: fmt::Debug> fmt::Debug for Dictionary<'a, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|entry| (&entry.key, &entry.value)))
            .finish()
    }
}

// ============================================================================
// HashSet
// ============================================================================

/// An insertion-ordered set with comparer-defined identity.
///
/// # Example
///
/// ```
/// use seqlinq::{HashSet, IgnoreAsciiCase};
///
/// let mut tags = HashSet::with_comparer(IgnoreAsciiCase::new());
/// assert!(tags.add("Rust"));
/// assert!(!tags.add("RUST"));
/// assert!(tags.add("linq"));
///
/// assert!(tags.contains(&"rust"));
/// assert_eq!(tags.iter().collect::<Vec<_>>(), vec![&"Rust", &"linq"]);
/// ```
pub struct HashSet<'a, T> {
    keys: KeySet<'a, T>,
}

impl<'a, T: Hash + Eq> HashSet<'a, T> {
    /// Creates an empty set keyed by `Hash + Eq`.
    pub fn new() -> Self {
        HashSet::with_comparer(DefaultComparer::new())
    }
}

impl<'a, T> HashSet<'a, T> {
    /// Creates an empty set whose identity comes from `comparer`.
    pub fn with_comparer<C>(comparer: C) -> Self
    where
        C: EqualityComparer<T> + 'a,
    {
        HashSet::with_shared(Rc::new(comparer))
    }

    pub(crate) fn with_shared(comparer: SharedComparer<'a, T>) -> Self {
        HashSet {
            keys: KeySet::new(comparer),
        }
    }

    /// Adds `value`; returns `false` and keeps the existing element when an
    /// equal one is present.
    pub fn add(&mut self, value: T) -> bool {
        self.keys.insert(value)
    }

    /// Removes the element equal to `value`; returns whether one was present.
    pub fn remove(&mut self, value: &T) -> bool {
        self.keys.remove(value)
    }

    /// Whether an equal element is present.
    pub fn contains(&self, value: &T) -> bool {
        self.keys.contains(value)
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the set has no elements.
    pub fn is_empty(&self) -> bool {
        self.keys.len() == 0
    }

    /// Elements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.keys.iter()
    }

    /// A pipeline over borrowed elements, in insertion order.
    pub fn as_enumerable(&self) -> Enumerable<'_, &T> {
        Enumerable::from_fn(move || self.iter())
    }
}

impl<'a, T: Hash + Eq> Default for HashSet<'a, T> {
    fn default() -> Self {
        HashSet::new()
    }
}

impl<'a, T: Hash + Eq> FromIterator<T> for HashSet<'a, T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = HashSet::new();
        for value in iter {
            set.add(value);
        }
        set
    }
}

impl<'a, T: fmt::Debug> fmt::Debug for HashSet<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparer::IgnoreAsciiCase;

    #[test]
    fn list_checked_access() {
        let mut list = List::new();
        list.add('a');
        list.add('c');
        assert_eq!(list.insert(1, 'b'), Ok(()));
        assert_eq!(list.insert(9, 'z'), Err(LinqError::out_of_range(9, 3)));

        assert_eq!(list.as_slice(), &['a', 'b', 'c']);
        assert_eq!(list.set(2, 'd'), Ok('c'));
        assert_eq!(list.remove_at(0), Ok('a'));
        assert_eq!(list.remove_at(5), Err(LinqError::out_of_range(5, 2)));
        assert_eq!(list[1], 'd');

        list[0] = 'x';
        assert_eq!(list.get(0), Ok(&'x'));
    }

    #[test]
    fn list_as_enumerable_is_random_access() {
        let list: List<i32> = (1..=5).collect();
        let seq = list.as_enumerable();
        assert_eq!(seq.count(), 5);
        assert_eq!(seq.element_at(4), Ok(&5));
        assert_eq!(seq.reverse().first(), Ok(&5));
    }

    #[test]
    fn dictionary_preserves_insertion_order() {
        let mut dict = Dictionary::new();
        dict.add("b", 2).unwrap();
        dict.add("a", 1).unwrap();
        dict.add("c", 3).unwrap();
        assert_eq!(dict.remove(&"a"), Some(1));
        dict.set("a", 10);
        dict.set("b", 20);

        assert_eq!(dict.keys().copied().collect::<Vec<_>>(), vec!["b", "c", "a"]);
        assert_eq!(dict.values().copied().collect::<Vec<_>>(), vec![20, 3, 10]);
        assert_eq!(dict.len(), 3);
        assert_eq!(dict[&"c"], 3);
    }

    #[test]
    fn dictionary_storage_stays_bounded_under_churn() {
        let mut dict = Dictionary::new();
        for i in 0..10_000 {
            dict.add(1, i).unwrap();
            assert_eq!(dict.remove(&1), Some(i));
        }
        assert!(dict.is_empty());
        assert!(dict.entries.len() <= 1);

        for key in 0..8 {
            dict.add(key, key * 10).unwrap();
        }
        for key in [0, 2, 4, 6, 1] {
            dict.remove(&key);
        }
        assert!(dict.entries.len() <= 2 * dict.len() + 1);
        assert_eq!(dict.keys().copied().collect::<Vec<_>>(), vec![3, 5, 7]);
        assert_eq!(dict.get(&5), Some(&50));
        assert!(!dict.contains_key(&4));

        dict.set(4, 40);
        assert_eq!(dict.keys().copied().collect::<Vec<_>>(), vec![3, 5, 7, 4]);
        assert_eq!(dict[&7], 70);
    }

    #[test]
    fn dictionary_add_rejects_duplicates() {
        let mut dict = Dictionary::with_comparer(IgnoreAsciiCase::new());
        dict.add("Key".to_string(), 1).unwrap();
        assert!(matches!(
            dict.add("KEY".to_string(), 2),
            Err(LinqError::InvalidOperation(_))
        ));
        assert!(dict.contains_key(&"key".to_string()));
        assert_eq!(dict.get(&"kEy".to_string()), Some(&1));
        assert_eq!(dict.remove(&"missing".to_string()), None);
    }

    #[test]
    fn hash_set_uses_comparer_identity() {
        let mut set = HashSet::with_comparer(IgnoreAsciiCase::new());
        assert!(set.add("Alpha".to_string()));
        assert!(set.add("beta".to_string()));
        assert!(!set.add("ALPHA".to_string()));
        assert_eq!(set.len(), 2);

        assert!(set.remove(&"alpha".to_string()));
        assert!(!set.contains(&"Alpha".to_string()));
        assert!(set.add("gamma".to_string()));

        let upper: Vec<String> = set
            .as_enumerable()
            .select(|s| s.to_uppercase())
            .to_vec();
        assert_eq!(upper, vec!["BETA", "GAMMA"]);
    }

    #[test]
    fn hash_set_from_iterator_dedups() {
        let set: HashSet<'_, i32> = vec![3, 1, 3, 2, 1].into_iter().collect();
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![3, 1, 2]);
        assert!(!set.is_empty());
    }

    #[test]
    fn dictionary_as_enumerable() {
        let mut dict = Dictionary::new();
        dict.add(1, "one").unwrap();
        dict.add(2, "two").unwrap();

        let values: Vec<&str> = dict
            .as_enumerable()
            .filter(|kv| *kv.key > 1)
            .select(|kv| *kv.value)
            .to_vec();
        assert_eq!(values, vec!["two"]);
    }
}
