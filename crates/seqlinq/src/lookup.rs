//! Hash-keyed multi-value tables backing join, group and set operators.
//!
//! Keys are bucketed by [`EqualityComparer::hash`] and resolved within a
//! bucket by [`EqualityComparer::equals`], so two keys the comparer considers
//! equal always land in the same [`Grouping`] even when they are distinct
//! values.

use std::collections::HashMap;
use std::rc::Rc;

use crate::comparer::{DefaultComparer, EqualityComparer};
use crate::enumerable::Enumerable;

/// Shared, type-erased comparer handle.
pub(crate) type SharedComparer<'a, K> = Rc<dyn EqualityComparer<K> + 'a>;

// ============================================================================
// KeyIndex
// ============================================================================

/// Maps a 64-bit hash to the slots holding keys with that hash.
#[derive(Debug, Default)]
pub(crate) struct KeyIndex {
    buckets: HashMap<u64, Vec<usize>>,
}

impl KeyIndex {
    pub(crate) fn find(&self, hash: u64, mut matches: impl FnMut(usize) -> bool) -> Option<usize> {
        self.buckets
            .get(&hash)?
            .iter()
            .copied()
            .find(|&slot| matches(slot))
    }

    pub(crate) fn insert(&mut self, hash: u64, slot: usize) {
        self.buckets.entry(hash).or_default().push(slot);
    }

    pub(crate) fn remove(&mut self, hash: u64, slot: usize) {
        if let Some(slots) = self.buckets.get_mut(&hash) {
            slots.retain(|&s| s != slot);
            if slots.is_empty() {
                self.buckets.remove(&hash);
            }
        }
    }
}

// ============================================================================
// KeySet
// ============================================================================

/// Insertion-ordered set of keys under a comparer.
///
/// Removal leaves a tombstone; tombstones are swept once they outnumber the
/// live keys.
pub(crate) struct KeySet<'a, K> {
    comparer: SharedComparer<'a, K>,
    index: KeyIndex,
    keys: Vec<Option<K>>,
    len: usize,
}

impl<'a, K> KeySet<'a, K> {
    pub(crate) fn new(comparer: SharedComparer<'a, K>) -> Self {
        KeySet {
            comparer,
            index: KeyIndex::default(),
            keys: Vec::new(),
            len: 0,
        }
    }

    fn slot_of(&self, hash: u64, key: &K) -> Option<usize> {
        let keys = &self.keys;
        let comparer = &self.comparer;
        self.index.find(hash, |slot| match &keys[slot] {
            Some(existing) => comparer.equals(existing, key),
            None => false,
        })
    }

    /// Adds `key`; returns `false` if an equal key was already present.
    pub(crate) fn insert(&mut self, key: K) -> bool {
        let hash = self.comparer.hash(&key);
        if self.slot_of(hash, &key).is_some() {
            return false;
        }
        self.index.insert(hash, self.keys.len());
        self.keys.push(Some(key));
        self.len += 1;
        true
    }

    /// Removes `key`; returns `false` if it was absent.
    pub(crate) fn remove(&mut self, key: &K) -> bool {
        let hash = self.comparer.hash(key);
        let Some(slot) = self.slot_of(hash, key) else {
            return false;
        };
        self.index.remove(hash, slot);
        self.keys[slot] = None;
        self.len -= 1;
        if self.keys.len() - self.len > self.len {
            self.compact();
        }
        true
    }

    pub(crate) fn contains(&self, key: &K) -> bool {
        self.slot_of(self.comparer.hash(key), key).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Live keys in insertion order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &K> + '_ {
        self.keys.iter().flatten()
    }

    fn compact(&mut self) {
        self.keys.retain(Option::is_some);
        let mut index = KeyIndex::default();
        for (slot, key) in self.keys.iter().enumerate() {
            if let Some(key) = key {
                index.insert(self.comparer.hash(key), slot);
            }
        }
        self.index = index;
    }
}

// ============================================================================
// Grouping
// ============================================================================

/// A key paired with the values that share it, in first-seen order.
///
/// A grouping is itself a sequence over its values.
///
/// # Example
///
/// ```
/// use seqlinq::Enumerable;
///
/// let groups = Enumerable::from_vec(vec!["apple", "avocado", "banana"])
///     .group_by(|s| s.chars().next())
///     .to_vec();
///
/// assert_eq!(groups[0].key(), &Some('a'));
/// assert_eq!(groups[0].values(), &["apple", "avocado"]);
/// assert_eq!(groups[1].len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Grouping<K, V> {
    key: K,
    values: Vec<V>,
}

impl<K, V> Grouping<K, V> {
    pub(crate) fn new(key: K) -> Self {
        Grouping {
            key,
            values: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, value: V) {
        self.values.push(value);
    }

    /// The key shared by every value in this grouping.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// The values, in the order they were first seen.
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the grouping holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates the values by reference.
    pub fn iter(&self) -> std::slice::Iter<'_, V> {
        self.values.iter()
    }

    /// Splits into key and values.
    pub fn into_parts(self) -> (K, Vec<V>) {
        (self.key, self.values)
    }

    /// A query pipeline over the borrowed values.
    pub fn as_enumerable(&self) -> Enumerable<'_, &V> {
        Enumerable::from_slice(&self.values)
    }

    /// A query pipeline that owns the values.
    pub fn into_enumerable<'a>(self) -> Enumerable<'a, V>
    where
        V: Clone + 'a,
    {
        Enumerable::from_vec(self.values)
    }
}

impl<'g, K, V> IntoIterator for &'g Grouping<K, V> {
    type Item = &'g V;
    type IntoIter = std::slice::Iter<'g, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl<K, V> IntoIterator for Grouping<K, V> {
    type Item = V;
    type IntoIter = std::vec::IntoIter<V>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

// ============================================================================
// Lookup
// ============================================================================

/// A multi-value map from key to an append-ordered bucket of values.
///
/// Groupings are kept in first-seen key order and never reordered.
///
/// # Example
///
/// ```
/// use seqlinq::{DefaultComparer, Lookup};
///
/// let words = ["one", "two", "three", "four"];
/// let by_len = Lookup::build(words, |w| w.len(), |w| w.to_uppercase(), DefaultComparer::new());
///
/// assert_eq!(by_len.get(&3), &["ONE".to_string(), "TWO".to_string()]);
/// assert!(by_len.get(&9).is_empty());
/// assert_eq!(by_len.len(), 3);
/// ```
pub struct Lookup<'a, K, V> {
    comparer: SharedComparer<'a, K>,
    index: KeyIndex,
    groups: Vec<Grouping<K, V>>,
}

impl<'a, K, V> Lookup<'a, K, V> {
    /// Creates an empty lookup using `comparer` for key identity.
    pub fn new<C>(comparer: C) -> Self
    where
        C: EqualityComparer<K> + 'a,
    {
        Lookup::with_shared(Rc::new(comparer))
    }

    pub(crate) fn with_shared(comparer: SharedComparer<'a, K>) -> Self {
        Lookup {
            comparer,
            index: KeyIndex::default(),
            groups: Vec::new(),
        }
    }

    /// Builds a lookup from `source`, bucketing `element(item)` under `key(&item)`.
    pub fn build<I, T, KF, EF, C>(source: I, key: KF, element: EF, comparer: C) -> Self
    where
        I: IntoIterator<Item = T>,
        KF: Fn(&T) -> K,
        EF: Fn(T) -> V,
        C: EqualityComparer<K> + 'a,
    {
        Lookup::build_shared(source, key, element, Rc::new(comparer))
    }

    pub(crate) fn build_shared<I, T, KF, EF>(
        source: I,
        key: KF,
        element: EF,
        comparer: SharedComparer<'a, K>,
    ) -> Self
    where
        I: IntoIterator<Item = T>,
        KF: Fn(&T) -> K,
        EF: Fn(T) -> V,
    {
        let mut lookup = Lookup::with_shared(comparer);
        let mut elements = 0usize;
        for item in source {
            let k = key(&item);
            if let Some(group) = lookup.get_grouping(k, true) {
                group.push(element(item));
            }
            elements += 1;
        }
        tracing::trace!(groups = lookup.len(), elements, "built lookup table");
        lookup
    }

    pub(crate) fn slot_of(&self, key: &K) -> Option<usize> {
        let hash = self.comparer.hash(key);
        let groups = &self.groups;
        let comparer = &self.comparer;
        self.index
            .find(hash, |slot| comparer.equals(&groups[slot].key, key))
    }

    /// Retrieves the grouping for `key`, creating an empty one when
    /// `create_if_missing` is set.
    pub fn get_grouping(&mut self, key: K, create_if_missing: bool) -> Option<&mut Grouping<K, V>> {
        match self.slot_of(&key) {
            Some(slot) => Some(&mut self.groups[slot]),
            None if create_if_missing => {
                let hash = self.comparer.hash(&key);
                let slot = self.groups.len();
                self.index.insert(hash, slot);
                self.groups.push(Grouping::new(key));
                Some(&mut self.groups[slot])
            }
            None => None,
        }
    }

    pub(crate) fn at(&self, slot: usize) -> &Grouping<K, V> {
        &self.groups[slot]
    }

    /// The grouping for `key`, if any.
    pub fn grouping(&self, key: &K) -> Option<&Grouping<K, V>> {
        self.slot_of(key).map(|slot| &self.groups[slot])
    }

    /// The values for `key`; empty when the key is absent.
    pub fn get(&self, key: &K) -> &[V] {
        self.grouping(key).map(Grouping::values).unwrap_or(&[])
    }

    /// Returns `true` if `key` has a grouping.
    pub fn contains_key(&self, key: &K) -> bool {
        self.slot_of(key).is_some()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns `true` if there are no keys.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterates groupings in first-seen key order.
    pub fn iter(&self) -> std::slice::Iter<'_, Grouping<K, V>> {
        self.groups.iter()
    }

    /// Consumes the lookup, returning its groupings in first-seen key order.
    pub fn into_groupings(self) -> Vec<Grouping<K, V>> {
        self.groups
    }
}

impl<'a, K, V> Default for Lookup<'a, K, V>
where
    K: std::hash::Hash + Eq,
{
    fn default() -> Self {
        Lookup::new(DefaultComparer::new())
    }
}

impl<'l, 'a, K, V> IntoIterator for &'l Lookup<'a, K, V> {
    type Item = &'l Grouping<K, V>;
    type IntoIter = std::slice::Iter<'l, Grouping<K, V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparer::IgnoreAsciiCase;

    #[test]
    fn buckets_preserve_insertion_order() {
        let lookup = Lookup::build(
            vec![(1, 'a'), (2, 'b'), (1, 'c'), (3, 'd'), (2, 'e')],
            |p| p.0,
            |p| p.1,
            DefaultComparer::new(),
        );

        let keys: Vec<i32> = lookup.iter().map(|g| *g.key()).collect();
        assert_eq!(keys, vec![1, 2, 3]);
        assert_eq!(lookup.get(&1), &['a', 'c']);
        assert_eq!(lookup.get(&2), &['b', 'e']);
        assert_eq!(lookup.get(&3), &['d']);
    }

    #[test]
    fn comparer_defines_identity() {
        let lookup = Lookup::build(
            vec!["Apple", "APPLE", "pear"],
            |s| s.to_string(),
            |s| s,
            IgnoreAsciiCase::new(),
        );

        assert_eq!(lookup.len(), 2);
        assert_eq!(lookup.get(&"apple".to_string()), &["Apple", "APPLE"]);
        // The first-seen spelling is kept as the key.
        assert_eq!(lookup.iter().next().map(|g| g.key().as_str()), Some("Apple"));
    }

    #[test]
    fn get_grouping_create_if_missing() {
        let mut lookup: Lookup<'_, &str, i32> = Lookup::default();
        assert!(lookup.get_grouping("x", false).is_none());

        if let Some(group) = lookup.get_grouping("x", true) {
            group.push(1);
        }
        if let Some(group) = lookup.get_grouping("x", false) {
            group.push(2);
        }

        assert_eq!(lookup.get(&"x"), &[1, 2]);
        assert!(lookup.contains_key(&"x"));
        assert!(!lookup.contains_key(&"y"));
    }

    #[test]
    fn colliding_hashes_stay_apart() {
        let comparer = crate::comparer::FnComparer::new(|_: &i32| 0u64, |a: &i32, b: &i32| a == b);
        let lookup = Lookup::build(vec![1, 2, 1], |n| *n, |n| n * 10, comparer);

        assert_eq!(lookup.len(), 2);
        assert_eq!(lookup.get(&1), &[10, 10]);
        assert_eq!(lookup.get(&2), &[20]);
    }

    #[test]
    fn key_set_insert_and_remove() {
        let mut set: KeySet<'_, i32> = KeySet::new(Rc::new(DefaultComparer::new()));
        assert!(set.insert(1));
        assert!(!set.insert(1));
        assert!(set.remove(&1));
        assert!(!set.remove(&1));
        assert!(set.insert(1));
        assert!(set.contains(&1));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn key_set_sweeps_tombstones() {
        let mut set: KeySet<'_, i32> = KeySet::new(Rc::new(DefaultComparer::new()));
        for n in 0..1_000 {
            set.insert(n);
            set.remove(&n);
        }
        assert_eq!(set.len(), 0);
        assert!(set.keys.len() <= 1);

        for n in 0..6 {
            set.insert(n);
        }
        for n in [0, 1, 3, 4] {
            set.remove(&n);
        }
        assert!(set.keys.len() <= 2 * set.len() + 1);
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![2, 5]);
        assert!(set.contains(&5));
        assert!(!set.contains(&3));
    }

    #[test]
    fn grouping_is_a_sequence() {
        let mut g = Grouping::new("k");
        g.push(3);
        g.push(1);

        assert_eq!(g.as_enumerable().count(), 2);
        assert_eq!(g.clone().into_enumerable().sum::<i32>(), 4);
        let collected: Vec<i32> = g.into_iter().collect();
        assert_eq!(collected, vec![3, 1]);
    }
}
