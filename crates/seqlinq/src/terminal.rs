//! Terminal operations: materialization, element access, quantifiers and
//! aggregates.
//!
//! Each call runs one full enumeration (or as much as it needs) and returns
//! a plain value. Random-access pipelines answer `count`, `element_at`,
//! `last` and `any` without iterating.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::hash::Hash;
use std::iter::Sum;
use std::rc::Rc;

use num_traits::ToPrimitive;

use crate::collections::Dictionary;
use crate::comparer::{DefaultComparer, EqualityComparer};
use crate::enumerable::Enumerable;
use crate::error::{LinqError, Result};
use crate::key::SortKey;
use crate::lookup::Lookup;

impl<'a, T: 'a> Enumerable<'a, T> {
    // ------------------------------------------------------------------------
    // Materialization
    // ------------------------------------------------------------------------

    /// Collects every element.
    pub fn to_vec(&self) -> Vec<T> {
        match self.stage().known_len() {
            Some(len) => {
                let mut items = Vec::with_capacity(len);
                items.extend(self.iter());
                items
            }
            None => self.iter().collect(),
        }
    }

    /// Buckets elements by `key`.
    pub fn to_lookup<K, F>(&self, key: F) -> Lookup<'a, K, T>
    where
        K: Hash + Eq + 'a,
        F: Fn(&T) -> K,
    {
        Lookup::build(self.iter(), key, |item| item, DefaultComparer::new())
    }

    /// Buckets `element(x)` by `key(x)` under `comparer`.
    pub fn to_lookup_with<K, V, KF, EF, C>(&self, key: KF, element: EF, comparer: C) -> Lookup<'a, K, V>
    where
        KF: Fn(&T) -> K,
        EF: Fn(T) -> V,
        C: EqualityComparer<K> + 'a,
    {
        Lookup::build(self.iter(), key, element, comparer)
    }

    /// Builds a dictionary; fails on the first duplicate key.
    pub fn to_dictionary<K, V, KF, VF>(&self, key: KF, value: VF) -> Result<Dictionary<'a, K, V>>
    where
        K: Hash + Eq + 'a,
        KF: Fn(&T) -> K,
        VF: Fn(T) -> V,
    {
        self.to_dictionary_with(key, value, DefaultComparer::new())
    }

    /// [`to_dictionary`](Self::to_dictionary) with keys matched by `comparer`.
    pub fn to_dictionary_with<K, V, KF, VF, C>(
        &self,
        key: KF,
        value: VF,
        comparer: C,
    ) -> Result<Dictionary<'a, K, V>>
    where
        KF: Fn(&T) -> K,
        VF: Fn(T) -> V,
        C: EqualityComparer<K> + 'a,
    {
        let mut dict = Dictionary::with_shared(Rc::new(comparer));
        for item in self.iter() {
            let k = key(&item);
            dict.add(k, value(item))?;
        }
        Ok(dict)
    }

    /// Collects into a [`HashSet`].
    pub fn to_hash_set(&self) -> HashSet<T>
    where
        T: Hash + Eq,
    {
        self.iter().collect()
    }

    /// Collects into a [`crate::HashSet`] whose identity comes from
    /// `comparer`; the first of several equal elements is kept.
    pub fn to_hash_set_with<C>(&self, comparer: C) -> crate::HashSet<'a, T>
    where
        C: EqualityComparer<T> + 'a,
    {
        let mut set = crate::HashSet::with_shared(Rc::new(comparer));
        for item in self.iter() {
            set.add(item);
        }
        set
    }

    // ------------------------------------------------------------------------
    // Element access
    // ------------------------------------------------------------------------

    /// The element at `index`.
    pub fn element_at(&self, index: usize) -> Result<T> {
        if let Some(len) = self.stage().known_len() {
            if index >= len {
                return Err(LinqError::out_of_range(index, len));
            }
            return self
                .stage()
                .get_at(index)
                .ok_or(LinqError::out_of_range(index, len));
        }
        let mut seen = 0;
        for item in self.iter() {
            if seen == index {
                return Ok(item);
            }
            seen += 1;
        }
        Err(LinqError::out_of_range(index, seen))
    }

    /// The element at `index`, or `T::default()` past the end.
    pub fn element_at_or_default(&self, index: usize) -> T
    where
        T: Default,
    {
        self.element_at(index).unwrap_or_default()
    }

    /// The first element.
    pub fn first(&self) -> Result<T> {
        self.iter().next().ok_or(LinqError::SequenceEmpty)
    }

    /// The first element satisfying `predicate`.
    pub fn first_where<F>(&self, predicate: F) -> Result<T>
    where
        F: Fn(&T) -> bool,
    {
        self.iter().find(|item| predicate(item)).ok_or(LinqError::NoMatch)
    }

    /// The first element, or `T::default()` when empty.
    pub fn first_or_default(&self) -> T
    where
        T: Default,
    {
        self.iter().next().unwrap_or_default()
    }

    /// The first match, or `T::default()` when nothing matches.
    pub fn first_where_or_default<F>(&self, predicate: F) -> T
    where
        T: Default,
        F: Fn(&T) -> bool,
    {
        self.iter().find(|item| predicate(item)).unwrap_or_default()
    }

    /// The last element.
    pub fn last(&self) -> Result<T> {
        if let Some(len) = self.stage().known_len() {
            let index = len.checked_sub(1).ok_or(LinqError::SequenceEmpty)?;
            return self.stage().get_at(index).ok_or(LinqError::SequenceEmpty);
        }
        self.iter().last().ok_or(LinqError::SequenceEmpty)
    }

    /// The last element satisfying `predicate`.
    pub fn last_where<F>(&self, predicate: F) -> Result<T>
    where
        F: Fn(&T) -> bool,
    {
        self.iter()
            .filter(|item| predicate(item))
            .last()
            .ok_or(LinqError::NoMatch)
    }

    /// The last element, or `T::default()` when empty.
    pub fn last_or_default(&self) -> T
    where
        T: Default,
    {
        self.last().unwrap_or_default()
    }

    /// The last match, or `T::default()` when nothing matches.
    pub fn last_where_or_default<F>(&self, predicate: F) -> T
    where
        T: Default,
        F: Fn(&T) -> bool,
    {
        self.last_where(predicate).unwrap_or_default()
    }

    /// The only element. Fails if there are none or more than one.
    pub fn single(&self) -> Result<T> {
        let mut iter = self.iter();
        let item = iter.next().ok_or(LinqError::SequenceEmpty)?;
        match iter.next() {
            Some(_) => Err(LinqError::MoreThanOne),
            None => Ok(item),
        }
    }

    /// The only element satisfying `predicate`.
    pub fn single_where<F>(&self, predicate: F) -> Result<T>
    where
        F: Fn(&T) -> bool,
    {
        self.single_match(predicate)?.ok_or(LinqError::NoMatch)
    }

    /// The only element, or `T::default()` if there are none. More than one
    /// is still an error.
    pub fn single_or_default(&self) -> Result<T>
    where
        T: Default,
    {
        Ok(self.single_match(|_| true)?.unwrap_or_default())
    }

    /// The only match, `T::default()` when none match, or
    /// [`LinqError::MoreThanOne`].
    pub fn single_where_or_default<F>(&self, predicate: F) -> Result<T>
    where
        T: Default,
        F: Fn(&T) -> bool,
    {
        Ok(self.single_match(predicate)?.unwrap_or_default())
    }

    /// Stops at the second match.
    fn single_match<F>(&self, predicate: F) -> Result<Option<T>>
    where
        F: Fn(&T) -> bool,
    {
        let mut matches = self.iter().filter(|item| predicate(item));
        let found = matches.next();
        if found.is_some() && matches.next().is_some() {
            return Err(LinqError::MoreThanOne);
        }
        Ok(found)
    }

    // ------------------------------------------------------------------------
    // Quantifiers
    // ------------------------------------------------------------------------

    /// Number of elements.
    pub fn count(&self) -> usize {
        match self.stage().known_len() {
            Some(len) => len,
            None => self.iter().count(),
        }
    }

    /// Number of elements satisfying `predicate`.
    pub fn count_where<F>(&self, predicate: F) -> usize
    where
        F: Fn(&T) -> bool,
    {
        self.iter().filter(|item| predicate(item)).count()
    }

    /// Whether there is at least one element.
    pub fn any(&self) -> bool {
        match self.stage().known_len() {
            Some(len) => len > 0,
            None => self.iter().next().is_some(),
        }
    }

    /// Whether any element satisfies `predicate`.
    pub fn any_where<F>(&self, predicate: F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        self.iter().any(|item| predicate(&item))
    }

    /// Whether every element satisfies `predicate`. True when empty.
    pub fn all<F>(&self, predicate: F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        self.iter().all(|item| predicate(&item))
    }

    /// Whether an element equals `value`.
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.iter().any(|item| item == *value)
    }

    /// Whether an element equals `value` under `comparer`.
    pub fn contains_with<C>(&self, value: &T, comparer: C) -> bool
    where
        C: EqualityComparer<T>,
    {
        self.iter().any(|item| comparer.equals(&item, value))
    }

    /// Element-wise equality with `other`, lengths included.
    pub fn sequence_equal(&self, other: &Self) -> bool
    where
        T: PartialEq,
    {
        self.iter().eq(other.iter())
    }

    /// Pairwise equality under `comparer`, including equal length.
    pub fn sequence_equal_with<C>(&self, other: &Self, comparer: C) -> bool
    where
        C: EqualityComparer<T>,
    {
        let mut left = self.iter();
        let mut right = other.iter();
        loop {
            match (left.next(), right.next()) {
                (None, None) => return true,
                (Some(a), Some(b)) if comparer.equals(&a, &b) => {}
                _ => return false,
            }
        }
    }

    // ------------------------------------------------------------------------
    // Aggregates
    // ------------------------------------------------------------------------

    /// Sum of the elements; zero when empty.
    pub fn sum<S>(&self) -> S
    where
        S: Sum<T>,
    {
        self.iter().sum()
    }

    /// Sum of `selector(x)`.
    pub fn sum_by<S, F>(&self, selector: F) -> S
    where
        S: Sum<S>,
        F: Fn(T) -> S,
    {
        self.iter().map(selector).sum()
    }

    /// Arithmetic mean as `f64`.
    pub fn average(&self) -> Result<f64>
    where
        T: ToPrimitive,
    {
        mean(self.iter())
    }

    /// Arithmetic mean of `selector(x)` as `f64`.
    pub fn average_by<N, F>(&self, selector: F) -> Result<f64>
    where
        N: ToPrimitive,
        F: Fn(T) -> N,
    {
        mean(self.iter().map(selector))
    }

    /// Smallest element; the first of equal minima.
    pub fn min(&self) -> Result<T>
    where
        T: SortKey,
    {
        extreme(self.iter(), |item| item, Ordering::Less)
    }

    /// Largest element; the first of equal maxima.
    pub fn max(&self) -> Result<T>
    where
        T: SortKey,
    {
        extreme(self.iter(), |item| item, Ordering::Greater)
    }

    /// Smallest projected value.
    pub fn min_by<K, F>(&self, selector: F) -> Result<K>
    where
        K: SortKey,
        F: Fn(T) -> K,
    {
        extreme(self.iter().map(selector), |k| k, Ordering::Less)
    }

    /// Largest projected value.
    pub fn max_by<K, F>(&self, selector: F) -> Result<K>
    where
        K: SortKey,
        F: Fn(T) -> K,
    {
        extreme(self.iter().map(selector), |k| k, Ordering::Greater)
    }

    /// Element with the smallest key; the first of equal minima.
    pub fn min_by_key<K, F>(&self, key: F) -> Result<T>
    where
        K: SortKey,
        F: Fn(&T) -> K,
    {
        extreme(self.iter().map(|item| (key(&item), item)), |p| &p.0, Ordering::Less)
            .map(|(_, item)| item)
    }

    /// Element with the largest key; the first of equal maxima.
    pub fn max_by_key<K, F>(&self, key: F) -> Result<T>
    where
        K: SortKey,
        F: Fn(&T) -> K,
    {
        extreme(self.iter().map(|item| (key(&item), item)), |p| &p.0, Ordering::Greater)
            .map(|(_, item)| item)
    }

    /// Left fold from `seed`.
    pub fn aggregate<A, F>(&self, seed: A, func: F) -> A
    where
        F: Fn(A, T) -> A,
    {
        self.iter().fold(seed, func)
    }

    /// Left fold from `seed`, then `result` applied to the accumulator.
    pub fn aggregate_with_result<A, R, F, RF>(&self, seed: A, func: F, result: RF) -> R
    where
        F: Fn(A, T) -> A,
        RF: FnOnce(A) -> R,
    {
        result(self.aggregate(seed, func))
    }

    /// Left fold seeded with the first element.
    pub fn reduce<F>(&self, func: F) -> Result<T>
    where
        F: Fn(T, T) -> T,
    {
        self.iter().reduce(func).ok_or(LinqError::SequenceEmpty)
    }

    /// Calls `action` on every element.
    pub fn for_each<F>(&self, action: F)
    where
        F: FnMut(T),
    {
        self.iter().for_each(action);
    }
}

/// Keeps the first item whose key compares `wanted` against every earlier best.
fn extreme<I, K, P>(items: I, key: P, wanted: Ordering) -> Result<I::Item>
where
    I: Iterator,
    K: SortKey + ?Sized,
    P: Fn(&I::Item) -> &K,
{
    let mut items = items;
    let mut best = items.next().ok_or(LinqError::SequenceEmpty)?;
    for item in items {
        if key(&item).compare_key(key(&best)) == wanted {
            best = item;
        }
    }
    Ok(best)
}

fn mean<N: ToPrimitive>(values: impl Iterator<Item = N>) -> Result<f64> {
    let mut total = 0.0;
    let mut count = 0usize;
    for value in values {
        total += value
            .to_f64()
            .ok_or_else(|| LinqError::invalid("value is not representable as f64"))?;
        count += 1;
    }
    if count == 0 {
        return Err(LinqError::SequenceEmpty);
    }
    Ok(total / count as f64)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use crate::comparer::IgnoreAsciiCase;
    use crate::enumerable::Enumerable;
    use crate::error::LinqError;

    fn lazy(items: Vec<i32>) -> Enumerable<'static, i32> {
        Enumerable::from_fn(move || items.clone())
    }

    #[test]
    fn first_last_single() {
        let seq = lazy(vec![4, 5, 6]);
        assert_eq!(seq.first(), Ok(4));
        assert_eq!(seq.last(), Ok(6));
        assert_eq!(seq.single(), Err(LinqError::MoreThanOne));
        assert_eq!(seq.single_where(|n| *n == 5), Ok(5));
        assert_eq!(seq.single_where(|n| *n > 9), Err(LinqError::NoMatch));
        assert_eq!(seq.first_where(|n| *n > 4), Ok(5));
        assert_eq!(seq.last_where(|n| *n < 6), Ok(5));
        assert_eq!(seq.first_where(|n| *n > 9), Err(LinqError::NoMatch));

        let empty = lazy(vec![]);
        assert_eq!(empty.first(), Err(LinqError::SequenceEmpty));
        assert_eq!(empty.last(), Err(LinqError::SequenceEmpty));
        assert_eq!(empty.single(), Err(LinqError::SequenceEmpty));
        assert_eq!(empty.first_or_default(), 0);
        assert_eq!(empty.single_or_default(), Ok(0));
        assert_eq!(seq.single_or_default(), Err(LinqError::MoreThanOne));
        assert_eq!(seq.last_where_or_default(|n| *n > 9), 0);
        assert_eq!(seq.first_where_or_default(|n| *n > 5), 6);
        assert_eq!(seq.single_where_or_default(|n| *n > 9), Ok(0));
    }

    #[test]
    fn last_on_empty_array_source() {
        assert_eq!(Enumerable::<i32>::from_vec(vec![]).last(), Err(LinqError::SequenceEmpty));
        assert_eq!(Enumerable::from_vec(vec![1, 2]).last_or_default(), 2);
    }

    #[test]
    fn element_at_both_paths() {
        let array = Enumerable::from_vec(vec![1, 2, 3]);
        assert_eq!(array.element_at(1), Ok(2));
        assert_eq!(array.element_at(3), Err(LinqError::out_of_range(3, 3)));

        let streamed = lazy(vec![1, 2, 3]);
        assert_eq!(streamed.element_at(2), Ok(3));
        assert_eq!(streamed.element_at(7), Err(LinqError::out_of_range(7, 3)));
        assert_eq!(streamed.element_at_or_default(7), 0);
    }

    #[test]
    fn single_stops_at_second_match() {
        let pulled = Cell::new(0);
        let seq = Enumerable::from_fn(|| 0..).select(|n: i32| {
            pulled.set(pulled.get() + 1);
            n
        });

        assert_eq!(seq.single(), Err(LinqError::MoreThanOne));
        assert_eq!(pulled.get(), 2);
    }

    #[test]
    fn quantifiers() {
        let seq = lazy(vec![2, 4, 6]);
        assert!(seq.any());
        assert!(!lazy(vec![]).any());
        assert!(seq.any_where(|n| *n > 5));
        assert!(seq.all(|n| n % 2 == 0));
        assert!(lazy(vec![]).all(|_| false));
        assert!(seq.contains(&4));
        assert!(!seq.contains(&5));
        assert_eq!(seq.count_where(|n| *n > 2), 2);
        assert_eq!(seq.count(), 3);
    }

    #[test]
    fn to_hash_set_with_keeps_first_equal() {
        let words = Enumerable::from_vec(vec!["Tea", "tea", "Milk", "TEA"]);
        let set = words.to_hash_set_with(IgnoreAsciiCase::new());
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec!["Tea", "Milk"]);
    }

    #[test]
    fn contains_with_comparer() {
        let words = Enumerable::from_vec(vec!["Alpha", "Beta"]);
        assert!(words.contains_with(&"beta", IgnoreAsciiCase::new()));
        assert!(!words.contains(&"beta"));
    }

    #[test]
    fn sums_and_averages() {
        let seq = lazy(vec![1, 2, 3, 4]);
        assert_eq!(seq.sum::<i32>(), 10);
        assert_eq!(seq.sum_by(|n| n as f64 * 0.5), 5.0);
        assert_eq!(seq.average(), Ok(2.5));
        assert_eq!(seq.average_by(|n| n * 2), Ok(5.0));
        assert_eq!(lazy(vec![]).average(), Err(LinqError::SequenceEmpty));
        assert_eq!(lazy(vec![]).sum::<i32>(), 0);
    }

    #[test]
    fn min_max_keep_first_of_ties() {
        let people = Enumerable::from_vec(vec![("ann", 30), ("bob", 25), ("cid", 30), ("dan", 25)]);
        assert_eq!(people.min_by_key(|p| p.1), Ok(("bob", 25)));
        assert_eq!(people.max_by_key(|p| p.1), Ok(("ann", 30)));
        assert_eq!(people.min_by(|p| p.1), Ok(25));
        assert_eq!(people.max_by(|p| p.0), Ok("dan"));

        let nums = lazy(vec![3, -1, 7]);
        assert_eq!(nums.min(), Ok(-1));
        assert_eq!(nums.max(), Ok(7));
        assert_eq!(lazy(vec![]).max(), Err(LinqError::SequenceEmpty));
    }

    #[test]
    fn folds() {
        let seq = lazy(vec![1, 2, 3]);
        assert_eq!(seq.aggregate(10, |acc, n| acc + n), 16);
        assert_eq!(
            seq.aggregate_with_result(String::new(), |acc, n| acc + &n.to_string(), |s| s.len()),
            3
        );
        assert_eq!(seq.reduce(|a, b| a * b), Ok(6));
        assert_eq!(lazy(vec![]).reduce(|a, b| a + b), Err(LinqError::SequenceEmpty));

        let mut seen = Vec::new();
        seq.for_each(|n| seen.push(n));
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn sequence_equality() {
        let a = lazy(vec![1, 2]);
        assert!(a.sequence_equal(&Enumerable::from_vec(vec![1, 2])));
        assert!(!a.sequence_equal(&lazy(vec![1, 2, 3])));
        assert!(!a.sequence_equal(&lazy(vec![1])));

        let words = Enumerable::from_vec(vec!["A", "b"]);
        assert!(words.sequence_equal_with(&Enumerable::from_vec(vec!["a", "B"]), IgnoreAsciiCase::new()));
    }

    #[test]
    fn collections() {
        let seq = Enumerable::from_vec(vec!["apple", "avocado", "banana"]);

        let lookup = seq.to_lookup(|s| s.len());
        assert_eq!(lookup.get(&6), &["banana"]);

        let dict = seq.to_dictionary(|s| s.to_string(), |s| s.len()).unwrap();
        assert_eq!(dict.get(&"avocado".to_string()), Some(&7));

        let dup = seq.to_dictionary(|s| s.chars().next(), |s| s);
        assert!(matches!(dup, Err(LinqError::InvalidOperation(_))));

        let set = Enumerable::from_vec(vec![1, 1, 2]).to_hash_set();
        assert_eq!(set.len(), 2);

        let upper = seq.to_lookup_with(|s| s.len(), |s| s.to_uppercase(), crate::DefaultComparer::new());
        assert_eq!(upper.get(&5), &["APPLE".to_string()]);
    }
}
