//! Ordering: sort direction, sort options and ordered sequences.
//!
//! Provides [`SortOptions`] for engine tuning and [`OrderedEnumerable`], the
//! only type that accepts tie-breaking criteria.
//!
//! Sorting is deferred to the first pull of an enumeration. Each enumeration
//! sorts independently and keeps its sorted buffer until it is dropped.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use crate::enumerable::Enumerable;
use crate::key::SortKey;
use crate::stage::{Cursor, Iter, Stage};

pub(crate) mod criterion;
pub(crate) mod engine;
pub(crate) mod radix;

use criterion::{KeyCriterion, SharedCriterion};

/// Direction of one sort criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) enum Dir {
    #[default]
    Asc,
    Desc,
}

impl Dir {
    pub(crate) fn is_desc(self) -> bool {
        self == Dir::Desc
    }

    /// Flips `ordering` for descending criteria.
    pub(crate) fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }
}

/// Tuning for the ordering engine.
///
/// # Example
///
/// ```
/// use seqlinq::{Enumerable, SortOptions};
///
/// let sorted = Enumerable::from_vec(vec![3u32, 1, 2])
///     .order()
///     .with_options(SortOptions::default().with_native_threshold(0))
///     .to_vec();
/// assert_eq!(sorted, vec![1, 2, 3]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOptions {
    /// Inputs shorter than this with a single criterion use the native
    /// comparison sort instead of the radix or key-column paths.
    pub native_threshold: usize,
}

impl SortOptions {
    /// Default small-input cutoff.
    pub const DEFAULT_NATIVE_THRESHOLD: usize = 32;

    /// Sets the small-input cutoff.
    pub fn with_native_threshold(mut self, threshold: usize) -> Self {
        self.native_threshold = threshold;
        self
    }
}

impl Default for SortOptions {
    fn default() -> Self {
        SortOptions {
            native_threshold: Self::DEFAULT_NATIVE_THRESHOLD,
        }
    }
}

// ============================================================================
// OrderedEnumerable
// ============================================================================

/// A sequence sorted by one or more criteria.
///
/// Returned by [`Enumerable::order_by`] and friends. It dereferences to an
/// [`Enumerable`], so every operator and terminal is available on it;
/// [`then_by`](Self::then_by) and [`then_by_descending`](Self::then_by_descending)
/// exist only here, which keeps tie-breakers off unordered sequences.
///
/// # Example
///
/// ```
/// use seqlinq::Enumerable;
///
/// let people = Enumerable::from_vec(vec![("ann", 31), ("bob", 25), ("cid", 31)]);
/// let names: Vec<&str> = people
///     .order_by_descending(|p| p.1)
///     .then_by(|p| p.0)
///     .select(|p| p.0)
///     .to_vec();
///
/// assert_eq!(names, vec!["ann", "cid", "bob"]);
/// ```
pub struct OrderedEnumerable<'a, T> {
    source: Enumerable<'a, T>,
    criteria: Vec<SharedCriterion<'a, T>>,
    options: SortOptions,
    sorted: Enumerable<'a, T>,
}

impl<'a, T: 'a> OrderedEnumerable<'a, T> {
    pub(crate) fn new<K, F>(source: Enumerable<'a, T>, key: F, dir: Dir) -> Self
    where
        K: SortKey + 'a,
        F: Fn(&T) -> K + 'a,
    {
        OrderedEnumerable::build(source, vec![criterion(key, dir)], SortOptions::default())
    }

    fn build(
        source: Enumerable<'a, T>,
        criteria: Vec<SharedCriterion<'a, T>>,
        options: SortOptions,
    ) -> Self {
        let sorted = Enumerable::from_stage(OrderStage {
            source: source.clone(),
            criteria: Rc::from(criteria.as_slice()),
            options,
        });
        OrderedEnumerable {
            source,
            criteria,
            options,
            sorted,
        }
    }

    fn push(self, criterion: SharedCriterion<'a, T>) -> Self {
        let OrderedEnumerable {
            source,
            mut criteria,
            options,
            ..
        } = self;
        criteria.push(criterion);
        OrderedEnumerable::build(source, criteria, options)
    }

    /// Adds an ascending tie-breaker.
    pub fn then_by<K, F>(self, key: F) -> Self
    where
        K: SortKey + 'a,
        F: Fn(&T) -> K + 'a,
    {
        self.push(criterion(key, Dir::Asc))
    }

    /// Adds a descending tie-breaker.
    pub fn then_by_descending<K, F>(self, key: F) -> Self
    where
        K: SortKey + 'a,
        F: Fn(&T) -> K + 'a,
    {
        self.push(criterion(key, Dir::Desc))
    }

    /// Replaces the engine options.
    pub fn with_options(self, options: SortOptions) -> Self {
        OrderedEnumerable::build(self.source, self.criteria, options)
    }

    /// The engine options in effect.
    pub fn options(&self) -> SortOptions {
        self.options
    }

    /// Number of sort criteria, the primary one included.
    pub fn criteria_len(&self) -> usize {
        self.criteria.len()
    }

    /// Drops the ability to add tie-breakers.
    pub fn into_enumerable(self) -> Enumerable<'a, T> {
        self.sorted
    }
}

fn criterion<'a, T: 'a, K, F>(key: F, dir: Dir) -> SharedCriterion<'a, T>
where
    K: SortKey + 'a,
    F: Fn(&T) -> K + 'a,
{
    Rc::new(KeyCriterion::new(Rc::new(key), dir))
}

impl<'a, T> Deref for OrderedEnumerable<'a, T> {
    type Target = Enumerable<'a, T>;

    fn deref(&self) -> &Enumerable<'a, T> {
        &self.sorted
    }
}

impl<'a, T> Clone for OrderedEnumerable<'a, T> {
    fn clone(&self) -> Self {
        OrderedEnumerable {
            source: self.source.clone(),
            criteria: self.criteria.clone(),
            options: self.options,
            sorted: self.sorted.clone(),
        }
    }
}

impl<'a, T> From<OrderedEnumerable<'a, T>> for Enumerable<'a, T> {
    fn from(ordered: OrderedEnumerable<'a, T>) -> Self {
        ordered.sorted
    }
}

impl<'s, 'a, T: 'a> IntoIterator for &'s OrderedEnumerable<'a, T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.sorted.iter()
    }
}

impl<'a, T> fmt::Debug for OrderedEnumerable<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedEnumerable")
            .field("criteria", &self.criteria.len())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// OrderStage
// ============================================================================

struct OrderStage<'a, T> {
    source: Enumerable<'a, T>,
    criteria: Rc<[SharedCriterion<'a, T>]>,
    options: SortOptions,
}

impl<'a, T: 'a> Stage<'a, T> for OrderStage<'a, T> {
    fn cursor(&self) -> Cursor<'a, T> {
        let mut pending = Some((self.source.clone(), Rc::clone(&self.criteria)));
        let options = self.options;
        let mut sorted: Option<std::vec::IntoIter<T>> = None;
        Box::new(std::iter::from_fn(move || {
            if let Some((source, criteria)) = pending.take() {
                let items: Vec<T> = source.iter().collect();
                sorted = Some(engine::sort(items, &criteria, &options).into_iter());
            }
            sorted.as_mut()?.next()
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn descending_flips_comparisons() {
        assert_eq!(Dir::Asc.apply(Ordering::Less), Ordering::Less);
        assert_eq!(Dir::Desc.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(Dir::Desc.apply(Ordering::Equal), Ordering::Equal);
        assert!(Dir::Desc.is_desc());
        assert!(!Dir::default().is_desc());
    }

    #[test]
    fn then_by_breaks_ties() {
        #[derive(Debug, Clone, PartialEq)]
        struct Row {
            a: u32,
            b: u32,
        }
        let rows = Enumerable::from_vec(vec![
            Row { a: 1, b: 2 },
            Row { a: 1, b: 1 },
            Row { a: 0, b: 9 },
        ]);

        let sorted = rows.order_by(|r| r.a).then_by(|r| r.b);
        assert_eq!(sorted.criteria_len(), 2);
        assert_eq!(
            sorted.to_vec(),
            vec![Row { a: 0, b: 9 }, Row { a: 1, b: 1 }, Row { a: 1, b: 2 }]
        );
    }

    #[test]
    fn sorting_waits_for_first_pull_and_reruns_per_enumeration() {
        let keys = Cell::new(0);
        let sorted = Enumerable::from_vec(vec![2, 3, 1]).order_by(|n| {
            keys.set(keys.get() + 1);
            *n
        });
        let sorted = sorted.with_options(SortOptions::default().with_native_threshold(0));

        assert_eq!(keys.get(), 0);
        let mut first = sorted.iter();
        assert_eq!(first.next(), Some(1));
        // The key column evaluates each key exactly once.
        assert_eq!(keys.get(), 3);
        assert_eq!(first.next(), Some(2));
        assert_eq!(keys.get(), 3);

        assert_eq!(sorted.to_vec(), vec![1, 2, 3]);
        assert_eq!(keys.get(), 6);
    }

    #[test]
    fn then_by_descending_and_element_order() {
        let words = Enumerable::from_vec(vec!["bb", "a", "cc", "d"]);
        let sorted = words.order_by(|w| w.len()).then_by_descending(|w| *w);
        assert_eq!(sorted.to_vec(), vec!["d", "a", "cc", "bb"]);

        assert_eq!(words.order().to_vec(), vec!["a", "bb", "cc", "d"]);
        assert_eq!(words.order_descending().to_vec(), vec!["d", "cc", "bb", "a"]);
    }

    #[test]
    fn empty_source_sorts_to_empty() {
        let sorted = Enumerable::<u32>::empty().order_by(|n| *n);
        assert!(sorted.to_vec().is_empty());
    }

    #[test]
    fn ordered_sequence_composes() {
        let sorted = Enumerable::from_vec(vec![5, 3, 9, 1])
            .order_by_descending(|n| *n)
            .into_enumerable()
            .take(2);
        assert_eq!(sorted.to_vec(), vec![9, 5]);

        let mut seen = Vec::new();
        for n in &Enumerable::from_vec(vec![2, 1]).order_by(|n| *n) {
            seen.push(n);
        }
        assert_eq!(seen, vec![1, 2]);
    }
}
