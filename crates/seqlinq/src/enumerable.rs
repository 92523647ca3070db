//! The [`Enumerable`] pipeline handle and its chainable operators.
//!
//! Every operator method takes `&self`, builds one new stage holding a clone
//! of this handle plus the operator's parameters, and returns immediately.
//! Nothing is read from the source until the result is enumerated.

use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use crate::comparer::{DefaultComparer, EqualityComparer};
use crate::error::{LinqError, Result};
use crate::key::SortKey;
use crate::lookup::{Grouping, SharedComparer};
use crate::ops::concat::{ConcatStage, DefaultIfEmptyStage};
use crate::ops::filter::{self, Predicate};
use crate::ops::flatten::{SelectManyStage, SelectManyWithStage};
use crate::ops::group::GroupByStage;
use crate::ops::join::{GroupJoinStage, JoinKeys, JoinStage};
use crate::ops::partition::{ReverseStage, SkipStage, SkipWhileStage, TakeStage, TakeWhileStage};
use crate::ops::project::{self, Selector};
use crate::ops::set::{SetOp, SetStage};
use crate::ops::zip::ZipStage;
use crate::order::{Dir, OrderedEnumerable};
use crate::source::{EmptyStage, FnStage, RangeStage, RepeatStage, SliceStage, VecStage};
use crate::stage::{Cursor, Enumerator, Iter, Stage};

/// A lazy, restartable query pipeline over elements of type `T`.
///
/// Cloning is cheap and yields a handle to the same pipeline. Every
/// enumeration (`iter`, `for x in &seq`, any terminal method) starts from the
/// beginning with its own iteration state, so two enumerations of the same
/// pipeline never interfere, even when interleaved.
///
/// # Example
///
/// ```
/// use seqlinq::Enumerable;
///
/// let evens = Enumerable::range(1, 10)?
///     .filter(|n| n % 2 == 0)
///     .select(|n| n * n);
///
/// assert_eq!(evens.to_vec(), vec![4, 16, 36, 64, 100]);
/// // A second enumeration restarts from the source.
/// assert_eq!(evens.first(), Ok(4));
/// # Ok::<(), seqlinq::LinqError>(())
/// ```
pub struct Enumerable<'a, T> {
    stage: Rc<dyn Stage<'a, T> + 'a>,
}

impl<'a, T> Clone for Enumerable<'a, T> {
    fn clone(&self) -> Self {
        Enumerable {
            stage: Rc::clone(&self.stage),
        }
    }
}

impl<'a, T> fmt::Debug for Enumerable<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Enumerable")
            .field("known_len", &self.stage.known_len())
            .finish_non_exhaustive()
    }
}

fn shared<'a, K, C: EqualityComparer<K> + 'a>(comparer: C) -> SharedComparer<'a, K> {
    Rc::new(comparer)
}

// ============================================================================
// Core plumbing and sources
// ============================================================================

impl<'a, T: 'a> Enumerable<'a, T> {
    pub(crate) fn from_stage(stage: impl Stage<'a, T> + 'a) -> Self {
        Enumerable {
            stage: Rc::new(stage),
        }
    }

    pub(crate) fn stage(&self) -> &(dyn Stage<'a, T> + 'a) {
        &*self.stage
    }

    pub(crate) fn cursor(&self) -> Cursor<'a, T> {
        self.stage.cursor()
    }

    /// Starts a new enumeration.
    pub fn iter(&self) -> Iter<'a, T> {
        Iter::new(self.cursor())
    }

    /// Starts a new enumeration driven by explicit `move_next` / `current` calls.
    pub fn enumerator(&self) -> Enumerator<'a, T> {
        Enumerator::new(self.cursor())
    }

    /// A pipeline over an owned vector. The vector is shared by every
    /// enumeration and elements are yielded as clones.
    pub fn from_vec(items: Vec<T>) -> Self
    where
        T: Clone,
    {
        Enumerable::from_stage(VecStage::new(items))
    }

    /// A pipeline over whatever `factory` returns. The factory is called once
    /// per enumeration, on the first pull.
    ///
    /// # Example
    ///
    /// ```
    /// use seqlinq::Enumerable;
    ///
    /// let naturals = Enumerable::from_fn(|| 1u64..);
    /// assert_eq!(naturals.skip(2).take(3).to_vec(), vec![3, 4, 5]);
    /// ```
    pub fn from_fn<I, F>(factory: F) -> Self
    where
        F: Fn() -> I + 'a,
        I: IntoIterator<Item = T>,
        I::IntoIter: 'a,
    {
        Enumerable::from_stage(FnStage::new(factory))
    }

    /// `value`, `count` times.
    pub fn repeat(value: T, count: usize) -> Self
    where
        T: Clone,
    {
        Enumerable::from_stage(RepeatStage::new(value, count))
    }

    /// A pipeline with no elements.
    pub fn empty() -> Self {
        Enumerable::from_stage(EmptyStage::<T>::new())
    }
}

impl<'a, T: 'a> Enumerable<'a, &'a T> {
    /// A pipeline over a borrowed slice, yielding references.
    pub fn from_slice(items: &'a [T]) -> Self {
        Enumerable::from_stage(SliceStage::new(items))
    }
}

impl<'a> Enumerable<'a, i64> {
    /// `count` consecutive integers starting at `start`.
    ///
    /// Fails with [`LinqError::ArgumentOutOfRange`] when the last value would
    /// exceed `i64::MAX`.
    pub fn range(start: i64, count: usize) -> Result<Self> {
        let fits = match count.checked_sub(1) {
            None => true,
            Some(last) => i64::try_from(last)
                .ok()
                .and_then(|offset| start.checked_add(offset))
                .is_some(),
        };
        if !fits {
            return Err(LinqError::argument(format!(
                "range of {count} values starting at {start} overflows i64"
            )));
        }
        Ok(Enumerable::from_stage(RangeStage::new(start, count)))
    }
}

impl<'a, T: 'a> IntoIterator for &Enumerable<'a, T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T: 'a> IntoIterator for Enumerable<'a, T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T: Clone + 'a> From<Vec<T>> for Enumerable<'a, T> {
    fn from(items: Vec<T>) -> Self {
        Enumerable::from_vec(items)
    }
}

impl<'a, T: Clone + 'a> FromIterator<T> for Enumerable<'a, T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Enumerable::from_vec(iter.into_iter().collect())
    }
}

// ============================================================================
// Operators
// ============================================================================

impl<'a, T: 'a> Enumerable<'a, T> {
    /// Elements for which `predicate` holds.
    pub fn filter<F>(&self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + 'a,
    {
        filter::filter(self, Predicate::Plain(Rc::new(predicate)))
    }

    /// Elements for which `predicate(element, index)` holds, where `index`
    /// is the position in this sequence.
    pub fn filter_indexed<F>(&self, predicate: F) -> Self
    where
        F: Fn(&T, usize) -> bool + 'a,
    {
        filter::filter(self, Predicate::Indexed(Rc::new(predicate)))
    }

    /// Projects each element.
    pub fn select<U: 'a, F>(&self, selector: F) -> Enumerable<'a, U>
    where
        F: Fn(T) -> U + 'a,
    {
        project::select(self, Selector::Plain(Rc::new(selector)))
    }

    /// Projects each element together with its position.
    pub fn select_indexed<U: 'a, F>(&self, selector: F) -> Enumerable<'a, U>
    where
        F: Fn(T, usize) -> U + 'a,
    {
        project::select(self, Selector::Indexed(Rc::new(selector)))
    }

    /// Projects each element to an iterable and flattens the results.
    pub fn select_many<U: 'a, I, F>(&self, selector: F) -> Enumerable<'a, U>
    where
        F: Fn(T) -> I + 'a,
        I: IntoIterator<Item = U>,
        I::IntoIter: 'a,
    {
        let expand = move |item: T| -> Cursor<'a, U> { Box::new(selector(item).into_iter()) };
        Enumerable::from_stage(SelectManyStage::new(self.clone(), Rc::new(expand)))
    }

    /// Flattens `collection(element)` and combines each inner value with its
    /// originating element through `result`.
    pub fn select_many_with<C: 'a, R: 'a, I, CF, RF>(
        &self,
        collection: CF,
        result: RF,
    ) -> Enumerable<'a, R>
    where
        CF: Fn(&T) -> I + 'a,
        I: IntoIterator<Item = C>,
        I::IntoIter: 'a,
        RF: Fn(&T, C) -> R + 'a,
    {
        let expand = move |item: &T| -> Cursor<'a, C> { Box::new(collection(item).into_iter()) };
        Enumerable::from_stage(SelectManyWithStage::new(
            self.clone(),
            Rc::new(expand),
            Rc::new(result),
        ))
    }

    // ------------------------------------------------------------------------
    // Set operators
    // ------------------------------------------------------------------------

    /// Elements with duplicates removed, keeping first occurrences.
    pub fn distinct(&self) -> Self
    where
        T: Clone + Hash + Eq,
    {
        self.distinct_with(DefaultComparer::new())
    }

    /// Elements whose `key` was not seen before.
    pub fn distinct_by<K, F>(&self, key: F) -> Self
    where
        K: Hash + Eq + 'a,
        F: Fn(&T) -> K + 'a,
    {
        Enumerable::from_stage(SetStage::distinct(
            self.clone(),
            Rc::new(key),
            shared(DefaultComparer::new()),
        ))
    }

    /// Distinct elements under `comparer`.
    pub fn distinct_with<C>(&self, comparer: C) -> Self
    where
        T: Clone,
        C: EqualityComparer<T> + 'a,
    {
        Enumerable::from_stage(SetStage::distinct(
            self.clone(),
            Rc::new(T::clone),
            shared(comparer),
        ))
    }

    /// Distinct elements of this sequence followed by those of `other`.
    pub fn union(&self, other: &Self) -> Self
    where
        T: Clone + Hash + Eq,
    {
        self.union_with(other, DefaultComparer::new())
    }

    /// [`union`](Self::union) under `comparer`.
    pub fn union_with<C>(&self, other: &Self, comparer: C) -> Self
    where
        T: Clone,
        C: EqualityComparer<T> + 'a,
    {
        self.set_op(SetOp::Union, other, comparer)
    }

    /// Distinct elements of this sequence that also occur in `other`.
    pub fn intersect(&self, other: &Self) -> Self
    where
        T: Clone + Hash + Eq,
    {
        self.intersect_with(other, DefaultComparer::new())
    }

    /// [`intersect`](Self::intersect) under `comparer`.
    pub fn intersect_with<C>(&self, other: &Self, comparer: C) -> Self
    where
        T: Clone,
        C: EqualityComparer<T> + 'a,
    {
        self.set_op(SetOp::Intersect, other, comparer)
    }

    /// Distinct elements of this sequence that do not occur in `other`.
    pub fn except(&self, other: &Self) -> Self
    where
        T: Clone + Hash + Eq,
    {
        self.except_with(other, DefaultComparer::new())
    }

    /// [`except`](Self::except) under `comparer`.
    pub fn except_with<C>(&self, other: &Self, comparer: C) -> Self
    where
        T: Clone,
        C: EqualityComparer<T> + 'a,
    {
        self.set_op(SetOp::Except, other, comparer)
    }

    fn set_op<C>(&self, op: SetOp, other: &Self, comparer: C) -> Self
    where
        T: Clone,
        C: EqualityComparer<T> + 'a,
    {
        Enumerable::from_stage(SetStage::binary(
            op,
            self.clone(),
            other.clone(),
            Rc::new(T::clone),
            shared(comparer),
        ))
    }

    // ------------------------------------------------------------------------
    // Concatenation
    // ------------------------------------------------------------------------

    /// This sequence followed by `other`.
    pub fn concat(&self, other: &Self) -> Self {
        Enumerable::from_stage(ConcatStage::new(vec![self.clone(), other.clone()]))
    }

    /// This sequence followed by each of `others` in turn.
    pub fn concat_all<I>(&self, others: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let parts = std::iter::once(self.clone()).chain(others).collect();
        Enumerable::from_stage(ConcatStage::new(parts))
    }

    /// This sequence followed by `value`.
    pub fn append(&self, value: T) -> Self
    where
        T: Clone,
    {
        self.concat(&Enumerable::repeat(value, 1))
    }

    /// `value` followed by this sequence.
    pub fn prepend(&self, value: T) -> Self
    where
        T: Clone,
    {
        Enumerable::repeat(value, 1).concat(self)
    }

    /// This sequence, or just `value` if it is empty.
    pub fn default_if_empty(&self, value: T) -> Self
    where
        T: Clone,
    {
        Enumerable::from_stage(DefaultIfEmptyStage::new(self.clone(), value))
    }

    /// Pairs elements by position until either side runs out.
    pub fn zip<U: 'a, R: 'a, F>(&self, other: &Enumerable<'a, U>, combine: F) -> Enumerable<'a, R>
    where
        F: Fn(T, U) -> R + 'a,
    {
        Enumerable::from_stage(ZipStage::new(self.clone(), other.clone(), Rc::new(combine)))
    }

    // ------------------------------------------------------------------------
    // Join and grouping
    // ------------------------------------------------------------------------

    /// Inner equi-join: one `result(outer, inner)` per matching pair, in outer
    /// order and then inner order.
    ///
    /// # Example
    ///
    /// ```
    /// use seqlinq::Enumerable;
    ///
    /// let owners = Enumerable::from_vec(vec![(1, "ann"), (2, "bob")]);
    /// let pets = Enumerable::from_vec(vec![("rex", 2), ("tom", 1), ("kit", 2)]);
    ///
    /// let pairs = owners
    ///     .join(&pets, |o| o.0, |p| p.1, |o, p| format!("{}:{}", o.1, p.0))
    ///     .to_vec();
    /// assert_eq!(pairs, vec!["ann:tom", "bob:rex", "bob:kit"]);
    /// ```
    pub fn join<I: 'a, K, R: 'a, OK, IK, RF>(
        &self,
        inner: &Enumerable<'a, I>,
        outer_key: OK,
        inner_key: IK,
        result: RF,
    ) -> Enumerable<'a, R>
    where
        K: Hash + Eq + 'a,
        OK: Fn(&T) -> K + 'a,
        IK: Fn(&I) -> K + 'a,
        RF: Fn(&T, &I) -> R + 'a,
    {
        self.join_with(inner, outer_key, inner_key, result, DefaultComparer::new())
    }

    /// [`join`](Self::join) with keys matched by `comparer`.
    pub fn join_with<I: 'a, K: 'a, R: 'a, OK, IK, RF, C>(
        &self,
        inner: &Enumerable<'a, I>,
        outer_key: OK,
        inner_key: IK,
        result: RF,
        comparer: C,
    ) -> Enumerable<'a, R>
    where
        OK: Fn(&T) -> K + 'a,
        IK: Fn(&I) -> K + 'a,
        RF: Fn(&T, &I) -> R + 'a,
        C: EqualityComparer<K> + 'a,
    {
        let keys = JoinKeys {
            inner: inner.clone(),
            outer_key: Rc::new(outer_key),
            inner_key: Rc::new(inner_key),
            comparer: shared(comparer),
        };
        Enumerable::from_stage(JoinStage::new(self.clone(), keys, Rc::new(result)))
    }

    /// Exactly one `result(outer, matches)` per outer element; `matches` is
    /// empty when nothing on the inner side shares the key.
    pub fn group_join<I: 'a, K, R: 'a, OK, IK, RF>(
        &self,
        inner: &Enumerable<'a, I>,
        outer_key: OK,
        inner_key: IK,
        result: RF,
    ) -> Enumerable<'a, R>
    where
        K: Hash + Eq + 'a,
        OK: Fn(&T) -> K + 'a,
        IK: Fn(&I) -> K + 'a,
        RF: Fn(T, &[I]) -> R + 'a,
    {
        self.group_join_with(inner, outer_key, inner_key, result, DefaultComparer::new())
    }

    /// [`group_join`](Self::group_join) with keys matched by `comparer`.
    pub fn group_join_with<I: 'a, K: 'a, R: 'a, OK, IK, RF, C>(
        &self,
        inner: &Enumerable<'a, I>,
        outer_key: OK,
        inner_key: IK,
        result: RF,
        comparer: C,
    ) -> Enumerable<'a, R>
    where
        OK: Fn(&T) -> K + 'a,
        IK: Fn(&I) -> K + 'a,
        RF: Fn(T, &[I]) -> R + 'a,
        C: EqualityComparer<K> + 'a,
    {
        let keys = JoinKeys {
            inner: inner.clone(),
            outer_key: Rc::new(outer_key),
            inner_key: Rc::new(inner_key),
            comparer: shared(comparer),
        };
        Enumerable::from_stage(GroupJoinStage::new(self.clone(), keys, Rc::new(result)))
    }

    /// Groups elements by `key`, in first-seen key order.
    pub fn group_by<K, F>(&self, key: F) -> Enumerable<'a, Grouping<K, T>>
    where
        K: Hash + Eq + 'a,
        F: Fn(&T) -> K + 'a,
    {
        self.group_by_with(key, |item| item, DefaultComparer::new())
    }

    /// Groups `element(x)` by `key(x)`.
    pub fn group_by_element<K, V: 'a, KF, EF>(
        &self,
        key: KF,
        element: EF,
    ) -> Enumerable<'a, Grouping<K, V>>
    where
        K: Hash + Eq + 'a,
        KF: Fn(&T) -> K + 'a,
        EF: Fn(T) -> V + 'a,
    {
        self.group_by_with(key, element, DefaultComparer::new())
    }

    /// Groups `element(x)` by `key(x)`, with keys matched by `comparer`.
    pub fn group_by_with<K: 'a, V: 'a, KF, EF, C>(
        &self,
        key: KF,
        element: EF,
        comparer: C,
    ) -> Enumerable<'a, Grouping<K, V>>
    where
        KF: Fn(&T) -> K + 'a,
        EF: Fn(T) -> V + 'a,
        C: EqualityComparer<K> + 'a,
    {
        Enumerable::from_stage(GroupByStage::new(
            self.clone(),
            Rc::new(key),
            Rc::new(element),
            shared(comparer),
        ))
    }

    // ------------------------------------------------------------------------
    // Ordering
    // ------------------------------------------------------------------------

    /// Sorts ascending by `key`. Stable.
    pub fn order_by<K, F>(&self, key: F) -> OrderedEnumerable<'a, T>
    where
        K: SortKey + 'a,
        F: Fn(&T) -> K + 'a,
    {
        OrderedEnumerable::new(self.clone(), key, Dir::Asc)
    }

    /// Sorts descending by `key`. Stable.
    pub fn order_by_descending<K, F>(&self, key: F) -> OrderedEnumerable<'a, T>
    where
        K: SortKey + 'a,
        F: Fn(&T) -> K + 'a,
    {
        OrderedEnumerable::new(self.clone(), key, Dir::Desc)
    }

    /// Sorts ascending by the elements themselves.
    pub fn order(&self) -> OrderedEnumerable<'a, T>
    where
        T: SortKey + Clone,
    {
        self.order_by(T::clone)
    }

    /// Sorts descending by the elements themselves.
    pub fn order_descending(&self) -> OrderedEnumerable<'a, T>
    where
        T: SortKey + Clone,
    {
        self.order_by_descending(T::clone)
    }

    // ------------------------------------------------------------------------
    // Partitioning
    // ------------------------------------------------------------------------

    /// The first `count` elements.
    pub fn take(&self, count: usize) -> Self {
        Enumerable::from_stage(TakeStage::new(self.clone(), count))
    }

    /// All but the first `count` elements.
    pub fn skip(&self, count: usize) -> Self {
        Enumerable::from_stage(SkipStage::new(self.clone(), count))
    }

    /// Leading elements while `predicate` holds.
    pub fn take_while<F>(&self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + 'a,
    {
        Enumerable::from_stage(TakeWhileStage::new(
            self.clone(),
            Predicate::Plain(Rc::new(predicate)),
        ))
    }

    /// Leading elements while `predicate(element, index)` holds.
    pub fn take_while_indexed<F>(&self, predicate: F) -> Self
    where
        F: Fn(&T, usize) -> bool + 'a,
    {
        Enumerable::from_stage(TakeWhileStage::new(
            self.clone(),
            Predicate::Indexed(Rc::new(predicate)),
        ))
    }

    /// Elements from the first one for which `predicate` fails.
    pub fn skip_while<F>(&self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + 'a,
    {
        Enumerable::from_stage(SkipWhileStage::new(
            self.clone(),
            Predicate::Plain(Rc::new(predicate)),
        ))
    }

    /// Elements from the first one for which `predicate(element, index)` fails.
    pub fn skip_while_indexed<F>(&self, predicate: F) -> Self
    where
        F: Fn(&T, usize) -> bool + 'a,
    {
        Enumerable::from_stage(SkipWhileStage::new(
            self.clone(),
            Predicate::Indexed(Rc::new(predicate)),
        ))
    }

    /// Elements back to front.
    pub fn reverse(&self) -> Self {
        Enumerable::from_stage(ReverseStage::new(self.clone()))
    }
}
