//! Property-based tests for seqlinq using proptest.

use std::collections::HashSet;

use proptest::prelude::*;
use seqlinq::{Enumerable, SortOptions};

// ============================================================================
// Test helpers
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
struct TestItem {
    value: i64,
    name: String,
    active: bool,
}

// Strategy to generate test items
fn test_item_strategy() -> impl Strategy<Value = TestItem> {
    (any::<i64>(), "[a-z]{1,10}", any::<bool>()).prop_map(|(value, name, active)| TestItem {
        value,
        name,
        active,
    })
}

fn first_seen(items: &[i64]) -> Vec<i64> {
    let mut seen = HashSet::new();
    items.iter().copied().filter(|n| seen.insert(*n)).collect()
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Chained filters select exactly what their conjunction selects.
    #[test]
    fn chained_filters_equal_conjunction(
        items in prop::collection::vec(any::<i64>(), 0..100),
        low in any::<i64>(),
        modulus in 1i64..10,
    ) {
        let seq = Enumerable::from_vec(items);
        let chained = seq.filter(move |n| *n > low).filter(move |n| n % modulus == 0);
        let combined = seq.filter(move |n| *n > low && n % modulus == 0);

        prop_assert_eq!(chained.to_vec(), combined.to_vec());
    }

    /// Filter should never return more items than the input.
    #[test]
    fn filter_never_grows_collection(
        items in prop::collection::vec(any::<i64>(), 0..100),
        threshold in any::<i64>(),
    ) {
        let seq = Enumerable::from_slice(&items);
        prop_assert!(seq.filter(|n| **n > threshold).count() <= items.len());
    }

    /// Count with a predicate equals the length of the filtered result.
    #[test]
    fn count_where_equals_filter_len(
        items in prop::collection::vec(test_item_strategy(), 0..50),
    ) {
        let seq = Enumerable::from_vec(items);
        prop_assert_eq!(
            seq.count_where(|t| t.active),
            seq.filter(|t| t.active).to_vec().len()
        );
    }

    /// Identity projection gives back the input.
    #[test]
    fn identity_select_round_trips(items in prop::collection::vec(test_item_strategy(), 0..50)) {
        let back = Enumerable::from_vec(items.clone()).select(|t| t).to_vec();
        prop_assert_eq!(back, items);
    }

    /// Enumerating a pipeline twice gives the same sequence.
    #[test]
    fn enumeration_is_repeatable(
        items in prop::collection::vec(any::<i64>(), 0..100),
        count in 0usize..20,
    ) {
        let seq = Enumerable::from_vec(items)
            .filter(|n| n % 3 != 0)
            .order_by_descending(|n| *n)
            .skip(count);
        prop_assert_eq!(seq.to_vec(), seq.to_vec());
    }

    /// order_by equals a stable sort on the same key.
    #[test]
    fn order_by_matches_stable_sort(
        items in prop::collection::vec(test_item_strategy(), 0..200),
        threshold in 0usize..64,
    ) {
        let mut expected = items.clone();
        expected.sort_by(|a, b| a.name.cmp(&b.name));

        let ordered = Enumerable::from_vec(items)
            .order_by(|t| t.name.clone())
            .with_options(SortOptions::default().with_native_threshold(threshold));
        prop_assert_eq!(ordered.to_vec(), expected);
    }

    /// Integer keys sort the same whichever strategy runs.
    #[test]
    fn integer_order_is_strategy_independent(
        items in prop::collection::vec(any::<u32>(), 0..300),
        descending in any::<bool>(),
    ) {
        let mut expected: Vec<(usize, u32)> = items.iter().copied().enumerate().collect();
        if descending {
            expected.sort_by(|a, b| b.1.cmp(&a.1));
        } else {
            expected.sort_by(|a, b| a.1.cmp(&b.1));
        }

        let seq = Enumerable::from_vec(items.into_iter().enumerate().collect::<Vec<_>>());
        for threshold in [0usize, usize::MAX] {
            let options = SortOptions::default().with_native_threshold(threshold);
            let ordered = if descending {
                seq.order_by_descending(|p| p.1).with_options(options)
            } else {
                seq.order_by(|p| p.1).with_options(options)
            };
            prop_assert_eq!(ordered.to_vec(), expected.clone());
        }
    }

    /// A secondary key only breaks ties of the primary key.
    #[test]
    fn then_by_refines_order_by(items in prop::collection::vec((0i64..5, any::<i64>()), 0..100)) {
        let sorted = Enumerable::from_vec(items.clone())
            .order_by(|p| p.0)
            .then_by_descending(|p| p.1)
            .to_vec();

        let mut expected = items;
        expected.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));
        prop_assert_eq!(sorted, expected);
    }

    /// Distinct keeps the first occurrence of each value, in order.
    #[test]
    fn distinct_keeps_first_occurrences(items in prop::collection::vec(-20i64..20, 0..100)) {
        let distinct = Enumerable::from_vec(items.clone()).distinct().to_vec();
        prop_assert_eq!(distinct, first_seen(&items));
    }

    /// Union, intersect and except agree with set membership.
    #[test]
    fn set_operators_agree_with_membership(
        left in prop::collection::vec(-20i64..20, 0..50),
        right in prop::collection::vec(-20i64..20, 0..50),
    ) {
        let a = Enumerable::from_vec(left.clone());
        let b = Enumerable::from_vec(right.clone());
        let right_set: HashSet<i64> = right.iter().copied().collect();

        let mut union_expected = left.clone();
        union_expected.extend(right.iter().copied());
        prop_assert_eq!(a.union(&b).to_vec(), first_seen(&union_expected));

        let intersect_expected: Vec<i64> = first_seen(&left)
            .into_iter()
            .filter(|n| right_set.contains(n))
            .collect();
        prop_assert_eq!(a.intersect(&b).to_vec(), intersect_expected);

        let except_expected: Vec<i64> = first_seen(&left)
            .into_iter()
            .filter(|n| !right_set.contains(n))
            .collect();
        prop_assert_eq!(a.except(&b).to_vec(), except_expected);
    }

    /// take(n) followed by skip(n) reassembles the input.
    #[test]
    fn take_and_skip_partition(
        items in prop::collection::vec(any::<i64>(), 0..100),
        n in 0usize..120,
    ) {
        let seq = Enumerable::from_vec(items.clone());
        let lazy = Enumerable::from_fn(move || items.clone());

        for source in [seq, lazy] {
            let mut joined = source.take(n).to_vec();
            joined.extend(source.skip(n).to_vec());
            prop_assert_eq!(joined, source.to_vec());
            prop_assert_eq!(source.take(n).count(), n.min(source.count()));
        }
    }

    /// take_while and skip_while split at the first failing element.
    #[test]
    fn take_while_and_skip_while_partition(
        items in prop::collection::vec(-50i64..50, 0..100),
        bound in -50i64..50,
    ) {
        let seq = Enumerable::from_vec(items);
        let mut joined = seq.take_while(move |n| *n < bound).to_vec();
        joined.extend(seq.skip_while(move |n| *n < bound).to_vec());
        prop_assert_eq!(joined, seq.to_vec());
    }

    /// Reversing twice is the identity.
    #[test]
    fn reverse_twice_is_identity(items in prop::collection::vec(any::<i64>(), 0..100)) {
        let seq = Enumerable::from_vec(items.clone());
        prop_assert_eq!(seq.reverse().reverse().to_vec(), items.clone());

        let lazy = Enumerable::from_fn(move || items.clone());
        prop_assert_eq!(lazy.reverse().reverse().to_vec(), lazy.to_vec());
    }

    /// Every element lands in exactly one group.
    #[test]
    fn group_by_partitions_input(items in prop::collection::vec(test_item_strategy(), 0..60)) {
        let groups = Enumerable::from_vec(items.clone()).group_by(|t| t.name.len());
        let total: usize = groups.iter().map(|g| g.len()).sum();
        prop_assert_eq!(total, items.len());
        prop_assert!(groups.all(|g| g.iter().all(|t| t.name.len() == *g.key())));
    }

    /// Join yields one row per matching pair.
    #[test]
    fn join_cardinality_is_sum_of_matches(
        outer in prop::collection::vec(0u8..8, 0..30),
        inner in prop::collection::vec(0u8..8, 0..30),
    ) {
        let expected: usize = outer
            .iter()
            .map(|o| inner.iter().filter(|i| *i == o).count())
            .sum();

        let a = Enumerable::from_vec(outer.clone());
        let b = Enumerable::from_vec(inner);
        prop_assert_eq!(a.join(&b, |o| *o, |i| *i, |o, i| (*o, *i)).count(), expected);
        prop_assert_eq!(a.group_join(&b, |o| *o, |i| *i, |o, g| (o, g.len())).count(), outer.len());
    }

    /// element_at agrees with indexing whether or not the length is known.
    #[test]
    fn element_at_matches_indexing(
        items in prop::collection::vec(any::<i64>(), 0..50),
        index in 0usize..60,
    ) {
        let indexed = Enumerable::from_vec(items.clone());
        let lazy = Enumerable::from_fn({
            let items = items.clone();
            move || items.clone()
        });
        let expected = items.get(index).copied();

        prop_assert_eq!(indexed.element_at(index).ok(), expected);
        prop_assert_eq!(lazy.element_at(index).ok(), expected);
    }
}
