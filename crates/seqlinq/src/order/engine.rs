//! Sort strategy dispatch.
//!
//! With one criterion the engine picks, in order: a native stable sort for
//! short inputs, a 32-bit radix sort when every key is a small non-negative
//! integer, a 64-bit radix sort when every key is a timestamp, and otherwise a
//! comparison sort over a precomputed key column. More than one criterion
//! always sorts indices over one key column per criterion.
//!
//! Every strategy is stable, including descending ones: descending radix
//! sorts run over complemented keys instead of reversing the output.

use std::cmp::Ordering;

use super::criterion::{KeyColumn, RadixKeys, SharedCriterion};
use super::radix;
use super::SortOptions;

/// Which algorithm sorted a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Strategy {
    Native,
    RadixU32,
    RadixTimestamp,
    KeyColumn,
    MultiKey,
}

impl Strategy {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Strategy::Native => "native",
            Strategy::RadixU32 => "radix-u32",
            Strategy::RadixTimestamp => "radix-timestamp",
            Strategy::KeyColumn => "key-column",
            Strategy::MultiKey => "multi-key",
        }
    }
}

/// Sorts `items` by `criteria`.
pub(crate) fn sort<'a, T>(
    items: Vec<T>,
    criteria: &[SharedCriterion<'a, T>],
    options: &SortOptions,
) -> Vec<T> {
    sort_with_strategy(items, criteria, options).0
}

pub(crate) fn sort_with_strategy<'a, T>(
    mut items: Vec<T>,
    criteria: &[SharedCriterion<'a, T>],
    options: &SortOptions,
) -> (Vec<T>, Strategy) {
    let len = items.len();
    let (order, strategy) = match criteria {
        [] => return (items, Strategy::Native),
        [only] if len < options.native_threshold => {
            tracing::debug!(strategy = Strategy::Native.as_str(), len, criteria = 1, "sorting");
            items.sort_by(|a, b| only.compare_items(a, b));
            return (items, Strategy::Native);
        }
        [only] => {
            let column = only.column(&items);
            let descending = only.dir().is_desc();
            match column.radix() {
                Some(keys) => {
                    let keys = if descending { keys.complement() } else { keys };
                    match keys {
                        RadixKeys::U32(keys) => (radix::sort_u32(&keys), Strategy::RadixU32),
                        RadixKeys::Timestamp(keys) => {
                            (radix::sort_u64(&keys), Strategy::RadixTimestamp)
                        }
                    }
                }
                None => {
                    let mut order: Vec<usize> = (0..len).collect();
                    order.sort_by(|&i, &j| only.dir().apply(column.compare(i, j)));
                    (order, Strategy::KeyColumn)
                }
            }
        }
        many => {
            let columns: Vec<Box<dyn KeyColumn + 'a>> =
                many.iter().map(|c| c.column(&items)).collect();
            let mut order: Vec<usize> = (0..len).collect();
            order.sort_by(|&i, &j| {
                many.iter()
                    .zip(&columns)
                    .map(|(c, column)| c.dir().apply(column.compare(i, j)))
                    .find(|o| *o != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
            (order, Strategy::MultiKey)
        }
    };
    tracing::debug!(
        strategy = strategy.as_str(),
        len,
        criteria = criteria.len(),
        "sorting"
    );
    (permute(items, &order), strategy)
}

/// Rearranges `items` so that position `n` holds `items[order[n]]`.
fn permute<T>(items: Vec<T>, order: &[usize]) -> Vec<T> {
    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    order.iter().filter_map(|&i| slots[i].take()).collect()
}
