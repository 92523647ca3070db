//! Sort criteria and their precomputed key columns.

use std::cmp::Ordering;
use std::rc::Rc;

use super::radix::timestamp_key;
use super::Dir;
use crate::key::SortKey;

/// One `(key selector, direction)` pair, with its key type erased.
pub(crate) trait Criterion<'a, T> {
    fn dir(&self) -> Dir;

    /// Compares two elements by key, direction applied.
    fn compare_items(&self, a: &T, b: &T) -> Ordering;

    /// Evaluates the selector once per element.
    fn column(&self, items: &[T]) -> Box<dyn KeyColumn + 'a>;
}

pub(crate) type SharedCriterion<'a, T> = Rc<dyn Criterion<'a, T> + 'a>;

/// Precomputed keys for one criterion, addressed by element index.
pub(crate) trait KeyColumn {
    /// Ascending comparison of the keys at `i` and `j`.
    fn compare(&self, i: usize, j: usize) -> Ordering;

    /// The keys as radix integers, if every key has one.
    fn radix(&self) -> Option<RadixKeys>;
}

/// Integer keys for the radix paths, ascending order preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RadixKeys {
    U32(Vec<u32>),
    Timestamp(Vec<u64>),
}

impl RadixKeys {
    /// Bitwise complement of every key, which reverses their order.
    pub(crate) fn complement(self) -> Self {
        match self {
            RadixKeys::U32(keys) => RadixKeys::U32(keys.into_iter().map(|k| !k).collect()),
            RadixKeys::Timestamp(keys) => {
                RadixKeys::Timestamp(keys.into_iter().map(|k| !k).collect())
            }
        }
    }
}

pub(crate) struct KeyCriterion<'a, T, K> {
    key: Rc<dyn Fn(&T) -> K + 'a>,
    dir: Dir,
}

impl<'a, T, K> KeyCriterion<'a, T, K> {
    pub(crate) fn new(key: Rc<dyn Fn(&T) -> K + 'a>, dir: Dir) -> Self {
        KeyCriterion { key, dir }
    }
}

impl<'a, T, K: SortKey + 'a> Criterion<'a, T> for KeyCriterion<'a, T, K> {
    fn dir(&self) -> Dir {
        self.dir
    }

    fn compare_items(&self, a: &T, b: &T) -> Ordering {
        self.dir.apply((self.key)(a).compare_key(&(self.key)(b)))
    }

    fn column(&self, items: &[T]) -> Box<dyn KeyColumn + 'a> {
        Box::new(Column {
            keys: items.iter().map(|item| (self.key)(item)).collect(),
        })
    }
}

struct Column<K> {
    keys: Vec<K>,
}

impl<K: SortKey> KeyColumn for Column<K> {
    fn compare(&self, i: usize, j: usize) -> Ordering {
        self.keys[i].compare_key(&self.keys[j])
    }

    fn radix(&self) -> Option<RadixKeys> {
        if let Some(keys) = self.keys.iter().map(K::radix_u32).collect::<Option<Vec<u32>>>() {
            return Some(RadixKeys::U32(keys));
        }
        self.keys
            .iter()
            .map(|k| k.radix_timestamp().map(timestamp_key))
            .collect::<Option<Vec<u64>>>()
            .map(RadixKeys::Timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Timestamp;

    fn criterion<K: SortKey + 'static>(
        key: impl Fn(&i64) -> K + 'static,
        dir: Dir,
    ) -> KeyCriterion<'static, i64, K> {
        KeyCriterion::new(Rc::new(key), dir)
    }

    #[test]
    fn compare_items_applies_direction() {
        let asc = criterion(|n| *n, Dir::Asc);
        let desc = criterion(|n| *n, Dir::Desc);
        assert_eq!(asc.compare_items(&1, &2), Ordering::Less);
        assert_eq!(desc.compare_items(&1, &2), Ordering::Greater);
    }

    #[test]
    fn column_probes_radix_kind() {
        let items = [3i64, 1, 2];

        let ints = criterion(|n| *n as u32, Dir::Asc).column(&items);
        assert_eq!(ints.radix(), Some(RadixKeys::U32(vec![3, 1, 2])));
        assert_eq!(ints.compare(0, 1), Ordering::Greater);

        let times = criterion(|n| Timestamp(*n), Dir::Asc).column(&items);
        assert!(matches!(times.radix(), Some(RadixKeys::Timestamp(_))));

        let text = criterion(|n| n.to_string(), Dir::Asc).column(&items);
        assert_eq!(text.radix(), None);
    }

    #[test]
    fn one_negative_key_disables_u32_radix() {
        let items = [3i64, -1];
        let column = criterion(|n| *n, Dir::Asc).column(&items);
        assert_eq!(column.radix(), None);
    }

    #[test]
    fn complement_reverses_order() {
        let keys = RadixKeys::U32(vec![0, 5]).complement();
        assert_eq!(keys, RadixKeys::U32(vec![u32::MAX, u32::MAX - 5]));
    }
}
