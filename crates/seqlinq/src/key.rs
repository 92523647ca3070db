//! Sort key types.
//!
//! [`SortKey`] gives every orderable key a total comparison plus two optional
//! probes the ordering engine uses to pick a radix fast path:
//! [`SortKey::radix_u32`] for small non-negative integers and
//! [`SortKey::radix_timestamp`] for [`Timestamp`] keys.

use std::cmp::Ordering;

/// A key usable by the ordering engine.
///
/// `compare_key` must be a total order. The radix probes are optional; when
/// every key in a sequence answers `Some`, the engine may sort by those
/// integers instead of calling `compare_key`, so the two must agree.
pub trait SortKey {
    /// Compares two keys.
    fn compare_key(&self, other: &Self) -> Ordering;

    /// The key as a non-negative 32-bit integer, if it is one.
    fn radix_u32(&self) -> Option<u32> {
        None
    }

    /// The key as milliseconds since Unix epoch, if it is temporal.
    fn radix_timestamp(&self) -> Option<i64> {
        None
    }
}

macro_rules! integer_key {
    ($($t:ty),*) => {
        $(
            impl SortKey for $t {
                fn compare_key(&self, other: &Self) -> Ordering {
                    self.cmp(other)
                }

                fn radix_u32(&self) -> Option<u32> {
                    u32::try_from(*self).ok()
                }
            }
        )*
    };
}

integer_key!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

macro_rules! float_key {
    ($($t:ty),*) => {
        $(
            impl SortKey for $t {
                fn compare_key(&self, other: &Self) -> Ordering {
                    self.total_cmp(other)
                }

                fn radix_u32(&self) -> Option<u32> {
                    // -0.0 orders before 0.0 under total_cmp, so it cannot share a bucket.
                    if self.is_sign_negative() || self.fract() != 0.0 || *self > u32::MAX as $t {
                        return None;
                    }
                    Some(*self as u32)
                }
            }
        )*
    };
}

float_key!(f32, f64);

impl SortKey for bool {
    fn compare_key(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

impl SortKey for char {
    fn compare_key(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn radix_u32(&self) -> Option<u32> {
        Some(*self as u32)
    }
}

impl SortKey for str {
    fn compare_key(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

impl SortKey for String {
    fn compare_key(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

impl<T: SortKey + ?Sized> SortKey for &T {
    fn compare_key(&self, other: &Self) -> Ordering {
        (**self).compare_key(*other)
    }

    fn radix_u32(&self) -> Option<u32> {
        (**self).radix_u32()
    }

    fn radix_timestamp(&self) -> Option<i64> {
        (**self).radix_timestamp()
    }
}

impl<T: SortKey + ?Sized> SortKey for Box<T> {
    fn compare_key(&self, other: &Self) -> Ordering {
        (**self).compare_key(other)
    }

    fn radix_u32(&self) -> Option<u32> {
        (**self).radix_u32()
    }

    fn radix_timestamp(&self) -> Option<i64> {
        (**self).radix_timestamp()
    }
}

/// `None` sorts after every present key.
impl<T: SortKey> SortKey for Option<T> {
    fn compare_key(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Some(a), Some(b)) => a.compare_key(b),
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
        }
    }
}

impl<A: SortKey, B: SortKey> SortKey for (A, B) {
    fn compare_key(&self, other: &Self) -> Ordering {
        self.0
            .compare_key(&other.0)
            .then_with(|| self.1.compare_key(&other.1))
    }
}

/// A point in time as signed milliseconds since the Unix epoch.
///
/// Timestamp keys take the 64-bit radix path in the ordering engine, which
/// handles instants before 1970 as well as after.
///
/// ```
/// use seqlinq::Timestamp;
///
/// assert_eq!(Timestamp::from_secs(-2), Timestamp(-2_000));
/// assert!(Timestamp::from_millis(-1) < Timestamp(0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Milliseconds since the epoch.
    pub fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    /// Whole seconds, saturating at the representable range.
    pub fn from_secs(secs: i64) -> Self {
        Timestamp(secs.saturating_mul(1000))
    }
}

impl SortKey for Timestamp {
    fn compare_key(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn radix_timestamp(&self) -> Option<i64> {
        Some(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_probe() {
        assert_eq!(7u8.radix_u32(), Some(7));
        assert_eq!((-1i32).radix_u32(), None);
        assert_eq!((u32::MAX as u64 + 1).radix_u32(), None);
        assert_eq!(u32::MAX.radix_u32(), Some(u32::MAX));
    }

    #[test]
    fn float_probe() {
        assert_eq!(3.0f64.radix_u32(), Some(3));
        assert_eq!(3.5f64.radix_u32(), None);
        assert_eq!((-0.0f64).radix_u32(), None);
        assert_eq!(f64::NAN.radix_u32(), None);
        assert_eq!(f64::INFINITY.radix_u32(), None);
    }

    #[test]
    fn float_total_order() {
        assert_eq!(1.0f64.compare_key(&2.0), Ordering::Less);
        assert_eq!(f64::NAN.compare_key(&f64::NAN), Ordering::Equal);
    }

    #[test]
    fn option_sorts_none_last() {
        assert_eq!(Some(1).compare_key(&None), Ordering::Less);
        assert_eq!(None::<i32>.compare_key(&Some(1)), Ordering::Greater);
        assert_eq!(None::<i32>.radix_u32(), None);
    }

    #[test]
    fn tuple_is_lexicographic() {
        assert_eq!((1, "b").compare_key(&(1, "a")), Ordering::Greater);
        assert_eq!((0, "z").compare_key(&(1, "a")), Ordering::Less);
    }

    #[test]
    fn references_delegate() {
        let s = String::from("abc");
        let r: &String = &s;
        assert_eq!(r.compare_key(&&String::from("abd")), Ordering::Less);
        assert_eq!((&5u32).radix_u32(), Some(5));
    }

    #[test]
    fn timestamp_takes_the_wide_radix_path() {
        assert_eq!(Timestamp(-5).radix_timestamp(), Some(-5));
        assert_eq!(Timestamp(5).radix_u32(), None);
        assert_eq!(Timestamp::from_secs(1), Timestamp(1000));
        assert_eq!(Timestamp::from_secs(i64::MAX), Timestamp(i64::MAX));
    }
}
