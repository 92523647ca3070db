//! Equality strategies used by set, join, group and dictionary operations.
//!
//! An [`EqualityComparer`] decides which values are "the same" for bucketing
//! purposes. Operators call [`EqualityComparer::hash`] to pick a bucket and
//! [`EqualityComparer::equals`] to resolve values that share one.

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;

/// Pluggable hash + equality policy.
///
/// Implementations must be consistent: `equals(a, b)` implies
/// `hash(a) == hash(b)`.
///
/// # Example
///
/// ```
/// use seqlinq::{Enumerable, FnComparer};
///
/// // Compare integers by their value modulo 10.
/// let modulo = FnComparer::new(|n: &i32| (*n % 10) as u64, |a: &i32, b: &i32| a % 10 == b % 10);
///
/// let distinct = Enumerable::from_vec(vec![1, 11, 2, 21, 12])
///     .distinct_with(modulo)
///     .to_vec();
/// assert_eq!(distinct, vec![1, 2]);
/// ```
pub trait EqualityComparer<T: ?Sized> {
    /// Bucket identifier for `value`.
    fn hash(&self, value: &T) -> u64;

    /// Whether `a` and `b` are the same value under this policy.
    fn equals(&self, a: &T, b: &T) -> bool;
}

/// Equality through `Hash + Eq`.
///
/// Each instance owns its own random hashing state, so a default comparer is
/// created per operator call rather than shared process-wide.
#[derive(Debug, Clone, Default)]
pub struct DefaultComparer {
    state: RandomState,
}

impl DefaultComparer {
    /// Creates a comparer with a fresh hashing state.
    pub fn new() -> Self {
        DefaultComparer::default()
    }
}

impl<T: Hash + Eq + ?Sized> EqualityComparer<T> for DefaultComparer {
    fn hash(&self, value: &T) -> u64 {
        self.state.hash_one(value)
    }

    fn equals(&self, a: &T, b: &T) -> bool {
        a == b
    }
}

/// Comparer assembled from a hash closure and an equality closure.
pub struct FnComparer<H, E> {
    hash: H,
    equals: E,
}

impl<H, E> FnComparer<H, E> {
    /// Creates a comparer from the two closures.
    pub fn new(hash: H, equals: E) -> Self {
        FnComparer { hash, equals }
    }
}

impl<T: ?Sized, H, E> EqualityComparer<T> for FnComparer<H, E>
where
    H: Fn(&T) -> u64,
    E: Fn(&T, &T) -> bool,
{
    fn hash(&self, value: &T) -> u64 {
        (self.hash)(value)
    }

    fn equals(&self, a: &T, b: &T) -> bool {
        (self.equals)(a, b)
    }
}

/// Comparer that treats two values as equal when a projected key is equal.
///
/// # Example
///
/// ```
/// use seqlinq::{EqualityComparer, KeyComparer};
///
/// let by_len = KeyComparer::new(|s: &String| s.len());
/// assert!(by_len.equals(&"abc".to_string(), &"xyz".to_string()));
/// assert!(!by_len.equals(&"abc".to_string(), &"xy".to_string()));
/// ```
pub struct KeyComparer<T: ?Sized, K, F> {
    key: F,
    inner: DefaultComparer,
    _marker: PhantomData<fn(&T) -> K>,
}

impl<T: ?Sized, K, F> KeyComparer<T, K, F>
where
    F: Fn(&T) -> K,
{
    /// Creates a comparer over the key returned by `key`.
    pub fn new(key: F) -> Self {
        KeyComparer {
            key,
            inner: DefaultComparer::new(),
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized, K, F> EqualityComparer<T> for KeyComparer<T, K, F>
where
    K: Hash + Eq,
    F: Fn(&T) -> K,
{
    fn hash(&self, value: &T) -> u64 {
        self.inner.hash(&(self.key)(value))
    }

    fn equals(&self, a: &T, b: &T) -> bool {
        (self.key)(a) == (self.key)(b)
    }
}

/// ASCII case-insensitive comparer for string-like values.
#[derive(Debug, Clone, Default)]
pub struct IgnoreAsciiCase {
    state: RandomState,
}

impl IgnoreAsciiCase {
    /// Creates a comparer with a fresh hashing state.
    pub fn new() -> Self {
        IgnoreAsciiCase::default()
    }
}

impl<T: AsRef<str> + ?Sized> EqualityComparer<T> for IgnoreAsciiCase {
    fn hash(&self, value: &T) -> u64 {
        self.state.hash_one(value.as_ref().to_ascii_lowercase())
    }

    fn equals(&self, a: &T, b: &T) -> bool {
        a.as_ref().eq_ignore_ascii_case(b.as_ref())
    }
}
