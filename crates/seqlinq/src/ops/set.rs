//! Set operators: distinct, union, intersect, except.
//!
//! Identity is decided by a key function plus an [`EqualityComparer`] over
//! that key; the plain forms use the element itself as its key. Every
//! operator yields values in first-seen order and never yields two values
//! the comparer considers equal.
//!
//! [`EqualityComparer`]: crate::EqualityComparer

use std::rc::Rc;

use crate::enumerable::Enumerable;
use crate::lookup::{KeySet, SharedComparer};
use crate::stage::{Cursor, Stage};

pub(crate) type KeyFn<'a, T, K> = Rc<dyn Fn(&T) -> K + 'a>;

/// The kind of set operation a [`SetStage`] performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SetOp {
    /// Left values whose key was not seen before.
    Distinct,
    /// Left then right values whose key was not seen before.
    Union,
    /// Left values whose key is present on the right, once each.
    Intersect,
    /// Left values whose key is absent on the right, once each.
    Except,
}

pub(crate) struct SetStage<'a, T, K> {
    op: SetOp,
    first: Enumerable<'a, T>,
    second: Option<Enumerable<'a, T>>,
    key: KeyFn<'a, T, K>,
    comparer: SharedComparer<'a, K>,
}

impl<'a, T: 'a, K: 'a> SetStage<'a, T, K> {
    pub(crate) fn distinct(
        source: Enumerable<'a, T>,
        key: KeyFn<'a, T, K>,
        comparer: SharedComparer<'a, K>,
    ) -> Self {
        SetStage {
            op: SetOp::Distinct,
            first: source,
            second: None,
            key,
            comparer,
        }
    }

    pub(crate) fn binary(
        op: SetOp,
        first: Enumerable<'a, T>,
        second: Enumerable<'a, T>,
        key: KeyFn<'a, T, K>,
        comparer: SharedComparer<'a, K>,
    ) -> Self {
        SetStage {
            op,
            first,
            second: Some(second),
            key,
            comparer,
        }
    }
}

impl<'a, T: 'a, K: 'a> Stage<'a, T> for SetStage<'a, T, K> {
    fn cursor(&self) -> Cursor<'a, T> {
        let seen = KeySet::new(Rc::clone(&self.comparer));
        let key = Rc::clone(&self.key);
        match (self.op, &self.second) {
            (SetOp::Union, Some(second)) => Box::new(DistinctCursor {
                source: Box::new(self.first.cursor().chain(second.cursor())),
                key,
                seen,
            }),
            (SetOp::Intersect, Some(second)) | (SetOp::Except, Some(second)) => {
                Box::new(ProbeCursor {
                    keep_present: self.op == SetOp::Intersect,
                    source: self.first.cursor(),
                    pending: Some(second.clone()),
                    key,
                    set: seen,
                })
            }
            _ => Box::new(DistinctCursor {
                source: self.first.cursor(),
                key,
                seen,
            }),
        }
    }
}

struct DistinctCursor<'a, T, K> {
    source: Cursor<'a, T>,
    key: KeyFn<'a, T, K>,
    seen: KeySet<'a, K>,
}

impl<'a, T, K> Iterator for DistinctCursor<'a, T, K> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            let item = self.source.next()?;
            if self.seen.insert((self.key)(&item)) {
                return Some(item);
            }
        }
    }
}

/// Intersect / except: the right side is buffered into a key set on the
/// first pull, then left values are probed against it.
struct ProbeCursor<'a, T, K> {
    keep_present: bool,
    source: Cursor<'a, T>,
    pending: Option<Enumerable<'a, T>>,
    key: KeyFn<'a, T, K>,
    set: KeySet<'a, K>,
}

impl<'a, T: 'a, K> Iterator for ProbeCursor<'a, T, K> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if let Some(second) = self.pending.take() {
            for item in second.iter() {
                self.set.insert((self.key)(&item));
            }
        }
        loop {
            let item = self.source.next()?;
            let key = (self.key)(&item);
            let emit = if self.keep_present {
                // Removing the key keeps a second equal left value out.
                self.set.remove(&key)
            } else {
                self.set.insert(key)
            };
            if emit {
                return Some(item);
            }
        }
    }
}
