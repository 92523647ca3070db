//! The restartable stage contract every lazy operator implements.
//!
//! A stage is an immutable description of one pipeline step: its upstream
//! handle plus the operator's parameters. Each enumeration asks the stage for
//! a fresh [`Cursor`], which owns all mutable iteration state. Two cursors
//! over the same stage never share position, so overlapping enumerations of
//! one pipeline stay independent.
//!
//! Stages may also advertise optional capabilities:
//!
//! - [`Stage::fused_filter`]: the stage is an index-independent filter, so a
//!   following filter or projection can merge with it.
//! - [`Stage::known_len`] / [`Stage::get_at`]: the stage supports random
//!   access without enumerating.

use std::fmt;
use std::rc::Rc;

use crate::enumerable::Enumerable;
use crate::error::{LinqError, Result};

/// Iteration state for one enumeration of a stage.
pub(crate) type Cursor<'a, T> = Box<dyn Iterator<Item = T> + 'a>;

/// Predicate handle shared between a stage and its cursors.
pub(crate) type SharedPredicate<'a, T> = Rc<dyn Fn(&T) -> bool + 'a>;

pub(crate) trait Stage<'a, T> {
    /// Opens a new, independent cursor. Must not evaluate any element.
    fn cursor(&self) -> Cursor<'a, T>;

    /// Upstream and predicate, if this stage is an index-independent filter.
    fn fused_filter(&self) -> Option<FusedFilter<'a, T>> {
        None
    }

    /// Element count, if it is known without enumerating. A stage that
    /// answers `Some` must also answer [`Stage::get_at`] for every index below it.
    fn known_len(&self) -> Option<usize> {
        None
    }

    /// Element at `index`. Only meaningful when [`Stage::known_len`] is `Some`.
    fn get_at(&self, _index: usize) -> Option<T> {
        None
    }
}

/// The parts of a filter stage another operator may fuse with.
pub(crate) struct FusedFilter<'a, T> {
    pub(crate) upstream: Enumerable<'a, T>,
    pub(crate) predicate: SharedPredicate<'a, T>,
}

// ============================================================================
// Random-access cursors
// ============================================================================

/// Walks a random-access stage front to back.
pub(crate) struct IndexedCursor<'a, T> {
    source: Enumerable<'a, T>,
    next: usize,
    end: usize,
}

impl<'a, T> IndexedCursor<'a, T> {
    pub(crate) fn new(source: Enumerable<'a, T>, start: usize, end: usize) -> Self {
        IndexedCursor {
            source,
            next: start,
            end,
        }
    }
}

impl<'a, T: 'a> Iterator for IndexedCursor<'a, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.next >= self.end {
            return None;
        }
        let index = self.next;
        self.next += 1;
        self.source.stage().get_at(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end.saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

/// Walks a random-access stage back to front.
pub(crate) struct ReverseIndexedCursor<'a, T> {
    source: Enumerable<'a, T>,
    remaining: usize,
}

impl<'a, T> ReverseIndexedCursor<'a, T> {
    pub(crate) fn new(source: Enumerable<'a, T>, len: usize) -> Self {
        ReverseIndexedCursor {
            source,
            remaining: len,
        }
    }
}

impl<'a, T: 'a> Iterator for ReverseIndexedCursor<'a, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.source.stage().get_at(self.remaining)
    }
}

// ============================================================================
// Public iteration surface
// ============================================================================

/// Iterator over one enumeration of an [`Enumerable`].
pub struct Iter<'a, T> {
    cursor: Cursor<'a, T>,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(cursor: Cursor<'a, T>) -> Self {
        Iter { cursor }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.cursor.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.cursor.size_hint()
    }
}

impl<'a, T> fmt::Debug for Iter<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnumeratorState {
    NotStarted,
    Active,
    Finished,
}

/// Explicit `move_next` / `current` protocol over one enumeration.
///
/// # Example
///
/// ```
/// use seqlinq::{Enumerable, LinqError};
///
/// let seq = Enumerable::from_vec(vec![1, 2]);
/// let mut e = seq.enumerator();
///
/// assert!(matches!(e.current(), Err(LinqError::InvalidOperation(_))));
/// assert!(e.move_next());
/// assert_eq!(e.current(), Ok(&1));
/// assert!(e.move_next());
/// assert!(!e.move_next());
/// assert!(e.current().is_err());
/// ```
pub struct Enumerator<'a, T> {
    cursor: Cursor<'a, T>,
    current: Option<T>,
    state: EnumeratorState,
}

impl<'a, T> Enumerator<'a, T> {
    pub(crate) fn new(cursor: Cursor<'a, T>) -> Self {
        Enumerator {
            cursor,
            current: None,
            state: EnumeratorState::NotStarted,
        }
    }

    /// Advances to the next element; returns whether one is available.
    pub fn move_next(&mut self) -> bool {
        if self.state == EnumeratorState::Finished {
            return false;
        }
        match self.cursor.next() {
            Some(item) => {
                self.current = Some(item);
                self.state = EnumeratorState::Active;
                true
            }
            None => {
                self.current = None;
                self.state = EnumeratorState::Finished;
                false
            }
        }
    }

    /// The element produced by the last successful [`move_next`](Self::move_next).
    pub fn current(&self) -> Result<&T> {
        match (&self.current, self.state) {
            (Some(item), EnumeratorState::Active) => Ok(item),
            (_, EnumeratorState::NotStarted) => Err(LinqError::invalid(
                "current read before the first call to move_next",
            )),
            _ => Err(LinqError::invalid("current read after the enumeration finished")),
        }
    }
}

impl<'a, T> fmt::Debug for Enumerator<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Enumerator")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
