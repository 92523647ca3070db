//! Partitioning and reversal: take, skip, take-while, skip-while, reverse.

use crate::enumerable::Enumerable;
use crate::ops::filter::Predicate;
use crate::stage::{Cursor, IndexedCursor, ReverseIndexedCursor, Stage};

// ============================================================================
// Take / Skip
// ============================================================================

/// At most `count` leading elements. Never pulls past the last one it yields.
pub(crate) struct TakeStage<'a, T> {
    upstream: Enumerable<'a, T>,
    count: usize,
}

impl<'a, T> TakeStage<'a, T> {
    pub(crate) fn new(upstream: Enumerable<'a, T>, count: usize) -> Self {
        TakeStage { upstream, count }
    }
}

impl<'a, T: 'a> Stage<'a, T> for TakeStage<'a, T> {
    fn cursor(&self) -> Cursor<'a, T> {
        Box::new(self.upstream.cursor().take(self.count))
    }

    fn known_len(&self) -> Option<usize> {
        Some(self.upstream.stage().known_len()?.min(self.count))
    }

    fn get_at(&self, index: usize) -> Option<T> {
        if index >= self.count {
            return None;
        }
        self.upstream.stage().get_at(index)
    }
}

/// Everything after the first `count` elements.
pub(crate) struct SkipStage<'a, T> {
    upstream: Enumerable<'a, T>,
    count: usize,
}

impl<'a, T> SkipStage<'a, T> {
    pub(crate) fn new(upstream: Enumerable<'a, T>, count: usize) -> Self {
        SkipStage { upstream, count }
    }
}

impl<'a, T: 'a> Stage<'a, T> for SkipStage<'a, T> {
    fn cursor(&self) -> Cursor<'a, T> {
        match self.upstream.stage().known_len() {
            // Jump straight to the first kept index.
            Some(len) => Box::new(IndexedCursor::new(
                self.upstream.clone(),
                self.count.min(len),
                len,
            )),
            None => Box::new(self.upstream.cursor().skip(self.count)),
        }
    }

    fn known_len(&self) -> Option<usize> {
        Some(self.upstream.stage().known_len()?.saturating_sub(self.count))
    }

    fn get_at(&self, index: usize) -> Option<T> {
        self.upstream.stage().get_at(index.checked_add(self.count)?)
    }
}

// ============================================================================
// TakeWhile / SkipWhile
// ============================================================================

pub(crate) struct TakeWhileStage<'a, T> {
    upstream: Enumerable<'a, T>,
    predicate: Predicate<'a, T>,
}

impl<'a, T> TakeWhileStage<'a, T> {
    pub(crate) fn new(upstream: Enumerable<'a, T>, predicate: Predicate<'a, T>) -> Self {
        TakeWhileStage {
            upstream,
            predicate,
        }
    }
}

impl<'a, T: 'a> Stage<'a, T> for TakeWhileStage<'a, T> {
    fn cursor(&self) -> Cursor<'a, T> {
        let mut source = self.upstream.cursor();
        let predicate = self.predicate.clone();
        let mut index = 0;
        let mut done = false;
        Box::new(std::iter::from_fn(move || {
            if done {
                return None;
            }
            match source.next() {
                Some(item) if predicate.test(&item, index) => {
                    index += 1;
                    Some(item)
                }
                _ => {
                    done = true;
                    None
                }
            }
        }))
    }
}

pub(crate) struct SkipWhileStage<'a, T> {
    upstream: Enumerable<'a, T>,
    predicate: Predicate<'a, T>,
}

impl<'a, T> SkipWhileStage<'a, T> {
    pub(crate) fn new(upstream: Enumerable<'a, T>, predicate: Predicate<'a, T>) -> Self {
        SkipWhileStage {
            upstream,
            predicate,
        }
    }
}

impl<'a, T: 'a> Stage<'a, T> for SkipWhileStage<'a, T> {
    fn cursor(&self) -> Cursor<'a, T> {
        let mut source = self.upstream.cursor();
        let predicate = self.predicate.clone();
        let mut index = 0;
        let mut skipping = true;
        Box::new(std::iter::from_fn(move || {
            if !skipping {
                return source.next();
            }
            loop {
                let item = source.next()?;
                let keep = !predicate.test(&item, index);
                index += 1;
                if keep {
                    skipping = false;
                    return Some(item);
                }
            }
        }))
    }
}

// ============================================================================
// Reverse
// ============================================================================

/// Elements back to front. Random-access upstreams are walked by index; any
/// other upstream is buffered on the first pull.
pub(crate) struct ReverseStage<'a, T> {
    upstream: Enumerable<'a, T>,
}

impl<'a, T> ReverseStage<'a, T> {
    pub(crate) fn new(upstream: Enumerable<'a, T>) -> Self {
        ReverseStage { upstream }
    }
}

impl<'a, T: 'a> Stage<'a, T> for ReverseStage<'a, T> {
    fn cursor(&self) -> Cursor<'a, T> {
        if let Some(len) = self.upstream.stage().known_len() {
            return Box::new(ReverseIndexedCursor::new(self.upstream.clone(), len));
        }
        let mut source = Some(self.upstream.cursor());
        let mut buffer: Vec<T> = Vec::new();
        Box::new(std::iter::from_fn(move || {
            if let Some(source) = source.take() {
                buffer = source.collect();
            }
            buffer.pop()
        }))
    }

    fn known_len(&self) -> Option<usize> {
        self.upstream.stage().known_len()
    }

    fn get_at(&self, index: usize) -> Option<T> {
        let len = self.upstream.stage().known_len()?;
        let from_front = len.checked_sub(index.checked_add(1)?)?;
        self.upstream.stage().get_at(from_front)
    }
}
