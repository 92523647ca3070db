//! Filter stage.
//!
//! Consecutive index-independent filters fuse into one stage whose predicate
//! is the short-circuit conjunction of both, evaluated in chain order.

use std::rc::Rc;

use crate::enumerable::Enumerable;
use crate::stage::{Cursor, FusedFilter, IndexedCursor, SharedPredicate, Stage};

/// A filter predicate, with or without the element's position.
pub(crate) enum Predicate<'a, T> {
    Plain(SharedPredicate<'a, T>),
    Indexed(Rc<dyn Fn(&T, usize) -> bool + 'a>),
}

impl<'a, T> Predicate<'a, T> {
    pub(crate) fn test(&self, item: &T, index: usize) -> bool {
        match self {
            Predicate::Plain(p) => p(item),
            Predicate::Indexed(p) => p(item, index),
        }
    }
}

impl<'a, T> Clone for Predicate<'a, T> {
    fn clone(&self) -> Self {
        match self {
            Predicate::Plain(p) => Predicate::Plain(Rc::clone(p)),
            Predicate::Indexed(p) => Predicate::Indexed(Rc::clone(p)),
        }
    }
}

/// Builds a filter over `source`, fusing with an upstream plain filter.
pub(crate) fn filter<'a, T: 'a>(
    source: &Enumerable<'a, T>,
    predicate: Predicate<'a, T>,
) -> Enumerable<'a, T> {
    if let Predicate::Plain(second) = &predicate {
        if let Some(FusedFilter {
            upstream,
            predicate: first,
        }) = source.stage().fused_filter()
        {
            let second = Rc::clone(second);
            let combined: SharedPredicate<'a, T> = Rc::new(move |item: &T| first(item) && second(item));
            return Enumerable::from_stage(FilterStage {
                upstream,
                predicate: Predicate::Plain(combined),
            });
        }
    }
    Enumerable::from_stage(FilterStage {
        upstream: source.clone(),
        predicate,
    })
}

struct FilterStage<'a, T> {
    upstream: Enumerable<'a, T>,
    predicate: Predicate<'a, T>,
}

impl<'a, T: 'a> Stage<'a, T> for FilterStage<'a, T> {
    fn cursor(&self) -> Cursor<'a, T> {
        match self.upstream.stage().known_len() {
            Some(len) => Box::new(FilterCursor {
                source: IndexedCursor::new(self.upstream.clone(), 0, len),
                predicate: self.predicate.clone(),
                index: 0,
            }),
            None => Box::new(FilterCursor {
                source: self.upstream.cursor(),
                predicate: self.predicate.clone(),
                index: 0,
            }),
        }
    }

    fn fused_filter(&self) -> Option<FusedFilter<'a, T>> {
        match &self.predicate {
            Predicate::Plain(p) => Some(FusedFilter {
                upstream: self.upstream.clone(),
                predicate: Rc::clone(p),
            }),
            Predicate::Indexed(_) => None,
        }
    }
}

struct FilterCursor<'a, I, T> {
    source: I,
    predicate: Predicate<'a, T>,
    index: usize,
}

impl<'a, I, T> Iterator for FilterCursor<'a, I, T>
where
    I: Iterator<Item = T>,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            let item = self.source.next()?;
            let index = self.index;
            self.index += 1;
            if self.predicate.test(&item, index) {
                return Some(item);
            }
        }
    }
}
