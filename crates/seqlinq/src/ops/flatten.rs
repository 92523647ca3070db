//! Flatten (select-many) stages.
//!
//! Each cursor keeps the inner iterator of the current upstream element and
//! drains it before pulling the next upstream element.

use std::rc::Rc;

use crate::enumerable::Enumerable;
use crate::stage::{Cursor, Stage};

pub(crate) type Expand<'a, T, U> = Rc<dyn Fn(T) -> Cursor<'a, U> + 'a>;

pub(crate) struct SelectManyStage<'a, T, U> {
    upstream: Enumerable<'a, T>,
    selector: Expand<'a, T, U>,
}

impl<'a, T, U> SelectManyStage<'a, T, U> {
    pub(crate) fn new(upstream: Enumerable<'a, T>, selector: Expand<'a, T, U>) -> Self {
        SelectManyStage { upstream, selector }
    }
}

impl<'a, T: 'a, U: 'a> Stage<'a, U> for SelectManyStage<'a, T, U> {
    fn cursor(&self) -> Cursor<'a, U> {
        Box::new(SelectManyCursor {
            source: self.upstream.cursor(),
            selector: Rc::clone(&self.selector),
            inner: None,
        })
    }
}

struct SelectManyCursor<'a, T, U> {
    source: Cursor<'a, T>,
    selector: Expand<'a, T, U>,
    inner: Option<Cursor<'a, U>>,
}

impl<'a, T, U> Iterator for SelectManyCursor<'a, T, U> {
    type Item = U;

    fn next(&mut self) -> Option<U> {
        loop {
            if let Some(inner) = &mut self.inner {
                if let Some(item) = inner.next() {
                    return Some(item);
                }
                self.inner = None;
            }
            let outer = self.source.next()?;
            self.inner = Some((self.selector)(outer));
        }
    }
}

/// Flatten that also hands the originating element to a result selector.
pub(crate) struct SelectManyWithStage<'a, T, C, R> {
    upstream: Enumerable<'a, T>,
    collection: Rc<dyn Fn(&T) -> Cursor<'a, C> + 'a>,
    result: Rc<dyn Fn(&T, C) -> R + 'a>,
}

impl<'a, T, C, R> SelectManyWithStage<'a, T, C, R> {
    pub(crate) fn new(
        upstream: Enumerable<'a, T>,
        collection: Rc<dyn Fn(&T) -> Cursor<'a, C> + 'a>,
        result: Rc<dyn Fn(&T, C) -> R + 'a>,
    ) -> Self {
        SelectManyWithStage {
            upstream,
            collection,
            result,
        }
    }
}

impl<'a, T: 'a, C: 'a, R: 'a> Stage<'a, R> for SelectManyWithStage<'a, T, C, R> {
    fn cursor(&self) -> Cursor<'a, R> {
        Box::new(SelectManyWithCursor {
            source: self.upstream.cursor(),
            collection: Rc::clone(&self.collection),
            result: Rc::clone(&self.result),
            current: None,
        })
    }
}

struct SelectManyWithCursor<'a, T, C, R> {
    source: Cursor<'a, T>,
    collection: Rc<dyn Fn(&T) -> Cursor<'a, C> + 'a>,
    result: Rc<dyn Fn(&T, C) -> R + 'a>,
    current: Option<(T, Cursor<'a, C>)>,
}

impl<'a, T, C, R> Iterator for SelectManyWithCursor<'a, T, C, R> {
    type Item = R;

    fn next(&mut self) -> Option<R> {
        loop {
            if let Some((outer, inner)) = &mut self.current {
                if let Some(item) = inner.next() {
                    return Some((self.result)(outer, item));
                }
                self.current = None;
            }
            let outer = self.source.next()?;
            let inner = (self.collection)(&outer);
            self.current = Some((outer, inner));
        }
    }
}
