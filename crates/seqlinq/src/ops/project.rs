//! Projection stages, including the fused filter + projection stage.

use std::rc::Rc;

use crate::enumerable::Enumerable;
use crate::stage::{Cursor, FusedFilter, SharedPredicate, Stage};

/// A projection, with or without the element's position.
pub(crate) enum Selector<'a, T, U> {
    Plain(Rc<dyn Fn(T) -> U + 'a>),
    Indexed(Rc<dyn Fn(T, usize) -> U + 'a>),
}

impl<'a, T, U> Selector<'a, T, U> {
    fn apply(&self, item: T, index: usize) -> U {
        match self {
            Selector::Plain(f) => f(item),
            Selector::Indexed(f) => f(item, index),
        }
    }
}

impl<'a, T, U> Clone for Selector<'a, T, U> {
    fn clone(&self) -> Self {
        match self {
            Selector::Plain(f) => Selector::Plain(Rc::clone(f)),
            Selector::Indexed(f) => Selector::Indexed(Rc::clone(f)),
        }
    }
}

/// Builds a projection over `source`. A plain selector directly after a
/// plain filter becomes a single filter + projection stage.
pub(crate) fn select<'a, T: 'a, U: 'a>(
    source: &Enumerable<'a, T>,
    selector: Selector<'a, T, U>,
) -> Enumerable<'a, U> {
    if let Selector::Plain(f) = &selector {
        if let Some(FusedFilter {
            upstream,
            predicate,
        }) = source.stage().fused_filter()
        {
            return Enumerable::from_stage(FilterSelectStage {
                upstream,
                predicate,
                selector: Rc::clone(f),
            });
        }
    }
    Enumerable::from_stage(SelectStage {
        upstream: source.clone(),
        selector,
    })
}

struct SelectStage<'a, T, U> {
    upstream: Enumerable<'a, T>,
    selector: Selector<'a, T, U>,
}

impl<'a, T: 'a, U: 'a> Stage<'a, U> for SelectStage<'a, T, U> {
    fn cursor(&self) -> Cursor<'a, U> {
        Box::new(SelectCursor {
            source: self.upstream.cursor(),
            selector: self.selector.clone(),
            index: 0,
        })
    }

    fn known_len(&self) -> Option<usize> {
        self.upstream.stage().known_len()
    }

    fn get_at(&self, index: usize) -> Option<U> {
        let item = self.upstream.stage().get_at(index)?;
        Some(self.selector.apply(item, index))
    }
}

struct SelectCursor<'a, T, U> {
    source: Cursor<'a, T>,
    selector: Selector<'a, T, U>,
    index: usize,
}

impl<'a, T, U> Iterator for SelectCursor<'a, T, U> {
    type Item = U;

    fn next(&mut self) -> Option<U> {
        let item = self.source.next()?;
        let index = self.index;
        self.index += 1;
        Some(self.selector.apply(item, index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.source.size_hint()
    }
}

struct FilterSelectStage<'a, T, U> {
    upstream: Enumerable<'a, T>,
    predicate: SharedPredicate<'a, T>,
    selector: Rc<dyn Fn(T) -> U + 'a>,
}

impl<'a, T: 'a, U: 'a> Stage<'a, U> for FilterSelectStage<'a, T, U> {
    fn cursor(&self) -> Cursor<'a, U> {
        Box::new(FilterSelectCursor {
            source: self.upstream.cursor(),
            predicate: Rc::clone(&self.predicate),
            selector: Rc::clone(&self.selector),
        })
    }
}

struct FilterSelectCursor<'a, T, U> {
    source: Cursor<'a, T>,
    predicate: SharedPredicate<'a, T>,
    selector: Rc<dyn Fn(T) -> U + 'a>,
}

impl<'a, T, U> Iterator for FilterSelectCursor<'a, T, U> {
    type Item = U;

    fn next(&mut self) -> Option<U> {
        loop {
            let item = self.source.next()?;
            if (self.predicate)(&item) {
                return Some((self.selector)(item));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use crate::enumerable::Enumerable;

    #[test]
    fn projects_each_element() {
        let seq = Enumerable::from_vec(vec![1, 2, 3]).select(|n| n * 10);
        assert_eq!(seq.to_vec(), vec![10, 20, 30]);
    }

    #[test]
    fn indexed_projection() {
        let seq = Enumerable::from_vec(vec!["a", "b"]).select_indexed(|s, i| format!("{i}:{s}"));
        assert_eq!(seq.to_vec(), vec!["0:a".to_string(), "1:b".to_string()]);
    }

    #[test]
    fn projection_keeps_random_access() {
        let calls = Cell::new(0);
        let seq = Enumerable::from_vec(vec![1, 2, 3, 4]).select(|n| {
            calls.set(calls.get() + 1);
            n * 2
        });

        assert_eq!(seq.count(), 4);
        assert_eq!(seq.element_at(2), Ok(6));
        assert_eq!(seq.last(), Ok(8));
        // count needs no projection; element_at and last project one element each.
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn filter_then_select_fuses() {
        let seq = Enumerable::from_vec(vec![1, 2, 3, 4])
            .filter(|n| n % 2 == 1)
            .select(|n| n + 100);

        assert_eq!(seq.stage().known_len(), None);
        assert_eq!(seq.to_vec(), vec![101, 103]);
    }
}
