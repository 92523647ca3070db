//! Source stages: the leaves a pipeline is built on.
//!
//! Sources never mutate what they read from. Slice, vector, range and repeat
//! sources are random access, which lets downstream operators skip the
//! iteration protocol where they can.

use std::marker::PhantomData;
use std::rc::Rc;

use crate::stage::{Cursor, Stage};

/// Borrowed slice; yields references.
pub(crate) struct SliceStage<'a, T> {
    items: &'a [T],
}

impl<'a, T> SliceStage<'a, T> {
    pub(crate) fn new(items: &'a [T]) -> Self {
        SliceStage { items }
    }
}

impl<'a, T: 'a> Stage<'a, &'a T> for SliceStage<'a, T> {
    fn cursor(&self) -> Cursor<'a, &'a T> {
        Box::new(self.items.iter())
    }

    fn known_len(&self) -> Option<usize> {
        Some(self.items.len())
    }

    fn get_at(&self, index: usize) -> Option<&'a T> {
        self.items.get(index)
    }
}

/// Shared owned buffer; yields clones.
pub(crate) struct VecStage<T> {
    items: Rc<[T]>,
}

impl<T> VecStage<T> {
    pub(crate) fn new(items: Vec<T>) -> Self {
        VecStage {
            items: Rc::from(items),
        }
    }
}

struct VecCursor<T> {
    items: Rc<[T]>,
    pos: usize,
}

impl<T: Clone> Iterator for VecCursor<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let item = self.items.get(self.pos)?.clone();
        self.pos += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.items.len().saturating_sub(self.pos);
        (remaining, Some(remaining))
    }
}

impl<'a, T: Clone + 'a> Stage<'a, T> for VecStage<T> {
    fn cursor(&self) -> Cursor<'a, T> {
        Box::new(VecCursor {
            items: Rc::clone(&self.items),
            pos: 0,
        })
    }

    fn known_len(&self) -> Option<usize> {
        Some(self.items.len())
    }

    fn get_at(&self, index: usize) -> Option<T> {
        self.items.get(index).cloned()
    }
}

/// Any iterator factory; each enumeration calls the factory again, on its
/// first pull.
pub(crate) struct FnStage<F> {
    factory: Rc<F>,
}

impl<F> FnStage<F> {
    pub(crate) fn new(factory: F) -> Self {
        FnStage {
            factory: Rc::new(factory),
        }
    }
}

impl<'a, T, I, F> Stage<'a, T> for FnStage<F>
where
    F: Fn() -> I + 'a,
    I: IntoIterator<Item = T>,
    I::IntoIter: 'a,
{
    fn cursor(&self) -> Cursor<'a, T> {
        let factory = Rc::clone(&self.factory);
        let mut opened: Option<I::IntoIter> = None;
        Box::new(std::iter::from_fn(move || {
            if opened.is_none() {
                opened = Some(factory().into_iter());
            }
            opened.as_mut()?.next()
        }))
    }
}

/// Consecutive integers.
pub(crate) struct RangeStage {
    start: i64,
    count: usize,
}

impl RangeStage {
    pub(crate) fn new(start: i64, count: usize) -> Self {
        RangeStage { start, count }
    }
}

impl<'a> Stage<'a, i64> for RangeStage {
    fn cursor(&self) -> Cursor<'a, i64> {
        let start = self.start;
        Box::new((0..self.count).map(move |i| start + i as i64))
    }

    fn known_len(&self) -> Option<usize> {
        Some(self.count)
    }

    fn get_at(&self, index: usize) -> Option<i64> {
        (index < self.count).then(|| self.start + index as i64)
    }
}

/// One value repeated.
pub(crate) struct RepeatStage<T> {
    value: T,
    count: usize,
}

impl<T> RepeatStage<T> {
    pub(crate) fn new(value: T, count: usize) -> Self {
        RepeatStage { value, count }
    }
}

impl<'a, T: Clone + 'a> Stage<'a, T> for RepeatStage<T> {
    fn cursor(&self) -> Cursor<'a, T> {
        Box::new(std::iter::repeat(self.value.clone()).take(self.count))
    }

    fn known_len(&self) -> Option<usize> {
        Some(self.count)
    }

    fn get_at(&self, index: usize) -> Option<T> {
        (index < self.count).then(|| self.value.clone())
    }
}

/// No elements.
pub(crate) struct EmptyStage<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> EmptyStage<T> {
    pub(crate) fn new() -> Self {
        EmptyStage {
            _marker: PhantomData,
        }
    }
}

impl<'a, T: 'a> Stage<'a, T> for EmptyStage<T> {
    fn cursor(&self) -> Cursor<'a, T> {
        Box::new(std::iter::empty())
    }

    fn known_len(&self) -> Option<usize> {
        Some(0)
    }
}
