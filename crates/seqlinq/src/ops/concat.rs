//! Concatenation and fallback stages.

use crate::enumerable::Enumerable;
use crate::stage::{Cursor, Stage};

/// All elements of each part, part by part.
pub(crate) struct ConcatStage<'a, T> {
    parts: Vec<Enumerable<'a, T>>,
}

impl<'a, T> ConcatStage<'a, T> {
    pub(crate) fn new(parts: Vec<Enumerable<'a, T>>) -> Self {
        ConcatStage { parts }
    }
}

impl<'a, T: 'a> Stage<'a, T> for ConcatStage<'a, T> {
    fn cursor(&self) -> Cursor<'a, T> {
        Box::new(ConcatCursor {
            parts: self.parts.clone().into_iter(),
            current: None,
        })
    }

    fn known_len(&self) -> Option<usize> {
        self.parts
            .iter()
            .map(|part| part.stage().known_len())
            .sum()
    }

    fn get_at(&self, mut index: usize) -> Option<T> {
        for part in &self.parts {
            let len = part.stage().known_len()?;
            if index < len {
                return part.stage().get_at(index);
            }
            index -= len;
        }
        None
    }
}

struct ConcatCursor<'a, T> {
    parts: std::vec::IntoIter<Enumerable<'a, T>>,
    current: Option<Cursor<'a, T>>,
}

impl<'a, T: 'a> Iterator for ConcatCursor<'a, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            if let Some(cursor) = &mut self.current {
                if let Some(item) = cursor.next() {
                    return Some(item);
                }
                // A drained part is never polled again.
                self.current = None;
            }
            // Later parts are opened only once the earlier ones are drained.
            self.current = Some(self.parts.next()?.cursor());
        }
    }
}

/// The upstream elements, or a single fallback value when there are none.
pub(crate) struct DefaultIfEmptyStage<'a, T> {
    upstream: Enumerable<'a, T>,
    fallback: T,
}

impl<'a, T> DefaultIfEmptyStage<'a, T> {
    pub(crate) fn new(upstream: Enumerable<'a, T>, fallback: T) -> Self {
        DefaultIfEmptyStage { upstream, fallback }
    }
}

impl<'a, T: Clone + 'a> Stage<'a, T> for DefaultIfEmptyStage<'a, T> {
    fn cursor(&self) -> Cursor<'a, T> {
        Box::new(DefaultIfEmptyCursor {
            source: self.upstream.cursor(),
            fallback: Some(self.fallback.clone()),
        })
    }
}

struct DefaultIfEmptyCursor<'a, T> {
    source: Cursor<'a, T>,
    fallback: Option<T>,
}

impl<'a, T> Iterator for DefaultIfEmptyCursor<'a, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        match self.source.next() {
            Some(item) => {
                self.fallback = None;
                Some(item)
            }
            None => self.fallback.take(),
        }
    }
}
