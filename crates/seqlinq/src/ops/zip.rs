//! Positional pairing of two sequences.

use std::rc::Rc;

use crate::enumerable::Enumerable;
use crate::stage::{Cursor, Stage};

pub(crate) struct ZipStage<'a, T, U, R> {
    first: Enumerable<'a, T>,
    second: Enumerable<'a, U>,
    combine: Rc<dyn Fn(T, U) -> R + 'a>,
}

impl<'a, T, U, R> ZipStage<'a, T, U, R> {
    pub(crate) fn new(
        first: Enumerable<'a, T>,
        second: Enumerable<'a, U>,
        combine: Rc<dyn Fn(T, U) -> R + 'a>,
    ) -> Self {
        ZipStage {
            first,
            second,
            combine,
        }
    }
}

impl<'a, T: 'a, U: 'a, R: 'a> Stage<'a, R> for ZipStage<'a, T, U, R> {
    fn cursor(&self) -> Cursor<'a, R> {
        Box::new(ZipCursor {
            first: self.first.cursor(),
            second: self.second.cursor(),
            combine: Rc::clone(&self.combine),
        })
    }

    fn known_len(&self) -> Option<usize> {
        let a = self.first.stage().known_len()?;
        let b = self.second.stage().known_len()?;
        Some(a.min(b))
    }

    fn get_at(&self, index: usize) -> Option<R> {
        let a = self.first.stage().get_at(index)?;
        let b = self.second.stage().get_at(index)?;
        Some((self.combine)(a, b))
    }
}

struct ZipCursor<'a, T, U, R> {
    first: Cursor<'a, T>,
    second: Cursor<'a, U>,
    combine: Rc<dyn Fn(T, U) -> R + 'a>,
}

impl<'a, T, U, R> Iterator for ZipCursor<'a, T, U, R> {
    type Item = R;

    fn next(&mut self) -> Option<R> {
        let a = self.first.next()?;
        let b = self.second.next()?;
        Some((self.combine)(a, b))
    }
}

#[cfg(test)]
mod tests {
    use crate::enumerable::Enumerable;

    #[test]
    fn stops_at_shorter_side() {
        let nums = Enumerable::from_vec(vec![1, 2, 3]);
        let words = Enumerable::from_vec(vec!["one", "two"]);

        let zipped = nums.zip(&words, |n, w| format!("{n}={w}"));
        assert_eq!(zipped.to_vec(), vec!["1=one", "2=two"]);
        assert_eq!(zipped.count(), 2);
    }

    #[test]
    fn zip_with_unbounded_side() {
        let letters = Enumerable::from_vec(vec!['a', 'b']);
        let naturals = Enumerable::from_fn(|| 0..);

        let zipped = letters.zip(&naturals, |c, i| (i, c));
        assert_eq!(zipped.to_vec(), vec![(0, 'a'), (1, 'b')]);
    }
}
