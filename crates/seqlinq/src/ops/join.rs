//! Inner join and group join.
//!
//! Both stages build a [`Lookup`] over the inner sequence on the first pull of
//! a cursor, before any outer element is read, and keep it for the rest of
//! that enumeration. Output follows outer order; within one outer element,
//! matches follow inner first-seen order.

use std::rc::Rc;

use crate::enumerable::Enumerable;
use crate::lookup::{Lookup, SharedComparer};
use crate::ops::set::KeyFn;
use crate::stage::{Cursor, Stage};

/// Parameters shared by join and group join.
pub(crate) struct JoinKeys<'a, O, I, K> {
    pub(crate) inner: Enumerable<'a, I>,
    pub(crate) outer_key: KeyFn<'a, O, K>,
    pub(crate) inner_key: KeyFn<'a, I, K>,
    pub(crate) comparer: SharedComparer<'a, K>,
}

impl<'a, O, I, K> Clone for JoinKeys<'a, O, I, K> {
    fn clone(&self) -> Self {
        JoinKeys {
            inner: self.inner.clone(),
            outer_key: Rc::clone(&self.outer_key),
            inner_key: Rc::clone(&self.inner_key),
            comparer: Rc::clone(&self.comparer),
        }
    }
}

impl<'a, O, I: 'a, K: 'a> JoinKeys<'a, O, I, K> {
    fn build_lookup(&self) -> Lookup<'a, K, I> {
        let inner_key = Rc::clone(&self.inner_key);
        Lookup::build_shared(
            self.inner.iter(),
            move |item: &I| inner_key(item),
            |item| item,
            Rc::clone(&self.comparer),
        )
    }
}

// ============================================================================
// Join
// ============================================================================

pub(crate) struct JoinStage<'a, O, I, K, R> {
    outer: Enumerable<'a, O>,
    keys: JoinKeys<'a, O, I, K>,
    result: Rc<dyn Fn(&O, &I) -> R + 'a>,
}

impl<'a, O, I, K, R> JoinStage<'a, O, I, K, R> {
    pub(crate) fn new(
        outer: Enumerable<'a, O>,
        keys: JoinKeys<'a, O, I, K>,
        result: Rc<dyn Fn(&O, &I) -> R + 'a>,
    ) -> Self {
        JoinStage {
            outer,
            keys,
            result,
        }
    }
}

impl<'a, O: 'a, I: 'a, K: 'a, R: 'a> Stage<'a, R> for JoinStage<'a, O, I, K, R> {
    fn cursor(&self) -> Cursor<'a, R> {
        Box::new(JoinCursor {
            outer: self.outer.cursor(),
            keys: self.keys.clone(),
            result: Rc::clone(&self.result),
            lookup: None,
            current: None,
        })
    }
}

struct JoinCursor<'a, O, I, K, R> {
    outer: Cursor<'a, O>,
    keys: JoinKeys<'a, O, I, K>,
    result: Rc<dyn Fn(&O, &I) -> R + 'a>,
    lookup: Option<Lookup<'a, K, I>>,
    /// Current outer element, its group slot, and the next position in it.
    current: Option<(O, usize, usize)>,
}

impl<'a, O: 'a, I: 'a, K: 'a, R> Iterator for JoinCursor<'a, O, I, K, R> {
    type Item = R;

    fn next(&mut self) -> Option<R> {
        if self.lookup.is_none() {
            self.lookup = Some(self.keys.build_lookup());
        }
        let lookup = self.lookup.as_ref()?;
        loop {
            if let Some((outer, slot, pos)) = &mut self.current {
                let matches = lookup.at(*slot).values();
                if let Some(inner) = matches.get(*pos) {
                    *pos += 1;
                    return Some((self.result)(&*outer, inner));
                }
                self.current = None;
            }
            let outer = self.outer.next()?;
            let key = (self.keys.outer_key)(&outer);
            if let Some(slot) = lookup.slot_of(&key) {
                self.current = Some((outer, slot, 0));
            }
        }
    }
}

// ============================================================================
// Group join
// ============================================================================

pub(crate) struct GroupJoinStage<'a, O, I, K, R> {
    outer: Enumerable<'a, O>,
    keys: JoinKeys<'a, O, I, K>,
    result: Rc<dyn Fn(O, &[I]) -> R + 'a>,
}

impl<'a, O, I, K, R> GroupJoinStage<'a, O, I, K, R> {
    pub(crate) fn new(
        outer: Enumerable<'a, O>,
        keys: JoinKeys<'a, O, I, K>,
        result: Rc<dyn Fn(O, &[I]) -> R + 'a>,
    ) -> Self {
        GroupJoinStage {
            outer,
            keys,
            result,
        }
    }
}

impl<'a, O: 'a, I: 'a, K: 'a, R: 'a> Stage<'a, R> for GroupJoinStage<'a, O, I, K, R> {
    fn cursor(&self) -> Cursor<'a, R> {
        Box::new(GroupJoinCursor {
            outer: self.outer.cursor(),
            keys: self.keys.clone(),
            result: Rc::clone(&self.result),
            lookup: None,
        })
    }
}

struct GroupJoinCursor<'a, O, I, K, R> {
    outer: Cursor<'a, O>,
    keys: JoinKeys<'a, O, I, K>,
    result: Rc<dyn Fn(O, &[I]) -> R + 'a>,
    lookup: Option<Lookup<'a, K, I>>,
}

impl<'a, O: 'a, I: 'a, K: 'a, R> Iterator for GroupJoinCursor<'a, O, I, K, R> {
    type Item = R;

    fn next(&mut self) -> Option<R> {
        if self.lookup.is_none() {
            self.lookup = Some(self.keys.build_lookup());
        }
        let lookup = self.lookup.as_ref()?;
        let outer = self.outer.next()?;
        let key = (self.keys.outer_key)(&outer);
        Some((self.result)(outer, lookup.get(&key)))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use crate::enumerable::Enumerable;

    #[derive(Debug, Clone, PartialEq)]
    struct Order {
        id: u32,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Line {
        order_id: u32,
        item: &'static str,
    }

    fn orders() -> Enumerable<'static, Order> {
        Enumerable::from_vec(vec![Order { id: 1 }, Order { id: 2 }])
    }

    fn lines() -> Enumerable<'static, Line> {
        Enumerable::from_vec(vec![
            Line { order_id: 1, item: "a" },
            Line { order_id: 3, item: "x" },
            Line { order_id: 1, item: "b" },
        ])
    }

    #[test]
    fn join_yields_one_result_per_match() {
        let joined = orders().join(&lines(), |o| o.id, |l| l.order_id, |o, l| (o.id, l.item));
        assert_eq!(joined.to_vec(), vec![(1, "a"), (1, "b")]);
    }

    #[test]
    fn group_join_yields_one_result_per_outer() {
        let joined = orders().group_join(&lines(), |o| o.id, |l| l.order_id, |o, ls| {
            (o.id, ls.iter().map(|l| l.item).collect::<Vec<_>>())
        });
        assert_eq!(joined.to_vec(), vec![(1, vec!["a", "b"]), (2, vec![])]);
        assert_eq!(joined.count(), 2);
    }

    #[test]
    fn lookup_is_built_before_outer_is_probed() {
        let log = RefCell::new(Vec::new());
        let outer = Enumerable::from_vec(vec![1, 2]);
        let inner = Enumerable::from_vec(vec![2, 1]);

        let joined = outer.join(
            &inner,
            |o| {
                log.borrow_mut().push(format!("outer {o}"));
                *o
            },
            |i| {
                log.borrow_mut().push(format!("inner {i}"));
                *i
            },
            |o, i| o + i,
        );

        assert!(log.borrow().is_empty());
        assert_eq!(joined.to_vec(), vec![2, 4]);
        assert_eq!(
            *log.borrow(),
            vec!["inner 2", "inner 1", "outer 1", "outer 2"]
        );
    }

    #[test]
    fn join_with_comparer() {
        let left = Enumerable::from_vec(vec!["Key"]);
        let right = Enumerable::from_vec(vec![("KEY", 1), ("key", 2), ("other", 3)]);

        let joined = left.join_with(
            &right,
            |s| s.to_string(),
            |p| p.0.to_string(),
            |_, p| p.1,
            crate::comparer::IgnoreAsciiCase::new(),
        );
        assert_eq!(joined.to_vec(), vec![1, 2]);
    }
}
