//! Group-by stage.
//!
//! The whole source is consumed on the first pull of a cursor; groupings then
//! come out in first-seen key order.

use std::rc::Rc;

use crate::enumerable::Enumerable;
use crate::lookup::{Grouping, Lookup, SharedComparer};
use crate::ops::set::KeyFn;
use crate::stage::{Cursor, Stage};

pub(crate) struct GroupByStage<'a, T, K, V> {
    upstream: Enumerable<'a, T>,
    key: KeyFn<'a, T, K>,
    element: Rc<dyn Fn(T) -> V + 'a>,
    comparer: SharedComparer<'a, K>,
}

impl<'a, T, K, V> GroupByStage<'a, T, K, V> {
    pub(crate) fn new(
        upstream: Enumerable<'a, T>,
        key: KeyFn<'a, T, K>,
        element: Rc<dyn Fn(T) -> V + 'a>,
        comparer: SharedComparer<'a, K>,
    ) -> Self {
        GroupByStage {
            upstream,
            key,
            element,
            comparer,
        }
    }
}

impl<'a, T: 'a, K: 'a, V: 'a> Stage<'a, Grouping<K, V>> for GroupByStage<'a, T, K, V> {
    fn cursor(&self) -> Cursor<'a, Grouping<K, V>> {
        let upstream = self.upstream.clone();
        let key = Rc::clone(&self.key);
        let element = Rc::clone(&self.element);
        let comparer = Rc::clone(&self.comparer);
        let mut pending = Some(move || {
            Lookup::build_shared(
                upstream.iter(),
                move |item: &T| key(item),
                move |item| element(item),
                comparer,
            )
            .into_groupings()
        });
        let mut groups: Option<std::vec::IntoIter<Grouping<K, V>>> = None;
        Box::new(std::iter::from_fn(move || {
            if let Some(build) = pending.take() {
                groups = Some(build().into_iter());
            }
            groups.as_mut()?.next()
        }))
    }
}
