//! Seqlinq - Lazy, restartable query pipelines over in-memory sequences.
//!
//! Seqlinq provides a fluent API for composing query operators over any
//! sequence of values. It supports:
//!
//! - Filtering, projection and flattening, each with positional variants
//! - Hash joins, group joins and grouping with pluggable key equality
//! - Set algebra: distinct, union, intersect, except
//! - Stable multi-key ordering with radix fast paths for integer and
//!   timestamp keys
//! - Partitioning, concatenation and zipping
//! - Terminal aggregates, quantifiers and element access
//!
//! # Quick Start
//!
//! ```rust
//! use seqlinq::Enumerable;
//!
//! #[derive(Clone)]
//! struct Task {
//!     name: &'static str,
//!     priority: u32,
//!     archived: bool,
//! }
//!
//! let tasks = Enumerable::from_vec(vec![
//!     Task { name: "Write docs", priority: 3, archived: false },
//!     Task { name: "Fix bug", priority: 5, archived: false },
//!     Task { name: "Old task", priority: 1, archived: true },
//! ]);
//!
//! let open = tasks
//!     .filter(|t| !t.archived)
//!     .order_by_descending(|t| t.priority)
//!     .select(|t| t.name);
//!
//! assert_eq!(open.to_vec(), vec!["Fix bug", "Write docs"]);
//! ```
//!
//! # Pipeline Semantics
//!
//! Building a pipeline never reads the source:
//!
//! ```text
//! build  = record operator + parameters + upstream handle
//! pull   = open a fresh cursor, evaluate only what the consumer asks for
//! repeat = every enumeration restarts from the source with its own state
//! ```
//!
//! - **Lazy**: no selector or predicate runs before the first pull.
//! - **Restartable**: a pipeline can be enumerated any number of times, and
//!   interleaved enumerations never share a cursor.
//! - **Pure**: sources are never mutated.
//!
//! Operators that must see all their input (ordering, grouping, the inner
//! side of a join, the right side of intersect and except) buffer it on the
//! first pull of an enumeration and keep the buffer for that enumeration only.
//!
//! # Operators
//!
//! | Family | Methods |
//! |--------|---------|
//! | Filter / project | `filter`, `filter_indexed`, `select`, `select_indexed`, `select_many`, `select_many_with` |
//! | Join / group | `join`, `group_join`, `group_by`, `group_by_element` (+ `_with` comparer forms) |
//! | Order | `order_by`, `order_by_descending`, `order`, `order_descending`, then `then_by`, `then_by_descending` |
//! | Set | `distinct`, `distinct_by`, `union`, `intersect`, `except` (+ `_with`) |
//! | Partition | `take`, `skip`, `take_while`, `skip_while`, `reverse` |
//! | Combine | `concat`, `concat_all`, `append`, `prepend`, `zip`, `default_if_empty` |

mod collections;
mod comparer;
mod enumerable;
mod error;
mod key;
mod lookup;
mod ops;
mod order;
mod source;
mod stage;
mod terminal;

// Re-export public API
pub use collections::{Dictionary, HashSet, KeyValuePair, List};
pub use comparer::{DefaultComparer, EqualityComparer, FnComparer, IgnoreAsciiCase, KeyComparer};
pub use enumerable::Enumerable;
pub use error::{LinqError, Result};
pub use key::{SortKey, Timestamp};
pub use lookup::{Grouping, Lookup};
pub use order::{OrderedEnumerable, SortOptions};
pub use stage::{Enumerator, Iter};
