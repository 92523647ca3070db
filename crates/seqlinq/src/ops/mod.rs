//! Lazy operator stages.
//!
//! Each submodule defines the stages for one family of operators. The
//! public methods that build them live on [`Enumerable`](crate::Enumerable).

pub(crate) mod concat;
pub(crate) mod filter;
pub(crate) mod flatten;
pub(crate) mod group;
pub(crate) mod join;
pub(crate) mod partition;
pub(crate) mod project;
pub(crate) mod set;
pub(crate) mod zip;
