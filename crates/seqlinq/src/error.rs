//! Error types for the seqlinq crate.

use thiserror::Error;

/// Errors raised by terminal operations and the explicit enumerator protocol.
///
/// Operator construction never fails: every selector, predicate and comparer
/// is a required generic parameter, so a pipeline with a missing callback
/// does not compile. Panics raised inside callbacks are not caught and reach
/// the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinqError {
    /// The operation needs at least one element and the sequence was empty.
    #[error("sequence contains no elements")]
    SequenceEmpty,

    /// No element satisfied the predicate.
    #[error("sequence contains no matching element")]
    NoMatch,

    /// More than one element matched where exactly one was expected.
    #[error("sequence contains more than one matching element")]
    MoreThanOne,

    /// Index outside `[0, len)`.
    #[error("index {index} is out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// A structural contract was violated.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A source was given arguments it cannot represent.
    #[error("argument out of range: {0}")]
    ArgumentOutOfRange(String),
}

impl LinqError {
    /// Create an invalid-operation error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }

    /// Create an argument-out-of-range error.
    pub fn argument(msg: impl Into<String>) -> Self {
        Self::ArgumentOutOfRange(msg.into())
    }

    /// Create an index-out-of-range error.
    pub fn out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }
}

/// Result type for seqlinq operations.
pub type Result<T> = std::result::Result<T, LinqError>;
