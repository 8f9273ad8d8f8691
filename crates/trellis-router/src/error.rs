//! Route pattern errors.

use thiserror::Error;

/// A route pattern that cannot be inserted into the tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// A `:` segment without a parameter name.
    #[error("empty parameter name in route pattern {0:?}")]
    EmptyParam(String),

    /// A `*` segment followed by further segments.
    #[error("wildcard must be the last segment in route pattern {0:?}")]
    WildcardNotLast(String),
}
