//! Error types shared across the crate.

use thiserror::Error;

/// Result type for filter construction and factorization.
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors that can occur while constructing or factoring a filter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// Invalid lag geometry, coefficient vector, or factorization argument.
    /// Construction-time failures leave no partial state behind.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Wilson-Burg iterations did not satisfy the convergence criterion
    /// within the allowed number of iterations. The filter coefficients
    /// are left in their last-iteration state; callers may retry with a
    /// larger iteration budget or a looser tolerance.
    #[error("Wilson-Burg iterations failed to converge within {maxiter} iterations")]
    NotConverged { maxiter: usize },
}
