//! Errors raised by collective operations.

/// Collective result type
pub type CollectiveResult<T> = Result<T, CollectiveError>;

/// Failures of the all-gather collective itself.
///
/// A peer that never reaches the collective is not reported here: the call
/// blocks, and any detection is left to the underlying runtime.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectiveError {
    /// The runtime returned a sequence that does not cover the group
    #[error("all-gather returned {actual} values for a group of size {expected}")]
    SizeMismatch {
        /// Group size
        expected: usize,
        /// Number of values received
        actual: usize,
    },

    /// A participant panicked while holding the exchange state
    #[error("collective exchange state poisoned")]
    Poisoned,

    /// The underlying runtime reported a failure
    #[error("collective runtime failure: {0}")]
    Runtime(String),
}
