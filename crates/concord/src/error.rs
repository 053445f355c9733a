//! Startup errors.

use concord_group::GroupInitError;
use concord_redirect::RedirectError;

/// Errors during process startup. None of them are recoverable.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The process group could not be selected
    #[error("group selection failed: {0}")]
    Group(#[from] GroupInitError),

    /// Standard streams could not be redirected to the rank file
    #[error("stream redirection failed: {0}")]
    Redirect(#[from] RedirectError),

    /// The log filter directive is invalid
    #[error("invalid log filter {filter:?}: {reason}")]
    LogFilter {
        /// Offending directive
        filter: String,
        /// Parser message
        reason: String,
    },

    /// A global subscriber was already installed
    #[error("cannot install tracing subscriber: {0}")]
    Subscriber(String),
}
