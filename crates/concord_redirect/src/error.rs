//! Redirection errors.

use std::io;
use std::path::PathBuf;

/// Errors redirecting the standard streams. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum RedirectError {
    /// The rank file could not be created
    #[error("cannot open {}: {source}", path.display())]
    Open {
        /// Rank file path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Pending output could not be flushed before the switch
    #[error("flush failed: {0}")]
    Flush(#[source] io::Error),

    /// dup2() failed.
    #[error("dup2 onto fd {fd} failed: {source}")]
    Dup {
        /// Descriptor being replaced
        fd: i32,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Streams were already redirected in this process
    #[error("standard streams already redirected to {}", path.display())]
    AlreadyRedirected {
        /// Current destination
        path: PathBuf,
    },

    /// Descriptor-level redirection is not available on this platform
    #[error("stream redirection is not supported on this platform")]
    Unsupported,
}
