//! Group selection errors.

use crate::LauncherFamily;

/// Errors selecting the process group at startup
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GroupInitError {
    /// A launcher was detected but no message-passing runtime is compiled in
    #[error("launched by {launcher} but built without MPI support (enable the `mpi` feature)")]
    RuntimeUnavailable {
        /// Detected launcher family
        launcher: LauncherFamily,
    },

    /// The message-passing runtime was already initialised in this process
    #[error("message-passing runtime already initialized")]
    AlreadyInitialized,

    /// The runtime reported an impossible rank or size
    #[error("invalid group topology: rank {rank}, size {size}")]
    InvalidTopology {
        /// Reported rank
        rank: i64,
        /// Reported size
        size: i64,
    },
}
