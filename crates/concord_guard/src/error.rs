//! Errors surfaced by a guarded block.

use concord_core::{CollectiveError, GuardOutcome, Rank};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

/// Guarded block result type
pub type GuardResult<T, E> = Result<T, GuardError<E>>;

/// Synthesized on ranks that succeeded while peers failed.
///
/// Carries only which ranks failed; their errors stay on those ranks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("guarded block failed on rank(s) {}", join_ranks(.failed_ranks))]
pub struct GroupFailure {
    /// Failing ranks, ascending
    pub failed_ranks: Vec<Rank>,
}

impl GroupFailure {
    /// Create a group failure
    #[must_use]
    pub fn new(failed_ranks: Vec<Rank>) -> Self {
        Self { failed_ranks }
    }
}

fn join_ranks(ranks: &[Rank]) -> String {
    ranks
        .iter()
        .map(Rank::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Error returned by a guarded block
#[derive(Debug)]
pub enum GuardError<E> {
    /// This rank's own error, unchanged
    Local(E),
    /// This rank's own error, raised after the status exchange also failed,
    /// so peers may not have learned about it
    LocalUnconfirmed {
        /// The body's error, unchanged
        local: E,
        /// Error raised by the exchange
        collective: CollectiveError,
    },
    /// Peer ranks failed
    Group(GroupFailure),
    /// The status exchange itself failed
    Collective(CollectiveError),
}

impl<E> GuardError<E> {
    /// Check if this is the rank's own error
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_) | Self::LocalUnconfirmed { .. })
    }

    /// Take the rank's own error
    #[must_use]
    pub fn into_local(self) -> Option<E> {
        match self {
            Self::Local(err) | Self::LocalUnconfirmed { local: err, .. } => Some(err),
            _ => None,
        }
    }

    /// Error raised by the status exchange, whether or not this rank failed
    #[must_use]
    pub fn collective(&self) -> Option<&CollectiveError> {
        match self {
            Self::Collective(err) | Self::LocalUnconfirmed { collective: err, .. } => Some(err),
            _ => None,
        }
    }

    /// Failing peer ranks, for a group failure
    #[must_use]
    pub fn failed_ranks(&self) -> Option<&[Rank]> {
        match self {
            Self::Group(failure) => Some(&failure.failed_ranks),
            _ => None,
        }
    }

    /// The outcome this error reports, if the exchange completed
    #[must_use]
    pub fn outcome(&self) -> Option<GuardOutcome> {
        match self {
            Self::Local(_) | Self::LocalUnconfirmed { .. } => Some(GuardOutcome::LocalFailure),
            Self::Group(failure) => Some(GuardOutcome::RemoteFailure {
                failed_ranks: failure.failed_ranks.clone(),
            }),
            Self::Collective(_) => None,
        }
    }
}

impl<E: fmt::Display> fmt::Display for GuardError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(err) | Self::LocalUnconfirmed { local: err, .. } => write!(f, "{}", err),
            Self::Group(failure) => write!(f, "{}", failure),
            Self::Collective(err) => write!(f, "failure status exchange failed: {}", err),
        }
    }
}

impl<E: Error + 'static> Error for GuardError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Local(err) | Self::LocalUnconfirmed { local: err, .. } => err.source(),
            Self::Group(_) => None,
            Self::Collective(err) => Some(err),
        }
    }
}

impl<E> From<GroupFailure> for GuardError<E> {
    fn from(failure: GroupFailure) -> Self {
        Self::Group(failure)
    }
}

impl<E> From<CollectiveError> for GuardError<E> {
    fn from(err: CollectiveError) -> Self {
        Self::Collective(err)
    }
}
