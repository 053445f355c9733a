//! Per-rank outcome of a guarded block.

use crate::Rank;
use serde::{Deserialize, Serialize};

/// What one rank observed after a guarded block and its status exchange.
///
/// Exactly one outcome is produced per rank per guarded invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuardOutcome {
    /// No rank failed
    Clean,
    /// This rank failed; its own error is re-raised
    LocalFailure,
    /// This rank succeeded but peers failed
    RemoteFailure {
        /// Every failing rank, ascending
        failed_ranks: Vec<Rank>,
    },
}

impl GuardOutcome {
    /// Check if the block must be reported as failed on this rank
    #[must_use]
    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::Clean)
    }
}

/// Decision table applied once the failure flags have been gathered.
///
/// A local failure always wins, even when peers failed too: the failing rank
/// holds the richest diagnostic. Otherwise any raised flag yields a remote
/// failure listing the flagged ranks in rank order.
#[must_use]
pub fn decide(local_failed: bool, flags: &[bool]) -> GuardOutcome {
    if local_failed {
        return GuardOutcome::LocalFailure;
    }

    let failed_ranks: Vec<Rank> = flags
        .iter()
        .enumerate()
        .filter(|(_, failed)| **failed)
        .map(|(index, _)| Rank::new(index))
        .collect();

    if failed_ranks.is_empty() {
        GuardOutcome::Clean
    } else {
        GuardOutcome::RemoteFailure { failed_ranks }
    }
}
