//! Harness running one guarded block across simulated ranks.

use crate::{FailurePlan, LocalCluster};
use concord_core::{CollectiveResult, GuardOutcome, ProcessGroup, Rank};
use concord_guard::{GuardError, run_guarded};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

/// What one simulated rank observed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankReport {
    /// Reporting rank
    pub rank: Rank,
    /// Outcome of the guarded block on this rank
    pub outcome: GuardOutcome,
    /// Error or panic message surfaced on this rank
    pub message: Option<String>,
}

/// Result of one simulated run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimResult {
    /// Reports ordered by rank
    pub reports: Vec<RankReport>,
    /// Total all-gather calls made across ranks
    pub collective_calls: usize,
}

impl SimResult {
    /// Check if every rank completed cleanly
    #[must_use]
    pub fn all_clean(&self) -> bool {
        self.reports.iter().all(|report| report.outcome == GuardOutcome::Clean)
    }

    /// Check if every rank reported a failure
    #[must_use]
    pub fn all_failed(&self) -> bool {
        self.reports.iter().all(|report| report.outcome.is_failure())
    }

    /// Report of `rank`
    #[must_use]
    pub fn report(&self, rank: Rank) -> Option<&RankReport> {
        self.reports.get(rank.index())
    }
}

/// Runs a guarded block on one thread per rank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimHarness {
    size: usize,
}

impl SimHarness {
    /// Create a harness for `size` ranks
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self { size }
    }

    /// Run the plan's block on every rank through the guard.
    ///
    /// # Errors
    ///
    /// Returns error if any rank's status exchange failed
    ///
    /// # Panics
    ///
    /// Panics if the harness was created with zero ranks
    pub fn run(&self, plan: &FailurePlan) -> CollectiveResult<SimResult> {
        let cluster = LocalCluster::new(self.size);
        tracing::debug!(
            size = self.size,
            failing = ?plan.failing_ranks(),
            "starting simulated run"
        );

        let reports = thread::scope(|scope| {
            let handles: Vec<_> = cluster
                .groups()
                .into_iter()
                .map(|group| {
                    scope.spawn(move || {
                        let rank = group.rank();
                        let result = panic::catch_unwind(AssertUnwindSafe(|| {
                            run_guarded(&group, || plan.apply(rank))
                        }));
                        report_for(rank, result)
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or_else(|payload| panic::resume_unwind(payload)))
                .collect::<CollectiveResult<Vec<_>>>()
        })?;

        Ok(SimResult {
            reports,
            collective_calls: cluster.collective_calls(),
        })
    }
}

fn report_for<E: std::fmt::Display>(
    rank: Rank,
    result: thread::Result<Result<(), GuardError<E>>>,
) -> CollectiveResult<RankReport> {
    let (outcome, message) = match result {
        Ok(Ok(())) => (GuardOutcome::Clean, None),
        Ok(Err(GuardError::Collective(err))) => return Err(err),
        Ok(Err(err)) => {
            let message = err.to_string();
            match err.outcome() {
                Some(outcome) => (outcome, Some(message)),
                None => (GuardOutcome::LocalFailure, Some(message)),
            }
        }
        Err(payload) => (GuardOutcome::LocalFailure, Some(panic_message(payload.as_ref()))),
    };
    Ok(RankReport { rank, outcome, message })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
