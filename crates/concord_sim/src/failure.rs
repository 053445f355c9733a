//! Failure injection for simulated ranks.

use concord_core::Rank;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a rank fails inside the guarded block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// The block returns an error
    Error,
    /// The block panics
    Panic,
}

/// Error returned by a rank planned to fail with [`FailureKind::Error`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("injected failure on rank {rank}")]
pub struct InjectedFailure {
    /// Failing rank
    pub rank: Rank,
}

/// Which ranks fail, and how
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailurePlan {
    failures: BTreeMap<Rank, FailureKind>,
}

impl FailurePlan {
    /// Plan with no failures
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Plan where every listed rank returns an error
    #[must_use]
    pub fn errors_at<I>(ranks: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        ranks
            .into_iter()
            .fold(Self::new(), |plan, index| plan.fail_at(Rank::new(index)))
    }

    /// Make `rank` return an error
    #[must_use]
    pub fn fail_at(mut self, rank: Rank) -> Self {
        self.failures.insert(rank, FailureKind::Error);
        self
    }

    /// Make `rank` panic
    #[must_use]
    pub fn panic_at(mut self, rank: Rank) -> Self {
        self.failures.insert(rank, FailureKind::Panic);
        self
    }

    /// Planned failure for `rank`
    #[must_use]
    pub fn kind_for(&self, rank: Rank) -> Option<FailureKind> {
        self.failures.get(&rank).copied()
    }

    /// Failing ranks, ascending
    #[must_use]
    pub fn failing_ranks(&self) -> Vec<Rank> {
        self.failures.keys().copied().collect()
    }

    /// Check if no rank fails
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Run the planned behaviour of `rank` as a guarded body.
    ///
    /// # Errors
    ///
    /// Returns [`InjectedFailure`] if `rank` is planned to fail with an error
    ///
    /// # Panics
    ///
    /// Panics if `rank` is planned to fail with a panic
    pub fn apply(&self, rank: Rank) -> Result<(), InjectedFailure> {
        match self.kind_for(rank) {
            None => Ok(()),
            Some(FailureKind::Error) => Err(InjectedFailure { rank }),
            Some(FailureKind::Panic) => panic!("injected panic on rank {rank}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_plan() {
        let plan = FailurePlan::new();
        assert!(plan.is_empty());
        assert_eq!(plan.apply(Rank::ROOT), Ok(()));
    }

    #[test]
    fn test_errors_at() {
        let plan = FailurePlan::errors_at([2, 0]);
        assert_eq!(plan.failing_ranks(), vec![Rank::new(0), Rank::new(2)]);
        assert_eq!(plan.kind_for(Rank::new(2)), Some(FailureKind::Error));
        assert_eq!(plan.kind_for(Rank::new(1)), None);
    }

    #[test]
    fn test_apply_error() {
        let plan = FailurePlan::new().fail_at(Rank::new(1));
        assert_eq!(plan.apply(Rank::new(1)), Err(InjectedFailure { rank: Rank::new(1) }));
        assert_eq!(plan.apply(Rank::new(0)), Ok(()));
    }

    #[test]
    #[should_panic(expected = "injected panic on rank 3")]
    fn test_apply_panic() {
        let _ = FailurePlan::new().panic_at(Rank::new(3)).apply(Rank::new(3));
    }

    #[test]
    fn test_later_entry_wins() {
        let plan = FailurePlan::new().fail_at(Rank::new(1)).panic_at(Rank::new(1));
        assert_eq!(plan.kind_for(Rank::new(1)), Some(FailureKind::Panic));
    }

    #[test]
    fn test_injected_failure_display() {
        let err = InjectedFailure { rank: Rank::new(4) };
        assert_eq!(err.to_string(), "injected failure on rank 4");
    }

    #[test]
    fn test_plan_serializes() {
        let plan = FailurePlan::new().fail_at(Rank::new(0)).panic_at(Rank::new(2));
        let json = serde_json::to_string(&plan).unwrap();
        let back: FailurePlan = serde_json::from_str(&json).unwrap();
        assert_eq!(back, plan);
    }
}
