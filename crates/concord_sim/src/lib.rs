//! CONCORD Simulation
//!
//! Runs several ranks as threads of one process so the guard protocol can be
//! exercised without a message-passing launcher.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod failure;
pub mod harness;
pub mod local;

pub use failure::{FailureKind, FailurePlan, InjectedFailure};
pub use harness::{RankReport, SimHarness, SimResult};
pub use local::{LocalCluster, LocalGroup};
