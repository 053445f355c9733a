//! CONCORD Collective Fail Guard
//!
//! Wraps a block of work so that a failure on any rank is observed by every
//! rank of the group. After the block finishes, each rank contributes a
//! single "did I fail" flag to an all-gather; error payloads never leave the
//! rank that produced them.
//!
//! - A rank that failed re-raises its own error (or resumes its own panic).
//! - A rank that succeeded while peers failed gets a [`GroupFailure`] naming
//!   the failing ranks.
//! - If nobody failed, the block's value is returned.
//!
//! Single-rank groups skip the exchange entirely.
//!
//! A peer that never reaches the exchange blocks every other rank inside it;
//! no timeout is applied here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod guard;

pub use error::{GroupFailure, GuardError, GuardResult};
pub use guard::{CollectiveFailGuard, run_guarded};
