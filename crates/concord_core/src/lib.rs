//! CONCORD Core Types
//!
//! Pure types and logic shared by every CONCORD crate: rank identity, the
//! process-group capability, guard outcomes, and environment configuration.
//! Nothing in this crate performs collective I/O.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod group;
pub mod outcome;
pub mod rank;

// Re-exports
pub use config::{ConcordConfig, LogFormat};
pub use error::{CollectiveError, CollectiveResult};
pub use group::{ProcessGroup, checked_all_gather};
pub use outcome::{GuardOutcome, decide};
pub use rank::Rank;
