//! CONCORD
//!
//! Collective failure propagation for groups of cooperating processes: wrap
//! a block in [`Runtime::run_guarded`] and a failure on any rank becomes a
//! failure on every rank, instead of leaving peers stuck in a later
//! collective.
//!
//! ```no_run
//! let runtime = concord::startup()?;
//! runtime.run_guarded(|| -> Result<(), std::io::Error> {
//!     // work whose failure must be visible to every rank
//!     Ok(())
//! })?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod startup;
pub mod telemetry;

pub use error::StartupError;
pub use startup::{Runtime, startup, startup_with};

pub use concord_core::{
    CollectiveError, ConcordConfig, GuardOutcome, LogFormat, ProcessGroup, Rank,
};
pub use concord_group::{
    GroupHandle, GroupInitError, LauncherFamily, StandaloneGroup, is_multiprocess,
};
pub use concord_guard::{CollectiveFailGuard, GroupFailure, GuardError, GuardResult, run_guarded};
pub use concord_redirect::{RedirectError, redirect_standard_streams_to_rank_file};
