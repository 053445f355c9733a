//! CONCORD Process Groups
//!
//! Decides once, at process start, whether this process belongs to a
//! message-passing launch, and hands out the matching [`ProcessGroup`]:
//! the runtime's world group, or a single-rank standalone stand-in.
//!
//! [`ProcessGroup`]: concord_core::ProcessGroup

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod detect;
pub mod error;
pub mod handle;
pub mod standalone;
#[cfg(feature = "mpi")]
pub mod world;

pub use detect::{LauncherFamily, detect_launcher, is_multiprocess, is_multiprocess_in, launcher};
pub use error::GroupInitError;
pub use handle::GroupHandle;
pub use standalone::StandaloneGroup;
#[cfg(feature = "mpi")]
pub use world::WorldGroup;
