//! Process-group selection.

use crate::{GroupInitError, LauncherFamily, StandaloneGroup, detect};
use concord_core::{CollectiveResult, ProcessGroup, Rank};

#[cfg(feature = "mpi")]
use crate::WorldGroup;

/// The process group chosen at startup.
///
/// Created once, then passed by reference to whatever needs to coordinate.
/// Rank and size never change for the lifetime of the handle.
#[derive(Debug)]
pub enum GroupHandle {
    /// Not launched by a message-passing launcher
    Standalone(StandaloneGroup),
    /// World group of an MPI launch
    #[cfg(feature = "mpi")]
    World(WorldGroup),
}

impl GroupHandle {
    /// Select the group for this process from the cached launcher detection
    ///
    /// # Errors
    ///
    /// Returns error if a launcher was detected but the runtime cannot be bound
    pub fn select() -> Result<Self, GroupInitError> {
        Self::select_for(detect::launcher())
    }

    /// Select the group for a given detection result
    ///
    /// # Errors
    ///
    /// Returns error if a launcher is given but the runtime cannot be bound
    pub fn select_for(launcher: Option<LauncherFamily>) -> Result<Self, GroupInitError> {
        let Some(launcher) = launcher else {
            tracing::debug!("no launcher detected, running standalone");
            return Ok(Self::standalone());
        };
        Self::bind_world(launcher)
    }

    /// Standalone handle
    #[must_use]
    pub const fn standalone() -> Self {
        Self::Standalone(StandaloneGroup::new())
    }

    #[cfg(feature = "mpi")]
    fn bind_world(launcher: LauncherFamily) -> Result<Self, GroupInitError> {
        let world = WorldGroup::init()?;
        tracing::debug!(
            %launcher,
            rank = %world.rank(),
            size = world.size(),
            "bound to world group"
        );
        Ok(Self::World(world))
    }

    #[cfg(not(feature = "mpi"))]
    fn bind_world(launcher: LauncherFamily) -> Result<Self, GroupInitError> {
        Err(GroupInitError::RuntimeUnavailable { launcher })
    }

    fn inner(&self) -> &dyn ProcessGroup {
        match self {
            Self::Standalone(group) => group,
            #[cfg(feature = "mpi")]
            Self::World(group) => group,
        }
    }
}

impl ProcessGroup for GroupHandle {
    fn rank(&self) -> Rank {
        self.inner().rank()
    }

    fn size(&self) -> usize {
        self.inner().size()
    }

    fn all_gather(&self, local: bool) -> CollectiveResult<Vec<bool>> {
        self.inner().all_gather(local)
    }
}
