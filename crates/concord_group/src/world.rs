//! MPI world communicator as a process group.

use crate::GroupInitError;
use concord_core::{CollectiveResult, ProcessGroup, Rank};
use mpi::environment::Universe;
use mpi::topology::SimpleCommunicator;
use mpi::traits::*;
use std::fmt;

/// The `MPI_COMM_WORLD` group of an MPI launch.
///
/// Owns the MPI universe; dropping the group finalizes MPI.
pub struct WorldGroup {
    // Declared before `_universe` so it is released before MPI_Finalize.
    world: SimpleCommunicator,
    rank: Rank,
    size: usize,
    _universe: Universe,
}

impl WorldGroup {
    /// Initialize MPI and bind to the world communicator
    ///
    /// # Errors
    ///
    /// Returns error if MPI was already initialized in this process or
    /// reports an impossible rank/size
    pub fn init() -> Result<Self, GroupInitError> {
        let universe = mpi::initialize().ok_or(GroupInitError::AlreadyInitialized)?;
        let world = universe.world();
        let (rank, size) = (world.rank(), world.size());
        if size < 1 || rank < 0 || rank >= size {
            return Err(GroupInitError::InvalidTopology {
                rank: i64::from(rank),
                size: i64::from(size),
            });
        }

        Ok(Self {
            world,
            rank: Rank::new(rank as usize),
            size: size as usize,
            _universe: universe,
        })
    }
}

impl ProcessGroup for WorldGroup {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn all_gather(&self, local: bool) -> CollectiveResult<Vec<bool>> {
        let mut flags = vec![0u8; self.size];
        self.world.all_gather_into(&u8::from(local), &mut flags[..]);
        Ok(flags.into_iter().map(|flag| flag != 0).collect())
    }
}

impl fmt::Debug for WorldGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorldGroup")
            .field("rank", &self.rank)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}
