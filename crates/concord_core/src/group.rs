//! The process-group capability.

use crate::{CollectiveError, CollectiveResult, Rank};

/// A fixed group of cooperating processes.
///
/// Real message-passing groups and the standalone stand-in both implement
/// this trait, so code that coordinates through a group never needs to know
/// which one it holds. Rank and size are fixed for the lifetime of the handle.
pub trait ProcessGroup {
    /// Rank of the calling process
    fn rank(&self) -> Rank;

    /// Number of processes in the group, always at least 1
    fn size(&self) -> usize;

    /// Blocking all-gather of one flag per rank.
    ///
    /// Every rank must call this for any rank to return. The result holds one
    /// value per rank, indexed by rank regardless of arrival order.
    ///
    /// # Errors
    ///
    /// Returns error if the underlying runtime reports a failure
    fn all_gather(&self, local: bool) -> CollectiveResult<Vec<bool>>;

    /// Check if this is a single-process group
    fn is_standalone(&self) -> bool {
        self.size() == 1
    }
}

impl<G: ProcessGroup + ?Sized> ProcessGroup for &G {
    fn rank(&self) -> Rank {
        (**self).rank()
    }

    fn size(&self) -> usize {
        (**self).size()
    }

    fn all_gather(&self, local: bool) -> CollectiveResult<Vec<bool>> {
        (**self).all_gather(local)
    }
}

/// All-gather that rejects results not covering exactly `group.size()` ranks.
///
/// # Errors
///
/// Returns error if the collective fails or returns the wrong number of values
pub fn checked_all_gather<G: ProcessGroup + ?Sized>(
    group: &G,
    local: bool,
) -> CollectiveResult<Vec<bool>> {
    let flags = group.all_gather(local)?;
    if flags.len() != group.size() {
        return Err(CollectiveError::SizeMismatch {
            expected: group.size(),
            actual: flags.len(),
        });
    }
    Ok(flags)
}
