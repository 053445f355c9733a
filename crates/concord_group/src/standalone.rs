//! Single-process stand-in for a real group.

use concord_core::{CollectiveResult, ProcessGroup, Rank};

/// Group of one: rank 0, size 1, and an all-gather that never leaves the
/// process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StandaloneGroup;

impl StandaloneGroup {
    /// Create the standalone group
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ProcessGroup for StandaloneGroup {
    fn rank(&self) -> Rank {
        Rank::ROOT
    }

    fn size(&self) -> usize {
        1
    }

    fn all_gather(&self, local: bool) -> CollectiveResult<Vec<bool>> {
        Ok(vec![local])
    }
}
