//! Rank identity within a process group.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a process within its group, in `[0, size)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rank(usize);

impl Rank {
    /// The first rank of every group, and the only rank of a standalone run
    pub const ROOT: Rank = Rank(0);

    /// Create a rank from its index
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the index
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }

    /// Check if this is rank 0
    #[must_use]
    pub const fn is_root(self) -> bool {
        self.0 == 0
    }

    /// Name of the per-rank output file, e.g. `3.out`
    #[must_use]
    pub fn output_file_name(self) -> String {
        format!("{}.out", self.0)
    }
}

impl From<usize> for Rank {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
