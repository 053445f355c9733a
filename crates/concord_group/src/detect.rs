//! Launcher detection from environment variable names.
//!
//! No single variable is exported by every MPI implementation, so each known
//! launcher family is recognised independently by its name prefix. Only
//! names are inspected; values are never parsed.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fmt;

/// Launcher families recognised by their environment prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LauncherFamily {
    /// Open MPI `mpirun`/`orterun`/`prterun`
    OpenMpi,
    /// MPIR process-acquisition interface
    Mpir,
    /// MPICH and Hydra-based launchers
    Mpich,
    /// PMI-1/PMI-2 launchers, including `srun --mpi=pmi2`
    Pmi,
    /// PMIx launchers
    Pmix,
}

impl LauncherFamily {
    /// All families, in the order they are checked
    pub const ALL: [LauncherFamily; 5] = [
        LauncherFamily::OpenMpi,
        LauncherFamily::Mpir,
        LauncherFamily::Mpich,
        LauncherFamily::Pmi,
        LauncherFamily::Pmix,
    ];

    /// Variable-name prefix exported by this family
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            LauncherFamily::OpenMpi => "OMPI_",
            LauncherFamily::Mpir => "MPIR_",
            LauncherFamily::Mpich => "MPICH_",
            LauncherFamily::Pmi => "PMI_",
            LauncherFamily::Pmix => "PMIX_",
        }
    }

    /// Family whose prefix starts `name`, if any
    #[must_use]
    pub fn matching(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|family| name.starts_with(family.prefix()))
    }

    /// Family whose prefix starts `name`, compared byte-wise so names that
    /// are not valid UTF-8 still match
    #[must_use]
    pub fn matching_os(name: &OsStr) -> Option<Self> {
        let bytes = name.as_encoded_bytes();
        Self::ALL
            .iter()
            .copied()
            .find(|family| bytes.starts_with(family.prefix().as_bytes()))
    }
}

impl fmt::Display for LauncherFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LauncherFamily::OpenMpi => "Open MPI",
            LauncherFamily::Mpir => "MPIR",
            LauncherFamily::Mpich => "MPICH",
            LauncherFamily::Pmi => "PMI",
            LauncherFamily::Pmix => "PMIx",
        };
        f.write_str(name)
    }
}

static DETECTED: OnceCell<Option<LauncherFamily>> = OnceCell::new();

/// Launcher that started this process, detected on first call and cached.
///
/// The execution model cannot change after launch, so later calls return the
/// first answer even if the environment has since been modified.
#[must_use]
pub fn launcher() -> Option<LauncherFamily> {
    *DETECTED.get_or_init(|| {
        let found = detect_launcher(std::env::vars_os().map(|(name, _)| name));
        tracing::debug!(launcher = ?found, "launcher detection");
        found
    })
}

/// Check if this process is one of several launched by a message-passing launcher
#[must_use]
pub fn is_multiprocess() -> bool {
    launcher().is_some()
}

/// Detect a launcher from a set of variable names.
///
/// Only the prefix has to be ASCII; the rest of a name may be any bytes.
pub fn detect_launcher<I, S>(names: I) -> Option<LauncherFamily>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    names
        .into_iter()
        .find_map(|name| LauncherFamily::matching_os(name.as_ref()))
}

/// Pure form of [`is_multiprocess`] over a set of variable names
pub fn is_multiprocess_in<I, S>(names: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    detect_launcher(names).is_some()
}
