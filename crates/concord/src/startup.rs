//! Process startup and the per-process runtime.

use crate::{StartupError, telemetry};
use concord_core::{ConcordConfig, ProcessGroup, Rank};
use concord_group::GroupHandle;
use concord_guard::{GuardResult, run_guarded};
use concord_redirect::redirect_standard_streams_to_rank_file;
use std::path::{Path, PathBuf};

/// Start this process using configuration from the environment.
///
/// Call once, first thing in `main`.
///
/// # Errors
///
/// See [`startup_with`]
pub fn startup() -> Result<Runtime, StartupError> {
    startup_with(ConcordConfig::from_env())
}

/// Start this process with an explicit configuration.
///
/// # Errors
///
/// Returns error if the process group cannot be selected, the streams
/// cannot be redirected, or logging cannot be installed
pub fn startup_with(config: ConcordConfig) -> Result<Runtime, StartupError> {
    let group = GroupHandle::select()?;
    Runtime::start(group, config)
}

/// Per-process state: the selected group and what startup did
#[derive(Debug)]
pub struct Runtime {
    group: GroupHandle,
    config: ConcordConfig,
    redirected: Option<PathBuf>,
}

impl Runtime {
    /// Finish startup around an already selected group.
    ///
    /// Redirection, when enabled, happens before the subscriber is installed
    /// so that log output lands in the rank file too.
    ///
    /// # Errors
    ///
    /// Returns error if redirection or logging setup fails
    pub fn start(group: GroupHandle, config: ConcordConfig) -> Result<Self, StartupError> {
        let redirected = if config.redirect_streams {
            Some(redirect_standard_streams_to_rank_file(&group)?)
        } else {
            None
        };

        if config.install_subscriber {
            telemetry::init_tracing(&config)?;
        }

        tracing::info!(
            rank = %group.rank(),
            size = group.size(),
            redirected = ?redirected,
            "concord started"
        );

        Ok(Self {
            group,
            config,
            redirected,
        })
    }

    /// The process group
    #[must_use]
    pub fn group(&self) -> &GroupHandle {
        &self.group
    }

    /// Rank of this process
    #[must_use]
    pub fn rank(&self) -> Rank {
        self.group.rank()
    }

    /// Number of processes in the group
    #[must_use]
    pub fn size(&self) -> usize {
        self.group.size()
    }

    /// Configuration used at startup
    #[must_use]
    pub fn config(&self) -> &ConcordConfig {
        &self.config
    }

    /// Rank file the standard streams were redirected to
    #[must_use]
    pub fn redirected_to(&self) -> Option<&Path> {
        self.redirected.as_deref()
    }

    /// Run `body` under the collective fail guard of this process's group.
    ///
    /// # Errors
    ///
    /// See [`concord_guard::CollectiveFailGuard::run`]
    pub fn run_guarded<T, E, F>(&self, body: F) -> GuardResult<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        run_guarded(&self.group, body)
    }
}
