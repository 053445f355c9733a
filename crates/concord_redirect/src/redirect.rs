//! Descriptor-level stdout/stderr redirection.
//!
//! Descriptors 1 and 2 themselves are re-pointed at the rank file, so child
//! processes spawned afterwards inherit the same destination and Rust's
//! `stdout()`/`stderr()` handles keep working unchanged. Output written
//! through the old streams before the call may still interleave; call this
//! first thing at startup.

use crate::RedirectError;
use concord_core::ProcessGroup;
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

static REDIRECTED: OnceCell<PathBuf> = OnceCell::new();

/// Path of the rank file: `<rank>.out`, inside `dir` if given
#[must_use]
pub fn rank_file_path<G: ProcessGroup + ?Sized>(group: &G, dir: Option<&Path>) -> PathBuf {
    let name = group.rank().output_file_name();
    match dir {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

/// Redirect stdout and stderr to `<rank>.out` in the current directory.
///
/// Returns the path written to.
///
/// # Errors
///
/// Returns error if the file cannot be created, the descriptors cannot be
/// rebound, or the streams were already redirected
pub fn redirect_standard_streams_to_rank_file<G: ProcessGroup + ?Sized>(
    group: &G,
) -> Result<PathBuf, RedirectError> {
    redirect_to(rank_file_path(group, None))
}

/// Redirect stdout and stderr to `<rank>.out` inside `dir`.
///
/// # Errors
///
/// See [`redirect_standard_streams_to_rank_file`]
pub fn redirect_standard_streams_into<G: ProcessGroup + ?Sized>(
    group: &G,
    dir: &Path,
) -> Result<PathBuf, RedirectError> {
    redirect_to(rank_file_path(group, Some(dir)))
}

fn redirect_to(path: PathBuf) -> Result<PathBuf, RedirectError> {
    // Racing callers block here until the first switch has finished.
    let mut switched = false;
    let current = REDIRECTED.get_or_try_init(|| {
        platform::redirect_standard_streams(&path)?;
        switched = true;
        Ok::<_, RedirectError>(path.clone())
    })?;

    if !switched {
        return Err(RedirectError::AlreadyRedirected {
            path: current.clone(),
        });
    }

    tracing::debug!(path = %path.display(), "standard streams redirected");
    Ok(path)
}

#[cfg(unix)]
mod platform {
    use crate::RedirectError;
    use std::fs::File;
    use std::io::{self, Write};
    use std::os::fd::{AsRawFd, RawFd};
    use std::path::Path;

    pub(super) fn redirect_standard_streams(path: &Path) -> Result<(), RedirectError> {
        let file = File::create(path).map_err(|source| RedirectError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        // Holding both locks keeps other threads from writing mid-switch.
        let mut stdout = io::stdout().lock();
        let mut stderr = io::stderr().lock();
        stdout.flush().map_err(RedirectError::Flush)?;
        stderr.flush().map_err(RedirectError::Flush)?;

        rebind(&file, &[libc::STDOUT_FILENO, libc::STDERR_FILENO])
        // `file` closes here; descriptors 1 and 2 keep the file open.
    }

    /// Point every descriptor in `fds` at `target`
    pub(super) fn rebind(target: &File, fds: &[RawFd]) -> Result<(), RedirectError> {
        let target_fd = target.as_raw_fd();
        for &fd in fds {
            if unsafe { libc::dup2(target_fd, fd) } < 0 {
                return Err(RedirectError::Dup {
                    fd,
                    source: io::Error::last_os_error(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(not(unix))]
mod platform {
    use crate::RedirectError;
    use std::path::Path;

    pub(super) fn redirect_standard_streams(_path: &Path) -> Result<(), RedirectError> {
        Err(RedirectError::Unsupported)
    }
}
