//! The guarded-block protocol.

use crate::{GroupFailure, GuardError, GuardResult};
use concord_core::{CollectiveError, GuardOutcome, ProcessGroup, checked_all_gather, decide};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Run `body` so that its failure on any rank fails it on every rank.
///
/// Shorthand for `CollectiveFailGuard::new(group).run(body)`.
///
/// # Errors
///
/// See [`CollectiveFailGuard::run`]
pub fn run_guarded<G, T, E, F>(group: &G, body: F) -> GuardResult<T, E>
where
    G: ProcessGroup + ?Sized,
    F: FnOnce() -> Result<T, E>,
{
    CollectiveFailGuard::new(group).run(body)
}

/// Collective fail guard bound to a process group
pub struct CollectiveFailGuard<'g, G: ?Sized> {
    group: &'g G,
}

impl<'g, G: ProcessGroup + ?Sized> CollectiveFailGuard<'g, G> {
    /// Create a guard over `group`
    #[must_use]
    pub fn new(group: &'g G) -> Self {
        Self { group }
    }

    /// Run `body`, then agree with every rank on whether anyone failed.
    ///
    /// Every rank of the group must call this for the same guarded region;
    /// the status exchange is a barrier.
    ///
    /// # Errors
    ///
    /// - [`GuardError::Local`] with the body's own error if it failed here
    /// - [`GuardError::Group`] if it succeeded here but failed elsewhere
    /// - [`GuardError::Collective`] if the status exchange itself failed
    /// - [`GuardError::LocalUnconfirmed`] if both the body and the exchange
    ///   failed here
    ///
    /// # Panics
    ///
    /// A panic in `body` is resumed on this rank once peers have been told
    /// about it. In a single-rank group it unwinds immediately.
    pub fn run<T, E, F>(&self, body: F) -> GuardResult<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if self.group.is_standalone() {
            return body().map_err(GuardError::Local);
        }

        let rank = self.group.rank();
        let attempt = Attempt::capture(body);
        let local_failed = attempt.failed();

        tracing::debug!(
            %rank,
            size = self.group.size(),
            local_failed,
            "exchanging failure status"
        );
        let flags = match checked_all_gather(self.group, local_failed) {
            Ok(flags) => flags,
            Err(err) => {
                if local_failed {
                    tracing::error!(
                        %rank,
                        error = %err,
                        "failure status exchange failed after local failure"
                    );
                }
                return attempt.resolve_unconfirmed(err);
            }
        };

        match decide(local_failed, &flags) {
            GuardOutcome::Clean => attempt.resolve(),
            GuardOutcome::LocalFailure => {
                tracing::error!(%rank, "guarded block failed on this rank");
                attempt.resolve()
            }
            GuardOutcome::RemoteFailure { failed_ranks } => {
                tracing::warn!(%rank, ?failed_ranks, "guarded block failed on peer ranks");
                Err(GroupFailure::new(failed_ranks).into())
            }
        }
    }
}

/// The body's result, held on this rank while the flags are exchanged
enum Attempt<T, E> {
    Completed(T),
    Failed(E),
    Panicked(Box<dyn Any + Send>),
}

impl<T, E> Attempt<T, E> {
    fn capture<F>(body: F) -> Self
    where
        F: FnOnce() -> Result<T, E>,
    {
        // Panics are only held until `resolve`, never swallowed.
        match panic::catch_unwind(AssertUnwindSafe(body)) {
            Ok(Ok(value)) => Self::Completed(value),
            Ok(Err(err)) => Self::Failed(err),
            Err(payload) => Self::Panicked(payload),
        }
    }

    fn failed(&self) -> bool {
        !matches!(self, Self::Completed(_))
    }

    fn resolve(self) -> GuardResult<T, E> {
        match self {
            Self::Completed(value) => Ok(value),
            Self::Failed(err) => Err(GuardError::Local(err)),
            Self::Panicked(payload) => panic::resume_unwind(payload),
        }
    }

    /// Resolve after the exchange failed; a panic still wins over `collective`
    fn resolve_unconfirmed(self, collective: CollectiveError) -> GuardResult<T, E> {
        match self {
            Self::Completed(_) => Err(GuardError::Collective(collective)),
            Self::Failed(local) => Err(GuardError::LocalUnconfirmed { local, collective }),
            Self::Panicked(payload) => panic::resume_unwind(payload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concord_core::{CollectiveResult, Rank};
    use concord_group::StandaloneGroup;
    use std::cell::{Cell, RefCell};
    use std::io;

    /// One rank's view of a group whose peers already decided their flags
    struct ScriptedGroup {
        rank: Rank,
        peers: Vec<bool>,
        gathers: Cell<usize>,
        sent: RefCell<Vec<bool>>,
    }

    impl ScriptedGroup {
        fn new(rank: usize, peers: &[bool]) -> Self {
            Self {
                rank: Rank::new(rank),
                peers: peers.to_vec(),
                gathers: Cell::new(0),
                sent: RefCell::new(Vec::new()),
            }
        }

        /// Rank `rank` in a group of `size` where `failing` ranks fail
        fn with_failures(rank: usize, size: usize, failing: &[usize]) -> Self {
            let peers: Vec<bool> = (0..size).map(|i| failing.contains(&i)).collect();
            Self::new(rank, &peers)
        }
    }

    impl ProcessGroup for ScriptedGroup {
        fn rank(&self) -> Rank {
            self.rank
        }

        fn size(&self) -> usize {
            self.peers.len()
        }

        fn all_gather(&self, local: bool) -> CollectiveResult<Vec<bool>> {
            self.gathers.set(self.gathers.get() + 1);
            self.sent.borrow_mut().push(local);
            let mut flags = self.peers.clone();
            flags[self.rank.index()] = local;
            Ok(flags)
        }
    }

    /// Group of one that counts collective calls
    #[derive(Default)]
    struct CountingSingleton {
        gathers: Cell<usize>,
    }

    impl ProcessGroup for CountingSingleton {
        fn rank(&self) -> Rank {
            Rank::ROOT
        }

        fn size(&self) -> usize {
            1
        }

        fn all_gather(&self, local: bool) -> CollectiveResult<Vec<bool>> {
            self.gathers.set(self.gathers.get() + 1);
            Ok(vec![local])
        }
    }

    /// Multi-rank group whose exchange always fails
    struct BrokenGroup;

    impl ProcessGroup for BrokenGroup {
        fn rank(&self) -> Rank {
            Rank::new(1)
        }

        fn size(&self) -> usize {
            2
        }

        fn all_gather(&self, _local: bool) -> CollectiveResult<Vec<bool>> {
            Err(CollectiveError::Runtime("peer unreachable".to_string()))
        }
    }

    fn solver_error() -> io::Error {
        io::Error::new(io::ErrorKind::InvalidData, "solver diverged at iteration 12")
    }

    #[test]
    fn test_standalone_success_skips_collective() {
        let group = CountingSingleton::default();
        let value = run_guarded(&group, || Ok::<_, io::Error>(42)).unwrap();
        assert_eq!(value, 42);
        assert_eq!(group.gathers.get(), 0);
    }

    #[test]
    fn test_standalone_failure_propagates_unchanged() {
        let group = CountingSingleton::default();
        let err = run_guarded(&group, || Err::<(), _>(solver_error())).unwrap_err();
        let inner = err.into_local().unwrap();
        assert_eq!(inner.kind(), io::ErrorKind::InvalidData);
        assert_eq!(inner.to_string(), "solver diverged at iteration 12");
        assert_eq!(group.gathers.get(), 0);
    }

    #[test]
    fn test_standalone_group_handle() {
        let group = StandaloneGroup::new();
        assert_eq!(run_guarded(&group, || Ok::<_, io::Error>("done")).unwrap(), "done");
    }

    #[test]
    fn test_standalone_panic_unwinds() {
        let group = CountingSingleton::default();
        let caught = panic::catch_unwind(AssertUnwindSafe(|| {
            let _ = run_guarded(&group, || -> Result<(), io::Error> { panic!("standalone boom") });
        }));
        let payload = caught.unwrap_err();
        assert_eq!(payload.downcast_ref::<&str>(), Some(&"standalone boom"));
        assert_eq!(group.gathers.get(), 0);
    }

    #[test]
    fn test_clean_multi_rank() {
        let group = ScriptedGroup::with_failures(1, 3, &[]);
        let value = run_guarded(&group, || Ok::<_, io::Error>(7)).unwrap();
        assert_eq!(value, 7);
        assert_eq!(group.gathers.get(), 1);
        assert_eq!(*group.sent.borrow(), vec![false]);
    }

    #[test]
    fn test_four_ranks_rank_two_fails() {
        for rank in 0..4 {
            let group = ScriptedGroup::with_failures(rank, 4, &[2]);
            let result = run_guarded(&group, || {
                if rank == 2 { Err(solver_error()) } else { Ok(()) }
            });
            let err = result.unwrap_err();
            if rank == 2 {
                let inner = err.into_local().unwrap();
                assert_eq!(inner.kind(), io::ErrorKind::InvalidData);
                assert_eq!(*group.sent.borrow(), vec![true]);
            } else {
                assert_eq!(err.failed_ranks(), Some(&[Rank::new(2)][..]));
            }
        }
    }

    #[test]
    fn test_three_ranks_outer_ranks_fail() {
        let group = ScriptedGroup::with_failures(1, 3, &[0, 2]);
        let err = run_guarded(&group, || Ok::<_, io::Error>(())).unwrap_err();
        assert_eq!(err.failed_ranks(), Some(&[Rank::new(0), Rank::new(2)][..]));
        assert_eq!(err.to_string(), "guarded block failed on rank(s) 0, 2");

        for rank in [0, 2] {
            let group = ScriptedGroup::with_failures(rank, 3, &[0, 2]);
            let err = run_guarded(&group, || Err::<(), _>(solver_error())).unwrap_err();
            assert!(err.is_local());
        }
    }

    #[test]
    fn test_local_failure_ignores_peer_failures() {
        let group = ScriptedGroup::with_failures(0, 3, &[0, 1, 2]);
        let err = run_guarded(&group, || Err::<(), _>(solver_error())).unwrap_err();
        assert!(err.is_local());
        assert_eq!(err.failed_ranks(), None);
    }

    #[test]
    fn test_panic_is_exchanged_then_resumed() {
        let group = ScriptedGroup::with_failures(1, 2, &[]);
        let caught = panic::catch_unwind(AssertUnwindSafe(|| {
            let _ = run_guarded(&group, || -> Result<(), io::Error> { panic!("rank boom") });
        }));
        let payload = caught.unwrap_err();
        assert_eq!(payload.downcast_ref::<&str>(), Some(&"rank boom"));
        assert_eq!(*group.sent.borrow(), vec![true]);
    }

    #[test]
    fn test_collective_failure_on_clean_rank() {
        let err = run_guarded(&BrokenGroup, || Ok::<_, io::Error>(())).unwrap_err();
        assert!(matches!(err, GuardError::Collective(CollectiveError::Runtime(_))));
    }

    #[test]
    fn test_collective_failure_keeps_local_error() {
        let err = run_guarded(&BrokenGroup, || Err::<(), _>(solver_error())).unwrap_err();
        assert!(err.is_local());
        assert_eq!(err.to_string(), "solver diverged at iteration 12");
        match err.collective() {
            Some(CollectiveError::Runtime(reason)) => assert_eq!(reason, "peer unreachable"),
            other => panic!("exchange error not surfaced: {other:?}"),
        }
        assert_eq!(err.into_local().unwrap().kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_collective_failure_resumes_local_panic() {
        let caught = panic::catch_unwind(AssertUnwindSafe(|| {
            let _ = run_guarded(&BrokenGroup, || -> Result<(), io::Error> { panic!("rank boom") });
        }));
        assert_eq!(caught.unwrap_err().downcast_ref::<&str>(), Some(&"rank boom"));
    }

    #[test]
    fn test_guard_reusable_across_blocks() {
        let group = ScriptedGroup::with_failures(0, 2, &[]);
        let guard = CollectiveFailGuard::new(&group);
        assert_eq!(guard.run(|| Ok::<_, io::Error>(1)).unwrap(), 1);
        assert_eq!(guard.run(|| Ok::<_, io::Error>(2)).unwrap(), 2);
        assert_eq!(group.gathers.get(), 2);
    }
}
