//! In-memory process group shared by threads.

use concord_core::{CollectiveError, CollectiveResult, ProcessGroup, Rank};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

/// State of the rendezvous between rounds
#[derive(Debug)]
struct Round {
    /// Incremented each time a round completes
    generation: u64,
    /// Contributions of the current round, by rank
    slots: Vec<Option<bool>>,
    /// Ranks that have contributed to the current round
    arrived: usize,
    /// Result of the last completed round
    published: Vec<bool>,
    /// Total all-gather calls across all ranks
    calls: usize,
}

#[derive(Debug)]
struct Exchange {
    size: usize,
    round: Mutex<Round>,
    completed: Condvar,
}

impl Exchange {
    fn lock(&self) -> CollectiveResult<MutexGuard<'_, Round>> {
        self.round.lock().map_err(|_| CollectiveError::Poisoned)
    }

    /// Barrier all-gather: the last rank to arrive publishes the round.
    fn all_gather(&self, rank: Rank, local: bool) -> CollectiveResult<Vec<bool>> {
        let mut round = self.lock()?;
        round.calls += 1;
        round.slots[rank.index()] = Some(local);
        round.arrived += 1;

        if round.arrived == self.size {
            round.published = round
                .slots
                .iter_mut()
                .map(|slot| slot.take().unwrap_or(false))
                .collect();
            round.arrived = 0;
            round.generation += 1;
            self.completed.notify_all();
            return Ok(round.published.clone());
        }

        // `published` cannot be overwritten before this rank joins the next round.
        let generation = round.generation;
        let round = self
            .completed
            .wait_while(round, |round| round.generation == generation)
            .map_err(|_| CollectiveError::Poisoned)?;
        Ok(round.published.clone())
    }
}

/// A simulated group of `size` ranks living in one process
#[derive(Debug, Clone)]
pub struct LocalCluster {
    exchange: Arc<Exchange>,
}

impl LocalCluster {
    /// Create a cluster of `size` ranks
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero
    #[must_use]
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "a group has at least one rank");
        Self {
            exchange: Arc::new(Exchange {
                size,
                round: Mutex::new(Round {
                    generation: 0,
                    slots: vec![None; size],
                    arrived: 0,
                    published: Vec::new(),
                    calls: 0,
                }),
                completed: Condvar::new(),
            }),
        }
    }

    /// Number of ranks
    #[must_use]
    pub fn size(&self) -> usize {
        self.exchange.size
    }

    /// Handle for one rank
    ///
    /// # Panics
    ///
    /// Panics if `rank` is outside the cluster
    #[must_use]
    pub fn group(&self, rank: Rank) -> LocalGroup {
        assert!(rank.index() < self.size(), "rank {rank} outside cluster of {}", self.size());
        LocalGroup {
            rank,
            exchange: Arc::clone(&self.exchange),
        }
    }

    /// One handle per rank, ordered by rank
    #[must_use]
    pub fn groups(&self) -> Vec<LocalGroup> {
        (0..self.size()).map(|index| self.group(Rank::new(index))).collect()
    }

    /// Total all-gather calls made by every rank so far
    #[must_use]
    pub fn collective_calls(&self) -> usize {
        self.exchange.lock().map(|round| round.calls).unwrap_or(0)
    }

    /// Number of all-gather rounds completed
    #[must_use]
    pub fn rounds_completed(&self) -> u64 {
        self.exchange.lock().map(|round| round.generation).unwrap_or(0)
    }
}

/// One rank's handle into a [`LocalCluster`]
#[derive(Debug, Clone)]
pub struct LocalGroup {
    rank: Rank,
    exchange: Arc<Exchange>,
}

impl ProcessGroup for LocalGroup {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn size(&self) -> usize {
        self.exchange.size
    }

    fn all_gather(&self, local: bool) -> CollectiveResult<Vec<bool>> {
        self.exchange.all_gather(self.rank, local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_cluster_groups() {
        let cluster = LocalCluster::new(3);
        let groups = cluster.groups();
        assert_eq!(groups.len(), 3);
        for (index, group) in groups.iter().enumerate() {
            assert_eq!(group.rank(), Rank::new(index));
            assert_eq!(group.size(), 3);
        }
    }

    #[test]
    fn test_single_rank_gather() {
        let cluster = LocalCluster::new(1);
        let group = cluster.group(Rank::ROOT);
        assert_eq!(group.all_gather(true).unwrap(), vec![true]);
        assert_eq!(cluster.collective_calls(), 1);
        assert_eq!(cluster.rounds_completed(), 1);
    }

    #[test]
    fn test_gather_is_ordered_by_rank() {
        let cluster = LocalCluster::new(4);
        let results: Vec<Vec<bool>> = thread::scope(|scope| {
            let handles: Vec<_> = cluster
                .groups()
                .into_iter()
                .rev()
                .map(|group| {
                    scope.spawn(move || group.all_gather(group.rank().index() % 2 == 1).unwrap())
                })
                .collect();
            handles.into_iter().map(|handle| handle.join().unwrap()).collect()
        });

        for flags in results {
            assert_eq!(flags, vec![false, true, false, true]);
        }
        assert_eq!(cluster.collective_calls(), 4);
    }

    #[test]
    fn test_consecutive_rounds_do_not_mix() {
        let cluster = LocalCluster::new(3);
        let results: Vec<Vec<Vec<bool>>> = thread::scope(|scope| {
            let handles: Vec<_> = cluster
                .groups()
                .into_iter()
                .map(|group| {
                    scope.spawn(move || {
                        (0..20)
                            .map(|round| {
                                let local = group.rank().index() == round % 3;
                                group.all_gather(local).unwrap()
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles.into_iter().map(|handle| handle.join().unwrap()).collect()
        });

        for per_rank in &results {
            for (round, flags) in per_rank.iter().enumerate() {
                let expected: Vec<bool> = (0..3).map(|rank| rank == round % 3).collect();
                assert_eq!(flags, &expected);
            }
        }
        assert_eq!(cluster.rounds_completed(), 20);
    }

    #[test]
    #[should_panic(expected = "outside cluster")]
    fn test_group_out_of_range() {
        let _ = LocalCluster::new(2).group(Rank::new(2));
    }
}
