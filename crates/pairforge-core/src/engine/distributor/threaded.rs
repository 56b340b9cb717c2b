use super::{DivisionStrategy, ProcessPool, chunk_range};
use std::ops::Range;
use std::sync::{Barrier, Mutex, PoisonError};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("A process pool needs at least one worker")]
    NoWorkers,
    #[error("Cannot split {n_workers} workers into {n_groups} groups")]
    InvalidGroupCount { n_workers: usize, n_groups: usize },
}

/// An SPMD pool of scoped OS threads.
///
/// [`ThreadedPool::run`] executes the same closure once per worker. Each invocation receives a
/// [`Worker`], which implements [`ProcessPool`] for the calling thread. Groups are contiguous
/// blocks of ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadedPool {
    n_workers: usize,
    n_groups: usize,
}

impl ThreadedPool {
    pub fn new(n_workers: usize, n_groups: usize) -> Result<Self, PoolError> {
        if n_workers == 0 {
            return Err(PoolError::NoWorkers);
        }
        if n_groups == 0 || n_groups > n_workers {
            return Err(PoolError::InvalidGroupCount {
                n_workers,
                n_groups,
            });
        }
        Ok(Self {
            n_workers,
            n_groups,
        })
    }

    pub fn n_workers(&self) -> usize {
        self.n_workers
    }

    pub fn n_groups(&self) -> usize {
        self.n_groups
    }

    fn group_ranks(&self, group: usize) -> Range<usize> {
        chunk_range(self.n_workers, self.n_groups, group)
    }

    /// Runs `task` on every worker and returns the results in rank order.
    ///
    /// Every worker must make the same sequence of collective calls (`all_sum`) for each scope;
    /// a worker that skips one leaves the others waiting.
    pub fn run<T, F>(&self, task: F) -> Vec<T>
    where
        F: Fn(&Worker<'_>) -> T + Sync,
        T: Send,
    {
        debug!(
            "Running task on {} workers in {} groups",
            self.n_workers, self.n_groups
        );
        let pool_reducer = Reducer::new(self.n_workers);
        let group_reducers: Vec<Reducer> = (0..self.n_groups)
            .map(|group| Reducer::new(self.group_ranks(group).len()))
            .collect();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..self.n_workers)
                .map(|rank| {
                    let group = (0..self.n_groups)
                        .find(|&g| self.group_ranks(g).contains(&rank))
                        .unwrap_or(self.n_groups - 1);
                    let ranks = self.group_ranks(group);
                    let worker = Worker {
                        rank,
                        n_workers: self.n_workers,
                        group,
                        n_groups: self.n_groups,
                        group_rank: rank - ranks.start,
                        group_size: ranks.len(),
                        pool_reducer: &pool_reducer,
                        group_reducer: &group_reducers[group],
                    };
                    let task = &task;
                    scope.spawn(move || task(&worker))
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(result) => result,
                    Err(payload) => std::panic::resume_unwind(payload),
                })
                .collect()
        })
    }
}

/// One worker of a running [`ThreadedPool`].
#[derive(Debug)]
pub struct Worker<'a> {
    rank: usize,
    n_workers: usize,
    group: usize,
    n_groups: usize,
    group_rank: usize,
    group_size: usize,
    pool_reducer: &'a Reducer,
    group_reducer: &'a Reducer,
}

impl ProcessPool for Worker<'_> {
    fn n_workers(&self, strategy: DivisionStrategy) -> usize {
        match strategy {
            DivisionStrategy::Pool => self.n_workers,
            DivisionStrategy::Group => self.group_size,
            DivisionStrategy::Sequential => 1,
        }
    }

    fn worker_rank(&self, strategy: DivisionStrategy) -> usize {
        match strategy {
            DivisionStrategy::Pool => self.rank,
            DivisionStrategy::Group => self.group_rank,
            DivisionStrategy::Sequential => 0,
        }
    }

    fn n_groups(&self) -> usize {
        self.n_groups
    }

    fn group_index(&self) -> usize {
        self.group
    }

    fn all_sum(&self, values: &mut [f64], strategy: DivisionStrategy) {
        match strategy {
            DivisionStrategy::Pool => self.pool_reducer.all_sum(values),
            DivisionStrategy::Group => self.group_reducer.all_sum(values),
            DivisionStrategy::Sequential => {}
        }
    }
}

/// Barrier-synchronised accumulator shared by the workers of one scope.
#[derive(Debug)]
struct Reducer {
    barrier: Barrier,
    accumulator: Mutex<Vec<f64>>,
}

impl Reducer {
    fn new(n_participants: usize) -> Self {
        Self {
            barrier: Barrier::new(n_participants),
            accumulator: Mutex::new(Vec::new()),
        }
    }

    fn all_sum(&self, values: &mut [f64]) {
        {
            let mut accumulator = self
                .accumulator
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if accumulator.is_empty() {
                accumulator.resize(values.len(), 0.0);
            }
            assert_eq!(
                accumulator.len(),
                values.len(),
                "all_sum called with mismatched buffer lengths"
            );
            for (total, value) in accumulator.iter_mut().zip(values.iter()) {
                *total += value;
            }
        }
        self.barrier.wait();
        {
            let accumulator = self
                .accumulator
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            values.copy_from_slice(&accumulator);
        }
        if self.barrier.wait().is_leader() {
            self.accumulator
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clear();
        }
        self.barrier.wait();
    }
}
