//! # Work Distribution
//!
//! Splits energy loops across a pool of cooperating workers and combines their partial sums.
//!
//! Workers are organised in groups. A [`DivisionStrategy`] selects which set of workers shares
//! a loop: the whole pool, the caller's group, or the caller alone. Two partitions are provided:
//! contiguous chunks ([`chunk_range`]) for lists of cell pairs or molecules, and strided
//! (interleaved) indices ([`strided`]) for the atom lists of single cells. Both visit every
//! element exactly once across the workers of a scope, so summing the partial results with
//! [`ProcessPool::all_sum`] reproduces a serial evaluation up to rounding order.

pub mod serial;
pub mod threaded;

pub use serial::SerialPool;
pub use threaded::{PoolError, ThreadedPool, Worker};

use std::ops::Range;

/// Which workers cooperate on a loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DivisionStrategy {
    /// Every worker of the pool.
    #[default]
    Pool,
    /// The workers of the caller's group.
    Group,
    /// The caller alone.
    Sequential,
}

impl DivisionStrategy {
    /// The strategy for work nested inside a loop already divided with `self`.
    pub fn sub_division(self) -> Self {
        match self {
            DivisionStrategy::Pool => DivisionStrategy::Group,
            DivisionStrategy::Group | DivisionStrategy::Sequential => DivisionStrategy::Sequential,
        }
    }
}

/// The calling worker's view of a process pool.
pub trait ProcessPool: Sync {
    /// Number of workers sharing a loop under `strategy`.
    fn n_workers(&self, strategy: DivisionStrategy) -> usize;

    /// Rank of the caller among the workers sharing a loop under `strategy`.
    fn worker_rank(&self, strategy: DivisionStrategy) -> usize;

    fn n_groups(&self) -> usize;

    fn group_index(&self) -> usize;

    /// Replaces every element of `values` with its sum over the workers of `strategy`.
    ///
    /// Every worker of the scope must call this with a slice of the same length.
    fn all_sum(&self, values: &mut [f64], strategy: DivisionStrategy);

    fn interleaved_loop_start(&self, strategy: DivisionStrategy) -> usize {
        self.worker_rank(strategy)
    }

    fn interleaved_loop_stride(&self, strategy: DivisionStrategy) -> usize {
        self.n_workers(strategy)
    }

    /// The caller's contiguous share of `0..len`.
    fn chunk(&self, len: usize, strategy: DivisionStrategy) -> Range<usize> {
        chunk_range(len, self.n_workers(strategy), self.worker_rank(strategy))
    }

    /// The caller's interleaved share of `0..len`.
    fn interleaved(
        &self,
        len: usize,
        strategy: DivisionStrategy,
    ) -> std::iter::StepBy<Range<usize>> {
        strided(
            len,
            self.interleaved_loop_start(strategy),
            self.interleaved_loop_stride(strategy),
        )
    }

    fn sub_division_strategy(&self, strategy: DivisionStrategy) -> DivisionStrategy {
        strategy.sub_division()
    }

    /// Whether the caller is rank 0 of its group.
    fn is_group_leader(&self) -> bool {
        self.worker_rank(DivisionStrategy::Group) == 0
    }

    fn all_sum_scalar(&self, value: f64, strategy: DivisionStrategy) -> f64 {
        let mut buffer = [value];
        self.all_sum(&mut buffer, strategy);
        buffer[0]
    }
}

/// Chunk `k` of `0..len` split into `n` contiguous chunks.
///
/// Boundaries are placed at `round(len * k / n)`, each computed independently, so chunk sizes
/// differ by at most one and rounding never piles up in the last chunk.
pub fn chunk_range(len: usize, n: usize, k: usize) -> Range<usize> {
    assert!(n > 0, "cannot partition a range across zero workers");
    assert!(k < n, "worker rank {k} is out of range for {n} workers");
    let boundary = |i: usize| -> usize {
        if i == n {
            len
        } else {
            ((len as f64) * (i as f64) / (n as f64)).round() as usize
        }
    };
    boundary(k)..boundary(k + 1)
}

/// Indices `start, start + stride, ...` below `len`.
pub fn strided(len: usize, start: usize, stride: usize) -> std::iter::StepBy<Range<usize>> {
    assert!(stride > 0, "stride must be positive");
    (start.min(len)..len).step_by(stride)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_division_descends_pool_group_sequential() {
        assert_eq!(DivisionStrategy::Pool.sub_division(), DivisionStrategy::Group);
        assert_eq!(
            DivisionStrategy::Group.sub_division(),
            DivisionStrategy::Sequential
        );
        assert_eq!(
            DivisionStrategy::Sequential.sub_division(),
            DivisionStrategy::Sequential
        );
    }

    #[test]
    fn chunk_ranges_cover_every_index_exactly_once() {
        for len in [0, 1, 2, 7, 10, 99, 1000] {
            for n in 1..=9 {
                let mut visited = vec![0usize; len];
                let mut expected_start = 0;
                for k in 0..n {
                    let range = chunk_range(len, n, k);
                    assert_eq!(range.start, expected_start);
                    expected_start = range.end;
                    range.for_each(|i| visited[i] += 1);
                }
                assert_eq!(expected_start, len);
                assert!(visited.iter().all(|&count| count == 1));
            }
        }
    }

    #[test]
    fn chunk_sizes_differ_by_at_most_one() {
        let sizes: Vec<usize> = (0..7).map(|k| chunk_range(100, 7, k).len()).collect();
        let min = *sizes.iter().min().unwrap();
        let max = *sizes.iter().max().unwrap();
        assert!(max - min <= 1);
    }

    #[test]
    fn more_workers_than_elements_leaves_some_chunks_empty() {
        let lens: Vec<usize> = (0..5).map(|k| chunk_range(2, 5, k).len()).collect();
        assert_eq!(lens.iter().sum::<usize>(), 2);
        assert!(lens.contains(&0));
    }

    #[test]
    fn strided_partitions_cover_every_index_exactly_once() {
        for len in [0, 1, 5, 17, 64] {
            for n in 1..=6 {
                let mut visited = vec![0usize; len];
                for k in 0..n {
                    strided(len, k, n).for_each(|i| visited[i] += 1);
                }
                assert!(visited.iter().all(|&count| count == 1));
            }
        }
    }

    #[test]
    fn strided_start_beyond_length_is_empty() {
        assert_eq!(strided(3, 5, 4).count(), 0);
    }

    #[test]
    #[should_panic(expected = "zero workers")]
    fn chunk_range_panics_for_zero_workers() {
        chunk_range(10, 0, 0);
    }
}
