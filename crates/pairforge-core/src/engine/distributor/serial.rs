use super::{DivisionStrategy, ProcessPool};

/// A pool of one: every partition is the identity and reductions are no-ops.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialPool;

impl SerialPool {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessPool for SerialPool {
    fn n_workers(&self, _strategy: DivisionStrategy) -> usize {
        1
    }

    fn worker_rank(&self, _strategy: DivisionStrategy) -> usize {
        0
    }

    fn n_groups(&self) -> usize {
        1
    }

    fn group_index(&self) -> usize {
        0
    }

    fn all_sum(&self, _values: &mut [f64], _strategy: DivisionStrategy) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_pool_owns_every_partition() {
        let pool = SerialPool::new();
        for strategy in [
            DivisionStrategy::Pool,
            DivisionStrategy::Group,
            DivisionStrategy::Sequential,
        ] {
            assert_eq!(pool.chunk(13, strategy), 0..13);
            assert_eq!(pool.interleaved(5, strategy).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
        }
        assert!(pool.is_group_leader());
    }

    #[test]
    fn serial_all_sum_leaves_values_unchanged() {
        let pool = SerialPool::new();
        let mut values = [1.5, -2.0];
        pool.all_sum(&mut values, DivisionStrategy::Pool);
        assert_eq!(values, [1.5, -2.0]);
    }
}
