/// Defines the collective operations required by a distributed simulation
///
/// All workers must call these functions in the same order; they are blocking barriers.
/// Only the root rank writes files.
pub trait Communicator: Send + Sync {
    /// Returns the rank of this worker
    fn rank(&self) -> usize;

    /// Returns the number of workers
    fn size(&self) -> usize;

    /// Sums a locally computed value over all workers
    fn all_reduce_sum(&self, local: f64) -> f64;

    /// Returns the maximum of a locally computed value over all workers
    fn all_reduce_max(&self, local: f64) -> f64;

    /// Propagates the locally owned values to the ghost entries read by neighboring partitions
    fn ghost_update(&self, values: &mut [f64]);

    /// Waits for all workers
    fn barrier(&self);

    /// Returns true if this worker is the coordinator (rank 0)
    fn is_root(&self) -> bool {
        self.rank() == 0
    }
}

/// Implements a single-worker communicator
///
/// Every reduction is the identity and ghost updates are no-ops.
#[derive(Clone, Copy, Debug, Default)]
pub struct SerialComm;

impl Communicator for SerialComm {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn all_reduce_sum(&self, local: f64) -> f64 {
        local
    }

    fn all_reduce_max(&self, local: f64) -> f64 {
        local
    }

    fn ghost_update(&self, _values: &mut [f64]) {}

    fn barrier(&self) {}
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{Communicator, SerialComm};

    #[test]
    fn serial_comm_works() {
        let comm = SerialComm;
        assert_eq!(comm.rank(), 0);
        assert_eq!(comm.size(), 1);
        assert!(comm.is_root());
        assert_eq!(comm.all_reduce_sum(2.5), 2.5);
        assert_eq!(comm.all_reduce_max(-1.0), -1.0);
        let mut values = vec![1.0, 2.0];
        comm.ghost_update(&mut values);
        assert_eq!(values, &[1.0, 2.0]);
        comm.barrier();
    }
}
