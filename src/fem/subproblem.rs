use super::{Bounds, ChainState};
use crate::base::SolverReason;
use crate::StrError;

/// Defines a nonlinear solver for one block of the staggered (alternate) minimization
///
/// The solver updates its own block of the state in place (through `write_and_sync`) and
/// returns the number of iterations together with the termination reason. A diverged reason
/// is not an error: the caller decides whether to tolerate it. `Err` is reserved for
/// inconsistent data.
pub trait SubproblemSolver {
    /// Solves the subproblem with the other block of the state held fixed
    fn solve(&mut self, state: &mut ChainState, bounds: &Bounds) -> Result<(usize, SolverReason), StrError>;
}
