use super::Field;
use crate::base::{Communicator, ParamChain, BOUNDS_ROUND_OFF};
use crate::StrError;
use serde::{Deserialize, Serialize};

/// Holds the state of the chain: displacement and damage fields at the current load
///
/// The chain with N springs has N+1 displacement nodes and N damage cells.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainState {
    /// Current load (imposed displacement at the right end)
    pub t: f64,

    /// Nodal displacements (N+1)
    pub u: Field,

    /// Damage in each spring (N)
    pub alpha: Field,
}

/// Holds the admissible bounds of the damage field
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bounds {
    /// Lower bound (irreversibility)
    pub lb: Field,

    /// Upper bound (fully damaged)
    pub ub: Field,
}

impl ChainState {
    /// Allocates a new (undamaged and unloaded) state
    pub fn new(param: &ParamChain) -> Self {
        ChainState {
            t: 0.0,
            u: Field::new(param.n_spring + 1, 0.0),
            alpha: Field::new(param.n_spring, 0.0),
        }
    }

    /// Returns the number of springs
    pub fn n_spring(&self) -> usize {
        self.alpha.dim()
    }
}

impl Bounds {
    /// Allocates new bounds with lb = 0 and ub = 1
    pub fn new(param: &ParamChain) -> Self {
        Bounds {
            lb: Field::new(param.n_spring, 0.0),
            ub: Field::new(param.n_spring, 1.0),
        }
    }

    /// Checks that lb ≤ alpha ≤ ub (up to round-off)
    ///
    /// The verdict is reduced over all workers, so every worker returns the same result.
    pub fn check(&self, comm: &dyn Communicator, alpha: &Field) -> Result<(), StrError> {
        if alpha.dim() != self.lb.dim() {
            return Err("the damage field and the bounds have different dimensions");
        }
        let lb = self.lb.as_slice();
        let ub = self.ub.as_slice();
        let violated = alpha
            .as_slice()
            .iter()
            .enumerate()
            .any(|(i, a)| *a < lb[i] - BOUNDS_ROUND_OFF || *a > ub[i] + BOUNDS_ROUND_OFF);
        let flag = if violated { 1.0 } else { 0.0 };
        if comm.all_reduce_max(flag) > 0.0 {
            return Err("the damage field violates the admissible bounds");
        }
        Ok(())
    }

    /// Raises the lower bound to the current damage (irreversibility)
    ///
    /// The lower bound never decreases.
    pub fn ratchet(&mut self, comm: &dyn Communicator, alpha: &Field) -> Result<(), StrError> {
        if alpha.dim() != self.lb.dim() {
            return Err("the damage field and the bounds have different dimensions");
        }
        let current = alpha.as_slice();
        let ub = self.ub.as_slice().to_vec();
        self.lb
            .update_and_sync(comm, |i, lb| f64::min(f64::max(lb, current[i]), ub[i]));
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
