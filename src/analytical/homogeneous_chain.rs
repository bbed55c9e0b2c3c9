use crate::base::{Communicator, ParamChain};
use crate::fem::{Bounds, ChainState};
use crate::StrError;

/// Implements the closed-form homogeneous solution of the chain under monotonic loading
///
/// All springs share the same strain `e = t` (unit-length chain) and the same damage:
///
/// ```text
///      ┌ 0                           if t ≤ t_c
/// α =  ┤
///      └ (t/t_c - 1) / (k - 1)       otherwise
///
/// t_c = √(2 w1 / (μ k))
/// ```
///
/// The residual stiffness `k_res` is not accounted for.
pub struct HomogeneousChain {
    param: ParamChain,
    t_c: f64,
}

impl HomogeneousChain {
    /// Allocates a new instance
    pub fn new(param: &ParamChain) -> Self {
        HomogeneousChain {
            param: *param,
            t_c: param.critical_load(),
        }
    }

    /// Returns the critical load
    pub fn critical_load(&self) -> f64 {
        self.t_c
    }

    /// Returns the homogeneous damage at load t (capped at 1)
    pub fn damage(&self, t: f64) -> f64 {
        if t <= self.t_c {
            0.0
        } else {
            f64::min((t / self.t_c - 1.0) / (self.param.k - 1.0), 1.0)
        }
    }

    /// Returns the nodal displacements u_i = i t / N
    pub fn displacement(&self, t: f64) -> Vec<f64> {
        let n = self.param.n_spring;
        (0..(n + 1)).map(|i| (i as f64) * t / (n as f64)).collect()
    }

    /// Returns the elastic energy at load t
    pub fn elastic_energy(&self, t: f64) -> f64 {
        0.5 * self.param.mu * self.param.stiffness(self.damage(t)) * t * t
    }

    /// Returns the fracture energy at load t
    pub fn fracture_energy(&self, t: f64) -> f64 {
        self.param.w1 * self.damage(t)
    }

    /// Returns the reaction force at load t
    pub fn reaction_force(&self, t: f64) -> f64 {
        self.param.mu * self.param.stiffness(self.damage(t)) * t
    }

    /// Writes the homogeneous state at load t
    ///
    /// The damage is clamped to the bounds so that the state stays admissible.
    pub fn write_state(&self, comm: &dyn Communicator, state: &mut ChainState, bounds: &Bounds) -> Result<(), StrError> {
        let alpha = self.damage(state.t);
        let lb = bounds.lb.as_slice();
        let ub = bounds.ub.as_slice();
        let values: Vec<f64> = (0..state.n_spring())
            .map(|i| f64::min(f64::max(alpha, lb[i]), ub[i]))
            .collect();
        state.u.write_and_sync(comm, &self.displacement(state.t))?;
        state.alpha.write_and_sync(comm, &values)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
