use super::{BifurcationSolver, ConeData, ConeStabilityOracle, RestrictedHessian, StabilityOracle};
use crate::base::{Communicator, ParamChain, ParamStability};
use crate::fem::{Bounds, ChainModel, ChainState};
use crate::StrError;
use russell_lab::{vec_add, vec_copy, vec_norm, vec_scale, Norm, Vector};

/// Checks the stability of the state with respect to irreversible perturbations
///
/// Finds the smallest Rayleigh quotient of the restricted Hessian on the cone
/// `K = {x : x_α ≥ 0}` with a shifted projected power iteration:
///
/// ```text
/// s = (Gershgorin bound) + 1
/// y = P_K(s x - H x)
/// x ← y / ‖y‖
/// ```
///
/// The iteration starts from the projection of the smallest (unconstrained) eigenvector.
/// The state is cone-stable if the cone eigenvalue is positive.
pub struct ConeSolver<'a> {
    model: ChainModel<'a>,
    param: ParamStability,
    eigen: BifurcationSolver<'a>,
    data: ConeData,
}

impl<'a> ConeSolver<'a> {
    /// Allocates a new instance
    pub fn new(chain: &'a ParamChain, param: ParamStability, comm: &'a dyn Communicator) -> Self {
        ConeSolver {
            model: ChainModel::new(chain, comm),
            param,
            eigen: BifurcationSolver::new(chain, param, comm),
            data: ConeData::default(),
        }
    }

    /// Performs the cone analysis of a restricted Hessian
    pub fn solve_restricted(&mut self, hh: &RestrictedHessian) -> Result<bool, StrError> {
        let n = hh.dim();
        self.data = ConeData::default();
        if n == 0 {
            return Ok(true);
        }

        // initial vector
        self.eigen.solve_restricted(hh)?;
        let v = Vector::from(&self.eigen.eigen_data().eigenvector);
        let mut x = initial_vector(hh, &v)?;

        // projected power iteration
        let shift = hh.gershgorin() + 1.0;
        let mut hx = Vector::new(n);
        let mut y = Vector::new(n);
        let mut change = Vector::new(n);
        let mut error = f64::INFINITY;
        let mut iterations = 0;
        while iterations < self.param.cone_max_it {
            hh.mul(&mut hx, &x)?;
            vec_add(&mut y, shift, &x, -1.0, &hx)?;
            hh.project_on_cone(&mut y);
            if !normalize(&mut y) {
                break;
            }
            vec_add(&mut change, 1.0, &x, -1.0, &y)?;
            error = vec_norm(&change, Norm::Max);
            vec_copy(&mut x, &y)?;
            iterations += 1;
            if error < self.param.cone_atol {
                break;
            }
        }
        if iterations == self.param.cone_max_it && error >= self.param.cone_atol {
            log::warn!(
                "cone solver reached {} iterations (error = {:e})",
                iterations,
                error
            );
        }
        let lambda = hh.rayleigh(&x)?;
        self.data = ConeData {
            iterations,
            lambda: Some(lambda),
            error,
            eigenvector: x.as_data().to_vec(),
        };
        Ok(lambda > self.param.eig_zero_tol)
    }
}

impl<'a> ConeStabilityOracle for ConeSolver<'a> {
    fn solve(&mut self, state: &ChainState, bounds: &Bounds) -> Result<bool, StrError> {
        let hh = RestrictedHessian::assemble(&self.model, state, bounds, self.param.inactive_set_gatol);
        self.solve_restricted(&hh)
    }

    fn cone_data(&self) -> &ConeData {
        &self.data
    }
}

/// Returns the best (smallest Rayleigh quotient) of P_K(v) and P_K(-v), or a vector of ones
fn initial_vector(hh: &RestrictedHessian, v: &Vector) -> Result<Vector, StrError> {
    let mut best: Option<(f64, Vector)> = None;
    for sign in [1.0, -1.0] {
        let mut x = v.clone();
        vec_scale(&mut x, sign);
        hh.project_on_cone(&mut x);
        if normalize(&mut x) {
            let quotient = hh.rayleigh(&x)?;
            if best.as_ref().map_or(true, |(q, _)| quotient < *q) {
                best = Some((quotient, x));
            }
        }
    }
    match best {
        Some((_, x)) => Ok(x),
        None => {
            let mut x = Vector::filled(hh.dim(), 1.0);
            normalize(&mut x);
            Ok(x)
        }
    }
}

/// Normalizes a vector; returns false if its norm is zero (or not finite)
fn normalize(x: &mut Vector) -> bool {
    let norm = vec_norm(x, Norm::Euc);
    if norm == 0.0 || !norm.is_finite() {
        return false;
    }
    vec_scale(x, 1.0 / norm);
    true
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
