use super::{Bounds, ChainModel, ChainState, SubproblemSolver};
use crate::base::{Communicator, ParamChain, ParamNewton, SolverReason, BOUNDS_ROUND_OFF};
use crate::StrError;
use russell_lab::{solve_lin_sys, vec_add, vec_copy, vec_inner, vec_norm, vec_scale, Matrix, Norm, Vector};

/// Maximum number of step halvings in the line search
const LINE_SEARCH_MAX_IT: usize = 40;

/// Sufficient decrease coefficient (Armijo)
const ARMIJO_C1: f64 = 1e-4;

/// Relative energy change below which the comparison is round-off
const ENERGY_ROUND_OFF: f64 = 1e-14;

/// Solves the damage subproblem with the displacement held fixed
///
/// Minimizes E(u, ·) subject to lb ≤ α ≤ ub with a reduced-space active-set Newton method.
/// At each iteration, a component is active if it sits at a bound and the gradient pushes
/// it outwards; the Newton step is computed on the free components only, projected onto the
/// box, and accepted after an Armijo backtracking on the energy. When the reduced Hessian
/// is singular (e.g., zero strain), the steepest descent direction is used instead.
pub struct DamageSolver<'a> {
    model: ChainModel<'a>,
    param: ParamNewton,
    kk: Matrix,
    gg: Vector,
}

impl<'a> DamageSolver<'a> {
    /// Allocates a new instance
    pub fn new(chain: &'a ParamChain, param: ParamNewton, comm: &'a dyn Communicator) -> Self {
        let n = chain.n_spring;
        DamageSolver {
            model: ChainModel::new(chain, comm),
            param,
            kk: Matrix::new(n, n),
            gg: Vector::new(n),
        }
    }

    /// Returns true if component i is held at a bound by the gradient
    fn is_active(&self, i: usize, alpha: &[f64], lb: &[f64], ub: &[f64]) -> bool {
        (alpha[i] <= lb[i] + BOUNDS_ROUND_OFF && self.gg[i] > 0.0)
            || (alpha[i] >= ub[i] - BOUNDS_ROUND_OFF && self.gg[i] < 0.0)
    }

    /// Computes the Newton direction on the free components
    fn direction(&mut self, free: &[usize], u: &[f64], alpha: &[f64]) -> Result<Vector, StrError> {
        let mut dir = Vector::new(alpha.len());
        let nf = free.len();
        if nf == 0 {
            return Ok(dir);
        }
        self.model.jacobian_aa(&mut self.kk, u, alpha);
        let mut kf = Matrix::new(nf, nf);
        let mut gf = Vector::new(nf);
        for (a, &i) in free.iter().enumerate() {
            gf[a] = self.gg[i];
            for (b, &j) in free.iter().enumerate() {
                kf.set(a, b, self.kk.get(i, j));
            }
        }
        let mut rhs = gf.clone();
        vec_scale(&mut rhs, -1.0);
        let newton_ok = solve_lin_sys(&mut rhs, &mut kf).is_ok() && vec_norm(&rhs, Norm::Max).is_finite();
        if newton_ok && vec_inner(&gf, &rhs) < 0.0 {
            for (a, &i) in free.iter().enumerate() {
                dir[i] = rhs[a];
            }
        } else {
            for (a, &i) in free.iter().enumerate() {
                dir[i] = -gf[a];
            }
        }
        Ok(dir)
    }
}

impl<'a> SubproblemSolver for DamageSolver<'a> {
    fn solve(&mut self, state: &mut ChainState, bounds: &Bounds) -> Result<(usize, SolverReason), StrError> {
        let n = self.gg.dim();
        if state.alpha.dim() != n || bounds.lb.dim() != n {
            return Err("the damage field is incompatible with the damage solver");
        }
        let comm = self.model.comm;
        let u = state.u.as_slice().to_vec();
        let lb = bounds.lb.as_slice();
        let ub = bounds.ub.as_slice();
        let project = |x: &mut Vector| {
            for (i, v) in x.as_mut_data().iter_mut().enumerate() {
                *v = f64::min(f64::max(*v, lb[i]), ub[i]);
            }
        };
        let mut alpha = state.alpha.values().clone();
        project(&mut alpha);
        let mut trial = Vector::new(n);
        let mut increment = Vector::new(n);

        let mut norm_pg0 = 0.0;
        let mut reason = SolverReason::DivergedMaxIt;
        let mut iterations = 0;
        for it in 0..=self.param.max_it {
            // projected gradient
            self.model.residual_alpha(&mut self.gg, &u, alpha.as_data());
            let mut free = Vec::new();
            let mut local = 0.0;
            for i in 0..n {
                if !self.is_active(i, alpha.as_data(), lb, ub) {
                    free.push(i);
                    local = f64::max(local, f64::abs(self.gg[i]));
                }
            }
            let norm_pg = comm.all_reduce_max(local);
            if !norm_pg.is_finite() {
                reason = SolverReason::DivergedFnormNan;
                break;
            }
            if it == 0 {
                norm_pg0 = norm_pg;
            }
            if norm_pg < self.param.atol {
                reason = SolverReason::ConvergedFnormAbs;
                break;
            }
            if it > 0 && norm_pg < self.param.rtol * norm_pg0 {
                reason = SolverReason::ConvergedFnormRelative;
                break;
            }
            if it == self.param.max_it {
                break;
            }

            // projected backtracking line search
            let dir = self.direction(&free, &u, alpha.as_data())?;
            let energy0 = self.model.total_energy(&u, alpha.as_data());
            let allowance = ENERGY_ROUND_OFF * (1.0 + f64::abs(energy0));
            let mut step = 1.0;
            let mut accepted = false;
            for _ in 0..LINE_SEARCH_MAX_IT {
                vec_add(&mut trial, 1.0, &alpha, step, &dir)?;
                project(&mut trial);
                vec_add(&mut increment, 1.0, &trial, -1.0, &alpha)?;
                let slope = comm.all_reduce_sum(vec_inner(&self.gg, &increment));
                if self.model.total_energy(&u, trial.as_data()) <= energy0 + ARMIJO_C1 * slope + allowance {
                    accepted = true;
                    break;
                }
                step *= 0.5;
            }
            if !accepted {
                reason = SolverReason::DivergedLineSearch;
                break;
            }

            // update and check the step size
            let norm_ds = comm.all_reduce_max(vec_norm(&increment, Norm::Max));
            let norm_a = comm.all_reduce_max(vec_norm(&trial, Norm::Max));
            vec_copy(&mut alpha, &trial)?;
            iterations = it + 1;
            if norm_ds < self.param.stol * (1.0 + norm_a) {
                reason = SolverReason::ConvergedSnormRelative;
                break;
            }
        }
        state.alpha.write_and_sync(comm, alpha.as_data())?;
        Ok((iterations, reason))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::DamageSolver;
    use crate::base::{ParamChain, ParamNewton, SerialComm};
    use crate::fem::{Bounds, ChainState, SubproblemSolver};
    use crate::StrError;
    use russell_lab::vec_approx_eq;

    fn loaded_state(param: &ParamChain, t: f64) -> Result<ChainState, StrError> {
        let comm = SerialComm;
        let mut state = ChainState::new(param);
        state.t = t;
        let n = param.n_spring;
        let u: Vec<f64> = (0..(n + 1)).map(|i| (i as f64) * t / (n as f64)).collect();
        state.u.write_and_sync(&comm, &u)?;
        Ok(state)
    }

    #[test]
    fn solve_keeps_undamaged_below_critical_load() -> Result<(), StrError> {
        let comm = SerialComm;
        let param = ParamChain::sample(2);
        let bounds = Bounds::new(&param);
        let mut state = loaded_state(&param, 0.5)?;
        let mut solver = DamageSolver::new(&param, ParamNewton::damage(), &comm);
        let (iterations, reason) = solver.solve(&mut state, &bounds)?;
        assert!(reason.converged());
        assert_eq!(iterations, 0);
        assert_eq!(state.alpha.as_slice(), &[0.0, 0.0]);
        Ok(())
    }

    #[test]
    fn solve_finds_homogeneous_damage() -> Result<(), StrError> {
        // t = 2 ⇒ α = (t/t_c - 1)/(k - 1) = 1/3
        let comm = SerialComm;
        let param = ParamChain::sample(2);
        let bounds = Bounds::new(&param);
        let mut state = loaded_state(&param, 2.0)?;
        let mut solver = DamageSolver::new(&param, ParamNewton::damage(), &comm);
        let (_, reason) = solver.solve(&mut state, &bounds)?;
        assert!(reason.converged());
        vec_approx_eq(state.alpha.values(), &[1.0 / 3.0, 1.0 / 3.0], 1e-9);
        Ok(())
    }

    #[test]
    fn solve_respects_the_bounds() -> Result<(), StrError> {
        let comm = SerialComm;
        let param = ParamChain::sample(3);
        let mut bounds = Bounds::new(&param);
        bounds.lb.write_and_sync(&comm, &[0.5, 0.0, 0.0])?;
        bounds.ub.write_and_sync(&comm, &[1.0, 1.0, 0.2])?;
        let mut state = loaded_state(&param, 2.0)?;
        let mut solver = DamageSolver::new(&param, ParamNewton::damage(), &comm);
        let (_, reason) = solver.solve(&mut state, &bounds)?;
        assert!(reason.converged());
        bounds.check(&comm, &state.alpha)?;
        let alpha = state.alpha.as_slice();
        assert_eq!(alpha[0], 0.5);
        assert!(alpha[1] > 0.2 && alpha[1] < 0.5);
        assert_eq!(alpha[2], 0.2);
        Ok(())
    }
}
