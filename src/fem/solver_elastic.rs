use super::{Bounds, ChainModel, ChainState, SubproblemSolver};
use crate::base::{Communicator, ParamChain, ParamNewton, SolverReason};
use crate::StrError;
use russell_lab::{solve_lin_sys, vec_norm, Matrix, Norm, Vector};

/// Solves the displacement (elasticity) subproblem with the damage held fixed
///
/// Newton's method with the prescribed rows of the Jacobian replaced by the identity:
///
/// ```text
/// K · mdu = R     where R[p] = u[p] - ū(t)  for prescribed p
/// u ← u - mdu
/// ```
pub struct ElasticSolver<'a> {
    model: ChainModel<'a>,
    param: ParamNewton,
    kk: Matrix,
    rr: Vector,
    uu: Vector,
}

impl<'a> ElasticSolver<'a> {
    /// Allocates a new instance
    pub fn new(chain: &'a ParamChain, param: ParamNewton, comm: &'a dyn Communicator) -> Self {
        let n_node = chain.n_spring + 1;
        ElasticSolver {
            model: ChainModel::new(chain, comm),
            param,
            kk: Matrix::new(n_node, n_node),
            rr: Vector::new(n_node),
            uu: Vector::new(n_node),
        }
    }

    /// Calculates the residual vector with the boundary rows augmented
    fn residual(&mut self, t: f64, alpha: &[f64]) {
        self.model.residual_u(&mut self.rr, self.uu.as_data(), alpha);
        for p in &self.model.prescribed.all {
            self.rr[p.eq] = self.uu[p.eq] - (p.f)(t);
        }
    }
}

impl<'a> SubproblemSolver for ElasticSolver<'a> {
    fn solve(&mut self, state: &mut ChainState, _bounds: &Bounds) -> Result<(usize, SolverReason), StrError> {
        if state.u.dim() != self.uu.dim() {
            return Err("the displacement field is incompatible with the elastic solver");
        }
        let comm = self.model.comm;
        let alpha = state.alpha.as_slice().to_vec();
        self.uu.as_mut_data().copy_from_slice(state.u.as_slice());

        let mut norm_rr0 = 0.0;
        let mut reason = SolverReason::DivergedMaxIt;
        let mut iterations = 0;
        for it in 0..=self.param.max_it {
            self.residual(state.t, &alpha);
            let norm_rr = comm.all_reduce_max(vec_norm(&self.rr, Norm::Max));
            if !norm_rr.is_finite() {
                reason = SolverReason::DivergedFnormNan;
                break;
            }
            if it == 0 {
                norm_rr0 = norm_rr;
            }
            if norm_rr < self.param.atol {
                reason = SolverReason::ConvergedFnormAbs;
                break;
            }
            if it > 0 && norm_rr < self.param.rtol * norm_rr0 {
                reason = SolverReason::ConvergedFnormRelative;
                break;
            }
            if it == self.param.max_it {
                break;
            }

            // jacobian with augmented rows
            self.model.jacobian_uu(&mut self.kk, &alpha);
            let n = self.kk.dims().0;
            for p in &self.model.prescribed.all {
                for j in 0..n {
                    self.kk.set(p.eq, j, 0.0);
                }
                self.kk.set(p.eq, p.eq, 1.0);
            }

            // solve and update
            let mut mdu = self.rr.clone();
            let failed = if solve_lin_sys(&mut mdu, &mut self.kk).is_err() { 1.0 } else { 0.0 };
            if comm.all_reduce_max(failed) > 0.0 {
                reason = SolverReason::DivergedLinearSolve;
                break;
            }
            for i in 0..n {
                self.uu[i] -= mdu[i];
            }
            iterations = it + 1;

            let norm_mdu = comm.all_reduce_max(vec_norm(&mdu, Norm::Max));
            let norm_uu = comm.all_reduce_max(vec_norm(&self.uu, Norm::Max));
            if norm_mdu < self.param.stol * (1.0 + norm_uu) {
                reason = SolverReason::ConvergedSnormRelative;
                break;
            }
        }
        state.u.write_and_sync(comm, self.uu.as_data())?;
        Ok((iterations, reason))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
