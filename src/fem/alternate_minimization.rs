use super::{AlternateConvergence, AmStatus, Bounds, ChainModel, ChainState, Field, IterationRecord};
use super::{DamageSolver, ElasticSolver, SubproblemSolver};
use crate::base::{Communicator, Config, SimError};
use russell_lab::{vec_norm, Norm, Vector};

/// Implements the alternate (staggered) minimization of the energy
///
/// Each iteration solves the elasticity subproblem (u with α fixed), then the damage
/// subproblem (α with u fixed, lb ≤ α ≤ ub), and records the norms of the damage increment
/// and of the residuals. Only the metric selected by the criterion decides termination.
pub struct AlternateMinimization<'a> {
    config: &'a Config,
    model: ChainModel<'a>,
    elastic: Box<dyn SubproblemSolver + 'a>,
    damage: Box<dyn SubproblemSolver + 'a>,
    alpha_old: Field,
    alpha_diff: Field,
    convergence: AlternateConvergence<'a>,
}

impl<'a> AlternateMinimization<'a> {
    /// Allocates a new instance with the Newton-type subproblem solvers
    pub fn new(config: &'a Config, comm: &'a dyn Communicator) -> Self {
        let elastic = Box::new(ElasticSolver::new(&config.model, config.elasticity, comm));
        let damage = Box::new(DamageSolver::new(&config.model, config.damage, comm));
        AlternateMinimization::with_solvers(config, comm, elastic, damage)
    }

    /// Allocates a new instance with given subproblem solvers
    pub fn with_solvers(
        config: &'a Config,
        comm: &'a dyn Communicator,
        elastic: Box<dyn SubproblemSolver + 'a>,
        damage: Box<dyn SubproblemSolver + 'a>,
    ) -> Self {
        let n = config.model.n_spring;
        AlternateMinimization {
            config,
            model: ChainModel::new(&config.model, comm),
            elastic,
            damage,
            alpha_old: Field::new(n, 0.0),
            alpha_diff: Field::new(n, 0.0),
            convergence: AlternateConvergence::new(config),
        }
    }

    /// Returns the status of the last call to solve
    pub fn status(&self) -> AmStatus {
        self.convergence.status()
    }

    /// Runs the alternate minimization until the selected criterion is satisfied
    ///
    /// Updates `state.u` and `state.alpha` in place. Returns the records of all iterations, or
    /// [SimError::NonConvergence] with exactly `max_it` records if the cap is reached.
    pub fn solve(&mut self, state: &mut ChainState, bounds: &Bounds) -> Result<Vec<IterationRecord>, SimError> {
        let comm = self.model.comm;
        self.alpha_old.write_and_sync(comm, state.alpha.as_slice())?;
        self.convergence.reset();
        self.convergence.print_header();
        let mut records: Vec<IterationRecord> = Vec::new();
        loop {
            match self.convergence.status() {
                AmStatus::Iterating => {
                    let record = self.iterate(records.len(), state, bounds)?;
                    self.convergence.analyze(&record);
                    self.convergence.print_iteration(&record);
                    records.push(record);
                }
                AmStatus::Converged => return Ok(records),
                AmStatus::Exhausted => {
                    let (iterations, error_alpha_h1) = match records.last() {
                        Some(last) => (records.len(), last.error_alpha_h1),
                        None => (0, f64::NAN),
                    };
                    return Err(SimError::NonConvergence {
                        iterations,
                        error_alpha_h1,
                        metric: self.convergence.metric(),
                        records,
                    });
                }
            }
        }
    }

    /// Performs one elastic solve followed by one damage solve
    fn iterate(&mut self, iteration: usize, state: &mut ChainState, bounds: &Bounds) -> Result<IterationRecord, SimError> {
        let comm = self.model.comm;

        // staggered solves
        let (solver_u_it, solver_u_reason) = self.elastic.solve(state, bounds)?;
        let (solver_alpha_it, solver_alpha_reason) = self.damage.solve(state, bounds)?;
        if !solver_u_reason.converged() {
            log::warn!(
                "elastic solver did not converge at iteration {} (reason = {})",
                iteration,
                solver_u_reason.code()
            );
        }
        if !solver_alpha_reason.converged() {
            log::warn!(
                "damage solver did not converge at iteration {} (reason = {})",
                iteration,
                solver_alpha_reason.code()
            );
        }
        bounds.check(comm, &state.alpha)?;

        // damage increment (synchronized before computing the norms)
        let alpha_old = self.alpha_old.as_slice();
        let diff: Vec<f64> = state
            .alpha
            .as_slice()
            .iter()
            .zip(alpha_old)
            .map(|(a, b)| a - b)
            .collect();
        self.alpha_diff.write_and_sync(comm, &diff)?;
        let (error_alpha_l2, error_alpha_h1, error_alpha_max) = self.model.increment_norms(self.alpha_diff.as_slice());

        // residuals
        let rr_u = self.model.residual_u_with_bc(state);
        let error_residual_u = f64::sqrt(comm.all_reduce_sum(sum_of_squares(&rr_u)));
        let u = state.u.as_slice();
        let alpha = state.alpha.as_slice();
        let mut ff_u = Vector::new(u.len());
        let mut ff_alpha = Vector::new(alpha.len());
        self.model.residual_u(&mut ff_u, u, alpha);
        self.model.residual_alpha(&mut ff_alpha, u, alpha);
        let f_norm = f64::sqrt(comm.all_reduce_sum(sum_of_squares(&ff_u) + sum_of_squares(&ff_alpha)));
        let total_energy = self.model.total_energy(u, alpha);

        // update the previous damage
        self.alpha_old.write_and_sync(comm, alpha)?;

        Ok(IterationRecord {
            iteration,
            error_alpha_l2,
            error_alpha_h1,
            error_alpha_max,
            error_residual_u,
            f_norm,
            total_energy,
            solver_u_it,
            solver_u_reason,
            solver_alpha_it,
            solver_alpha_reason,
        })
    }
}

/// Returns the sum of the squared components
fn sum_of_squares(v: &Vector) -> f64 {
    let norm = vec_norm(v, Norm::Euc);
    norm * norm
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
