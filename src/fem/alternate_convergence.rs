use crate::base::{Config, Criterion, SolverReason};
use serde::{Deserialize, Serialize};

/// Holds the diagnostics of one alternate minimization iteration
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct IterationRecord {
    /// Iteration index (starting at zero)
    pub iteration: usize,

    /// L2 norm of the damage increment
    pub error_alpha_l2: f64,

    /// H1 norm of the damage increment
    pub error_alpha_h1: f64,

    /// L∞ norm of the damage increment
    pub error_alpha_max: f64,

    /// Euclidean norm of the displacement residual (with boundary conditions)
    pub error_residual_u: f64,

    /// Norm of the full first variation (displacement and damage blocks)
    pub f_norm: f64,

    /// Total energy at the end of the iteration
    pub total_energy: f64,

    /// Number of iterations of the elastic solver
    pub solver_u_it: usize,

    /// Termination reason of the elastic solver
    pub solver_u_reason: SolverReason,

    /// Number of iterations of the damage solver
    pub solver_alpha_it: usize,

    /// Termination reason of the damage solver
    pub solver_alpha_reason: SolverReason,
}

impl IterationRecord {
    /// Returns the value of the metric selected by the criterion
    pub fn metric(&self, criterion: Criterion) -> f64 {
        match criterion {
            Criterion::ResidualU => self.error_residual_u,
            Criterion::AlphaH1 => self.error_alpha_h1,
        }
    }
}

/// Defines the states of the alternate minimization loop
///
/// ```text
///              metric ≤ tol
/// Iterating ──────────────────→ Converged
///     │
///     │ iteration + 1 = max_it (metric > tol)
///     └───────────────────────→ Exhausted ──→ NonConvergence error
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AmStatus {
    Iterating,
    Converged,
    Exhausted,
}

/// Controls the convergence of the alternate minimization iterations
pub struct AlternateConvergence<'a> {
    config: &'a Config,
    status: AmStatus,
    metric: f64,
}

impl<'a> AlternateConvergence<'a> {
    /// Allocates a new instance
    pub fn new(config: &'a Config) -> Self {
        AlternateConvergence {
            config,
            status: AmStatus::Iterating,
            metric: f64::INFINITY,
        }
    }

    /// Resets the state machine for a new load step
    pub fn reset(&mut self) {
        self.status = AmStatus::Iterating;
        self.metric = f64::INFINITY;
    }

    /// Returns the current status
    pub fn status(&self) -> AmStatus {
        self.status
    }

    /// Returns the last value of the selected metric
    pub fn metric(&self) -> f64 {
        self.metric
    }

    /// Analyzes the record of the last iteration and performs the transition
    ///
    /// A NaN metric never satisfies the tolerance.
    pub fn analyze(&mut self, record: &IterationRecord) -> AmStatus {
        if self.status != AmStatus::Iterating {
            return self.status;
        }
        let control = &self.config.damage_elasticity;
        self.metric = record.metric(control.criterion);
        self.status = if self.metric <= control.alpha_rtol {
            AmStatus::Converged
        } else if record.iteration + 1 >= control.max_it {
            AmStatus::Exhausted
        } else {
            AmStatus::Iterating
        };
        self.status
    }

    /// Prints the header of the iterations table
    pub fn print_header(&self) {
        if self.config.verbose_iterations {
            println!("{}", "─".repeat(90));
            println!(
                "{:>5} {:>11} {:>11} {:>11} {:>11} {:>11} {:>4} {:>4} {:>4}",
                "iter", "‖Δα‖₂", "‖Δα‖H1", "‖Δα‖∞", "‖Rᵤ‖₂", "E", "u_it", "α_it", " "
            );
            println!("{}", "─".repeat(90));
        }
    }

    /// Prints the current iteration
    pub fn print_iteration(&self, record: &IterationRecord) {
        if self.config.verbose_iterations {
            let icon = match self.status {
                AmStatus::Converged => "✅",
                AmStatus::Exhausted => "😱",
                AmStatus::Iterating => "🔹",
            };
            println!(
                "{:>5} {:>11.3e} {:>11.3e} {:>11.3e} {:>11.3e} {:>11.4e} {:>4} {:>4} {}",
                record.iteration,
                record.error_alpha_l2,
                record.error_alpha_h1,
                record.error_alpha_max,
                record.error_residual_u,
                record.total_energy,
                record.solver_u_it,
                record.solver_alpha_it,
                icon
            );
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
