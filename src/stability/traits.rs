use crate::fem::{Bounds, ChainState};
use crate::StrError;
use serde::{Deserialize, Serialize};

/// Holds the inertia of the restricted Hessian (number of negative, zero, and positive eigenvalues)
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
pub struct Inertia {
    pub negative: usize,
    pub zero: usize,
    pub positive: usize,
}

/// Holds the results of the eigen-analysis of the restricted Hessian
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct EigenData {
    /// All eigenvalues in ascending order
    pub eigenvalues: Vec<f64>,

    /// Eigenvector of the smallest eigenvalue (in the restricted numbering)
    pub eigenvector: Vec<f64>,

    /// Number of damage DOFs in the inactive (critical) set
    pub n_inactive: usize,
}

/// Holds the results of the cone-constrained eigen-analysis
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct ConeData {
    /// Number of iterations of the cone solver
    pub iterations: usize,

    /// Smallest Rayleigh quotient found in the cone (None if the restricted system is empty)
    pub lambda: Option<f64>,

    /// Last change of the cone eigenvector (L∞ norm)
    pub error: f64,

    /// Cone eigenvector (in the restricted numbering)
    pub eigenvector: Vec<f64>,
}

/// Defines the bifurcation (second order, unconstrained) stability check
pub trait StabilityOracle {
    /// Analyzes the state; returns true if no bifurcation is possible (stable)
    fn solve(&mut self, state: &ChainState, bounds: &Bounds) -> Result<bool, StrError>;

    /// Returns true if the last analyzed state has no critical damage DOF
    fn is_elastic(&self) -> bool;

    /// Returns the inertia of the last analyzed state
    fn inertia(&self) -> Inertia;

    /// Returns the eigen data of the last analyzed state
    fn eigen_data(&self) -> &EigenData;
}

/// Defines the cone-constrained (irreversible) stability check
pub trait ConeStabilityOracle {
    /// Analyzes the state; returns true if the second variation is positive on the cone of admissible perturbations
    fn solve(&mut self, state: &ChainState, bounds: &Bounds) -> Result<bool, StrError>;

    /// Returns the diagnostic data of the last analyzed state
    fn cone_data(&self) -> &ConeData;
}
