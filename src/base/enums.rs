use crate::StrError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Selects the quantity that drives the stopping test of the alternate minimization
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum Criterion {
    /// Norm of the residual of the displacement equilibrium (with Dirichlet rows)
    #[serde(rename = "residual_u")]
    ResidualU,

    /// H1 norm of the damage increment between two iterations
    #[serde(rename = "alpha_H1")]
    AlphaH1,
}

/// Defines how the damage lower bound evolves along the loading
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum Irreversibility {
    /// The lower bound keeps its initial value at all load steps
    Fixed,

    /// The lower bound is raised to the converged damage after each load step
    Ratchet,
}

/// Selects how the equilibrium state is obtained at each load step
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum Equilibrium {
    /// Closed-form solution of the uniform chain (elastic then homogeneously damaging)
    Homogeneous,

    /// Alternate minimization with respect to displacement and damage
    Alternate,
}

/// Holds the termination reason of a nonlinear (sub)solver
///
/// The numeric codes follow the usual convention: positive means converged and
/// negative means diverged.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum SolverReason {
    /// The norm of the (projected) residual is smaller than the absolute tolerance
    ConvergedFnormAbs,

    /// The norm of the (projected) residual decreased by the relative tolerance
    ConvergedFnormRelative,

    /// The step is small compared with the solution
    ConvergedSnormRelative,

    /// The linear system could not be solved
    DivergedLinearSolve,

    /// The residual is NaN or Inf
    DivergedFnormNan,

    /// The maximum number of iterations has been reached
    DivergedMaxIt,

    /// The line search failed to decrease the energy
    DivergedLineSearch,
}

impl Criterion {
    /// Returns the name used in the configuration files
    pub fn name(&self) -> &'static str {
        match self {
            Criterion::ResidualU => "residual_u",
            Criterion::AlphaH1 => "alpha_H1",
        }
    }
}

impl FromStr for Criterion {
    type Err = StrError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "residual_u" => Ok(Criterion::ResidualU),
            "alpha_H1" => Ok(Criterion::AlphaH1),
            _ => Err("criterion must be residual_u or alpha_H1"),
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl SolverReason {
    /// Returns the numeric code (positive = converged; negative = diverged)
    pub fn code(&self) -> i32 {
        match self {
            SolverReason::ConvergedFnormAbs => 2,
            SolverReason::ConvergedFnormRelative => 3,
            SolverReason::ConvergedSnormRelative => 4,
            SolverReason::DivergedLinearSolve => -3,
            SolverReason::DivergedFnormNan => -4,
            SolverReason::DivergedMaxIt => -5,
            SolverReason::DivergedLineSearch => -6,
        }
    }

    /// Returns true if the solver converged
    pub fn converged(&self) -> bool {
        self.code() > 0
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{Criterion, Irreversibility, SolverReason};

    #[test]
    fn criterion_works() {
        assert_eq!("residual_u".parse::<Criterion>(), Ok(Criterion::ResidualU));
        assert_eq!("alpha_H1".parse::<Criterion>(), Ok(Criterion::AlphaH1));
        assert_eq!(
            "alpha_L2".parse::<Criterion>().err(),
            Some("criterion must be residual_u or alpha_H1")
        );
        assert_eq!(format!("{}", Criterion::AlphaH1), "alpha_H1");
        let json = serde_json::to_string(&Criterion::ResidualU).unwrap();
        assert_eq!(json, "\"residual_u\"");
        let read: Criterion = serde_json::from_str("\"alpha_H1\"").unwrap();
        assert_eq!(read, Criterion::AlphaH1);
    }

    #[test]
    fn solver_reason_works() {
        assert_eq!(SolverReason::ConvergedFnormAbs.code(), 2);
        assert_eq!(SolverReason::DivergedMaxIt.code(), -5);
        assert!(SolverReason::ConvergedSnormRelative.converged());
        assert!(!SolverReason::DivergedLineSearch.converged());
    }

    #[test]
    fn derive_works() {
        let p = Irreversibility::Ratchet;
        let q = p.clone();
        assert_eq!(format!("{:?}", q), "Ratchet");
    }
}
