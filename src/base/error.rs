use crate::fem::IterationRecord;
use crate::StrError;
use thiserror::Error;

/// Defines the errors that abort a simulation
#[derive(Error, Debug)]
pub enum SimError {
    /// The alternate minimization exhausted the iteration cap without satisfying the stopping criterion
    #[error("alternate minimization could not converge after {iterations} iterations (H1 error = {error_alpha_h1:e}, criterion metric = {metric:e})")]
    NonConvergence {
        /// Number of iterations performed (equal to the cap)
        iterations: usize,

        /// H1 norm of the damage increment at the last iteration
        error_alpha_h1: f64,

        /// Value of the selected criterion metric at the last iteration
        metric: f64,

        /// All iteration records of the failed load step
        records: Vec<IterationRecord>,
    },

    /// Any other failure (invalid data, input/output, linear algebra)
    #[error("{0}")]
    Message(StrError),
}

impl From<StrError> for SimError {
    fn from(msg: StrError) -> Self {
        SimError::Message(msg)
    }
}

impl SimError {
    /// Returns the message if this is a plain error
    pub fn message(&self) -> Option<StrError> {
        match self {
            SimError::Message(msg) => Some(msg),
            _ => None,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
