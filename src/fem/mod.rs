//! Implements the chain model, the subproblem solvers, and the load stepping

mod alternate_convergence;
mod alternate_minimization;
mod chain_model;
mod chain_state;
mod field;
mod file_io;
mod history;
mod load_stepping;
mod prescribed_values;
mod solver_damage;
mod solver_elastic;
mod subproblem;
pub use crate::fem::alternate_convergence::*;
pub use crate::fem::alternate_minimization::*;
pub use crate::fem::chain_model::*;
pub use crate::fem::chain_state::*;
pub use crate::fem::field::*;
pub use crate::fem::file_io::*;
pub use crate::fem::history::*;
pub use crate::fem::load_stepping::*;
pub use crate::fem::prescribed_values::*;
pub use crate::fem::solver_damage::*;
pub use crate::fem::solver_elastic::*;
pub use crate::fem::subproblem::*;
