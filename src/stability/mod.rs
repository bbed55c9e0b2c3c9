//! Implements the second order stability checks of an equilibrium state

mod bifurcation;
mod cone;
mod restricted_hessian;
mod traits;
pub use crate::stability::bifurcation::*;
pub use crate::stability::cone::*;
pub use crate::stability::restricted_hessian::*;
pub use crate::stability::traits::*;
