//! dmsim -- Damage mechanics simulator
//!
//! This crate simulates the quasi-static evolution of damage in a one-dimensional chain of
//! discrete damageable springs loaded by an imposed end displacement. Each load step finds an
//! equilibrium with an alternate minimization algorithm (displacement then damage) and then
//! certifies the equilibrium with an eigen-analysis (bifurcation) and a cone-constrained
//! stability test.
//!
//! ```text
//!         1         2        i        N
//! 0|----[WWW]--*--[WWW]--*--...--*--[WWW]--|========> t
//! u_0         u_1       u_2     u_i      u_N
//!
//! [WWW]: damageable spring with damage alpha_i
//! ```

/// Defines a type alias for the error type as a static string
pub type StrError = &'static str;

pub mod analytical;
pub mod base;
pub mod fem;
pub mod prelude;
pub mod stability;
