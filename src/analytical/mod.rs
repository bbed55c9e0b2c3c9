//! Implements closed-form solutions used as reference results

mod homogeneous_chain;
pub use crate::analytical::homogeneous_chain::*;
