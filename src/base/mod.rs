//! Implements the base structures for a damage simulation

mod communicator;
mod config;
mod constants;
mod control;
mod enums;
mod error;
mod parameters;
pub use crate::base::communicator::*;
pub use crate::base::config::*;
pub use crate::base::constants::*;
pub use crate::base::control::*;
pub use crate::base::enums::*;
pub use crate::base::error::*;
pub use crate::base::parameters::*;
