//! Makes available common structures needed to run a simulation
//!
//! You may write `use dmsim::prelude::*` in your code and obtain
//! access to commonly used functionality.

pub use crate::analytical::HomogeneousChain;
pub use crate::base::{Communicator, Config, Criterion, Equilibrium, Irreversibility, SerialComm, SimError};
pub use crate::base::{ParamChain, ParamLoading, ParamNewton, ParamStability, DEFAULT_OUT_DIR, DEFAULT_TEST_DIR};
pub use crate::fem::{AlternateMinimization, Bounds, ChainState, FileIo, HistoryLog, LoadStepDriver, LoadStepRecord};
pub use crate::stability::{ConeStabilityOracle, Inertia, StabilityOracle};
