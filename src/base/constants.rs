/// Defines the directory where the simulation result files are saved
pub const DEFAULT_OUT_DIR: &str = "/tmp/dmsim/results";

/// Defines an auxiliary directory where the test result files are saved
pub const DEFAULT_TEST_DIR: &str = "/tmp/dmsim/test";

/// Defines the smallest allowed tolerance
pub const CONTROL_MIN_TOL: f64 = 1e-15;

/// Defines the round-off allowance when checking the damage bounds
pub const BOUNDS_ROUND_OFF: f64 = 1e-12;
