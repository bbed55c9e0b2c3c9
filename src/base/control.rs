use super::{Criterion, CONTROL_MIN_TOL};
use serde::{Deserialize, Serialize};

/// Holds the options to control the alternate minimization (damage-elasticity) iterations
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct ControlAlternate {
    /// Maximum number of alternate minimization iterations (exceeding it is fatal)
    pub max_it: usize,

    /// Quantity driving the stopping test
    pub criterion: Criterion,

    /// Tolerance for the selected criterion
    pub alpha_rtol: f64,
}

impl ControlAlternate {
    /// Allocates a new instance with default values
    pub fn new() -> Self {
        ControlAlternate {
            max_it: 100,
            criterion: Criterion::AlphaH1,
            alpha_rtol: 1e-5,
        }
    }

    /// Validates all data
    ///
    /// Returns a message with the inconsistent data, or returns None if everything is all right.
    pub fn validate(&self) -> Option<String> {
        if self.max_it < 1 {
            return Some(format!(
                "damage_elasticity.max_it = {} is incorrect; it must be ≥ 1",
                self.max_it
            ));
        }
        if self.alpha_rtol < CONTROL_MIN_TOL {
            return Some(format!(
                "damage_elasticity.alpha_rtol = {:?} is incorrect; it must be ≥ {:e}",
                self.alpha_rtol, CONTROL_MIN_TOL
            ));
        }
        None
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::ControlAlternate;
    use crate::base::Criterion;

    #[test]
    fn new_works() {
        let control = ControlAlternate::new();
        assert_eq!(control.max_it, 100);
        assert_eq!(control.criterion, Criterion::AlphaH1);
        assert_eq!(control.alpha_rtol, 1e-5);
        assert_eq!(control.validate(), None);
    }

    #[test]
    fn validate_captures_errors() {
        let mut control = ControlAlternate::new();
        control.max_it = 0;
        assert_eq!(
            control.validate(),
            Some("damage_elasticity.max_it = 0 is incorrect; it must be ≥ 1".to_string())
        );
        control.max_it = 1;
        control.alpha_rtol = 0.0;
        assert_eq!(
            control.validate(),
            Some("damage_elasticity.alpha_rtol = 0.0 is incorrect; it must be ≥ 1e-15".to_string())
        );
    }
}
