use super::{ControlAlternate, Criterion, Equilibrium, Irreversibility};
use super::{ParamChain, ParamLoading, ParamNewton, ParamStability, CONTROL_MIN_TOL};
use crate::StrError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Holds all configuration data of a simulation
///
/// The configuration is built once (with the setters), validated, and then passed by
/// reference to every component. It is never modified during a run.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Material and geometry parameters
    pub model: ParamChain,

    /// Alternate minimization control
    pub damage_elasticity: ControlAlternate,

    /// Options of the elasticity (displacement) subproblem solver
    pub elasticity: ParamNewton,

    /// Options of the damage subproblem solver
    pub damage: ParamNewton,

    /// Options of the stability solvers
    pub stability: ParamStability,

    /// Loading program
    pub loading: ParamLoading,

    /// How the equilibrium is obtained at each load step
    pub equilibrium: Equilibrium,

    /// Evolution of the damage lower bound along the loading
    pub irreversibility: Irreversibility,

    /// Verbose mode during load steps
    pub verbose_steps: bool,

    /// Verbose mode during alternate minimization iterations
    pub verbose_iterations: bool,
}

impl Config {
    /// Allocates a new instance with default values
    ///
    /// The default chain has two springs with μ = 1, w1 = 2, k = 4, loaded from 0 to k in 30 steps.
    pub fn new() -> Self {
        let model = ParamChain::sample(2);
        Config {
            model,
            damage_elasticity: ControlAlternate::new(),
            elasticity: ParamNewton::elasticity(),
            damage: ParamNewton::damage(),
            stability: ParamStability::new(),
            loading: ParamLoading {
                min: 0.0,
                max: model.k,
                steps: 30,
            },
            equilibrium: Equilibrium::Alternate,
            irreversibility: Irreversibility::Fixed,
            verbose_steps: false,
            verbose_iterations: false,
        }
    }

    /// Sets the material and geometry parameters
    pub fn set_model(&mut self, model: ParamChain) -> &mut Self {
        self.model = model;
        self
    }

    /// Sets the number of springs
    pub fn set_n_spring(&mut self, n_spring: usize) -> &mut Self {
        self.model.n_spring = n_spring;
        self
    }

    /// Sets the maximum number of alternate minimization iterations
    pub fn set_max_it(&mut self, max_it: usize) -> &mut Self {
        self.damage_elasticity.max_it = max_it;
        self
    }

    /// Sets the stopping criterion of the alternate minimization
    pub fn set_criterion(&mut self, criterion: Criterion) -> &mut Self {
        self.damage_elasticity.criterion = criterion;
        self
    }

    /// Sets the tolerance of the stopping criterion
    pub fn set_alpha_rtol(&mut self, alpha_rtol: f64) -> &mut Self {
        self.damage_elasticity.alpha_rtol = alpha_rtol;
        self
    }

    /// Sets the loading program
    pub fn set_loading(&mut self, min: f64, max: f64, steps: usize) -> &mut Self {
        self.loading = ParamLoading { min, max, steps };
        self
    }

    /// Sets how the equilibrium is obtained at each load step
    pub fn set_equilibrium(&mut self, equilibrium: Equilibrium) -> &mut Self {
        self.equilibrium = equilibrium;
        self
    }

    /// Sets the evolution of the damage lower bound
    pub fn set_irreversibility(&mut self, irreversibility: Irreversibility) -> &mut Self {
        self.irreversibility = irreversibility;
        self
    }

    /// Sets the verbose flags
    pub fn set_verbose(&mut self, steps: bool, iterations: bool) -> &mut Self {
        self.verbose_steps = steps;
        self.verbose_iterations = iterations;
        self
    }

    /// Validates all data
    ///
    /// Returns a message with the inconsistent data, or returns None if everything is all right.
    pub fn validate(&self) -> Option<String> {
        let m = &self.model;
        if m.n_spring < 1 {
            return Some(format!("model.n_spring = {} is incorrect; it must be ≥ 1", m.n_spring));
        }
        if m.mu <= 0.0 {
            return Some(format!("model.mu = {:?} is incorrect; it must be > 0.0", m.mu));
        }
        if m.w1 <= 0.0 {
            return Some(format!("model.w1 = {:?} is incorrect; it must be > 0.0", m.w1));
        }
        if m.k <= 1.0 {
            return Some(format!("model.k = {:?} is incorrect; it must be > 1.0", m.k));
        }
        if m.k_res < 0.0 {
            return Some(format!("model.k_res = {:?} is incorrect; it must be ≥ 0.0", m.k_res));
        }
        if m.ell < 0.0 {
            return Some(format!("model.ell = {:?} is incorrect; it must be ≥ 0.0", m.ell));
        }
        if let Some(msg) = self.damage_elasticity.validate() {
            return Some(msg);
        }
        for (name, p) in [("elasticity", &self.elasticity), ("damage", &self.damage)] {
            if p.max_it < 1 {
                return Some(format!("{}.max_it = {} is incorrect; it must be ≥ 1", name, p.max_it));
            }
            if p.atol < CONTROL_MIN_TOL || p.rtol < CONTROL_MIN_TOL || p.stol < CONTROL_MIN_TOL {
                return Some(format!(
                    "{}.(atol, rtol, stol) = ({:?}, {:?}, {:?}) are incorrect; they must be ≥ {:e}",
                    name, p.atol, p.rtol, p.stol, CONTROL_MIN_TOL
                ));
            }
        }
        let s = &self.stability;
        if s.inactive_set_gatol < 0.0 || s.eig_zero_tol < 0.0 {
            return Some(format!(
                "stability.(inactive_set_gatol, eig_zero_tol) = ({:?}, {:?}) are incorrect; they must be ≥ 0.0",
                s.inactive_set_gatol, s.eig_zero_tol
            ));
        }
        if s.cone_max_it < 1 {
            return Some(format!(
                "stability.cone_max_it = {} is incorrect; it must be ≥ 1",
                s.cone_max_it
            ));
        }
        if s.cone_atol < CONTROL_MIN_TOL {
            return Some(format!(
                "stability.cone_atol = {:?} is incorrect; it must be ≥ {:e}",
                s.cone_atol, CONTROL_MIN_TOL
            ));
        }
        if self.loading.max < self.loading.min {
            return Some(format!(
                "loading.max = {:?} is incorrect; it must be ≥ loading.min = {:?}",
                self.loading.max, self.loading.min
            ));
        }
        None
    }

    /// Returns the configuration serialized as JSON
    pub fn to_json(&self) -> Result<String, StrError> {
        serde_json::to_string(self).map_err(|_| "cannot serialize configuration")
    }

    /// Returns the signature of this configuration (hash of its JSON representation)
    ///
    /// Two configurations with the same content have the same signature.
    pub fn signature(&self) -> Result<String, StrError> {
        let json = self.to_json()?;
        let hex = blake3::hash(json.as_bytes()).to_hex();
        Ok(hex.as_str()[..32].to_string())
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Configuration data")?;
        writeln!(f, "==================")?;
        writeln!(f, "model = {:?}", self.model)?;
        writeln!(f, "damage_elasticity = {:?}", self.damage_elasticity)?;
        writeln!(f, "elasticity = {:?}", self.elasticity)?;
        writeln!(f, "damage = {:?}", self.damage)?;
        writeln!(f, "stability = {:?}", self.stability)?;
        writeln!(f, "loading = {:?}", self.loading)?;
        writeln!(f, "equilibrium = {:?}", self.equilibrium)?;
        writeln!(f, "irreversibility = {:?}", self.irreversibility)?;
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::Config;
    use crate::base::{Criterion, Equilibrium, Irreversibility, ParamChain};
    use crate::StrError;

    #[test]
    fn new_works() -> Result<(), StrError> {
        let mut config = Config::new();
        assert_eq!(config.validate(), None);
        assert_eq!(config.loading.max, 4.0);
        assert_eq!(config.loading.steps, 30);

        config
            .set_n_spring(3)
            .set_max_it(20)
            .set_criterion(Criterion::ResidualU)
            .set_alpha_rtol(1e-6)
            .set_loading(0.0, 2.0, 5)
            .set_equilibrium(Equilibrium::Homogeneous)
            .set_irreversibility(Irreversibility::Ratchet)
            .set_verbose(true, false);
        assert_eq!(config.validate(), None);
        assert_eq!(config.model.n_spring, 3);
        assert_eq!(config.damage_elasticity.max_it, 20);
        assert_eq!(config.damage_elasticity.criterion, Criterion::ResidualU);
        assert_eq!(config.damage_elasticity.alpha_rtol, 1e-6);
        assert_eq!(config.loading.loads(), &[0.0, 0.5, 1.0, 1.5, 2.0]);
        assert!(config.verbose_steps);
        assert!(!config.verbose_iterations);

        let text = format!("{}", config);
        assert!(text.starts_with("Configuration data\n"));
        assert!(text.contains("irreversibility = Ratchet\n"));
        Ok(())
    }

    #[test]
    fn validate_captures_errors() {
        let mut config = Config::new();
        config.set_n_spring(0);
        assert_eq!(
            config.validate(),
            Some("model.n_spring = 0 is incorrect; it must be ≥ 1".to_string())
        );
        config.set_model(ParamChain {
            k: 1.0,
            ..ParamChain::sample(2)
        });
        assert_eq!(
            config.validate(),
            Some("model.k = 1.0 is incorrect; it must be > 1.0".to_string())
        );
        config.set_model(ParamChain::sample(2)).set_max_it(0);
        assert_eq!(
            config.validate(),
            Some("damage_elasticity.max_it = 0 is incorrect; it must be ≥ 1".to_string())
        );
        config.set_max_it(10);
        config.damage.max_it = 0;
        assert_eq!(
            config.validate(),
            Some("damage.max_it = 0 is incorrect; it must be ≥ 1".to_string())
        );
        config.damage.max_it = 10;
        config.set_loading(1.0, 0.0, 3);
        assert_eq!(
            config.validate(),
            Some("loading.max = 0.0 is incorrect; it must be ≥ loading.min = 1.0".to_string())
        );
    }

    #[test]
    fn signature_works() -> Result<(), StrError> {
        let mut config = Config::new();
        let sig_a = config.signature()?;
        assert_eq!(sig_a.len(), 32);
        assert_eq!(config.clone().signature()?, sig_a);
        config.set_n_spring(5);
        assert_ne!(config.signature()?, sig_a);
        Ok(())
    }

    #[test]
    fn serialize_works() -> Result<(), StrError> {
        let mut config = Config::new();
        config.set_criterion(Criterion::ResidualU);
        let json = config.to_json()?;
        assert!(json.contains("\"criterion\":\"residual_u\""));
        let read: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(read, config);
        Ok(())
    }
}
