use super::{AlternateMinimization, Bounds, ChainModel, ChainState, FileIo, HistoryLog, LoadStepRecord};
use crate::analytical::HomogeneousChain;
use crate::base::{Communicator, Config, Equilibrium, Irreversibility, SimError};
use crate::stability::{BifurcationSolver, ConeSolver, ConeStabilityOracle, StabilityOracle};
use crate::StrError;

/// Drives the quasi-static loading of the chain
///
/// For each load, the driver finds the equilibrium (closed-form homogeneous state or alternate
/// minimization), runs the bifurcation and cone analyses, computes the energies and the
/// reaction force, appends a record to the history, and overwrites the history file.
pub struct LoadStepDriver<'a> {
    config: &'a Config,
    comm: &'a dyn Communicator,
    model: ChainModel<'a>,
    homogeneous: HomogeneousChain,
    minimizer: AlternateMinimization<'a>,
    stability: Box<dyn StabilityOracle + 'a>,
    cone: Box<dyn ConeStabilityOracle + 'a>,
    file_io: FileIo,
    history: HistoryLog,

    /// Current state (the converged state of the last completed step)
    pub state: ChainState,

    /// Damage bounds
    pub bounds: Bounds,
}

impl<'a> LoadStepDriver<'a> {
    /// Allocates a new instance with the eigen and cone solvers
    pub fn new(config: &'a Config, comm: &'a dyn Communicator, file_io: FileIo) -> Result<Self, StrError> {
        let stability = Box::new(BifurcationSolver::new(&config.model, config.stability, comm));
        let cone = Box::new(ConeSolver::new(&config.model, config.stability, comm));
        LoadStepDriver::with_oracles(config, comm, file_io, stability, cone)
    }

    /// Allocates a new instance with given stability oracles
    pub fn with_oracles(
        config: &'a Config,
        comm: &'a dyn Communicator,
        file_io: FileIo,
        stability: Box<dyn StabilityOracle + 'a>,
        cone: Box<dyn ConeStabilityOracle + 'a>,
    ) -> Result<Self, StrError> {
        if let Some(msg) = config.validate() {
            println!("ERROR: {}", msg);
            return Err("cannot allocate driver because config.validate() failed");
        }
        Ok(LoadStepDriver {
            config,
            comm,
            model: ChainModel::new(&config.model, comm),
            homogeneous: HomogeneousChain::new(&config.model),
            minimizer: AlternateMinimization::new(config, comm),
            stability,
            cone,
            file_io,
            history: HistoryLog::new(),
            state: ChainState::new(&config.model),
            bounds: Bounds::new(&config.model),
        })
    }

    /// Returns the history of the completed steps
    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Returns the output files manager
    pub fn file_io(&self) -> &FileIo {
        &self.file_io
    }

    /// Runs all load steps
    ///
    /// The loads must be strictly increasing, also with respect to the last completed step.
    /// A subsequent call continues from the current state and appends to the same history.
    ///
    /// On failure, the persisted history holds all steps completed before the failing one.
    pub fn run(&mut self, loads: &[f64]) -> Result<HistoryLog, SimError> {
        let after_last = match (self.history.last(), loads.first()) {
            (Some(last), Some(first)) => *first > last.load,
            _ => true,
        };
        if !after_last || loads.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(SimError::Message("loads must be strictly increasing"));
        }
        if self.config.verbose_steps {
            println!("{:>4} {:>10} {:>6} {:>6} {:>9} {:>4}", "step", "t", "stable", "cone", "inertia", "AM");
        }
        for t in loads {
            let record = self.step(*t)?;
            if self.config.verbose_steps {
                println!(
                    "{:>4} {:>10.5} {:>6} {:>6} {:>3},{},{} {:>4}",
                    self.history.len(),
                    record.load,
                    record.stable,
                    record.cone_stable,
                    record.inertia.negative,
                    record.inertia.zero,
                    record.inertia.positive,
                    record.am_iterations
                );
            }
            self.history.push(record);
            self.file_io.write_history(&self.history)?;
            self.file_io.write_fields(&self.state)?;
            self.comm.barrier();
            if self.config.irreversibility == Irreversibility::Ratchet {
                self.bounds.ratchet(self.comm, &self.state.alpha)?;
            }
        }
        Ok(self.history.clone())
    }

    /// Computes the equilibrium and the diagnostics at load t
    fn step(&mut self, t: f64) -> Result<LoadStepRecord, SimError> {
        log::info!("solving for t = {:.4}", t);
        self.state.t = t;

        // equilibrium
        let am_iterations = match self.config.equilibrium {
            Equilibrium::Homogeneous => {
                self.homogeneous.write_state(self.comm, &mut self.state, &self.bounds)?;
                0
            }
            Equilibrium::Alternate => {
                let mut uu = self.state.u.values().clone();
                self.model.prescribed.apply(&mut uu, t);
                self.state.u.write_and_sync(self.comm, uu.as_data())?;
                self.minimizer.solve(&mut self.state, &self.bounds)?.len()
            }
        };
        self.bounds.check(self.comm, &self.state.alpha)?;

        // stability
        let stable = self.stability.solve(&self.state, &self.bounds)?;
        let elastic = self.stability.is_elastic();
        let inertia = self.stability.inertia();
        let eigenvalues = self.stability.eigen_data().eigenvalues.clone();
        let cone_stable = self.cone.solve(&self.state, &self.bounds)?;
        let cone = self.cone.cone_data().clone();
        if stable != cone_stable {
            log::info!("t = {:.4}: bifurcation verdict = {}, cone verdict = {}", t, stable, cone_stable);
        }

        // energies and reaction
        let u = self.state.u.as_slice();
        let alpha = self.state.alpha.as_slice();
        let elastic_energy = self.model.elastic_energy(u, alpha);
        let fracture_energy = self.model.fracture_energy(alpha);
        let reaction_force = self.model.reaction_force(&self.state);

        Ok(LoadStepRecord {
            load: t,
            elastic_energy,
            fracture_energy,
            total_energy: elastic_energy + fracture_energy,
            reaction_force,
            stable,
            cone_stable,
            elastic,
            inertia,
            eigenvalues,
            cone,
            am_iterations,
            alpha_t: alpha.to_vec(),
            u_t: u.to_vec(),
        })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::LoadStepDriver;
    use crate::base::{Config, Equilibrium, SerialComm, SimError};
    use crate::fem::FileIo;
    use russell_lab::array_approx_eq;

    #[test]
    fn new_captures_errors() {
        let comm = SerialComm;
        let mut config = Config::new();
        config.set_n_spring(0);
        assert_eq!(
            LoadStepDriver::new(&config, &comm, FileIo::new()).err(),
            Some("cannot allocate driver because config.validate() failed")
        );
    }

    #[test]
    fn run_captures_non_increasing_loads() {
        let comm = SerialComm;
        let config = Config::new();
        let mut driver = LoadStepDriver::new(&config, &comm, FileIo::new()).unwrap();
        for loads in [&[0.0, 0.5, 0.5][..], &[1.0, 0.5][..]] {
            assert_eq!(
                driver.run(loads).err().and_then(|e| e.message()),
                Some("loads must be strictly increasing")
            );
        }
        assert!(driver.history().is_empty());
    }

    #[test]
    fn run_continues_with_larger_loads_only() -> Result<(), SimError> {
        let comm = SerialComm;
        let config = Config::new();
        let mut driver = LoadStepDriver::new(&config, &comm, FileIo::new())?;
        driver.run(&[0.25, 0.5])?;
        array_approx_eq(driver.state.u.as_slice(), &[0.0, 0.25, 0.5], 1e-12);
        for loads in [&[0.5][..], &[0.3, 0.8][..]] {
            assert_eq!(
                driver.run(loads).err().and_then(|e| e.message()),
                Some("loads must be strictly increasing")
            );
        }
        let history = driver.run(&[0.75])?;
        assert_eq!(history.loads(), &[0.25, 0.5, 0.75]);
        Ok(())
    }

    #[test]
    fn run_works_homogeneous() -> Result<(), SimError> {
        let comm = SerialComm;
        let mut config = Config::new();
        config.set_equilibrium(Equilibrium::Homogeneous);
        let mut driver = LoadStepDriver::new(&config, &comm, FileIo::new())?;
        let history = driver.run(&[0.5, 2.0])?;
        assert_eq!(history.len(), 2);
        let r = &history.records()[1];
        assert_eq!(r.am_iterations, 0);
        assert_eq!(r.u_t, &[0.0, 1.0, 2.0]);
        assert!(!r.stable);
        assert!(!r.elastic);
        Ok(())
    }
}
