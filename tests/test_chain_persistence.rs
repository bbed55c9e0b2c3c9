use dmsim::fem::AmStatus;
use dmsim::prelude::*;
use dmsim::StrError;
use russell_lab::array_approx_eq;
use std::fs;

// Persistence of the load-step history
//
// TEST GOAL
//
// This test verifies that (1) the history file is overwritten after every step and keeps the
// completed steps when the alternate minimization fails; and (2) a run with a prefix of the
// loads reproduces the first entries of the full run identically on disk
//
// CONFIGURATION AND PARAMETERS
//
// μ = 1, w1 = 2, k = 4, N = 2 ⇒ t_c = 1
// criterion = alpha_H1 with max_it = 1: the elastic steps converge at the first iteration
// and the first damaging step cannot converge

#[test]
fn test_chain_partial_history_on_failure() -> Result<(), StrError> {
    let comm = SerialComm;
    let mut config = Config::new();
    config.set_max_it(1).set_criterion(Criterion::AlphaH1);
    let file_io = FileIo::new_enabled(&config, &comm, "test_partial_history", Some(DEFAULT_TEST_DIR))?;
    let path = file_io.path_history();
    let mut driver = LoadStepDriver::new(&config, &comm, file_io)?;

    match driver.run(&[0.5, 0.8, 2.0]) {
        Err(SimError::NonConvergence {
            iterations,
            error_alpha_h1,
            metric,
            records,
        }) => {
            assert_eq!(iterations, 1);
            assert_eq!(records.len(), 1);
            assert!(error_alpha_h1 > 0.1);
            assert_eq!(metric, error_alpha_h1);
        }
        _ => panic!("NonConvergence expected"),
    }

    // the in-memory and persisted histories hold the completed steps only
    assert_eq!(driver.history().loads(), &[0.5, 0.8]);
    let history = HistoryLog::read_json(&path)?;
    assert_eq!(history.loads(), &[0.5, 0.8]);
    for (a, b) in history.records().iter().zip(driver.history().records()) {
        array_approx_eq(&a.u_t, &b.u_t, 1e-15);
        assert_eq!(a.am_iterations, b.am_iterations);
    }
    let fields = FileIo::read_fields(&driver.file_io().path_fields())?;
    assert_eq!(fields.times, &[0.5, 0.8]);
    Ok(())
}

#[test]
fn test_chain_cap_with_oscillating_damage() {
    // a damage solver that keeps flipping the field never satisfies the criterion
    struct Flip(usize);
    impl dmsim::fem::SubproblemSolver for Flip {
        fn solve(
            &mut self,
            state: &mut ChainState,
            _: &Bounds,
        ) -> Result<(usize, dmsim::base::SolverReason), StrError> {
            self.0 += 1;
            let value = if self.0 % 2 == 1 { 0.25 } else { 0.0 };
            state.alpha.write_and_sync(&SerialComm, &[value, value, value])?;
            Ok((1, dmsim::base::SolverReason::ConvergedFnormAbs))
        }
    }
    let comm = SerialComm;
    let mut config = Config::new();
    config.set_n_spring(3).set_max_it(7);
    let elastic = dmsim::fem::ElasticSolver::new(&config.model, config.elasticity, &comm);
    let mut am = AlternateMinimization::with_solvers(&config, &comm, Box::new(elastic), Box::new(Flip(0)));
    let bounds = Bounds::new(&config.model);
    let mut state = ChainState::new(&config.model);
    state.t = 0.5;
    match am.solve(&mut state, &bounds) {
        Err(SimError::NonConvergence { iterations, records, .. }) => {
            assert_eq!(iterations, 7);
            assert_eq!(records.len(), 7);
            let indices: Vec<_> = records.iter().map(|r| r.iteration).collect();
            assert_eq!(indices, &[0, 1, 2, 3, 4, 5, 6]);
        }
        _ => panic!("NonConvergence expected"),
    }
    assert_eq!(am.status(), AmStatus::Exhausted);
}

#[test]
fn test_chain_history_prefix() -> Result<(), StrError> {
    let comm = SerialComm;
    let mut config = Config::new();
    config.set_n_spring(3).set_loading(0.0, 2.0, 5);
    let loads = config.loading.loads();

    let run = |stem: &str, loads: &[f64]| -> Result<String, StrError> {
        let file_io = FileIo::new_enabled(&config, &comm, stem, Some(DEFAULT_TEST_DIR))?;
        let path = file_io.path_history();
        let mut driver = LoadStepDriver::new(&config, &comm, file_io)?;
        driver.run(loads).map_err(|_| "run failed")?;
        Ok(path)
    };
    let path_full = run("test_history_full", &loads)?;
    let path_prefix = run("test_history_prefix", &loads[..3])?;

    let full = HistoryLog::read_json(&path_full)?;
    let prefix = HistoryLog::read_json(&path_prefix)?;
    assert_eq!(full.len(), 5);
    assert_eq!(prefix.len(), 3);
    for (a, b) in prefix.records().iter().zip(full.records()) {
        let json_a = serde_json::to_string(a).map_err(|_| "cannot serialize")?;
        let json_b = serde_json::to_string(b).map_err(|_| "cannot serialize")?;
        assert_eq!(json_a, json_b);
    }

    // the signature identifies the configuration
    let sig = fs::read_to_string(path_full.replace("time_data.json", "signature.txt")).map_err(|_| "cannot read")?;
    assert_eq!(sig, config.signature()?);
    Ok(())
}
