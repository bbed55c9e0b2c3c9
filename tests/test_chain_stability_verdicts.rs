use dmsim::prelude::*;
use dmsim::stability::{ConeData, ConeSolver, EigenData, RestrictedHessian};
use dmsim::StrError;
use russell_lab::*;

// Stability verdicts of the chain
//
// TEST GOAL
//
// This test verifies that the bifurcation and cone verdicts are computed and stored
// independently; in particular, a state may have a negative eigenvalue (bifurcation) and
// still be stable with respect to the irreversible (cone) perturbations
//
// CONFIGURATION AND PARAMETERS
//
// μ = 1, w1 = 2, k = 4, N = 2 ⇒ t_c = 1
// t = 1.5 ⇒ α = 1/6 (homogeneous)
//
// The restricted Hessian has the eigenvalues (-0.7635, 4, 6.986) and the smallest
// Rayleigh quotient on the cone {x : x_α ≥ 0} is (56 - 16√10) / 18

struct FixedOracle {
    data: EigenData,
}

impl StabilityOracle for FixedOracle {
    fn solve(&mut self, _: &ChainState, _: &Bounds) -> Result<bool, StrError> {
        Ok(true)
    }
    fn is_elastic(&self) -> bool {
        false
    }
    fn inertia(&self) -> Inertia {
        Inertia {
            negative: 0,
            zero: 0,
            positive: 3,
        }
    }
    fn eigen_data(&self) -> &EigenData {
        &self.data
    }
}

struct FixedConeOracle {
    data: ConeData,
}

impl ConeStabilityOracle for FixedConeOracle {
    fn solve(&mut self, _: &ChainState, _: &Bounds) -> Result<bool, StrError> {
        Ok(false)
    }
    fn cone_data(&self) -> &ConeData {
        &self.data
    }
}

#[test]
fn test_chain_verdicts_are_independent() -> Result<(), SimError> {
    let comm = SerialComm;
    let mut config = Config::new();
    config.set_equilibrium(Equilibrium::Homogeneous);
    let stability = Box::new(FixedOracle {
        data: EigenData::default(),
    });
    let cone = Box::new(FixedConeOracle {
        data: ConeData {
            lambda: Some(-1.0),
            ..ConeData::default()
        },
    });
    let mut driver = LoadStepDriver::with_oracles(&config, &comm, FileIo::new(), stability, cone)?;
    let history = driver.run(&[0.5, 1.5])?;
    for r in history.records() {
        assert!(r.stable);
        assert!(!r.cone_stable);
        assert!(!r.elastic);
        assert_eq!(r.inertia.positive, 3);
        assert_eq!(r.cone.lambda, Some(-1.0));
    }
    Ok(())
}

#[test]
fn test_chain_bifurcation_without_cone_instability() -> Result<(), SimError> {
    let comm = SerialComm;
    let mut config = Config::new();
    config.set_equilibrium(Equilibrium::Homogeneous);
    let mut driver = LoadStepDriver::new(&config, &comm, FileIo::new())?;
    let history = driver.run(&[1.5])?;
    let r = &history.records()[0];
    array_approx_eq(&r.alpha_t, &[1.0 / 6.0, 1.0 / 6.0], 1e-15);
    assert!(!r.elastic);
    assert!(!r.stable);
    assert!(r.cone_stable);
    assert_eq!(
        r.inertia,
        Inertia {
            negative: 1,
            zero: 0,
            positive: 2
        }
    );
    assert_eq!(r.eigenvalues.len(), 3);
    approx_eq(r.eigenvalues[1], 4.0, 1e-12);
    let lambda = (56.0 - 16.0 * f64::sqrt(10.0)) / 18.0;
    approx_eq(r.cone.lambda.unwrap_or(f64::NAN), lambda, 1e-8);

    // the cone eigenvector is admissible (non-negative damage components)
    assert_eq!(r.cone.eigenvector.len(), 3);
    assert!(r.cone.eigenvector[1] >= 0.0 && r.cone.eigenvector[2] >= 0.0);
    Ok(())
}

#[test]
fn test_chain_cone_on_given_matrix() -> Result<(), StrError> {
    let comm = SerialComm;
    let param = ParamChain::sample(2);
    let mut solver = ConeSolver::new(&param, ParamStability::new(), &comm);

    // indefinite matrix whose negative direction (1, -1) leaves the cone
    let hh = RestrictedHessian::from_matrix(Matrix::from(&[[1.0, 2.0], [2.0, 1.0]]), vec![true, true])?;
    assert!(solver.solve_restricted(&hh)?);
    approx_eq(solver.cone_data().lambda.unwrap_or(f64::NAN), 1.0, 1e-10);

    // a matrix whose negative direction lies in the cone
    let hh = RestrictedHessian::from_matrix(Matrix::from(&[[1.0, -2.0], [-2.0, 1.0]]), vec![true, true])?;
    assert!(!solver.solve_restricted(&hh)?);
    approx_eq(solver.cone_data().lambda.unwrap_or(f64::NAN), -1.0, 1e-10);
    Ok(())
}
