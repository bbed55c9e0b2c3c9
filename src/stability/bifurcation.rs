use super::{EigenData, Inertia, RestrictedHessian, StabilityOracle};
use crate::base::{Communicator, ParamChain, ParamStability};
use crate::fem::{Bounds, ChainModel, ChainState};
use crate::StrError;
use russell_lab::{mat_eigen_sym_jacobi, Matrix, Vector};

/// Checks the (unconstrained) second order stability of the state
///
/// The state is stable (no bifurcation) if the smallest eigenvalue of the restricted Hessian
/// is positive. An empty restricted system is stable.
pub struct BifurcationSolver<'a> {
    model: ChainModel<'a>,
    param: ParamStability,
    elastic: bool,
    inertia: Inertia,
    data: EigenData,
}

impl<'a> BifurcationSolver<'a> {
    /// Allocates a new instance
    pub fn new(chain: &'a ParamChain, param: ParamStability, comm: &'a dyn Communicator) -> Self {
        BifurcationSolver {
            model: ChainModel::new(chain, comm),
            param,
            elastic: true,
            inertia: Inertia::default(),
            data: EigenData::default(),
        }
    }

    /// Performs the eigen-analysis of a restricted Hessian
    pub fn solve_restricted(&mut self, hh: &RestrictedHessian) -> Result<bool, StrError> {
        let n = hh.dim();
        self.elastic = hh.n_damage() == 0;
        self.inertia = Inertia::default();
        self.data = EigenData {
            n_inactive: hh.n_damage(),
            ..EigenData::default()
        };
        if n == 0 {
            return Ok(true);
        }

        // eigenvalues and eigenvectors
        let mut a = hh.matrix.clone();
        let mut l = Vector::new(n);
        let mut v = Matrix::new(n, n);
        mat_eigen_sym_jacobi(&mut l, &mut v, &mut a)?;
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&i, &j| l[i].total_cmp(&l[j]));
        self.data.eigenvalues = order.iter().map(|&i| l[i]).collect();
        let imin = order[0];
        self.data.eigenvector = (0..n).map(|r| v.get(r, imin)).collect();

        // inertia
        let tol = self.param.eig_zero_tol;
        for lambda in &self.data.eigenvalues {
            if *lambda < -tol {
                self.inertia.negative += 1;
            } else if *lambda > tol {
                self.inertia.positive += 1;
            } else {
                self.inertia.zero += 1;
            }
        }
        Ok(self.data.eigenvalues[0] > tol)
    }
}

impl<'a> StabilityOracle for BifurcationSolver<'a> {
    fn solve(&mut self, state: &ChainState, bounds: &Bounds) -> Result<bool, StrError> {
        let hh = RestrictedHessian::assemble(&self.model, state, bounds, self.param.inactive_set_gatol);
        self.solve_restricted(&hh)
    }

    fn is_elastic(&self) -> bool {
        self.elastic
    }

    fn inertia(&self) -> Inertia {
        self.inertia
    }

    fn eigen_data(&self) -> &EigenData {
        &self.data
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::BifurcationSolver;
    use crate::base::{ParamChain, ParamStability, SerialComm};
    use crate::fem::{Bounds, ChainState};
    use crate::stability::{Inertia, RestrictedHessian, StabilityOracle};
    use crate::StrError;
    use russell_lab::{approx_eq, array_approx_eq, Matrix};

    #[test]
    fn solve_restricted_works() -> Result<(), StrError> {
        let comm = SerialComm;
        let param = ParamChain::sample(2);
        let mut solver = BifurcationSolver::new(&param, ParamStability::new(), &comm);
        let hh = RestrictedHessian::from_matrix(Matrix::from(&[[1.0, 2.0], [2.0, 1.0]]), vec![true, true])?;
        assert!(!solver.solve_restricted(&hh)?);
        assert!(!solver.is_elastic());
        array_approx_eq(&solver.eigen_data().eigenvalues, &[-1.0, 3.0], 1e-14);
        let v = &solver.eigen_data().eigenvector;
        approx_eq(f64::abs(v[0]), f64::sqrt(0.5), 1e-14);
        approx_eq(v[0] + v[1], 0.0, 1e-14);
        assert_eq!(
            solver.inertia(),
            Inertia {
                negative: 1,
                zero: 0,
                positive: 1
            }
        );
        Ok(())
    }

    #[test]
    fn empty_system_is_stable() -> Result<(), StrError> {
        let comm = SerialComm;
        let param = ParamChain::sample(1);
        let bounds = Bounds::new(&param);
        let state = ChainState::new(&param);
        let mut solver = BifurcationSolver::new(&param, ParamStability::new(), &comm);
        assert!(solver.solve(&state, &bounds)?);
        assert!(solver.is_elastic());
        assert_eq!(solver.inertia(), Inertia::default());
        assert_eq!(solver.eigen_data().eigenvalues.len(), 0);
        Ok(())
    }

    #[test]
    fn solve_works_homogeneous_chain() -> Result<(), StrError> {
        let comm = SerialComm;
        let param = ParamChain::sample(2);
        let bounds = Bounds::new(&param);
        let mut state = ChainState::new(&param);
        let mut solver = BifurcationSolver::new(&param, ParamStability::new(), &comm);

        // elastic
        state.t = 0.5;
        state.u.write_and_sync(&comm, &[0.0, 0.25, 0.5])?;
        assert!(solver.solve(&state, &bounds)?);
        assert!(solver.is_elastic());
        assert_eq!(solver.inertia().positive, 1);

        // damaging
        state.t = 2.0;
        state.u.write_and_sync(&comm, &[0.0, 1.0, 2.0])?;
        state.alpha.write_and_sync(&comm, &[1.0 / 3.0, 1.0 / 3.0])?;
        assert!(!solver.solve(&state, &bounds)?);
        assert!(!solver.is_elastic());
        assert_eq!(
            solver.inertia(),
            Inertia {
                negative: 1,
                zero: 0,
                positive: 2
            }
        );
        assert_eq!(solver.eigen_data().n_inactive, 2);
        Ok(())
    }
}
