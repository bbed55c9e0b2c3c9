use crate::fem::{Bounds, ChainModel, ChainState};
use crate::StrError;
use russell_lab::{mat_norm, mat_vec_mul, vec_inner, Matrix, Norm, Vector};

/// Holds the second variation of the energy restricted to the admissible perturbations
///
/// The free DOFs are the interior displacement nodes and the damage cells in the inactive
/// (critical) set `{i : αᵢ < ubᵢ and |∂E/∂αᵢ| ≤ gatol}`:
///
/// ```text
///     ┌             ┐
///     │ Kᵤᵤ    Kᵤₐ  │   u: nodes 1..N-1
/// H = │             │
///     │ Kₐᵤ    Kₐₐ  │   α: inactive cells
///     └             ┘
/// ```
pub struct RestrictedHessian {
    /// The restricted matrix (dim × dim)
    pub matrix: Matrix,

    /// Indicates which restricted DOFs are damage DOFs (constrained to non-negative perturbations in the cone)
    pub is_damage: Vec<bool>,
}

impl RestrictedHessian {
    /// Allocates a new instance from a given symmetric matrix
    pub fn from_matrix(matrix: Matrix, is_damage: Vec<bool>) -> Result<Self, StrError> {
        let (m, n) = matrix.dims();
        if m != n {
            return Err("the restricted Hessian must be square");
        }
        if is_damage.len() != n {
            return Err("the number of damage flags must equal the dimension of the restricted Hessian");
        }
        Ok(RestrictedHessian { matrix, is_damage })
    }

    /// Assembles the restricted second variation at the given state
    pub fn assemble(model: &ChainModel, state: &ChainState, bounds: &Bounds, gatol: f64) -> Self {
        let n = model.n_spring();
        let u = state.u.as_slice();
        let alpha = state.alpha.as_slice();
        let ub = bounds.ub.as_slice();

        // inactive set
        let mut gg = Vector::new(n);
        model.residual_alpha(&mut gg, u, alpha);
        let inactive: Vec<usize> = (0..n).filter(|&i| alpha[i] < ub[i] && f64::abs(gg[i]) <= gatol).collect();

        // blocks
        let mut kuu = Matrix::new(n + 1, n + 1);
        let mut kua = Matrix::new(n + 1, n);
        let mut kaa = Matrix::new(n, n);
        model.jacobian_uu(&mut kuu, alpha);
        model.jacobian_ua(&mut kua, u, alpha);
        model.jacobian_aa(&mut kaa, u, alpha);

        // restricted numbering
        let free_u: Vec<usize> = (1..n).filter(|i| !model.prescribed.flags[*i]).collect();
        let nu = free_u.len();
        let dim = nu + inactive.len();
        let mut matrix = Matrix::new(dim, dim);
        for (a, &i) in free_u.iter().enumerate() {
            for (b, &j) in free_u.iter().enumerate() {
                matrix.set(a, b, kuu.get(i, j));
            }
            for (b, &j) in inactive.iter().enumerate() {
                matrix.set(a, nu + b, kua.get(i, j));
                matrix.set(nu + b, a, kua.get(i, j));
            }
        }
        for (a, &i) in inactive.iter().enumerate() {
            for (b, &j) in inactive.iter().enumerate() {
                matrix.set(nu + a, nu + b, kaa.get(i, j));
            }
        }
        let is_damage = (0..dim).map(|a| a >= nu).collect();
        RestrictedHessian { matrix, is_damage }
    }

    /// Returns the dimension of the restricted system
    pub fn dim(&self) -> usize {
        self.is_damage.len()
    }

    /// Returns the number of damage DOFs
    pub fn n_damage(&self) -> usize {
        self.is_damage.iter().filter(|d| **d).count()
    }

    /// Computes y = H x
    pub fn mul(&self, y: &mut Vector, x: &Vector) -> Result<(), StrError> {
        mat_vec_mul(y, 1.0, &self.matrix, x)
    }

    /// Returns the Rayleigh quotient xᵀ H x / xᵀ x
    pub fn rayleigh(&self, x: &Vector) -> Result<f64, StrError> {
        let mut hx = Vector::new(self.dim());
        self.mul(&mut hx, x)?;
        Ok(vec_inner(x, &hx) / vec_inner(x, x))
    }

    /// Returns the Gershgorin bound of the spectral radius (largest absolute row sum)
    pub fn gershgorin(&self) -> f64 {
        mat_norm(&self.matrix, Norm::Inf)
    }

    /// Projects a vector onto the cone of admissible perturbations (non-negative damage components)
    pub fn project_on_cone(&self, x: &mut Vector) {
        for (v, damage) in x.as_mut_data().iter_mut().zip(&self.is_damage) {
            if *damage && *v < 0.0 {
                *v = 0.0;
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
