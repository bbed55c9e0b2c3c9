use serde::{Deserialize, Serialize};

/// Holds the material and geometry parameters of the chain of damageable springs
///
/// The chain has unit length and `n_spring` springs with equal length `h = 1/n_spring`.
/// The stiffness modulation follows the AT-k law:
///
/// ```text
///           1 - α
/// a(α) = ——————————————— + k_res
///        (k - 1) α + 1
/// ```
///
/// and the dissipation is `w1 α` plus the (optional) gradient term `w1 ℓ² |∇α|²`.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct ParamChain {
    /// Elastic modulus μ of an undamaged spring
    pub mu: f64,

    /// Specific fracture energy w1
    pub w1: f64,

    /// Softening parameter k of the AT-k law (k > 1)
    pub k: f64,

    /// Residual stiffness added to a(α)
    pub k_res: f64,

    /// Internal length ℓ of the gradient term (zero for a purely discrete chain)
    pub ell: f64,

    /// Number of springs N
    pub n_spring: usize,
}

/// Holds the options of a Newton-type (sub)solver
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct ParamNewton {
    /// Maximum number of iterations
    pub max_it: usize,

    /// Absolute tolerance for the norm of the (projected) residual
    pub atol: f64,

    /// Relative tolerance for the norm of the (projected) residual
    pub rtol: f64,

    /// Relative tolerance for the norm of the step
    pub stol: f64,
}

/// Holds the options of the stability (bifurcation and cone) solvers
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct ParamStability {
    /// Tolerance on |∂E/∂α| to consider a damage DOF as critical (inactive set)
    pub inactive_set_gatol: f64,

    /// Eigenvalues with |λ| ≤ eig_zero_tol are counted as zero
    pub eig_zero_tol: f64,

    /// Maximum number of iterations of the cone solver
    pub cone_max_it: usize,

    /// Absolute tolerance on the change of the cone eigenvector
    pub cone_atol: f64,
}

/// Holds the options of the loading program
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct ParamLoading {
    /// Minimum (first) load
    pub min: f64,

    /// Maximum (last) load
    pub max: f64,

    /// Number of load steps
    pub steps: usize,
}

impl ParamChain {
    /// Returns the parameters of the reference chain (μ = 1, w1 = 2, k = 4)
    pub fn sample(n_spring: usize) -> Self {
        ParamChain {
            mu: 1.0,
            w1: 2.0,
            k: 4.0,
            k_res: 0.0,
            ell: 0.0,
            n_spring,
        }
    }

    /// Returns the length of one spring
    pub fn h(&self) -> f64 {
        1.0 / (self.n_spring as f64)
    }

    /// Returns the stiffness modulation a(α)
    pub fn stiffness(&self, alpha: f64) -> f64 {
        (1.0 - alpha) / ((self.k - 1.0) * alpha + 1.0) + self.k_res
    }

    /// Returns the first derivative a'(α)
    pub fn d_stiffness(&self, alpha: f64) -> f64 {
        let c = (self.k - 1.0) * alpha + 1.0;
        -self.k / (c * c)
    }

    /// Returns the second derivative a''(α)
    pub fn dd_stiffness(&self, alpha: f64) -> f64 {
        let c = (self.k - 1.0) * alpha + 1.0;
        2.0 * self.k * (self.k - 1.0) / (c * c * c)
    }

    /// Returns the critical load at which the homogeneous chain starts damaging
    pub fn critical_load(&self) -> f64 {
        f64::sqrt(8.0 * self.w1 / (self.mu * self.k) / 4.0)
    }
}

impl ParamNewton {
    /// Returns the default options for the elasticity subproblem
    pub fn elasticity() -> Self {
        ParamNewton {
            max_it: 50,
            atol: 1e-10,
            rtol: 1e-10,
            stol: 1e-12,
        }
    }

    /// Returns the default options for the damage subproblem
    pub fn damage() -> Self {
        ParamNewton {
            max_it: 100,
            atol: 1e-10,
            rtol: 1e-10,
            stol: 1e-12,
        }
    }
}

impl ParamStability {
    /// Returns the default options
    pub fn new() -> Self {
        ParamStability {
            inactive_set_gatol: 1e-6,
            eig_zero_tol: 1e-10,
            cone_max_it: 400,
            cone_atol: 1e-10,
        }
    }
}

impl ParamLoading {
    /// Returns the sequence of loads (evenly spaced, including min and max)
    pub fn loads(&self) -> Vec<f64> {
        match self.steps {
            0 => Vec::new(),
            1 => vec![self.min],
            n => {
                let step = (self.max - self.min) / ((n - 1) as f64);
                (0..n).map(|i| self.min + (i as f64) * step).collect()
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
