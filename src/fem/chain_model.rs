use super::{ChainState, PrescribedValues};
use crate::base::{Communicator, ParamChain};
use russell_lab::{Matrix, Vector};

/// Implements the energy of the chain of damageable springs and its derivatives
///
/// ```text
/// E(u, α) = Σᵢ h μ/2 a(αᵢ) eᵢ² + Σᵢ h w1 αᵢ + Σⱼ h w1 ℓ² ((αⱼ₊₁ - αⱼ)/h)²
///           \________________/   \___________________________________/
///              elastic energy              fracture energy
///
/// eᵢ = (uᵢ₊₁ - uᵢ)/h  (strain of spring i)
/// σᵢ = μ a(αᵢ) eᵢ     (stress of spring i)
/// ```
///
/// All sums are global reductions through the communicator.
pub struct ChainModel<'a> {
    /// Material and geometry parameters
    pub param: &'a ParamChain,

    /// Communicator for global reductions
    pub comm: &'a dyn Communicator,

    /// Displacement boundary conditions
    pub prescribed: PrescribedValues,

    /// Length of each spring
    pub h: f64,
}

impl<'a> ChainModel<'a> {
    /// Allocates a new instance
    pub fn new(param: &'a ParamChain, comm: &'a dyn Communicator) -> Self {
        ChainModel {
            param,
            comm,
            prescribed: PrescribedValues::chain(param.n_spring),
            h: param.h(),
        }
    }

    /// Returns the number of springs
    pub fn n_spring(&self) -> usize {
        self.param.n_spring
    }

    /// Returns the strain of spring i
    #[inline]
    pub fn strain(&self, u: &[f64], i: usize) -> f64 {
        (u[i + 1] - u[i]) / self.h
    }

    /// Returns the stresses of all springs
    pub fn stress(&self, u: &[f64], alpha: &[f64]) -> Vec<f64> {
        (0..self.n_spring())
            .map(|i| self.param.mu * self.param.stiffness(alpha[i]) * self.strain(u, i))
            .collect()
    }

    /// Returns the reaction force (integral of the stress along the chain)
    pub fn reaction_force(&self, state: &ChainState) -> f64 {
        let sigma = self.stress(state.u.as_slice(), state.alpha.as_slice());
        let local: f64 = sigma.iter().map(|s| self.h * s).sum();
        self.comm.all_reduce_sum(local)
    }

    /// Returns the elastic energy
    pub fn elastic_energy(&self, u: &[f64], alpha: &[f64]) -> f64 {
        let p = self.param;
        let local: f64 = (0..self.n_spring())
            .map(|i| {
                let e = self.strain(u, i);
                self.h * 0.5 * p.mu * p.stiffness(alpha[i]) * e * e
            })
            .sum();
        self.comm.all_reduce_sum(local)
    }

    /// Returns the fracture (dissipated) energy
    pub fn fracture_energy(&self, alpha: &[f64]) -> f64 {
        let p = self.param;
        let mut local: f64 = alpha.iter().map(|a| self.h * p.w1 * a).sum();
        if p.ell > 0.0 {
            for j in 0..(self.n_spring() - 1) {
                let grad = (alpha[j + 1] - alpha[j]) / self.h;
                local += self.h * p.w1 * p.ell * p.ell * grad * grad;
            }
        }
        self.comm.all_reduce_sum(local)
    }

    /// Returns the total energy
    pub fn total_energy(&self, u: &[f64], alpha: &[f64]) -> f64 {
        self.elastic_energy(u, alpha) + self.fracture_energy(alpha)
    }

    /// Calculates the first variation with respect to the displacement ∂E/∂u
    pub fn residual_u(&self, rr: &mut Vector, u: &[f64], alpha: &[f64]) {
        rr.fill(0.0);
        for (i, s) in self.stress(u, alpha).iter().enumerate() {
            rr[i] -= s;
            rr[i + 1] += s;
        }
    }

    /// Returns the residual of the displacement equilibrium with the Dirichlet rows replaced by the boundary mismatch
    pub fn residual_u_with_bc(&self, state: &ChainState) -> Vector {
        let mut rr = Vector::new(state.u.dim());
        self.residual_u(&mut rr, state.u.as_slice(), state.alpha.as_slice());
        self.prescribed.set_bc(&mut rr, state.u.values(), state.t);
        rr
    }

    /// Calculates the first variation with respect to the damage ∂E/∂α
    pub fn residual_alpha(&self, rr: &mut Vector, u: &[f64], alpha: &[f64]) {
        let p = self.param;
        for i in 0..self.n_spring() {
            let e = self.strain(u, i);
            rr[i] = self.h * (0.5 * p.mu * p.d_stiffness(alpha[i]) * e * e + p.w1);
        }
        if p.ell > 0.0 {
            let c = 2.0 * p.w1 * p.ell * p.ell / self.h;
            for j in 0..(self.n_spring() - 1) {
                let d = alpha[j + 1] - alpha[j];
                rr[j] -= c * d;
                rr[j + 1] += c * d;
            }
        }
    }

    /// Calculates the second variation with respect to the displacement ∂²E/∂u²
    pub fn jacobian_uu(&self, kk: &mut Matrix, alpha: &[f64]) {
        kk.fill(0.0);
        for i in 0..self.n_spring() {
            let kappa = self.param.mu * self.param.stiffness(alpha[i]) / self.h;
            kk.set(i, i, kk.get(i, i) + kappa);
            kk.set(i + 1, i + 1, kk.get(i + 1, i + 1) + kappa);
            kk.set(i, i + 1, kk.get(i, i + 1) - kappa);
            kk.set(i + 1, i, kk.get(i + 1, i) - kappa);
        }
    }

    /// Calculates the mixed second variation ∂²E/∂u∂α (n_node × n_spring)
    pub fn jacobian_ua(&self, kk: &mut Matrix, u: &[f64], alpha: &[f64]) {
        kk.fill(0.0);
        for i in 0..self.n_spring() {
            let c = self.param.mu * self.param.d_stiffness(alpha[i]) * self.strain(u, i);
            kk.set(i, i, -c);
            kk.set(i + 1, i, c);
        }
    }

    /// Calculates the second variation with respect to the damage ∂²E/∂α²
    pub fn jacobian_aa(&self, kk: &mut Matrix, u: &[f64], alpha: &[f64]) {
        let p = self.param;
        kk.fill(0.0);
        for i in 0..self.n_spring() {
            let e = self.strain(u, i);
            kk.set(i, i, self.h * 0.5 * p.mu * p.dd_stiffness(alpha[i]) * e * e);
        }
        if p.ell > 0.0 {
            let c = 2.0 * p.w1 * p.ell * p.ell / self.h;
            for j in 0..(self.n_spring() - 1) {
                kk.set(j, j, kk.get(j, j) + c);
                kk.set(j + 1, j + 1, kk.get(j + 1, j + 1) + c);
                kk.set(j, j + 1, kk.get(j, j + 1) - c);
                kk.set(j + 1, j, kk.get(j + 1, j) - c);
            }
        }
    }

    /// Returns the (L2, H1, L∞) norms of a damage increment
    ///
    /// The damage is constant in each spring; the gradient part of the H1 norm is the
    /// seminorm of the fracture energy (jump between neighbor springs weighted by ℓ²), so
    /// that H1 equals L2 when ℓ = 0.
    pub fn increment_norms(&self, delta: &[f64]) -> (f64, f64, f64) {
        let l2_local: f64 = delta.iter().map(|d| self.h * d * d).sum();
        let ell2 = self.param.ell * self.param.ell;
        let mut grad_local = 0.0;
        for j in 0..(delta.len().saturating_sub(1)) {
            let g = (delta[j + 1] - delta[j]) / self.h;
            grad_local += self.h * ell2 * g * g;
        }
        let max_local = delta.iter().fold(0.0, |acc: f64, d| acc.max(d.abs()));
        let l2_sq = self.comm.all_reduce_sum(l2_local);
        let grad_sq = self.comm.all_reduce_sum(grad_local);
        let max = self.comm.all_reduce_max(max_local);
        (f64::sqrt(l2_sq), f64::sqrt(l2_sq + grad_sq), max)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
