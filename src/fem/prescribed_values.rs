use russell_lab::Vector;

/// Assists in calculating a prescribed displacement
#[derive(Clone, Copy, Debug)]
pub struct PrescribedValue {
    /// Node (equation) corresponding to the prescribed value
    pub eq: usize,

    /// Function of the load t giving the prescribed displacement
    pub f: fn(f64) -> f64,
}

/// Holds a collection of prescribed displacements
pub struct PrescribedValues {
    /// All values
    pub all: Vec<PrescribedValue>,

    /// An array indicating which equations are prescribed
    ///
    /// The length of `flags` is equal to the number of nodes.
    pub flags: Vec<bool>,
}

impl PrescribedValues {
    /// Allocates the boundary conditions of the chain: u(0) = 0 and u(L) = t
    pub fn chain(n_spring: usize) -> Self {
        PrescribedValues {
            all: vec![
                PrescribedValue { eq: 0, f: |_| 0.0 },
                PrescribedValue { eq: n_spring, f: |t| t },
            ],
            flags: (0..(n_spring + 1)).map(|i| i == 0 || i == n_spring).collect(),
        }
    }

    /// Sets all prescribed values in the solution vector
    pub fn apply(&self, uu: &mut Vector, t: f64) {
        self.all.iter().for_each(|p| uu[p.eq] = (p.f)(t));
    }

    /// Replaces the prescribed rows of a residual vector by (prescribed value - current value)
    pub fn set_bc(&self, rr: &mut Vector, uu: &Vector, t: f64) {
        self.all.iter().for_each(|p| rr[p.eq] = (p.f)(t) - uu[p.eq]);
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
