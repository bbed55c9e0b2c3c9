use crate::base::Communicator;
use crate::StrError;
use russell_lab::Vector;
use serde::{Deserialize, Serialize};

/// Holds a distributed field (displacement, damage, or damage bound)
///
/// The values can only be modified through [Field::write_and_sync] or [Field::update_and_sync];
/// both perform the ghost synchronization right after writing, so a field that can be read is
/// always consistent across workers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Field {
    /// Values at the degrees of freedom
    values: Vector,
}

impl Field {
    /// Allocates a new field filled with a constant value
    pub fn new(dim: usize, value: f64) -> Self {
        Field {
            values: Vector::filled(dim, value),
        }
    }

    /// Returns the number of degrees of freedom
    pub fn dim(&self) -> usize {
        self.values.dim()
    }

    /// Returns the (synchronized) values
    pub fn values(&self) -> &Vector {
        &self.values
    }

    /// Returns the (synchronized) values as a slice
    pub fn as_slice(&self) -> &[f64] {
        self.values.as_data()
    }

    /// Overwrites all values and synchronizes the ghosts
    pub fn write_and_sync(&mut self, comm: &dyn Communicator, values: &[f64]) -> Result<(), StrError> {
        if values.len() != self.values.dim() {
            return Err("cannot write field because the number of values is incorrect");
        }
        for (dest, src) in self.values.as_mut_data().iter_mut().zip(values) {
            *dest = *src;
        }
        self.sync(comm);
        Ok(())
    }

    /// Modifies the values with a function of (index, current value) and synchronizes the ghosts
    pub fn update_and_sync<F>(&mut self, comm: &dyn Communicator, mut f: F)
    where
        F: FnMut(usize, f64) -> f64,
    {
        for (i, v) in self.values.as_mut_data().iter_mut().enumerate() {
            *v = f(i, *v);
        }
        self.sync(comm);
    }

    /// Performs the ghost synchronization
    fn sync(&mut self, comm: &dyn Communicator) {
        comm.ghost_update(self.values.as_mut_data());
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
