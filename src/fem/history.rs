use crate::stability::{ConeData, Inertia};
use crate::StrError;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Holds the results of one load step
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct LoadStepRecord {
    /// Imposed end displacement
    pub load: f64,

    pub elastic_energy: f64,
    pub fracture_energy: f64,
    pub total_energy: f64,

    /// Reaction force F
    #[serde(rename = "F")]
    pub reaction_force: f64,

    /// Verdict of the bifurcation analysis (true means no bifurcation)
    #[serde(rename = "non-bifurcation")]
    pub stable: bool,

    /// Verdict of the cone analysis
    #[serde(rename = "cone-stable")]
    pub cone_stable: bool,

    /// The inactive damage set is empty
    pub elastic: bool,

    pub inertia: Inertia,

    /// Eigenvalues of the restricted Hessian (ascending)
    #[serde(rename = "eigs")]
    pub eigenvalues: Vec<f64>,

    #[serde(rename = "cone_data")]
    pub cone: ConeData,

    /// Number of alternate minimization iterations (zero for the closed-form state)
    pub am_iterations: usize,

    /// Damage snapshot
    pub alpha_t: Vec<f64>,

    /// Displacement snapshot
    pub u_t: Vec<f64>,
}

/// Holds the ordered records of all completed load steps
///
/// Records can only be appended.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct HistoryLog {
    records: Vec<LoadStepRecord>,
}

impl HistoryLog {
    /// Allocates an empty history
    pub fn new() -> Self {
        HistoryLog { records: Vec::new() }
    }

    /// Appends a record at the end
    pub fn push(&mut self, record: LoadStepRecord) {
        self.records.push(record);
    }

    /// Returns the number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no step has been completed
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns all records
    pub fn records(&self) -> &[LoadStepRecord] {
        &self.records
    }

    /// Returns the last record
    pub fn last(&self) -> Option<&LoadStepRecord> {
        self.records.last()
    }

    /// Returns the loads of all records
    pub fn loads(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.load).collect()
    }

    /// Reads a JSON file containing the history
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn read_json<P>(full_path: &P) -> Result<Self, StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        let file = File::open(path).map_err(|_| "cannot open file")?;
        let buffered = BufReader::new(file);
        let history = serde_json::from_reader(buffered).map_err(|_| "cannot parse JSON file")?;
        Ok(history)
    }

    /// Prints a table with the main results
    pub fn print_table(&self) {
        println!("{}", "─".repeat(96));
        println!(
            "{:>4} {:>10} {:>12} {:>12} {:>12} {:>12} {:>6} {:>6} {:>9}",
            "step", "t", "E_el", "E_fr", "E", "F", "stable", "cone", "inertia"
        );
        println!("{}", "─".repeat(96));
        for (i, r) in self.records.iter().enumerate() {
            println!(
                "{:>4} {:>10.5} {:>12.5e} {:>12.5e} {:>12.5e} {:>12.5e} {:>6} {:>6} {:>3},{},{}",
                i,
                r.load,
                r.elastic_energy,
                r.fracture_energy,
                r.total_energy,
                r.reaction_force,
                r.stable,
                r.cone_stable,
                r.inertia.negative,
                r.inertia.zero,
                r.inertia.positive
            );
        }
        println!("{}", "─".repeat(96));
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
