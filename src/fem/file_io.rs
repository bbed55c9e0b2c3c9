use super::{ChainState, HistoryLog};
use crate::base::{Communicator, Config, DEFAULT_OUT_DIR};
use crate::StrError;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::Path;

/// Holds the time-stamped snapshots of the displacement and damage fields
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct FieldSeries {
    /// Loads corresponding to each snapshot
    pub times: Vec<f64>,

    /// Displacement snapshots
    pub u: Vec<Vec<f64>>,

    /// Damage snapshots
    pub alpha: Vec<Vec<f64>>,
}

/// Assists in generating output files
///
/// The files of a run are saved in `<out_dir>/<stem>-<signature>/`:
///
/// * `parameters.json` -- the configuration
/// * `signature.txt` -- the hash of the configuration
/// * `time_data.json` -- the history (overwritten after every load step)
/// * `fields.json` -- the field snapshots (overwritten after every load step)
///
/// Every file is written to a temporary file first and then renamed, so a reader never sees
/// a partially written file. Only the root rank writes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FileIo {
    /// Holds a flag to enable/disable the file generation
    enabled: bool,

    /// Defines the directory of this run
    run_dir: String,

    /// Holds the signature of the configuration
    signature: String,

    /// Holds the snapshots written so far
    fields: FieldSeries,
}

impl FileIo {
    /// Allocates a new instance with deactivated generation of files
    pub fn new() -> Self {
        FileIo {
            enabled: false,
            run_dir: String::new(),
            signature: String::new(),
            fields: FieldSeries::default(),
        }
    }

    /// Allocates a new instance and writes the parameters
    ///
    /// # Input
    ///
    /// * `config` -- the configuration (its hash defines the run directory)
    /// * `comm` -- only the root rank writes files
    /// * `filename_stem` -- the first part of the run directory name, e.g., "chain"
    /// * `output_directory` -- the directory to save the run directories.
    ///   None means that the default directory will be used; see [DEFAULT_OUT_DIR]
    pub fn new_enabled(
        config: &Config,
        comm: &dyn Communicator,
        filename_stem: &str,
        output_directory: Option<&str>,
    ) -> Result<Self, StrError> {
        let out_dir = match output_directory {
            Some(d) => d,
            None => DEFAULT_OUT_DIR,
        };
        let signature = config.signature()?;
        let run_dir = format!("{}/{}-{}", out_dir, filename_stem, signature);
        let file_io = FileIo {
            enabled: comm.is_root(),
            run_dir,
            signature,
            fields: FieldSeries::default(),
        };
        if file_io.enabled {
            fs::create_dir_all(&file_io.run_dir).map_err(|_| "cannot create output directory")?;
            write_json_atomic(config, &file_io.path_parameters())?;
            write_text_atomic(&file_io.signature, &file_io.path_signature())?;
        }
        comm.barrier();
        Ok(file_io)
    }

    /// Returns the directory of this run (empty if disabled)
    pub fn run_dir(&self) -> &str {
        &self.run_dir
    }

    /// Returns the signature of the configuration (empty if disabled)
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Returns the snapshots written so far
    pub fn fields(&self) -> &FieldSeries {
        &self.fields
    }

    /// Generates the filename path for the parameters file
    pub fn path_parameters(&self) -> String {
        format!("{}/parameters.json", self.run_dir)
    }

    /// Generates the filename path for the signature file
    pub fn path_signature(&self) -> String {
        format!("{}/signature.txt", self.run_dir)
    }

    /// Generates the filename path for the history file
    pub fn path_history(&self) -> String {
        format!("{}/time_data.json", self.run_dir)
    }

    /// Generates the filename path for the field snapshots file
    pub fn path_fields(&self) -> String {
        format!("{}/fields.json", self.run_dir)
    }

    /// Overwrites the history file
    pub fn write_history(&self, history: &HistoryLog) -> Result<(), StrError> {
        if self.enabled {
            write_json_atomic(history, &self.path_history())?;
        }
        Ok(())
    }

    /// Appends the current fields to the snapshots and overwrites the snapshots file
    pub fn write_fields(&mut self, state: &ChainState) -> Result<(), StrError> {
        if self.enabled {
            self.fields.times.push(state.t);
            self.fields.u.push(state.u.as_slice().to_vec());
            self.fields.alpha.push(state.alpha.as_slice().to_vec());
            write_json_atomic(&self.fields, &self.path_fields())?;
        }
        Ok(())
    }

    /// Reads a JSON file with the field snapshots
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn read_fields<P>(full_path: &P) -> Result<FieldSeries, StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        let file = File::open(path).map_err(|_| "cannot open file")?;
        let buffered = BufReader::new(file);
        let fields = serde_json::from_reader(buffered).map_err(|_| "cannot parse JSON file")?;
        Ok(fields)
    }
}

/// Writes a JSON file via a temporary file in the same directory
fn write_json_atomic<T, P>(value: &T, full_path: &P) -> Result<(), StrError>
where
    T: Serialize,
    P: AsRef<OsStr> + ?Sized,
{
    let json = serde_json::to_string(value).map_err(|_| "cannot serialize data to JSON")?;
    write_text_atomic(&json, full_path)
}

/// Writes a text file via a temporary file in the same directory
fn write_text_atomic<P>(text: &str, full_path: &P) -> Result<(), StrError>
where
    P: AsRef<OsStr> + ?Sized,
{
    let path = Path::new(full_path).to_path_buf();
    if let Some(p) = path.parent() {
        fs::create_dir_all(p).map_err(|_| "cannot create directory")?;
    }
    let tmp = path.with_extension("tmp");
    let mut file = File::create(&tmp).map_err(|_| "cannot create file")?;
    file.write_all(text.as_bytes()).map_err(|_| "cannot write file")?;
    file.sync_all().map_err(|_| "cannot sync file")?;
    fs::rename(&tmp, &path).map_err(|_| "cannot rename file")?;
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::FileIo;
    use crate::base::{Config, SerialComm, DEFAULT_TEST_DIR};
    use crate::fem::{ChainState, HistoryLog};
    use crate::StrError;
    use std::fs;

    #[test]
    fn new_works() {
        let file_io = FileIo::new();
        assert_eq!(file_io.run_dir(), "");
        assert_eq!(file_io.signature(), "");
        file_io.write_history(&HistoryLog::new()).unwrap();
    }

    #[test]
    fn new_enabled_works() -> Result<(), StrError> {
        let comm = SerialComm;
        let mut config = Config::new();
        config.set_n_spring(3);
        let mut file_io = FileIo::new_enabled(&config, &comm, "test_file_io", Some(DEFAULT_TEST_DIR))?;
        let sig = config.signature()?;
        assert_eq!(file_io.run_dir(), format!("{}/test_file_io-{}", DEFAULT_TEST_DIR, sig));
        let text = fs::read_to_string(file_io.path_signature()).map_err(|_| "cannot read")?;
        assert_eq!(text, sig);
        let params = fs::read_to_string(file_io.path_parameters()).map_err(|_| "cannot read")?;
        let read: Config = serde_json::from_str(&params).map_err(|_| "cannot parse")?;
        assert_eq!(read, config);

        let mut state = ChainState::new(&config.model);
        state.t = 0.25;
        file_io.write_fields(&state)?;
        state.t = 0.5;
        file_io.write_fields(&state)?;
        let fields = FileIo::read_fields(&file_io.path_fields())?;
        assert_eq!(fields.times, &[0.25, 0.5]);
        assert_eq!(fields.u[1].len(), 4);
        assert_eq!(fields.alpha[1].len(), 3);

        file_io.write_history(&HistoryLog::new())?;
        let history = HistoryLog::read_json(&file_io.path_history())?;
        assert!(history.is_empty());
        Ok(())
    }
}
