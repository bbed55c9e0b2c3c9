use dmsim::prelude::*;
use dmsim::StrError;
use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode};
use structopt::StructOpt;

/// Command line options
#[derive(StructOpt, Debug)]
#[structopt(
    name = "dmsim_chain",
    about = "Simulates the quasi-static damage evolution of a chain of springs"
)]
struct Options {
    /// Number of springs
    #[structopt(short = "N", long, default_value = "2")]
    n_spring: usize,

    /// Uses the closed-form homogeneous state instead of the alternate minimization
    #[structopt(long)]
    homogeneous: bool,

    /// Stopping criterion of the alternate minimization (residual_u or alpha_H1)
    #[structopt(long, default_value = "alpha_H1")]
    criterion: Criterion,

    /// Number of load steps
    #[structopt(long, default_value = "30")]
    steps: usize,

    /// Output directory (default: /tmp/dmsim/results)
    #[structopt(long)]
    out_dir: Option<String>,

    /// Raises the damage lower bound after each step
    #[structopt(long)]
    ratchet: bool,

    /// Disables the iteration and step messages
    #[structopt(short, long)]
    quiet: bool,
}

fn main() -> Result<(), StrError> {
    // parse options
    let options = Options::from_args();
    let level = if options.quiet { LevelFilter::Warn } else { LevelFilter::Info };
    TermLogger::init(level, simplelog::Config::default(), TerminalMode::Mixed, ColorChoice::Auto)
        .map_err(|_| "cannot initialize the logger")?;

    // configuration
    let mut config = Config::new();
    let max_load = config.model.k;
    config
        .set_n_spring(options.n_spring)
        .set_criterion(options.criterion)
        .set_loading(0.0, max_load, options.steps)
        .set_verbose(!options.quiet, !options.quiet);
    if options.homogeneous {
        config.set_equilibrium(Equilibrium::Homogeneous);
    }
    if options.ratchet {
        config.set_irreversibility(Irreversibility::Ratchet);
    }

    // run
    let comm = SerialComm;
    log::info!("running {} springs on {} worker(s)", options.n_spring, comm.size());
    let file_io = FileIo::new_enabled(&config, &comm, "chain", options.out_dir.as_deref())?;
    let mut driver = LoadStepDriver::new(&config, &comm, file_io)?;
    let loads = config.loading.loads();
    let result = driver.run(&loads);
    driver.history().print_table();

    // message
    let path = driver.file_io().path_history();
    let thin_line = format!("{:─^1$}", "", path.len());
    println!("\n{}", thin_line);
    println!("history file:");
    println!("{}", path);
    println!("{}\n", thin_line);
    match result {
        Ok(_) => Ok(()),
        Err(SimError::Message(msg)) => Err(msg),
        Err(err) => {
            println!("ERROR: {}", err);
            Err("simulation failed")
        }
    }
}
