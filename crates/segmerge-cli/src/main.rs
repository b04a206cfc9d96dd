use clap::Parser;
use segmerge_core::logging;

mod cli;

use crate::cli::Cli;

fn main() {
    // Parse first: verbosity comes from the command line.
    let cli = Cli::parse();

    if let Err(err) = logging::init_logging(&cli.log_options()) {
        eprintln!("segmerge: logging unavailable: {:#}", err);
    }

    if let Err(err) = cli.run() {
        eprintln!("segmerge error: {:#}", err);
        std::process::exit(1);
    }
}
