mod cli;
mod component;
mod component_tree;
mod create_fusions;
mod create_nrfg;
mod filenames;
mod fusion;
mod fusion_output;
mod gene;
mod globals;
mod log_utils;
mod logger;
mod model;
mod model_input;
mod nrfg_output;
mod os_utils;
mod run_stats;
mod utils;

use std::{error, process};

use hhmmss::Hhmmss;
use log::info;

use crate::cli::Commands;
use crate::create_fusions::run_create_fusions;
use crate::create_nrfg::run_create_nrfg;
use crate::globals::{PROGRAM_NAME, PROGRAM_VERSION};
use crate::logger::setup_output_dir_and_logger;

fn run(settings: &cli::Settings) -> Result<(), Box<dyn error::Error>> {
    info!("Starting {PROGRAM_NAME} {PROGRAM_VERSION}");
    info!(
        "cmdline: {}",
        std::env::args().collect::<Vec<_>>().join(" ")
    );
    info!("Running on {} threads", settings.shared.thread_count);

    let start = std::time::Instant::now();

    match &settings.command {
        Commands::CreateFusions(x) => {
            run_create_fusions(&settings.shared, x)?;
        }
        Commands::CreateNrfg(x) => {
            run_create_nrfg(&settings.shared, x)?;
        }
    }

    info!(
        "{PROGRAM_NAME} completed. Total Runtime: {}",
        start.elapsed().hhmmssxxx()
    );
    Ok(())
}

fn main() {
    let settings = cli::validate_and_fix_settings(cli::parse_settings());

    // Setup logger, including creation of the output directory for the log file:
    setup_output_dir_and_logger(
        settings.get_output_dir(),
        settings.shared.clobber,
        settings.shared.debug,
    );

    if let Err(err) = run(&settings) {
        log::error!("{err}");
        process::exit(2);
    }
}
