mod analysis;
mod ast_event;
mod ast_file;
mod constants;
mod error;
mod metadata;
mod process;
mod sample_pool;

use std::path::PathBuf;

use clap::Parser;
use log::{error, info};

use crate::constants::{ADC_RANGE, DEFAULT_RATE_JUMP_HZ, REFERENCE_BASELINE};
use crate::process::process_run;

/// Profile the noise occupancy of a raw .ast run and recommend per-channel
/// zle threshold settings
#[derive(Parser, Debug)]
struct Cli {
    /// Path to the noise run directory
    run_dir: PathBuf,

    /// ADC baseline the occupancy is measured against
    #[arg(long, default_value_t = REFERENCE_BASELINE)]
    baseline: u16,

    /// Exclusive upper bound of valid ADC codes
    #[arg(long, default_value_t = ADC_RANGE)]
    max_code: u16,

    /// Rate jump in Hz marking the edge of the noise band
    #[arg(long, default_value_t = DEFAULT_RATE_JUMP_HZ)]
    rate_jump: f64
}

fn main() {
    //Setup logging
    simplelog::TermLogger::init(simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto)
    .unwrap();

    let cli = Cli::parse();

    info!("Starting up the noise monitor...\n");

    if !cli.run_dir.exists() {
        error!("Can't find {}. Shutting down.\n", cli.run_dir.display());
        return;
    }
    info!("Found {}\n", cli.run_dir.display());

    match process_run(&cli.run_dir, cli.baseline, cli.max_code, cli.rate_jump) {
        Ok(_) => info!("Noise analysis successfully completed.\n"),
        Err(e) => error!("Noise analysis ran into an error: {} Shutting down.\n", e)
    }

    return;
}
