//! Engine binary for the `FollowFlee` simulation.
//!
//! This is the host: it loads configuration, builds the lattice, seeds the
//! starting population, and steps the decision core for a bounded number of
//! generations, then prints a JSON report on stdout.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `followflee-config.yaml` (or the path given as
//!    the first argument)
//! 2. Initialize structured logging (tracing)
//! 3. Validate the model section
//! 4. Build the square lattice
//! 5. Seed the initial population
//! 6. Run the simulation loop
//! 7. Print the run report

mod error;
mod log_callback;
mod report;
mod spawner;

use std::path::{Path, PathBuf};

use followflee_core::Simulation;
use followflee_core::config::{FollowFleeConfig, LoggingConfig};
use followflee_core::runner;
use followflee_world::square_lattice;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::log_callback::LogCallback;
use crate::report::RunReport;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "followflee-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step or the simulation itself
/// fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let (config, loaded_from_file) = load_config(&config_path)?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!("followflee-engine starting");
    if loaded_from_file {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }

    let report = run(config)?;

    // 7. Print the run report.
    println!("{}", serde_json::to_string_pretty(&report)?);
    info!(
        end_reason = ?report.end_reason,
        total_ticks = report.total_ticks,
        "followflee-engine shutdown complete"
    );
    Ok(())
}

/// Build the world, run the simulation, and assemble the report.
fn run(config: FollowFleeConfig) -> Result<RunReport, EngineError> {
    // 3. Validate the model section.
    let model = config.model.validate()?;
    info!(
        seed = config.world.seed,
        mode = model.mode.config_name(),
        rep_rate = model.rep_rate,
        steps_per_generation = model.steps_per_generation,
        max_generations = config.simulation.max_generations,
        "Model configuration validated"
    );

    // 4. Build the lattice.
    let world = &config.world;
    let topology = square_lattice(world.width, world.height, world.neighbourhood, world.periodic)?;
    info!(
        width = world.width,
        height = world.height,
        neighbourhood = ?world.neighbourhood,
        periodic = world.periodic,
        "Lattice built"
    );

    // 5. Seed the initial population.
    let attributes =
        spawner::seed_population(&config.population, topology.node_count(), world.seed)?;

    // 6. Run the simulation.
    let mut simulation = Simulation::new(topology, attributes, model, world.seed)?;
    let mut callback = LogCallback::new();
    let result = runner::run_generations(
        &mut simulation,
        config.simulation.max_generations,
        &mut callback,
    )?;

    Ok(RunReport::new(config, &result, &simulation, &callback))
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Load the configuration file, falling back to defaults when it does not
/// exist. Returns whether the file was read.
fn load_config(path: &Path) -> Result<(FollowFleeConfig, bool), EngineError> {
    if path.exists() {
        Ok((FollowFleeConfig::from_file(path)?, true))
    } else {
        Ok((FollowFleeConfig::default(), false))
    }
}
