#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use sense_of_control::simulation::{
    agent::Pilot, environment::ObstacleField, params::DRIFT_MAGNITUDE, Parameters,
};

/// Runs the planner headless over a synthetic obstacle field and prints one
/// JSON telemetry record per decision step.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Parameter file (partable `name value` lines, or `.json`). Defaults are used if omitted.
    #[arg(short, long)]
    params: Option<PathBuf>,

    /// Number of decision steps to run.
    #[arg(short, long, default_value_t = 500)]
    steps: u64,

    /// Seed for every random draw; omit for a fresh run.
    #[arg(long)]
    seed: Option<u64>,

    /// Push the field sideways every step, on top of the pilot's steering.
    #[arg(long)]
    drift: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let params = match &args.params {
        Some(path) => Parameters::load(path)?,
        None => Parameters::default(),
    };
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let drift = if args.drift { DRIFT_MAGNITUDE } else { 0.0 };
    let mut field = ObstacleField::new(&mut rng).with_drift(drift);
    let mut pilot = Pilot::new(params)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for _ in 0..args.steps {
        let report = pilot.update_state(&mut field, &mut rng)?;
        serde_json::to_writer(&mut out, &report)?;
        writeln!(out)?;
    }
    out.flush()?;

    let errors = pilot.planner.prediction_errors();
    let mean_error = if errors.is_empty() {
        0.0
    } else {
        errors.iter().sum::<f64>() / errors.len() as f64
    };
    tracing::info!(
        ticks = pilot.tick_count,
        ll_soc = pilot.planner.ll_soc(),
        hl_soc = pilot.planner.hl_soc(),
        mean_prediction_error = mean_error,
        selection_time_ms = pilot.planner.selection_time(),
        "run finished"
    );

    Ok(())
}
