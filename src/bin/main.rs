use std::path::PathBuf;

use clap::Parser;
use lander::init::json::{self, Config, TerrainConfig};
use lander::{App, Autopilot, ExecutionStatus, TickStats};
use log::{debug, info, warn};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration json file path, built-in defaults when absent
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed for generated terrain
    #[arg(long)]
    seed: Option<u64>,

    /// Tick length in seconds
    #[arg(long)]
    dt: Option<f64>,

    /// Maximal number of ticks
    #[arg(long)]
    max_ticks: Option<usize>,

    /// Vertical speed held by the autopilot
    #[arg(long, default_value = "-1.5", allow_hyphen_values = true)]
    target_speed: f64,

    /// Print the recorded flight
    #[arg(long)]
    history: bool,
}

fn main() -> Result<(), lander::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => json::from_file(path)?,
        None => Config::default(),
    };
    if let Some(seed) = cli.seed {
        match &mut config.terrain {
            TerrainConfig::Generated(settings) => settings.seed = Some(seed),
            TerrainConfig::Points(_) => warn!("--seed ignored, terrain points are given"),
        }
    }
    if let Some(dt) = cli.dt {
        config.run = config.run.with_dt(dt);
    }
    if let Some(max_ticks) = cli.max_ticks {
        config.run = config.run.with_max_ticks(max_ticks);
    }

    let mut app = App::try_from_config(&config)?;
    let mut autopilot = Autopilot::new(cli.target_speed);
    let mut stats = TickStats::default();
    info!(
        "descending from {:?} over {} terrain points",
        app.rocket().position(),
        app.planet().landscape().len()
    );

    let status = loop {
        if stats.ticks() >= config.run.max_ticks as u64 {
            break ExecutionStatus::InProgress;
        }
        let status = app.step(&mut autopilot)?;
        if let Some(rate) = stats.record() {
            debug!("{rate:.0} ticks/s");
        }
        if status != ExecutionStatus::InProgress {
            break status;
        }
    };

    let rocket = app.rocket();
    info!(
        "run ended with {status:?} after {} ticks ({:.1} s simulated) in {:?}, {:.0} ticks/s",
        stats.ticks(),
        stats.ticks() as f64 * config.run.dt,
        stats.elapsed(),
        stats.mean_rate()
    );
    info!(
        "fuel {:.1}/{:.1}, attitude propellant {:.1}/{:.1}",
        rocket.fuel(),
        rocket.max_fuel(),
        rocket.attitude_propellant(),
        rocket.max_attitude_propellant()
    );
    if cli.history {
        app.print_flight_results();
    }
    Ok(())
}
