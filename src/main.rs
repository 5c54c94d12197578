//! Anveshan - runs the exploration controller against the in-process
//! simulation.

use std::path::{Path, PathBuf};

use anveshan::exploration::{ExplorationController, SelectorRegistry};
use anveshan::services::{RobotMotion, TracingMarkerPublisher};
use anveshan::sim::Simulation;
use anveshan::{AnveshanConfig, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (default: anveshan.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stop after this many ticks (0 = until finished)
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Number of unexplored sites in the simulated arena
    #[arg(long)]
    sim_sites: Option<usize>,

    /// Simulation RNG seed
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("anveshan=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            AnveshanConfig::load(path)?
        }
        None if Path::new("anveshan.toml").exists() => {
            info!("Loading configuration from anveshan.toml");
            AnveshanConfig::load(Path::new("anveshan.toml"))?
        }
        None => {
            info!("Using demo configuration");
            AnveshanConfig::demo()
        }
    };

    if let Some(max_ticks) = args.max_ticks {
        config.control.max_ticks = max_ticks;
    }
    if let Some(sites) = args.sim_sites {
        config.simulation.sites = sites;
    }
    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }

    info!("Anveshan v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Simulation: {} sites, seed {}, control rate {:.1} Hz",
        config.simulation.sites, config.simulation.seed, config.control.rate_hz
    );

    let Simulation {
        world,
        mut robot,
        mut maps,
    } = Simulation::new(&config.simulation);
    robot.init()?;
    let mut markers = TracingMarkerPublisher::new();

    let registry = SelectorRegistry::with_builtins();
    let mut controller =
        ExplorationController::from_config(&config, &registry, &mut robot, &mut maps, &mut markers)?;

    let stats = controller.run(config.tick_period()?, config.control.max_ticks);
    let state = controller.state();
    drop(controller);

    let remaining = world.lock().remaining();
    info!(
        "Done ({}): {} ticks, {} maps, {} goals, {} pose failures, {} without goal, {} sites unexplored",
        state.name(),
        stats.ticks,
        stats.maps_processed,
        stats.goals_issued,
        stats.pose_failures,
        stats.goal_failures,
        remaining
    );

    Ok(())
}
