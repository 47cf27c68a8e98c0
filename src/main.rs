use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use lexivent_core::config::SimConfig;
use lexivent_core::metrics::init_logging;
use lexivent_core::simulation::Simulation;
use lexivent_lib::render;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of simulation ticks to run
    #[arg(short, long, default_value_t = 1000)]
    ticks: u64,

    /// Custom config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Override the grid to a cube of this size
    #[arg(long)]
    grid_size: Option<usize>,

    /// Override the vent spawn cadence (ticks per token)
    #[arg(long)]
    spawn_rate: Option<u64>,

    /// RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Suppress the end-of-run report
    #[arg(short, long)]
    quiet: bool,

    /// Print an ASCII map of this altitude layer after the run
    #[arg(long)]
    slice: Option<usize>,

    /// Write the statistics history as JSON to this file
    #[arg(long)]
    stats_out: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let mut config = SimConfig::load_or_default(&args.config)?;
    if let Some(size) = args.grid_size {
        config.grid.size_x = size;
        config.grid.size_y = size;
        config.grid.size_z = size;
    }
    if let Some(rate) = args.spawn_rate {
        config.vent.spawn_rate = rate;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.validate()?;

    tracing::info!(
        grid = ?(config.grid.size_x, config.grid.size_y, config.grid.size_z),
        vent = ?config.vent_position(),
        ticks = args.ticks,
        seed = ?config.seed,
        "starting simulation"
    );

    let mut sim = Simulation::new(&config);
    sim.run(args.ticks);

    if !args.quiet {
        let stats = sim.current_stats();
        print!("{}", render::summary(&stats));
        print!("{}", render::chain_report(&sim.snapshot(), 10));
    }
    if let Some(z) = args.slice {
        print!("{}", render::horizontal_slice(&sim.snapshot(), z));
    }
    if let Some(path) = args.stats_out {
        let json = serde_json::to_string_pretty(sim.history())
            .context("serializing statistics history")?;
        fs::write(&path, json)
            .with_context(|| format!("writing statistics to {}", path.display()))?;
        tracing::info!(path = %path.display(), samples = sim.history().len(), "statistics written");
    }

    Ok(())
}
