mod config;
mod engine;
mod export;
mod model;
mod stats;

use crate::config::Config;
use crate::engine::Engine;
use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use std::{fs, path::PathBuf};

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: PathBuf,

    /// Directory the exported statistics are written into.
    #[arg(long, default_value = "stats")]
    out_dir: PathBuf,

    /// Seed for the random number generator; OS entropy when omitted.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let cfg = Config::from_file(&args.config).context("failed to load config")?;
    log::info!("{cfg:#?}");

    let rng = match args.seed {
        Some(seed) => ChaCha12Rng::seed_from_u64(seed),
        None => ChaCha12Rng::try_from_os_rng()?,
    };

    let gather_stats = cfg.run.gather_stats;

    let mut engine = Engine::new(cfg, rng).context("failed to construct engine")?;
    let series = engine.run().context("failed to run simulation")?;

    if gather_stats {
        fs::create_dir_all(&args.out_dir)
            .with_context(|| format!("failed to create {:?}", args.out_dir))?;
        let file = args.out_dir.join("total-counts.csv");
        export::write_series(&series, &file).context("failed to export statistics")?;
        log::info!("wrote {file:?}");
    }

    log::info!("simulation finished successfully");

    Ok(())
}
