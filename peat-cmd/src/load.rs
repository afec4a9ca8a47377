//! The `load` subcommand.

use anyhow::Context;
use log::info;
use peat_core::LoadConfig;
use peat_db::{Database, LoadSources, LoadSummary};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Paths of the three input files.
#[derive(Debug, Clone)]
pub struct LoadInputs {
    pub rainfall: PathBuf,
    pub evapotranspiration: PathBuf,
    pub water_level: PathBuf,
}

/// Build the load settings: defaults, then the JSON file, then `time_zone`.
pub fn resolve_config(
    config_path: Option<&Path>,
    time_zone: Option<&str>,
) -> anyhow::Result<LoadConfig> {
    let config = match config_path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str::<LoadConfig>(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => LoadConfig::default(),
    };
    Ok(match time_zone {
        Some(zone) => config.with_time_zone(zone),
        None => config,
    })
}

fn open_input(path: &Path) -> anyhow::Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    Ok(BufReader::new(file))
}

/// Load the three files into the database at `db_path` and commit.
pub fn run_load(db_path: &Path, inputs: &LoadInputs, config: &LoadConfig) -> anyhow::Result<()> {
    let sources = LoadSources {
        rainfall: open_input(&inputs.rainfall)?,
        evapotranspiration: open_input(&inputs.evapotranspiration)?,
        water_level: open_input(&inputs.water_level)?,
    };
    let db = Database::open(db_path)
        .with_context(|| format!("opening database {}", db_path.display()))?;

    info!(
        "Loading into {} (time zone {})",
        db_path.display(),
        config.time_zone
    );
    let summary = db
        .load(config, sources)
        .with_context(|| format!("loading into {}", db_path.display()))?;
    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &LoadSummary) {
    println!(
        "staged: {} rainfall, {} evapotranspiration, {} water level samples",
        summary.rainfall_samples, summary.evapotranspiration_samples, summary.water_level_samples
    );
    println!(
        "grid: {} points from {} to {}, step {} s",
        summary.grid_points, summary.grid_start, summary.grid_end, summary.time_step_s
    );
    println!(
        "aligned: {} rainfall intervals ({} samples off grid), {} water levels",
        summary.rainfall_intervals, summary.rainfall_excluded, summary.water_levels
    );
}
