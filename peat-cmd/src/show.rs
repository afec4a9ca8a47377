//! The `show` subcommand.

use anyhow::{bail, Context};
use peat_core::{AlignedRainfallInterval, AlignedWaterLevel, Series};
use peat_db::{Database, StagingCounts};
use serde::Serialize;
use std::path::Path;

/// Everything a load persisted, as handed to downstream consumers.
#[derive(Debug, Serialize)]
pub struct Snapshot {
    pub staging: StagingCounts,
    pub time_step_s: i64,
    pub grid: Vec<i64>,
    pub rainfall_intensity: Vec<AlignedRainfallInterval>,
    pub water_level: Vec<AlignedWaterLevel>,
}

pub fn snapshot(db: &Database) -> anyhow::Result<Snapshot> {
    let Some(grid) = db.query_time_grid()? else {
        bail!("database holds no time grid; run `load` first");
    };
    Ok(Snapshot {
        staging: db.query_staging_counts()?,
        time_step_s: grid.step(),
        grid: grid.epochs().to_vec(),
        rainfall_intensity: db.query_rainfall_intervals()?,
        water_level: db.query_water_levels()?,
    })
}

pub fn run_show(db_path: &Path, json: bool) -> anyhow::Result<()> {
    if !db_path.exists() {
        bail!("{} does not exist", db_path.display());
    }
    let db = Database::open(db_path)
        .with_context(|| format!("opening database {}", db_path.display()))?;
    let snapshot = snapshot(&db)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_text(&snapshot);
    }
    Ok(())
}

fn print_text(snapshot: &Snapshot) {
    println!(
        "staging: {} rainfall, {} evapotranspiration, {} water level",
        snapshot.staging.rainfall_intensity,
        snapshot.staging.evapotranspiration,
        snapshot.staging.water_level
    );
    println!(
        "grid: {} points, step {} s",
        snapshot.grid.len(),
        snapshot.time_step_s
    );
    println!("{}", table_header());
    for (interval, level) in snapshot
        .rainfall_intensity
        .iter()
        .zip(snapshot.water_level.iter())
    {
        println!(
            "{:>12} {:>12} {:>14.3} {:>12.3}",
            interval.from_epoch, interval.thru_epoch, interval.intensity, level.level
        );
    }
}

fn table_header() -> String {
    format!(
        "{:>12} {:>12} {:>14} {:>12}",
        "from",
        "thru",
        format!("rain ({})", Series::RainfallIntensity.unit()),
        format!("zeta ({})", Series::WaterLevel.unit())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use peat_core::LoadConfig;
    use peat_db::LoadSources;

    #[test]
    fn table_header_names_series_units() {
        let header = table_header();
        assert!(header.contains("rain (mm/h)"));
        assert!(header.contains("zeta (mm)"));
    }

    #[test]
    fn snapshot_of_empty_database_fails() {
        let db = Database::new().unwrap();
        assert!(snapshot(&db).is_err());
    }

    #[test]
    fn snapshot_serializes_aligned_tables() {
        let db = Database::new().unwrap();
        db.load(
            &LoadConfig::default().with_time_zone("UTC"),
            LoadSources {
                rainfall: "datetime,mm/h\n1970-01-01 00:00:00,0\n1970-01-01 01:00:00,5\n".as_bytes(),
                evapotranspiration: "datetime,mm/h\n".as_bytes(),
                water_level: "datetime,mm\n1970-01-01 00:00:00,-10\n1970-01-01 01:00:00,-20\n"
                    .as_bytes(),
            },
        )
        .unwrap();

        let snapshot = snapshot(&db).unwrap();
        assert_eq!(snapshot.grid, vec![0, 3600, 7200]);
        let json: serde_json::Value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["time_step_s"], 3600);
        assert_eq!(json["rainfall_intensity"][1]["intensity"], 5.0);
        assert_eq!(json["water_level"][1]["level"], -20.0);
        assert_eq!(json["staging"]["evapotranspiration"], 0);
    }
}
