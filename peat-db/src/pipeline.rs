//! The load pipeline: stage, determine grid, resample.
//!
//! A [`LoadPipeline`] runs against a connection the caller owns, normally a
//! transaction. It moves strictly through
//! `Uninitialized -> Staged -> GridDetermined -> Resampled`; the caller's
//! commit is the final `Committed` step. Any error leaves the transaction
//! to be rolled back, so a failed load never leaves partial rows behind.

use crate::models::LoadSummary;
use crate::schema;
use crate::staging::StagingStore;
use peat_core::{
    AlignedRainfallInterval, AlignedWaterLevel, LoadConfig, PeatError, Result, Series,
    TimestampNormalizer,
};
use peat_data::binning::bin_rainfall;
use peat_data::interpolation::WaterLevelCurve;
use peat_data::TimeGrid;
use rusqlite::{params, Connection};
use serde::Serialize;
use std::fmt;
use std::io::Read;

/// Position of a load in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineStage {
    Uninitialized,
    Staged,
    GridDetermined,
    Resampled,
    Committed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Uninitialized => "uninitialized",
            PipelineStage::Staged => "staged",
            PipelineStage::GridDetermined => "grid determined",
            PipelineStage::Resampled => "resampled",
            PipelineStage::Committed => "committed",
        };
        f.write_str(name)
    }
}

/// The three raw input files of one load.
pub struct LoadSources<R, E, W> {
    /// Rainfall intensity, mm/h.
    pub rainfall: R,
    /// Evapotranspiration, mm/h.
    pub evapotranspiration: E,
    /// Water level, mm.
    pub water_level: W,
}

pub struct LoadPipeline<'c> {
    store: StagingStore<'c>,
    normalizer: TimestampNormalizer,
    stage: PipelineStage,
    grid: Option<TimeGrid>,
    summary: LoadSummary,
}

impl<'c> LoadPipeline<'c> {
    /// Prepare a load into `conn`, which must not hold data from an earlier
    /// load.
    pub fn new(conn: &'c Connection, config: &LoadConfig) -> Result<Self> {
        let normalizer = TimestampNormalizer::new(config)?;
        schema::ensure_empty(conn)?;
        log::info!(
            "pipeline: loading with time zone {}",
            normalizer.time_zone().name()
        );
        Ok(Self {
            store: StagingStore::new(conn),
            normalizer,
            stage: PipelineStage::Uninitialized,
            grid: None,
            summary: LoadSummary::default(),
        })
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    pub fn grid(&self) -> Option<&TimeGrid> {
        self.grid.as_ref()
    }

    /// Stage all three inputs, rainfall first.
    pub fn stage_sources<R, E, W>(&mut self, sources: LoadSources<R, E, W>) -> Result<()>
    where
        R: Read,
        E: Read,
        W: Read,
    {
        self.expect_stage(PipelineStage::Uninitialized)?;
        self.summary.rainfall_samples =
            self.store
                .stage_csv(Series::RainfallIntensity, &self.normalizer, sources.rainfall)?;
        self.summary.evapotranspiration_samples = self.store.stage_csv(
            Series::Evapotranspiration,
            &self.normalizer,
            sources.evapotranspiration,
        )?;
        self.summary.water_level_samples =
            self.store
                .stage_csv(Series::WaterLevel, &self.normalizer, sources.water_level)?;
        self.advance(PipelineStage::Staged);
        Ok(())
    }

    /// Derive the grid from rainfall epochs inside the water level record
    /// and persist it.
    pub fn determine_grid(&mut self) -> Result<&TimeGrid> {
        self.expect_stage(PipelineStage::Staged)?;
        let (min_epoch, max_epoch) = self
            .store
            .min_max_epoch(Series::WaterLevel)?
            .ok_or_else(|| PeatError::EmptyOverlap("water level record is empty".to_string()))?;
        let candidates =
            self.store
                .select_epochs_between(Series::RainfallIntensity, min_epoch, max_epoch)?;
        let grid = TimeGrid::from_candidates(&candidates)?;
        write_grid(self.store.connection(), &grid)?;
        log::info!(
            "pipeline: grid of {} points from {} to {}, step {} s",
            grid.point_count(),
            grid.first_epoch(),
            grid.closing_epoch(),
            grid.step()
        );

        self.summary.time_step_s = grid.step();
        self.summary.grid_points = grid.point_count();
        self.summary.grid_start = grid.first_epoch();
        self.summary.grid_end = grid.closing_epoch();
        self.advance(PipelineStage::GridDetermined);
        Ok(self.grid.insert(grid))
    }

    /// Bin rainfall and interpolate water level onto the grid.
    pub fn resample(&mut self) -> Result<()> {
        self.expect_stage(PipelineStage::GridDetermined)?;
        let grid = match self.grid.as_ref() {
            Some(grid) => grid,
            None => return Err(self.out_of_order(PipelineStage::GridDetermined)),
        };
        let conn = self.store.connection();

        let bins = bin_rainfall(&self.store.select_all(Series::RainfallIntensity)?, grid)?;
        if bins.excluded > 0 {
            log::info!(
                "pipeline: {} rainfall samples are off the grid and were not binned",
                bins.excluded
            );
        }
        write_rainfall(conn, &bins.intervals)?;

        let curve = WaterLevelCurve::new(self.store.select_all(Series::WaterLevel)?)?;
        let levels = curve.on_grid(grid);
        write_water_levels(conn, &levels)?;

        self.summary.rainfall_intervals = bins.intervals.len();
        self.summary.rainfall_excluded = bins.excluded;
        self.summary.water_levels = levels.len();
        self.advance(PipelineStage::Resampled);
        Ok(())
    }

    /// Hand back the summary once every stage has run.
    pub fn finish(self) -> Result<LoadSummary> {
        self.expect_stage(PipelineStage::Resampled)?;
        Ok(self.summary)
    }

    fn expect_stage(&self, expected: PipelineStage) -> Result<()> {
        if self.stage == expected {
            Ok(())
        } else {
            Err(self.out_of_order(expected))
        }
    }

    fn out_of_order(&self, expected: PipelineStage) -> PeatError {
        PeatError::OutOfOrder {
            expected: expected.to_string(),
            actual: self.stage.to_string(),
        }
    }

    fn advance(&mut self, next: PipelineStage) {
        log::debug!("pipeline: {} -> {}", self.stage, next);
        self.stage = next;
    }
}

/// Run every stage against `conn` without committing.
pub fn run_pipeline<R, E, W>(
    conn: &Connection,
    config: &LoadConfig,
    sources: LoadSources<R, E, W>,
) -> Result<LoadSummary>
where
    R: Read,
    E: Read,
    W: Read,
{
    let mut pipeline = LoadPipeline::new(conn, config)?;
    pipeline.stage_sources(sources)?;
    pipeline.determine_grid()?;
    pipeline.resample()?;
    pipeline.finish()
}

fn write_grid(conn: &Connection, grid: &TimeGrid) -> Result<()> {
    conn.execute(
        "INSERT INTO time_grid (id, time_step_s) VALUES (1, ?1)",
        params![grid.step()],
    )?;
    let mut stmt = conn.prepare("INSERT INTO grid_time (epoch) VALUES (?1)")?;
    for epoch in grid.epochs() {
        stmt.execute(params![epoch])?;
    }
    Ok(())
}

fn write_rainfall(conn: &Connection, intervals: &[AlignedRainfallInterval]) -> Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO rainfall_intensity (from_epoch, thru_epoch, rainfall_intensity_mm_h)
         VALUES (?1, ?2, ?3)",
    )?;
    for interval in intervals {
        stmt.execute(params![
            interval.from_epoch,
            interval.thru_epoch,
            interval.intensity
        ])?;
    }
    Ok(())
}

fn write_water_levels(conn: &Connection, levels: &[AlignedWaterLevel]) -> Result<()> {
    let mut stmt = conn.prepare("INSERT INTO water_level (epoch, zeta_mm) VALUES (?1, ?2)")?;
    for level in levels {
        stmt.execute(params![level.epoch, level.level])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::create_schema;

    fn connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        conn.execute_batch(create_schema()).unwrap();
        conn
    }

    fn utc() -> LoadConfig {
        LoadConfig::default().with_time_zone("UTC")
    }

    const RAINFALL: &str = "\
datetime,mm/h
1970-01-01 00:00:00,0
1970-01-01 01:00:00,5
1970-01-01 02:00:00,10
";
    const ET: &str = "datetime,mm/h\n1970-01-01 00:00:00,0.1\n";
    const WATER_LEVEL: &str = "\
datetime,mm
1969-12-31 23:30:00,-200
1970-01-01 02:30:00,-100
";

    fn sources<'a>(
        rainfall: &'a str,
        water_level: &'a str,
    ) -> LoadSources<&'a [u8], &'a [u8], &'a [u8]> {
        LoadSources {
            rainfall: rainfall.as_bytes(),
            evapotranspiration: ET.as_bytes(),
            water_level: water_level.as_bytes(),
        }
    }

    #[test]
    fn stages_advance_in_order() {
        let conn = connection();
        let mut pipeline = LoadPipeline::new(&conn, &utc()).unwrap();
        assert_eq!(pipeline.stage(), PipelineStage::Uninitialized);
        pipeline.stage_sources(sources(RAINFALL, WATER_LEVEL)).unwrap();
        assert_eq!(pipeline.stage(), PipelineStage::Staged);
        let grid = pipeline.determine_grid().unwrap();
        assert_eq!(grid.epochs(), &[0, 3600, 7200, 10800]);
        assert_eq!(pipeline.stage(), PipelineStage::GridDetermined);
        pipeline.resample().unwrap();
        assert_eq!(pipeline.stage(), PipelineStage::Resampled);
        let summary = pipeline.finish().unwrap();
        assert_eq!(summary.rainfall_samples, 3);
        assert_eq!(summary.evapotranspiration_samples, 1);
        assert_eq!(summary.water_level_samples, 2);
        assert_eq!(summary.time_step_s, 3600);
        assert_eq!(summary.grid_points, 4);
        assert_eq!(summary.rainfall_intervals, 3);
        assert_eq!(summary.water_levels, 3);
    }

    #[test]
    fn stages_cannot_be_skipped() {
        let conn = connection();
        let mut pipeline = LoadPipeline::new(&conn, &utc()).unwrap();
        assert!(matches!(
            pipeline.determine_grid(),
            Err(PeatError::OutOfOrder { .. })
        ));
        assert!(matches!(pipeline.resample(), Err(PeatError::OutOfOrder { .. })));
        pipeline.stage_sources(sources(RAINFALL, WATER_LEVEL)).unwrap();
        assert!(matches!(
            pipeline.stage_sources(sources(RAINFALL, WATER_LEVEL)),
            Err(PeatError::OutOfOrder { .. })
        ));
        assert!(matches!(pipeline.finish(), Err(PeatError::OutOfOrder { .. })));
    }

    #[test]
    fn writes_aligned_tables() {
        let conn = connection();
        run_pipeline(&conn, &utc(), sources(RAINFALL, WATER_LEVEL)).unwrap();

        let step: i64 = conn
            .query_row("SELECT time_step_s FROM time_grid", [], |row| row.get(0))
            .unwrap();
        assert_eq!(step, 3600);

        let intervals: Vec<(i64, i64, f64)> = conn
            .prepare("SELECT from_epoch, thru_epoch, rainfall_intensity_mm_h FROM rainfall_intensity ORDER BY from_epoch")
            .unwrap()
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
            .unwrap()
            .collect::<std::result::Result<_, _>>()
            .unwrap();
        assert_eq!(
            intervals,
            vec![(0, 3600, 0.0), (3600, 7200, 5.0), (7200, 10800, 10.0)]
        );

        let levels: Vec<(i64, f64)> = conn
            .prepare("SELECT epoch, zeta_mm FROM water_level ORDER BY epoch")
            .unwrap()
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap()
            .collect::<std::result::Result<_, _>>()
            .unwrap();
        let epochs: Vec<i64> = levels.iter().map(|(epoch, _)| *epoch).collect();
        assert_eq!(epochs, vec![0, 3600, 7200]);
        // -200 mm at -1800 s rising linearly to -100 mm at 9000 s
        assert!((levels[0].1 - (-200.0 + 100.0 * 1800.0 / 10800.0)).abs() < 1e-9);
    }

    #[test]
    fn empty_water_level_record_is_empty_overlap() {
        let conn = connection();
        let err = run_pipeline(&conn, &utc(), sources(RAINFALL, "datetime,mm\n")).unwrap_err();
        assert!(matches!(err, PeatError::EmptyOverlap(_)));
    }

    #[test]
    fn disjoint_records_are_empty_overlap() {
        let conn = connection();
        let water_level = "datetime,mm\n1980-01-01 00:00:00,1\n1980-01-02 00:00:00,2\n";
        let err = run_pipeline(&conn, &utc(), sources(RAINFALL, water_level)).unwrap_err();
        assert!(matches!(err, PeatError::EmptyOverlap(_)));
    }

    #[test]
    fn duplicate_water_level_epochs_are_rejected() {
        let conn = connection();
        let water_level = "\
datetime,mm
1969-12-31 23:00:00,1
1969-12-31 23:00:00,2
1970-01-01 03:00:00,3
";
        let err = run_pipeline(&conn, &utc(), sources(RAINFALL, water_level)).unwrap_err();
        assert!(matches!(
            err,
            PeatError::DuplicateEpoch {
                series: Series::WaterLevel,
                ..
            }
        ));
    }

    #[test]
    fn unknown_time_zone_fails_before_touching_store() {
        let conn = connection();
        let config = LoadConfig::default().with_time_zone("Nowhere/Special");
        assert!(matches!(
            LoadPipeline::new(&conn, &config),
            Err(PeatError::UnknownTimeZone(_))
        ));
    }
}
