//! Typed read access to a loaded database.
//!
//! Downstream curve fitting reads only the aligned tables; the staging
//! queries exist for inspection.

use crate::models::StagingCounts;
use crate::staging::StagingStore;
use crate::Database;
use peat_core::{AlignedRainfallInterval, AlignedWaterLevel, Result, Series, TimestampedSample};
use peat_data::TimeGrid;
use rusqlite::OptionalExtension;

impl Database {
    /// The persisted grid, or `None` before any load has been committed.
    pub fn query_time_grid(&self) -> Result<Option<TimeGrid>> {
        let conn = self.conn.borrow();
        let step: Option<i64> = conn
            .query_row("SELECT time_step_s FROM time_grid WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;
        let Some(step) = step else {
            return Ok(None);
        };
        let mut stmt = conn.prepare("SELECT epoch FROM grid_time ORDER BY epoch")?;
        let epochs = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<i64>, _>>()?;
        log::debug!("query: query_time_grid returned {} epochs", epochs.len());
        TimeGrid::from_parts(epochs, step).map(Some)
    }

    /// Rainfall intervals ordered by start epoch.
    pub fn query_rainfall_intervals(&self) -> Result<Vec<AlignedRainfallInterval>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT from_epoch, thru_epoch, rainfall_intensity_mm_h
             FROM rainfall_intensity
             ORDER BY from_epoch",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(AlignedRainfallInterval {
                    from_epoch: row.get(0)?,
                    thru_epoch: row.get(1)?,
                    intensity: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        log::debug!(
            "query: query_rainfall_intervals returned {} records",
            rows.len()
        );
        Ok(rows)
    }

    /// Interpolated water levels ordered by epoch.
    pub fn query_water_levels(&self) -> Result<Vec<AlignedWaterLevel>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare("SELECT epoch, zeta_mm FROM water_level ORDER BY epoch")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(AlignedWaterLevel {
                    epoch: row.get(0)?,
                    level: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        log::debug!("query: query_water_levels returned {} records", rows.len());
        Ok(rows)
    }

    /// Raw staged samples of one series, ordered by epoch.
    pub fn query_staging(&self, series: Series) -> Result<Vec<TimestampedSample>> {
        let conn = self.conn.borrow();
        StagingStore::new(&conn).select_all(series)
    }

    pub fn query_staging_counts(&self) -> Result<StagingCounts> {
        let conn = self.conn.borrow();
        let store = StagingStore::new(&conn);
        Ok(StagingCounts {
            rainfall_intensity: store.count(Series::RainfallIntensity)?,
            evapotranspiration: store.count(Series::Evapotranspiration)?,
            water_level: store.count(Series::WaterLevel)?,
        })
    }
}
