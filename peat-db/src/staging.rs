//! Per-series holding area for raw samples.
//!
//! The store works against a borrowed connection, which is normally an open
//! transaction owned by the caller. Nothing written here is visible to other
//! connections until that transaction commits.

use peat_core::{Result, Series, TimestampedSample};
use rusqlite::{params, Connection};

/// Staging operations over the three `*_staging` tables.
pub struct StagingStore<'c> {
    conn: &'c Connection,
}

impl<'c> StagingStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub(crate) fn connection(&self) -> &'c Connection {
        self.conn
    }

    /// Append samples to a series in arrival order. Repeated epochs are kept.
    pub fn append_all<I>(&self, series: Series, samples: I) -> Result<usize>
    where
        I: IntoIterator<Item = TimestampedSample>,
    {
        self.try_append_all(series, samples.into_iter().map(Ok))
    }

    /// Like [`append_all`](Self::append_all), for sample streams that can
    /// fail part way. Stops at the first error.
    pub fn try_append_all<I>(&self, series: Series, samples: I) -> Result<usize>
    where
        I: IntoIterator<Item = Result<TimestampedSample>>,
    {
        let mut stmt = self.conn.prepare(&format!(
            "INSERT INTO {} (epoch, {}) VALUES (?1, ?2)",
            series.staging_table(),
            series.value_column()
        ))?;
        let mut count = 0usize;
        for sample in samples {
            let sample = sample?;
            stmt.execute(params![sample.epoch, sample.value])?;
            count += 1;
        }
        Ok(count)
    }

    /// Earliest and latest staged epoch, `None` for an empty series.
    pub fn min_max_epoch(&self, series: Series) -> Result<Option<(i64, i64)>> {
        let (min, max): (Option<i64>, Option<i64>) = self.conn.query_row(
            &format!(
                "SELECT min(epoch), max(epoch) FROM {}",
                series.staging_table()
            ),
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(min.zip(max))
    }

    /// All staged samples ordered by epoch; ties keep arrival order.
    pub fn select_all(&self, series: Series) -> Result<Vec<TimestampedSample>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT epoch, {} FROM {} ORDER BY epoch, rowid",
            series.value_column(),
            series.staging_table()
        ))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(TimestampedSample {
                    epoch: row.get(0)?,
                    value: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Staged epochs within `[min_epoch, max_epoch]`, ascending.
    pub fn select_epochs_between(
        &self,
        series: Series,
        min_epoch: i64,
        max_epoch: i64,
    ) -> Result<Vec<i64>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT epoch FROM {}
             WHERE epoch >= ?1 AND epoch <= ?2
             ORDER BY epoch",
            series.staging_table()
        ))?;
        let epochs = stmt
            .query_map(params![min_epoch, max_epoch], |row| row.get(0))?
            .collect::<std::result::Result<Vec<i64>, _>>()?;
        Ok(epochs)
    }

    pub fn count(&self, series: Series) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", series.staging_table()),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
