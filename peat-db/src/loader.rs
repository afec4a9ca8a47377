//! CSV staging of raw input files.
//!
//! All three inputs share one layout: a header row whose first column starts
//! with `datetime` (any case), then `timestamp,value` rows.
//!
//! ```text
//! Datetime,Rainfall intensity (mm/h)
//! 2019-03-01 00:00:00,0.0
//! 2019-03-01 00:30:00,1.2
//! ```

use crate::staging::StagingStore;
use peat_core::{PeatError, Result, Series, TimestampNormalizer, TimestampedRecord, TimestampedSample};
use std::io::Read;

impl StagingStore<'_> {
    /// Validate the header, then stream every row of `reader` into the
    /// staging table for `series`.
    ///
    /// Nothing is staged if the header is wrong. Any bad timestamp or value
    /// stops the load at that row.
    pub fn stage_csv<R: Read>(
        &self,
        series: Series,
        normalizer: &TimestampNormalizer,
        reader: R,
    ) -> Result<usize> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        check_header(series, rdr.headers()?)?;

        let samples = normalizer
            .timestamped_rows(rdr.into_records())
            .map(|row| row.and_then(|record| to_sample(series, record)));
        let count = self.try_append_all(series, samples)?;
        log::info!("loader: staged {} {} samples", count, series);
        Ok(count)
    }
}

fn check_header(series: Series, header: &csv::StringRecord) -> Result<()> {
    let first = header.get(0).unwrap_or("").trim();
    if first.to_lowercase().starts_with("datetime") {
        Ok(())
    } else {
        Err(PeatError::HeaderMismatch {
            series,
            found: first.to_string(),
        })
    }
}

fn to_sample(series: Series, record: TimestampedRecord) -> Result<TimestampedSample> {
    let text = record.fields.first().map(|s| s.trim()).unwrap_or("");
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(TimestampedSample::new(record.epoch, value)),
        _ => Err(PeatError::InvalidValue {
            series,
            line: record.line,
            text: text.to_string(),
        }),
    }
}
