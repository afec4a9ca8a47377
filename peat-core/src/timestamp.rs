//! Conversion of local, timezone-naive timestamp text into UNIX epochs.
//!
//! Input files record time as local wall-clock text without an offset. The
//! [`TimestampNormalizer`] pins that text to the configured IANA zone and
//! yields whole seconds since 1970-01-01T00:00:00Z. [`TimestampedRows`]
//! applies it lazily to a stream of CSV records so that long files are never
//! held in memory.

use crate::config::LoadConfig;
use crate::error::{PeatError, Result};
use chrono::{DateTime, LocalResult, NaiveDateTime, TimeDelta, TimeZone, Timelike};
use chrono_tz::{OffsetComponents, Tz};
use csv::StringRecord;
use std::iter::FusedIterator;

/// Converts timestamp text to epochs in a fixed zone and format.
#[derive(Debug, Clone)]
pub struct TimestampNormalizer {
    time_zone: Tz,
    format: String,
}

impl TimestampNormalizer {
    pub fn new(config: &LoadConfig) -> Result<Self> {
        let time_zone: Tz = config
            .time_zone
            .parse()
            .map_err(|_| PeatError::UnknownTimeZone(config.time_zone.clone()))?;
        Ok(Self {
            time_zone,
            format: config.timestamp_format.clone(),
        })
    }

    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }

    /// Parse `text` as local time and return seconds since the UNIX epoch.
    ///
    /// A local time that occurs twice (clocks falling back) resolves to the
    /// standard-time instant. A local time skipped by a forward transition
    /// is read with the zone's standard offset, so loggers that never leave
    /// standard time keep a continuous record. Leap seconds and fractional
    /// seconds are rejected.
    pub fn to_epoch(&self, text: &str) -> Result<i64> {
        let naive = NaiveDateTime::parse_from_str(text, &self.format)
            .map_err(|err| invalid_timestamp(text, err.to_string()))?;
        if naive.nanosecond() >= 1_000_000_000 {
            return Err(invalid_timestamp(text, "leap second".to_string()));
        }
        if naive.nanosecond() != 0 {
            return Err(invalid_timestamp(text, "non-integer seconds".to_string()));
        }
        let local = match self.time_zone.from_local_datetime(&naive) {
            LocalResult::Single(dt) => dt,
            LocalResult::Ambiguous(first, second) => {
                if first.offset().dst_offset() == TimeDelta::zero() {
                    first
                } else {
                    second
                }
            }
            LocalResult::None => self.at_standard_offset(text, naive)?,
        };
        Ok(local.timestamp())
    }

    /// Pin `naive` with the standard (non-DST) offset in force around it.
    fn at_standard_offset(&self, text: &str, naive: NaiveDateTime) -> Result<DateTime<Tz>> {
        let standard = self
            .time_zone
            .offset_from_utc_datetime(&naive)
            .base_utc_offset();
        let utc = naive
            .checked_sub_signed(standard)
            .ok_or_else(|| invalid_timestamp(text, "out of range".to_string()))?;
        log::debug!(
            "timestamp: {} does not exist in {}, using standard offset {}",
            text,
            self.time_zone.name(),
            standard
        );
        Ok(self.time_zone.from_utc_datetime(&utc))
    }

    /// Wrap a stream of CSV records, replacing each leading timestamp with
    /// its epoch.
    pub fn timestamped_rows<I>(&self, rows: I) -> TimestampedRows<'_, I::IntoIter>
    where
        I: IntoIterator<Item = std::result::Result<StringRecord, csv::Error>>,
    {
        TimestampedRows {
            rows: rows.into_iter(),
            normalizer: self,
            finished: false,
        }
    }
}

fn invalid_timestamp(text: &str, reason: String) -> PeatError {
    PeatError::InvalidTimestamp {
        text: text.to_string(),
        reason,
    }
}

/// A CSV record whose first field has been replaced by an epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct TimestampedRecord {
    pub epoch: i64,
    /// Line of the record in its source file, 0 when unknown.
    pub line: u64,
    /// Remaining fields, untouched.
    pub fields: Vec<String>,
}

/// Lazy, single-pass transform over CSV records.
///
/// Row order is preserved. The first error is yielded once and ends the
/// sequence.
pub struct TimestampedRows<'a, I> {
    rows: I,
    normalizer: &'a TimestampNormalizer,
    finished: bool,
}

impl<I> TimestampedRows<'_, I> {
    fn convert(&self, record: &StringRecord) -> Result<TimestampedRecord> {
        let text = record.get(0).unwrap_or("");
        let epoch = self.normalizer.to_epoch(text)?;
        Ok(TimestampedRecord {
            epoch,
            line: record.position().map_or(0, |p| p.line()),
            fields: record.iter().skip(1).map(str::to_string).collect(),
        })
    }
}

impl<I> Iterator for TimestampedRows<'_, I>
where
    I: Iterator<Item = std::result::Result<StringRecord, csv::Error>>,
{
    type Item = Result<TimestampedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let converted = match self.rows.next()? {
            Ok(record) => self.convert(&record),
            Err(err) => Err(err.into()),
        };
        if converted.is_err() {
            self.finished = true;
        }
        Some(converted)
    }
}

impl<I> FusedIterator for TimestampedRows<'_, I> where
    I: Iterator<Item = std::result::Result<StringRecord, csv::Error>>
{
}
