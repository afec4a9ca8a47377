//! Data model shared by staging, grid alignment and the persisted outputs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three input series accepted by a load.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum Series {
    /// Rainfall intensity in mm/h.
    RainfallIntensity,
    /// Evapotranspiration in mm/h. Staged only; alignment never reads it.
    Evapotranspiration,
    /// Water table level (zeta) in mm.
    WaterLevel,
}

impl Series {
    pub const ALL: [Series; 3] = [
        Series::RainfallIntensity,
        Series::Evapotranspiration,
        Series::WaterLevel,
    ];

    /// Name of the staging table holding raw samples for this series.
    pub fn staging_table(self) -> &'static str {
        match self {
            Series::RainfallIntensity => "rainfall_intensity_staging",
            Series::Evapotranspiration => "evapotranspiration_staging",
            Series::WaterLevel => "water_level_staging",
        }
    }

    /// Name of the value column in the staging table.
    pub fn value_column(self) -> &'static str {
        match self {
            Series::RainfallIntensity => "rainfall_intensity_mm_h",
            Series::Evapotranspiration => "evapotranspiration_mm_h",
            Series::WaterLevel => "zeta_mm",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Series::RainfallIntensity | Series::Evapotranspiration => "mm/h",
            Series::WaterLevel => "mm",
        }
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Series::RainfallIntensity => "rainfall intensity",
            Series::Evapotranspiration => "evapotranspiration",
            Series::WaterLevel => "water level",
        };
        f.write_str(name)
    }
}

/// A raw sample after timestamp normalization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimestampedSample {
    /// Seconds since 1970-01-01T00:00:00Z.
    pub epoch: i64,
    pub value: f64,
}

impl TimestampedSample {
    pub fn new(epoch: i64, value: f64) -> Self {
        Self { epoch, value }
    }
}

/// Rainfall intensity over one grid interval `[from_epoch, thru_epoch)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedRainfallInterval {
    pub from_epoch: i64,
    pub thru_epoch: i64,
    /// Intensity in mm/h.
    pub intensity: f64,
}

/// Water level interpolated at a grid point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedWaterLevel {
    pub epoch: i64,
    /// Level (zeta) in mm.
    pub level: f64,
}
