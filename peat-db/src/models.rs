//! Result structs returned by loads and queries.
//!
//! All structs derive `Serialize` so the CLI can print them as JSON.

use serde::Serialize;

/// What a completed load wrote.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct LoadSummary {
    pub rainfall_samples: usize,
    pub evapotranspiration_samples: usize,
    pub water_level_samples: usize,
    /// Grid spacing in seconds.
    pub time_step_s: i64,
    /// Grid points, including the closing point.
    pub grid_points: usize,
    pub grid_start: i64,
    /// The closing point of the last rainfall interval.
    pub grid_end: i64,
    pub rainfall_intervals: usize,
    /// Staged rainfall samples that did not open a grid interval.
    pub rainfall_excluded: usize,
    pub water_levels: usize,
}

/// Row counts of the staging tables.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct StagingCounts {
    pub rainfall_intensity: usize,
    pub evapotranspiration: usize,
    pub water_level: usize,
}
