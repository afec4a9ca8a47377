//! Core types for loading peatland rainfall, evapotranspiration and water
//! level records onto a common time grid.

pub mod config;
pub mod error;
pub mod series;
pub mod timestamp;

pub use config::LoadConfig;
pub use error::{PeatError, Result};
pub use series::{AlignedRainfallInterval, AlignedWaterLevel, Series, TimestampedSample};
pub use timestamp::{TimestampNormalizer, TimestampedRecord, TimestampedRows};
