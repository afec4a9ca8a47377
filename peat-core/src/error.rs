/// Error types for loading and aligning peatland time series
use crate::series::Series;
use thiserror::Error;

/// Main error type for staging and grid alignment
#[derive(Error, Debug)]
pub enum PeatError {
    /// Input file header does not start with a `datetime` column
    #[error("Unexpected header for {series} data: first column is {found:?}, expected \"datetime...\"")]
    HeaderMismatch { series: Series, found: String },

    /// Timestamp text could not be turned into a whole-second epoch
    #[error("Invalid timestamp {text:?}: {reason}")]
    InvalidTimestamp { text: String, reason: String },

    /// Value column is missing or not a number
    #[error("Invalid {series} value {text:?} on line {line}")]
    InvalidValue {
        series: Series,
        line: u64,
        text: String,
    },

    /// Rainfall epochs inside the overlap window are not evenly spaced
    #[error("Nonuniform time steps in rainfall data: {steps:?} s")]
    NonuniformTimeStep { steps: Vec<i64> },

    /// Only one rainfall epoch falls inside the overlap window
    #[error("Cannot determine time step from a single rainfall epoch ({epoch})")]
    UndeterminedTimeStep { epoch: i64 },

    /// Rainfall and water level series do not overlap
    #[error("No overlap between rainfall and water level data: {0}")]
    EmptyOverlap(String),

    /// A series holds more than one sample at an epoch used for alignment
    #[error("Duplicate {series} samples at epoch {epoch}")]
    DuplicateEpoch { series: Series, epoch: i64 },

    /// Configured time zone is not a known IANA zone name
    #[error("Unknown time zone: {0}")]
    UnknownTimeZone(String),

    /// Target store already holds staged or aligned rows
    #[error("Store already contains data in table {0}")]
    StoreNotEmpty(String),

    /// Pipeline stage invoked before its predecessor completed
    #[error("Pipeline stage out of order: expected {expected}, currently {actual}")]
    OutOfOrder { expected: String, actual: String },

    /// SQLite failure
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Failed to parse CSV data
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Failed to read input
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for Results using PeatError
pub type Result<T> = std::result::Result<T, PeatError>;
