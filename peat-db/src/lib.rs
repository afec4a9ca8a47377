//! SQLite staging store and grid alignment for peatland water-table data.
//!
//! A load reads three CSV files (rainfall intensity, evapotranspiration and
//! water level), stages them as raw samples, derives a uniform time grid
//! from the rainfall record where it overlaps the water level record, and
//! writes rainfall intervals and interpolated water levels on that grid.
//! Everything happens inside one transaction; a failed load leaves the
//! database as it was.
//!
//! # Usage
//!
//! ```rust
//! use peat_core::LoadConfig;
//! use peat_db::{Database, LoadSources};
//!
//! let db = Database::new().unwrap();
//! let config = LoadConfig::default().with_time_zone("UTC");
//! db.load(
//!     &config,
//!     LoadSources {
//!         rainfall: "datetime,mm/h\n1970-01-01 00:00:00,0\n1970-01-01 01:00:00,5\n".as_bytes(),
//!         evapotranspiration: "datetime,mm/h\n1970-01-01 00:00:00,0.1\n".as_bytes(),
//!         water_level: "datetime,mm\n1970-01-01 00:00:00,-120\n1970-01-01 02:00:00,-100\n".as_bytes(),
//!     },
//! )
//! .unwrap();
//!
//! let grid = db.query_time_grid().unwrap().unwrap();
//! assert_eq!(grid.epochs(), &[0, 3600, 7200]);
//! assert_eq!(db.query_rainfall_intervals().unwrap().len(), 2);
//! ```
//!
//! # Tables
//!
//! See [`schema::create_schema`] for the full SQL schema.

mod loader;
pub mod models;
pub mod pipeline;
mod queries;
pub mod schema;
pub mod staging;

pub use models::{LoadSummary, StagingCounts};
pub use pipeline::{run_pipeline, LoadPipeline, LoadSources, PipelineStage};
pub use staging::StagingStore;

use peat_core::{LoadConfig, Result};
use rusqlite::Connection;
use std::cell::RefCell;
use std::io::Read;
use std::path::Path;
use std::rc::Rc;

/// Handle on a SQLite database holding staged and aligned series.
///
/// Cheaply cloneable (via `Rc`); clones share one connection.
#[derive(Clone)]
pub struct Database {
    conn: Rc<RefCell<Connection>>,
}

impl Database {
    /// Create a new in-memory database with the full schema applied.
    pub fn new() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Open or create a database file and apply the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(schema::create_schema())?;
        Ok(Self {
            conn: Rc::new(RefCell::new(conn)),
        })
    }

    /// Run a complete load in one transaction and commit it.
    ///
    /// On error the transaction is dropped and rolled back.
    pub fn load<R, E, W>(&self, config: &LoadConfig, sources: LoadSources<R, E, W>) -> Result<LoadSummary>
    where
        R: Read,
        E: Read,
        W: Read,
    {
        let mut conn = self.conn.borrow_mut();
        let tx = conn.transaction()?;
        let summary = run_pipeline(&tx, config, sources)?;
        tx.commit()?;
        log::info!("pipeline: {}", PipelineStage::Committed);
        Ok(summary)
    }
}
