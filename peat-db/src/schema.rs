//! SQL schema definitions for the staging and aligned tables.
//!
//! The schema is applied as a single batch when a database is opened.

use peat_core::{PeatError, Result};
use rusqlite::Connection;

/// Every table a load writes to, staging first.
pub const DATA_TABLES: [&str; 7] = [
    "rainfall_intensity_staging",
    "evapotranspiration_staging",
    "water_level_staging",
    "time_grid",
    "grid_time",
    "rainfall_intensity",
    "water_level",
];

/// Returns the full SQL schema as a single batch string.
///
/// **Staging tables** hold raw samples as loaded, duplicates included:
/// - `rainfall_intensity_staging` (epoch, mm/h)
/// - `evapotranspiration_staging` (epoch, mm/h)
/// - `water_level_staging` (epoch, zeta in mm)
///
/// **Aligned tables** are what downstream curve fitting reads:
/// - `time_grid` - the single grid step in seconds
/// - `grid_time` - grid epochs, including the closing point
/// - `rainfall_intensity` - one row per grid interval
/// - `water_level` - interpolated level at every grid point but the last
pub fn create_schema() -> &'static str {
    r#"
    CREATE TABLE IF NOT EXISTS rainfall_intensity_staging (
        epoch INTEGER NOT NULL,
        rainfall_intensity_mm_h REAL NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_rainfall_staging_epoch
        ON rainfall_intensity_staging(epoch);

    CREATE TABLE IF NOT EXISTS evapotranspiration_staging (
        epoch INTEGER NOT NULL,
        evapotranspiration_mm_h REAL NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_et_staging_epoch
        ON evapotranspiration_staging(epoch);

    CREATE TABLE IF NOT EXISTS water_level_staging (
        epoch INTEGER NOT NULL,
        zeta_mm REAL NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_water_level_staging_epoch
        ON water_level_staging(epoch);

    CREATE TABLE IF NOT EXISTS time_grid (
        id INTEGER PRIMARY KEY CHECK (id = 1),
        time_step_s INTEGER NOT NULL CHECK (time_step_s > 0)
    );

    CREATE TABLE IF NOT EXISTS grid_time (
        epoch INTEGER PRIMARY KEY
    );

    CREATE TABLE IF NOT EXISTS rainfall_intensity (
        from_epoch INTEGER PRIMARY KEY REFERENCES grid_time(epoch),
        thru_epoch INTEGER NOT NULL UNIQUE REFERENCES grid_time(epoch),
        rainfall_intensity_mm_h REAL NOT NULL,
        CHECK (thru_epoch > from_epoch)
    );

    CREATE TABLE IF NOT EXISTS water_level (
        epoch INTEGER PRIMARY KEY REFERENCES grid_time(epoch),
        zeta_mm REAL NOT NULL
    );
    "#
}

/// Fail with `StoreNotEmpty` if any data table already holds rows.
pub fn ensure_empty(conn: &Connection) -> Result<()> {
    for table in DATA_TABLES {
        let occupied: bool = conn.query_row(
            &format!("SELECT EXISTS (SELECT 1 FROM {})", table),
            [],
            |row| row.get(0),
        )?;
        if occupied {
            return Err(PeatError::StoreNotEmpty(table.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn schema_is_valid_sql() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(create_schema())
            .expect("Schema SQL should be valid");
    }

    #[test]
    fn schema_creates_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(create_schema()).unwrap();

        for table in &DATA_TABLES {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "Table '{}' should exist", table);
        }
    }

    #[test]
    fn schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(create_schema()).unwrap();
        conn.execute_batch(create_schema())
            .expect("Applying schema twice should succeed due to IF NOT EXISTS");
    }

    #[test]
    fn time_grid_holds_a_single_positive_step() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(create_schema()).unwrap();
        assert!(conn
            .execute("INSERT INTO time_grid (id, time_step_s) VALUES (1, 0)", [])
            .is_err());
        conn.execute("INSERT INTO time_grid (id, time_step_s) VALUES (1, 3600)", [])
            .unwrap();
        assert!(conn
            .execute("INSERT INTO time_grid (id, time_step_s) VALUES (2, 3600)", [])
            .is_err());
    }

    #[test]
    fn aligned_rows_must_reference_grid_points() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        conn.execute_batch(create_schema()).unwrap();
        assert!(conn
            .execute("INSERT INTO water_level (epoch, zeta_mm) VALUES (0, 1.0)", [])
            .is_err());
        conn.execute("INSERT INTO grid_time (epoch) VALUES (0)", []).unwrap();
        conn.execute("INSERT INTO water_level (epoch, zeta_mm) VALUES (0, 1.0)", [])
            .unwrap();
    }

    #[test]
    fn ensure_empty_reports_first_occupied_table() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(create_schema()).unwrap();
        ensure_empty(&conn).unwrap();
        conn.execute("INSERT INTO grid_time (epoch) VALUES (0)", []).unwrap();
        let err = ensure_empty(&conn).unwrap_err();
        assert!(matches!(err, PeatError::StoreNotEmpty(table) if table == "grid_time"));
    }
}
