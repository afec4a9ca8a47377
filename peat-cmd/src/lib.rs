//! Command implementations for the peat CLI.
//!
//! Provides subcommands for loading raw CSV records into a database and for
//! inspecting what a load produced.

use clap::Subcommand;
use std::path::PathBuf;

pub mod load;
pub mod show;

#[derive(Subcommand)]
pub enum Command {
    /// Stage three CSV files, align them on a common time grid and commit
    Load {
        /// SQLite database file to load into (created if missing)
        #[arg(short = 'd', long)]
        db: PathBuf,

        /// Rainfall intensity CSV (datetime, mm/h)
        #[arg(short = 'r', long)]
        rainfall: PathBuf,

        /// Evapotranspiration CSV (datetime, mm/h)
        #[arg(short = 'e', long)]
        evapotranspiration: PathBuf,

        /// Water level CSV (datetime, mm)
        #[arg(short = 'w', long)]
        water_level: PathBuf,

        /// IANA time zone of the input timestamps, overrides the config file
        #[arg(short = 'z', long)]
        time_zone: Option<String>,

        /// JSON file with load settings
        #[arg(short = 'c', long)]
        config: Option<PathBuf>,
    },

    /// Print the time grid and aligned series held in a database
    Show {
        /// SQLite database file to read
        #[arg(short = 'd', long)]
        db: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Load {
            db,
            rainfall,
            evapotranspiration,
            water_level,
            time_zone,
            config,
        } => {
            let config = load::resolve_config(config.as_deref(), time_zone.as_deref())?;
            let inputs = load::LoadInputs {
                rainfall,
                evapotranspiration,
                water_level,
            };
            load::run_load(&db, &inputs, &config)
        }
        Command::Show { db, json } => show::run_show(&db, json),
    }
}
