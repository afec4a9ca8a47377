//! peat-cli - load peatland rainfall, evapotranspiration and water level
//! records onto a common time grid.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "peat-cli",
    version,
    about = "Peatland water-table data loader"
)]
struct Cli {
    #[command(subcommand)]
    command: peat_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("peat-cli {}", env!("CARGO_PKG_VERSION"));
    peat_cmd::run(cli.command)
}
