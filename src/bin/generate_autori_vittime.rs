// Builds the reported offenders/victims artifacts: national trend, breakdown
// by crime and breakdown by province.
use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use std::path::PathBuf;

use osservatorio_report::config::Paths;
use osservatorio_report::{init_logging, persons};

#[derive(Parser, Debug)]
#[command(
    name = "generate_autori_vittime",
    about = "Reported offenders and victims by year, crime and province"
)]
struct Cli {
    /// Project root holding data/ and public/
    #[arg(default_value = ".")]
    root: PathBuf,
}

fn main() -> Result<()> {
    init_logging();
    let args = Cli::parse();
    debug!("args: {args:?}");

    let paths = Paths::from_project_root(&args.root);
    let written =
        persons::generate_all(&paths).context("Failed to generate offender/victim data")?;
    info!("Done: {} files written.", written.len());
    Ok(())
}
