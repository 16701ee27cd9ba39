// Builds the regional and provincial social-alarm crime rates from the raw
// reported-crimes file.
use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use std::path::PathBuf;

use osservatorio_report::config::Paths;
use osservatorio_report::{aggregate, init_logging};

#[derive(Parser, Debug)]
#[command(
    name = "generate_allarme_regioni",
    about = "Social-alarm crimes per 100k inhabitants, by region and province"
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
    let written = aggregate::generate_all(&paths).context("Failed to generate crime rates")?;
    info!("Done: {} files written.", written.len());
    Ok(())
}
