// Converts the processed CSV files of the source data tree into the JSON
// files read by the frontend, under `public/data/` of the current directory.
use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use std::path::PathBuf;

use osservatorio_report::config::{Paths, DEFAULT_SOURCE_ROOT};
use osservatorio_report::{convert, init_logging};

#[derive(Parser, Debug)]
#[command(name = "csv_to_json", about = "CSV -> JSON for the crime observatory")]
struct Cli {
    /// Path to the source data tree
    #[arg(default_value = DEFAULT_SOURCE_ROOT)]
    src: PathBuf,
}

fn main() -> Result<()> {
    init_logging();
    let args = Cli::parse();
    debug!("args: {args:?}");

    let paths = Paths::with_source(".", &args.src);
    let written = convert::convert_all(&paths)
        .with_context(|| format!("Failed to convert {}", args.src.display()))?;
    info!("Done: {} files written.", written.len());
    Ok(())
}
