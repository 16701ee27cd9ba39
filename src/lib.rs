//! JSON artifacts for the crime-statistics frontend, built from the ISTAT
//! source files.
//!
//! Three pipelines, one per binary:
//! - [`convert`]: processed CSV files to JSON, plus the regional GeoJSON
//! - [`aggregate`]: per-100k rates of the social-alarm crimes
//! - [`persons`]: reported offenders and victims

// Modules
pub mod aggregate;
pub mod codes;
pub mod config;
pub mod convert;
pub mod error;
pub mod loader;
pub mod metrics;
pub mod output;
pub mod persons;
pub mod types;
pub mod util;

const DEFAULT_LOGGING_LEVEL: &str = "info";

/// Set RUST_LOG to `DEFAULT_LOGGING_LEVEL` if not set, then start the logger.
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", DEFAULT_LOGGING_LEVEL);
    }
    pretty_env_logger::init_timed();
}
