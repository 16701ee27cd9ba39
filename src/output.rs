use log::{debug, log_enabled, Level};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

use crate::error::{ReportError, Result};
use crate::util::file_size_kb;

/// What was written where; only used for log lines.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteReport {
    pub path: PathBuf,
    pub records: usize,
    pub size_kb: f64,
}

impl WriteReport {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ReportError::io(parent, e))?;
    }
    Ok(())
}

/// Write `rows` as one compact JSON array (UTF-8, accents kept verbatim),
/// creating the destination directory if needed.
pub fn write_json<T: Serialize>(path: &Path, rows: &[T]) -> Result<WriteReport> {
    ensure_parent(path)?;
    let s = serde_json::to_string(rows)?;
    fs::write(path, s).map_err(|e| ReportError::io(path, e))?;
    Ok(WriteReport {
        path: path.to_path_buf(),
        records: rows.len(),
        size_kb: file_size_kb(path),
    })
}

/// Copy a file unchanged; the record count is 0.
pub fn copy_file(src: &Path, dst: &Path) -> Result<WriteReport> {
    ensure_parent(dst)?;
    fs::copy(src, dst).map_err(|e| ReportError::io(src, e))?;
    Ok(WriteReport {
        path: dst.to_path_buf(),
        records: 0,
        size_kb: file_size_kb(dst),
    })
}

/// Markdown preview of the first rows, at debug level.
pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    if !log_enabled!(Level::Debug) {
        return;
    }
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        debug!("(no rows)");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    debug!("\n{}\n", table_str);
}
