use crate::error::{ReportError, Result};
use crate::types::{CrimeCount, Observation, PopulationRow, RawCrimeRow, TerritoryNameRow};
use crate::util::coerce_count;
use csv::{Reader, ReaderBuilder};
use log::debug;
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

pub const OBSERVATION_COLUMNS: [&str; 8] = [
    "REF_AREA",
    "DATA_TYPE",
    "TYPE_CRIME",
    "SEX",
    "AGE",
    "CITIZENSHIP",
    "TIME_PERIOD",
    "OBS_VALUE",
];

/// A delimited file read as text, for conversions that don't know its schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn open(path: &Path, delimiter: u8) -> Result<Reader<File>> {
    let file = File::open(path).map_err(|e| ReportError::io(path, e))?;
    Ok(ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(file))
}

fn require_columns(rdr: &mut Reader<File>, path: &Path, columns: &[&str]) -> Result<()> {
    let headers = rdr.headers()?;
    for column in columns {
        if !headers.iter().any(|h| h == *column) {
            return Err(ReportError::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

/// Load an offender/victim dataset (semicolon separated).
pub fn load_observations(path: &Path) -> Result<Vec<Observation>> {
    let mut rdr = open(path, b';')?;
    require_columns(&mut rdr, path, &OBSERVATION_COLUMNS)?;
    let rows = rdr
        .deserialize::<Observation>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    debug!("{}: {} rows", path.display(), rows.len());
    Ok(rows)
}

/// Load the raw reported-crimes dataset (semicolon separated). Counts that
/// don't parse are taken as zero.
pub fn load_crime_counts(path: &Path) -> Result<Vec<CrimeCount>> {
    let mut rdr = open(path, b';')?;
    require_columns(
        &mut rdr,
        path,
        &["REF_AREA", "TYPE_CRIME", "TIME_PERIOD", "Osservazione"],
    )?;
    let mut counts = Vec::new();
    for result in rdr.deserialize::<RawCrimeRow>() {
        let row = result?;
        counts.push(CrimeCount {
            count: coerce_count(row.value.as_deref()),
            ref_area: row.ref_area,
            type_crime: row.type_crime,
            year: row.year,
        });
    }
    debug!("{}: {} rows", path.display(), counts.len());
    Ok(counts)
}

/// Load population rows from a processed (comma separated) file.
pub fn load_population_rows(path: &Path) -> Result<Vec<PopulationRow>> {
    let mut rdr = open(path, b',')?;
    require_columns(
        &mut rdr,
        path,
        &["REF_AREA", "Territorio", "Anno", "Popolazione"],
    )?;
    let rows = rdr
        .deserialize::<PopulationRow>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// `REF_AREA -> Territorio` pairs, first occurrence of each code only.
pub fn load_territory_names(path: &Path) -> Result<Vec<(String, String)>> {
    let mut rdr = open(path, b',')?;
    require_columns(&mut rdr, path, &["REF_AREA", "Territorio"])?;
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for result in rdr.deserialize::<TerritoryNameRow>() {
        let row = result?;
        if seen.insert(row.ref_area.clone()) {
            names.push((row.ref_area, row.territorio));
        }
    }
    Ok(names)
}

/// Load any comma separated file as text cells.
pub fn load_table(path: &Path) -> Result<Table> {
    let mut rdr = open(path, b',')?;
    let headers = rdr.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(Table { headers, rows })
}
