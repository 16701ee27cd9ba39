//! Processed CSV files to JSON arrays, with per-column rounding.
use log::{info, warn};
use serde_json::{Map, Number, Value};

use crate::config::{Paths, GEOJSON_REGIONS, PROCESSED_PROVINCES_CSV, PROCESSED_REGIONS_CSV};
use crate::error::Result;
use crate::loader::{self, Table};
use crate::output::{self, WriteReport};
use crate::util::{format_int, round_to};

/// A processed CSV, the JSON it becomes and the columns rounded on the way.
#[derive(Debug, Clone, Copy)]
pub struct Conversion {
    pub csv: &'static str,
    pub output: &'static str,
    pub round: &'static [(&'static str, u32)],
}

pub const CONVERSIONS: [Conversion; 8] = [
    Conversion {
        csv: "delitti_italia_normalizzato_2014_2023.csv",
        output: "delitti_italia.json",
        round: &[("Tasso_per_1000", 2)],
    },
    Conversion {
        csv: "delitti_totale_italia_2014_2023.csv",
        output: "delitti_totale_italia.json",
        round: &[],
    },
    Conversion {
        csv: "delitti_categorie_normalizzato_2014_2023.csv",
        output: "delitti_categorie.json",
        round: &[("Tasso_per_1000", 2)],
    },
    Conversion {
        csv: PROCESSED_REGIONS_CSV,
        output: "delitti_regioni.json",
        round: &[("Tasso_per_1000", 2)],
    },
    Conversion {
        csv: PROCESSED_PROVINCES_CSV,
        output: "delitti_province.json",
        round: &[("Tasso_per_1000", 2)],
    },
    Conversion {
        csv: "reati_allarme_sociale_2014_2023.csv",
        output: "reati_allarme_sociale.json",
        round: &[("Tasso_per_100k", 2)],
    },
    Conversion {
        csv: "percezione_vs_dati_2014_2023.csv",
        output: "percezione_vs_dati.json",
        round: &[("Tasso_per_1000", 2), ("Percezione_pct", 1)],
    },
    Conversion {
        csv: "popolazione_regioni_province_2014_2023.csv",
        output: "popolazione.json",
        round: &[],
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    Text,
}

impl ColumnType {
    /// The narrowest type that fits every non-empty cell. A column with no
    /// values at all is numeric (all nulls).
    pub fn infer<'a, I>(cells: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut kind = ColumnType::Integer;
        for cell in cells.into_iter().map(str::trim).filter(|c| !c.is_empty()) {
            if kind == ColumnType::Integer && cell.parse::<i64>().is_err() {
                kind = ColumnType::Float;
            }
            if kind == ColumnType::Float && cell.parse::<f64>().is_err() {
                return ColumnType::Text;
            }
        }
        kind
    }
}

fn cell_value(cell: &str, kind: ColumnType, decimals: Option<u32>) -> Value {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    match kind {
        ColumnType::Integer => trimmed
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or(Value::Null),
        ColumnType::Float => trimmed
            .parse::<f64>()
            .ok()
            .map(|v| decimals.map_or(v, |d| round_to(v, d)))
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ColumnType::Text => Value::String(cell.to_string()),
    }
}

/// Turn a table into flat JSON objects, keeping column order. Columns listed
/// in `round` are rounded when they exist and are floating point.
pub fn table_to_records(table: &Table, round: &[(&str, u32)]) -> Vec<Value> {
    let kinds: Vec<ColumnType> = (0..table.headers.len())
        .map(|i| {
            ColumnType::infer(
                table
                    .rows
                    .iter()
                    .map(|row| row.get(i).map(String::as_str).unwrap_or("")),
            )
        })
        .collect();
    let decimals: Vec<Option<u32>> = table
        .headers
        .iter()
        .map(|h| round.iter().find(|(col, _)| col == h).map(|(_, d)| *d))
        .collect();

    table
        .rows
        .iter()
        .map(|row| {
            let mut record = Map::new();
            for (i, header) in table.headers.iter().enumerate() {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                record.insert(header.clone(), cell_value(cell, kinds[i], decimals[i]));
            }
            Value::Object(record)
        })
        .collect()
}

/// Convert every configured CSV found under the processed directory and copy
/// the regional boundaries. Missing inputs are skipped with a warning.
pub fn convert_all(paths: &Paths) -> Result<Vec<WriteReport>> {
    info!("Source:  {}", paths.source_root.display());
    info!("Output:  {}", paths.output_dir().display());

    let mut written = Vec::new();
    for conversion in CONVERSIONS.iter() {
        let csv_path = paths.processed(conversion.csv);
        if !csv_path.exists() {
            warn!("SKIP  {} (not found)", conversion.csv);
            continue;
        }
        let table = loader::load_table(&csv_path)?;
        let records = table_to_records(&table, conversion.round);
        let report = output::write_json(&paths.output(conversion.output), &records)?;
        info!(
            "OK    {:<40} ({:>5} records, {:.1} KB)",
            conversion.output,
            format_int(report.records),
            report.size_kb
        );
        written.push(report);
    }

    let geojson_src = paths.geojson_src();
    if geojson_src.exists() {
        let report = output::copy_file(&geojson_src, &paths.output(GEOJSON_REGIONS))?;
        info!("OK    {:<40} (copy, {:.1} KB)", GEOJSON_REGIONS, report.size_kb);
        written.push(report);
    } else {
        warn!("SKIP  {GEOJSON_REGIONS} (not found)");
    }
    Ok(written)
}
