//! Reported offenders and victims: national trend, breakdown by crime and
//! breakdown by province.
use log::{info, warn};
use std::collections::{BTreeMap, HashSet};

use crate::codes::{crime_label, is_province, region_name, TerritoryNames, NATIONAL_CODE};
use crate::config::{Paths, PROCESSED_PROVINCES_CSV, REFERENCE_YEAR};
use crate::error::Result;
use crate::loader;
use crate::metrics::extract_metrics;
use crate::output::{self, WriteReport};
use crate::types::{
    CrimeBreakdownRecord, DataType, Observation, ProvinceBreakdownRecord, TrendRecord,
};

pub const TOTAL_CRIME_CODE: &str = "TOT";

pub const TREND_OUTPUT: &str = "autori_vittime_trend.json";
pub const CRIMES_OUTPUT: &str = "autori_vittime_reati.json";
pub const PROVINCES_OUTPUT: &str = "autori_vittime_province.json";

/// National offender series over all crimes, one record per year. Years with
/// a zero total are kept.
pub fn national_trend(offenders: &[Observation]) -> Vec<TrendRecord> {
    let mut by_year: BTreeMap<i32, Vec<&Observation>> = BTreeMap::new();
    for obs in offenders
        .iter()
        .filter(|o| o.ref_area == NATIONAL_CODE && o.type_crime == TOTAL_CRIME_CODE)
    {
        by_year.entry(obs.year).or_default().push(obs);
    }
    by_year
        .into_iter()
        .map(|(anno, rows)| TrendRecord {
            anno,
            metrics: extract_metrics(rows),
        })
        .collect()
}

/// National breakdown by crime for `year`, excluding the all-crimes total.
/// Crimes with a zero total are skipped.
pub fn crime_breakdown(
    datasets: &[(DataType, &[Observation])],
    year: i32,
) -> Vec<CrimeBreakdownRecord> {
    let mut records = Vec::new();
    for (data_type, observations) in datasets {
        let mut by_crime: BTreeMap<&str, Vec<&Observation>> = BTreeMap::new();
        for obs in observations.iter().filter(|o| {
            o.ref_area == NATIONAL_CODE && o.year == year && o.type_crime != TOTAL_CRIME_CODE
        }) {
            by_crime.entry(obs.type_crime.as_str()).or_default().push(obs);
        }
        for (crime_code, rows) in by_crime {
            let metrics = extract_metrics(rows);
            if metrics.totale == 0 {
                continue;
            }
            records.push(CrimeBreakdownRecord {
                data_type: *data_type,
                codice_reato: crime_code.to_string(),
                reato: crime_label(crime_code),
                metrics,
            });
        }
    }
    records
}

/// Provincial breakdown by crime for `year`. Groups with a zero total are
/// skipped.
pub fn province_breakdown(
    datasets: &[(DataType, &[Observation])],
    year: i32,
    names: &TerritoryNames,
) -> Vec<ProvinceBreakdownRecord> {
    let mut records = Vec::new();
    for (data_type, observations) in datasets {
        let mut groups: BTreeMap<(&str, &str), Vec<&Observation>> = BTreeMap::new();
        for obs in observations
            .iter()
            .filter(|o| o.year == year && is_province(&o.ref_area))
        {
            groups
                .entry((obs.ref_area.as_str(), obs.type_crime.as_str()))
                .or_default()
                .push(obs);
        }
        for ((ref_area, crime_code), rows) in groups {
            let metrics = extract_metrics(rows);
            if metrics.totale == 0 {
                continue;
            }
            records.push(ProvinceBreakdownRecord {
                data_type: *data_type,
                ref_area: ref_area.to_string(),
                provincia: names.display_name(ref_area),
                regione: region_name(ref_area),
                codice_reato: crime_code.to_string(),
                reato: crime_label(crime_code),
                metrics,
            });
        }
    }
    records
}

fn count_type<'a, I>(data_types: I, wanted: DataType) -> usize
where
    I: IntoIterator<Item = &'a DataType>,
{
    data_types.into_iter().filter(|d| **d == wanted).count()
}

/// Inputs for the person-level artifacts; either dataset may be absent.
#[derive(Debug, Default)]
pub struct PersonData {
    pub offenders: Option<Vec<Observation>>,
    pub victims: Option<Vec<Observation>>,
}

impl PersonData {
    pub fn load(paths: &Paths) -> Result<Self> {
        let mut data = PersonData::default();
        for (data_type, path) in [
            (DataType::Offend, paths.offenders_csv()),
            (DataType::Victim, paths.victims_csv()),
        ] {
            if !path.exists() {
                warn!("SKIP  {data_type} dataset ({} not found)", path.display());
                continue;
            }
            info!("Reading {} ({data_type})...", path.display());
            let rows = loader::load_observations(&path)?;
            match data_type {
                DataType::Offend => data.offenders = Some(rows),
                DataType::Victim => data.victims = Some(rows),
            }
        }
        info!(
            "  OFFEND: {} rows, VICTIM: {} rows",
            crate::util::format_int(row_count(&data.offenders)),
            crate::util::format_int(row_count(&data.victims)),
        );
        Ok(data)
    }

    pub fn datasets(&self) -> Vec<(DataType, &[Observation])> {
        let mut out: Vec<(DataType, &[Observation])> = Vec::new();
        if let Some(rows) = &self.offenders {
            out.push((DataType::Offend, rows.as_slice()));
        }
        if let Some(rows) = &self.victims {
            out.push((DataType::Victim, rows.as_slice()));
        }
        out
    }
}

fn row_count(rows: &Option<Vec<Observation>>) -> usize {
    rows.as_ref().map_or(0, Vec::len)
}

/// Write the three person-level artifacts that the available inputs allow.
pub fn generate_all(paths: &Paths) -> Result<Vec<WriteReport>> {
    let names = TerritoryNames::load(&paths.processed(PROCESSED_PROVINCES_CSV))?;
    info!("Mapped territories: {}", names.mapped_count());

    let data = PersonData::load(paths)?;
    let mut written = Vec::new();

    match &data.offenders {
        Some(offenders) => {
            let records = national_trend(offenders);
            let report = output::write_json(&paths.output(TREND_OUTPUT), &records)?;
            info!(
                "OK  {:<45} ({} years, {:.1} KB)",
                report.file_name(),
                records.len(),
                report.size_kb
            );
            output::preview_table_rows(&records, 5);
            written.push(report);
        }
        None => warn!("SKIP  {TREND_OUTPUT} (no OFFEND dataset)"),
    }

    let datasets = data.datasets();
    if datasets.is_empty() {
        warn!("SKIP  {CRIMES_OUTPUT}, {PROVINCES_OUTPUT} (no input datasets)");
        return Ok(written);
    }

    let records = crime_breakdown(&datasets, REFERENCE_YEAR);
    let report = output::write_json(&paths.output(CRIMES_OUTPUT), &records)?;
    info!(
        "OK  {:<45} ({} OFFEND + {} VICTIM, {:.1} KB)",
        report.file_name(),
        count_type(records.iter().map(|r| &r.data_type), DataType::Offend),
        count_type(records.iter().map(|r| &r.data_type), DataType::Victim),
        report.size_kb
    );
    output::preview_table_rows(&records, 5);
    written.push(report);

    let records = province_breakdown(&datasets, REFERENCE_YEAR, &names);
    let report = output::write_json(&paths.output(PROVINCES_OUTPUT), &records)?;
    let provinces: HashSet<&str> = records.iter().map(|r| r.ref_area.as_str()).collect();
    info!(
        "OK  {:<45} ({} provinces, {} OFFEND + {} VICTIM, {:.1} KB)",
        report.file_name(),
        provinces.len(),
        count_type(records.iter().map(|r| &r.data_type), DataType::Offend),
        count_type(records.iter().map(|r| &r.data_type), DataType::Victim),
        report.size_kb
    );
    output::preview_table_rows(&records, 5);
    written.push(report);

    Ok(written)
}
