//! Per-100k rates of the social-alarm crimes by region and by province.
use log::{info, warn};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::Path;

use crate::codes::{
    crime_label, region_name, TerritoryNames, AUTONOMOUS_PROVINCE_CODES, MERGED_REGION_CODE,
};
use crate::config::{Paths, PROCESSED_PROVINCES_CSV, PROCESSED_REGIONS_CSV};
use crate::error::Result;
use crate::loader;
use crate::output::{self, WriteReport};
use crate::types::{CrimeCount, PopulationRow, ProvinceRateRow, RegionRateRow};
use crate::util::round_to;

pub const ALARM_CRIME_CODES: [&str; 6] =
    ["INTENHOM", "ATTEMPHOM", "RAPE", "RAPEUN18", "KIDNAPP", "HOUSEROB"];

/// Regional codes in the raw file: 19 regions plus the two autonomous
/// provinces that are summed into the merged region.
pub const RAW_REGION_CODES: [&str; 21] = [
    "ITC1", "ITC2", "ITC3", "ITC4", "ITD1", "ITD2", "ITD3", "ITD4", "ITD5", "ITE1", "ITE2",
    "ITE3", "ITE4", "ITF1", "ITF2", "ITF3", "ITF4", "ITF5", "ITF6", "ITG1", "ITG2",
];

pub const REGIONS_OUTPUT: &str = "reati_allarme_sociale_regioni.json";
pub const PROVINCES_OUTPUT: &str = "reati_allarme_sociale_province.json";

const RATE_BASE: f64 = 100_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PopulationEntry {
    pub territorio: String,
    pub regione: Option<String>,
    pub popolazione: Option<u64>,
}

/// Population by (territory, year). Exact key match; the first row seen for
/// a key wins.
#[derive(Debug, Clone, Default)]
pub struct PopulationLookup {
    entries: HashMap<(String, i32), PopulationEntry>,
}

impl PopulationLookup {
    pub fn from_rows(rows: Vec<PopulationRow>) -> Self {
        let mut entries = HashMap::new();
        for row in rows {
            entries
                .entry((row.ref_area, row.anno))
                .or_insert_with(|| PopulationEntry {
                    territorio: row.territorio,
                    regione: row.regione,
                    popolazione: row.popolazione.filter(|p| *p >= 0.0).map(|p| p.round() as u64),
                });
        }
        PopulationLookup { entries }
    }

    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self::from_rows(loader::load_population_rows(path)?))
    }

    pub fn get(&self, ref_area: &str, year: i32) -> Option<&PopulationEntry> {
        self.entries.get(&(ref_area.to_string(), year))
    }

    /// Every territory code present in the lookup.
    pub fn codes(&self) -> HashSet<String> {
        self.entries.keys().map(|(code, _)| code.clone()).collect()
    }
}

/// `count / population * 100000` rounded to two decimals; `None` without a
/// positive population.
pub fn rate_per_100k(count: i64, population: Option<u64>) -> Option<f64> {
    population
        .filter(|p| *p > 0)
        .map(|p| round_to(count as f64 / p as f64 * RATE_BASE, 2))
}

/// Keep the rows of the given crimes and territories.
pub fn filter_counts<F>(counts: &[CrimeCount], crimes: &[&str], keep_area: F) -> Vec<CrimeCount>
where
    F: Fn(&str) -> bool,
{
    counts
        .iter()
        .filter(|c| {
            crimes.iter().any(|code| *code == c.type_crime) && keep_area(c.ref_area.as_str())
        })
        .cloned()
        .collect()
}

/// Relabel the two autonomous provinces as the merged region. Summing happens
/// in [`sum_counts`], before any rate is computed.
pub fn merge_autonomous_provinces(counts: Vec<CrimeCount>) -> Vec<CrimeCount> {
    counts
        .into_iter()
        .map(|mut c| {
            if AUTONOMOUS_PROVINCE_CODES.iter().any(|code| *code == c.ref_area) {
                c.ref_area = MERGED_REGION_CODE.to_string();
            }
            c
        })
        .collect()
}

/// Group-sum counts by (territory, crime, year).
pub fn sum_counts(counts: Vec<CrimeCount>) -> Vec<CrimeCount> {
    let mut sums: BTreeMap<(String, String, i32), i64> = BTreeMap::new();
    for c in counts {
        *sums.entry((c.ref_area, c.type_crime, c.year)).or_default() += c.count;
    }
    sums.into_iter()
        .map(|((ref_area, type_crime, year), count)| CrimeCount {
            ref_area,
            type_crime,
            year,
            count,
        })
        .collect()
}

/// One row per region, crime and year, sorted by (crime, territory, year).
pub fn region_rates(
    counts: &[CrimeCount],
    population: &PopulationLookup,
    names: &TerritoryNames,
) -> Vec<RegionRateRow> {
    let filtered = filter_counts(counts, &ALARM_CRIME_CODES, |area| {
        RAW_REGION_CODES.iter().any(|code| *code == area)
    });
    let mut rows: Vec<RegionRateRow> = sum_counts(merge_autonomous_provinces(filtered))
        .into_iter()
        .map(|c| {
            let pop = population.get(&c.ref_area, c.year);
            let popolazione = pop.and_then(|p| p.popolazione);
            RegionRateRow {
                territorio: pop
                    .map(|p| p.territorio.clone())
                    .unwrap_or_else(|| names.display_name(&c.ref_area)),
                reato: crime_label(&c.type_crime),
                tasso_per_100k: rate_per_100k(c.count, popolazione),
                popolazione,
                anno: c.year,
                delitti: c.count,
                ref_area: c.ref_area,
            }
        })
        .collect();
    rows.sort_by(|a, b| {
        (&a.reato, &a.territorio, a.anno).cmp(&(&b.reato, &b.territorio, b.anno))
    });
    rows
}

/// Raw rows of the alarm crimes for the provinces of the lookup, not yet summed.
pub fn province_counts(counts: &[CrimeCount], population: &PopulationLookup) -> Vec<CrimeCount> {
    let province_codes = population.codes();
    filter_counts(counts, &ALARM_CRIME_CODES, |area| province_codes.contains(area))
}

/// One row per province, crime and year for every province of the lookup,
/// sorted by (crime, region, territory, year).
pub fn province_rates(counts: &[CrimeCount], population: &PopulationLookup) -> Vec<ProvinceRateRow> {
    province_rows(province_counts(counts, population), population)
}

/// Sum the output of [`province_counts`] and join the population.
pub fn province_rows(filtered: Vec<CrimeCount>, population: &PopulationLookup) -> Vec<ProvinceRateRow> {
    let mut rows: Vec<ProvinceRateRow> = sum_counts(filtered)
        .into_iter()
        .map(|c| {
            let pop = population.get(&c.ref_area, c.year);
            let popolazione = pop.and_then(|p| p.popolazione);
            ProvinceRateRow {
                territorio: pop
                    .map(|p| p.territorio.clone())
                    .unwrap_or_else(|| c.ref_area.clone()),
                regione: pop
                    .and_then(|p| p.regione.clone())
                    .unwrap_or_else(|| region_name(&c.ref_area)),
                reato: crime_label(&c.type_crime),
                tasso_per_100k: rate_per_100k(c.count, popolazione),
                popolazione,
                anno: c.year,
                delitti: c.count,
                ref_area: c.ref_area,
            }
        })
        .collect();
    rows.sort_by(|a, b| {
        (&a.reato, &a.regione, &a.territorio, a.anno)
            .cmp(&(&b.reato, &b.regione, &b.territorio, b.anno))
    });
    rows
}

fn log_written(
    report: &WriteReport,
    territories: BTreeSet<&str>,
    crimes: BTreeSet<&str>,
    years: BTreeSet<i32>,
    kind: &str,
) {
    info!(
        "OK    {:<40} ({} records, {:.1} KB) - {} {kind}, {} crimes, {} years",
        report.file_name(),
        crate::util::format_int(report.records),
        report.size_kb,
        territories.len(),
        crimes.len(),
        years.len(),
    );
}

fn warn_missing_population(missing: usize, kind: &str) {
    if missing > 0 {
        warn!("WARNING {kind}: {missing} records without population!");
    }
}

/// Write the regional artifact. Returns `None` when the population file is
/// missing.
pub fn generate_regions(counts: &[CrimeCount], paths: &Paths) -> Result<Option<WriteReport>> {
    let pop_csv = paths.processed(PROCESSED_REGIONS_CSV);
    if !pop_csv.exists() {
        warn!("SKIP  {REGIONS_OUTPUT} ({} not found)", pop_csv.display());
        return Ok(None);
    }
    let population = PopulationLookup::load(&pop_csv)?;
    let rows = region_rates(counts, &population, &TerritoryNames::builtin());

    let report = output::write_json(&paths.output(REGIONS_OUTPUT), &rows)?;
    log_written(
        &report,
        rows.iter().map(|r| r.territorio.as_str()).collect(),
        rows.iter().map(|r| r.reato.as_str()).collect(),
        rows.iter().map(|r| r.anno).collect(),
        "regions",
    );
    output::preview_table_rows(&rows, 5);
    warn_missing_population(rows.iter().filter(|r| r.popolazione.is_none()).count(), "regions");
    Ok(Some(report))
}

/// Write the provincial artifact. Returns `None` when the population file is
/// missing.
pub fn generate_provinces(counts: &[CrimeCount], paths: &Paths) -> Result<Option<WriteReport>> {
    let pop_csv = paths.processed(PROCESSED_PROVINCES_CSV);
    if !pop_csv.exists() {
        warn!("SKIP  {PROVINCES_OUTPUT} ({} not found)", pop_csv.display());
        return Ok(None);
    }
    let population = PopulationLookup::load(&pop_csv)?;
    let filtered = province_counts(counts, &population);
    info!("Filtered records (crimes x provinces): {}", filtered.len());
    let rows = province_rows(filtered, &population);

    let report = output::write_json(&paths.output(PROVINCES_OUTPUT), &rows)?;
    log_written(
        &report,
        rows.iter().map(|r| r.territorio.as_str()).collect(),
        rows.iter().map(|r| r.reato.as_str()).collect(),
        rows.iter().map(|r| r.anno).collect(),
        "provinces",
    );
    output::preview_table_rows(&rows, 5);
    warn_missing_population(
        rows.iter().filter(|r| r.popolazione.is_none()).count(),
        "provinces",
    );
    Ok(Some(report))
}

/// Both artifacts from the raw crime file; a missing raw file skips both.
pub fn generate_all(paths: &Paths) -> Result<Vec<WriteReport>> {
    let raw_csv = paths.raw_crimes_csv();
    if !raw_csv.exists() {
        warn!("SKIP  {REGIONS_OUTPUT}, {PROVINCES_OUTPUT} ({} not found)", raw_csv.display());
        return Ok(Vec::new());
    }
    info!("Reading {}", raw_csv.display());
    let counts = loader::load_crime_counts(&raw_csv)?;

    let mut written = Vec::new();
    written.extend(generate_regions(&counts, paths)?);
    written.extend(generate_provinces(&counts, paths)?);
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(area: &str, crime: &str, year: i32, n: i64) -> CrimeCount {
        CrimeCount {
            ref_area: area.to_string(),
            type_crime: crime.to_string(),
            year,
            count: n,
        }
    }

    fn pop(area: &str, name: &str, region: Option<&str>, year: i32, n: f64) -> PopulationRow {
        PopulationRow {
            ref_area: area.to_string(),
            territorio: name.to_string(),
            regione: region.map(str::to_string),
            anno: year,
            popolazione: Some(n),
        }
    }

    #[test]
    fn rate_is_per_hundred_thousand() {
        assert_eq!(rate_per_100k(150, Some(300_000)), Some(50.0));
        assert_eq!(rate_per_100k(1, Some(3)), Some(33333.33));
        assert_eq!(rate_per_100k(10, None), None);
        assert_eq!(rate_per_100k(10, Some(0)), None);
    }

    #[test]
    fn rate_ties_round_to_even() {
        assert_eq!(rate_per_100k(1, Some(800_000)), Some(0.12));
    }

    #[test]
    fn autonomous_provinces_merge_before_the_rate() {
        let counts = vec![
            count("ITD1", "RAPE", 2020, 100),
            count("ITD2", "RAPE", 2020, 50),
        ];
        let population = PopulationLookup::from_rows(vec![pop(
            "ITD12",
            "Trentino-Alto Adige",
            None,
            2020,
            300_000.0,
        )]);
        let rows = region_rates(&counts, &population, &TerritoryNames::builtin());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ref_area, "ITD12");
        assert_eq!(rows[0].delitti, 150);
        assert_eq!(rows[0].tasso_per_100k, Some(50.0));
    }

    #[test]
    fn other_crimes_and_territories_are_left_out() {
        let counts = vec![
            count("ITC1", "THEFT", 2020, 1000),
            count("ITC11", "RAPE", 2020, 10),
            count("ITC1", "RAPE", 2020, 20),
        ];
        let rows = region_rates(&counts, &PopulationLookup::default(), &TerritoryNames::builtin());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].delitti, 20);
    }

    #[test]
    fn missing_population_gives_null_rate_and_a_fallback_name() {
        let counts = vec![count("ITC1", "KIDNAPP", 2015, 7)];
        let rows = region_rates(&counts, &PopulationLookup::default(), &TerritoryNames::builtin());
        assert_eq!(rows[0].territorio, "Piemonte");
        assert_eq!(rows[0].popolazione, None);
        assert_eq!(rows[0].tasso_per_100k, None);
        let json = serde_json::to_value(&rows[0]).unwrap();
        assert!(json["Tasso_per_100k"].is_null());
    }

    #[test]
    fn region_rows_sort_by_crime_then_territory_then_year() {
        let counts = vec![
            count("ITG1", "RAPE", 2021, 1),
            count("ITC1", "RAPE", 2021, 1),
            count("ITE4", "RAPE", 2020, 1),
            count("ITC1", "RAPE", 2020, 1),
            count("ITG1", "RAPE", 2020, 1),
            count("ITE4", "RAPE", 2021, 1),
            count("ITC1", "INTENHOM", 2021, 1),
        ];
        let rows = region_rates(&counts, &PopulationLookup::default(), &TerritoryNames::builtin());
        let order: Vec<(&str, &str, i32)> = rows
            .iter()
            .map(|r| (r.reato.as_str(), r.territorio.as_str(), r.anno))
            .collect();
        assert_eq!(
            order,
            vec![
                ("Omicidi volontari consumati", "Piemonte", 2021),
                ("Violenze sessuali", "Lazio", 2020),
                ("Violenze sessuali", "Lazio", 2021),
                ("Violenze sessuali", "Piemonte", 2020),
                ("Violenze sessuali", "Piemonte", 2021),
                ("Violenze sessuali", "Sicilia", 2020),
                ("Violenze sessuali", "Sicilia", 2021),
            ]
        );
    }

    #[test]
    fn provinces_come_from_the_population_lookup() {
        let counts = vec![
            count("ITC11", "HOUSEROB", 2020, 30),
            count("IT108", "HOUSEROB", 2020, 12),
            count("ITC1", "HOUSEROB", 2020, 99),
        ];
        let population = PopulationLookup::from_rows(vec![
            pop("ITC11", "Torino", Some("Piemonte"), 2020, 2_200_000.0),
            pop("IT108", "Monza e della Brianza", Some("Lombardia"), 2020, 870_000.0),
        ]);
        let rows = province_rates(&counts, &population);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].regione, "Lombardia");
        assert_eq!(rows[0].ref_area, "IT108");
        assert_eq!(rows[1].territorio, "Torino");
        assert_eq!(rows[1].tasso_per_100k, Some(1.36));
    }

    #[test]
    fn province_counts_are_taken_before_summing() {
        let counts = vec![
            count("ITC11", "HOUSEROB", 2020, 20),
            count("ITC11", "HOUSEROB", 2020, 10),
            count("ITC11", "THEFT", 2020, 7),
            count("ITC12", "HOUSEROB", 2020, 5),
        ];
        let population = PopulationLookup::from_rows(vec![pop(
            "ITC11",
            "Torino",
            Some("Piemonte"),
            2020,
            2_200_000.0,
        )]);
        let filtered = province_counts(&counts, &population);
        assert_eq!(filtered.len(), 2);

        let rows = province_rows(filtered, &population);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].delitti, 30);
    }

    #[test]
    fn missing_raw_file_skips_both_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::from_project_root(dir.path());
        let written = generate_all(&paths).unwrap();
        assert!(written.is_empty());
        assert!(!paths.output(REGIONS_OUTPUT).exists());
    }

    #[test]
    fn both_artifacts_are_written_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::from_project_root(dir.path());
        std::fs::create_dir_all(paths.raw_dir()).unwrap();
        std::fs::create_dir_all(paths.processed_dir()).unwrap();
        std::fs::write(
            paths.raw_crimes_csv(),
            "REF_AREA;TYPE_CRIME;TIME_PERIOD;Osservazione\n\
             ITD1;RAPE;2020;100\nITD2;RAPE;2020;50\nITC11;RAPE;2020;22\n",
        )
        .unwrap();
        std::fs::write(
            paths.processed(PROCESSED_REGIONS_CSV),
            "REF_AREA,Territorio,Anno,Popolazione,Tasso_per_1000\n\
             ITD12,Trentino-Alto Adige,2020,300000,1.0\nITD12,Trentino-Alto Adige,2020,300000,2.0\n",
        )
        .unwrap();
        std::fs::write(
            paths.processed(PROCESSED_PROVINCES_CSV),
            "REF_AREA,Territorio,Regione,Anno,Popolazione\nITC11,Torino,Piemonte,2020,2200000\n",
        )
        .unwrap();

        let written = generate_all(&paths).unwrap();
        assert_eq!(written.len(), 2);

        let regions: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(paths.output(REGIONS_OUTPUT)).unwrap())
                .unwrap();
        assert_eq!(regions.as_array().unwrap().len(), 1);
        assert_eq!(regions[0]["Delitti"], 150);
        assert_eq!(regions[0]["Tasso_per_100k"], 50.0);

        let provinces: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(paths.output(PROVINCES_OUTPUT)).unwrap(),
        )
        .unwrap();
        assert_eq!(provinces[0]["Territorio"], "Torino");
        assert_eq!(provinces[0]["Regione"], "Piemonte");
    }
}
