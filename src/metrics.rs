//! Total, foreign and minor counts for one (crime, year, territory) slice.
//!
//! The source publishes two layouts:
//! - 2022+: full matrix (SEX=9, AGE=TOTAL/Y_UN17, CITIZENSHIP=TOTAL/FRG/ITL)
//! - 2007-2021: partial matrix (SEX=9 only has CITIZENSHIP=FRG/ITL, no TOTAL;
//!   AGE=Y_UN17 missing for some crimes)
//!
//! Each count is resolved by trying a fixed list of strategies in order; the
//! first one with a positive sum wins. FRG + ITL reconciles with TOTAL where
//! both exist (2022: 270567 + 548265 = 818832).
use serde::Serialize;
use tabled::Tabled;

use crate::types::{display_option, Observation};
use crate::util::percentage;

pub mod dims {
    pub const SEX_BOTH: &str = "9";
    pub const AGE_ALL: &str = "TOTAL";
    pub const AGE_UNDER_18: &str = "Y_UN17";
    pub const CITIZENSHIP_ALL: &str = "TOTAL";
    pub const CITIZENSHIP_FOREIGN: &str = "FRG";
    pub const CITIZENSHIP_ITALIAN: &str = "ITL";
}

/// A named way of reading one count out of a slice: the sum of the rows with
/// the given age band and any of the given citizenship bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountStrategy {
    pub name: &'static str,
    pub age: &'static str,
    pub citizenships: &'static [&'static str],
}

impl CountStrategy {
    pub fn sum<'a, I>(&self, rows: I) -> f64
    where
        I: IntoIterator<Item = &'a Observation>,
    {
        rows.into_iter()
            .filter(|r| {
                r.age == self.age && self.citizenships.iter().any(|c| *c == r.citizenship)
            })
            .filter_map(|r| r.value)
            .sum()
    }

    /// `None` when the breakdown is absent from the slice.
    pub fn try_sum<'a, I>(&self, rows: I) -> Option<f64>
    where
        I: IntoIterator<Item = &'a Observation>,
    {
        Some(self.sum(rows)).filter(|v| *v > 0.0)
    }
}

pub const TOTAL_DIRECT: CountStrategy = CountStrategy {
    name: "total:direct",
    age: dims::AGE_ALL,
    citizenships: &[dims::CITIZENSHIP_ALL],
};

pub const TOTAL_BY_CITIZENSHIP: CountStrategy = CountStrategy {
    name: "total:foreign+italian",
    age: dims::AGE_ALL,
    citizenships: &[dims::CITIZENSHIP_FOREIGN, dims::CITIZENSHIP_ITALIAN],
};

pub const FOREIGN: CountStrategy = CountStrategy {
    name: "foreign",
    age: dims::AGE_ALL,
    citizenships: &[dims::CITIZENSHIP_FOREIGN],
};

pub const MINOR_DIRECT: CountStrategy = CountStrategy {
    name: "minor:direct",
    age: dims::AGE_UNDER_18,
    citizenships: &[dims::CITIZENSHIP_ALL],
};

pub const MINOR_BY_CITIZENSHIP: CountStrategy = CountStrategy {
    name: "minor:foreign+italian",
    age: dims::AGE_UNDER_18,
    citizenships: &[dims::CITIZENSHIP_FOREIGN, dims::CITIZENSHIP_ITALIAN],
};

pub const TOTAL_CHAIN: [CountStrategy; 2] = [TOTAL_DIRECT, TOTAL_BY_CITIZENSHIP];
pub const MINOR_CHAIN: [CountStrategy; 2] = [MINOR_DIRECT, MINOR_BY_CITIZENSHIP];

/// Value of the first strategy in `chain` that finds data, with its name.
pub fn resolve(chain: &[CountStrategy], rows: &[&Observation]) -> Option<(f64, &'static str)> {
    chain
        .iter()
        .find_map(|s| s.try_sum(rows.iter().copied()).map(|v| (v, s.name)))
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct Metrics {
    pub totale: i64,
    pub stranieri: i64,
    pub minori: i64,
    pub pct_stranieri: f64,
    /// `None` when the slice has no minor-age breakdown at all.
    #[tabled(display_with = "display_option")]
    pub pct_minori: Option<f64>,
}

/// Compute the metrics of a slice already filtered to one crime, year and
/// territory. Only rows for both sexes combined are considered.
///
/// Foreign count is always read from AGE=TOTAL, CITIZENSHIP=FRG, whichever
/// strategy produced the total, so with inconsistent source data it may not
/// reconcile with a direct total.
pub fn extract_metrics<'a, I>(rows: I) -> Metrics
where
    I: IntoIterator<Item = &'a Observation>,
{
    let both_sexes: Vec<&Observation> = rows
        .into_iter()
        .filter(|r| r.sex == dims::SEX_BOTH)
        .collect();

    let total = resolve(&TOTAL_CHAIN, &both_sexes).map_or(0.0, |(v, _)| v);
    let foreign = FOREIGN.sum(both_sexes.iter().copied());
    let minor = resolve(&MINOR_CHAIN, &both_sexes).map(|(v, _)| v);

    Metrics {
        totale: total as i64,
        stranieri: foreign as i64,
        minori: minor.unwrap_or(0.0) as i64,
        pct_stranieri: percentage(foreign, total),
        pct_minori: minor.map(|m| percentage(m, total)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(sex: &str, age: &str, citizenship: &str, value: f64) -> Observation {
        Observation {
            ref_area: "IT".to_string(),
            type_crime: "TOT".to_string(),
            sex: sex.to_string(),
            age: age.to_string(),
            citizenship: citizenship.to_string(),
            year: 2022,
            value: Some(value),
        }
    }

    #[test]
    fn full_matrix_uses_the_direct_total() {
        let rows = vec![
            obs("9", "TOTAL", "TOTAL", 818832.0),
            obs("9", "TOTAL", "FRG", 270567.0),
            obs("9", "TOTAL", "ITL", 548265.0),
            obs("9", "Y_UN17", "TOTAL", 40000.0),
            obs("1", "TOTAL", "TOTAL", 700000.0),
        ];
        let m = extract_metrics(&rows);
        assert_eq!(m.totale, 818832);
        assert_eq!(m.stranieri, 270567);
        assert_eq!(m.minori, 40000);
        assert_eq!(m.pct_stranieri, 33.0);
        assert_eq!(m.pct_minori, Some(4.9));
    }

    #[test]
    fn missing_direct_total_falls_back_to_foreign_plus_italian() {
        let rows = vec![
            obs("9", "TOTAL", "FRG", 30.0),
            obs("9", "TOTAL", "ITL", 70.0),
        ];
        let refs: Vec<&Observation> = rows.iter().collect();
        assert_eq!(resolve(&TOTAL_CHAIN, &refs), Some((100.0, "total:foreign+italian")));

        let m = extract_metrics(&rows);
        assert_eq!(m.totale, 100);
        assert_eq!(m.stranieri, 30);
        assert_eq!(m.pct_stranieri, 30.0);
    }

    #[test]
    fn zero_direct_total_also_falls_back() {
        let rows = vec![
            obs("9", "TOTAL", "TOTAL", 0.0),
            obs("9", "TOTAL", "FRG", 5.0),
            obs("9", "TOTAL", "ITL", 15.0),
        ];
        assert_eq!(extract_metrics(&rows).totale, 20);
    }

    #[test]
    fn minors_fall_back_to_citizenship_breakdown() {
        let rows = vec![
            obs("9", "TOTAL", "TOTAL", 200.0),
            obs("9", "Y_UN17", "FRG", 4.0),
            obs("9", "Y_UN17", "ITL", 6.0),
        ];
        let m = extract_metrics(&rows);
        assert_eq!(m.minori, 10);
        assert_eq!(m.pct_minori, Some(5.0));
    }

    #[test]
    fn no_minor_rows_means_null_percentage_not_zero() {
        let rows = vec![
            obs("9", "TOTAL", "TOTAL", 200.0),
            obs("9", "TOTAL", "FRG", 50.0),
        ];
        let m = extract_metrics(&rows);
        assert_eq!(m.minori, 0);
        assert_eq!(m.pct_minori, None);
        let json = serde_json::to_value(&m).unwrap();
        assert!(json["pct_minori"].is_null());
    }

    #[test]
    fn empty_slice_yields_zeroes_and_null_minor_percentage() {
        let m = extract_metrics(&Vec::<Observation>::new());
        assert_eq!(
            m,
            Metrics {
                totale: 0,
                stranieri: 0,
                minori: 0,
                pct_stranieri: 0.0,
                pct_minori: None,
            }
        );
    }

    #[test]
    fn foreign_is_read_independently_of_the_total_path() {
        // inconsistent source: FRG + ITL != TOTAL, kept as published
        let rows = vec![
            obs("9", "TOTAL", "TOTAL", 100.0),
            obs("9", "TOTAL", "FRG", 40.0),
            obs("9", "TOTAL", "ITL", 80.0),
        ];
        let m = extract_metrics(&rows);
        assert_eq!(m.totale, 100);
        assert_eq!(m.stranieri, 40);
    }

    #[test]
    fn pct_foreign_stays_within_bounds_and_matches_the_rounded_ratio() {
        for (foreign, italian) in [(1.0, 2.0), (0.0, 9.0), (7.0, 0.0), (123.0, 4567.0)] {
            let rows = vec![
                obs("9", "TOTAL", "FRG", foreign),
                obs("9", "TOTAL", "ITL", italian),
            ];
            let m = extract_metrics(&rows);
            assert!((0.0..=100.0).contains(&m.pct_stranieri));
            let expected = crate::util::round_to(foreign / (foreign + italian) * 100.0, 1);
            assert_eq!(m.pct_stranieri, expected);
        }
    }

    #[test]
    fn pct_foreign_ties_round_to_even() {
        let rows = vec![obs("9", "TOTAL", "TOTAL", 400.0), obs("9", "TOTAL", "FRG", 1.0)];
        let m = extract_metrics(&rows);
        assert_eq!(m.pct_stranieri, 0.2);

        let rows = vec![obs("9", "TOTAL", "TOTAL", 400.0), obs("9", "TOTAL", "FRG", 3.0)];
        assert_eq!(extract_metrics(&rows).pct_stranieri, 0.8);
    }

    #[test]
    fn blank_values_are_left_out_of_sums() {
        let mut blank = obs("9", "TOTAL", "TOTAL", 0.0);
        blank.value = None;
        let rows = vec![blank, obs("9", "TOTAL", "FRG", 3.0), obs("9", "TOTAL", "ITL", 1.0)];
        assert_eq!(extract_metrics(&rows).totale, 4);
    }
}
