use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

use crate::metrics::Metrics;

/// One row of the offender/victim datasets. Extra columns are ignored.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Observation {
    #[serde(rename = "REF_AREA")]
    pub ref_area: String,
    #[serde(rename = "TYPE_CRIME")]
    pub type_crime: String,
    #[serde(rename = "SEX")]
    pub sex: String,
    #[serde(rename = "AGE")]
    pub age: String,
    #[serde(rename = "CITIZENSHIP")]
    pub citizenship: String,
    #[serde(rename = "TIME_PERIOD")]
    pub year: i32,
    #[serde(rename = "OBS_VALUE")]
    pub value: Option<f64>,
}

/// Raw row of the reported-crimes dataset.
#[derive(Debug, Deserialize)]
pub struct RawCrimeRow {
    #[serde(rename = "REF_AREA")]
    pub ref_area: String,
    #[serde(rename = "TYPE_CRIME")]
    pub type_crime: String,
    #[serde(rename = "TIME_PERIOD")]
    pub year: i32,
    #[serde(rename = "Osservazione")]
    pub value: Option<String>,
}

/// Reported-crime count for one territory, crime and year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrimeCount {
    pub ref_area: String,
    pub type_crime: String,
    pub year: i32,
    pub count: i64,
}

#[derive(Debug, Deserialize)]
pub struct PopulationRow {
    #[serde(rename = "REF_AREA")]
    pub ref_area: String,
    #[serde(rename = "Territorio")]
    pub territorio: String,
    #[serde(rename = "Regione", default)]
    pub regione: Option<String>,
    #[serde(rename = "Anno")]
    pub anno: i32,
    #[serde(rename = "Popolazione")]
    pub popolazione: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct TerritoryNameRow {
    #[serde(rename = "REF_AREA")]
    pub ref_area: String,
    #[serde(rename = "Territorio")]
    pub territorio: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DataType {
    #[serde(rename = "OFFEND")]
    Offend,
    #[serde(rename = "VICTIM")]
    Victim,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Offend => write!(f, "OFFEND"),
            DataType::Victim => write!(f, "VICTIM"),
        }
    }
}

pub fn display_option<T: fmt::Display>(value: &Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "null".to_string(),
    }
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct RegionRateRow {
    #[serde(rename = "REF_AREA")]
    #[tabled(rename = "REF_AREA")]
    pub ref_area: String,
    #[serde(rename = "Territorio")]
    #[tabled(rename = "Territorio")]
    pub territorio: String,
    #[serde(rename = "Anno")]
    #[tabled(rename = "Anno")]
    pub anno: i32,
    #[serde(rename = "Reato")]
    #[tabled(rename = "Reato")]
    pub reato: String,
    #[serde(rename = "Delitti")]
    #[tabled(rename = "Delitti")]
    pub delitti: i64,
    #[serde(rename = "Popolazione")]
    #[tabled(rename = "Popolazione", display_with = "display_option")]
    pub popolazione: Option<u64>,
    #[serde(rename = "Tasso_per_100k")]
    #[tabled(rename = "Tasso_per_100k", display_with = "display_option")]
    pub tasso_per_100k: Option<f64>,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct ProvinceRateRow {
    #[serde(rename = "REF_AREA")]
    #[tabled(rename = "REF_AREA")]
    pub ref_area: String,
    #[serde(rename = "Territorio")]
    #[tabled(rename = "Territorio")]
    pub territorio: String,
    #[serde(rename = "Anno")]
    #[tabled(rename = "Anno")]
    pub anno: i32,
    #[serde(rename = "Reato")]
    #[tabled(rename = "Reato")]
    pub reato: String,
    #[serde(rename = "Delitti")]
    #[tabled(rename = "Delitti")]
    pub delitti: i64,
    #[serde(rename = "Regione")]
    #[tabled(rename = "Regione")]
    pub regione: String,
    #[serde(rename = "Popolazione")]
    #[tabled(rename = "Popolazione", display_with = "display_option")]
    pub popolazione: Option<u64>,
    #[serde(rename = "Tasso_per_100k")]
    #[tabled(rename = "Tasso_per_100k", display_with = "display_option")]
    pub tasso_per_100k: Option<f64>,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct TrendRecord {
    pub anno: i32,
    #[serde(flatten)]
    #[tabled(inline)]
    pub metrics: Metrics,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct CrimeBreakdownRecord {
    pub data_type: DataType,
    pub codice_reato: String,
    pub reato: String,
    #[serde(flatten)]
    #[tabled(inline)]
    pub metrics: Metrics,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct ProvinceBreakdownRecord {
    pub data_type: DataType,
    pub ref_area: String,
    pub provincia: String,
    pub regione: String,
    pub codice_reato: String,
    pub reato: String,
    #[serde(flatten)]
    #[tabled(inline)]
    pub metrics: Metrics,
}
