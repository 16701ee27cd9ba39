//! Fixed input/output locations, resolved against one root directory.
use std::path::PathBuf;

/// Default location of the source data tree used by `csv_to_json`.
pub const DEFAULT_SOURCE_ROOT: &str = "../osservatorio-criminalita-italia";

/// Reference year for the person-level cross-sections (last year with a full
/// offender breakdown).
pub const REFERENCE_YEAR: i32 = 2022;

pub const PROCESSED_REGIONS_CSV: &str = "delitti_regioni_normalizzato_2014_2023.csv";
pub const PROCESSED_PROVINCES_CSV: &str = "delitti_province_normalizzato_2014_2023.csv";
pub const GEOJSON_REGIONS: &str = "geojson_regioni_italia.geojson";

#[derive(Debug, Clone, PartialEq)]
pub struct Paths {
    /// Directory that receives `public/data/`.
    pub project_root: PathBuf,
    /// Directory that holds `data/raw/` and `data/processed/`.
    pub source_root: PathBuf,
}

impl Paths {
    /// Inputs and outputs live in the same tree.
    pub fn from_project_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Paths {
            project_root: root.clone(),
            source_root: root,
        }
    }

    /// Inputs come from a separate source tree, outputs go under `project_root`.
    pub fn with_source(project_root: impl Into<PathBuf>, source_root: impl Into<PathBuf>) -> Self {
        Paths {
            project_root: project_root.into(),
            source_root: source_root.into(),
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.project_root.join("public").join("data")
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.source_root.join("data").join("raw")
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.source_root.join("data").join("processed")
    }

    pub fn processed(&self, file_name: &str) -> PathBuf {
        self.processed_dir().join(file_name)
    }

    pub fn raw_crimes_csv(&self) -> PathBuf {
        self.raw_dir().join("delitti_2014_2023_istat.csv")
    }

    pub fn offenders_csv(&self) -> PathBuf {
        self.raw_dir().join("autvittps").join("autvittps_7.csv")
    }

    pub fn victims_csv(&self) -> PathBuf {
        self.raw_dir().join("autvittps").join("autvittps_8.csv")
    }

    pub fn geojson_src(&self) -> PathBuf {
        self.raw_dir().join(GEOJSON_REGIONS)
    }

    pub fn output(&self, file_name: &str) -> PathBuf {
        self.output_dir().join(file_name)
    }
}
