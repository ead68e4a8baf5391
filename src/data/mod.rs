pub mod filter;
pub mod load;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf, str::FromStr};
use thiserror::Error;

pub use filter::{resolve, FilteredView, HIGHLIGHTED_STATES};
pub use load::{aggregate, load_aggregated};

/// Source columns the loader needs, by their header names.
pub const COL_STATE: &str = "State";
pub const COL_ANSI: &str = "ANSI";
pub const COL_AFFECTED_BY: &str = "Affected by";
pub const COL_YEAR: &str = "Year";
pub const COL_STATE_CODE: &str = "state_code";
pub const COL_PCT_IMPACTED: &str = "Pct of Colonies Impacted";

pub const REQUIRED_COLUMNS: [&str; 6] = [
    COL_STATE,
    COL_ANSI,
    COL_AFFECTED_BY,
    COL_YEAR,
    COL_STATE_CODE,
    COL_PCT_IMPACTED,
];

/// One row of the aggregated table: the mean impact for a
/// (state, ansi, affected_by, year, state_code) group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRecord {
    pub state: String,
    pub ansi: i64,
    /// Kept as the raw category text so unlisted values still compare.
    pub affected_by: String,
    pub year: i32,
    pub state_code: String,
    /// `None` when no source row in the group carried a percentage.
    pub pct_impacted: Option<f64>,
}

impl AggregatedRecord {
    pub fn key(&self) -> GroupKey {
        (
            self.state.clone(),
            self.ansi,
            self.affected_by.clone(),
            self.year,
            self.state_code.clone(),
        )
    }
}

/// Group-by key, ordered the same way the aggregated table is.
pub type GroupKey = (String, i64, String, i32, String);

/// The aggregated dataset. Built once at startup and only ever read.
#[derive(Debug, Clone)]
pub struct Table {
    records: Vec<AggregatedRecord>,
    source: PathBuf,
    loaded_at: DateTime<Utc>,
}

impl Table {
    pub fn new(records: Vec<AggregatedRecord>, source: impl Into<PathBuf>) -> Self {
        Self {
            records,
            source: source.into(),
            loaded_at: Utc::now(),
        }
    }

    pub fn records(&self) -> &[AggregatedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn source(&self) -> &PathBuf {
        &self.source
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

impl AsRef<[AggregatedRecord]> for Table {
    fn as_ref(&self) -> &[AggregatedRecord] {
        &self.records
    }
}

/// The closed set of causes offered by the dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AffectedBy {
    Disease,
    Other,
    #[default]
    Pesticides,
    #[serde(rename = "Pests_excl_Varroa")]
    PestsExclVarroa,
    Unknown,
    #[serde(rename = "Varroa_mites")]
    VarroaMites,
}

impl AffectedBy {
    pub const ALL: [AffectedBy; 6] = [
        AffectedBy::Disease,
        AffectedBy::Other,
        AffectedBy::Pesticides,
        AffectedBy::PestsExclVarroa,
        AffectedBy::Unknown,
        AffectedBy::VarroaMites,
    ];

    /// The label exactly as it appears in the source data.
    pub fn as_str(&self) -> &'static str {
        match self {
            AffectedBy::Disease => "Disease",
            AffectedBy::Other => "Other",
            AffectedBy::Pesticides => "Pesticides",
            AffectedBy::PestsExclVarroa => "Pests_excl_Varroa",
            AffectedBy::Unknown => "Unknown",
            AffectedBy::VarroaMites => "Varroa_mites",
        }
    }
}

impl fmt::Display for AffectedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AffectedBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AffectedBy::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| format!("unknown bee-killer `{}`", s))
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV in `{path}`: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("`{path}` is missing required column `{column}`")]
    MissingColumn { path: PathBuf, column: &'static str },
    #[error("`{path}` line {line}: invalid {column} value `{value}`")]
    InvalidValue {
        path: PathBuf,
        line: u64,
        column: &'static str,
        value: String,
    },
}
