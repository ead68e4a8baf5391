// src/data/load.rs
use csv::{ReaderBuilder, StringRecord, Trim};
use std::{collections::BTreeMap, fs::File, path::Path};
use tracing::{debug, info};

use super::{
    AggregatedRecord, GroupKey, LoadError, Table, COL_AFFECTED_BY, COL_ANSI, COL_PCT_IMPACTED,
    COL_STATE, COL_STATE_CODE, COL_YEAR, REQUIRED_COLUMNS,
};

/// A parsed source row, before grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    pub key: GroupKey,
    pub pct_impacted: Option<f64>,
}

/// Positions of the required columns within the header row.
struct ColumnIndex {
    state: usize,
    ansi: usize,
    affected_by: usize,
    year: usize,
    state_code: usize,
    pct: usize,
}

impl ColumnIndex {
    fn from_headers(path: &Path, headers: &StringRecord) -> Result<Self, LoadError> {
        let find = |column: &'static str| {
            headers
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| LoadError::MissingColumn {
                    path: path.to_path_buf(),
                    column,
                })
        };
        // report the first missing column in declaration order
        for column in REQUIRED_COLUMNS {
            find(column)?;
        }
        Ok(Self {
            state: find(COL_STATE)?,
            ansi: find(COL_ANSI)?,
            affected_by: find(COL_AFFECTED_BY)?,
            year: find(COL_YEAR)?,
            state_code: find(COL_STATE_CODE)?,
            pct: find(COL_PCT_IMPACTED)?,
        })
    }
}

/// Read the CSV at `path`, group by (State, ANSI, Affected by, Year, state_code)
/// and average `Pct of Colonies Impacted` within each group.
///
/// The returned table is sorted by the group key, one record per key.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_aggregated<P: AsRef<Path>>(path: P) -> Result<Table, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(file);

    let csv_err = |source: csv::Error| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let headers = rdr.headers().map_err(csv_err)?.clone();
    let idx = ColumnIndex::from_headers(path, &headers)?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for result in rdr.records() {
        let record = result.map_err(csv_err)?;
        match parse_row(path, &idx, &record)? {
            Some(row) => rows.push(row),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!(skipped, "dropped rows with missing group keys");
    }

    let source_rows = rows.len();
    let records = aggregate(rows);
    info!(source_rows, records = records.len(), "aggregated dataset");
    for record in records.iter().take(5) {
        info!(?record, "head");
    }

    Ok(Table::new(records, path))
}

/// Cell texts read as "no value", the same set pandas' `read_csv` treats as NA.
const MISSING_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing(cell: &str) -> bool {
    MISSING_TOKENS.contains(&cell)
}

/// Parse one CSV record. Returns `Ok(None)` when any group key is missing.
fn parse_row(
    path: &Path,
    idx: &ColumnIndex,
    record: &StringRecord,
) -> Result<Option<SourceRow>, LoadError> {
    let line = record.position().map(|p| p.line()).unwrap_or(0);
    let cell = |i: usize| record.get(i).unwrap_or("");
    let invalid = |column: &'static str, value: &str| LoadError::InvalidValue {
        path: path.to_path_buf(),
        line,
        column,
        value: value.to_string(),
    };

    let state = cell(idx.state);
    let ansi = cell(idx.ansi);
    let affected_by = cell(idx.affected_by);
    let year = cell(idx.year);
    let state_code = cell(idx.state_code);
    if [state, ansi, affected_by, year, state_code]
        .iter()
        .any(|v| is_missing(v))
    {
        return Ok(None);
    }

    let ansi = parse_integral(ansi).ok_or_else(|| invalid(COL_ANSI, ansi))?;
    let year = parse_integral(year)
        .and_then(|y| i32::try_from(y).ok())
        .ok_or_else(|| invalid(COL_YEAR, year))?;

    let pct_raw = cell(idx.pct);
    let pct_impacted = if is_missing(pct_raw) {
        None
    } else {
        let v = pct_raw
            .parse::<f64>()
            .map_err(|_| invalid(COL_PCT_IMPACTED, pct_raw))?;
        v.is_finite().then_some(v)
    };

    Ok(Some(SourceRow {
        key: (
            state.to_string(),
            ansi,
            affected_by.to_string(),
            year,
            state_code.to_string(),
        ),
        pct_impacted,
    }))
}

/// Accepts `7` as well as `7.0`, which spreadsheet exports tend to produce.
fn parse_integral(raw: &str) -> Option<i64> {
    if let Ok(v) = raw.parse::<i64>() {
        return Some(v);
    }
    let f = raw.parse::<f64>().ok()?;
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Collapse rows sharing a key into one record holding the mean percentage.
/// Missing percentages are left out of the mean.
pub fn aggregate<I>(rows: I) -> Vec<AggregatedRecord>
where
    I: IntoIterator<Item = SourceRow>,
{
    let mut groups: BTreeMap<GroupKey, (f64, u32)> = BTreeMap::new();
    for row in rows {
        let acc = groups.entry(row.key).or_insert((0.0, 0));
        if let Some(v) = row.pct_impacted {
            acc.0 += v;
            acc.1 += 1;
        }
    }

    groups
        .into_iter()
        .map(
            |((state, ansi, affected_by, year, state_code), (sum, n))| AggregatedRecord {
                state,
                ansi,
                affected_by,
                year,
                state_code,
                pct_impacted: (n > 0).then(|| sum / f64::from(n)),
            },
        )
        .collect()
}
