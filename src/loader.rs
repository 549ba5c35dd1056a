use crate::error::{RowError, SourceError};
use crate::types::{Dataset, RawRow, Record, REQUIRED_COLUMNS};
use crate::util::{parse_aqi, parse_date_safe, split_tokens};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub skipped_rows: usize,
    pub coerced_rows: usize,
}

/// Clean one decoded row into a `Record`.
///
/// The returned flag is `true` when `aqi_value` was missing or malformed and
/// has been replaced by `0`.
pub fn parse_record(row: RawRow) -> Result<(Record, bool), RowError> {
    let state = required_text(row.state, "state")?;
    let area = required_text(row.area, "area")?;

    let parsed_aqi = parse_aqi(row.aqi_value.as_deref());
    let coerced = parsed_aqi.is_none();

    let record = Record {
        date: parse_date_safe(row.date.as_deref()),
        state,
        area,
        aqi_value: parsed_aqi.unwrap_or(0.0),
        air_quality_status: row.air_quality_status.unwrap_or_default(),
        prominent_pollutants: split_tokens(row.prominent_pollutants.as_deref()),
    };
    Ok((record, coerced))
}

/// Grouping keys are stored verbatim; whitespace only decides emptiness.
fn required_text(value: Option<String>, field: &'static str) -> Result<String, RowError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(RowError::MissingField(field)),
    }
}

/// Decode a full CSV document into a `Dataset`.
pub fn load_from_reader<R: Read>(reader: R) -> Result<(Dataset, LoadReport), SourceError> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        return Err(SourceError::MissingColumns(missing.join(", ")));
    }

    let mut report = LoadReport::default();
    let mut records: Vec<Record> = Vec::new();

    for (idx, result) in rdr.deserialize::<RawRow>().enumerate() {
        report.total_rows += 1;
        // +2: one for the header, one for 1-based numbering.
        let line = idx + 2;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                debug!(line, error = %e, "undecodable row skipped");
                report.skipped_rows += 1;
                continue;
            }
        };
        match parse_record(row) {
            Ok((record, coerced)) => {
                if coerced {
                    debug!(line, "aqi_value coerced to 0");
                    report.coerced_rows += 1;
                }
                records.push(record);
            }
            Err(e) => {
                debug!(line, error = %e, "row skipped");
                report.skipped_rows += 1;
            }
        }
    }

    report.loaded_rows = records.len();
    if report.coerced_rows > 0 {
        warn!(
            coerced = report.coerced_rows,
            "rows with missing or malformed aqi_value were counted as 0"
        );
    }
    if report.skipped_rows > 0 {
        warn!(skipped = report.skipped_rows, "rows skipped during load");
    }

    let mut dataset = Dataset::new(records);
    dataset.coerced_rows = report.coerced_rows;
    Ok((dataset, report))
}

pub fn load_dataset(path: &Path) -> Result<(Dataset, LoadReport), SourceError> {
    let file = File::open(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let (dataset, report) = load_from_reader(file)?;
    info!(
        path = %path.display(),
        rows = report.loaded_rows,
        "dataset loaded"
    );
    Ok((dataset, report))
}
