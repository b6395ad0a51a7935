//! Tabular datasets: a header row plus rows of raw cell text.
//!
//! Cells are kept exactly as read so that rewriting an unchanged input is
//! byte-identical. Typed views (features, labels, numeric columns) are parsed
//! on demand and report schema problems as [`PipelineError::DataSchema`].

use crate::error::{PipelineError, Result};
use std::collections::HashSet;
use std::path::Path;

/// Numeric feature columns the classifier consumes, in model order.
pub const FEATURE_COLUMNS: [&str; 3] = [
    "lastmonth_activity",
    "lastyear_activity",
    "number_of_employees",
];

/// Binary target column.
pub const LABEL_COLUMN: &str = "exited";

const MISSING_MARKERS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL"];

pub fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell.trim())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn read(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(PipelineError::not_found(path));
        }
        let mut rdr = csv::Reader::from_path(path)?;
        let headers = rdr.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(Self { headers, rows })
    }

    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.into_inner()
            .map_err(|e| PipelineError::Io(std::io::Error::other(e.to_string())))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let bytes = self.to_csv_bytes()?;
        crate::io::atomic_write(path, &bytes)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append all rows of `other`. Both tables must share the same header.
    pub fn append(&mut self, other: Dataset, source: &str) -> Result<()> {
        if self.headers.is_empty() && self.rows.is_empty() {
            self.headers = other.headers;
        } else if self.headers != other.headers {
            return Err(PipelineError::DataSchema(format!(
                "header of '{source}' ({}) does not match ({})",
                other.headers.join(","),
                self.headers.join(",")
            )));
        }
        self.rows.extend(other.rows);
        Ok(())
    }

    /// Drop rows equal to an earlier row. Keeps first occurrences in order
    /// and returns the number of rows removed.
    pub fn dedup(&mut self) -> usize {
        let before = self.rows.len();
        let mut seen: HashSet<Vec<String>> = HashSet::with_capacity(before);
        self.rows.retain(|row| seen.insert(row.clone()));
        before - self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| PipelineError::DataSchema(format!("missing column '{name}'")))
    }

    /// Parse a column as numbers; missing cells become `None`.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let idx = self.column_index(name)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(row_no, row)| {
                let cell = row.get(idx).map(String::as_str).unwrap_or("");
                if is_missing(cell) {
                    return Ok(None);
                }
                cell.trim().parse::<f64>().map(Some).map_err(|_| {
                    PipelineError::DataSchema(format!(
                        "column '{name}' row {}: '{cell}' is not numeric",
                        row_no + 1
                    ))
                })
            })
            .collect()
    }

    /// Feature matrix in [`FEATURE_COLUMNS`] order. Missing cells are an error.
    pub fn features(&self) -> Result<Vec<[f64; 3]>> {
        let columns = FEATURE_COLUMNS
            .iter()
            .map(|name| {
                let values = self.numeric_column(name)?;
                values
                    .into_iter()
                    .enumerate()
                    .map(|(row_no, v)| {
                        v.ok_or_else(|| {
                            PipelineError::DataSchema(format!(
                                "column '{name}' row {}: missing value",
                                row_no + 1
                            ))
                        })
                    })
                    .collect::<Result<Vec<f64>>>()
            })
            .collect::<Result<Vec<Vec<f64>>>>()?;

        Ok((0..self.rows.len())
            .map(|i| [columns[0][i], columns[1][i], columns[2][i]])
            .collect())
    }

    /// Ground-truth labels from [`LABEL_COLUMN`]; every value must be 0 or 1.
    pub fn labels(&self) -> Result<Vec<u8>> {
        self.numeric_column(LABEL_COLUMN)?
            .into_iter()
            .enumerate()
            .map(|(row_no, v)| match v {
                Some(x) if x == 0.0 => Ok(0),
                Some(x) if x == 1.0 => Ok(1),
                Some(x) => Err(PipelineError::DataSchema(format!(
                    "column '{LABEL_COLUMN}' row {}: label {x} is not 0 or 1",
                    row_no + 1
                ))),
                None => Err(PipelineError::DataSchema(format!(
                    "column '{LABEL_COLUMN}' row {}: missing label",
                    row_no + 1
                ))),
            })
            .collect()
    }

    /// Percentage of missing cells per column, in header order.
    pub fn missing_percentages(&self) -> Vec<(String, f64)> {
        let total = self.rows.len();
        self.headers
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let missing = self
                    .rows
                    .iter()
                    .filter(|row| row.get(idx).map_or(true, |c| is_missing(c)))
                    .count();
                let percent = if total == 0 {
                    0.0
                } else {
                    missing as f64 / total as f64 * 100.0
                };
                (name.clone(), percent)
            })
            .collect()
    }
}
