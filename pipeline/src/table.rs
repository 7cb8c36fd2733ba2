use std::collections::HashSet;

use artifacts::Artifact;
use csv::{ReaderBuilder, Terminator, WriterBuilder};

use crate::{PipelineErr, Result};

/// Cell values read as missing.
pub const MISSING_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "#N/A",
];

/// A cell, `None` when the value is missing.
///
/// Present cells keep their source text untouched so that encoding a decoded
/// table reproduces the same values byte for byte.
pub type Cell = Option<String>;

/// An in-memory tabular dataset with a fixed header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Creates a new `Table`.
    ///
    /// # Returns
    /// `MalformedData` if the header has duplicate or empty names, or a row
    /// width differs from the header.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        let mut seen = HashSet::new();
        for name in &columns {
            if name.is_empty() || !seen.insert(name.as_str()) {
                return Err(PipelineErr::malformed(
                    "header",
                    format!("empty or duplicate column {name:?}"),
                ));
            }
        }

        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != columns.len()) {
            return Err(PipelineErr::malformed(
                format!("row {idx}"),
                format!("{} cells for {} columns", row.len(), columns.len()),
            ));
        }

        Ok(Self { columns, rows })
    }

    /// Parses CSV bytes whose first record is the header.
    pub fn from_csv(bytes: &[u8]) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(bytes);

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| PipelineErr::malformed("header", e))?
            .iter()
            .map(str::to_string)
            .collect();

        if columns.is_empty() || columns.iter().all(String::is_empty) {
            return Err(PipelineErr::malformed("header", "no columns"));
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| PipelineErr::malformed("csv", e))?;
            let row = record
                .iter()
                .map(|cell| (!MISSING_MARKERS.contains(&cell)).then(|| cell.to_string()))
                .collect();
            rows.push(row);
        }

        Self::new(columns, rows)
    }

    /// Writes the table as CSV with `\n` line endings and empty missing cells.
    pub fn to_csv(&self) -> Result<Vec<u8>> {
        let mut writer = WriterBuilder::new()
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer
            .write_record(&self.columns)
            .map_err(|e| PipelineErr::malformed("csv", e))?;
        for row in &self.rows {
            writer
                .write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))
                .map_err(|e| PipelineErr::malformed("csv", e))?;
        }

        writer
            .into_inner()
            .map_err(|e| PipelineErr::malformed("csv", e.error()))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Amount of rows holding at least one missing cell.
    pub fn incomplete_rows(&self) -> usize {
        self.rows.iter().filter(|row| row.iter().any(Option::is_none)).count()
    }

    /// Removes every row holding a missing cell.
    pub fn drop_incomplete_rows(mut self) -> Self {
        self.rows.retain(|row| row.iter().all(Option::is_some));
        self
    }

    /// Removes the named columns.
    ///
    /// # Returns
    /// `SchemaMismatch` naming every column that isn't in the header.
    pub fn drop_columns(mut self, names: &[String]) -> Result<Self> {
        let missing: Vec<&str> = names
            .iter()
            .filter(|name| self.column_index(name).is_none())
            .map(String::as_str)
            .collect();

        if !missing.is_empty() {
            return Err(PipelineErr::SchemaMismatch(format!(
                "columns to drop not present: {}",
                missing.join(", ")
            )));
        }

        let keep: Vec<bool> = self.columns.iter().map(|c| !names.contains(c)).collect();

        retain_flagged(&mut self.columns, &keep);
        for row in &mut self.rows {
            retain_flagged(row, &keep);
        }

        Ok(self)
    }

    /// Parses a column as finite numbers.
    ///
    /// # Returns
    /// `SchemaMismatch` naming the first missing or non-numeric cell.
    pub fn numeric_column(&self, idx: usize) -> Result<Vec<f64>> {
        let name = &self.columns[idx];

        self.rows
            .iter()
            .enumerate()
            .map(|(row, cells)| {
                cells[idx]
                    .as_deref()
                    .and_then(|cell| cell.trim().parse::<f64>().ok())
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| {
                        PipelineErr::SchemaMismatch(format!(
                            "column {name:?} row {row}: {:?} is not a finite number",
                            cells[idx].as_deref().unwrap_or("")
                        ))
                    })
            })
            .collect()
    }
}

fn retain_flagged<T>(cells: &mut Vec<T>, keep: &[bool]) {
    let mut flags = keep.iter();
    cells.retain(|_| flags.next().copied().unwrap_or(true));
}

impl Artifact for Table {
    type Error = PipelineErr;

    fn encode(&self) -> Result<Vec<u8>> {
        self.to_csv()
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        Self::from_csv(bytes)
    }
}
