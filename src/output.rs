use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use url::Url;

use crate::config::OutputFormat;
use crate::extractor::Record;
use crate::utils::{host_stem, SENTINEL};

/// Every record collected during a run, in page order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            records: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn extend(&mut self, records: Vec<Record>) {
        self.records.extend(records);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows in column order with blanks filled and exact duplicates dropped.
    /// The first occurrence of a row keeps its position.
    pub fn deduplicated_rows(&self) -> Vec<Vec<String>> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(|record| self.project(record))
            .filter(|row| seen.insert(row.clone()))
            .collect()
    }

    fn project(&self, record: &Record) -> Vec<String> {
        self.columns
            .iter()
            .map(|column| match record.get(column) {
                Some(value) if !value.trim().is_empty() => value.clone(),
                _ => SENTINEL.to_string(),
            })
            .collect()
    }
}

/// `<host_with_underscores>_data.<ext>` unless the operator named a file.
pub fn output_path(url: &Url, format: OutputFormat, explicit: Option<&str>) -> PathBuf {
    match explicit {
        Some(path) => PathBuf::from(path),
        None => PathBuf::from(format!("{}_data.{}", host_stem(url), format.extension())),
    }
}

pub fn write_delimited<W: Write>(writer: W, columns: &[String], rows: &[Vec<String>], delimiter: u8) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().delimiter(delimiter).from_writer(writer);

    writer.write_record(columns)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(writer: W, columns: &[String], rows: &[Vec<String>]) -> Result<()> {
    let objects: Vec<Value> = rows
        .iter()
        .map(|row| {
            let object: Map<String, Value> = columns
                .iter()
                .cloned()
                .zip(row.iter().cloned().map(Value::String))
                .collect();
            Value::Object(object)
        })
        .collect();

    serde_json::to_writer_pretty(writer, &objects)?;
    Ok(())
}

/// Persist the final rows; returns how many were written.
pub fn save(results: &ResultSet, path: &Path, format: OutputFormat) -> Result<usize> {
    let rows = results.deduplicated_rows();
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file {}", path.display()))?;

    match format {
        OutputFormat::Csv => write_delimited(file, results.columns(), &rows, b',')?,
        OutputFormat::Tsv => write_delimited(file, results.columns(), &rows, b'\t')?,
        OutputFormat::Json => write_json(file, results.columns(), &rows)?,
    }

    log::info!("Saved {} items to {}", rows.len(), path.display());
    Ok(rows.len())
}
