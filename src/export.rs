//! Tabular export of view rows

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No data to export")]
    NoData,

    #[error("Unsupported export format: {0} (expected .csv or .json)")]
    UnsupportedFormat(String),

    #[error("Export I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// One table row as ordered `(column, value)` pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportRow {
    fields: Vec<(String, Value)>,
}

impl ExportRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(column, value);
        self
    }

    /// Set a column, replacing an earlier value of the same name in place.
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.iter().find(|(name, _)| name == column).map(|(_, v)| v)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for ExportRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Conversion of a view row into export columns.
pub trait ToExportRow {
    fn to_export_row(&self) -> ExportRow;
}

/// Destination for exported rows.
pub trait ExportSink {
    /// Write every row; returns how many were written.
    fn write_rows(&mut self, rows: &[ExportRow]) -> Result<usize, ExportError>;
}

/// Pretty-printed JSON array of objects.
pub struct JsonSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ExportSink for JsonSink<W> {
    fn write_rows(&mut self, rows: &[ExportRow]) -> Result<usize, ExportError> {
        if rows.is_empty() {
            return Err(ExportError::NoData);
        }
        serde_json::to_writer_pretty(&mut self.writer, rows)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(rows.len())
    }
}

/// Comma-separated values with a header of every column seen, in
/// first-appearance order.
pub struct CsvSink<W: Write> {
    writer: W,
}

impl<W: Write> CsvSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ExportSink for CsvSink<W> {
    fn write_rows(&mut self, rows: &[ExportRow]) -> Result<usize, ExportError> {
        if rows.is_empty() {
            return Err(ExportError::NoData);
        }

        let mut header: Vec<&str> = Vec::new();
        for column in rows.iter().flat_map(ExportRow::columns) {
            if !header.contains(&column) {
                header.push(column);
            }
        }

        let line = header.iter().map(|c| csv_field(c)).collect::<Vec<_>>().join(",");
        writeln!(self.writer, "{line}")?;

        for row in rows {
            let line = header
                .iter()
                .map(|column| csv_field(&cell_text(row.get(column))))
                .collect::<Vec<_>>()
                .join(",");
            writeln!(self.writer, "{line}")?;
        }
        self.writer.flush()?;
        Ok(rows.len())
    }
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| cell_text(Some(item)))
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    }
}

fn csv_field(text: &str) -> String {
    if text.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

/// Pick a sink from the file extension and write the rows to `path`.
pub fn export_to_path(path: impl AsRef<Path>, rows: &[ExportRow]) -> Result<usize, ExportError> {
    let path = path.as_ref();
    if rows.is_empty() {
        return Err(ExportError::NoData);
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let written = match extension.as_str() {
        "json" => JsonSink::new(BufWriter::new(File::create(path)?)).write_rows(rows)?,
        "csv" => CsvSink::new(BufWriter::new(File::create(path)?)).write_rows(rows)?,
        other => return Err(ExportError::UnsupportedFormat(other.to_string())),
    };

    info!(path = %path.display(), rows = written, "Exported rows");
    Ok(written)
}
