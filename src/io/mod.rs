//! Tabular input and output.
//!
//! Every source the tool reads (master sheet, generated department boards,
//! Monday exports) is a header row followed by data rows. CSV and `.xlsx`
//! files are both loaded into a [`SheetTable`]; the extension decides which
//! adapter runs.

pub mod csv_table;
pub mod excel_read;
pub mod excel_write;

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Result, ToolError};

/// A header row plus string cells, as read from or written to one sheet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetTable {
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetTable {
    pub fn new(sheet_name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Rows keyed by header name.
    pub fn records(&self) -> Vec<Record> {
        self.rows
            .iter()
            .map(|row| {
                let fields = self
                    .columns
                    .iter()
                    .enumerate()
                    .map(|(idx, column)| (column.clone(), row.get(idx).cloned().unwrap_or_default()))
                    .collect();
                Record { fields }
            })
            .collect()
    }

    /// Appends a row built from header → value pairs; unknown headers are ignored.
    pub fn push_record(&mut self, values: &BTreeMap<&str, String>) {
        let row = self
            .columns
            .iter()
            .map(|column| values.get(column.as_str()).cloned().unwrap_or_default())
            .collect();
        self.rows.push(row);
    }
}

/// One data row addressed by header name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            fields: pairs
                .into_iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        }
    }

    /// Cell under `column`, or the empty string when the column is absent.
    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Xlsx,
}

impl TableFormat {
    /// `.xlsx`/`.xlsm` select the workbook adapter; everything else is CSV.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("xlsx") | Some("xlsm") => TableFormat::Xlsx,
            _ => TableFormat::Csv,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            TableFormat::Csv => "csv",
            TableFormat::Xlsx => "xlsx",
        }
    }
}

pub fn read_table(path: &Path) -> Result<SheetTable> {
    if !path.exists() {
        return Err(ToolError::MissingInput(path.to_path_buf()));
    }
    match TableFormat::from_path(path) {
        TableFormat::Csv => csv_table::read_table(path),
        TableFormat::Xlsx => excel_read::read_table(path, None),
    }
}

pub fn read_records(path: &Path) -> Result<Vec<Record>> {
    Ok(read_table(path)?.records())
}

pub fn write_table(path: &Path, table: &SheetTable) -> Result<()> {
    match TableFormat::from_path(path) {
        TableFormat::Csv => csv_table::write_table(path, table),
        TableFormat::Xlsx => excel_write::write_tables(path, std::slice::from_ref(table)),
    }
}
