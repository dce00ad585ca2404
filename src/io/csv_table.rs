use std::path::Path;

use csv::{ReaderBuilder, Writer};

use crate::error::Result;
use crate::io::SheetTable;

/// Reads a CSV file whose first line is the header row. Short rows are padded
/// with empty cells so every row matches the header width.
pub fn read_table(path: &Path) -> Result<SheetTable> {
    let mut reader = ReaderBuilder::new().flexible(true).from_path(path)?;

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(columns.len().max(row.len()), String::new());
        rows.push(row);
    }

    let sheet_name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .to_string();

    Ok(SheetTable {
        sheet_name,
        columns,
        rows,
    })
}

pub fn write_table(path: &Path, table: &SheetTable) -> Result<()> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}
