use std::path::Path;

use rust_xlsxwriter::{Table, Workbook};

use crate::error::Result;
use crate::io::SheetTable;

const MAX_SHEET_NAME: usize = 31;

/// Writes each table to its own worksheet, formatted as a filterable table so
/// the file can be handed straight to Monday's Excel import.
pub fn write_tables(path: &Path, tables: &[SheetTable]) -> Result<()> {
    let mut workbook_writer = Workbook::new();

    for table in tables {
        let worksheet = workbook_writer.add_worksheet();
        worksheet.set_name(sanitize_sheet_name(&table.sheet_name))?;

        for (col_idx, header) in table.columns.iter().enumerate() {
            worksheet.write_string(0, col_idx as u16, header)?;
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                worksheet.write_string((row_idx + 1) as u32, col_idx as u16, cell)?;
            }
        }

        if table.columns.is_empty() {
            continue;
        }
        let mut excel_table = Table::new();
        let excel_table = excel_table.set_autofilter(true);
        let col_end = (table.columns.len() as u16).saturating_sub(1);
        let row_end = table.rows.len().max(1) as u32;
        worksheet.add_table(0, 0, row_end, col_end, excel_table)?;
    }

    workbook_writer.save(path)?;
    Ok(())
}

fn sanitize_sheet_name(raw: &str) -> String {
    let invalid = [':', '\\', '/', '?', '*', '[', ']', '\''];
    let sanitized: String = raw
        .chars()
        .map(|ch| {
            if invalid.contains(&ch) || ch.is_control() {
                '_'
            } else {
                ch
            }
        })
        .take(MAX_SHEET_NAME)
        .collect();

    let sanitized = sanitized.trim();
    if sanitized.is_empty() {
        "Sheet1".to_string()
    } else {
        sanitized.to_string()
    }
}
