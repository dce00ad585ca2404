//! Builds department board files from the master sheet.
//!
//! Each launched product becomes a main item row followed by one indented row
//! per department task, carrying the task's due date. The files can be imported
//! into Monday.com directly or fed to [`crate::sync::sync_department`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::dates::{due_date_string, format_date, parse_launch_date};
use crate::error::Result;
use crate::io::{self, Record, SheetTable, TableFormat};
use crate::plan::{Plan, board_file_stem};

pub const ITEM: &str = "Item";
pub const STYLE_NAME: &str = "Style Name";
pub const COLOR_NAME: &str = "Color Name";
pub const PRIORITY: &str = "Priority";
pub const STATUS: &str = "Status";
pub const PLATFORM: &str = "Platform";
pub const LAUNCH_DATE: &str = "Launch Date";
pub const DUE_DATE: &str = "Due Date";
pub const TYPE: &str = "Type";
pub const DESCRIPTION: &str = "Description";

pub const MAIN_ITEM: &str = "Main Item";
pub const SUB_ITEM: &str = "Sub Item";
/// Prefix marking a task row under its main item.
pub const SUB_ITEM_INDENT: &str = "  ";
pub const NOT_STARTED: &str = "Not Started";

/// Header shared by every generated board.
pub fn board_columns() -> Vec<String> {
    [
        ITEM,
        STYLE_NAME,
        COLOR_NAME,
        PRIORITY,
        STATUS,
        PLATFORM,
        LAUNCH_DATE,
        DUE_DATE,
        TYPE,
        DESCRIPTION,
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// Lays out one department board. Master rows without an item name or a
/// parseable launch date are skipped.
pub fn generate_department(records: &[Record], plan: &Plan, department: &str) -> Result<SheetTable> {
    let tasks = &plan.department(department)?.sub_items;
    let settings = &plan.settings;
    let mut table = SheetTable::new(board_file_stem(department), board_columns());

    for record in records {
        let item_name = record.get(&settings.item_name_column).trim();
        if item_name.is_empty() {
            continue;
        }
        let raw_launch = record.get(&settings.launch_date_column);
        let Some(launch) = parse_launch_date(raw_launch) else {
            if !raw_launch.trim().is_empty() {
                warn!(item = item_name, launch_date = raw_launch, "could not parse launch date");
            }
            continue;
        };

        let main_row = BTreeMap::from([
            (ITEM, item_name.to_string()),
            (STYLE_NAME, record.get(&settings.style_name_column).to_string()),
            (COLOR_NAME, record.get(&settings.color_name_column).to_string()),
            (PRIORITY, record.get(&settings.priority_column).to_string()),
            (STATUS, record.get(&settings.status_column).to_string()),
            (PLATFORM, record.get(&settings.platform_column).to_string()),
            (LAUNCH_DATE, format_date(launch)),
            (TYPE, MAIN_ITEM.to_string()),
        ]);
        table.push_record(&main_row);

        for task in tasks {
            let task_row = BTreeMap::from([
                (ITEM, format!("{SUB_ITEM_INDENT}{}", task.task_name)),
                (STATUS, NOT_STARTED.to_string()),
                (DUE_DATE, due_date_string(launch, task.lead_time_weeks)?),
                (TYPE, SUB_ITEM.to_string()),
                (DESCRIPTION, task.description.clone().unwrap_or_default()),
            ]);
            table.push_record(&task_row);
        }
    }

    debug!(department, rows = table.rows.len(), "department board laid out");
    Ok(table)
}

/// Generates board files for `department`, or every department of the plan,
/// into `output_dir`. Returns the written paths.
#[instrument(
    level = "info",
    skip(plan),
    fields(master = %master.display(), output_dir = %output_dir.display())
)]
pub fn generate_boards(
    master: &Path,
    plan: &Plan,
    department: Option<&str>,
    output_dir: &Path,
    format: TableFormat,
) -> Result<Vec<PathBuf>> {
    let records = io::read_records(master)?;
    info!(row_count = records.len(), "loaded master sheet");

    let departments: Vec<&str> = match department {
        Some(name) => vec![name],
        None => plan.departments.keys().map(String::as_str).collect(),
    };

    std::fs::create_dir_all(output_dir)?;
    let mut written = Vec::new();
    for name in departments {
        let table = generate_department(&records, plan, name)?;
        if table.rows.is_empty() {
            warn!(department = name, "no launched items; nothing written");
            continue;
        }
        let path = output_dir.join(format!("{}.{}", table.sheet_name, format.extension()));
        io::write_table(&path, &table)?;
        info!(department = name, path = %path.display(), rows = table.rows.len(), "board file written");
        written.push(path);
    }

    Ok(written)
}
