//! Pushes CSV rows into Monday.com boards as items with dated subitems.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};

use crate::api::BoardApi;
use crate::config::Settings;
use crate::dates::{due_date_string, format_date, parse_launch_date};
use crate::error::{Result, ToolError};
use crate::generate;
use crate::io::{self, Record, TableFormat};
use crate::model::{BoardKind, ColumnValues, Item, SyncReport, compact};
use crate::plan::{Plan, SubItemSpec, board_file_stem};

/// Status column present on every subitem board.
pub const STATUS_COLUMN: &str = "status";

/// Column values applied to every task subitem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubitemTemplate {
    pub status: String,
    pub due_date_column: Option<String>,
    pub description_column: Option<String>,
}

/// How rows of a particular CSV shape map onto Monday items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowLayout {
    pub name_column: String,
    pub launch_date_column: String,
    /// Source header → target column id.
    pub item_columns: Vec<(String, String)>,
    pub launch_date_target: Option<String>,
    pub main_item_marker: Option<(String, String)>,
    pub skip_prefixes: Vec<String>,
    pub require_launch_date: bool,
}

impl RowLayout {
    /// Files written by [`crate::generate`].
    pub fn department_board() -> Self {
        let map = |source: &str, target: &str| (source.to_string(), target.to_string());
        Self {
            name_column: generate::ITEM.into(),
            launch_date_column: generate::LAUNCH_DATE.into(),
            item_columns: vec![
                map(generate::STYLE_NAME, "text"),
                map(generate::COLOR_NAME, "text1"),
                map(generate::PRIORITY, "text2"),
                map(generate::STATUS, "text3"),
                map(generate::PLATFORM, "text4"),
            ],
            launch_date_target: Some("date".into()),
            main_item_marker: Some((generate::TYPE.into(), generate::MAIN_ITEM.into())),
            skip_prefixes: vec![generate::SUB_ITEM_INDENT.into()],
            require_launch_date: false,
        }
    }

    /// CSV exported from a Monday.com board.
    pub fn monday_export() -> Self {
        let map = |source: &str, target: &str| (source.to_string(), target.to_string());
        Self {
            name_column: "Name".into(),
            launch_date_column: "Launch Date".into(),
            item_columns: vec![
                map("Style-Color", "text"),
                map("Color Name", "text1"),
                map("Person", "text2"),
                map("Status", "text3"),
            ],
            launch_date_target: Some("date".into()),
            main_item_marker: None,
            skip_prefixes: vec!["Subitems".into()],
            require_launch_date: true,
        }
    }

    fn is_main_item(&self, record: &Record) -> bool {
        let raw_name = record.get(&self.name_column);
        if raw_name.trim().is_empty() {
            return false;
        }
        if self
            .skip_prefixes
            .iter()
            .any(|prefix| raw_name.starts_with(prefix.as_str()))
        {
            return false;
        }
        match &self.main_item_marker {
            Some((column, value)) => record.get(column) == value.as_str(),
            None => true,
        }
    }

    fn item_values(&self, record: &Record, launch: Option<NaiveDate>) -> ColumnValues {
        let mut values: ColumnValues = self
            .item_columns
            .iter()
            .map(|(source, target)| (target.clone(), record.get(source).trim().to_string()))
            .collect();
        if let (Some(target), Some(launch)) = (&self.launch_date_target, launch) {
            values.insert(target.clone(), format_date(launch));
        }
        compact(values)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Pause after each created item.
    pub delay: Duration,
    pub board_kind: BoardKind,
    pub due_date_column_title: String,
    pub subitem_status: String,
    pub description_column: Option<String>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl SyncOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            delay: settings.sync_delay(),
            board_kind: settings.board_kind,
            due_date_column_title: settings.due_date_column.clone(),
            subitem_status: generate::NOT_STARTED.into(),
            description_column: Some("text".into()),
        }
    }

    fn template(&self, due_date_column: Option<&str>) -> SubitemTemplate {
        SubitemTemplate {
            status: self.subitem_status.clone(),
            due_date_column: due_date_column.map(str::to_string),
            description_column: self.description_column.clone(),
        }
    }
}

/// Creates one subitem per task under `parent`. A failing task is recorded and
/// the remaining tasks still run.
pub fn create_task_subitems<A: BoardApi + ?Sized>(
    api: &A,
    parent: &Item,
    launch: Option<NaiveDate>,
    tasks: &[SubItemSpec],
    template: &SubitemTemplate,
    report: &mut SyncReport,
) {
    for task in tasks {
        let mut values = ColumnValues::new();
        values.insert(STATUS_COLUMN.to_string(), template.status.clone());

        let mut due = None;
        if let (Some(launch), Some(column)) = (launch, template.due_date_column.as_deref()) {
            match due_date_string(launch, task.lead_time_weeks) {
                Ok(date) => {
                    values.insert(column.to_string(), date.clone());
                    due = Some(date);
                }
                Err(error) => {
                    warn!(item = %parent.name, task = %task.task_name, %error, "due date not computed");
                    report.record_subitem_failure(&parent.name, &task.task_name, error);
                    continue;
                }
            }
        }
        if let (Some(column), Some(description)) = (
            template.description_column.as_deref(),
            task.description.as_deref(),
        ) {
            values.insert(column.to_string(), description.to_string());
        }

        match api.create_subitem(&parent.id, &task.task_name, &compact(values)) {
            Ok(subitem) => {
                report.subitems_created += 1;
                debug!(item = %parent.name, subitem = %subitem.name, id = %subitem.id, due = ?due, "subitem created");
            }
            Err(error) => {
                warn!(item = %parent.name, task = %task.task_name, %error, "subitem creation failed");
                report.record_subitem_failure(&parent.name, &task.task_name, error);
            }
        }
    }
}

/// Creates an item per main row of `records` on the board, then its task
/// subitems. Items whose name already exists on the board are skipped.
#[instrument(level = "info", skip_all, fields(board_id = %board_id, rows = records.len()))]
pub fn sync_rows<A: BoardApi + ?Sized>(
    api: &A,
    board_id: &str,
    due_date_column: Option<&str>,
    records: &[Record],
    layout: &RowLayout,
    tasks: &[SubItemSpec],
    options: &SyncOptions,
) -> Result<SyncReport> {
    let mut existing: HashSet<String> = api
        .board_items(board_id)?
        .into_iter()
        .map(|item| item.name)
        .collect();
    let template = options.template(due_date_column);
    let mut report = SyncReport::default();

    for record in records.iter().filter(|record| layout.is_main_item(record)) {
        let name = record.get(&layout.name_column).trim();
        let launch = parse_launch_date(record.get(&layout.launch_date_column));

        if launch.is_none() && layout.require_launch_date {
            warn!(item = name, "no valid launch date; row skipped");
            report.items_skipped += 1;
            continue;
        }
        if existing.contains(name) {
            info!(item = name, "item already on board; skipped");
            report.items_skipped += 1;
            continue;
        }

        let values = layout.item_values(record, launch);
        let item = match api.create_item(board_id, None, name, &values) {
            Ok(item) => item,
            Err(error) => {
                warn!(item = name, %error, "item creation failed");
                report.record_item_failure(name, error);
                continue;
            }
        };
        info!(item = %item.name, id = %item.id, "item created");
        existing.insert(item.name.clone());
        report.items_created += 1;

        match launch {
            Some(_) => create_task_subitems(api, &item, launch, tasks, &template, &mut report),
            None => info!(item = %item.name, "no launch date; subitems skipped"),
        }

        pause(options.delay);
    }

    info!(%report, "rows synced");
    Ok(report)
}

/// Syncs one generated department board file into the department's board,
/// creating the board and its due date column when missing.
#[instrument(level = "info", skip(api, plan, options), fields(input = %input.display()))]
pub fn sync_department<A: BoardApi + ?Sized>(
    api: &A,
    plan: &Plan,
    department: &str,
    input: &Path,
    options: &SyncOptions,
) -> Result<SyncReport> {
    let config = plan.department(department)?;
    let records = io::read_records(input)?;
    info!(row_count = records.len(), "loaded department board");

    let board = api.get_or_create_board(&config.board_name, options.board_kind)?;
    let due_date_column =
        api.get_or_create_due_date_column(&board.id, &options.due_date_column_title)?;
    info!(board = %board.name, id = %board.id, due_date_column = %due_date_column, "board ready");

    sync_rows(
        api,
        &board.id,
        Some(&due_date_column),
        &records,
        &RowLayout::department_board(),
        &config.sub_items,
        options,
    )
}

/// Generated board file of `department` in `dir`, preferring `.csv` over
/// `.xlsx`.
pub fn department_board_file(dir: &Path, department: &str) -> Option<PathBuf> {
    let stem = board_file_stem(department);
    [TableFormat::Csv, TableFormat::Xlsx]
        .into_iter()
        .map(|format| dir.join(format!("{stem}.{}", format.extension())))
        .find(|path| path.exists())
}

/// Syncs every department of the plan from `<dir>/<department>_board.csv`
/// (or `.xlsx`). A missing file or a failing department does not stop the
/// remaining departments.
#[instrument(level = "info", skip(api, plan, options), fields(dir = %dir.display()))]
pub fn sync_all<A: BoardApi + ?Sized>(
    api: &A,
    plan: &Plan,
    dir: &Path,
    options: &SyncOptions,
) -> Result<SyncReport> {
    let mut report = SyncReport::default();

    for department in plan.departments.keys() {
        let Some(input) = department_board_file(dir, department) else {
            warn!(department = %department, "no board file found; skipped");
            continue;
        };

        match sync_department(api, plan, department, &input, options) {
            Ok(department_report) => report.absorb(department_report),
            Err(error) => {
                warn!(department = %department, %error, "department sync failed");
                report.record_item_failure(&format!("department {department}"), error);
            }
        }
    }

    Ok(report)
}

/// Adds items and dated subitems from a Monday export CSV to an existing board.
/// The board is matched by exact name, then by case-insensitive substring.
#[instrument(level = "info", skip(api, tasks, options), fields(input = %input.display()))]
pub fn add_subitems<A: BoardApi + ?Sized>(
    api: &A,
    board_query: &str,
    input: &Path,
    tasks: &[SubItemSpec],
    options: &SyncOptions,
) -> Result<SyncReport> {
    let board = api
        .find_board(board_query)?
        .ok_or_else(|| ToolError::BoardNotFound(board_query.to_string()))?;
    info!(board = %board.name, id = %board.id, "board selected");

    let records = io::read_records(input)?;
    info!(row_count = records.len(), "loaded export");

    let due_date_column =
        match api.get_or_create_due_date_column(&board.id, &options.due_date_column_title) {
            Ok(column) => Some(column),
            Err(error) => {
                warn!(%error, "due date column unavailable; subitems will be undated");
                None
            }
        };

    sync_rows(
        api,
        &board.id,
        due_date_column.as_deref(),
        &records,
        &RowLayout::monday_export(),
        tasks,
        options,
    )
}

pub(crate) fn pause(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn department_layout_only_takes_main_rows() {
        let layout = RowLayout::department_board();
        let main = Record::from_pairs([("Item", "Tee - Black"), ("Type", "Main Item")]);
        let task = Record::from_pairs([("Item", "  Fit Approved"), ("Type", "Sub Item")]);
        let blank = Record::from_pairs([("Item", ""), ("Type", "Main Item")]);
        assert!(layout.is_main_item(&main));
        assert!(!layout.is_main_item(&task));
        assert!(!layout.is_main_item(&blank));
    }

    #[test]
    fn export_layout_skips_subitem_sections() {
        let layout = RowLayout::monday_export();
        assert!(layout.is_main_item(&Record::from_pairs([("Name", "Hoodie")])));
        assert!(!layout.is_main_item(&Record::from_pairs([("Name", "Subitems")])));
    }

    #[test]
    fn item_values_drop_blanks_and_normalise_launch() {
        let layout = RowLayout::department_board();
        let record = Record::from_pairs([
            ("Item", "Tee"),
            ("Style Name", "Classic Tee"),
            ("Color Name", " "),
            ("Platform", "Web"),
        ]);
        let launch = NaiveDate::from_ymd_opt(2025, 9, 30);
        let values = layout.item_values(&record, launch);
        assert_eq!(values.get("text").map(String::as_str), Some("Classic Tee"));
        assert_eq!(values.get("text4").map(String::as_str), Some("Web"));
        assert_eq!(values.get("date").map(String::as_str), Some("2025-09-30"));
        assert!(!values.contains_key("text1"));
    }
}
