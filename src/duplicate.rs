//! Copies every item of one board into another, sorting items into groups and
//! recreating the department's task subitems with fresh due dates.

use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use crate::api::BoardApi;
use crate::config::Settings;
use crate::dates::parse_launch_date;
use crate::error::{Result, ToolError};
use crate::model::{BoardKind, Column, ColumnValues, Item, SyncReport, column_titled_like, compact};
use crate::plan::Plan;
use crate::sync::{SubitemTemplate, create_task_subitems, pause};

const PLATFORM: &str = "platform";
const LAUNCH_HINTS: [&str; 2] = ["launch", "date"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateOptions {
    pub delay: Duration,
    pub board_kind: BoardKind,
}

impl Default for DuplicateOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl DuplicateOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            delay: settings.duplicate_delay(),
            board_kind: settings.board_kind,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct PlatformMapping {
    source: Option<Column>,
    target: Option<Column>,
}

/// Launch date of an item: the first cell whose column id mentions a launch or
/// a date and whose text parses.
pub fn launch_date_of(item: &Item) -> Option<NaiveDate> {
    item.column_values
        .iter()
        .filter(|value| {
            let id = value.id.to_lowercase();
            LAUNCH_HINTS.iter().any(|hint| id.contains(hint))
        })
        .find_map(|value| parse_launch_date(value.text()))
}

/// Column texts to carry over. Only columns that exist on the target board
/// are copied; the platform value is moved onto the target's platform column.
fn copy_column_values(
    item: &Item,
    platform: &PlatformMapping,
    target_columns: &HashSet<&str>,
) -> ColumnValues {
    let source_platform = platform.source.as_ref().map(|column| column.id.as_str());
    let mut values = ColumnValues::new();
    let mut platform_value = None;

    for cell in &item.column_values {
        if Some(cell.id.as_str()) == source_platform {
            platform_value = Some(cell.text().to_string());
            continue;
        }
        if target_columns.contains(cell.id.as_str()) {
            values.insert(cell.id.clone(), cell.text().to_string());
        }
    }

    if let (Some(value), Some(target)) = (platform_value, &platform.target) {
        values.insert(target.id.clone(), value);
    }

    compact(values)
}

/// Duplicates the plan's source board into its target board.
///
/// The source board must exist; the target board and its groups are created
/// on demand. Items already present on the target (by name) are skipped, so a
/// second run only copies what is new.
#[instrument(level = "info", skip_all, fields(
    source = %plan.duplication.source_board,
    target = %plan.duplication.target_board,
))]
pub fn duplicate_board<A: BoardApi + ?Sized>(
    api: &A,
    plan: &Plan,
    options: &DuplicateOptions,
) -> Result<SyncReport> {
    let settings = &plan.duplication;
    let tasks = &plan.department(&settings.department)?.sub_items;

    let source = api
        .board_by_name(&settings.source_board)?
        .ok_or_else(|| ToolError::BoardNotFound(settings.source_board.clone()))?;
    let target = api.get_or_create_board(&settings.target_board, options.board_kind)?;
    info!(source_id = %source.id, target_id = %target.id, "boards ready");

    let source_items = api.board_items(&source.id)?;
    info!(item_count = source_items.len(), "fetched source items");

    let source_columns = api.board_columns(&source.id)?;
    let target_columns = api.board_columns(&target.id)?;
    let platform = PlatformMapping {
        source: column_titled_like(&source_columns, PLATFORM).cloned(),
        target: column_titled_like(&target_columns, PLATFORM).cloned(),
    };
    match (&platform.source, &platform.target) {
        (Some(from), Some(to)) => info!(from = %from.title, to = %to.title, "platform column mapped"),
        _ => warn!("platform column missing on one or both boards"),
    }
    let target_column_ids: HashSet<&str> =
        target_columns.iter().map(|column| column.id.as_str()).collect();

    let mut groups: BTreeMap<&str, String> = BTreeMap::new();
    for group in settings.target_groups() {
        let id = api.get_or_create_group(&target.id, group)?;
        info!(group, id = %id, "group ready");
        groups.insert(group, id);
    }

    let mut existing: HashSet<String> = api
        .board_items(&target.id)?
        .into_iter()
        .map(|item| item.name)
        .collect();

    let template = SubitemTemplate {
        status: settings.subitem_status.clone(),
        due_date_column: Some(settings.subitem_due_date_column.clone()),
        description_column: None,
    };
    let mut report = SyncReport::default();
    let total = source_items.len();

    for (index, item) in source_items.iter().enumerate() {
        info!(progress = %format!("{}/{total}", index + 1), item = %item.name, "processing");

        if existing.contains(&item.name) {
            info!(item = %item.name, "already on target board; skipped");
            report.items_skipped += 1;
            continue;
        }

        let group_name = settings.target_group(item.group_title());
        let Some(group_id) = groups.get(group_name) else {
            report.record_item_failure(&item.name, format!("no group '{group_name}' on target"));
            continue;
        };

        let values = copy_column_values(item, &platform, &target_column_ids);
        let created = match api.create_item(&target.id, Some(group_id.as_str()), &item.name, &values) {
            Ok(created) => created,
            Err(error) => {
                warn!(item = %item.name, %error, "item creation failed");
                report.record_item_failure(&item.name, error);
                continue;
            }
        };
        info!(item = %created.name, id = %created.id, group = group_name, "item created");
        existing.insert(created.name.clone());
        report.items_created += 1;

        let launch = launch_date_of(item);
        if launch.is_none() {
            info!(item = %created.name, "no launch date; subitems created without due dates");
        }
        create_task_subitems(api, &created, launch, tasks, &template, &mut report);

        pause(options.delay);
    }

    info!(%report, "duplication finished");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColumnType, ColumnValue};

    fn cell(id: &str, text: &str) -> ColumnValue {
        ColumnValue {
            id: id.into(),
            text: Some(text.into()),
            value: None,
        }
    }

    fn column(id: &str, title: &str) -> Column {
        Column {
            id: id.into(),
            title: title.into(),
            column_type: ColumnType::Text,
        }
    }

    fn item(values: Vec<ColumnValue>) -> Item {
        Item {
            id: "1".into(),
            name: "Tee".into(),
            group: None,
            column_values: values,
        }
    }

    #[test]
    fn launch_date_uses_first_parseable_hinted_column() {
        let item = item(vec![
            cell("text", "2020-01-01"),
            cell("date4", "TBD"),
            cell("launch_date", "45930"),
            cell("date", "2024-06-01"),
        ]);
        assert_eq!(launch_date_of(&item), NaiveDate::from_ymd_opt(2025, 9, 30));
    }

    #[test]
    fn platform_value_moves_to_target_column() {
        let item = item(vec![
            cell("dropdown7", "Web"),
            cell("text", "Classic Tee"),
            cell("text9", "not on target"),
            cell("status", ""),
        ]);
        let platform = PlatformMapping {
            source: Some(column("dropdown7", "Platform")),
            target: Some(column("dropdown2", "Sales Platform")),
        };
        let target: HashSet<&str> = ["text", "status", "dropdown2", "dropdown7"].into();

        let values = copy_column_values(&item, &platform, &target);
        assert_eq!(
            values,
            ColumnValues::from([
                ("dropdown2".to_string(), "Web".to_string()),
                ("text".to_string(), "Classic Tee".to_string()),
            ])
        );
    }
}
