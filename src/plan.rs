//! The production plan: departments, their boards, and the lead time of every
//! task relative to a launch date. Loaded from `monday_config.json`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolError};

/// A task created as a subitem under every main item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubItemSpec {
    pub task_name: String,
    pub lead_time_weeks: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SubItemSpec {
    pub fn new(task_name: impl Into<String>, lead_time_weeks: u32) -> Self {
        Self {
            task_name: task_name.into(),
            lead_time_weeks,
            description: None,
        }
    }
}

/// Product development milestones used when no plan file names the tasks.
pub fn default_tasks() -> Vec<SubItemSpec> {
    vec![
        SubItemSpec::new("Fabric Approved", 40),
        SubItemSpec::new("Design Approved", 26),
        SubItemSpec::new("Fit Approved", 18),
        SubItemSpec::new("Color Approved", 16),
        SubItemSpec::new("Production Approved", 12),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub board_name: String,
    #[serde(default)]
    pub sub_items: Vec<SubItemSpec>,
}

/// Header names of the master sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetColumns {
    pub item_name_column: String,
    pub style_name_column: String,
    pub color_name_column: String,
    pub priority_column: String,
    pub status_column: String,
    pub platform_column: String,
    pub launch_date_column: String,
}

impl Default for SheetColumns {
    fn default() -> Self {
        Self {
            item_name_column: "Item".into(),
            style_name_column: "Style Name".into(),
            color_name_column: "Color Name".into(),
            priority_column: "Priority".into(),
            status_column: "Exec Status".into(),
            platform_column: "Platform".into(),
            launch_date_column: "Launch Date".into(),
        }
    }
}

/// Routes a source item into a target group when its group title contains
/// `contains` (case-insensitive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRule {
    pub contains: String,
    pub group: String,
}

/// Settings for copying one board into another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuplicationPlan {
    pub source_board: String,
    pub target_board: String,
    /// Department whose sub items are recreated under each copied item.
    pub department: String,
    pub rules: Vec<GroupRule>,
    pub default_group: String,
    pub subitem_status: String,
    pub subitem_due_date_column: String,
}

impl Default for DuplicationPlan {
    fn default() -> Self {
        let rule = |contains: &str, group: &str| GroupRule {
            contains: contains.into(),
            group: group.into(),
        };
        Self {
            source_board: "SS26 Master".into(),
            target_board: "SS26 Prod Dev".into(),
            department: "Product Development".into(),
            rules: vec![
                rule("new colors", "SS26 New Colors"),
                rule("new styles", "SS26 New Styles"),
                rule("end of life", "End of Life Products"),
            ],
            default_group: "SS26 New Colors".into(),
            subitem_status: "Working on it".into(),
            subitem_due_date_column: "date".into(),
        }
    }
}

impl DuplicationPlan {
    /// Group an item from `source_group` lands in.
    pub fn target_group(&self, source_group: &str) -> &str {
        let lowered = source_group.to_lowercase();
        self.rules
            .iter()
            .find(|rule| lowered.contains(&rule.contains.to_lowercase()))
            .map(|rule| rule.group.as_str())
            .unwrap_or(&self.default_group)
    }

    /// Every group the target board needs, rules first, without repeats.
    pub fn target_groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = Vec::new();
        let candidates = self
            .rules
            .iter()
            .map(|rule| rule.group.as_str())
            .chain(std::iter::once(self.default_group.as_str()));
        for group in candidates {
            if !groups.contains(&group) {
                groups.push(group);
            }
        }
        groups
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub departments: BTreeMap<String, Department>,
    #[serde(default)]
    pub settings: SheetColumns,
    #[serde(default)]
    pub duplication: DuplicationPlan,
}

impl Plan {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ToolError::MissingInput(path.to_path_buf()));
        }
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn department(&self, name: &str) -> Result<&Department> {
        self.departments
            .get(name)
            .ok_or_else(|| ToolError::UnknownDepartment(name.to_string()))
    }
}

/// File stem used for a department's generated board, e.g.
/// `Product Development` → `product_development_board`.
pub fn board_file_stem(department: &str) -> String {
    format!("{}_board", department.to_lowercase().replace(' ', "_"))
}
