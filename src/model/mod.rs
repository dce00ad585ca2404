use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier assigned by Monday.com. The API serialises every id as a string.
pub type ObjectId = String;

/// Column id → value mapping sent alongside item and subitem mutations.
///
/// Values are plain strings; the API accepts the simple textual form for text,
/// status, date and dropdown columns.
pub type ColumnValues = BTreeMap<String, String>;

/// Drops entries whose value is blank so the API never receives empty updates.
pub fn compact(values: ColumnValues) -> ColumnValues {
    values
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .collect()
}

/// Visibility of a board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardKind {
    #[default]
    Private,
    Public,
    Share,
}

impl BoardKind {
    /// Name of the `BoardKind` GraphQL enum value.
    pub fn as_str(self) -> &'static str {
        match self {
            BoardKind::Private => "private",
            BoardKind::Public => "public",
            BoardKind::Share => "share",
        }
    }
}

impl fmt::Display for BoardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column types the tool reads or creates. Everything else maps to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Status,
    Date,
    Dropdown,
    #[serde(other)]
    Other,
}

impl ColumnType {
    /// Name of the `ColumnType` GraphQL enum value, if the tool may create it.
    pub fn api_name(self) -> Option<&'static str> {
        match self {
            ColumnType::Text => Some("text"),
            ColumnType::Status => Some("status"),
            ColumnType::Date => Some("date"),
            ColumnType::Dropdown => Some("dropdown"),
            ColumnType::Other => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ObjectId,
    pub title: String,
    #[serde(rename = "type", default = "other_column")]
    pub column_type: ColumnType,
}

fn other_column() -> ColumnType {
    ColumnType::Other
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: ObjectId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub board_kind: Option<BoardKind>,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub groups: Vec<Group>,
}

/// First column whose title contains `needle`, ignoring case.
pub fn column_titled_like<'a>(columns: &'a [Column], needle: &str) -> Option<&'a Column> {
    let needle = needle.to_lowercase();
    columns
        .iter()
        .find(|column| column.title.to_lowercase().contains(&needle))
}

/// A single cell of an item as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnValue {
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
    /// Raw JSON encoded value.
    #[serde(default)]
    pub value: Option<String>,
}

impl ColumnValue {
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub group: Option<Group>,
    #[serde(default)]
    pub column_values: Vec<ColumnValue>,
}

impl Item {
    pub fn group_title(&self) -> &str {
        self.group.as_ref().map(|group| group.title.as_str()).unwrap_or_default()
    }
}

/// Child row of an item. Subitems live on a board of their own, but the tool
/// only ever reaches them through their parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subitem {
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub column_values: Vec<ColumnValue>,
}

/// A failure recorded while processing one item or subitem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub item: String,
    pub subitem: Option<String>,
    pub message: String,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subitem {
            Some(subitem) => write!(f, "{} / {}: {}", self.item, subitem, self.message),
            None => write!(f, "{}: {}", self.item, self.message),
        }
    }
}

/// Outcome of a sync or duplication run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub items_created: usize,
    pub items_skipped: usize,
    pub subitems_created: usize,
    pub failures: Vec<Failure>,
}

impl SyncReport {
    pub fn record_item_failure(&mut self, item: &str, message: impl ToString) {
        self.failures.push(Failure {
            item: item.to_string(),
            subitem: None,
            message: message.to_string(),
        });
    }

    pub fn record_subitem_failure(&mut self, item: &str, subitem: &str, message: impl ToString) {
        self.failures.push(Failure {
            item: item.to_string(),
            subitem: Some(subitem.to_string()),
            message: message.to_string(),
        });
    }

    /// Folds another report into this one.
    pub fn absorb(&mut self, other: SyncReport) {
        self.items_created += other.items_created;
        self.items_skipped += other.items_skipped;
        self.subitems_created += other.subitems_created;
        self.failures.extend(other.failures);
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "items created: {}, items skipped: {}, subitems created: {}, failures: {}",
            self.items_created,
            self.items_skipped,
            self.subitems_created,
            self.failures.len()
        )
    }
}
