#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};

use monday_tools::api::BoardApi;
use monday_tools::model::{
    Board, BoardKind, Column, ColumnType, ColumnValue, ColumnValues, Group, Item, Subitem,
};
use monday_tools::{Result, ToolError};

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedItem {
    pub board_id: String,
    pub group_id: Option<String>,
    pub name: String,
    pub values: ColumnValues,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedSubitem {
    pub parent_id: String,
    pub name: String,
    pub values: ColumnValues,
}

#[derive(Default)]
struct State {
    next_id: u64,
    boards: Vec<Board>,
    items: BTreeMap<String, Vec<Item>>,
    created_boards: Vec<String>,
    created_columns: Vec<(String, String)>,
    created_groups: Vec<(String, String)>,
    created_items: Vec<CreatedItem>,
    created_subitems: Vec<CreatedSubitem>,
}

impl State {
    fn next_id(&mut self) -> String {
        self.next_id += 1;
        format!("{}", 1000 + self.next_id)
    }

    fn board_mut(&mut self, board_id: &str) -> Result<&mut Board> {
        self.boards
            .iter_mut()
            .find(|board| board.id == board_id)
            .ok_or_else(|| ToolError::GraphQl(vec![format!("board {board_id} does not exist")]))
    }
}

/// In-memory stand-in for Monday.com that records every mutation.
#[derive(Default)]
pub struct FakeMonday {
    state: RefCell<State>,
    failing_items: HashSet<String>,
    failing_subitems: HashSet<String>,
}

impl FakeMonday {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subitem creation fails for tasks with this name.
    pub fn fail_subitem(mut self, name: &str) -> Self {
        self.failing_subitems.insert(name.to_string());
        self
    }

    /// Item creation fails for items with this name.
    pub fn fail_item(mut self, name: &str) -> Self {
        self.failing_items.insert(name.to_string());
        self
    }

    pub fn add_board(&self, name: &str, columns: &[(&str, &str, ColumnType)]) -> String {
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.boards.push(Board {
            id: id.clone(),
            name: name.to_string(),
            state: Some("active".into()),
            board_kind: Some(BoardKind::Private),
            columns: columns
                .iter()
                .map(|(id, title, column_type)| Column {
                    id: id.to_string(),
                    title: title.to_string(),
                    column_type: *column_type,
                })
                .collect(),
            groups: Vec::new(),
        });
        id
    }

    pub fn add_group(&self, board_id: &str, title: &str) -> String {
        let mut state = self.state.borrow_mut();
        let id = format!("group_{}", state.next_id());
        state
            .board_mut(board_id)
            .expect("board exists")
            .groups
            .push(Group {
                id: id.clone(),
                title: title.to_string(),
            });
        id
    }

    pub fn add_item(&self, board_id: &str, name: &str, group: Option<&str>, cells: &[(&str, &str)]) {
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        let group = group.map(|title| Group {
            id: format!("src_{}", title.to_lowercase().replace(' ', "_")),
            title: title.to_string(),
        });
        state.items.entry(board_id.to_string()).or_default().push(Item {
            id,
            name: name.to_string(),
            group,
            column_values: cells
                .iter()
                .map(|(id, text)| ColumnValue {
                    id: id.to_string(),
                    text: Some(text.to_string()),
                    value: None,
                })
                .collect(),
        });
    }

    pub fn board_id(&self, name: &str) -> Option<String> {
        self.state
            .borrow()
            .boards
            .iter()
            .find(|board| board.name == name)
            .map(|board| board.id.clone())
    }

    pub fn created_boards(&self) -> Vec<String> {
        self.state.borrow().created_boards.clone()
    }

    pub fn created_columns(&self) -> Vec<(String, String)> {
        self.state.borrow().created_columns.clone()
    }

    pub fn created_groups(&self) -> Vec<(String, String)> {
        self.state.borrow().created_groups.clone()
    }

    pub fn created_items(&self) -> Vec<CreatedItem> {
        self.state.borrow().created_items.clone()
    }

    pub fn created_subitems(&self) -> Vec<CreatedSubitem> {
        self.state.borrow().created_subitems.clone()
    }

    pub fn subitems_of(&self, item_name: &str) -> Vec<CreatedSubitem> {
        let state = self.state.borrow();
        let parent_ids: HashSet<String> = state
            .items
            .values()
            .flatten()
            .filter(|item| item.name == item_name)
            .map(|item| item.id.clone())
            .collect();
        state
            .created_subitems
            .iter()
            .filter(|subitem| parent_ids.contains(&subitem.parent_id))
            .cloned()
            .collect()
    }
}

impl BoardApi for FakeMonday {
    fn list_boards(&self) -> Result<Vec<Board>> {
        Ok(self.state.borrow().boards.clone())
    }

    fn create_board(&self, name: &str, kind: BoardKind) -> Result<Board> {
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        let board = Board {
            id,
            name: name.to_string(),
            state: Some("active".into()),
            board_kind: Some(kind),
            columns: Vec::new(),
            groups: Vec::new(),
        };
        state.boards.push(board.clone());
        state.created_boards.push(name.to_string());
        Ok(board)
    }

    fn board_columns(&self, board_id: &str) -> Result<Vec<Column>> {
        Ok(self.state.borrow_mut().board_mut(board_id)?.columns.clone())
    }

    fn create_column(&self, board_id: &str, title: &str, column_type: ColumnType) -> Result<Column> {
        let mut state = self.state.borrow_mut();
        let id = format!("date_{}", state.next_id());
        let column = Column {
            id,
            title: title.to_string(),
            column_type,
        };
        state.board_mut(board_id)?.columns.push(column.clone());
        state
            .created_columns
            .push((board_id.to_string(), title.to_string()));
        Ok(column)
    }

    fn board_groups(&self, board_id: &str) -> Result<Vec<Group>> {
        Ok(self.state.borrow_mut().board_mut(board_id)?.groups.clone())
    }

    fn create_group(&self, board_id: &str, name: &str) -> Result<Group> {
        let mut state = self.state.borrow_mut();
        let group = Group {
            id: format!("group_{}", state.next_id()),
            title: name.to_string(),
        };
        state.board_mut(board_id)?.groups.push(group.clone());
        state
            .created_groups
            .push((board_id.to_string(), name.to_string()));
        Ok(group)
    }

    fn board_items(&self, board_id: &str) -> Result<Vec<Item>> {
        let mut state = self.state.borrow_mut();
        state.board_mut(board_id)?;
        Ok(state.items.get(board_id).cloned().unwrap_or_default())
    }

    fn create_item(
        &self,
        board_id: &str,
        group_id: Option<&str>,
        name: &str,
        values: &ColumnValues,
    ) -> Result<Item> {
        if self.failing_items.contains(name) {
            return Err(ToolError::Api {
                status: 500,
                body: format!("cannot create {name}"),
            });
        }
        let mut state = self.state.borrow_mut();
        let group = match group_id {
            Some(group_id) => {
                let board = state.board_mut(board_id)?;
                let group = board
                    .groups
                    .iter()
                    .find(|group| group.id == group_id)
                    .cloned()
                    .ok_or_else(|| ToolError::GraphQl(vec![format!("group {group_id} missing")]))?;
                Some(group)
            }
            None => {
                state.board_mut(board_id)?;
                None
            }
        };
        let item = Item {
            id: state.next_id(),
            name: name.to_string(),
            group,
            column_values: Vec::new(),
        };
        state
            .items
            .entry(board_id.to_string())
            .or_default()
            .push(item.clone());
        state.created_items.push(CreatedItem {
            board_id: board_id.to_string(),
            group_id: group_id.map(str::to_string),
            name: name.to_string(),
            values: values.clone(),
        });
        Ok(item)
    }

    fn create_subitem(
        &self,
        parent_item_id: &str,
        name: &str,
        values: &ColumnValues,
    ) -> Result<Subitem> {
        if self.failing_subitems.contains(name) {
            return Err(ToolError::RateLimited);
        }
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.created_subitems.push(CreatedSubitem {
            parent_id: parent_item_id.to_string(),
            name: name.to_string(),
            values: values.clone(),
        });
        Ok(Subitem {
            id,
            name: name.to_string(),
            column_values: Vec::new(),
        })
    }
}
