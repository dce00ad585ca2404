//! Operations the sync drivers need from Monday.com.
//!
//! [`BoardApi`] carries the raw calls; the provided methods layer the
//! lookup-before-create rules on top so every implementation shares them.

pub mod client;
pub mod queries;

pub use client::MondayClient;

use tracing::{debug, info};

use crate::error::Result;
use crate::model::{Board, BoardKind, Column, ColumnType, ColumnValues, Group, Item, Subitem};

/// Lowercased name prefix Monday gives the board holding an item board's subitems.
pub const SUBITEMS_BOARD_PREFIX: &str = "subitems of ";

pub trait BoardApi {
    fn list_boards(&self) -> Result<Vec<Board>>;

    fn create_board(&self, name: &str, kind: BoardKind) -> Result<Board>;

    fn board_columns(&self, board_id: &str) -> Result<Vec<Column>>;

    fn create_column(&self, board_id: &str, title: &str, column_type: ColumnType)
    -> Result<Column>;

    fn board_groups(&self, board_id: &str) -> Result<Vec<Group>>;

    fn create_group(&self, board_id: &str, name: &str) -> Result<Group>;

    /// Every item on the board, across all pages.
    fn board_items(&self, board_id: &str) -> Result<Vec<Item>>;

    fn create_item(
        &self,
        board_id: &str,
        group_id: Option<&str>,
        name: &str,
        values: &ColumnValues,
    ) -> Result<Item>;

    fn create_subitem(
        &self,
        parent_item_id: &str,
        name: &str,
        values: &ColumnValues,
    ) -> Result<Subitem>;

    fn board_by_name(&self, name: &str) -> Result<Option<Board>> {
        Ok(self
            .list_boards()?
            .into_iter()
            .find(|board| board.name == name))
    }

    /// Exact name match first, then the first board whose name contains the
    /// query, ignoring case. Subitem boards only match exactly.
    fn find_board(&self, query: &str) -> Result<Option<Board>> {
        let boards = self.list_boards()?;
        if let Some(board) = boards.iter().find(|board| board.name == query) {
            return Ok(Some(board.clone()));
        }
        let needle = query.to_lowercase();
        Ok(boards.into_iter().find(|board| {
            let name = board.name.to_lowercase();
            !name.starts_with(SUBITEMS_BOARD_PREFIX) && name.contains(&needle)
        }))
    }

    fn get_or_create_board(&self, name: &str, kind: BoardKind) -> Result<Board> {
        if let Some(board) = self.board_by_name(name)? {
            debug!(board = %board.name, id = %board.id, "using existing board");
            return Ok(board);
        }
        info!(board = name, %kind, "creating board");
        self.create_board(name, kind)
    }

    /// Id of the column titled `title`, creating a date column when absent.
    fn get_or_create_due_date_column(&self, board_id: &str, title: &str) -> Result<String> {
        if let Some(column) = self
            .board_columns(board_id)?
            .into_iter()
            .find(|column| column.title == title)
        {
            return Ok(column.id);
        }
        info!(board_id, title, "creating due date column");
        Ok(self.create_column(board_id, title, ColumnType::Date)?.id)
    }

    fn get_or_create_group(&self, board_id: &str, name: &str) -> Result<String> {
        if let Some(group) = self
            .board_groups(board_id)?
            .into_iter()
            .find(|group| group.title == name)
        {
            return Ok(group.id);
        }
        info!(board_id, group = name, "creating group");
        Ok(self.create_group(board_id, name)?.id)
    }

    fn find_item_by_name(&self, board_id: &str, name: &str) -> Result<Option<Item>> {
        Ok(self
            .board_items(board_id)?
            .into_iter()
            .find(|item| item.name == name))
    }
}
