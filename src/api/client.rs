use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::api::{BoardApi, queries};
use crate::config::Settings;
use crate::error::{Result, ToolError};
use crate::model::{Board, BoardKind, Column, ColumnType, ColumnValues, Group, Item, Subitem};

/// Items requested per page; the API caps `items_page` at 500.
pub const ITEMS_PAGE_LIMIT: u32 = 500;

/// Boards requested per page. Without a limit the API returns only 25.
pub const BOARDS_PAGE_LIMIT: u32 = 100;

/// Blocking GraphQL client for the Monday.com v2 API.
#[derive(Debug, Clone)]
pub struct MondayClient {
    http: Client,
    endpoint: String,
    page_limit: u32,
    board_page_limit: u32,
}

impl MondayClient {
    pub fn new(token: &str, endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        Self::build(token, endpoint.into(), timeout, None)
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::build(
            settings.require_token()?,
            settings.base_url.clone(),
            settings.timeout(),
            settings.api_version.as_deref(),
        )
    }

    /// Overrides the page size used when walking board items.
    pub fn with_page_limit(mut self, limit: u32) -> Self {
        self.page_limit = limit.clamp(1, ITEMS_PAGE_LIMIT);
        self
    }

    /// Overrides the page size used when listing boards.
    pub fn with_board_page_limit(mut self, limit: u32) -> Self {
        self.board_page_limit = limit.max(1);
        self
    }

    fn build(
        token: &str,
        endpoint: String,
        timeout: Duration,
        api_version: Option<&str>,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut authorization = HeaderValue::from_str(token)
            .map_err(|_| ToolError::InvalidInput("API token is not a valid header value".into()))?;
        authorization.set_sensitive(true);
        headers.insert(AUTHORIZATION, authorization);
        if let Some(version) = api_version {
            let value = HeaderValue::from_str(version)
                .map_err(|_| ToolError::InvalidInput(format!("invalid API version '{version}'")))?;
            headers.insert("api-version", value);
        }

        let http = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            endpoint,
            page_limit: ITEMS_PAGE_LIMIT,
            board_page_limit: BOARDS_PAGE_LIMIT,
        })
    }

    /// Sends one GraphQL document and decodes its `data` member.
    #[instrument(level = "debug", skip(self, query, variables))]
    fn execute<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: Value,
    ) -> Result<T> {
        let payload = json!({ "query": query, "variables": variables });
        let response = self.http.post(&self.endpoint).json(&payload).send()?;
        let status = response.status();

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(ToolError::Unauthorized {
                    status: status.as_u16(),
                });
            }
            StatusCode::TOO_MANY_REQUESTS => return Err(ToolError::RateLimited),
            _ if !status.is_success() => {
                let body = response.text().unwrap_or_default();
                return Err(ToolError::Api {
                    status: status.as_u16(),
                    body,
                });
            }
            _ => {}
        }

        let text = response.text()?;
        debug!(bytes = text.len(), "response received");
        decode_envelope(&text)
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
    #[serde(default)]
    error_message: Option<String>,
}

fn decode_envelope<T: DeserializeOwned>(text: &str) -> Result<T> {
    let envelope: Envelope = serde_json::from_str(text)
        .map_err(|error| ToolError::MalformedResponse(format!("invalid JSON: {error}")))?;

    if let Some(errors) = envelope.errors.filter(|errors| !errors.is_empty()) {
        return Err(ToolError::GraphQl(
            errors.into_iter().map(|error| error.message).collect(),
        ));
    }
    if let Some(message) = envelope.error_message {
        return Err(ToolError::GraphQl(vec![message]));
    }

    let data = envelope
        .data
        .filter(|data| !data.is_null())
        .ok_or_else(|| ToolError::MalformedResponse("response has no data".into()))?;
    serde_json::from_value(data)
        .map_err(|error| ToolError::MalformedResponse(format!("unexpected shape: {error}")))
}

#[derive(Deserialize)]
struct BoardsData<T> {
    boards: Vec<T>,
}

impl<T> BoardsData<T> {
    fn into_first(self) -> Option<T> {
        self.boards.into_iter().next()
    }
}

#[derive(Deserialize)]
struct ColumnsOnly {
    columns: Vec<Column>,
}

#[derive(Deserialize)]
struct GroupsOnly {
    groups: Vec<Group>,
}

#[derive(Deserialize)]
struct ItemsPage {
    cursor: Option<String>,
    items: Vec<Item>,
}

#[derive(Deserialize)]
struct ItemsPageOnly {
    items_page: ItemsPage,
}

#[derive(Deserialize)]
struct NextItemsPage {
    next_items_page: ItemsPage,
}

#[derive(Deserialize)]
struct CreatedBoard {
    create_board: Board,
}

#[derive(Deserialize)]
struct CreatedColumn {
    create_column: Column,
}

#[derive(Deserialize)]
struct CreatedGroup {
    create_group: Group,
}

#[derive(Deserialize)]
struct CreatedItem {
    create_item: Item,
}

#[derive(Deserialize)]
struct CreatedSubitem {
    create_subitem: Subitem,
}

impl BoardApi for MondayClient {
    fn list_boards(&self) -> Result<Vec<Board>> {
        let mut boards = Vec::new();
        let mut page = 1u32;
        loop {
            let data: BoardsData<Board> = self.execute(
                "boards",
                queries::LIST_BOARDS,
                json!({ "limit": self.board_page_limit, "page": page }),
            )?;
            let fetched = data.boards.len();
            boards.extend(data.boards);
            if fetched < self.board_page_limit as usize {
                break;
            }
            page += 1;
        }

        debug!(board_count = boards.len(), pages = page, "fetched boards");
        Ok(boards)
    }

    fn create_board(&self, name: &str, kind: BoardKind) -> Result<Board> {
        let data: CreatedBoard = self.execute(
            "create_board",
            queries::CREATE_BOARD,
            json!({ "boardName": name, "boardKind": kind.as_str() }),
        )?;
        Ok(data.create_board)
    }

    fn board_columns(&self, board_id: &str) -> Result<Vec<Column>> {
        let data: BoardsData<ColumnsOnly> = self.execute(
            "board_columns",
            queries::BOARD_COLUMNS,
            json!({ "boardIds": [board_id] }),
        )?;
        Ok(data.into_first().map(|board| board.columns).unwrap_or_default())
    }

    fn create_column(
        &self,
        board_id: &str,
        title: &str,
        column_type: ColumnType,
    ) -> Result<Column> {
        let type_name = column_type.api_name().ok_or_else(|| {
            ToolError::InvalidInput(format!("cannot create a column of type {column_type:?}"))
        })?;
        let data: CreatedColumn = self.execute(
            "create_column",
            queries::CREATE_COLUMN,
            json!({ "boardId": board_id, "title": title, "columnType": type_name }),
        )?;
        Ok(data.create_column)
    }

    fn board_groups(&self, board_id: &str) -> Result<Vec<Group>> {
        let data: BoardsData<GroupsOnly> = self.execute(
            "board_groups",
            queries::BOARD_GROUPS,
            json!({ "boardIds": [board_id] }),
        )?;
        Ok(data.into_first().map(|board| board.groups).unwrap_or_default())
    }

    fn create_group(&self, board_id: &str, name: &str) -> Result<Group> {
        let data: CreatedGroup = self.execute(
            "create_group",
            queries::CREATE_GROUP,
            json!({ "boardId": board_id, "groupName": name }),
        )?;
        Ok(data.create_group)
    }

    fn board_items(&self, board_id: &str) -> Result<Vec<Item>> {
        let first: BoardsData<ItemsPageOnly> = self.execute(
            "items_page",
            queries::ITEMS_PAGE,
            json!({ "boardIds": [board_id], "limit": self.page_limit }),
        )?;
        let Some(ItemsPageOnly { items_page }) = first.into_first() else {
            return Ok(Vec::new());
        };

        let mut items = items_page.items;
        let mut cursor = items_page.cursor;
        while let Some(current) = cursor {
            let next: NextItemsPage = self.execute(
                "next_items_page",
                queries::NEXT_ITEMS_PAGE,
                json!({ "cursor": current, "limit": self.page_limit }),
            )?;
            items.extend(next.next_items_page.items);
            cursor = next.next_items_page.cursor;
        }

        debug!(board_id, item_count = items.len(), "fetched board items");
        Ok(items)
    }

    fn create_item(
        &self,
        board_id: &str,
        group_id: Option<&str>,
        name: &str,
        values: &ColumnValues,
    ) -> Result<Item> {
        let data: CreatedItem = self.execute(
            "create_item",
            queries::CREATE_ITEM,
            json!({
                "boardId": board_id,
                "groupId": group_id,
                "itemName": name,
                "columnValues": serde_json::to_string(values)?,
            }),
        )?;
        Ok(data.create_item)
    }

    fn create_subitem(
        &self,
        parent_item_id: &str,
        name: &str,
        values: &ColumnValues,
    ) -> Result<Subitem> {
        let data: CreatedSubitem = self.execute(
            "create_subitem",
            queries::CREATE_SUBITEM,
            json!({
                "parentItemId": parent_item_id,
                "subitemName": name,
                "columnValues": serde_json::to_string(values)?,
            }),
        )?;
        Ok(data.create_subitem)
    }
}
