//! GraphQL documents sent to the Monday.com API.

pub const LIST_BOARDS: &str = r#"
query ($limit: Int!, $page: Int!) {
    boards(limit: $limit, page: $page) {
        id
        name
        state
        board_kind
        columns { id title type }
        groups { id title }
    }
}
"#;

pub const CREATE_BOARD: &str = r#"
mutation ($boardName: String!, $boardKind: BoardKind!) {
    create_board(board_name: $boardName, board_kind: $boardKind) {
        id
        name
    }
}
"#;

pub const BOARD_COLUMNS: &str = r#"
query ($boardIds: [ID!]!) {
    boards(ids: $boardIds) {
        columns { id title type }
    }
}
"#;

pub const CREATE_COLUMN: &str = r#"
mutation ($boardId: ID!, $title: String!, $columnType: ColumnType!) {
    create_column(board_id: $boardId, title: $title, column_type: $columnType) {
        id
        title
        type
    }
}
"#;

pub const BOARD_GROUPS: &str = r#"
query ($boardIds: [ID!]!) {
    boards(ids: $boardIds) {
        groups { id title }
    }
}
"#;

pub const CREATE_GROUP: &str = r#"
mutation ($boardId: ID!, $groupName: String!) {
    create_group(board_id: $boardId, group_name: $groupName) {
        id
        title
    }
}
"#;

pub const ITEMS_PAGE: &str = r#"
query ($boardIds: [ID!]!, $limit: Int!) {
    boards(ids: $boardIds) {
        items_page(limit: $limit) {
            cursor
            items {
                id
                name
                group { id title }
                column_values { id text value }
            }
        }
    }
}
"#;

pub const NEXT_ITEMS_PAGE: &str = r#"
query ($cursor: String!, $limit: Int!) {
    next_items_page(cursor: $cursor, limit: $limit) {
        cursor
        items {
            id
            name
            group { id title }
            column_values { id text value }
        }
    }
}
"#;

pub const CREATE_ITEM: &str = r#"
mutation ($boardId: ID!, $groupId: String, $itemName: String!, $columnValues: JSON!) {
    create_item(board_id: $boardId, group_id: $groupId, item_name: $itemName, column_values: $columnValues) {
        id
        name
    }
}
"#;

pub const CREATE_SUBITEM: &str = r#"
mutation ($parentItemId: ID!, $subitemName: String!, $columnValues: JSON!) {
    create_subitem(parent_item_id: $parentItemId, item_name: $subitemName, column_values: $columnValues) {
        id
        name
    }
}
"#;
