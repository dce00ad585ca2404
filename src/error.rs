use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur while the
/// tool reads its inputs, talks to the Monday.com API, or writes board files.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when a CSV file cannot be read or written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Transport level failure: connection refused, DNS, timeout.
    #[error("API request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API rejected the token.
    #[error("authentication failed (HTTP {status}); check the API token")]
    Unauthorized { status: u16 },

    /// The API answered with HTTP 429.
    #[error("rate limited by the API")]
    RateLimited,

    /// Any other non-success HTTP status.
    #[error("API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// The request reached GraphQL but the server reported errors.
    #[error("GraphQL errors: {}", .0.join("; "))]
    GraphQl(Vec<String>),

    /// The response did not have the expected shape.
    #[error("malformed API response: {0}")]
    MalformedResponse(String),

    /// Raised when a board that must already exist cannot be found.
    #[error("board not found: {0}")]
    BoardNotFound(String),

    /// Raised when the plan does not define the requested department.
    #[error("department '{0}' not found in configuration")]
    UnknownDepartment(String),

    /// Raised when date arithmetic leaves the representable range.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// Raised when an argument cannot be turned into an API request.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when an API-calling command runs without a token.
    #[error("no API token configured; set MONDAY_API_TOKEN or api_token in monday.toml")]
    MissingToken,

    /// Raised when the layered settings cannot be extracted.
    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("failed to load {}: {source}", path.display())]
    Dotenv {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

impl From<figment::Error> for ToolError {
    fn from(error: figment::Error) -> Self {
        ToolError::Config(Box::new(error))
    }
}
