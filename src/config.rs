//! Layered settings for talking to the Monday.com API.
//!
//! Sources, lowest to highest priority:
//! 1. built-in defaults
//! 2. `monday_api_config.json` in the working directory
//! 3. `monday.toml` in the working directory, or the file given with `--config`
//! 4. `MONDAY_*` environment variables (`MONDAY_API_TOKEN` → `api_token`)

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolError};
use crate::model::BoardKind;

pub const DEFAULT_BASE_URL: &str = "https://api.monday.com/v2";
pub const JSON_SETTINGS_FILE: &str = "monday_api_config.json";
pub const TOML_SETTINGS_FILE: &str = "monday.toml";
pub const ENV_PREFIX: &str = "MONDAY_";
pub const DOTENV_FILE: &str = ".env";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    pub base_url: String,
    /// Sent as the `api-version` header when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    pub timeout_secs: u64,
    /// Pause after each item of a CSV sync.
    pub sync_delay_ms: u64,
    /// Pause after each item of a board duplication.
    pub duplicate_delay_ms: u64,
    pub board_kind: BoardKind,
    pub due_date_column: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: None,
            timeout_secs: 30,
            sync_delay_ms: 500,
            duplicate_delay_ms: 100,
            board_kind: BoardKind::Private,
            due_date_column: "Due Date".to_string(),
        }
    }
}

impl Settings {
    /// Builds the provider chain. `config` replaces the default `monday.toml`.
    pub fn figment(config: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        let json_path = PathBuf::from(JSON_SETTINGS_FILE);
        if json_path.exists() {
            figment = figment.merge(Json::file(json_path));
        }

        let toml_path = config
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(TOML_SETTINGS_FILE));
        if toml_path.exists() {
            figment = figment.merge(Toml::file(toml_path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn load(config: Option<&Path>) -> Result<Self> {
        if let Some(path) = config {
            if !path.exists() {
                return Err(ToolError::MissingInput(path.to_path_buf()));
            }
        }
        Ok(Self::figment(config).extract()?)
    }

    /// Like [`Settings::load`] but reads `.env` from the working directory first.
    pub fn load_with_dotenv(config: Option<&Path>) -> Result<Self> {
        let env_path = PathBuf::from(DOTENV_FILE);
        if env_path.exists() {
            dotenvy::from_path(&env_path).map_err(|source| ToolError::Dotenv {
                path: env_path.clone(),
                source,
            })?;
        }
        Self::load(config)
    }

    pub fn require_token(&self) -> Result<&str> {
        match self.api_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(ToolError::MissingToken),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn sync_delay(&self) -> Duration {
        Duration::from_millis(self.sync_delay_ms)
    }

    pub fn duplicate_delay(&self) -> Duration {
        Duration::from_millis(self.duplicate_delay_ms)
    }
}
