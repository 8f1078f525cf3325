/*
[INPUT]:  YAML configuration file and `TASKBOARD__*` environment variables
[OUTPUT]: Validated application configuration
[POS]:    Configuration layer - backend endpoint, credentials, board defaults, logging
[UPDATE]: When adding new configuration options
*/

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use taskboard_adapter::ClientConfig;

const ENV_PREFIX: &str = "TASKBOARD";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("failed to serialize configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to write configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level configuration for the taskboard client
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Hosted backend endpoint
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Project URL, e.g. "https://abc.example.co"
    #[serde(default)]
    pub url: String,
    /// Public anon key sent as `apikey`
    #[serde(default)]
    pub anon_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl BackendConfig {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        }
    }
}

/// Password sign-in; both fields are usually supplied via environment
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AuthConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl AuthConfig {
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.email.as_deref(), self.password.as_deref()) {
            (Some(email), Some(password)) if !email.trim().is_empty() => Some((email, password)),
            _ => None,
        }
    }
}

/// Defaults applied by the board workflows
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BoardConfig {
    /// Columns every new board starts with, left to right
    #[serde(default = "default_columns")]
    pub default_columns: Vec<ColumnTemplate>,
    /// Appended to the name of duplicated projects, boards, columns and tasks
    #[serde(default = "default_copy_suffix")]
    pub copy_suffix: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            default_columns: default_columns(),
            copy_suffix: default_copy_suffix(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ColumnTemplate {
    pub name: String,
    pub color: String,
}

impl ColumnTemplate {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Filter directive, e.g. "info" or "taskboard_core=debug"
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Directory for daily rolling log files; stderr only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_columns() -> Vec<ColumnTemplate> {
    vec![
        ColumnTemplate::new("To Do", "#ef4444"),
        ColumnTemplate::new("In Progress", "#f59e0b"),
        ColumnTemplate::new("Done", "#10b981"),
    ]
}

fn default_copy_suffix() -> String {
    " (Copy)".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// `~/.config/taskboard/config.yaml` or the platform equivalent
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("taskboard").join("config.yaml"))
    }

    /// Layer the YAML file (required when `path` is given) under
    /// `TASKBOARD__SECTION__KEY` environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        match path {
            Some(path) => {
                builder = builder.add_source(
                    config::File::from(path)
                        .format(config::FileFormat::Yaml)
                        .required(true),
                );
            }
            None => {
                if let Some(default) = Self::default_path() {
                    builder = builder.add_source(
                        config::File::from(default.as_path())
                            .format(config::FileFormat::Yaml)
                            .required(false),
                    );
                }
            }
        }

        let config: Self = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Load configuration from a YAML file only
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.url.trim().is_empty() {
            return Err(ConfigError::Invalid("backend.url is required".to_string()));
        }
        if self.backend.anon_key.trim().is_empty() {
            return Err(ConfigError::Invalid("backend.anon_key is required".to_string()));
        }
        if self.board.default_columns.is_empty() {
            return Err(ConfigError::Invalid(
                "board.default_columns must list at least one column".to_string(),
            ));
        }
        for column in &self.board.default_columns {
            if column.name.trim().is_empty() {
                return Err(ConfigError::Invalid("column names cannot be empty".to_string()));
            }
            if !is_hex_color(&column.color) {
                return Err(ConfigError::Invalid(format!(
                    "column {:?} has malformed color {:?} (expected #rrggbb)",
                    column.name, column.color
                )));
            }
        }
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

pub fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
