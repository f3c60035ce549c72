//! Configuration management for Prism.
//!
//! Configuration is loaded from (in priority order):
//! 1. Environment variables (`PRISM__` prefix, `__` between path segments,
//!    e.g. `PRISM__QUERY__TIMEOUT_MS=5000`)
//! 2. Config file (`prism.toml`, prefix overridable)
//! 3. Defaults
//!
//! The resulting `AppConfig` is built once at startup and handed to consumers
//! by reference; nothing here is global.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PrismError, Result};

/// Environment variable prefix for every Prism setting.
pub const ENV_PREFIX: &str = "PRISM";

/// Top-level Prism configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub query: QueryConfig,

    #[serde(default)]
    pub layout: LayoutConfig,
}

/// Settings for the Neo4j HTTP Query API endpoint.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct QueryConfig {
    /// Full URL of the query endpoint, database included
    /// (e.g. `https://host/db/neo4j/query/v2`).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Basic-auth user. Must be set together with `password`.
    #[serde(default)]
    pub user: Option<String>,

    #[serde(default)]
    pub password: Option<String>,
}

/// UI layout defaults. Prism itself never reads these; they are carried so a
/// front end can pick them up from the same configuration source.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct LayoutConfig {
    /// Path the front end is served under.
    #[serde(default = "default_base_path")]
    pub base_path: String,

    /// Initial height of the output panel, in pixels.
    #[serde(default = "default_output_panel_height")]
    pub output_panel_height: u32,

    /// Initial width of the graph overview panel, in pixels.
    #[serde(default = "default_graph_overview_panel_width")]
    pub graph_overview_panel_width: u32,

    #[serde(default)]
    pub disable_output_panel_resizer: bool,

    #[serde(default)]
    pub disable_graph_overview_panel_resizer: bool,
}

fn default_base_url() -> String {
    "https://iyp.iijlab.net/iyp/db/neo4j/query/v2".to_string()
}

fn default_timeout_ms() -> u64 {
    180_000
}

fn default_base_path() -> String {
    "/".to_string()
}

fn default_output_panel_height() -> u32 {
    580
}

fn default_graph_overview_panel_width() -> u32 {
    250
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            user: None,
            password: None,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            output_panel_height: default_output_panel_height(),
            graph_overview_panel_width: default_graph_overview_panel_width(),
            disable_output_panel_resizer: false,
            disable_graph_overview_panel_resizer: false,
        }
    }
}

impl QueryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Basic-auth credentials, if configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.user, &self.password) {
            (Some(user), Some(password)) => Some((user.as_str(), password.as_str())),
            _ => None,
        }
    }

    fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(invalid("query.base_url", "must be an http(s) URL"));
        }
        if self.timeout_ms == 0 {
            return Err(invalid("query.timeout_ms", "must be greater than zero"));
        }
        if self.user.is_some() != self.password.is_some() {
            return Err(invalid(
                "query.user",
                "user and password must be set together",
            ));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load configuration from `<file_prefix>.{toml,json,yaml,...}` (optional)
    /// and `PRISM__*` environment variables.
    pub fn load(file_prefix: &str) -> Result<Self> {
        Self::load_with_env(file_prefix, environment())
    }

    fn load_with_env(file_prefix: &str, env: config::Environment) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(env)
            .build()?;

        let app: AppConfig = cfg.try_deserialize()?;
        app.validate()?;

        tracing::debug!(
            base_url = %app.query.base_url,
            timeout_ms = app.query.timeout_ms,
            auth = app.query.credentials().is_some(),
            "Configuration loaded"
        );
        Ok(app)
    }

    /// Check invariants serde cannot express.
    pub fn validate(&self) -> Result<()> {
        self.query.validate()
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

fn invalid(field: &str, reason: &str) -> PrismError {
    PrismError::InvalidConfig {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
