pub mod error;
pub mod loader;

use serde::Deserialize;
use std::path::PathBuf;

pub const CONFIG_FILE_NAME: &str = "shapeshift.yml";

fn default_log_level() -> String {
    "info".to_string()
}

/// Contents of `shapeshift.yml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ShapeshiftConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Where the memory backend persists its state between runs. Relative
    /// paths are resolved against the directory holding `shapeshift.yml`.
    #[serde(default)]
    pub state_path: Option<PathBuf>,
    #[serde(default)]
    pub connection: Option<ConnectionConfig>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    #[serde(deserialize_with = "loader::deserialize_port")]
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl ConnectionConfig {
    pub fn conn_string(&self) -> String {
        format!(
            "host={} port={} user={} password={} dbname={}",
            self.host, self.port, self.user, self.password, self.database
        )
    }
}
