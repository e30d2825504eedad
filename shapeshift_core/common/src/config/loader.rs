use crate::config::error::ConfigError;
use crate::config::{ShapeshiftConfig, StoreBackend, CONFIG_FILE_NAME};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Reads `shapeshift.yml` from `config_dir` (or the working directory) and
/// resolves any relative paths it contains.
pub fn read_config(config_dir: Option<PathBuf>) -> Result<ShapeshiftConfig, ConfigError> {
    let config_file_path = match config_dir {
        Some(dir) => dir.join(CONFIG_FILE_NAME),
        None => PathBuf::from(CONFIG_FILE_NAME),
    };
    if !config_file_path.exists() {
        return Err(ConfigError::incorrect_path(&config_file_path));
    }

    let file = fs::File::open(&config_file_path)?;
    let mut config: ShapeshiftConfig = serde_yaml::from_reader(file)?;

    if config.store.backend == StoreBackend::Postgres && config.store.connection.is_none() {
        return Err(ConfigError::missing_connection(&config_file_path));
    }

    let config_root = config_file_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    config.store.state_path = config
        .store
        .state_path
        .map(|p| resolve_path(&config_root, &p));

    Ok(config)
}

fn resolve_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

pub(crate) fn deserialize_port<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct PortVisitor;

    impl<'de> serde::de::Visitor<'de> for PortVisitor {
        type Value = u16;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or integer port value")
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            u16::try_from(value).map_err(|_| E::custom(format!("port {value} is out of range")))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            if value < 0 {
                return Err(E::custom("port cannot be negative"));
            }
            self.visit_u64(value as u64)
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            value
                .trim()
                .parse::<u16>()
                .map_err(|_| E::custom(format!("'{value}' is not a valid port")))
        }
    }

    deserializer.deserialize_any(PortVisitor)
}
