mod binding;
mod db;
mod owner;
mod schema;

pub use binding::{handle_binding, handle_next, BindingSubcommand, NextArgs};
pub use db::{handle_init_db, InitDbArgs};
pub use owner::{handle_owner, OwnerSubcommand};
pub use schema::{handle_schema, SchemaSubcommand};

use catalog::{MemoryCatalog, PostgresCatalog};
use common::config::{ShapeshiftConfig, StoreBackend};
use common::error::ShapeshiftError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use service::{BindingService, ServiceError};
use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::debug;

/// The configured storage backend.
pub(crate) enum Store {
    Memory {
        catalog: MemoryCatalog,
        state_path: Option<PathBuf>,
    },
    Postgres(PostgresCatalog),
}

impl Store {
    pub(crate) fn open(config: &ShapeshiftConfig) -> Result<Self, ShapeshiftError> {
        match config.store.backend {
            StoreBackend::Memory => {
                let state_path = config.store.state_path.clone();
                let catalog = match &state_path {
                    Some(path) => MemoryCatalog::load_from(path).map_err(ShapeshiftError::init)?,
                    None => MemoryCatalog::new(),
                };
                Ok(Store::Memory {
                    catalog,
                    state_path,
                })
            }
            StoreBackend::Postgres => {
                let connection = config.store.connection.as_ref().ok_or_else(|| {
                    ShapeshiftError::init_msg("postgres backend requires a connection")
                })?;
                Ok(Store::Postgres(PostgresCatalog::new(
                    connection.conn_string(),
                )))
            }
        }
    }

    pub(crate) fn service(&self) -> BindingService {
        match self {
            Store::Memory { catalog, .. } => BindingService::new(Arc::new(catalog.clone())),
            Store::Postgres(catalog) => BindingService::new(Arc::new(catalog.clone())),
        }
    }

    /// Writes memory state back to disk when a state path is configured.
    pub(crate) fn persist(&self) -> Result<(), ShapeshiftError> {
        if let Store::Memory {
            catalog,
            state_path: Some(path),
        } = self
        {
            catalog.flush_to(path).map_err(ShapeshiftError::run)?;
            debug!("Flushed catalog state to {}", path.display());
        }
        Ok(())
    }
}

/// Runs `op` against the configured store and persists the result.
pub(crate) fn with_service<F, Fut>(config: &ShapeshiftConfig, op: F) -> Result<(), ShapeshiftError>
where
    F: FnOnce(BindingService) -> Fut,
    Fut: Future<Output = Result<(), ServiceError>>,
{
    let store = Store::open(config)?;
    let runtime = Runtime::new().map_err(ShapeshiftError::init)?;
    runtime
        .block_on(op(store.service()))
        .map_err(|err| ShapeshiftError::run_msg(describe(&err)))?;
    store.persist()
}

fn describe(err: &ServiceError) -> String {
    let response = err.response();
    match err {
        ServiceError::Internal { .. } => format!("{} ({})", response.message, err.context()),
        _ => format!("{} [{}]", response.message, response.status),
    }
}

/// Reads a JSON or YAML document, picking the format from the extension.
pub(crate) fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, ShapeshiftError> {
    let raw = fs::read_to_string(path).map_err(ShapeshiftError::init)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("yml") | Some("yaml") => serde_yaml::from_str(&raw).map_err(ShapeshiftError::init),
        _ => serde_json::from_str(&raw).map_err(ShapeshiftError::init),
    }
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<(), ServiceError> {
    let rendered = serde_json::to_string_pretty(value).map_err(|err| ServiceError::Internal {
        context: common::diag!("could not render output: {}", err),
        source: Some(Box::new(err)),
    })?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindings::{BindingSpec, NewBinding};
    use serde_json::Value;

    #[test]
    fn yaml_and_json_documents_read_the_same() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("binding.json");
        let yaml_path = dir.path().join("binding.yml");
        fs::write(
            &json_path,
            r#"{ "targetNode": "/age", "kind": "integerConstant", "constant": 42 }"#,
        )
        .unwrap();
        fs::write(
            &yaml_path,
            "targetNode: /age\nkind: integerConstant\nconstant: 42\n",
        )
        .unwrap();

        let from_json: NewBinding = read_document(&json_path).unwrap();
        let from_yaml: NewBinding = read_document(&yaml_path).unwrap();
        assert_eq!(from_json, from_yaml);
        assert_eq!(from_json.spec, BindingSpec::IntegerConstant { constant: 42 });
    }

    #[test]
    fn memory_store_persists_between_commands() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(common::config::CONFIG_FILE_NAME),
            "store:\n  backend: memory\n  state_path: state.json\n",
        )
        .unwrap();
        let config =
            common::config::loader::read_config(Some(dir.path().to_path_buf())).unwrap();

        with_service(&config, |service| async move {
            service
                .create_schema(serde_json::json!({ "type": "string" }))
                .await?;
            Ok(())
        })
        .unwrap();

        let state: Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("state.json")).unwrap())
                .unwrap();
        assert_eq!(state["last_schema_id"], 1);

        with_service(&config, |service| async move {
            assert_eq!(service.list_schemas().await?.len(), 1);
            Ok(())
        })
        .unwrap();
    }
}
