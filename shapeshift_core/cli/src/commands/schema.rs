use crate::commands::{print_json, read_document, with_service};
use clap::Subcommand;
use common::config::ShapeshiftConfig;
use common::error::ShapeshiftError;
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, Subcommand)]
pub enum SchemaSubcommand {
    /// Register a JSON Schema document (JSON or YAML file)
    Add { file: PathBuf },
    /// List registered schemas
    List,
    /// Show one schema
    Show { id: i64 },
    /// Replace a schema that no transformation uses yet
    Update { id: i64, file: PathBuf },
    /// Delete a schema that no transformation uses
    Delete { id: i64 },
}

pub fn handle_schema(
    cmd: &SchemaSubcommand,
    config: &ShapeshiftConfig,
) -> Result<(), ShapeshiftError> {
    match cmd {
        SchemaSubcommand::Add { file } => {
            let document: Value = read_document(file)?;
            with_service(config, |service| async move {
                print_json(&service.create_schema(document).await?)
            })
        }
        SchemaSubcommand::List => with_service(config, |service| async move {
            print_json(&service.list_schemas().await?)
        }),
        SchemaSubcommand::Show { id } => {
            let id = *id;
            with_service(config, |service| async move {
                print_json(&service.get_schema(id).await?)
            })
        }
        SchemaSubcommand::Update { id, file } => {
            let id = *id;
            let document: Value = read_document(file)?;
            with_service(config, |service| async move {
                print_json(&service.update_schema(id, document).await?)
            })
        }
        SchemaSubcommand::Delete { id } => {
            let id = *id;
            with_service(config, |service| async move { service.delete_schema(id).await })
        }
    }
}
