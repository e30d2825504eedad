use crate::commands::{print_json, with_service};
use clap::Subcommand;
use common::config::ShapeshiftConfig;
use common::error::ShapeshiftError;

#[derive(Debug, Subcommand)]
pub enum OwnerSubcommand {
    /// Create a transformation from a source schema to a target schema
    Create {
        #[arg(long, value_name = "SCHEMA_ID")]
        source: i64,
        #[arg(long, value_name = "SCHEMA_ID")]
        target: i64,
    },
    /// List transformations with their binding progress
    List,
    /// Show a transformation, its bindings and the next node to bind
    Show { id: i64 },
    /// Delete a transformation and all of its bindings
    Delete { id: i64 },
}

pub fn handle_owner(
    cmd: &OwnerSubcommand,
    config: &ShapeshiftConfig,
) -> Result<(), ShapeshiftError> {
    match *cmd {
        OwnerSubcommand::Create { source, target } => with_service(config, |service| async move {
            print_json(&service.create_owner(source, target).await?)
        }),
        OwnerSubcommand::List => with_service(config, |service| async move {
            print_json(&service.list_owners().await?)
        }),
        OwnerSubcommand::Show { id } => with_service(config, |service| async move {
            print_json(&service.get_owner(id).await?)
        }),
        OwnerSubcommand::Delete { id } => {
            with_service(config, |service| async move { service.delete_owner(id).await })
        }
    }
}
