use crate::commands::Store;
use clap::Args;
use common::config::ShapeshiftConfig;
use common::error::ShapeshiftError;
use tokio::runtime::Runtime;
use tracing::info;

#[derive(Debug, Args)]
pub struct InitDbArgs {
    /// Drop existing tables (and their data) first
    #[arg(long)]
    pub drop: bool,
}

pub fn handle_init_db(args: &InitDbArgs, config: &ShapeshiftConfig) -> Result<(), ShapeshiftError> {
    match Store::open(config)? {
        Store::Postgres(catalog) => {
            let runtime = Runtime::new().map_err(ShapeshiftError::init)?;
            runtime
                .block_on(catalog.init_schema(args.drop))
                .map_err(ShapeshiftError::run)?;
        }
        Store::Memory {
            state_path: Some(path),
            ..
        } => {
            if args.drop && path.exists() {
                std::fs::remove_file(&path).map_err(ShapeshiftError::run)?;
                info!("Removed catalog state at {}", path.display());
            }
        }
        Store::Memory {
            state_path: None, ..
        } => {
            info!("In-memory catalog without state_path needs no initialisation");
        }
    }
    Ok(())
}
