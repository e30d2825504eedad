use crate::commands::{print_json, read_document, with_service};
use bindings::{BindingUpdate, NewBinding};
use clap::{Args, Subcommand};
use common::config::ShapeshiftConfig;
use common::error::ShapeshiftError;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct OwnerArg {
    /// Id of the transformation owning the bindings
    #[arg(long, value_name = "ID")]
    pub owner: i64,
}

#[derive(Debug, Args)]
pub struct AddBindingArgs {
    #[arg(long, value_name = "ID")]
    pub owner: i64,
    /// Binding document: `targetNode`, `kind` and the kind's payload
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct BindingIdArgs {
    #[arg(long, value_name = "ID")]
    pub owner: i64,
    pub id: i64,
}

#[derive(Debug, Args)]
pub struct UpdateBindingArgs {
    #[arg(long, value_name = "ID")]
    pub owner: i64,
    pub id: i64,
    /// Replacement document; `targetNode` may be omitted but cannot change
    pub file: PathBuf,
}

#[derive(Debug, Subcommand)]
pub enum BindingSubcommand {
    /// Bind a target node
    Add(AddBindingArgs),
    /// List the bindings of a transformation
    List(OwnerArg),
    /// Show one binding
    Show(BindingIdArgs),
    /// Replace the kind and payload of a binding
    Update(UpdateBindingArgs),
    /// Remove a binding, leaving its node unbound
    Delete(BindingIdArgs),
}

#[derive(Debug, Args)]
pub struct NextArgs {
    #[arg(long, value_name = "ID")]
    pub owner: i64,
}

pub fn handle_binding(
    cmd: &BindingSubcommand,
    config: &ShapeshiftConfig,
) -> Result<(), ShapeshiftError> {
    match cmd {
        BindingSubcommand::Add(args) => {
            let owner = args.owner;
            let dto: NewBinding = read_document(&args.file)?;
            with_service(config, |service| async move {
                print_json(&service.create_binding(owner, dto).await?)
            })
        }
        BindingSubcommand::List(args) => {
            let owner = args.owner;
            with_service(config, |service| async move {
                print_json(&service.list_bindings(owner).await?)
            })
        }
        BindingSubcommand::Show(args) => {
            let (owner, id) = (args.owner, args.id);
            with_service(config, |service| async move {
                print_json(&service.get_binding(owner, id).await?)
            })
        }
        BindingSubcommand::Update(args) => {
            let (owner, id) = (args.owner, args.id);
            let dto: BindingUpdate = read_document(&args.file)?;
            with_service(config, |service| async move {
                print_json(&service.update_binding(owner, id, dto).await?)
            })
        }
        BindingSubcommand::Delete(args) => {
            let (owner, id) = (args.owner, args.id);
            with_service(config, |service| async move {
                service.delete_binding(owner, id).await
            })
        }
    }
}

pub fn handle_next(args: &NextArgs, config: &ShapeshiftConfig) -> Result<(), ShapeshiftError> {
    let owner = args.owner;
    with_service(config, |service| async move {
        print_json(&service.next_to_bind(owner).await?)
    })
}
