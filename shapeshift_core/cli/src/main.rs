mod commands;

use crate::commands::{
    handle_binding, handle_init_db, handle_next, handle_owner, handle_schema, BindingSubcommand,
    InitDbArgs, NextArgs, OwnerSubcommand, SchemaSubcommand,
};

use clap::{Parser, Subcommand};
use common::config::loader::read_config;
use common::error::ShapeshiftError;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "shapeshift")]
pub struct Cli {
    #[arg(
        long = "config-path",
        short = 'c',
        help = "directory holding shapeshift.yml",
        global = true
    )]
    pub config_path: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Cmd,
}

#[derive(Debug, Subcommand)]
pub enum Cmd {
    /// Create the catalog tables
    InitDb(InitDbArgs),
    /// Register and inspect schemas
    #[command(subcommand)]
    Schema(SchemaSubcommand),
    /// Manage transformations
    #[command(subcommand)]
    Owner(OwnerSubcommand),
    /// Manage the bindings of a transformation
    #[command(subcommand)]
    Binding(BindingSubcommand),
    /// Show the next node to bind for a transformation
    Next(NextArgs),
}

fn run_cmd(func: Result<(), ShapeshiftError>) {
    if let Err(e) = func {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), ShapeshiftError> {
    let config = read_config(cli.config_path).map_err(ShapeshiftError::init)?;
    logging::init_logger(&config.log_level);

    match cli.command {
        Cmd::InitDb(args) => handle_init_db(&args, &config),
        Cmd::Schema(cmd) => handle_schema(&cmd, &config),
        Cmd::Owner(cmd) => handle_owner(&cmd, &config),
        Cmd::Binding(cmd) => handle_binding(&cmd, &config),
        Cmd::Next(args) => handle_next(&args, &config),
    }
}

fn main() {
    run_cmd(run(Cli::parse()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use matches::assert_matches;

    #[test]
    fn parses_nested_binding_command() {
        let cli = Cli::try_parse_from([
            "shapeshift",
            "-c",
            "conf",
            "binding",
            "update",
            "--owner",
            "3",
            "7",
            "binding.json",
        ])
        .unwrap();
        assert_eq!(cli.config_path, Some(PathBuf::from("conf")));
        let Cmd::Binding(BindingSubcommand::Update(args)) = cli.command else {
            panic!("expected binding update");
        };
        assert_eq!(args.owner, 3);
        assert_eq!(args.id, 7);
        assert_eq!(args.file, PathBuf::from("binding.json"));
    }

    #[test]
    fn init_db_takes_drop_flag() {
        let cli = Cli::try_parse_from(["shapeshift", "init-db", "--drop"]).unwrap();
        assert_matches!(cli.command, Cmd::InitDb(InitDbArgs { drop: true }));

        let cli = Cli::try_parse_from(["shapeshift", "next", "--owner", "4"]).unwrap();
        assert_matches!(cli.command, Cmd::Next(NextArgs { owner: 4 }));
    }

    #[test]
    fn owner_create_requires_both_schemas() {
        assert_matches!(
            Cli::try_parse_from(["shapeshift", "owner", "create", "--source", "1"]),
            Err(_)
        );
    }
}
