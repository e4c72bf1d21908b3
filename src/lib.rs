//! fastpos library root.
//! Exposes the CLI parser, the high-level run() function and the internal modules.

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod export;
pub mod models;
pub mod printing;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::commands;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::Init { admin_password } => commands::init::handle(cli, admin_password),
        Commands::Login { .. } | Commands::Logout | Commands::Whoami => {
            commands::session::handle(&cli.command, cfg)
        }
        Commands::Config { .. } => commands::config::handle(&cli.command, cfg),
        Commands::Db { .. } => commands::db::handle(&cli.command, cfg),
        Commands::Log { .. } => commands::log::handle(&cli.command, cfg),
        Commands::Backup { .. } | Commands::Restore { .. } => {
            commands::backup::handle(&cli.command, cfg)
        }
        Commands::Category(cmd) => commands::category::handle(cmd, cfg),
        Commands::Product(cmd) => commands::product::handle(cmd, cfg),
        Commands::Table(cmd) => commands::table::handle(cmd, cfg),
        Commands::User(cmd) => commands::user::handle(cmd, cfg),
        Commands::Order(cmd) => commands::order::handle(cmd, cfg),
        Commands::Printer(cmd) => commands::printer::handle(cmd, cfg),
        Commands::Inventory(cmd) => commands::inventory::handle(cmd, cfg),
        Commands::Settings(cmd) => commands::settings::handle(cmd, cfg),
        Commands::Report(cmd) => commands::report::handle(cmd, cfg),
        Commands::Export { .. } => commands::export::handle(&cli.command, cfg),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    let mut cfg = Config::load()?;
    if let Some(custom_db) = &cli.db {
        cfg.database = custom_db.clone();
    }

    dispatch(&cli, &cfg)
}
