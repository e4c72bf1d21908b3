use crate::cli::commands::open;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::auth;
use crate::core::log::LogLogic;
use crate::errors::AppResult;
use crate::models::role::Area;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Log { print: true, limit } = cmd {
        let pool = open(cfg)?;
        auth::require(&pool.conn, cfg, Area::Database)?;
        LogLogic::print_log(&pool.conn, *limit)?;
    }

    Ok(())
}
