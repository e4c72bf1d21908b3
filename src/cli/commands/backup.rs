use crate::cli::commands::open;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::auth;
use crate::core::backup::BackupLogic;
use crate::errors::AppResult;
use crate::models::role::Area;

/// `backup` and `restore`.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    match cmd {
        Commands::Backup {
            file,
            compress,
            force,
        } => {
            {
                let pool = open(cfg)?;
                auth::require(&pool.conn, cfg, Area::Database)?;
            }
            BackupLogic::backup(cfg, file, *compress, *force)?;
        }
        Commands::Restore { file, force } => {
            {
                let pool = open(cfg)?;
                auth::require(&pool.conn, cfg, Area::Database)?;
            }
            BackupLogic::restore(cfg, file, *force)?;
        }
        _ => {}
    }
    Ok(())
}
