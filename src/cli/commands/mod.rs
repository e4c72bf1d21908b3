pub mod backup;
pub mod category;
pub mod config;
pub mod db;
pub mod export;
pub mod init;
pub mod inventory;
pub mod log;
pub mod order;
pub mod printer;
pub mod product;
pub mod report;
pub mod session;
pub mod settings;
pub mod table;
pub mod user;

use crate::config::Config;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use std::path::Path;

/// Open the configured database. It must have been created by `init`.
pub(crate) fn open(cfg: &Config) -> AppResult<DbPool> {
    if !Path::new(&cfg.database).exists() {
        return Err(AppError::NotFound(format!(
            "Database {} (run `fastpos init` first)",
            cfg.database
        )));
    }
    Ok(DbPool::new(&cfg.database)?)
}
