use crate::cli::commands::open;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::auth;
use crate::errors::AppResult;
use crate::export::{ExportLogic, ExportRequest};
use crate::models::role::Area;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        data,
        format,
        file,
        range,
        payment,
        force,
    } = cmd
    {
        let pool = open(cfg)?;
        auth::require(&pool.conn, cfg, Area::Reports)?;

        let req = ExportRequest {
            data: *data,
            format: *format,
            file: file.clone(),
            range: range.clone(),
            payment: payment.clone(),
            force: *force,
        };
        ExportLogic::export(&pool.conn, &req)?;
    }
    Ok(())
}
