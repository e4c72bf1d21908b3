use crate::cli::commands::open;
use crate::cli::parser::TableCmd;
use crate::config::Config;
use crate::core::auth;
use crate::db::log::audit_quiet;
use crate::db::tables;
use crate::errors::AppResult;
use crate::models::role::Area;
use crate::ui::messages::{header, info, success};
use crate::utils::colors;
use crate::utils::table::{Column, Table};

pub fn handle(cmd: &TableCmd, cfg: &Config) -> AppResult<()> {
    let mut pool = open(cfg)?;

    match cmd {
        TableCmd::List => {
            auth::require(&pool.conn, cfg, Area::Browse)?;
            let all = tables::all(&pool.conn)?;
            if all.is_empty() {
                info("No tables yet. Create them with `fastpos table generate <COUNT>`.");
                return Ok(());
            }
            header("🍽  Tables");
            let mut t = Table::new(vec![Column::right("Table"), Column::left("Status")]);
            for table in all {
                t.add_row(vec![table.number.to_string(), colors::table_status(table.status)]);
            }
            t.print();
        }
        TableCmd::Generate { count, force } => {
            auth::require(&pool.conn, cfg, Area::Floor)?;
            let n = tables::generate(&mut pool.conn, *count, *force)?;
            audit_quiet(
                &pool.conn,
                "tables_generate",
                &count.to_string(),
                &format!("Floor reset to {n} tables"),
            );
            success(format!("Floor reset to {n} free tables"));
        }
        TableCmd::Status { number, status } => {
            auth::require(&pool.conn, cfg, Area::Pos)?;
            let table = tables::get_by_number(&pool.conn, *number)?;
            tables::set_status(&pool.conn, table.id, *status)?;
            audit_quiet(
                &pool.conn,
                "table_update",
                &format!("table {number}"),
                &format!("Status set to {}", status.to_db_str()),
            );
            success(format!("Table {number} is now {}", colors::table_status(*status)));
        }
    }
    Ok(())
}
