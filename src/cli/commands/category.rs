use crate::cli::commands::open;
use crate::cli::parser::CategoryCmd;
use crate::config::Config;
use crate::core::{auth, routing};
use crate::db::categories;
use crate::db::log::audit_quiet;
use crate::errors::{AppError, AppResult};
use crate::models::role::Area;
use crate::ui::messages::{header, info, success};
use crate::utils::table::{Column, Table};

pub fn handle(cmd: &CategoryCmd, cfg: &Config) -> AppResult<()> {
    let pool = open(cfg)?;
    let conn = &pool.conn;

    match cmd {
        CategoryCmd::List => {
            auth::require(conn, cfg, Area::Browse)?;
            let all = categories::all(conn)?;
            if all.is_empty() {
                info("No categories yet.");
                return Ok(());
            }
            header("🗂  Categories");
            let mut t = Table::new(vec![Column::right("ID"), Column::left("Name")]);
            for c in all {
                t.add_row(vec![c.id.to_string(), c.name]);
            }
            t.print();
        }
        CategoryCmd::Add { name } => {
            auth::require(conn, cfg, Area::Catalog)?;
            let id = categories::create(conn, name)?;
            audit_quiet(conn, "category_add", name.trim(), &format!("Category #{id} created"));
            success(format!("Category '{}' added (id {id})", name.trim()));
        }
        CategoryCmd::Rename { id, name } => {
            auth::require(conn, cfg, Area::Catalog)?;
            let old = categories::find(conn, *id)?
                .ok_or_else(|| AppError::NotFound(format!("Category #{id}")))?;
            categories::update(conn, *id, name)?;
            let printers = routing::rename_category(conn, &old.name, name)?;
            audit_quiet(
                conn,
                "category_update",
                &format!("#{id}"),
                &format!("'{}' renamed to '{}'", old.name, name.trim()),
            );
            success(format!("Category '{}' renamed to '{}'", old.name, name.trim()));
            if printers > 0 {
                info(format!("Updated routing on {printers} printer(s)."));
            }
        }
        CategoryCmd::Delete { id } => {
            auth::require(conn, cfg, Area::Catalog)?;
            let old = categories::find(conn, *id)?
                .ok_or_else(|| AppError::NotFound(format!("Category #{id}")))?;
            categories::delete(conn, *id)?;
            audit_quiet(conn, "category_delete", &old.name, &format!("Category #{id} deleted"));
            success(format!("Category '{}' deleted", old.name));
        }
    }
    Ok(())
}
