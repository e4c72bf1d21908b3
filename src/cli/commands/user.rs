use crate::cli::commands::open;
use crate::cli::parser::UserCmd;
use crate::config::Config;
use crate::core::auth;
use crate::db::log::audit_quiet;
use crate::db::users;
use crate::errors::{AppError, AppResult};
use crate::models::role::Area;
use crate::ui::messages::{header, success};
use crate::utils::table::{Column, Table};

pub fn handle(cmd: &UserCmd, cfg: &Config) -> AppResult<()> {
    let pool = open(cfg)?;
    let conn = &pool.conn;

    match cmd {
        UserCmd::List => {
            auth::require(conn, cfg, Area::Users)?;
            header("👥 Users");
            let mut t = Table::new(vec![
                Column::right("ID"),
                Column::left("Username"),
                Column::left("Role"),
            ]);
            for u in users::all(conn)? {
                t.add_row(vec![u.id.to_string(), u.username, u.role.to_string()]);
            }
            t.print();
        }
        UserCmd::Add {
            username,
            password,
            role,
        } => {
            auth::require(conn, cfg, Area::Users)?;
            let id = users::create(conn, username, password, *role)?;
            audit_quiet(conn, "user_add", username.trim(), &format!("User #{id} with role {role}"));
            success(format!("User '{}' added as {role}", username.trim()));
        }
        UserCmd::Update {
            id,
            username,
            password,
            role,
        } => {
            auth::require(conn, cfg, Area::Users)?;
            let user = users::update(conn, *id, username.as_deref(), password.as_deref(), *role)?;
            audit_quiet(conn, "user_update", &user.username, &format!("User #{id} updated"));
            success(format!("User '{}' updated ({})", user.username, user.role));
        }
        UserCmd::Delete { id } => {
            let me = auth::require(conn, cfg, Area::Users)?;
            if me.id == *id {
                return Err(AppError::Invalid("You cannot delete your own account".into()));
            }
            let user = users::find(conn, *id)?
                .ok_or_else(|| AppError::NotFound(format!("User #{id}")))?;
            users::delete(conn, *id)?;
            audit_quiet(conn, "user_delete", &user.username, &format!("User #{id} deleted"));
            success(format!("User '{}' deleted", user.username));
        }
        UserCmd::Passwd { old, new } => {
            let me = auth::current_user(conn, cfg)?;
            users::change_password(conn, me.id, old, new)?;
            audit_quiet(conn, "password_change", &me.username, "Password changed");
            success("Password changed.");
        }
    }
    Ok(())
}
