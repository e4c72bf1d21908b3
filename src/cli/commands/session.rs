use crate::cli::commands::open;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::auth;
use crate::db::log::audit_quiet;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success};

/// `login`, `logout` and `whoami`.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    match cmd {
        Commands::Login { username, password } => {
            let pool = open(cfg)?;
            let Some(user) = auth::login(&pool.conn, username, password)? else {
                audit_quiet(&pool.conn, "login_failed", username, "Invalid credentials");
                return Err(AppError::InvalidCredentials);
            };

            auth::save_session(cfg, &user)?;
            audit_quiet(&pool.conn, "login", &user.username, "Session opened");
            success(format!("Logged in as {} ({})", user.username, user.role));
        }
        Commands::Logout => match auth::logout(cfg)? {
            Some(session) => {
                if let Ok(pool) = open(cfg) {
                    audit_quiet(&pool.conn, "logout", &session.username, "Session closed");
                }
                success(format!("Logged out {}", session.username));
            }
            None => info("No active session."),
        },
        Commands::Whoami => {
            let pool = open(cfg)?;
            let user = auth::current_user(&pool.conn, cfg)?;
            let since = auth::load_session(cfg)?
                .map(|s| s.since)
                .unwrap_or_default();
            println!("👤 {} ({}) since {}", user.username, user.role, since);
        }
        _ => {}
    }
    Ok(())
}
