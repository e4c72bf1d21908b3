use crate::cli::parser::Cli;
use crate::config::Config;
use crate::core::auth::{self, DEFAULT_ADMIN};
use crate::db::initialize::init_db;
use crate::db::log::audit_quiet;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::{success, warning};

/// Handle the `init` command
///
/// This initializes:
///  - the config directory and file (skipped with `--test`)
///  - the SQLite database and all pending migrations
///  - the default `admin` account when no user exists yet
pub fn handle(cli: &Cli, admin_password: &str) -> AppResult<()> {
    let cfg = Config::init_all(cli.db.clone(), cli.test)?;

    println!("⚙️  Initializing fastpos…");
    println!("📄 Config file : {}", Config::config_file().display());
    println!("🗄️  Database   : {}", &cfg.database);

    let pool = DbPool::new(&cfg.database)?;
    init_db(&pool.conn)?;
    success(format!("Database initialized at {}", &cfg.database));

    if auth::seed_default_admin(&pool.conn, admin_password)? {
        success(format!("Created user '{DEFAULT_ADMIN}' with role admin"));
        if admin_password == DEFAULT_ADMIN {
            warning("Change the default password with `fastpos user passwd`.");
        }
    }

    audit_quiet(
        &pool.conn,
        "init",
        &cfg.database,
        &format!("Database initialized at {}", &cfg.database),
    );

    println!("🎉 fastpos initialization completed!");
    Ok(())
}
