//! Login, session file and role checks.

use crate::config::Config;
use crate::core::password;
use crate::db::log::audit_quiet;
use crate::db::users;
use crate::errors::{AppError, AppResult};
use crate::models::role::{Area, Role};
use crate::models::user::User;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_ADMIN: &str = "admin";

/// The logged-in user, persisted next to the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
    pub since: String,
}

/// Check credentials. `None` for an unknown user or a wrong password.
/// Plaintext passwords from older databases are upgraded on success.
pub fn login(conn: &Connection, username: &str, plain: &str) -> AppResult<Option<User>> {
    let Some(user) = users::find_by_username(conn, username)? else {
        return Ok(None);
    };
    if !password::verify(plain, &user.password)? {
        return Ok(None);
    }

    if password::needs_rehash(&user.password) {
        users::store_password(conn, user.id, plain)?;
        audit_quiet(conn, "password_upgraded", &user.username, "Stored password re-hashed");
    }
    Ok(Some(user))
}

pub fn save_session(cfg: &Config, user: &User) -> AppResult<Session> {
    let session = Session {
        user_id: user.id,
        username: user.username.clone(),
        role: user.role,
        since: crate::utils::date::now_stamp(),
    };
    let path = cfg.session_file();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, serde_yaml::to_string(&session)?)?;
    Ok(session)
}

pub fn load_session(cfg: &Config) -> AppResult<Option<Session>> {
    read_session(&cfg.session_file())
}

fn read_session(path: &Path) -> AppResult<Option<Session>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    match serde_yaml::from_str(&content) {
        Ok(s) => Ok(Some(s)),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable session file");
            Ok(None)
        }
    }
}

/// Remove the session file. Returns the user that was logged in.
pub fn logout(cfg: &Config) -> AppResult<Option<Session>> {
    let session = load_session(cfg)?;
    let path = cfg.session_file();
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(session)
}

/// Current user, refreshed from the database so role changes apply at once.
pub fn current_user(conn: &Connection, cfg: &Config) -> AppResult<User> {
    let session = load_session(cfg)?.ok_or(AppError::NotLoggedIn)?;
    users::find(conn, session.user_id)?
        .filter(|u| u.username == session.username)
        .ok_or(AppError::NotLoggedIn)
}

/// Current user if their role may reach `area`.
pub fn require(conn: &Connection, cfg: &Config, area: Area) -> AppResult<User> {
    let user = current_user(conn, cfg)?;
    if !user.role.allows(area) {
        return Err(AppError::PermissionDenied {
            role: user.role.to_string(),
            area: area.to_string(),
        });
    }
    Ok(user)
}

/// Create the `admin` account when no user exists. Returns true if created.
pub fn seed_default_admin(conn: &Connection, plain: &str) -> AppResult<bool> {
    if users::count(conn)? > 0 {
        return Ok(false);
    }
    users::create(conn, DEFAULT_ADMIN, plain, Role::Admin)?;
    audit_quiet(conn, "init", DEFAULT_ADMIN, "Default admin account created");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::memory_pool;
    use std::env;

    fn cfg(name: &str) -> Config {
        let mut c = Config::default();
        c.database = env::temp_dir()
            .join(format!("fastpos_auth_{name}.sqlite"))
            .to_string_lossy()
            .to_string();
        fs::remove_file(c.session_file()).ok();
        c
    }

    #[test]
    fn login_checks_credentials() {
        let pool = memory_pool();
        users::create(&pool.conn, "sara", "pw", Role::Cashier).unwrap();

        assert!(login(&pool.conn, "sara", "pw").unwrap().is_some());
        assert!(login(&pool.conn, "sara", "bad").unwrap().is_none());
        assert!(login(&pool.conn, "ghost", "pw").unwrap().is_none());
    }

    #[test]
    fn plaintext_passwords_are_upgraded_on_login() {
        let pool = memory_pool();
        pool.conn
            .execute_batch("INSERT INTO users (username, password, role) VALUES ('old', 'secret', 'manager');")
            .unwrap();

        let user = login(&pool.conn, "old", "secret").unwrap().unwrap();
        let stored = users::find(&pool.conn, user.id).unwrap().unwrap().password;
        assert!(password::is_hashed(&stored));
        assert!(login(&pool.conn, "old", "secret").unwrap().is_some());
    }

    #[test]
    fn session_round_trip_and_role_gate() {
        let pool = memory_pool();
        let c = cfg("gate");
        let id = users::create(&pool.conn, "k", "pw", Role::Kitchen).unwrap();
        let user = users::find(&pool.conn, id).unwrap().unwrap();

        assert!(matches!(require(&pool.conn, &c, Area::Kitchen), Err(AppError::NotLoggedIn)));

        save_session(&c, &user).unwrap();
        assert_eq!(require(&pool.conn, &c, Area::Kitchen).unwrap().id, id);
        assert!(matches!(
            require(&pool.conn, &c, Area::Reports),
            Err(AppError::PermissionDenied { .. })
        ));

        let gone = logout(&c).unwrap().unwrap();
        assert_eq!(gone.username, "k");
        assert!(load_session(&c).unwrap().is_none());
    }

    #[test]
    fn default_admin_only_on_empty_table() {
        let pool = memory_pool();
        assert!(seed_default_admin(&pool.conn, "admin").unwrap());
        assert!(!seed_default_admin(&pool.conn, "admin").unwrap());
        assert!(login(&pool.conn, "admin", "admin").unwrap().is_some());
    }
}
