use crate::core::password;
use crate::db::map_constraint;
use crate::errors::{AppError, AppResult};
use crate::models::role::Role;
use crate::models::user::User;
use rusqlite::{Connection, OptionalExtension, Row, params};

const DUPLICATE: &str = "Username already exists!";

fn map_row(row: &Row) -> rusqlite::Result<User> {
    let role: String = row.get("role")?;
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        password: row.get("password")?,
        // the CHECK constraint keeps unknown roles out
        role: Role::from_db_str(&role).unwrap_or(Role::Cashier),
    })
}

pub fn all(conn: &Connection) -> AppResult<Vec<User>> {
    let mut stmt = conn.prepare("SELECT id, username, password, role FROM users ORDER BY id")?;
    let rows = stmt.query_map([], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn find(conn: &Connection, id: i64) -> AppResult<Option<User>> {
    let user = conn
        .query_row(
            "SELECT id, username, password, role FROM users WHERE id = ?1",
            [id],
            map_row,
        )
        .optional()?;
    Ok(user)
}

pub fn find_by_username(conn: &Connection, username: &str) -> AppResult<Option<User>> {
    let user = conn
        .query_row(
            "SELECT id, username, password, role FROM users WHERE username = ?1",
            [username.trim()],
            map_row,
        )
        .optional()?;
    Ok(user)
}

pub fn count(conn: &Connection) -> AppResult<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?)
}

pub fn create(conn: &Connection, username: &str, plain: &str, role: Role) -> AppResult<i64> {
    let username = username.trim();
    if username.is_empty() || plain.is_empty() {
        return Err(AppError::Invalid(
            "Username and password cannot be empty".into(),
        ));
    }

    let hashed = password::hash(plain)?;
    conn.execute(
        "INSERT INTO users (username, password, role) VALUES (?1, ?2, ?3)",
        params![username, hashed, role.to_db_str()],
    )
    .map_err(|e| map_constraint(e, DUPLICATE, "Invalid user"))?;

    Ok(conn.last_insert_rowid())
}

/// Update the given fields; the password only changes when one is passed.
pub fn update(
    conn: &Connection,
    id: i64,
    username: Option<&str>,
    plain: Option<&str>,
    role: Option<Role>,
) -> AppResult<User> {
    let current = find(conn, id)?.ok_or_else(|| AppError::NotFound(format!("User #{id}")))?;

    let username = match username.map(str::trim) {
        Some("") => return Err(AppError::Invalid("Username cannot be empty".into())),
        Some(u) => u.to_string(),
        None => current.username.clone(),
    };

    if let Some(new_role) = role
        && current.role == Role::Admin
        && new_role != Role::Admin
    {
        ensure_other_admin(conn, id)?;
    }
    let role = role.unwrap_or(current.role);

    let stored = match plain.filter(|p| !p.is_empty()) {
        Some(p) => password::hash(p)?,
        None => current.password.clone(),
    };

    conn.execute(
        "UPDATE users SET username = ?1, password = ?2, role = ?3 WHERE id = ?4",
        params![username, stored, role.to_db_str(), id],
    )
    .map_err(|e| map_constraint(e, DUPLICATE, "Invalid user"))?;

    find(conn, id)?.ok_or_else(|| AppError::NotFound(format!("User #{id}")))
}

/// Replace the stored password without any check. Used for hash upgrades.
pub fn store_password(conn: &Connection, id: i64, plain: &str) -> AppResult<()> {
    let hashed = password::hash(plain)?;
    conn.execute(
        "UPDATE users SET password = ?1 WHERE id = ?2",
        params![hashed, id],
    )?;
    Ok(())
}

pub fn change_password(conn: &Connection, id: i64, old: &str, new: &str) -> AppResult<()> {
    if old.is_empty() || new.is_empty() {
        return Err(AppError::Invalid("Both passwords are required".into()));
    }

    let user = find(conn, id)?.ok_or_else(|| AppError::NotFound(format!("User #{id}")))?;
    if !password::verify(old, &user.password)? {
        return Err(AppError::Invalid("Old password is incorrect".into()));
    }

    store_password(conn, id, new)
}

pub fn delete(conn: &Connection, id: i64) -> AppResult<()> {
    let user = find(conn, id)?.ok_or_else(|| AppError::NotFound(format!("User #{id}")))?;
    if user.role == Role::Admin {
        ensure_other_admin(conn, id)?;
    }

    conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
    Ok(())
}

fn ensure_other_admin(conn: &Connection, id: i64) -> AppResult<()> {
    let others: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE role = 'admin' AND id <> ?1",
        [id],
        |r| r.get(0),
    )?;
    if others == 0 {
        return Err(AppError::Invalid(
            "At least one admin account must remain".into(),
        ));
    }
    Ok(())
}
