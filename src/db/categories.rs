use crate::db::map_constraint;
use crate::errors::{AppError, AppResult};
use crate::models::category::Category;
use rusqlite::{Connection, OptionalExtension, Row, params};

fn map_row(row: &Row) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get("id")?,
        name: row.get("name")?,
    })
}

/// All categories, newest first.
pub fn all(conn: &Connection) -> AppResult<Vec<Category>> {
    let mut stmt = conn.prepare("SELECT id, name FROM categories ORDER BY id DESC")?;
    let rows = stmt.query_map([], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn find(conn: &Connection, id: i64) -> AppResult<Option<Category>> {
    let cat = conn
        .query_row("SELECT id, name FROM categories WHERE id = ?1", [id], map_row)
        .optional()?;
    Ok(cat)
}

pub fn find_by_name(conn: &Connection, name: &str) -> AppResult<Option<Category>> {
    let cat = conn
        .query_row(
            "SELECT id, name FROM categories WHERE name = ?1",
            [name.trim()],
            map_row,
        )
        .optional()?;
    Ok(cat)
}

pub fn create(conn: &Connection, name: &str) -> AppResult<i64> {
    let name = validated_name(name)?;
    conn.execute("INSERT INTO categories (name) VALUES (?1)", [name])
        .map_err(|e| {
            map_constraint(
                e,
                &format!("Category '{name}' already exists"),
                "Invalid category",
            )
        })?;
    Ok(conn.last_insert_rowid())
}

pub fn update(conn: &Connection, id: i64, name: &str) -> AppResult<()> {
    let name = validated_name(name)?;
    let changed = conn
        .execute(
            "UPDATE categories SET name = ?1 WHERE id = ?2",
            params![name, id],
        )
        .map_err(|e| {
            map_constraint(
                e,
                &format!("Category '{name}' already exists"),
                "Invalid category",
            )
        })?;

    if changed == 0 {
        return Err(AppError::NotFound(format!("Category #{id}")));
    }
    Ok(())
}

/// Products of a deleted category become uncategorized.
pub fn delete(conn: &Connection, id: i64) -> AppResult<()> {
    let changed = conn.execute("DELETE FROM categories WHERE id = ?1", [id])?;
    if changed == 0 {
        return Err(AppError::NotFound(format!("Category #{id}")));
    }
    Ok(())
}

fn validated_name(name: &str) -> AppResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Invalid("Category name cannot be empty".into()));
    }
    if name.contains(',') {
        // names are stored comma-joined on printers
        return Err(AppError::Invalid("Category name cannot contain ','".into()));
    }
    Ok(name)
}
