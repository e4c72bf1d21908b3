use crate::errors::{AppError, AppResult};
use crate::models::ingredient::{Ingredient, IngredientPatch};
use rusqlite::{Connection, OptionalExtension, Row, params};

const SELECT_INGREDIENTS: &str = "
    SELECT i.id, i.name, COALESCE(i.quantity, 0) AS quantity,
           COALESCE(i.unit, 'pcs') AS unit, COALESCE(i.min_quantity, 0) AS min_quantity,
           COALESCE(i.cost, 0) AS cost, i.product_id, p.name AS product_name
    FROM ingredients i
    LEFT JOIN products p ON i.product_id = p.id";

fn map_row(row: &Row) -> rusqlite::Result<Ingredient> {
    Ok(Ingredient {
        id: row.get("id")?,
        name: row.get("name")?,
        quantity: row.get("quantity")?,
        unit: row.get("unit")?,
        min_quantity: row.get("min_quantity")?,
        cost: row.get("cost")?,
        product_id: row.get("product_id")?,
        product_name: row.get("product_name")?,
    })
}

fn query(conn: &Connection, sql: &str) -> AppResult<Vec<Ingredient>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn all(conn: &Connection) -> AppResult<Vec<Ingredient>> {
    query(conn, &format!("{SELECT_INGREDIENTS} ORDER BY i.name COLLATE NOCASE"))
}

/// Ingredients at or below their minimum quantity.
pub fn low_stock(conn: &Connection) -> AppResult<Vec<Ingredient>> {
    query(
        conn,
        &format!(
            "{SELECT_INGREDIENTS}
             WHERE COALESCE(i.quantity, 0) <= COALESCE(i.min_quantity, 0)
             ORDER BY i.name COLLATE NOCASE"
        ),
    )
}

pub fn find(conn: &Connection, id: i64) -> AppResult<Option<Ingredient>> {
    let sql = format!("{SELECT_INGREDIENTS} WHERE i.id = ?1");
    Ok(conn.query_row(&sql, [id], map_row).optional()?)
}

pub fn get(conn: &Connection, id: i64) -> AppResult<Ingredient> {
    find(conn, id)?.ok_or_else(|| AppError::NotFound(format!("Ingredient #{id}")))
}

pub fn create(conn: &Connection, new: &IngredientPatch) -> AppResult<i64> {
    let name = new
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::Invalid("Ingredient name cannot be empty".into()))?;

    let quantity = non_negative("quantity", new.quantity.unwrap_or(0.0))?;
    let min_quantity = non_negative("minimum", new.min_quantity.unwrap_or(0.0))?;
    let cost = non_negative("cost", new.cost.unwrap_or(0.0))?;
    let unit = new.unit.as_deref().unwrap_or("pcs");

    conn.execute(
        "INSERT INTO ingredients (name, quantity, unit, min_quantity, cost, product_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![name, quantity, unit, min_quantity, cost, new.product_id],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update(conn: &Connection, id: i64, patch: &IngredientPatch) -> AppResult<Ingredient> {
    let mut cur = get(conn, id)?;

    if let Some(name) = patch.name.as_deref().map(str::trim) {
        if name.is_empty() {
            return Err(AppError::Invalid("Ingredient name cannot be empty".into()));
        }
        cur.name = name.to_string();
    }
    if let Some(q) = patch.quantity {
        cur.quantity = non_negative("quantity", q)?;
    }
    if let Some(u) = &patch.unit {
        cur.unit = u.clone();
    }
    if let Some(m) = patch.min_quantity {
        cur.min_quantity = non_negative("minimum", m)?;
    }
    if let Some(c) = patch.cost {
        cur.cost = non_negative("cost", c)?;
    }
    if patch.product_id.is_some() {
        cur.product_id = patch.product_id;
    }

    conn.execute(
        "UPDATE ingredients
         SET name = ?1, quantity = ?2, unit = ?3, min_quantity = ?4, cost = ?5, product_id = ?6
         WHERE id = ?7",
        params![
            cur.name,
            cur.quantity,
            cur.unit,
            cur.min_quantity,
            cur.cost,
            cur.product_id,
            id
        ],
    )?;
    get(conn, id)
}

/// Add `delta` (may be negative) to the stock; the result is clamped at zero.
pub fn adjust(conn: &Connection, id: i64, delta: f64) -> AppResult<Ingredient> {
    if !delta.is_finite() {
        return Err(AppError::Invalid("delta must be a number".into()));
    }
    let cur = get(conn, id)?;
    let quantity = (cur.quantity + delta).max(0.0);

    conn.execute(
        "UPDATE ingredients SET quantity = ?1 WHERE id = ?2",
        params![quantity, id],
    )?;
    get(conn, id)
}

pub fn delete(conn: &Connection, id: i64) -> AppResult<()> {
    let changed = conn.execute("DELETE FROM ingredients WHERE id = ?1", [id])?;
    if changed == 0 {
        return Err(AppError::NotFound(format!("Ingredient #{id}")));
    }
    Ok(())
}

fn non_negative(field: &str, v: f64) -> AppResult<f64> {
    if !v.is_finite() || v < 0.0 {
        return Err(AppError::Invalid(format!("{field} must be a non-negative number")));
    }
    Ok(v)
}
