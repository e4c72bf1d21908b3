use crate::db::map_constraint;
use crate::errors::{AppError, AppResult};
use crate::models::product::{Product, ProductPatch, ProductStatus};
use rusqlite::{Connection, OptionalExtension, Row, params};

const SELECT_PRODUCTS: &str = "
    SELECT p.id, p.name, p.category_id, c.name AS category_name,
           p.price, COALESCE(p.cost, 0) AS cost, p.image,
           COALESCE(p.status, 'available') AS status
    FROM products p
    LEFT JOIN categories c ON p.category_id = c.id";

fn map_row(row: &Row) -> rusqlite::Result<Product> {
    let status: String = row.get("status")?;
    Ok(Product {
        id: row.get("id")?,
        name: row.get("name")?,
        category_id: row.get("category_id")?,
        category_name: row.get("category_name")?,
        price: row.get("price")?,
        cost: row.get("cost")?,
        image: row.get("image")?,
        status: ProductStatus::from_db_str(&status).unwrap_or(ProductStatus::Available),
    })
}

/// Optional filters for [`list`].
#[derive(Debug, Default, Clone)]
pub struct ProductFilter {
    pub category_id: Option<i64>,
    /// Case-insensitive substring of the product name
    pub search: Option<String>,
    pub available_only: bool,
}

pub fn list(conn: &Connection, filter: &ProductFilter) -> AppResult<Vec<Product>> {
    let mut sql = format!("{SELECT_PRODUCTS} WHERE 1 = 1");
    let mut args: Vec<rusqlite::types::Value> = Vec::new();

    if let Some(cid) = filter.category_id {
        args.push(cid.into());
        sql.push_str(&format!(" AND p.category_id = ?{}", args.len()));
    }
    if let Some(s) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        args.push(format!("%{}%", s.trim().to_lowercase()).into());
        sql.push_str(&format!(" AND LOWER(p.name) LIKE ?{}", args.len()));
    }
    if filter.available_only {
        sql.push_str(" AND COALESCE(p.status, 'available') = 'available'");
    }
    sql.push_str(" ORDER BY p.id ASC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(args), map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn all(conn: &Connection) -> AppResult<Vec<Product>> {
    list(conn, &ProductFilter::default())
}

pub fn find(conn: &Connection, id: i64) -> AppResult<Option<Product>> {
    let sql = format!("{SELECT_PRODUCTS} WHERE p.id = ?1");
    let product = conn.query_row(&sql, [id], map_row).optional()?;
    Ok(product)
}

pub fn get(conn: &Connection, id: i64) -> AppResult<Product> {
    find(conn, id)?.ok_or_else(|| AppError::NotFound(format!("Product #{id}")))
}

/// Insert a product. `name` and `price` are mandatory.
pub fn create(conn: &Connection, new: &ProductPatch) -> AppResult<i64> {
    let name = new
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::Invalid("Product name cannot be empty".into()))?;
    let price = new
        .price
        .ok_or_else(|| AppError::Invalid("Product price is required".into()))?;
    check_amount("price", price)?;
    let cost = new.cost.unwrap_or(0.0);
    check_amount("cost", cost)?;

    conn.execute(
        "INSERT INTO products (name, category_id, price, cost, image, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            name,
            new.category_id,
            price,
            cost,
            new.image,
            new.status.unwrap_or(ProductStatus::Available).to_db_str()
        ],
    )
    .map_err(|e| map_constraint(e, "Product already exists", "Unknown category"))?;

    Ok(conn.last_insert_rowid())
}

/// Apply the fields present in `patch`, leaving the others untouched.
pub fn update(conn: &Connection, id: i64, patch: &ProductPatch) -> AppResult<Product> {
    let mut current = get(conn, id)?;

    if let Some(name) = patch.name.as_deref() {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Invalid("Product name cannot be empty".into()));
        }
        current.name = name.to_string();
    }
    if let Some(cid) = patch.category_id {
        current.category_id = Some(cid);
    }
    if let Some(price) = patch.price {
        check_amount("price", price)?;
        current.price = price;
    }
    if let Some(cost) = patch.cost {
        check_amount("cost", cost)?;
        current.cost = cost;
    }
    if let Some(image) = &patch.image {
        current.image = Some(image.clone()).filter(|s| !s.is_empty());
    }
    if let Some(status) = patch.status {
        current.status = status;
    }

    conn.execute(
        "UPDATE products
         SET name = ?1, category_id = ?2, price = ?3, cost = ?4, image = ?5, status = ?6
         WHERE id = ?7",
        params![
            current.name,
            current.category_id,
            current.price,
            current.cost,
            current.image,
            current.status.to_db_str(),
            id
        ],
    )
    .map_err(|e| map_constraint(e, "Product already exists", "Unknown category"))?;

    get(conn, id)
}

pub fn delete(conn: &Connection, id: i64) -> AppResult<()> {
    get(conn, id)?;

    let sold: i64 = conn.query_row(
        "SELECT COUNT(*) FROM order_items WHERE product_id = ?1",
        [id],
        |r| r.get(0),
    )?;
    if sold > 0 {
        return Err(AppError::Invalid(format!(
            "Product #{id} appears in {sold} order line(s); mark it unavailable instead"
        )));
    }

    conn.execute("DELETE FROM products WHERE id = ?1", [id])?;
    Ok(())
}

fn check_amount(field: &str, value: f64) -> AppResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::Invalid(format!("{field} must be a non-negative number")));
    }
    Ok(())
}
