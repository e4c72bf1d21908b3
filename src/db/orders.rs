use crate::errors::{AppError, AppResult};
use crate::models::order::{DailyRevenue, Order, OrderItem, OrderStatus};
use crate::models::table::TableStatus;
use crate::utils::date::{DateRange, now_stamp};
use rusqlite::{Connection, OptionalExtension, Row, Transaction, params};

/// One line to be written to `order_items`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub product_id: i64,
    pub quantity: i64,
    pub price: f64,
}

const SELECT_ORDERS: &str = "
    SELECT o.id, o.table_id, t.number AS table_number, o.user_id, u.username,
           COALESCE(o.total, 0) AS total, COALESCE(o.payment_type, '') AS payment_type,
           COALESCE(o.status, 'pending') AS status, COALESCE(o.created_at, '') AS created_at
    FROM orders o
    LEFT JOIN tables t ON o.table_id = t.id
    LEFT JOIN users u ON o.user_id = u.id";

fn map_order(row: &Row) -> rusqlite::Result<Order> {
    let status: String = row.get("status")?;
    Ok(Order {
        id: row.get("id")?,
        table_id: row.get("table_id")?,
        table_number: row.get("table_number")?,
        user_id: row.get("user_id")?,
        username: row.get("username")?,
        total: row.get("total")?,
        payment_type: row.get("payment_type")?,
        status: OrderStatus::from_db_str(&status).unwrap_or(OrderStatus::Pending),
        created_at: row.get("created_at")?,
    })
}

fn map_item(row: &Row) -> rusqlite::Result<OrderItem> {
    Ok(OrderItem {
        id: row.get("id")?,
        order_id: row.get("order_id")?,
        product_id: row.get("product_id")?,
        product_name: row
            .get::<_, Option<String>>("product_name")?
            .unwrap_or_else(|| "(deleted product)".to_string()),
        category_name: row.get("category_name")?,
        quantity: row.get("quantity")?,
        price: row.get("price")?,
    })
}

fn collect<T>(rows: impl Iterator<Item = rusqlite::Result<T>>) -> AppResult<Vec<T>> {
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

fn insert_items(tx: &Transaction, order_id: i64, items: &[NewItem]) -> AppResult<Vec<i64>> {
    let mut stmt = tx.prepare(
        "INSERT INTO order_items (order_id, product_id, quantity, price)
         VALUES (?1, ?2, ?3, ?4)",
    )?;

    let mut ids = Vec::with_capacity(items.len());
    for item in items {
        if item.quantity < 1 {
            return Err(AppError::InvalidItem(format!(
                "quantity {} for product #{}",
                item.quantity, item.product_id
            )));
        }
        stmt.execute(params![order_id, item.product_id, item.quantity, item.price])?;
        ids.push(tx.last_insert_rowid());
    }
    Ok(ids)
}

fn recompute_total(tx: &Transaction, order_id: i64) -> AppResult<f64> {
    let total: f64 = tx.query_row(
        "SELECT COALESCE(SUM(quantity * price), 0) FROM order_items WHERE order_id = ?1",
        [order_id],
        |r| r.get(0),
    )?;
    tx.execute(
        "UPDATE orders SET total = ?1 WHERE id = ?2",
        params![total, order_id],
    )?;
    Ok(total)
}

/// An order with open lines keeps its table occupied.
fn occupy_table(tx: &Transaction, order_id: i64) -> AppResult<()> {
    tx.execute(
        "UPDATE tables SET status = ?1
         WHERE id = (SELECT table_id FROM orders WHERE id = ?2)",
        params![TableStatus::Occupied.to_db_str(), order_id],
    )?;
    Ok(())
}

/// Create a pending order with its items in one transaction and mark its
/// table occupied.
/// Returns the order id and the ids of the inserted items.
pub fn create(
    conn: &mut Connection,
    table_id: i64,
    user_id: Option<i64>,
    payment_type: &str,
    items: &[NewItem],
) -> AppResult<(i64, Vec<i64>)> {
    if items.is_empty() {
        return Err(AppError::EmptyCart);
    }

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO orders (table_id, user_id, total, payment_type, status, created_at)
         VALUES (?1, ?2, 0, ?3, ?4, ?5)",
        params![
            table_id,
            user_id,
            payment_type,
            OrderStatus::Pending.to_db_str(),
            now_stamp()
        ],
    )?;
    let order_id = tx.last_insert_rowid();

    let item_ids = insert_items(&tx, order_id, items)?;
    recompute_total(&tx, order_id)?;
    occupy_table(&tx, order_id)?;
    tx.commit()?;

    Ok((order_id, item_ids))
}

/// Append items to an existing order, refresh its total and keep its table
/// occupied.
pub fn append(conn: &mut Connection, order_id: i64, items: &[NewItem]) -> AppResult<Vec<i64>> {
    if items.is_empty() {
        return Err(AppError::EmptyCart);
    }

    let tx = conn.transaction()?;
    let item_ids = insert_items(&tx, order_id, items)?;
    recompute_total(&tx, order_id)?;
    occupy_table(&tx, order_id)?;
    tx.commit()?;

    Ok(item_ids)
}

pub fn find(conn: &Connection, id: i64) -> AppResult<Option<Order>> {
    let sql = format!("{SELECT_ORDERS} WHERE o.id = ?1");
    Ok(conn.query_row(&sql, [id], map_order).optional()?)
}

pub fn get(conn: &Connection, id: i64) -> AppResult<Order> {
    find(conn, id)?.ok_or_else(|| AppError::NotFound(format!("Order #{id}")))
}

/// The open (pending) order of a table, newest first if several exist.
pub fn pending_for_table(conn: &Connection, table_id: i64) -> AppResult<Option<Order>> {
    let sql = format!(
        "{SELECT_ORDERS} WHERE o.table_id = ?1 AND o.status = 'pending' ORDER BY o.id DESC LIMIT 1"
    );
    Ok(conn.query_row(&sql, [table_id], map_order).optional()?)
}

/// Most recent order of a table whatever its status.
pub fn latest_for_table(conn: &Connection, table_id: i64) -> AppResult<Option<Order>> {
    let sql = format!("{SELECT_ORDERS} WHERE o.table_id = ?1 ORDER BY o.id DESC LIMIT 1");
    Ok(conn.query_row(&sql, [table_id], map_order).optional()?)
}

pub fn items(conn: &Connection, order_id: i64) -> AppResult<Vec<OrderItem>> {
    items_where(conn, "oi.order_id = ?1", order_id)
}

/// Items by id, used to route freshly added lines.
pub fn items_by_ids(conn: &Connection, ids: &[i64]) -> AppResult<Vec<OrderItem>> {
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        out.extend(items_where(conn, "oi.id = ?1", *id)?);
    }
    Ok(out)
}

fn items_where(conn: &Connection, clause: &str, arg: i64) -> AppResult<Vec<OrderItem>> {
    let sql = format!(
        "SELECT oi.id, oi.order_id, oi.product_id, p.name AS product_name,
                c.name AS category_name, oi.quantity, oi.price
         FROM order_items oi
         LEFT JOIN products p ON oi.product_id = p.id
         LEFT JOIN categories c ON p.category_id = c.id
         WHERE {clause}
         ORDER BY oi.id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([arg], map_item)?;
    collect(rows)
}

pub fn set_status(conn: &Connection, id: i64, status: OrderStatus) -> AppResult<()> {
    let changed = conn.execute(
        "UPDATE orders SET status = ?1 WHERE id = ?2",
        params![status.to_db_str(), id],
    )?;
    if changed == 0 {
        return Err(AppError::NotFound(format!("Order #{id}")));
    }
    Ok(())
}

pub fn mark_paid(conn: &Connection, id: i64, payment_type: &str) -> AppResult<()> {
    let changed = conn.execute(
        "UPDATE orders SET status = ?1, payment_type = ?2 WHERE id = ?3",
        params![OrderStatus::Paid.to_db_str(), payment_type, id],
    )?;
    if changed == 0 {
        return Err(AppError::NotFound(format!("Order #{id}")));
    }
    Ok(())
}

pub fn count_pending_for_table(conn: &Connection, table_id: i64) -> AppResult<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM orders WHERE table_id = ?1 AND status = 'pending'",
        [table_id],
        |r| r.get(0),
    )?)
}

/// Criteria for [`filter`]. Every field is optional.
#[derive(Debug, Default, Clone)]
pub struct OrderFilter {
    pub range: Option<DateRange>,
    pub payment_type: Option<String>,
    pub status: Option<OrderStatus>,
}

/// Orders matching `f`, newest first.
pub fn filter(conn: &Connection, f: &OrderFilter) -> AppResult<Vec<Order>> {
    let mut sql = format!("{SELECT_ORDERS} WHERE 1 = 1");
    let mut args: Vec<String> = Vec::new();

    if let Some(r) = &f.range {
        args.push(r.start_str());
        args.push(r.end_str());
        sql.push_str(&format!(
            " AND DATE(o.created_at) BETWEEN ?{} AND ?{}",
            args.len() - 1,
            args.len()
        ));
    }
    if let Some(p) = &f.payment_type {
        args.push(p.to_lowercase());
        sql.push_str(&format!(" AND LOWER(o.payment_type) = ?{}", args.len()));
    }
    if let Some(s) = f.status {
        args.push(s.to_db_str().to_string());
        sql.push_str(&format!(" AND o.status = ?{}", args.len()));
    }
    sql.push_str(" ORDER BY o.created_at DESC, o.id DESC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(args), map_order)?;
    collect(rows)
}

pub fn all(conn: &Connection) -> AppResult<Vec<Order>> {
    filter(conn, &OrderFilter::default())
}

/// Revenue per day for the last `days` days that had sales, oldest first.
pub fn daily_revenue(conn: &Connection, days: usize) -> AppResult<Vec<DailyRevenue>> {
    let mut stmt = conn.prepare(
        "SELECT DATE(created_at) AS day, SUM(total) AS revenue
         FROM orders
         WHERE status <> 'cancelled'
         GROUP BY day
         ORDER BY day DESC
         LIMIT ?1",
    )?;
    let rows = stmt.query_map([days as i64], |r| {
        Ok(DailyRevenue {
            day: r.get(0)?,
            revenue: r.get::<_, Option<f64>>(1)?.unwrap_or(0.0),
        })
    })?;

    let mut out = collect(rows)?;
    out.reverse();
    Ok(out)
}
