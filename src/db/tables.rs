use crate::errors::{AppError, AppResult};
use crate::models::table::{Table, TableStatus};
use rusqlite::{Connection, OptionalExtension, Row, params};

fn map_row(row: &Row) -> rusqlite::Result<Table> {
    let status: String = row.get("status")?;
    Ok(Table {
        id: row.get("id")?,
        number: row.get("number")?,
        status: TableStatus::from_db_str(&status).unwrap_or(TableStatus::Free),
    })
}

pub fn all(conn: &Connection) -> AppResult<Vec<Table>> {
    let mut stmt = conn.prepare("SELECT id, number, status FROM tables ORDER BY number ASC")?;
    let rows = stmt.query_map([], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn find_by_number(conn: &Connection, number: i64) -> AppResult<Option<Table>> {
    let table = conn
        .query_row(
            "SELECT id, number, status FROM tables WHERE number = ?1",
            [number],
            map_row,
        )
        .optional()?;
    Ok(table)
}

pub fn get_by_number(conn: &Connection, number: i64) -> AppResult<Table> {
    find_by_number(conn, number)?.ok_or_else(|| AppError::NotFound(format!("Table {number}")))
}

pub fn set_status(conn: &Connection, id: i64, status: TableStatus) -> AppResult<()> {
    let changed = conn.execute(
        "UPDATE tables SET status = ?1 WHERE id = ?2",
        params![status.to_db_str(), id],
    )?;
    if changed == 0 {
        return Err(AppError::NotFound(format!("Table #{id}")));
    }
    Ok(())
}

/// Number of orders still pending across the whole floor.
pub fn pending_orders(conn: &Connection) -> AppResult<i64> {
    let n = conn.query_row(
        "SELECT COUNT(*) FROM orders WHERE status = 'pending'",
        [],
        |r| r.get(0),
    )?;
    Ok(n)
}

/// Reset the floor to tables `1..=count`, all free.
///
/// Rows whose number is kept survive with their id, so order history stays
/// attached; higher numbers are dropped.
pub fn generate(conn: &mut Connection, count: i64, force: bool) -> AppResult<usize> {
    if count < 1 {
        return Err(AppError::Invalid("Table count must be at least 1".into()));
    }

    let pending = pending_orders(conn)?;
    if pending > 0 && !force {
        return Err(AppError::Invalid(format!(
            "{pending} order(s) still pending; settle them first or use --force"
        )));
    }

    let tx = conn.transaction()?;
    tx.execute("DELETE FROM tables WHERE number > ?1 OR number < 1", [count])?;
    tx.execute(
        "UPDATE tables SET status = ?1",
        [TableStatus::Free.to_db_str()],
    )?;
    {
        let mut ins = tx.prepare(
            "INSERT OR IGNORE INTO tables (number, status) VALUES (?1, ?2)",
        )?;
        for n in 1..=count {
            ins.execute(params![n, TableStatus::Free.to_db_str()])?;
        }
    }
    tx.commit()?;

    let total: i64 = conn.query_row("SELECT COUNT(*) FROM tables", [], |r| r.get(0))?;
    Ok(total as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::memory_pool;

    #[test]
    fn generate_creates_free_tables_in_order() {
        let mut pool = memory_pool();
        assert_eq!(generate(&mut pool.conn, 4, false).unwrap(), 4);

        let tables = all(&pool.conn).unwrap();
        let numbers: Vec<i64> = tables.iter().map(|t| t.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        assert!(tables.iter().all(|t| t.status == TableStatus::Free));
    }

    #[test]
    fn shrinking_keeps_surviving_rows() {
        let mut pool = memory_pool();
        generate(&mut pool.conn, 5, false).unwrap();
        let t2 = get_by_number(&pool.conn, 2).unwrap();
        set_status(&pool.conn, t2.id, TableStatus::Occupied).unwrap();

        generate(&mut pool.conn, 3, false).unwrap();

        let again = get_by_number(&pool.conn, 2).unwrap();
        assert_eq!(again.id, t2.id);
        assert_eq!(again.status, TableStatus::Free);
        assert!(find_by_number(&pool.conn, 5).unwrap().is_none());
    }

    #[test]
    fn pending_orders_block_generation_without_force() {
        let mut pool = memory_pool();
        generate(&mut pool.conn, 2, false).unwrap();
        pool.conn
            .execute_batch("INSERT INTO orders (table_id, total, status) VALUES (1, 10, 'pending');")
            .unwrap();

        assert!(matches!(
            generate(&mut pool.conn, 6, false),
            Err(AppError::Invalid(_))
        ));
        assert_eq!(generate(&mut pool.conn, 6, true).unwrap(), 6);
    }

    #[test]
    fn zero_tables_is_invalid() {
        let mut pool = memory_pool();
        assert!(generate(&mut pool.conn, 0, false).is_err());
    }
}
