use crate::core::routing::{join_categories, parse_categories};
use crate::errors::{AppError, AppResult};
use crate::models::printer::{ConnectionType, NewPrinter, Printer, PrinterStatus};
use rusqlite::{Connection, OptionalExtension, Row, params};

const SELECT_PRINTERS: &str = "
    SELECT id, name, COALESCE(connection_type, 'network') AS connection_type,
           ip_address, port, vendor_id, product_id, device_path,
           COALESCE(assigned_categories, '') AS assigned_categories,
           COALESCE(status, 'offline') AS status
    FROM printers";

fn map_row(row: &Row) -> rusqlite::Result<Printer> {
    let connection: String = row.get("connection_type")?;
    let categories: String = row.get("assigned_categories")?;
    let status: String = row.get("status")?;
    let port: Option<i64> = row.get("port")?;

    Ok(Printer {
        id: row.get("id")?,
        name: row.get("name")?,
        connection: ConnectionType::from_db_str(&connection).unwrap_or(ConnectionType::Network),
        ip_address: row.get("ip_address")?,
        port: port.and_then(|p| u16::try_from(p).ok()),
        vendor_id: row.get("vendor_id")?,
        product_id: row.get("product_id")?,
        device_path: row.get("device_path")?,
        categories: parse_categories(&categories),
        status: PrinterStatus::from_db_str(&status),
    })
}

pub fn all(conn: &Connection) -> AppResult<Vec<Printer>> {
    let sql = format!("{SELECT_PRINTERS} ORDER BY id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn find(conn: &Connection, id: i64) -> AppResult<Option<Printer>> {
    let sql = format!("{SELECT_PRINTERS} WHERE id = ?1");
    Ok(conn.query_row(&sql, [id], map_row).optional()?)
}

pub fn get(conn: &Connection, id: i64) -> AppResult<Printer> {
    find(conn, id)?.ok_or_else(|| AppError::NotFound(format!("Printer #{id}")))
}

pub fn find_by_name(conn: &Connection, name: &str) -> AppResult<Option<Printer>> {
    let sql = format!("{SELECT_PRINTERS} WHERE name = ?1 ORDER BY id LIMIT 1");
    Ok(conn.query_row(&sql, [name.trim()], map_row).optional()?)
}

pub fn create(conn: &Connection, p: &NewPrinter) -> AppResult<i64> {
    let name = p.name.trim();
    if name.is_empty() {
        return Err(AppError::Invalid("Printer name cannot be empty".into()));
    }

    match p.connection {
        ConnectionType::Network if p.ip_address.as_deref().is_none_or(str::is_empty) => {
            return Err(AppError::Invalid(
                "Network printers need an IP address".into(),
            ));
        }
        ConnectionType::Usb if p.device_path.as_deref().is_none_or(str::is_empty) => {
            return Err(AppError::Invalid(
                "USB printers need a device path (e.g. /dev/usb/lp0)".into(),
            ));
        }
        _ => {}
    }

    conn.execute(
        "INSERT INTO printers (name, connection_type, ip_address, port, vendor_id, product_id,
                               device_path, assigned_categories, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            name,
            p.connection.to_db_str(),
            p.ip_address,
            p.port.map(i64::from),
            p.vendor_id,
            p.product_id,
            p.device_path,
            join_categories(&p.categories),
            PrinterStatus::Offline.to_db_str()
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn set_categories(conn: &Connection, id: i64, categories: &[String]) -> AppResult<()> {
    let changed = conn.execute(
        "UPDATE printers SET assigned_categories = ?1 WHERE id = ?2",
        params![join_categories(categories), id],
    )?;
    if changed == 0 {
        return Err(AppError::NotFound(format!("Printer #{id}")));
    }
    Ok(())
}

pub fn set_status(conn: &Connection, id: i64, status: PrinterStatus) -> AppResult<()> {
    conn.execute(
        "UPDATE printers SET status = ?1 WHERE id = ?2",
        params![status.to_db_str(), id],
    )?;
    Ok(())
}

pub fn delete(conn: &Connection, id: i64) -> AppResult<()> {
    let changed = conn.execute("DELETE FROM printers WHERE id = ?1", [id])?;
    if changed == 0 {
        return Err(AppError::NotFound(format!("Printer #{id}")));
    }
    Ok(())
}
