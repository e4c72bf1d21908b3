use crate::db::pool::DbPool;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use rusqlite::OptionalExtension;
use std::fs;

/// Tables reported by `db --info`, in display order.
const COUNTED_TABLES: [&str; 9] = [
    "categories",
    "products",
    "tables",
    "users",
    "orders",
    "order_items",
    "printers",
    "ingredients",
    "log",
];

pub fn print_db_info(pool: &DbPool, db_path: &str) -> rusqlite::Result<()> {
    println!();

    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{CYAN}• File:{RESET} {YELLOW}{db_path}{RESET}");
    println!("{CYAN}• Size:{RESET} {file_mb:.2} MB");

    println!("{CYAN}• Rows:{RESET}");
    for table in COUNTED_TABLES {
        let count: i64 = pool
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        println!("    {table:<12} {GREEN}{count}{RESET}");
    }

    let first: Option<String> = pool
        .conn
        .query_row("SELECT MIN(created_at) FROM orders", [], |row| row.get(0))
        .optional()?
        .flatten();
    let last: Option<String> = pool
        .conn
        .query_row("SELECT MAX(created_at) FROM orders", [], |row| row.get(0))
        .optional()?
        .flatten();

    let dash = || format!("{GREY}--{RESET}");
    println!("{CYAN}• Orders:{RESET}");
    println!("    first: {}", first.unwrap_or_else(dash));
    println!("    last:  {}", last.unwrap_or_else(dash));

    println!();
    Ok(())
}
