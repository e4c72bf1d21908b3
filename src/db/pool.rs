//! SQLite connection wrapper (one connection per command).

use rusqlite::{Connection, Result};
use std::path::Path;
use std::time::Duration;

pub struct DbPool {
    pub conn: Connection,
}

impl DbPool {
    pub fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(Path::new(path))?;
        Self::configure(conn)
    }

    /// Private in-memory database, used by unit tests.
    pub fn in_memory() -> Result<Self> {
        Self::configure(Connection::open_in_memory()?)
    }

    fn configure(conn: Connection) -> Result<Self> {
        // the background printer worker opens its own connection
        conn.busy_timeout(Duration::from_secs(10))?;
        // journal_mode answers with a row; unsupported modes are not fatal
        let _ = conn.query_row("PRAGMA journal_mode = WAL;", [], |_| Ok(()));
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }
}
