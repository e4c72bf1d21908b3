use crate::ui::messages::{success, warning};
use crate::utils::date::now_stamp;
use rusqlite::{Connection, OptionalExtension, Result};

/// Ensure that the `log` table exists; migrations record themselves there.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

const CATEGORIES: &str = "
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE";

const PRODUCTS: &str = "
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    category_id INTEGER REFERENCES categories(id) ON DELETE SET NULL,
    price       REAL NOT NULL CHECK(price >= 0),
    image       TEXT,
    cost        REAL DEFAULT 0.0,
    status      TEXT NOT NULL DEFAULT 'available' CHECK(status IN ('available', 'unavailable'))";

const TABLES: &str = "
    id     INTEGER PRIMARY KEY AUTOINCREMENT,
    number INTEGER NOT NULL UNIQUE,
    status TEXT NOT NULL DEFAULT 'Free' CHECK(status IN ('Free', 'Occupied'))";

const USERS: &str = "
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT UNIQUE NOT NULL,
    password TEXT NOT NULL,
    role     TEXT NOT NULL CHECK(role IN ('admin', 'cashier', 'kitchen', 'manager'))";

const ORDERS: &str = "
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    table_id     INTEGER REFERENCES tables(id) ON DELETE SET NULL,
    user_id      INTEGER REFERENCES users(id) ON DELETE SET NULL,
    total        REAL,
    payment_type TEXT,
    status       TEXT NOT NULL DEFAULT 'pending' CHECK(status IN ('pending', 'paid', 'cancelled')),
    created_at   TIMESTAMP DEFAULT CURRENT_TIMESTAMP";

const ORDER_ITEMS: &str = "
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    order_id   INTEGER REFERENCES orders(id) ON DELETE CASCADE,
    product_id INTEGER REFERENCES products(id),
    quantity   INTEGER,
    price      REAL";

const PRINTERS: &str = "
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    name                TEXT NOT NULL,
    connection_type     TEXT CHECK(connection_type IN ('usb', 'network', 'system')),
    vendor_id           TEXT,
    product_id          TEXT,
    serial_number       TEXT,
    ip_address          TEXT,
    port                INTEGER,
    device_path         TEXT,
    assigned_categories TEXT DEFAULT '',
    status              TEXT NOT NULL DEFAULT 'offline' CHECK(status IN ('online', 'offline'))";

const SETTINGS: &str = "
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    restaurant_name   TEXT,
    address           TEXT,
    phone             TEXT,
    logo_path         TEXT,
    vat_percentage    REAL DEFAULT 0,
    currency_symbol   TEXT DEFAULT 'DZD',
    inventory_enabled INTEGER DEFAULT 0";

const INGREDIENTS: &str = "
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT NOT NULL,
    quantity     REAL DEFAULT 0,
    unit         TEXT DEFAULT 'pcs',
    min_quantity REAL DEFAULT 0,
    cost         REAL DEFAULT 0,
    product_id   INTEGER REFERENCES products(id) ON DELETE SET NULL";

/// Current schema, in creation order.
const SCHEMA: [(&str, &str); 9] = [
    ("categories", CATEGORIES),
    ("products", PRODUCTS),
    ("tables", TABLES),
    ("users", USERS),
    ("orders", ORDERS),
    ("order_items", ORDER_ITEMS),
    ("printers", PRINTERS),
    ("settings", SETTINGS),
    ("ingredients", INGREDIENTS),
];

const REPORTING_INDEXES: &str = "
    CREATE INDEX IF NOT EXISTS idx_orders_created_at ON orders(created_at);
    CREATE INDEX IF NOT EXISTS idx_orders_table_status ON orders(table_id, status);
    CREATE INDEX IF NOT EXISTS idx_order_items_order ON order_items(order_id);";

/// Create every table of the current schema that does not exist yet.
fn create_base_schema(conn: &Connection) -> Result<()> {
    for (name, body) in SCHEMA {
        conn.execute_batch(&format!("CREATE TABLE IF NOT EXISTS {name} ({body});"))?;
    }
    Ok(())
}

/// Exactly one settings row is expected.
fn ensure_settings_row(conn: &Connection) -> Result<()> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM settings", [], |row| row.get(0))?;
    if count == 0 {
        conn.execute(
            "INSERT INTO settings (restaurant_name, address, phone, logo_path, vat_percentage, currency_symbol, inventory_enabled)
             VALUES ('My Restaurant', '123 Main St', '0550 000 000', '', 0, 'DZD', 0)",
            [],
        )?;
        success("Created default settings row.");
    }
    Ok(())
}

/// Check if `table` has a column called `column`.
pub(crate) fn table_has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info('{table}')"))?;
    let cols = stmt.query_map([], |row| row.get::<_, String>(1))?;

    for c in cols {
        if c? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn migration_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn mark_migration(conn: &Connection, version: &str, message: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (?1, 'migration_applied', ?2, ?3)",
        [now_stamp().as_str(), version, message],
    )?;
    Ok(())
}

/// Databases created by the first desktop releases keyed tables by `name`
/// and had no status column.
fn migrate_tables_number_status(conn: &Connection) -> Result<()> {
    let version = "20251021_0001_tables_number_status";
    if migration_applied(conn, version)? {
        return Ok(());
    }

    if !table_has_column(conn, "tables", "number")? {
        warning("Adding 'number' column to tables...");
        conn.execute_batch(
            r#"
            ALTER TABLE tables ADD COLUMN number INTEGER;
            UPDATE tables SET number = id WHERE number IS NULL;
            CREATE UNIQUE INDEX IF NOT EXISTS idx_tables_number ON tables(number);
            "#,
        )?;
    }

    if !table_has_column(conn, "tables", "status")? {
        conn.execute_batch("ALTER TABLE tables ADD COLUMN status TEXT NOT NULL DEFAULT 'Free';")?;
    }

    mark_migration(conn, version, "Tables keyed by number with Free/Occupied status")?;
    Ok(())
}

/// USB printers are addressed through their device node.
fn migrate_printers_device_path(conn: &Connection) -> Result<()> {
    let version = "20251021_0002_printers_device_path";
    if migration_applied(conn, version)? {
        return Ok(());
    }

    if !table_has_column(conn, "printers", "device_path")? {
        conn.execute_batch("ALTER TABLE printers ADD COLUMN device_path TEXT;")?;
    }
    if !table_has_column(conn, "printers", "connection_type")? {
        conn.execute_batch("ALTER TABLE printers ADD COLUMN connection_type TEXT;")?;
    }

    mark_migration(conn, version, "Added device_path to printers")?;
    Ok(())
}

fn migrate_reporting_indexes(conn: &Connection) -> Result<()> {
    let version = "20251021_0003_reporting_indexes";
    if migration_applied(conn, version)? {
        return Ok(());
    }

    conn.execute_batch(REPORTING_INDEXES)?;

    mark_migration(conn, version, "Indexes for order lookups and reports")?;
    Ok(())
}

/// Stored `CREATE TABLE` statement, lowercased and without whitespace.
fn table_sql(conn: &Connection, table: &str) -> Result<String> {
    let sql: Option<String> = conn
        .query_row(
            "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |row| row.get(0),
        )
        .optional()?;
    Ok(sql
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase())
}

/// A table whose stored definition predates the current constraints, with
/// the column list used to copy its rows across.
struct Rebuild {
    table: &'static str,
    body: &'static str,
    columns: &'static str,
    select: &'static str,
    outdated: fn(&Connection, &str) -> Result<bool>,
}

fn lacks_status_check(conn: &Connection, table: &str) -> Result<bool> {
    Ok(!table_sql(conn, table)?.contains("check(statusin"))
}

fn tables_outdated(conn: &Connection, table: &str) -> Result<bool> {
    Ok(table_has_column(conn, table, "name")? || lacks_status_check(conn, table)?)
}

fn printers_outdated(conn: &Connection, table: &str) -> Result<bool> {
    Ok(!table_sql(conn, table)?.contains("'system'"))
}

fn ingredients_outdated(conn: &Connection, table: &str) -> Result<bool> {
    Ok(!table_sql(conn, table)?.contains("ondeletesetnull"))
}

const REBUILDS: [Rebuild; 5] = [
    Rebuild {
        table: "products",
        body: PRODUCTS,
        columns: "id, name, category_id, price, image, cost, status",
        select: "id, name, category_id, MAX(COALESCE(price, 0), 0), image, cost,
                 CASE WHEN lower(trim(status)) = 'unavailable' THEN 'unavailable' ELSE 'available' END",
        outdated: lacks_status_check,
    },
    Rebuild {
        table: "tables",
        body: TABLES,
        columns: "id, number, status",
        select: "id, COALESCE(number, id),
                 CASE WHEN status = 'Occupied' THEN 'Occupied' ELSE 'Free' END",
        outdated: tables_outdated,
    },
    Rebuild {
        table: "orders",
        body: ORDERS,
        columns: "id, table_id, user_id, total, payment_type, status, created_at",
        select: "id, table_id, user_id, total, payment_type,
                 CASE lower(trim(status)) WHEN 'paid' THEN 'paid' WHEN 'cancelled' THEN 'cancelled'
                      ELSE 'pending' END,
                 created_at",
        outdated: lacks_status_check,
    },
    Rebuild {
        table: "printers",
        body: PRINTERS,
        columns: "id, name, connection_type, vendor_id, product_id, serial_number, ip_address, port,
                  device_path, assigned_categories, status",
        select: "id, name, connection_type, vendor_id, product_id, serial_number, ip_address, port,
                 device_path, COALESCE(assigned_categories, ''),
                 CASE WHEN lower(trim(status)) = 'online' THEN 'online' ELSE 'offline' END",
        outdated: printers_outdated,
    },
    Rebuild {
        table: "ingredients",
        body: INGREDIENTS,
        columns: "id, name, quantity, unit, min_quantity, cost, product_id",
        select: "id, name, quantity, unit, min_quantity, cost, product_id",
        outdated: ingredients_outdated,
    },
];

/// Copy `r.table` into a table with the current definition and swap it in.
/// Runs inside the caller's transaction with foreign keys off.
fn rebuild_table(conn: &Connection, r: &Rebuild) -> Result<()> {
    let fresh = format!("{}_new", r.table);
    conn.execute_batch(&format!(
        "DROP TABLE IF EXISTS {fresh};
         CREATE TABLE {fresh} ({body});
         INSERT INTO {fresh} ({columns}) SELECT {select} FROM {table};
         DROP TABLE {table};
         ALTER TABLE {fresh} RENAME TO {table};",
        body = r.body,
        columns = r.columns,
        select = r.select,
        table = r.table,
    ))
}

/// Databases written by the desktop releases keep their original
/// definitions: `tables.name NOT NULL`, no `system` printers, no status
/// checks. Rebuild those tables with the current schema.
fn migrate_rebuild_legacy_tables(conn: &Connection) -> Result<()> {
    let version = "20251021_0004_rebuild_legacy_tables";
    if migration_applied(conn, version)? {
        return Ok(());
    }

    let mut outdated = Vec::new();
    for r in &REBUILDS {
        if (r.outdated)(conn, r.table)? {
            outdated.push(r);
        }
    }

    if !outdated.is_empty() {
        let fk_on: bool = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?;
        conn.execute_batch("PRAGMA foreign_keys = OFF;")?;

        let rebuilt = (|| {
            let tx = conn.unchecked_transaction()?;
            for r in &outdated {
                warning(format!("Rebuilding '{}' with the current schema...", r.table));
                rebuild_table(&tx, r)?;
            }
            tx.execute_batch(REPORTING_INDEXES)?;
            tx.commit()
        })();

        if fk_on {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        }
        rebuilt?;

        let dangling: i64 = conn.query_row(
            "SELECT COUNT(*) FROM pragma_foreign_key_check",
            [],
            |row| row.get(0),
        )?;
        if dangling > 0 {
            warning(format!("{dangling} row(s) reference missing records"));
        }
    }

    mark_migration(conn, version, "Legacy tables rebuilt with current constraints")?;
    Ok(())
}

/// Run all pending migrations in order. Safe to call on every start.
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    ensure_log_table(conn)?;
    create_base_schema(conn)?;
    ensure_settings_row(conn)?;

    migrate_tables_number_status(conn)?;
    migrate_printers_device_path(conn)?;
    migrate_reporting_indexes(conn)?;
    migrate_rebuild_legacy_tables(conn)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_pending_migrations(&conn).unwrap();
        run_pending_migrations(&conn).unwrap();

        let settings: i64 = conn
            .query_row("SELECT COUNT(*) FROM settings", [], |r| r.get(0))
            .unwrap();
        assert_eq!(settings, 1);

        let applied: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM log WHERE operation = 'migration_applied'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(applied, 4);
    }

    /// Schema and rows as left behind by the desktop releases.
    fn desktop_database() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE categories (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL UNIQUE);
            CREATE TABLE products (
                id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL, category_id INTEGER,
                price REAL NOT NULL, image TEXT, cost REAL DEFAULT 0.0, status TEXT DEFAULT 'available',
                FOREIGN KEY (category_id) REFERENCES categories(id));
            CREATE TABLE tables (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL UNIQUE, area TEXT);
            CREATE TABLE orders (
                id INTEGER PRIMARY KEY AUTOINCREMENT, table_id INTEGER, user_id INTEGER, total REAL,
                payment_type TEXT, status TEXT DEFAULT 'pending', created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (table_id) REFERENCES tables(id));
            CREATE TABLE printers (
                id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL,
                connection_type TEXT CHECK(connection_type IN ('usb', 'network')),
                vendor_id TEXT, product_id TEXT, serial_number TEXT, ip_address TEXT, port INTEGER,
                assigned_categories TEXT, status TEXT DEFAULT 'offline');
            CREATE TABLE ingredients (
                id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL, quantity REAL DEFAULT 0,
                unit TEXT DEFAULT 'pcs', min_quantity REAL DEFAULT 0, cost REAL DEFAULT 0, product_id INTEGER,
                FOREIGN KEY(product_id) REFERENCES products(id));

            INSERT INTO categories (name) VALUES ('Pizza');
            INSERT INTO products (name, category_id, price, cost) VALUES ('Margherita', 1, 800, 300);
            INSERT INTO tables (name, area) VALUES ('T1', 'hall'), ('T2', 'terrace');
            INSERT INTO orders (table_id, total, payment_type, status) VALUES (2, 800, 'cash', 'paid');
            INSERT INTO printers (name, connection_type, ip_address, port, assigned_categories)
                VALUES ('Kitchen', 'network', '10.0.0.5', 9100, 'Pizza');
            "#,
        )
        .unwrap();
        conn
    }

    #[test]
    fn legacy_tables_get_number_and_status() {
        let mut conn = desktop_database();
        run_pending_migrations(&conn).unwrap();

        assert!(table_has_column(&conn, "tables", "number").unwrap());
        assert!(!table_has_column(&conn, "tables", "name").unwrap());
        let (number, status): (i64, String) = conn
            .query_row("SELECT number, status FROM tables WHERE id = 2", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(number, 2);
        assert_eq!(status, "Free");

        // history stays attached to the rebuilt table rows
        let table_id: i64 = conn
            .query_row("SELECT table_id FROM orders WHERE id = 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(table_id, 2);

        assert_eq!(crate::db::tables::generate(&mut conn, 4, false).unwrap(), 4);
        assert_eq!(crate::db::tables::get_by_number(&conn, 2).unwrap().id, 2);
    }

    #[test]
    fn legacy_printers_accept_system_queues() {
        let conn = desktop_database();
        run_pending_migrations(&conn).unwrap();

        let id = crate::db::printers::create(
            &conn,
            &crate::models::printer::NewPrinter {
                name: "Bar".into(),
                connection: crate::models::printer::ConnectionType::System,
                ip_address: None,
                port: None,
                vendor_id: None,
                product_id: None,
                device_path: None,
                categories: vec![],
            },
        )
        .unwrap();
        assert!(id > 1);

        let kitchen = crate::db::printers::get(&conn, 1).unwrap();
        assert_eq!(kitchen.categories, vec!["Pizza"]);
    }

    #[test]
    fn rebuilt_tables_enforce_status_checks_and_keep_indexes() {
        let conn = desktop_database();
        run_pending_migrations(&conn).unwrap();

        assert!(conn
            .execute("UPDATE products SET status = 'sold out' WHERE id = 1", [])
            .is_err());
        assert!(conn
            .execute("UPDATE orders SET status = 'done' WHERE id = 1", [])
            .is_err());

        let indexes: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name LIKE 'idx_order%'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(indexes, 3);

        // a second start finds nothing left to rebuild
        run_pending_migrations(&conn).unwrap();
        let logged: String = conn
            .query_row(
                "SELECT date FROM log WHERE target = '20251021_0004_rebuild_legacy_tables'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert!(chrono::NaiveDateTime::parse_from_str(&logged, "%Y-%m-%d %H:%M:%S").is_ok());
    }
}
