//! Category printer routing.
//!
//! Each printer row carries a comma-joined list of category names. Order
//! lines are grouped by category and every printer listing that category
//! receives one kitchen ticket per group.

use crate::db::log::audit_quiet;
use crate::db::pool::DbPool;
use crate::db::{categories, orders, printers};
use crate::errors::{AppError, AppResult};
use crate::models::order::OrderItem;
use crate::models::printer::Printer;
use crate::printing::device::{PrinterDevice, device_for};
use crate::printing::receipt::kitchen_ticket;
use crate::printing::PrintOptions;
use chrono::Local;
use rusqlite::Connection;
use std::thread::{self, JoinHandle};
use tracing::{info, warn};

/// Group label of lines whose product has no category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Split a stored list: trimmed, no empties, no duplicates, order kept.
pub fn parse_categories(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in text.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !out.iter().any(|c| c == name) {
            out.push(name.to_string());
        }
    }
    out
}

pub fn join_categories(categories: &[String]) -> String {
    parse_categories(&categories.join(",")).join(",")
}

/// Route `category` to a printer. Returns the new list.
pub fn assign(conn: &Connection, printer_id: i64, category: &str) -> AppResult<Vec<String>> {
    let cat = categories::find_by_name(conn, category)?
        .ok_or_else(|| AppError::NotFound(format!("Category '{}'", category.trim())))?;
    let printer = printers::get(conn, printer_id)?;

    let mut list = printer.categories;
    if !list.contains(&cat.name) {
        list.push(cat.name);
    }
    printers::set_categories(conn, printer_id, &list)?;
    Ok(list)
}

pub fn unassign(conn: &Connection, printer_id: i64, category: &str) -> AppResult<Vec<String>> {
    let printer = printers::get(conn, printer_id)?;
    let category = category.trim();

    if !printer.categories.iter().any(|c| c == category) {
        return Err(AppError::NotFound(format!(
            "Category '{category}' on printer '{}'",
            printer.name
        )));
    }

    let list: Vec<String> = printer
        .categories
        .into_iter()
        .filter(|c| c != category)
        .collect();
    printers::set_categories(conn, printer_id, &list)?;
    Ok(list)
}

/// Carry a category rename into every printer list. Returns the number of
/// printers touched.
pub fn rename_category(conn: &Connection, old: &str, new: &str) -> AppResult<usize> {
    let (old, new) = (old.trim(), new.trim());
    let mut touched = 0;
    for printer in printers::all(conn)? {
        if !printer.categories.iter().any(|c| c == old) {
            continue;
        }
        let list: Vec<String> = printer
            .categories
            .iter()
            .map(|c| if c == old { new.to_string() } else { c.clone() })
            .collect();
        printers::set_categories(conn, printer.id, &list)?;
        touched += 1;
    }
    Ok(touched)
}

/// Printers whose list contains exactly `category`.
pub fn printers_for_category(conn: &Connection, category: &str) -> AppResult<Vec<Printer>> {
    let category = category.trim();
    Ok(printers::all(conn)?
        .into_iter()
        .filter(|p| p.categories.iter().any(|c| c == category))
        .collect())
}

/// Group lines by category name, keeping first-seen order.
pub fn group_by_category(items: &[OrderItem]) -> Vec<(String, Vec<OrderItem>)> {
    let mut groups: Vec<(String, Vec<OrderItem>)> = Vec::new();
    for item in items {
        let key = item
            .category_name
            .clone()
            .unwrap_or_else(|| UNCATEGORIZED.to_string());
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, lines)) => lines.push(item.clone()),
            None => groups.push((key, vec![item.clone()])),
        }
    }
    groups
}

/// One kitchen ticket to send.
#[derive(Debug, Clone)]
pub struct Route {
    pub printer: Printer,
    pub category: String,
    pub items: Vec<OrderItem>,
}

pub fn plan(conn: &Connection, items: &[OrderItem]) -> AppResult<Vec<Route>> {
    let mut routes = Vec::new();

    for (category, lines) in group_by_category(items) {
        for printer in printers_for_category(conn, &category)? {
            routes.push(Route {
                printer,
                category: category.clone(),
                items: lines.clone(),
            });
        }
    }
    Ok(routes)
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: usize,
}

/// Send one kitchen ticket per route. Failures are logged, never returned.
pub fn dispatch<F>(
    conn: &Connection,
    order_id: i64,
    items: &[OrderItem],
    opts: PrintOptions,
    connect: F,
) -> AppResult<DispatchReport>
where
    F: Fn(&Printer) -> AppResult<Box<dyn PrinterDevice>>,
{
    let order = orders::get(conn, order_id)?;
    let time = Local::now().format("%H:%M").to_string();
    let mut report = DispatchReport::default();

    for route in plan(conn, items)? {
        let ticket = kitchen_ticket(
            &route.category,
            order_id,
            order.table_number,
            &time,
            &route.items,
        );

        let result = connect(&route.printer)
            .and_then(|dev| dev.print(&ticket.to_escpos(opts.width)));

        match result {
            Ok(()) => {
                info!(printer = %route.printer.name, category = %route.category, order_id, "Kitchen ticket sent");
                report.sent += 1;
            }
            Err(e) => {
                warn!(printer = %route.printer.name, category = %route.category, order_id, error = %e, "Kitchen ticket failed");
                audit_quiet(
                    conn,
                    "print_failed",
                    &route.printer.name,
                    &format!("Order #{order_id} ({}): {e}", route.category),
                );
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

/// Route freshly added order lines on a worker thread with its own connection.
pub fn spawn_dispatch(
    db_path: String,
    order_id: i64,
    item_ids: Vec<i64>,
    opts: PrintOptions,
) -> JoinHandle<DispatchReport> {
    thread::spawn(move || {
        let run = || -> AppResult<DispatchReport> {
            let pool = DbPool::new(&db_path)?;
            let items = orders::items_by_ids(&pool.conn, &item_ids)?;
            dispatch(&pool.conn, order_id, &items, opts, |p| {
                device_for(p, opts.timeout)
            })
        };

        match run() {
            Ok(report) => report,
            Err(e) => {
                warn!(order_id, error = %e, "Category printer routing failed");
                DispatchReport::default()
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::memory_pool;
    use crate::models::printer::{ConnectionType, NewPrinter};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[test]
    fn parse_trims_dedupes_and_drops_empties() {
        assert_eq!(
            parse_categories(" Pizza, Drinks,,Pizza , "),
            vec!["Pizza", "Drinks"]
        );
        assert!(parse_categories("").is_empty());
        assert_eq!(
            join_categories(&["A".into(), " B".into(), "A".into()]),
            "A,B"
        );
    }

    fn setup(conn: &Connection) -> (i64, i64) {
        conn.execute_batch(
            "INSERT INTO categories (id, name) VALUES (1, 'Pizza'), (2, 'Pizza Sides'), (3, 'Drinks');
             INSERT INTO products (id, name, category_id, price) VALUES
                (1, 'Margherita', 1, 800), (2, 'Fries', 2, 200), (3, 'Cola', 3, 150), (4, 'Bread', NULL, 50);
             INSERT INTO tables (id, number) VALUES (1, 5);",
        )
        .unwrap();

        let kitchen = printers::create(
            conn,
            &NewPrinter {
                name: "Kitchen".into(),
                connection: ConnectionType::Network,
                ip_address: Some("10.0.0.9".into()),
                port: None,
                vendor_id: None,
                product_id: None,
                device_path: None,
                categories: vec![],
            },
        )
        .unwrap();
        let bar = printers::create(
            conn,
            &NewPrinter {
                name: "Bar".into(),
                connection: ConnectionType::System,
                ip_address: None,
                port: None,
                vendor_id: None,
                product_id: None,
                device_path: None,
                categories: vec![],
            },
        )
        .unwrap();
        (kitchen, bar)
    }

    #[test]
    fn assign_is_a_set_and_requires_known_category() {
        let pool = memory_pool();
        let (kitchen, _) = setup(&pool.conn);

        assign(&pool.conn, kitchen, "Pizza").unwrap();
        let list = assign(&pool.conn, kitchen, "Pizza").unwrap();
        assert_eq!(list, vec!["Pizza"]);

        assert!(matches!(
            assign(&pool.conn, kitchen, "Sushi"),
            Err(AppError::NotFound(_))
        ));

        let list = unassign(&pool.conn, kitchen, "Pizza").unwrap();
        assert!(list.is_empty());
        assert!(unassign(&pool.conn, kitchen, "Pizza").is_err());
    }

    #[test]
    fn renamed_categories_follow_printers() {
        let pool = memory_pool();
        let (kitchen, bar) = setup(&pool.conn);
        assign(&pool.conn, kitchen, "Pizza").unwrap();
        assign(&pool.conn, kitchen, "Drinks").unwrap();

        assert_eq!(rename_category(&pool.conn, "Pizza", "Pizzas").unwrap(), 1);
        assert_eq!(printers::get(&pool.conn, kitchen).unwrap().categories, vec!["Pizzas", "Drinks"]);
        assert!(printers::get(&pool.conn, bar).unwrap().categories.is_empty());
    }

    #[test]
    fn matching_is_exact_not_substring() {
        let pool = memory_pool();
        let (kitchen, _) = setup(&pool.conn);
        assign(&pool.conn, kitchen, "Pizza Sides").unwrap();

        assert!(printers_for_category(&pool.conn, "Pizza").unwrap().is_empty());
        assert_eq!(printers_for_category(&pool.conn, "Pizza Sides").unwrap().len(), 1);

        let margherita = OrderItem {
            id: 1,
            order_id: 1,
            product_id: 1,
            product_name: "Margherita".into(),
            category_name: Some("Pizza".into()),
            quantity: 1,
            price: 800.0,
        };
        assert!(plan(&pool.conn, &[margherita.clone()]).unwrap().is_empty());

        let fries = OrderItem {
            product_id: 2,
            product_name: "Fries".into(),
            category_name: Some("Pizza Sides".into()),
            ..margherita
        };
        let routes = plan(&pool.conn, &[fries]).unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].printer.id, kitchen);
    }

    struct Recorder {
        name: String,
        log: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
        fail: bool,
    }

    impl PrinterDevice for Recorder {
        fn print(&self, data: &[u8]) -> AppResult<()> {
            if self.fail {
                return Err(AppError::Printer("paper jam".into()));
            }
            self.log.lock().unwrap().push((self.name.clone(), data.to_vec()));
            Ok(())
        }
        fn is_online(&self) -> bool {
            !self.fail
        }
    }

    #[test]
    fn dispatch_sends_one_ticket_per_printer_and_category() {
        let mut pool = memory_pool();
        let (kitchen, bar) = setup(&pool.conn);
        assign(&pool.conn, kitchen, "Pizza").unwrap();
        assign(&pool.conn, kitchen, "Pizza Sides").unwrap();
        assign(&pool.conn, bar, "Drinks").unwrap();

        let (order_id, ids) = orders::create(
            &mut pool.conn,
            1,
            None,
            "cash",
            &[
                orders::NewItem { product_id: 1, quantity: 2, price: 800.0 },
                orders::NewItem { product_id: 2, quantity: 1, price: 200.0 },
                orders::NewItem { product_id: 3, quantity: 3, price: 150.0 },
                orders::NewItem { product_id: 4, quantity: 1, price: 50.0 },
            ],
        )
        .unwrap();
        let items = orders::items_by_ids(&pool.conn, &ids).unwrap();

        let log = Arc::new(Mutex::new(Vec::new()));
        let opts = PrintOptions { width: 32, timeout: Duration::from_millis(100) };
        let report = dispatch(&pool.conn, order_id, &items, opts, |p| {
            Ok(Box::new(Recorder {
                name: p.name.clone(),
                log: Arc::clone(&log),
                fail: false,
            }) as Box<dyn PrinterDevice>)
        })
        .unwrap();

        assert_eq!(report, DispatchReport { sent: 3, failed: 0 });
        let log = log.lock().unwrap();
        let targets: Vec<&str> = log.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(targets, vec!["Kitchen", "Kitchen", "Bar"]);

        let bar_ticket = String::from_utf8_lossy(&log[2].1).to_string();
        assert!(bar_ticket.contains("Cola x3"));
        assert!(!bar_ticket.contains("Margherita"));
    }

    #[test]
    fn failures_are_counted_and_audited() {
        let mut pool = memory_pool();
        let (kitchen, _) = setup(&pool.conn);
        assign(&pool.conn, kitchen, "Pizza").unwrap();

        let (order_id, ids) = orders::create(
            &mut pool.conn,
            1,
            None,
            "cash",
            &[orders::NewItem { product_id: 1, quantity: 1, price: 800.0 }],
        )
        .unwrap();
        let items = orders::items_by_ids(&pool.conn, &ids).unwrap();

        let opts = PrintOptions { width: 32, timeout: Duration::from_millis(100) };
        let report = dispatch(&pool.conn, order_id, &items, opts, |p| {
            Ok(Box::new(Recorder {
                name: p.name.clone(),
                log: Arc::new(Mutex::new(Vec::new())),
                fail: true,
            }) as Box<dyn PrinterDevice>)
        })
        .unwrap();

        assert_eq!(report, DispatchReport { sent: 0, failed: 1 });
        let audited: i64 = pool
            .conn
            .query_row("SELECT COUNT(*) FROM log WHERE operation = 'print_failed'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(audited, 1);
    }
}
