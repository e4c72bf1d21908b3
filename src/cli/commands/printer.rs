use crate::cli::commands::open;
use crate::cli::parser::PrinterCmd;
use crate::config::Config;
use crate::core::{auth, routing};
use crate::db::log::audit_quiet;
use crate::db::{categories, printers, settings};
use crate::errors::{AppError, AppResult};
use crate::models::printer::{ConnectionType, NewPrinter, Printer, PrinterStatus};
use crate::models::role::Area;
use crate::printing::device::{self, device_for};
use crate::printing::receipt::test_page;
use crate::printing::{PrintOptions, print_ticket};
use crate::ui::messages::{header, info, success, warning};
use crate::utils::colors;
use crate::utils::date::now_stamp;
use crate::utils::table::{Column, Table};
use rusqlite::Connection;

pub fn handle(cmd: &PrinterCmd, cfg: &Config) -> AppResult<()> {
    let pool = open(cfg)?;
    let conn = &pool.conn;
    auth::require(conn, cfg, Area::Printers)?;
    let opts = PrintOptions::from_config(cfg);

    match cmd {
        PrinterCmd::List => {
            let all = printers::all(conn)?;
            if all.is_empty() {
                info("No printers registered. Try `fastpos printer scan --register`.");
                return Ok(());
            }
            header("🖨  Printers");
            print_printers(&all);
        }
        PrinterCmd::Scan { register } => {
            let found = device::scan();
            if found.is_empty() {
                info("No local printers found.");
                return Ok(());
            }

            header("🔎 Local printers");
            let mut t = Table::new(vec![
                Column::left("Name"),
                Column::left("Type"),
                Column::left("Device"),
                Column::left("Registered"),
            ]);
            let mut added = 0;
            for d in &found {
                let known = printers::find_by_name(conn, &d.name)?.is_some()
                    || printers::all(conn)?
                        .iter()
                        .any(|p| p.device_path.is_some() && p.device_path == d.device_path);

                let registered = if known {
                    "yes".to_string()
                } else if *register {
                    let id = printers::create(
                        conn,
                        &NewPrinter {
                            name: d.name.clone(),
                            connection: d.connection,
                            ip_address: None,
                            port: None,
                            vendor_id: None,
                            product_id: None,
                            device_path: d.device_path.clone(),
                            categories: Vec::new(),
                        },
                    )?;
                    audit_quiet(conn, "printer_add", &d.name, &format!("Printer #{id} registered from scan"));
                    added += 1;
                    format!("added (id {id})")
                } else {
                    "no".to_string()
                };

                t.add_row(vec![
                    d.name.clone(),
                    d.connection.to_db_str().to_string(),
                    colors::or_dash(d.device_path.as_deref()),
                    registered,
                ]);
            }
            t.print();
            if added > 0 {
                success(format!("{added} printer(s) registered"));
            }
        }
        PrinterCmd::Add {
            name,
            connection,
            ip,
            port,
            device,
            vendor_id,
            product_id,
            categories: cats,
        } => {
            let list = routing::parse_categories(cats.as_deref().unwrap_or_default());
            for c in &list {
                if categories::find_by_name(conn, c)?.is_none() {
                    return Err(AppError::NotFound(format!("Category '{c}'")));
                }
            }
            if printers::find_by_name(conn, name)?.is_some() {
                return Err(AppError::Duplicate(format!("Printer '{}' already exists", name.trim())));
            }

            let id = printers::create(
                conn,
                &NewPrinter {
                    name: name.clone(),
                    connection: *connection,
                    ip_address: ip.clone(),
                    port: *port,
                    vendor_id: vendor_id.clone(),
                    product_id: product_id.clone(),
                    device_path: device.clone(),
                    categories: list,
                },
            )?;
            audit_quiet(
                conn,
                "printer_add",
                name.trim(),
                &format!("Printer #{id} ({})", connection.to_db_str()),
            );
            success(format!("Printer '{}' added (id {id})", name.trim()));
        }
        PrinterCmd::Assign { id, category } => {
            let list = routing::assign(conn, *id, category)?;
            audit_quiet(conn, "printer_update", &format!("#{id}"), &format!("Assigned '{}'", category.trim()));
            success(format!("Printer #{id} now prints: {}", list.join(", ")));
        }
        PrinterCmd::Unassign { id, category } => {
            let list = routing::unassign(conn, *id, category)?;
            audit_quiet(conn, "printer_update", &format!("#{id}"), &format!("Unassigned '{}'", category.trim()));
            if list.is_empty() {
                success(format!("Printer #{id} has no categories left"));
            } else {
                success(format!("Printer #{id} now prints: {}", list.join(", ")));
            }
        }
        PrinterCmd::Delete { id } => {
            let p = printers::get(conn, *id)?;
            printers::delete(conn, *id)?;
            audit_quiet(conn, "printer_delete", &p.name, &format!("Printer #{id} deleted"));
            success(format!("Printer '{}' deleted", p.name));
        }
        PrinterCmd::Test { id } => {
            let p = printers::get(conn, *id)?;
            let page = test_page(&p.name, &settings::get(conn)?, &now_stamp());
            match print_ticket(&p, &page, opts) {
                Ok(()) => {
                    printers::set_status(conn, p.id, PrinterStatus::Online)?;
                    success(format!("Test page sent to '{}'", p.name));
                }
                Err(e) => {
                    printers::set_status(conn, p.id, PrinterStatus::Offline)?;
                    return Err(e);
                }
            }
        }
        PrinterCmd::Check { id } => {
            let targets = match id {
                Some(id) => vec![printers::get(conn, *id)?],
                None => printers::all(conn)?,
            };
            if targets.is_empty() {
                info("No printers registered.");
                return Ok(());
            }
            for p in targets {
                let status = probe(conn, &p, opts)?;
                let line = format!("{}: {}", p.name, colors::printer_status(status));
                match status {
                    PrinterStatus::Online => success(line),
                    PrinterStatus::Offline => warning(line),
                }
            }
        }
    }
    Ok(())
}

/// Probe one printer and store the result.
fn probe(conn: &Connection, p: &Printer, opts: PrintOptions) -> AppResult<PrinterStatus> {
    let online = device_for(p, opts.timeout)
        .map(|d| d.is_online())
        .unwrap_or(false);
    let status = if online {
        PrinterStatus::Online
    } else {
        PrinterStatus::Offline
    };
    printers::set_status(conn, p.id, status)?;
    Ok(status)
}

fn address(p: &Printer) -> String {
    match p.connection {
        ConnectionType::Network => format!(
            "{}:{}",
            p.ip_address.as_deref().unwrap_or("?"),
            p.port.unwrap_or(device::DEFAULT_PORT)
        ),
        ConnectionType::Usb => p.device_path.clone().unwrap_or_default(),
        ConnectionType::System => format!("queue {}", p.name),
    }
}

fn print_printers(all: &[Printer]) {
    let mut t = Table::new(vec![
        Column::right("ID"),
        Column::left("Name"),
        Column::left("Type"),
        Column::left("Address"),
        Column::left("Categories"),
        Column::left("Status"),
    ]);
    for p in all {
        t.add_row(vec![
            p.id.to_string(),
            p.name.clone(),
            p.connection.to_db_str().to_string(),
            address(p),
            if p.categories.is_empty() {
                colors::or_dash(None)
            } else {
                p.categories.join(", ")
            },
            colors::printer_status(p.status),
        ]);
    }
    t.print();
}
