pub mod device;
pub mod escpos;
pub mod receipt;

use crate::config::Config;
use crate::db::printers;
use crate::errors::{AppError, AppResult};
use crate::models::printer::Printer;
use rusqlite::Connection;
use std::time::Duration;

use device::device_for;
use receipt::Ticket;

/// Paper and transport parameters taken from the configuration.
#[derive(Debug, Clone, Copy)]
pub struct PrintOptions {
    pub width: usize,
    pub timeout: Duration,
}

impl PrintOptions {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            width: cfg.receipt_width,
            timeout: Duration::from_millis(cfg.printer_timeout_ms),
        }
    }
}

/// Printer used for customer receipts: the configured one by name,
/// otherwise the first registered printer.
pub fn receipt_printer(conn: &Connection, cfg: &Config) -> AppResult<Printer> {
    if let Some(name) = cfg.receipt_printer.as_deref().filter(|n| !n.trim().is_empty()) {
        return printers::find_by_name(conn, name)?
            .ok_or_else(|| AppError::NotFound(format!("Receipt printer '{name}'")));
    }

    printers::all(conn)?
        .into_iter()
        .next()
        .ok_or(AppError::NoReceiptPrinter)
}

/// Render `ticket` and send it to `printer`.
pub fn print_ticket(printer: &Printer, ticket: &Ticket, opts: PrintOptions) -> AppResult<()> {
    let device = device_for(printer, opts.timeout)?;
    device.print(&ticket.to_escpos(opts.width))
}
