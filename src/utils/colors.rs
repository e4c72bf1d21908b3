//! ANSI color helpers for terminal listings.

use crate::models::order::OrderStatus;
use crate::models::printer::PrinterStatus;
use crate::models::table::TableStatus;

pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

pub fn paint(value: &str, color: &str) -> String {
    format!("{color}{value}{RESET}")
}

/// Free → green, Occupied → yellow.
pub fn table_status(status: TableStatus) -> String {
    let color = match status {
        TableStatus::Free => GREEN,
        TableStatus::Occupied => YELLOW,
    };
    paint(status.to_db_str(), color)
}

pub fn order_status(status: OrderStatus) -> String {
    let color = match status {
        OrderStatus::Pending => YELLOW,
        OrderStatus::Paid => GREEN,
        OrderStatus::Cancelled => GREY,
    };
    paint(status.to_db_str(), color)
}

pub fn printer_status(status: PrinterStatus) -> String {
    let color = match status {
        PrinterStatus::Online => GREEN,
        PrinterStatus::Offline => RED,
    };
    paint(status.to_db_str(), color)
}

/// Quantity in red when at or below the minimum.
pub fn stock_level(quantity: f64, min_quantity: f64) -> String {
    let text = format!("{quantity:.2}");
    if quantity <= min_quantity {
        paint(&text, RED)
    } else {
        text
    }
}

/// Grey placeholder for empty optional fields.
pub fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => paint("-", GREY),
    }
}
