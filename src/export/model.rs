use crate::core::reports::{CategorySales, DailyReport};
use crate::models::order::Order;
use serde::Serialize;
use std::fmt;

/// A typed value, so spreadsheets get real numbers.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Int(i64),
    Money(f64),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Int(n) => write!(f, "{n}"),
            Cell::Money(v) => write!(f, "{v:.2}"),
        }
    }
}

/// A flat record that every writer knows how to lay out.
pub trait ExportRow: Serialize {
    fn headers(currency: &str) -> Vec<String>;
    fn cells(&self) -> Vec<Cell>;
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct OrderExport {
    pub id: i64,
    pub created_at: String,
    pub table: Option<i64>,
    pub user: Option<String>,
    pub payment_type: String,
    pub status: String,
    pub total: f64,
}

impl From<Order> for OrderExport {
    fn from(o: Order) -> Self {
        Self {
            id: o.id,
            created_at: o.created_at,
            table: o.table_number,
            user: o.username,
            payment_type: o.payment_type,
            status: o.status.to_db_str().to_string(),
            total: o.total,
        }
    }
}

impl ExportRow for OrderExport {
    fn headers(currency: &str) -> Vec<String> {
        vec![
            "Order".into(),
            "Date".into(),
            "Table".into(),
            "User".into(),
            "Payment".into(),
            "Status".into(),
            format!("Total ({currency})"),
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Int(self.id),
            Cell::Text(self.created_at.clone()),
            self.table.map(Cell::Int).unwrap_or(Cell::Text(String::new())),
            Cell::Text(self.user.clone().unwrap_or_default()),
            Cell::Text(self.payment_type.clone()),
            Cell::Text(self.status.clone()),
            Cell::Money(self.total),
        ]
    }
}

impl ExportRow for DailyReport {
    fn headers(currency: &str) -> Vec<String> {
        vec![
            "Date".into(),
            "Orders".into(),
            format!("Revenue ({currency})"),
            format!("Cost ({currency})"),
            format!("Profit ({currency})"),
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Text(self.date.clone()),
            Cell::Int(self.orders),
            Cell::Money(self.revenue),
            Cell::Money(self.cost),
            Cell::Money(self.profit),
        ]
    }
}

impl ExportRow for CategorySales {
    fn headers(currency: &str) -> Vec<String> {
        vec!["Category".into(), format!("Total Sales ({currency})")]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![Cell::Text(self.category.clone()), Cell::Money(self.total)]
    }
}

/// Rows as display strings (PDF).
pub(crate) fn to_table<T: ExportRow>(rows: &[T]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| r.cells().iter().map(Cell::to_string).collect())
        .collect()
}
