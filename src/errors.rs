//! Unified application error type.
//! All modules (db, core, cli, printing, export) return AppError to keep the
//! error handling consistent and easy to manage.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid item spec: {0}")]
    InvalidItem(String),

    #[error("Invalid value: {0}")]
    Invalid(String),

    // ---------------------------
    // Lookup / integrity errors
    // ---------------------------
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Duplicate(String),

    // ---------------------------
    // Auth errors
    // ---------------------------
    #[error("Not logged in. Run `fastpos login <USERNAME>` first")]
    NotLoggedIn,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Permission denied: role '{role}' cannot access {area}")]
    PermissionDenied { role: String, area: String },

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    // ---------------------------
    // POS logic errors
    // ---------------------------
    #[error("The cart is empty")]
    EmptyCart,

    #[error("No order found for table {0}")]
    NoOrderForTable(i64),

    #[error("Inventory management is disabled. Enable it with `fastpos settings set --inventory on`")]
    InventoryDisabled,

    // ---------------------------
    // Printer errors
    // ---------------------------
    #[error("Printer error: {0}")]
    Printer(String),

    #[error("No printer available for customer receipts")]
    NoReceiptPrinter,

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // ---------------------------
    // Export errors
    // ---------------------------
    #[error("Export error: {0}")]
    Export(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl From<argon2::password_hash::Error> for AppError {
    fn from(e: argon2::password_hash::Error) -> Self {
        AppError::PasswordHash(e.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(e: serde_yaml::Error) -> Self {
        AppError::Config(e.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
