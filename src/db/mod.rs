pub mod categories;
pub mod ingredients;
pub mod initialize;
pub mod log;
pub mod migrate;
pub mod orders;
pub mod pool;
pub mod printers;
pub mod products;
pub mod settings;
pub mod stats;
pub mod tables;
pub mod users;

use crate::errors::AppError;
use rusqlite::{ErrorCode, ffi};

fn constraint_kind(e: &rusqlite::Error) -> Option<i32> {
    match e {
        rusqlite::Error::SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation => {
            Some(err.extended_code)
        }
        _ => None,
    }
}

pub(crate) fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        constraint_kind(e),
        Some(ffi::SQLITE_CONSTRAINT_UNIQUE) | Some(ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
    )
}

pub(crate) fn is_foreign_key_violation(e: &rusqlite::Error) -> bool {
    constraint_kind(e) == Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY)
}

/// Turn constraint failures into readable errors, pass everything else through.
pub(crate) fn map_constraint(e: rusqlite::Error, duplicate: &str, in_use: &str) -> AppError {
    if is_unique_violation(&e) {
        AppError::Duplicate(duplicate.to_string())
    } else if is_foreign_key_violation(&e) {
        AppError::Invalid(in_use.to_string())
    } else {
        AppError::Db(e)
    }
}
