use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
pub enum TableStatus {
    Free,
    Occupied,
}

impl TableStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            TableStatus::Free => "Free",
            TableStatus::Occupied => "Occupied",
        }
    }

    /// Case-insensitive: older databases stored lowercase values.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "free" => Some(TableStatus::Free),
            "occupied" => Some(TableStatus::Occupied),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            TableStatus::Free => TableStatus::Occupied,
            TableStatus::Occupied => TableStatus::Free,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub id: i64,
    pub number: i64,
    pub status: TableStatus,
}
