use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    /// Raw ESC/POS over TCP (port 9100)
    Network,
    /// Raw ESC/POS written to a device node (e.g. /dev/usb/lp0)
    Usb,
    /// A queue of the system print spooler
    System,
}

impl ConnectionType {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ConnectionType::Network => "network",
            ConnectionType::Usb => "usb",
            ConnectionType::System => "system",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "network" => Some(ConnectionType::Network),
            "usb" => Some(ConnectionType::Usb),
            "system" | "manual" => Some(ConnectionType::System),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrinterStatus {
    Online,
    Offline,
}

impl PrinterStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            PrinterStatus::Online => "online",
            PrinterStatus::Offline => "offline",
        }
    }

    pub fn from_db_str(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("online") {
            PrinterStatus::Online
        } else {
            PrinterStatus::Offline
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Printer {
    pub id: i64,
    pub name: String,
    pub connection: ConnectionType,
    pub ip_address: Option<String>,
    pub port: Option<u16>,
    pub vendor_id: Option<String>,
    pub product_id: Option<String>,
    pub device_path: Option<String>,
    /// Category names routed to this printer
    pub categories: Vec<String>,
    pub status: PrinterStatus,
}

/// Values needed to register a printer.
#[derive(Debug, Clone)]
pub struct NewPrinter {
    pub name: String,
    pub connection: ConnectionType,
    pub ip_address: Option<String>,
    pub port: Option<u16>,
    pub vendor_id: Option<String>,
    pub product_id: Option<String>,
    pub device_path: Option<String>,
    pub categories: Vec<String>,
}
