use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub mod migrate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    /// Characters per line on the receipt printer (32 for 58mm, 48 for 80mm paper)
    #[serde(default = "default_receipt_width")]
    pub receipt_width: usize,
    /// Printer used for customer receipts; the first registered printer when unset
    #[serde(default)]
    pub receipt_printer: Option<String>,
    #[serde(default = "default_printer_timeout_ms")]
    pub printer_timeout_ms: u64,
    #[serde(default = "default_low_stock_warning")]
    pub low_stock_warning: bool,
}

fn default_receipt_width() -> usize {
    48
}
fn default_printer_timeout_ms() -> u64 {
    3000
}
fn default_low_stock_warning() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self::with_database(Self::database_file())
    }
}

impl Config {
    fn with_database(db_path: PathBuf) -> Self {
        Self {
            database: db_path.to_string_lossy().to_string(),
            receipt_width: default_receipt_width(),
            receipt_printer: None,
            printer_timeout_ms: default_printer_timeout_ms(),
            low_stock_warning: default_low_stock_warning(),
        }
    }

    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("fastpos")
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".fastpos")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("fastpos.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("fastpos.sqlite")
    }

    /// Session file kept next to the database it belongs to.
    pub fn session_file(&self) -> PathBuf {
        session_path_for(Path::new(&self.database))
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();

        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let cfg = serde_yaml::from_str(&content)
                .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))?;
            Ok(cfg)
        } else {
            Ok(Self::default())
        }
    }

    /// Initialize configuration and database files.
    /// Returns the configuration that was written (or would have been, in test mode).
    pub fn init_all(custom_name: Option<String>, is_test: bool) -> AppResult<Self> {
        let dir = Self::config_dir();

        // DB name: user provided or default
        let db_path = if let Some(name) = custom_name {
            let p = Path::new(&name);
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                dir.join(p)
            }
        } else {
            dir.join("fastpos.sqlite")
        };

        let config = Self::with_database(db_path.clone());

        // Write config file
        if !is_test {
            fs::create_dir_all(&dir)?;
            let yaml = serde_yaml::to_string(&config)?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
            println!("✅ Config file: {:?}", Self::config_file());
        }

        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Create empty DB file if not exists
        if !db_path.exists() {
            fs::File::create(&db_path)?;
        }

        println!("✅ Database:    {:?}", db_path);

        Ok(config)
    }
}

pub(crate) fn session_path_for(db: &Path) -> PathBuf {
    let mut name = db
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "fastpos.sqlite".into());
    name.push(".session");
    db.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let cfg: Config = serde_yaml::from_str("database: /tmp/pos.sqlite\n").unwrap();
        assert_eq!(cfg.database, "/tmp/pos.sqlite");
        assert_eq!(cfg.receipt_width, 48);
        assert_eq!(cfg.printer_timeout_ms, 3000);
        assert!(cfg.receipt_printer.is_none());
        assert!(cfg.low_stock_warning);
    }

    #[test]
    fn session_file_sits_next_to_database() {
        let p = session_path_for(Path::new("/var/lib/pos/shop.sqlite"));
        assert_eq!(p, PathBuf::from("/var/lib/pos/shop.sqlite.session"));
    }
}
