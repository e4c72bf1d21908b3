use crate::config::Config;
use crate::db::log::audit_quiet;
use crate::errors::{AppError, AppResult};
use crate::export::fs_utils::ensure_writable;
use crate::ui::messages::{info, success, warning};
use rusqlite::{Connection, OpenFlags};
use std::fs;
use std::path::{Path, PathBuf};
use zip::ZipWriter;
use zip::write::FileOptions;

pub struct BackupLogic;

impl BackupLogic {
    /// Copy the database to `dest_file`, optionally zipped.
    /// Returns the final path, or None when the user declined to overwrite.
    pub fn backup(
        cfg: &Config,
        dest_file: &str,
        compress: bool,
        force: bool,
    ) -> AppResult<Option<PathBuf>> {
        let src = Path::new(&cfg.database);
        let dest = Path::new(dest_file);

        if !src.exists() {
            return Err(AppError::NotFound(format!("Database {}", src.display())));
        }
        if !dest.is_absolute() {
            return Err(AppError::Invalid(format!(
                "Backup path must be absolute: {}",
                dest.display()
            )));
        }

        let final_target = if compress {
            dest.with_extension("zip")
        } else {
            dest.to_path_buf()
        };
        if !ensure_writable(&final_target, force)? {
            return Ok(None);
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        // Flush the WAL so the copy is self-contained.
        if let Ok(conn) = Connection::open(src) {
            let _ = conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);");
        }

        let final_path = if compress {
            compress_into(src, &final_target)?
        } else {
            fs::copy(src, dest)?;
            dest.to_path_buf()
        };
        success(format!("Backup created: {}", final_path.display()));

        if let Ok(conn) = Connection::open(src) {
            audit_quiet(
                &conn,
                "backup",
                &final_path.to_string_lossy(),
                if compress {
                    "Backup created and compressed"
                } else {
                    "Backup created"
                },
            );
        }

        Ok(Some(final_path))
    }

    /// Replace the database with `source` after checking it is a fastpos DB.
    pub fn restore(cfg: &Config, source: &str, force: bool) -> AppResult<bool> {
        let src = Path::new(source);
        if !src.exists() {
            return Err(AppError::NotFound(format!("Backup file {}", src.display())));
        }

        verify_database(src)?;

        let dest = Path::new(&cfg.database);
        if dest.exists() && !force {
            warning(format!(
                "This will replace the current database {}",
                dest.display()
            ));
            if !crate::export::fs_utils::confirm("Continue?")? {
                info("Restore cancelled.");
                return Ok(false);
            }
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(src, dest)?;

        // stale WAL/SHM files would be replayed on top of the restored copy
        for suffix in ["-wal", "-shm"] {
            let side = PathBuf::from(format!("{}{suffix}", dest.display()));
            if side.exists() {
                fs::remove_file(side)?;
            }
        }

        if let Ok(conn) = Connection::open(dest) {
            audit_quiet(&conn, "restore", source, "Database restored from backup");
        }
        success(format!("Database restored from {}", src.display()));
        Ok(true)
    }
}

/// The file must open as SQLite and contain an `orders` table.
fn verify_database(path: &Path) -> AppResult<()> {
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|e| AppError::Invalid(format!("{}: not a database ({e})", path.display())))?;

    let has_orders: bool = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'orders'",
            [],
            |r| r.get::<_, i64>(0),
        )
        .map(|n| n > 0)
        .map_err(|e| AppError::Invalid(format!("{}: not a database ({e})", path.display())))?;

    if !has_orders {
        return Err(AppError::Invalid(format!(
            "{}: not a fastpos database (no orders table)",
            path.display()
        )));
    }
    Ok(())
}

fn compress_into(src: &Path, zip_path: &Path) -> AppResult<PathBuf> {
    let file = fs::File::create(zip_path)?;
    let mut zip = ZipWriter::new(file);

    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let entry = src
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "fastpos.sqlite".to_string());

    let mut f = fs::File::open(src)?;
    zip.start_file(entry, options).map_err(std::io::Error::other)?;
    std::io::copy(&mut f, &mut zip)?;
    zip.finish().map_err(std::io::Error::other)?;

    info(format!("Compressed: {}", zip_path.display()));
    Ok(zip_path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::initialize::init_db;
    use crate::db::pool::DbPool;
    use std::env;

    fn db_at(name: &str) -> Config {
        let path = env::temp_dir().join(format!("fastpos_backup_{name}.sqlite"));
        fs::remove_file(&path).ok();
        let pool = DbPool::new(&path.to_string_lossy()).unwrap();
        init_db(&pool.conn).unwrap();
        pool.conn
            .execute_batch("INSERT INTO categories (name) VALUES ('Pizza');")
            .unwrap();

        let mut cfg = Config::default();
        cfg.database = path.to_string_lossy().to_string();
        cfg
    }

    #[test]
    fn backup_then_restore() {
        let cfg = db_at("roundtrip");
        let dest = env::temp_dir().join("fastpos_backup_roundtrip.bak");
        fs::remove_file(&dest).ok();

        let out = BackupLogic::backup(&cfg, &dest.to_string_lossy(), false, true)
            .unwrap()
            .unwrap();
        assert!(out.exists());

        let pool = DbPool::new(&cfg.database).unwrap();
        pool.conn.execute_batch("DELETE FROM categories;").unwrap();
        drop(pool);

        assert!(BackupLogic::restore(&cfg, &dest.to_string_lossy(), true).unwrap());
        let pool = DbPool::new(&cfg.database).unwrap();
        let n: i64 = pool
            .conn
            .query_row("SELECT COUNT(*) FROM categories", [], |r| r.get(0))
            .unwrap();
        assert_eq!(n, 1);
    }

    #[test]
    fn compressed_backup_gets_zip_extension() {
        let cfg = db_at("zip");
        let dest = env::temp_dir().join("fastpos_backup_zip.sqlite");
        fs::remove_file(dest.with_extension("zip")).ok();

        let out = BackupLogic::backup(&cfg, &dest.to_string_lossy(), true, true)
            .unwrap()
            .unwrap();
        assert_eq!(out.extension().and_then(|e| e.to_str()), Some("zip"));
        assert!(out.exists());
    }

    #[test]
    fn restore_rejects_foreign_files() {
        let cfg = db_at("foreign");
        let junk = env::temp_dir().join("fastpos_backup_junk.txt");
        fs::write(&junk, "not sqlite").unwrap();

        assert!(BackupLogic::restore(&cfg, &junk.to_string_lossy(), true).is_err());
    }
}
