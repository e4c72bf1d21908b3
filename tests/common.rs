#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn pos() -> Command {
    let mut cmd = cargo_bin_cmd!("fastpos");
    cmd.env("FASTPOS_LOG", "off");
    cmd
}

/// Create a unique test DB path inside the system temp dir and remove any
/// leftovers (database, WAL files and session) from an earlier run.
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{name}_fastpos.sqlite"));
    let db_path = path.to_string_lossy().to_string();
    for suffix in ["", "-wal", "-shm", ".session"] {
        fs::remove_file(format!("{db_path}{suffix}")).ok();
    }
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{name}_out.{ext}"));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Run a command against `db_path` and require success.
pub fn ok(db_path: &str, args: &[&str]) {
    pos().arg("--db").arg(db_path).args(args).assert().success();
}

/// `init` in test mode, then log in as the default admin.
pub fn init_as_admin(db_path: &str) {
    pos()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();
    ok(db_path, &["login", "admin", "--password", "admin"]);
}

/// Admin session plus a small menu and a floor of four tables:
///
/// - category 1 Pizza: product 1 Margherita (800, cost 300)
/// - category 2 Drinks: product 2 Cola (150, cost 50)
pub fn init_with_menu(db_path: &str) {
    init_as_admin(db_path);
    ok(db_path, &["category", "add", "Pizza"]);
    ok(db_path, &["category", "add", "Drinks"]);
    ok(
        db_path,
        &["product", "add", "--name", "Margherita", "--price", "800", "--cost", "300", "--category", "1"],
    );
    ok(
        db_path,
        &["product", "add", "--name", "Cola", "--price", "150", "--cost", "50", "--category", "2"],
    );
    ok(db_path, &["table", "generate", "4"]);
}
