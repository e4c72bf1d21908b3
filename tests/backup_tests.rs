use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;

mod common;
use common::{init_with_menu, ok, pos, setup_test_db, temp_out};

#[test]
fn backup_and_restore_roundtrip() {
    let db = setup_test_db("backup_roundtrip");
    init_with_menu(&db);
    let copy = temp_out("backup_roundtrip", "sqlite");

    ok(&db, &["backup", "--file", &copy]);
    assert!(fs::metadata(&copy).expect("backup file").len() > 0);

    ok(&db, &["category", "add", "Desserts"]);
    ok(&db, &["restore", "--file", &copy, "--force"]);

    pos()
        .args(["--db", &db, "category", "list"])
        .assert()
        .success()
        .stdout(contains("Pizza"))
        .stdout(contains("Desserts").not());
}

#[test]
fn compressed_backup_gets_zip_extension() {
    let db = setup_test_db("backup_zip");
    init_with_menu(&db);
    let copy = temp_out("backup_zip", "sqlite");
    let zipped = temp_out("backup_zip", "zip");

    ok(&db, &["backup", "--file", &copy, "--compress"]);
    assert!(fs::metadata(&zipped).expect("zip file").len() > 0);
}

#[test]
fn restore_refuses_foreign_files() {
    let db = setup_test_db("backup_foreign");
    init_with_menu(&db);
    let junk = temp_out("backup_foreign", "txt");
    fs::write(&junk, "not a database").expect("write junk");

    pos()
        .args(["--db", &db, "restore", "--file", &junk, "--force"])
        .assert()
        .failure();
}

#[test]
fn db_info_counts_rows() {
    let db = setup_test_db("backup_db_info");
    init_with_menu(&db);

    pos()
        .args(["--db", &db, "db", "--info", "--check"])
        .assert()
        .success()
        .stdout(contains("products"))
        .stdout(contains("Integrity check passed"));
}
