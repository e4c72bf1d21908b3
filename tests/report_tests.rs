use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;

mod common;
use common::{init_with_menu, ok, pos, setup_test_db, temp_out};

/// Two paid orders and one cancelled one.
fn with_sales(db: &str) {
    init_with_menu(db);
    ok(db, &["order", "add", "--table", "1", "--item", "1x2"]);
    ok(db, &["order", "pay", "--table", "1", "--preview"]);
    ok(db, &["order", "add", "--table", "2", "--item", "2x4", "--payment", "card"]);
    ok(db, &["order", "pay", "--table", "2", "--preview"]);
    ok(db, &["order", "add", "--table", "3", "--item", "1x5"]);
    ok(db, &["order", "cancel", "3"]);
}

#[test]
fn summary_ignores_cancelled_orders() {
    let db = setup_test_db("reports_summary");
    with_sales(&db);

    // 2 x 800 + 4 x 150 = 2200; cost 2 x 300 + 4 x 50 = 800
    pos()
        .args(["--db", &db, "report", "summary"])
        .assert()
        .success()
        .stdout(
            contains("2200.00 DZD")
                .and(contains("800.00 DZD"))
                .and(contains("1400.00 DZD"))
                .and(contains("1100.00 DZD")),
        );
}

#[test]
fn category_report_is_sorted_by_total() {
    let db = setup_test_db("reports_categories");
    with_sales(&db);

    let out = pos()
        .args(["--db", &db, "report", "categories"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8_lossy(&out);
    let pizza = text.find("Pizza").expect("pizza row");
    let drinks = text.find("Drinks").expect("drinks row");
    assert!(pizza < drinks);
}

#[test]
fn export_categories_csv() {
    let db = setup_test_db("reports_export_csv");
    with_sales(&db);
    let out = temp_out("reports_export_csv", "csv");

    ok(&db, &["export", "--data", "categories", "--format", "csv", "--file", &out]);

    let content = fs::read_to_string(&out).expect("read exported csv");
    assert!(content.starts_with("Category,Total Sales (DZD)"));
    assert!(content.contains("Pizza,1600.00"));
    assert!(content.contains("Drinks,600.00"));
}

#[test]
fn export_orders_json_by_payment() {
    let db = setup_test_db("reports_export_json");
    with_sales(&db);
    let out = temp_out("reports_export_json", "json");

    ok(
        &db,
        &["export", "--data", "orders", "--format", "json", "--file", &out, "--payment", "card"],
    );

    let rows: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).expect("read json")).expect("valid json");
    let rows = rows.as_array().expect("array");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["payment_type"], "card");
    assert_eq!(rows[0]["total"], 600.0);
}

#[test]
fn export_daily_xlsx_and_pdf() {
    let db = setup_test_db("reports_export_binary");
    with_sales(&db);

    for ext in ["xlsx", "pdf"] {
        let out = temp_out("reports_export_binary", ext);
        ok(&db, &["export", "--data", "daily", "--format", ext, "--file", &out]);
        assert!(fs::metadata(&out).expect("exported file").len() > 0);
    }
}

#[test]
fn export_needs_an_absolute_path() {
    let db = setup_test_db("reports_export_relative");
    with_sales(&db);

    pos()
        .args(["--db", &db, "export", "--format", "csv", "--file", "out.csv"])
        .assert()
        .failure()
        .stderr(contains("must be absolute"));
}

#[test]
fn empty_range_writes_no_file() {
    let db = setup_test_db("reports_export_empty");
    with_sales(&db);
    let out = temp_out("reports_export_empty", "csv");

    pos()
        .args(["--db", &db, "export", "--format", "csv", "--file", &out, "--range", "1999"])
        .assert()
        .success()
        .stdout(contains("No orders found"));
    assert!(!std::path::Path::new(&out).exists());
}
