use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;

mod common;
use common::{init_with_menu, ok, pos, setup_test_db, temp_out};

/// A regular file stands in for the `/dev/usb/lp*` node.
fn fake_device(name: &str) -> String {
    let path = temp_out(name, "prn");
    fs::write(&path, b"").expect("create fake device");
    path
}

fn printed(path: &str) -> String {
    String::from_utf8_lossy(&fs::read(path).expect("read fake device")).to_string()
}

#[test]
fn kitchen_tickets_follow_category_routing() {
    let db = setup_test_db("printers_routing");
    init_with_menu(&db);
    let kitchen = fake_device("printers_routing_kitchen");
    let bar = fake_device("printers_routing_bar");

    ok(&db, &["printer", "add", "--name", "Kitchen", "--connection", "usb", "--device", &kitchen]);
    ok(&db, &["printer", "add", "--name", "Bar", "--connection", "usb", "--device", &bar]);
    ok(&db, &["printer", "assign", "1", "Pizza"]);
    ok(&db, &["printer", "assign", "2", "Drinks"]);

    pos()
        .args(["--db", &db, "order", "add", "--table", "3", "--item", "1x2", "--item", "2"])
        .assert()
        .success()
        .stdout(contains("2 kitchen ticket(s) printed"));

    let k = printed(&kitchen);
    assert!(k.contains("PIZZA"));
    assert!(k.contains("Margherita x2"));
    assert!(!k.contains("Cola"));

    let b = printed(&bar);
    assert!(b.contains("Cola x1"));
    assert!(b.contains("Table 3"));
}

#[test]
fn assigning_unknown_category_fails() {
    let db = setup_test_db("printers_unknown_category");
    init_with_menu(&db);
    let dev = fake_device("printers_unknown_category");
    ok(&db, &["printer", "add", "--name", "Kitchen", "--connection", "usb", "--device", &dev]);

    pos()
        .args(["--db", &db, "printer", "assign", "1", "Sushi"])
        .assert()
        .failure()
        .stderr(contains("Category 'Sushi' not found"));

    pos()
        .args(["--db", &db, "printer", "add", "--name", "Bar", "--connection", "network"])
        .assert()
        .failure()
        .stderr(contains("IP address"));
}

#[test]
fn receipt_goes_to_the_first_printer() {
    let db = setup_test_db("printers_receipt");
    init_with_menu(&db);
    let dev = fake_device("printers_receipt");
    ok(&db, &["printer", "add", "--name", "Front", "--connection", "usb", "--device", &dev]);
    ok(&db, &["order", "add", "--table", "1", "--item", "2x2"]);

    ok(&db, &["order", "pay", "--table", "1"]);

    let receipt = printed(&dev);
    assert!(receipt.contains("*** Table 1 ***"));
    assert!(receipt.contains("Cola x2"));
    assert!(receipt.contains("300.00 DZD"));
    assert!(receipt.contains("THANK YOU"));
}

#[test]
fn check_and_test_page() {
    let db = setup_test_db("printers_check");
    init_with_menu(&db);
    let dev = fake_device("printers_check");
    ok(&db, &["printer", "add", "--name", "Front", "--connection", "usb", "--device", &dev]);
    ok(&db, &["printer", "add", "--name", "Gone", "--connection", "usb", "--device", "/nonexistent/lp9"]);

    pos()
        .args(["--db", &db, "printer", "check"])
        .assert()
        .success()
        .stdout(contains("online").and(contains("offline")));

    ok(&db, &["printer", "test", "1"]);
    assert!(printed(&dev).contains("TEST PRINT"));

    pos()
        .args(["--db", &db, "printer", "test", "2"])
        .assert()
        .failure()
        .stderr(contains("Printer error"));
}
