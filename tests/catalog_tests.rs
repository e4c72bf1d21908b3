use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

mod common;
use common::{init_with_menu, ok, pos, setup_test_db};

#[test]
fn products_are_listed_with_their_category() {
    let db = setup_test_db("catalog_list");
    init_with_menu(&db);

    pos()
        .args(["--db", &db, "product", "list"])
        .assert()
        .success()
        .stdout(contains("Margherita").and(contains("Pizza")).and(contains("800.00 DZD")));

    pos()
        .args(["--db", &db, "product", "list", "--search", "COL"])
        .assert()
        .success()
        .stdout(contains("Cola").and(contains("Margherita").not()));
}

#[test]
fn duplicate_category_is_refused() {
    let db = setup_test_db("catalog_duplicate");
    init_with_menu(&db);

    pos()
        .args(["--db", &db, "category", "add", "Pizza"])
        .assert()
        .failure()
        .stderr(contains("already exists"));
}

#[test]
fn negative_price_is_refused() {
    let db = setup_test_db("catalog_negative_price");
    init_with_menu(&db);

    pos()
        .args(["--db", &db, "product", "add", "--name", "Bad", "--price=-1"])
        .assert()
        .failure();
}

#[test]
fn deleting_a_category_uncategorizes_products() {
    let db = setup_test_db("catalog_delete_category");
    init_with_menu(&db);
    ok(&db, &["category", "delete", "2"]);

    pos()
        .args(["--db", &db, "product", "list", "--category", "2"])
        .assert()
        .success()
        .stdout(contains("No products found"));
}

#[test]
fn tables_are_generated_and_toggled() {
    let db = setup_test_db("catalog_tables");
    init_with_menu(&db);
    ok(&db, &["table", "status", "3", "occupied"]);

    pos()
        .args(["--db", &db, "table", "list"])
        .assert()
        .success()
        .stdout(contains("Occupied").and(contains("Free")));

    ok(&db, &["table", "generate", "2"]);
    pos()
        .args(["--db", &db, "table", "status", "3", "free"])
        .assert()
        .failure()
        .stderr(contains("Table 3 not found"));
}

#[test]
fn settings_validate_vat() {
    let db = setup_test_db("catalog_settings");
    init_with_menu(&db);

    ok(&db, &["settings", "set", "--name", "Chez Test", "--vat", "9"]);
    pos()
        .args(["--db", &db, "settings", "show"])
        .assert()
        .success()
        .stdout(contains("Chez Test").and(contains("9%")));

    pos()
        .args(["--db", &db, "settings", "set", "--vat", "150"])
        .assert()
        .failure();
}

#[test]
fn inventory_requires_the_setting() {
    let db = setup_test_db("catalog_inventory");
    init_with_menu(&db);

    pos()
        .args(["--db", &db, "inventory", "list"])
        .assert()
        .failure()
        .stderr(contains("Inventory management is disabled"));

    ok(&db, &["settings", "set", "--inventory", "on"]);
    ok(
        &db,
        &["inventory", "add", "--name", "Mozzarella", "--quantity", "5", "--unit", "kg", "--min", "2"],
    );
    ok(&db, &["inventory", "adjust", "1", "-10"]);

    pos()
        .args(["--db", &db, "inventory", "list", "--low"])
        .assert()
        .success()
        .stdout(contains("Mozzarella").and(contains("0.00")));
}
