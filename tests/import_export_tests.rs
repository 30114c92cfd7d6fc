//! Integration tests for the CSV import/export paths and their interaction
//! with the product registry and the stock audit trail.

use rusqlite::Connection;
use stock_tracker::{
    create_product, delete_product, export_products, import_products, init_schema, list_products,
    stock_history, update_product, InventoryError, ProductInput,
};
use tempfile::TempDir;

fn test_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    init_schema(&conn).unwrap();
    conn
}

fn input(name: &str, stock: Option<&str>) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        stock: stock.map(|s| s.to_string()),
        ..ProductInput::default()
    }
}

#[test]
fn export_reimport_is_recognized_as_all_duplicates() {
    let mut conn = test_db();
    import_products(
        &mut conn,
        "name,unit,category,brand,stock,status,image\n\
         Flour,kg,Baking,Acme,5,,\n\
         Sugar,kg,Baking,Acme,0,,\n\
         Coffee,pack,Drinks,Brew Co,12,,beans.png\n"
            .as_bytes(),
    )
    .unwrap();

    let mut exported = Vec::new();
    export_products(&conn, &mut exported).unwrap();

    // Re-importing the export must change nothing: every row reconciles
    // against itself.
    let report = import_products(&mut conn, exported.as_slice()).unwrap();
    assert_eq!(report.added, 0);
    assert_eq!(report.skipped, 3);
    assert_eq!(report.duplicates.len(), 3);
    assert_eq!(list_products(&conn).unwrap().len(), 3);
}

#[test]
fn export_round_trips_field_values() {
    let mut conn = test_db();
    import_products(
        &mut conn,
        "name,unit,category,brand,stock,status,image\n\
         \"Beans, dried\",kg,Pantry,\"Farm \"\"Fresh\"\"\",7,,\n"
            .as_bytes(),
    )
    .unwrap();

    let products = list_products(&conn).unwrap();
    assert_eq!(products[0].name, "Beans, dried");
    assert_eq!(products[0].brand, "Farm \"Fresh\"");

    let mut exported = Vec::new();
    export_products(&conn, &mut exported).unwrap();
    let text = String::from_utf8(exported).unwrap();
    // Quoting survives the round trip
    assert!(text.contains("\"Beans, dried\""));
}

#[test]
fn created_products_are_importable_duplicates() {
    let mut conn = test_db();
    let product = create_product(&mut conn, &input("Apple", Some("3"))).unwrap();

    let report = import_products(&mut conn, "name,stock\nAPPLE,99\n".as_bytes()).unwrap();
    assert_eq!(report.added, 0);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.duplicates[0].existing_id, product.id);

    // The existing product is untouched
    let products = list_products(&conn).unwrap();
    assert_eq!(products[0].stock, 3);
}

#[test]
fn imported_products_accept_registry_mutations() {
    let mut conn = test_db();
    import_products(&mut conn, "name,stock\nWidget,5\n".as_bytes()).unwrap();

    let id = list_products(&conn).unwrap()[0].id;
    // Import wrote no audit entries
    assert!(stock_history(&conn, id).unwrap().is_empty());

    let updated = update_product(&mut conn, id, &input("Widget", Some("2"))).unwrap();
    assert_eq!(updated.stock, 2);

    let history = stock_history(&conn, id).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].old_stock, 5);
    assert_eq!(history[0].new_stock, 2);

    delete_product(&mut conn, id).unwrap();
    assert!(stock_history(&conn, id).unwrap().is_empty());
}

#[test]
fn import_mixes_good_and_bad_rows() {
    let mut conn = test_db();
    let report = import_products(
        &mut conn,
        "name,unit,category,brand,stock,status,image\n\
         Good,kg,,,4,,\n\
         ,kg,,,9,,\n\
         Good,kg,,,1,,\n\
         Other,,,,not-a-number,,\n"
            .as_bytes(),
    )
    .unwrap();

    assert_eq!(report.added, 2);
    assert_eq!(report.skipped, 2);
    assert_eq!(report.duplicates.len(), 1);
    assert_eq!(report.duplicates[0].name, "Good");

    let products = list_products(&conn).unwrap();
    assert_eq!(products.len(), 2);
    // Bad stock defaulted to zero rather than rejecting the row
    let other = products.iter().find(|p| p.name == "Other").unwrap();
    assert_eq!(other.stock, 0);
    assert_eq!(other.status, "Out of Stock");
}

#[test]
fn validation_errors_leave_catalog_unchanged() {
    let mut conn = test_db();
    let err = create_product(&mut conn, &input("Negative", Some("-1"))).unwrap_err();
    assert!(matches!(err, InventoryError::Validation(_)));
    assert!(list_products(&conn).unwrap().is_empty());
}

#[test]
fn catalog_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("products.db");

    {
        let mut conn = Connection::open(&path).unwrap();
        init_schema(&conn).unwrap();
        create_product(&mut conn, &input("Durable", Some("2"))).unwrap();
    }

    let conn = Connection::open(&path).unwrap();
    init_schema(&conn).unwrap();
    let products = list_products(&conn).unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Durable");
    assert_eq!(stock_history(&conn, products[0].id).unwrap().len(), 1);
}
