//! Integration scenarios exercising the composed `Coordinator`, each using a
//! fresh `tempfile::TempDir` so tests never share on-disk state.

use distdb::types::Value;
use distdb::{Config, Coordinator};
use tempfile::TempDir;

fn coordinator() -> (Coordinator, TempDir) {
    let dir = TempDir::new().unwrap();
    let config = Config {
        data_dir: dir.path().join("data"),
        wal_dir: dir.path().join("wal"),
        ..Config::default()
    };
    (Coordinator::new(config).unwrap(), dir)
}

#[test]
fn select_with_equality_where_returns_one_row() {
    let (db, _dir) = coordinator();
    assert_eq!(db.execute("CREATE TABLE users (id INTEGER, name TEXT)").status, "success");
    assert_eq!(
        db.execute("INSERT INTO users (id, name) VALUES (1, 'Alice')").status,
        "success"
    );
    assert_eq!(
        db.execute("INSERT INTO users (id, name) VALUES (2, 'Bob')").status,
        "success"
    );

    let result = db.execute("SELECT * FROM users WHERE id = 1");
    assert_eq!(result.row_count, Some(1));
    let rows = result.rows.unwrap();
    assert_eq!(rows[0].get("name"), Some(&Value::String("Alice".to_string())));
    assert!(rows[0].contains_key("_key"));
}

#[test]
fn hash_index_is_consulted_for_equality_lookup() {
    let (db, _dir) = coordinator();
    db.execute("CREATE TABLE users (id INTEGER, name TEXT)");
    db.execute("INSERT INTO users (id, name) VALUES (1, 'Alice')");
    db.execute("INSERT INTO users (id, name) VALUES (2, 'Bob')");
    assert_eq!(
        db.execute("CREATE INDEX idx_id ON users (id) USING HASH").status,
        "success"
    );

    let result = db.execute("SELECT * FROM users WHERE id = 2");
    assert_eq!(result.row_count, Some(1));
    let rows = result.rows.unwrap();
    assert_eq!(rows[0].get("name"), Some(&Value::String("Bob".to_string())));
}

#[test]
fn ordered_index_finds_exact_value_among_many_rows() {
    let (db, _dir) = coordinator();
    db.execute("CREATE TABLE nums (id INTEGER, v INTEGER)");
    for id in 0..100 {
        let sql = format!("INSERT INTO nums (id, v) VALUES ({}, {})", id, id * 10);
        assert_eq!(db.execute(&sql).status, "success");
    }
    db.execute("CREATE INDEX idx_v ON nums (v)");

    let result = db.execute("SELECT * FROM nums WHERE v = 500");
    assert_eq!(result.row_count, Some(1));
    let rows = result.rows.unwrap();
    assert_eq!(rows[0].get("id"), Some(&Value::Integer(50)));
}

#[test]
fn order_by_desc_with_limit() {
    let (db, _dir) = coordinator();
    db.execute("CREATE TABLE p (id INTEGER, price INTEGER)");
    db.execute("INSERT INTO p (id, price) VALUES (1, 100)");
    db.execute("INSERT INTO p (id, price) VALUES (2, 200)");
    db.execute("INSERT INTO p (id, price) VALUES (3, 150)");

    let result = db.execute("SELECT * FROM p ORDER BY price DESC LIMIT 2");
    let rows = result.rows.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("id"), Some(&Value::Integer(2)));
    assert_eq!(rows[1].get("id"), Some(&Value::Integer(3)));
}

#[test]
fn update_then_delete() {
    let (db, _dir) = coordinator();
    db.execute("CREATE TABLE users (id INTEGER, name TEXT)");
    db.execute("INSERT INTO users (id, name) VALUES (1, 'Alice')");

    let result = db.execute("UPDATE users SET name = 'Alicia' WHERE id = 1");
    assert_eq!(result.rows_affected, Some(1));

    let result = db.execute("SELECT * FROM users WHERE id = 1");
    assert_eq!(
        result.rows.unwrap()[0].get("name"),
        Some(&Value::String("Alicia".to_string()))
    );

    let result = db.execute("DELETE FROM users WHERE id = 1");
    assert_eq!(result.rows_affected, Some(1));

    let result = db.execute("SELECT * FROM users WHERE id = 1");
    assert!(result.rows.unwrap().is_empty());
}

#[test]
fn crash_recovery_via_wal_then_via_snapshot() {
    let dir = TempDir::new().unwrap();
    let data_dir = dir.path().join("data");
    let wal_dir = dir.path().join("wal");

    {
        let config = Config {
            data_dir: data_dir.clone(),
            wal_dir: wal_dir.clone(),
            ..Config::default()
        };
        let db = Coordinator::new(config).unwrap();
        db.execute("CREATE TABLE users (id INTEGER, name TEXT)");
        db.execute("INSERT INTO users (id, name) VALUES (1, 'Alice')");
        db.execute("INSERT INTO users (id, name) VALUES (2, 'Bob')");
        // Discard without a graceful close: WAL replay must still recover both rows.
    }

    let config = Config {
        data_dir: data_dir.clone(),
        wal_dir: wal_dir.clone(),
        ..Config::default()
    };
    let db = Coordinator::new(config).unwrap();
    let result = db.execute("SELECT * FROM users");
    assert_eq!(result.row_count, Some(2));
    db.shutdown().unwrap(); // forces a snapshot + WAL truncation

    let config = Config {
        data_dir,
        wal_dir,
        ..Config::default()
    };
    let db = Coordinator::new(config).unwrap();
    let result = db.execute("SELECT * FROM users");
    assert_eq!(result.row_count, Some(2));
}
