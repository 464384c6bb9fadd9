use super::*;
use crate::index::IndexKind;
use crate::types::Value;

#[test]
fn parses_create_table() {
    let plan = Parser::parse("CREATE TABLE users (id INTEGER, name TEXT)").unwrap();
    assert_eq!(plan.query_type, QueryType::CreateTable);
    assert_eq!(plan.table, "users");
    assert_eq!(plan.schema.get("id").unwrap(), "INTEGER");
    assert_eq!(plan.schema.get("name").unwrap(), "TEXT");
}

#[test]
fn parses_insert_with_typed_values() {
    let plan = Parser::parse("INSERT INTO users (id, name, score) VALUES (1, 'Alice', 3.5)").unwrap();
    assert_eq!(plan.query_type, QueryType::Insert);
    assert_eq!(plan.values.get("id"), Some(&Value::Integer(1)));
    assert_eq!(plan.values.get("name"), Some(&Value::String("Alice".into())));
    assert_eq!(plan.values.get("score"), Some(&Value::Float(3.5)));
}

#[test]
fn parses_select_with_where_order_limit() {
    let plan = Parser::parse(
        "SELECT id, name FROM users WHERE active = 1 AND role = 'admin' ORDER BY name DESC LIMIT 10",
    )
    .unwrap();
    assert_eq!(plan.query_type, QueryType::Select);
    assert_eq!(plan.columns, vec!["id", "name"]);
    assert_eq!(plan.conditions.get("active"), Some(&Value::Integer(1)));
    assert_eq!(plan.conditions.get("role"), Some(&Value::String("admin".into())));
    assert_eq!(plan.order_by.len(), 1);
    assert_eq!(plan.order_by[0].column, "name");
    assert!(plan.order_by[0].descending);
    assert_eq!(plan.limit, Some(10));
}

#[test]
fn select_star_yields_empty_column_list() {
    let plan = Parser::parse("SELECT * FROM users").unwrap();
    assert!(plan.columns.is_empty());
}

#[test]
fn repeated_where_column_keeps_last_binding() {
    let plan = Parser::parse("SELECT * FROM t WHERE id = 1 AND id = 2").unwrap();
    assert_eq!(plan.conditions.get("id"), Some(&Value::Integer(2)));
}

#[test]
fn parses_update_with_where() {
    let plan = Parser::parse("UPDATE users SET name = 'Bob', active = 0 WHERE id = 1").unwrap();
    assert_eq!(plan.query_type, QueryType::Update);
    assert_eq!(plan.assignments.len(), 2);
    assert_eq!(plan.conditions.get("id"), Some(&Value::Integer(1)));
}

#[test]
fn parses_delete_without_where() {
    let plan = Parser::parse("DELETE FROM users").unwrap();
    assert_eq!(plan.query_type, QueryType::Delete);
    assert!(plan.conditions.is_empty());
}

#[test]
fn parses_create_index_defaults_to_btree() {
    let plan = Parser::parse("CREATE INDEX idx_id ON users (id)").unwrap();
    assert_eq!(plan.query_type, QueryType::CreateIndex);
    assert_eq!(plan.index_name, "idx_id");
    assert_eq!(plan.index_columns, vec!["id"]);
    assert_eq!(plan.index_kind, IndexKind::Btree);
}

#[test]
fn parses_create_index_using_hash() {
    let plan = Parser::parse("CREATE INDEX idx_id ON users (id) USING HASH").unwrap();
    assert_eq!(plan.index_kind, IndexKind::Hash);
}

#[test]
fn parses_drop_index_with_optional_table() {
    let plan = Parser::parse("DROP INDEX idx_id ON users").unwrap();
    assert_eq!(plan.query_type, QueryType::DropIndex);
    assert_eq!(plan.table, "users");
    assert_eq!(plan.index_name, "idx_id");
}

#[test]
fn rejects_unsupported_statement() {
    let err = Parser::parse("BEGIN").unwrap_err();
    assert!(matches!(err, crate::error::DbError::UnsupportedStatement(_)));
}

#[test]
fn parses_negative_numeric_values() {
    let plan = Parser::parse("INSERT INTO t (x, y) VALUES (-5, -1.5)").unwrap();
    assert_eq!(plan.values.get("x"), Some(&Value::Integer(-5)));
    assert_eq!(plan.values.get("y"), Some(&Value::Float(-1.5)));

    let plan = Parser::parse("SELECT * FROM t WHERE x = -5").unwrap();
    assert_eq!(plan.conditions.get("x"), Some(&Value::Integer(-5)));
}

#[test]
fn rejects_trailing_garbage() {
    let err = Parser::parse("SELECT * FROM t EXTRA").unwrap_err();
    assert!(matches!(err, crate::error::DbError::Parse(_)));
}
