//! Core statement assembly tests.

use serde_json::json;

use crate::ast::Value;
use crate::error::QmapError;
use crate::request::Request;
use crate::transpiler::{Compiler, Statement};

fn mysql() -> Compiler {
    Compiler::default()
}

#[test]
fn test_select_basic() {
    let query = mysql()
        .select(
            "t",
            &json!({"t": ["name"]}),
            &json!({"AND": {"t": {"age[>]": 18}}}),
            &json!(null),
        )
        .unwrap();
    assert_eq!(query.text(), "SELECT t.name FROM t WHERE ( t.age > :p1 );");
    assert_eq!(query.params().len(), 1);
    assert_eq!(query.params().get("p1"), Some(&Value::Int(18)));
}

#[test]
fn test_select_star_without_conditions() {
    let query = mysql().select("t", &json!({}), &json!({}), &json!({})).unwrap();
    assert_eq!(query.text(), "SELECT * FROM t;");
    assert!(query.params().is_empty());
}

#[test]
fn test_select_with_join_and_aggregate() {
    let query = mysql()
        .select(
            "t",
            &json!({"t": ["id", "amount[sum]{total}"]}),
            &json!({"GROUP": {"t": ["id"]}}),
            &json!({"[>]other": ["id", "t_id"]}),
        )
        .unwrap();
    assert_eq!(
        query.text(),
        "SELECT t.id, SUM(t.amount) AS total FROM t LEFT JOIN other ON (t.id = other.t_id) GROUP BY t.id;"
    );
}

#[test]
fn test_trailing_clauses_never_get_where() {
    let query = mysql()
        .select("t", &json!(null), &json!({"ORDER": {"t": ["id[DESC]"]}, "LIMIT": 5}), &json!(null))
        .unwrap();
    assert_eq!(query.text(), "SELECT * FROM t ORDER BY t.id DESC LIMIT :limit;");
    assert_eq!(query.params().get("limit"), Some(&Value::Int(5)));
}

#[test]
fn test_match_alone_is_the_where_condition() {
    let query = mysql()
        .select(
            "t",
            &json!({"t": ["id"]}),
            &json!({"MATCH": {"columns": {"t": ["title"]}, "search": "rust"}, "LIMIT": 3}),
            &json!(null),
        )
        .unwrap();
    assert_eq!(
        query.text(),
        "SELECT t.id FROM t WHERE MATCH(t.title) AGAINST(:p1) LIMIT :limit;"
    );
    assert_eq!(query.params().get("p1"), Some(&Value::from("rust")));
}

#[test]
fn test_prefix_applies_to_every_table() {
    let query = mysql()
        .with_prefix("app_")
        .select(
            "users",
            &json!({"users": ["name"]}),
            &json!({"AND": {"users": {"id": 1}}}),
            &json!({"[><]roles": ["role_id", "id"]}),
        )
        .unwrap();
    assert_eq!(
        query.text(),
        "SELECT app_users.name FROM app_users INNER JOIN app_roles ON (app_users.role_id = app_roles.id) WHERE ( app_users.id = :p1 );"
    );
}

#[test]
fn test_select_rejects_wrong_shapes() {
    let compiler = mysql();
    assert!(matches!(
        compiler.select("t", &json!(["a"]), &json!(null), &json!(null)),
        Err(QmapError::InvalidArgumentShape(_))
    ));
    assert!(matches!(
        compiler.select("t", &json!(null), &json!("id = 1"), &json!(null)),
        Err(QmapError::InvalidArgumentShape(_))
    ));
    assert!(matches!(
        compiler.select("t", &json!(null), &json!(null), &json!(["other"])),
        Err(QmapError::InvalidArgumentShape(_))
    ));
}

#[test]
fn test_insert_batch() {
    let batch = mysql()
        .insert("t", &json!([{"a": 1, "b": "x"}, {"a": 2, "b": "y"}]))
        .unwrap();
    assert_eq!(batch.text(), "INSERT INTO t(a, b) VALUES(:p_a, :p_b);");
    assert_eq!(batch.rows().len(), 2);

    let first: Vec<_> = batch.rows()[0].iter().collect();
    assert_eq!(first, vec![("p_a", &Value::Int(1)), ("p_b", &Value::from("x"))]);
    let second: Vec<_> = batch.rows()[1].iter().collect();
    assert_eq!(second, vec![("p_a", &Value::Int(2)), ("p_b", &Value::from("y"))]);
}

#[test]
fn test_insert_single_object_is_one_row() {
    let batch = mysql().insert("t", &json!({"a": null})).unwrap();
    assert_eq!(batch.text(), "INSERT INTO t(a) VALUES(:p_a);");
    assert_eq!(batch.rows().len(), 1);
    assert_eq!(batch.rows()[0].get("p_a"), Some(&Value::Null));
}

#[test]
fn test_insert_heterogeneous_rows() {
    let err = mysql()
        .insert("t", &json!([{"a": 1}, {"a": 2}, {"b": 3}]))
        .unwrap_err();
    assert!(matches!(err, QmapError::HeterogeneousRows { row: 2 }));
}

#[test]
fn test_update_shares_counter_with_where() {
    let query = mysql()
        .update(
            "t",
            &json!({"name": "bob", "age": 40}),
            &json!({"AND": {"t": {"id": 7}}}),
        )
        .unwrap();
    assert_eq!(
        query.text(),
        "UPDATE t SET name = :p1, age = :p2 WHERE ( t.id = :p3 );"
    );
    let names: Vec<_> = query.params().iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["p1", "p2", "p3"]);
}

#[test]
fn test_update_without_where() {
    let query = mysql().update("t", &json!({"active": false}), &json!(null)).unwrap();
    assert_eq!(query.text(), "UPDATE t SET active = :p1;");
    assert!(mysql().update("t", &json!({}), &json!(null)).is_err());
}

#[test]
fn test_delete() {
    let query = mysql()
        .delete("t", &json!({"OR": {"t": {"id[in]": [1, 2], "expired[null]": null}}}))
        .unwrap();
    assert_eq!(
        query.text(),
        "DELETE FROM t WHERE ( t.id IN (:p1, :p2) OR t.expired IS NULL );"
    );
    assert_eq!(mysql().delete("t", &json!({})).unwrap().text(), "DELETE FROM t;");
}

#[test]
fn test_compile_is_deterministic() {
    let columns = json!({"t": ["a", "b[max]"]});
    let filter = json!({
        "AND": {"t": {"a[~]": "x%"}, "OR #n": {"t": {"b[<]": 1, "b[>]": 9}}},
        "LIMIT": [1, 2]
    });
    let first = mysql().select("t", &columns, &filter, &json!(null)).unwrap();
    let second = mysql().select("t", &columns, &filter, &json!(null)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_compile_request() {
    let request: Request = serde_json::from_value(json!({
        "op": "select",
        "table": "t",
        "columns": {"t": ["name"]},
        "where": {"AND": {"t": {"age[>]": 18}}}
    }))
    .unwrap();
    let Statement::Query(query) = mysql().compile(&request).unwrap() else {
        panic!("expected a single statement");
    };
    assert_eq!(query.text(), "SELECT t.name FROM t WHERE ( t.age > :p1 );");

    let request: Request = serde_json::from_value(json!({
        "op": "insert",
        "table": "t",
        "rows": [{"a": 1}]
    }))
    .unwrap();
    assert!(matches!(mysql().compile(&request).unwrap(), Statement::Batch(_)));

    let request: Request = serde_json::from_value(json!({
        "op": "raw",
        "sql": "SELECT :x",
        "params": {":x": 1}
    }))
    .unwrap();
    let Statement::Query(query) = mysql().compile(&request).unwrap() else {
        panic!("expected a single statement");
    };
    assert_eq!(query.text(), "SELECT :x");
    assert_eq!(query.params().get("x"), Some(&Value::Int(1)));
}
