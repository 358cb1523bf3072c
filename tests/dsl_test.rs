use pretty_assertions::assert_eq;
use serde_json::json;

use qmap::ast::Value;
use qmap::{compile, Compiler, Dialect, QmapError, Statement};

#[test]
fn test_select_with_everything() {
    let query = Compiler::new(Dialect::MySql)
        .select(
            "orders",
            &json!({"orders": ["id", "amount[sum]{total}"], "customers": ["name{customer}"]}),
            &json!({
                "LIMIT": [10, 20],
                "ORDER": {"orders": ["id[DESC]"]},
                "HAVING": {"orders": ["amount[sum]", "[>]", 100]},
                "GROUP": {"orders": ["id"], "customers": ["name"]},
                "AND": {
                    "orders": {"status[in]": ["paid", "sent"]},
                    "OR #date": {"orders": {"created[<]": "2024-01-01", "created[null]": null}}
                }
            }),
            &json!({"[><]customers": ["customer_id", "id"]}),
        )
        .unwrap();

    assert_eq!(
        query.text(),
        "SELECT orders.id, SUM(orders.amount) AS total, customers.name AS customer \
         FROM orders INNER JOIN customers ON (orders.customer_id = customers.id) \
         WHERE ( orders.status IN (:p1, :p2) ) AND ( orders.created < :p3 OR orders.created IS NULL ) \
         GROUP BY orders.id, customers.name \
         HAVING SUM(orders.amount) > :p4 \
         ORDER BY orders.id DESC \
         LIMIT :limit OFFSET :offset;"
    );

    let names: Vec<&str> = query.params().iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["p1", "p2", "p3", "p4", "limit", "offset"]);
}

#[test]
fn test_limit_with_offset_per_dialect() {
    let filter = json!({"LIMIT": [10, 5]});

    for dialect in [Dialect::MySql, Dialect::MariaDb, Dialect::Postgres] {
        let query = Compiler::new(dialect)
            .select("t", &json!(null), &filter, &json!(null))
            .unwrap();
        assert_eq!(query.params().get("limit"), Some(&Value::Int(10)));
        assert_eq!(query.params().get("offset"), Some(&Value::Int(5)));
    }

    for dialect in [Dialect::SqlServer, Dialect::Dblib] {
        let query = Compiler::new(dialect)
            .select("t", &json!(null), &filter, &json!(null))
            .unwrap();
        assert_eq!(query.text(), "SELECT TOP (:limit) * FROM t;");
        assert_eq!(query.params().get("limit"), Some(&Value::Int(10)));
        assert_eq!(query.params().get("offset"), None);
    }
}

#[test]
fn test_having_arity_is_enforced() {
    let compiler = Compiler::default();
    for having in [json!([]), json!(["a"]), json!(["a", "[>]"]), json!(["a", "[>]", 1, 2])] {
        let err = compiler
            .select("t", &json!(null), &json!({"HAVING": {"t": having}}), &json!(null))
            .unwrap_err();
        assert!(matches!(err, QmapError::MalformedHavingClause(_)));
    }
}

#[test]
fn test_unmapped_tokens() {
    let compiler = Compiler::default();

    let err = compiler
        .select("t", &json!({"t": ["a[median]"]}), &json!(null), &json!(null))
        .unwrap_err();
    assert_eq!(err.to_string(), "Unmapped aggregate token: 'median'");

    let err = compiler
        .select("t", &json!(null), &json!(null), &json!({"[=]u": ["a", "b"]}))
        .unwrap_err();
    assert_eq!(err.to_string(), "Unmapped join token: '='");
}

#[test]
fn test_insert_rows_from_document() {
    let Statement::Batch(batch) = compile(
        Dialect::Postgres,
        r#"{"op": "insert", "table": "t", "rows": [{"a": 1, "b": "x"}, {"a": 2, "b": "y"}]}"#,
    )
    .unwrap() else {
        panic!("expected a batch");
    };

    assert_eq!(batch.text(), "INSERT INTO t(a, b) VALUES(:p_a, :p_b);");
    let rows: Vec<Vec<(String, Value)>> = batch
        .rows()
        .iter()
        .map(|row| row.iter().map(|(n, v)| (n.to_string(), v.clone())).collect())
        .collect();
    assert_eq!(
        rows,
        vec![
            vec![("p_a".to_string(), Value::Int(1)), ("p_b".to_string(), Value::from("x"))],
            vec![("p_a".to_string(), Value::Int(2)), ("p_b".to_string(), Value::from("y"))],
        ]
    );
}

#[test]
fn test_unsupported_dialect() {
    let err = "oracle".parse::<Dialect>().unwrap_err();
    assert!(matches!(err, QmapError::UnsupportedDialect(_)));
}

#[test]
fn test_compiled_query_serializes_params_in_order() {
    let query = Compiler::default()
        .update("t", &json!({"b": 2, "a": 1}), &json!({"AND": {"t": {"id": 9}}}))
        .unwrap();
    assert_eq!(
        serde_json::to_string(&query).unwrap(),
        r#"{"text":"UPDATE t SET b = :p1, a = :p2 WHERE ( t.id = :p3 );","params":{"p1":2,"p2":1,"p3":9}}"#
    );
}
