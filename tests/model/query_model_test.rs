#[path = "../common/mod.rs"]
mod common;

use common::assert_valid_sql;
use quarry::adapter::{presets, AdapterError, ExecutionAdapter, SqlAdapter};
use quarry::catalog::{Catalog, ColumnRole, Operation};
use quarry::model::{ModelError, WireQueryModel};
use quarry::sql::Dialect;

fn wire(json: serde_json::Value) -> WireQueryModel {
    serde_json::from_value(json).unwrap()
}

#[test]
fn test_chart_model_renders_grouped_query() {
    let model = wire(serde_json::json!({
        "projections": [
            { "label": "TEST_CASE_CREATED_ON", "operation": "BY_MONTH" },
            { "label": "TEST_CASE_ID", "operation": "COUNT" }
        ],
        "aggregations": [
            { "label": "TEST_CASE_CREATED_ON", "operation": "BY_MONTH" }
        ],
        "filters": [
            { "label": "TEST_CASE_IMPORTANCE", "operation": "IN", "values": ["HIGH", "VERY_HIGH"] }
        ]
    }))
    .bind(Catalog::builtin())
    .unwrap();
    model.validate().unwrap();
    assert!(model.is_aggregated());

    let bindings = presets::test_case_bindings().unwrap();
    for dialect in [Dialect::Postgres, Dialect::MySql, Dialect::DuckDb] {
        let statement = SqlAdapter::new(&bindings, dialect)
            .compile_fetch(&model, &[], &[])
            .unwrap()
            .to_statement();
        assert!(statement.sql.contains("COUNT("));
        assert!(statement.sql.contains("GROUP BY"));
        assert_eq!(statement.params.len(), 2);
        assert_valid_sql(&statement.sql, dialect);
    }
}

#[test]
fn test_wire_form_survives_json() {
    let json = serde_json::json!({
        "strategy": "MAIN",
        "join_style": "LEFT",
        "projections": [
            { "label": "TEST_CASE_ENTITY" },
            { "label": "TEST_CASE_CUF_LIST", "cuf_id": 9 }
        ],
        "orderings": [{ "label": "TEST_CASE_CUF_LIST", "cuf_id": 9, "direction": "DESC" }]
    });
    let model = wire(json).bind(Catalog::builtin()).unwrap();
    model.validate().unwrap();

    let back = WireQueryModel::from(&model);
    assert_eq!(back.projections[0].operation, Operation::None);
    assert_eq!(back.orderings[0].cuf_id, Some(9));
    assert_eq!(back.bind(Catalog::builtin()).unwrap(), model);
}

#[test]
fn test_illegal_models_rejected_before_rendering() {
    let bindings = presets::test_case_bindings().unwrap();
    let adapter = SqlAdapter::new(&bindings, Dialect::Postgres);

    // importance is an enum: no LIKE
    let like_on_enum = wire(serde_json::json!({
        "projections": [{ "label": "TEST_CASE_ENTITY" }, { "label": "TEST_CASE_ID" }],
        "filters": [{ "label": "TEST_CASE_IMPORTANCE", "operation": "LIKE", "values": ["HI"] }]
    }))
    .bind(Catalog::builtin())
    .unwrap();
    assert_eq!(
        like_on_enum.validate(),
        Err(ModelError::IllegalOperation {
            column: "TEST_CASE_IMPORTANCE".into(),
            role: ColumnRole::Filter,
            operation: Operation::Like,
        })
    );
    assert!(matches!(
        adapter.compile_count(&like_on_enum, &[]),
        Err(AdapterError::InvalidModel(ModelError::IllegalOperation { .. }))
    ));

    let not_covered = wire(serde_json::json!({
        "projections": [
            { "label": "TEST_CASE_NAME" },
            { "label": "TEST_CASE_ID", "operation": "COUNT" }
        ],
        "aggregations": [{ "label": "TEST_CASE_STATUS" }]
    }))
    .bind(Catalog::builtin())
    .unwrap();
    assert!(matches!(
        not_covered.validate(),
        Err(ModelError::AggregationWithoutProjection { .. })
    ));

    let between_one_value = wire(serde_json::json!({
        "projections": [{ "label": "TEST_CASE_ENTITY" }, { "label": "TEST_CASE_ID" }],
        "filters": [{ "label": "TEST_CASE_STEPCOUNT", "operation": "BETWEEN", "values": ["1"] }]
    }))
    .bind(Catalog::builtin())
    .unwrap();
    assert!(matches!(
        between_one_value.validate(),
        Err(ModelError::ValueCount { expected: 2, got: 1, .. })
    ));
}
