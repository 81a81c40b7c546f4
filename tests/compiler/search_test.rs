#[path = "../common/mod.rs"]
mod common;

use common::assert_valid_sql;
use quarry::adapter::{presets, ExecutionAdapter, Page, SqlAdapter};
use quarry::catalog::{Catalog, Operation, SortDirection};
use quarry::compiler::{CompileError, SearchCompiler, StaticScopeSecurity};
use quarry::config::{CompilerSettings, ScopeKey, ScopeSettings};
use quarry::mapping::MappingError;
use quarry::model::JoinStyle;
use quarry::search::{FieldValue, SearchRequest, SortEntry};
use quarry::sql::{Dialect, SqlValue};

fn request(json: serde_json::Value) -> SearchRequest {
    serde_json::from_value(json).unwrap()
}

#[test]
fn test_test_case_search_end_to_end() {
    let domain = presets::test_case_domain().unwrap();
    let bindings = presets::test_case_bindings().unwrap();
    let security = StaticScopeSecurity::new([1, 2]);

    let request = request(serde_json::json!({
        "criteria": {
            "name": { "type": "SINGLE", "value": " Login " },
            "project.id": { "type": "LIST", "values": [] }
        },
        "sort": [{ "key": "name", "direction": "DESC" }]
    }));

    let compiled = SearchCompiler::new(Catalog::builtin(), &domain, &security)
        .compile(&request)
        .unwrap();
    assert!(compiled.special_filters.is_empty());

    let statement = SqlAdapter::new(&bindings, Dialect::Postgres)
        .fetch(&compiled)
        .unwrap()
        .paged(Page::new(1, 10))
        .to_statement();

    insta::assert_snapshot!(statement.sql, @r#"
    SELECT DISTINCT
      "test_case"."tcln_id" AS "TEST_CASE_ENTITY",
      "test_case"."name" AS "TEST_CASE_NAME"
    FROM "test_case" AS "test_case"
    INNER JOIN "project" AS "project@test_case_project" ON "project@test_case_project"."project_id" = "test_case"."project_id"
    WHERE LOWER("test_case"."name") LIKE $1 ESCAPE '!' AND "project@test_case_project"."project_id" IN ($2, $3)
    ORDER BY "test_case"."name" DESC
    LIMIT 10 OFFSET 10
    "#);
    assert_eq!(
        statement.params,
        vec![
            SqlValue::Text("%login%".into()),
            SqlValue::Int(1),
            SqlValue::Int(2)
        ]
    );
    assert_valid_sql(&statement.sql, Dialect::Postgres);
}

#[test]
fn test_unreadable_scope_matches_nothing() {
    let domain = presets::test_case_domain().unwrap();
    let bindings = presets::test_case_bindings().unwrap();
    let security = StaticScopeSecurity::new([1]);

    let request = SearchRequest::default().with_criterion("project.id", FieldValue::list(["7"]));
    let compiled = SearchCompiler::new(Catalog::builtin(), &domain, &security)
        .compile(&request)
        .unwrap();

    let count = SqlAdapter::new(&bindings, Dialect::MySql).count(&compiled).unwrap();
    assert!(count.sql.ends_with("WHERE 0"));
    assert!(count.params.is_empty());
    assert_valid_sql(&count.sql, Dialect::MySql);
}

#[test]
fn test_special_filter_and_order() {
    let domain = presets::test_case_domain().unwrap();
    let bindings = presets::test_case_bindings().unwrap();
    let security = StaticScopeSecurity::new([1]);

    let request = SearchRequest::default()
        .with_criterion("milestones", FieldValue::list(["4", "5"]))
        .sorted_by(SortEntry::new("path", SortDirection::Asc));
    let compiled = SearchCompiler::new(Catalog::builtin(), &domain, &security)
        .compile(&request)
        .unwrap();

    assert_eq!(compiled.special_filters.len(), 1);
    assert_eq!(compiled.special_orders.len(), 1);
    let labels: Vec<_> = compiled.model.projections.iter().map(|p| p.column.label()).collect();
    assert_eq!(labels, vec!["TEST_CASE_ENTITY", "TEST_CASE_ID"]);

    let statement = SqlAdapter::new(&bindings, Dialect::Postgres)
        .fetch(&compiled)
        .unwrap()
        .to_statement();
    assert!(statement.sql.contains("WHERE EXISTS (SELECT"));
    assert!(statement.sql.contains("AS \"order_path\""));
    assert!(statement.sql.contains("ORDER BY (SELECT p.path"));
    assert_eq!(
        statement.params,
        vec![SqlValue::Int(4), SqlValue::Int(5)]
    );
    assert_valid_sql(&statement.sql, Dialect::Postgres);
}

#[test]
fn test_custom_fields_filter_through_exists() {
    let domain = presets::test_case_domain().unwrap();
    let bindings = presets::test_case_bindings().unwrap();
    let security = StaticScopeSecurity::new([1]);

    let request = request(serde_json::json!({
        "criteria": {
            "cuf-effort": { "type": "CF_NUMERIC_RANGE", "min": "2,5", "cuf_id": 7 },
            "cuf-tags": { "type": "TAGS", "tags": ["smoke"], "operation": "AND", "cuf_id": 3 }
        }
    }));
    let compiled = SearchCompiler::new(Catalog::builtin(), &domain, &security)
        .compile(&request)
        .unwrap();

    let filters = &compiled.model.filters;
    assert_eq!(filters.len(), 2);
    assert_eq!(filters[0].column.to_string(), "TEST_CASE_CUF_NUMERIC#7");
    assert_eq!(filters[0].operation, Operation::GreaterEqual);
    assert_eq!(filters[1].column.to_string(), "TEST_CASE_CUF_TAG#3");
    assert_eq!(filters[1].operation, Operation::In);

    for dialect in [Dialect::Postgres, Dialect::MySql, Dialect::DuckDb] {
        let statement = SqlAdapter::new(&bindings, dialect).count(&compiled).unwrap();
        assert_eq!(statement.sql.matches("EXISTS").count(), 2);
        assert_eq!(
            statement.params,
            vec![SqlValue::Float(2.5), SqlValue::Text("smoke".into())]
        );
        assert_valid_sql(&statement.sql, dialect);
    }
}

#[test]
fn test_requirement_version_joins_through_requirement() {
    let domain = presets::requirement_version_domain().unwrap();
    let bindings = presets::requirement_version_bindings().unwrap();
    let security = StaticScopeSecurity::new([1]);

    let request = SearchRequest::default()
        .with_criterion("project.name", FieldValue::single("alpha"))
        .sorted_by(SortEntry::new("versions", SortDirection::Desc));
    let compiled = SearchCompiler::new(Catalog::builtin(), &domain, &security)
        .compile(&request)
        .unwrap();

    let sql = SqlAdapter::new(&bindings, Dialect::MySql)
        .fetch(&compiled)
        .unwrap()
        .to_sql();
    let requirement = sql.find("JOIN `requirement` AS `requirement`").unwrap();
    let project = sql.find("JOIN `project` AS `project@requirement_project`").unwrap();
    assert!(requirement < project);
    assert!(sql.contains("COUNT(*) FROM requirement_version v"));
    assert_valid_sql(&sql, Dialect::MySql);
}

#[test]
fn test_fulltext_per_dialect() {
    let domain = presets::test_case_domain().unwrap();
    let bindings = presets::test_case_bindings().unwrap();
    let security = StaticScopeSecurity::new([1]);

    let request = SearchRequest::default().with_criterion("description", FieldValue::text("login page"));
    let compiled = SearchCompiler::new(Catalog::builtin(), &domain, &security)
        .compile(&request)
        .unwrap();
    assert_eq!(compiled.model.filters[0].values, vec!["login or page"]);

    let postgres = SqlAdapter::new(&bindings, Dialect::Postgres).count(&compiled).unwrap();
    assert!(postgres.sql.contains("@@"));

    let mysql = SqlAdapter::new(&bindings, Dialect::MySql).count(&compiled).unwrap();
    assert!(mysql.sql.contains("MATCH ("));

    let duckdb = SqlAdapter::new(&bindings, Dialect::DuckDb).count(&compiled).unwrap();
    assert_eq!(duckdb.params.len(), 2);
    assert_valid_sql(&duckdb.sql, Dialect::DuckDb);
}

#[test]
fn test_settings_drive_join_style_and_scope() {
    let domain = presets::test_case_domain().unwrap();
    let bindings = presets::test_case_bindings().unwrap();
    let security = StaticScopeSecurity::new([1, 2]);

    let settings = CompilerSettings {
        join_style: JoinStyle::Left,
        scope: ScopeSettings {
            key: ScopeKey::Exact("project.id".into()),
            ..ScopeSettings::default()
        },
        ..CompilerSettings::default()
    };
    let request = SearchRequest::default().with_criterion("project.id", FieldValue::list(["2", "9"]));
    let compiled = SearchCompiler::new(Catalog::builtin(), &domain, &security)
        .with_settings(settings)
        .compile(&request)
        .unwrap();

    assert_eq!(compiled.model.join_style, JoinStyle::Left);
    assert_eq!(compiled.model.filters[0].values, vec!["2"]);

    let count = SqlAdapter::new(&bindings, Dialect::Postgres).count(&compiled).unwrap();
    assert!(count.sql.contains("LEFT JOIN \"project\""));
}

#[test]
fn test_unmapped_keys_fail() {
    let domain = presets::test_case_domain().unwrap();
    let security = StaticScopeSecurity::new([1]);
    let compiler = SearchCompiler::new(Catalog::builtin(), &domain, &security);

    let err = compiler
        .compile(&SearchRequest::default().with_criterion("nope", FieldValue::single("x")))
        .unwrap_err();
    assert!(matches!(err, CompileError::Mapping(MappingError::UnmappedKey(_))));

    let err = compiler
        .compile(&SearchRequest::default().sorted_by(SortEntry::new("nope", SortDirection::Asc)))
        .unwrap_err();
    assert!(matches!(err, CompileError::Mapping(MappingError::UnmappedKey(_))));
}

fn single_filter(key: &str, value: serde_json::Value) -> quarry::model::FilterColumn {
    let domain = presets::test_case_domain().unwrap();
    let security = StaticScopeSecurity::new([1]);
    let request = request(serde_json::json!({ "criteria": { key: value } }));
    let mut compiled = SearchCompiler::new(Catalog::builtin(), &domain, &security)
        .compile(&request)
        .unwrap();
    assert_eq!(compiled.model.filters.len(), 1);
    compiled.model.filters.remove(0)
}

#[test]
fn test_numeric_bounds_keep_user_digits() {
    let filter = single_filter(
        "steps",
        serde_json::json!({ "type": "NUMERIC_RANGE", "min": "9007199254740993", "max": "0,1" }),
    );
    assert_eq!(filter.operation, Operation::Between);
    assert_eq!(filter.values, vec!["9007199254740993", "0.1"]);
}

#[test]
fn test_integer_range_bounds() {
    let both = single_filter("steps", serde_json::json!({ "type": "RANGE", "min": 2, "max": 10 }));
    assert_eq!(both.column.to_string(), "TEST_CASE_STEPCOUNT");
    assert_eq!(both.operation, Operation::Between);
    assert_eq!(both.values, vec!["2", "10"]);

    let above = single_filter("steps", serde_json::json!({ "type": "RANGE", "min": 3 }));
    assert_eq!(above.operation, Operation::GreaterEqual);
    assert_eq!(above.values, vec!["3"]);
}

#[test]
fn test_time_interval_from_start_only() {
    let filter = single_filter(
        "createdOn",
        serde_json::json!({ "type": "TIME_INTERVAL", "start_date": "2024-05-02" }),
    );
    assert_eq!(filter.column.to_string(), "TEST_CASE_CREATED_ON");
    assert_eq!(filter.operation, Operation::GreaterEqual);
    assert_eq!(filter.values, vec!["2024-05-02"]);
}

#[test]
fn test_custom_field_single() {
    let filter = single_filter(
        "cuf-owner",
        serde_json::json!({ "type": "CF_SINGLE", "value": " alice ", "cuf_id": 5 }),
    );
    assert_eq!(filter.column.to_string(), "TEST_CASE_CUF_TEXT#5");
    assert_eq!(filter.column.cuf_id, Some(5));
    assert_eq!(filter.operation, Operation::Like);
    assert_eq!(filter.values, vec!["alice"]);
}

#[test]
fn test_custom_field_checkbox() {
    let filter = single_filter(
        "cuf-flaky",
        serde_json::json!({ "type": "CF_CHECKBOX", "values": ["true"], "cuf_id": 6 }),
    );
    assert_eq!(filter.column.to_string(), "TEST_CASE_CUF_CHECKBOX#6");
    assert_eq!(filter.column.cuf_id, Some(6));
    assert_eq!(filter.operation, Operation::In);
    assert_eq!(filter.values, vec!["true"]);
}

#[test]
fn test_custom_field_time_interval() {
    let filter = single_filter(
        "cuf-due",
        serde_json::json!({
            "type": "CF_TIME_INTERVAL",
            "start_date": "2024-01-01",
            "end_date": "2024-06-30",
            "cuf_id": 8
        }),
    );
    assert_eq!(filter.column.to_string(), "TEST_CASE_CUF_DATE#8");
    assert_eq!(filter.column.cuf_id, Some(8));
    assert_eq!(filter.operation, Operation::Between);
    assert_eq!(filter.values, vec!["2024-01-01", "2024-06-30"]);
}
