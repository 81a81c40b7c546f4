#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;

use common::assert_valid_sql;
use quarry::adapter::{
    AdapterError, AdapterResult, ExecutionAdapter, HandlerContext, SqlAdapter, SqlBindings,
    SqlHandler,
};
use quarry::catalog::{Catalog, Operation, SortDirection};
use quarry::compiler::{SpecialFilter, SpecialOrder};
use quarry::model::{ColumnRef, FilterColumn, ProjectionColumn, QueryModel};
use quarry::search::FieldValue;
use quarry::sql::{param, table_col, Dialect, Expr, ExprExt};

const BINDINGS: &str = r#"
root = "test_case"

[entities.test_case]
table = "tc"
id = "id"
columns = { name = "title" }

[entities."milestone@test_case_milestone"]
table = "ms"
columns = { label = "label" }

[entities."milestone@test_case_milestone".parent]
entity = "test_case"
local = "id"
remote = "id"
via = { table = "ms_tc", parent_column = "tc_id", child_column = "ms_id" }

[custom_fields]
table = "cfv"
entity_type_column = "kind"
tags = { table = "cfv_tag", value_column = "cfv", label_column = "tag" }
"#;

fn column(label: &str) -> ColumnRef {
    ColumnRef::new(Arc::clone(Catalog::builtin().lookup(label).unwrap()))
}

fn base() -> QueryModel {
    QueryModel::new()
        .project(ProjectionColumn::new(column("TEST_CASE_ENTITY")))
        .project(ProjectionColumn::new(column("TEST_CASE_NAME")))
}

#[test]
fn test_link_table_join() {
    let bindings = SqlBindings::from_toml_str(BINDINGS).unwrap();
    let model = base().filter(FilterColumn::new(
        column("TEST_CASE_MILESTONE_LABEL"),
        Operation::Equals,
        ["v1"],
    ));

    let sql = SqlAdapter::new(&bindings, Dialect::Postgres)
        .compile_count(&model, &[])
        .unwrap()
        .sql;
    insta::assert_snapshot!(sql, @r#"
    SELECT
      COUNT(DISTINCT "test_case"."id")
    FROM "tc" AS "test_case"
    INNER JOIN "ms_tc" AS "milestone@test_case_milestone__link" ON "milestone@test_case_milestone__link"."tc_id" = "test_case"."id"
    INNER JOIN "ms" AS "milestone@test_case_milestone" ON "milestone@test_case_milestone"."id" = "milestone@test_case_milestone__link"."ms_id"
    WHERE "milestone@test_case_milestone"."label" = $1
    "#);
    assert_valid_sql(&sql, Dialect::Postgres);
}

#[test]
fn test_extension_projection_left_joins_value() {
    let bindings = SqlBindings::from_toml_str(BINDINGS).unwrap();
    let text = ColumnRef::extension(
        Arc::clone(Catalog::builtin().lookup("TEST_CASE_CUF_TEXT").unwrap()),
        12,
    );
    let model = base().project(ProjectionColumn::new(text));

    let sql = SqlAdapter::new(&bindings, Dialect::MySql)
        .compile_fetch(&model, &[], &[])
        .unwrap()
        .to_sql();
    assert!(sql.contains("LEFT JOIN `cfv` AS `cuf_12`"));
    assert!(sql.contains("`cuf_12`.`kind` = 'TEST_CASE'"));
    assert!(sql.contains("`cuf_12`.`value` AS `TEST_CASE_CUF_TEXT#12`"));
    assert_valid_sql(&sql, Dialect::MySql);
}

#[test]
fn test_missing_bindings_are_reported() {
    let bindings = SqlBindings::from_toml_str(BINDINGS).unwrap();
    let adapter = SqlAdapter::new(&bindings, Dialect::Postgres);

    let unbound_attribute = base().filter(FilterColumn::new(
        column("TEST_CASE_REFERENCE"),
        Operation::Equals,
        ["R1"],
    ));
    assert!(matches!(
        adapter.compile_count(&unbound_attribute, &[]),
        Err(AdapterError::MissingBinding(_))
    ));

    let unbound_entity = base().filter(FilterColumn::new(
        column("TEST_CASE_PROJECT_ID"),
        Operation::In,
        ["1"],
    ));
    assert!(matches!(
        adapter.compile_count(&unbound_entity, &[]),
        Err(AdapterError::MissingBinding(_))
    ));
}

/// Sorts by name length and keeps names of a given length.
#[derive(Debug)]
struct NameLength;

impl SqlHandler for NameLength {
    fn filter(&self, ctx: &HandlerContext<'_>, key: &str, value: &FieldValue) -> AdapterResult<Expr> {
        let FieldValue::Single { value } = value else {
            return Err(AdapterError::Handler {
                key: key.to_string(),
                reason: "expects a single value".into(),
            });
        };
        let length: i64 = value.parse().map_err(|_| AdapterError::Handler {
            key: key.to_string(),
            reason: format!("'{}' is not a length", value),
        })?;
        Ok(quarry::sql::func("LENGTH", vec![table_col(ctx.root_alias, "title")]).eq(param(length)))
    }

    fn order(&self, ctx: &HandlerContext<'_>, _key: &str) -> AdapterResult<Expr> {
        Ok(quarry::sql::func("LENGTH", vec![table_col(ctx.root_alias, "title")]))
    }
}

#[test]
fn test_custom_handler() {
    let bindings = SqlBindings::from_toml_str(BINDINGS).unwrap();
    let handler: Arc<dyn SqlHandler> = Arc::new(NameLength);
    let filters = [SpecialFilter {
        key: "length".to_string(),
        handler: Arc::clone(&handler),
        value: FieldValue::single("8"),
    }];
    let orders = [SpecialOrder {
        key: "length".to_string(),
        handler,
        direction: SortDirection::Desc,
    }];

    let statement = SqlAdapter::new(&bindings, Dialect::DuckDb)
        .compile_fetch(&base(), &filters, &orders)
        .unwrap()
        .to_statement();
    assert!(statement.sql.contains("WHERE LENGTH(\"test_case\".\"title\") = ?"));
    assert!(statement.sql.ends_with("ORDER BY LENGTH(\"test_case\".\"title\") DESC"));
    assert_eq!(statement.params.len(), 1);
    assert_valid_sql(&statement.sql, Dialect::DuckDb);

    let bad = [SpecialFilter {
        key: "length".to_string(),
        handler: Arc::new(NameLength) as Arc<dyn SqlHandler>,
        value: FieldValue::single("long"),
    }];
    let err = SqlAdapter::new(&bindings, Dialect::DuckDb)
        .compile_count(&base(), &bad)
        .unwrap_err();
    assert!(matches!(err, AdapterError::Handler { ref reason, .. } if reason.contains("long")));
}
