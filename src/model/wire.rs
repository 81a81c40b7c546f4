//! Serializable form of a query model.
//!
//! Usages travel as labels; [`WireQueryModel::bind`] turns them back into
//! catalog references.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CatalogResult, Operation, SortDirection};

use super::{
    AggregationColumn, ColumnRef, FilterColumn, JoinStyle, OrderingColumn, ProjectionColumn,
    QueryModel, QueryStrategy,
};

/// A label plus operation: the wire shape of projections and aggregations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireColumn {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuf_id: Option<i64>,
    #[serde(default = "none_operation")]
    pub operation: Operation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireFilter {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuf_id: Option<i64>,
    pub operation: Operation,
    #[serde(default)]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireOrdering {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuf_id: Option<i64>,
    #[serde(default)]
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WireQueryModel {
    pub strategy: QueryStrategy,
    pub join_style: JoinStyle,
    pub aggregations: Vec<WireColumn>,
    pub filters: Vec<WireFilter>,
    pub projections: Vec<WireColumn>,
    pub orderings: Vec<WireOrdering>,
}

fn none_operation() -> Operation {
    Operation::None
}

impl WireQueryModel {
    /// Resolve every label against `catalog`.
    ///
    /// The bound model is not validated; call [`QueryModel::validate`].
    pub fn bind(&self, catalog: &Catalog) -> CatalogResult<QueryModel> {
        let column = |label: &str, cuf_id: Option<i64>| -> CatalogResult<ColumnRef> {
            Ok(ColumnRef {
                prototype: Arc::clone(catalog.lookup(label)?),
                cuf_id,
            })
        };

        Ok(QueryModel {
            strategy: self.strategy,
            join_style: self.join_style,
            aggregations: self
                .aggregations
                .iter()
                .map(|w| Ok(AggregationColumn::new(column(&w.label, w.cuf_id)?, w.operation)))
                .collect::<CatalogResult<_>>()?,
            filters: self
                .filters
                .iter()
                .map(|w| {
                    Ok(FilterColumn::new(
                        column(&w.label, w.cuf_id)?,
                        w.operation,
                        w.values.iter().cloned(),
                    ))
                })
                .collect::<CatalogResult<_>>()?,
            projections: self
                .projections
                .iter()
                .map(|w| {
                    Ok(ProjectionColumn::new(column(&w.label, w.cuf_id)?).with_operation(w.operation))
                })
                .collect::<CatalogResult<_>>()?,
            orderings: self
                .orderings
                .iter()
                .map(|w| Ok(OrderingColumn::new(column(&w.label, w.cuf_id)?, w.direction)))
                .collect::<CatalogResult<_>>()?,
        })
    }
}

impl From<&QueryModel> for WireQueryModel {
    fn from(model: &QueryModel) -> Self {
        let wire_column = |column: &ColumnRef, operation: Operation| WireColumn {
            label: column.label().to_string(),
            cuf_id: column.cuf_id,
            operation,
        };

        Self {
            strategy: model.strategy,
            join_style: model.join_style,
            aggregations: model
                .aggregations
                .iter()
                .map(|a| wire_column(&a.column, a.operation))
                .collect(),
            filters: model
                .filters
                .iter()
                .map(|f| WireFilter {
                    label: f.column.label().to_string(),
                    cuf_id: f.column.cuf_id,
                    operation: f.operation,
                    values: f.values.clone(),
                })
                .collect(),
            projections: model
                .projections
                .iter()
                .map(|p| wire_column(&p.column, p.operation))
                .collect(),
            orderings: model
                .orderings
                .iter()
                .map(|o| WireOrdering {
                    label: o.column.label().to_string(),
                    cuf_id: o.column.cuf_id,
                    direction: o.direction,
                })
                .collect(),
        }
    }
}

impl From<QueryModel> for WireQueryModel {
    fn from(model: QueryModel) -> Self {
        WireQueryModel::from(&model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_json_shape() {
        let catalog = Catalog::builtin();
        let name = ColumnRef::new(catalog.lookup("TEST_CASE_NAME").unwrap().clone());
        let model = QueryModel::new()
            .project(ProjectionColumn::new(name.clone()))
            .filter(FilterColumn::new(name, Operation::Like, ["foo"]));

        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["strategy"], "MAIN");
        assert_eq!(json["join_style"], "INNER");
        assert_eq!(json["projections"][0]["label"], "TEST_CASE_NAME");
        assert_eq!(json["projections"][0]["operation"], "NONE");
        assert_eq!(json["filters"][0]["operation"], "LIKE");
        assert_eq!(json["filters"][0]["values"][0], "foo");
        assert!(json["filters"][0].get("cuf_id").is_none());
    }

    #[test]
    fn test_bind_resolves_labels() {
        let wire: WireQueryModel = serde_json::from_str(
            r#"{
                "projections": [{"label": "TEST_CASE_ENTITY"}],
                "filters": [{"label": "TEST_CASE_CUF_LIST", "cuf_id": 4, "operation": "IN", "values": ["A", "B"]}]
            }"#,
        )
        .unwrap();
        let model = wire.bind(Catalog::builtin()).unwrap();
        assert_eq!(model.strategy, QueryStrategy::Main);
        assert_eq!(model.projections[0].operation, Operation::None);
        assert_eq!(model.filters[0].column.cuf_id, Some(4));
        assert_eq!(model.validate(), Ok(()));
        assert_eq!(WireQueryModel::from(&model), wire);
    }

    #[test]
    fn test_bind_unknown_label() {
        let wire = WireQueryModel {
            projections: vec![WireColumn {
                label: "GONE".into(),
                cuf_id: None,
                operation: Operation::None,
            }],
            ..Default::default()
        };
        assert!(wire.bind(Catalog::builtin()).is_err());
    }
}
