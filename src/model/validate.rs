//! Structural validation of a query model.

use crate::catalog::{is_legal, ColumnRole, Operation};

use super::{ColumnRef, FilterColumn, ModelError, ModelResult, QueryModel};

pub(super) fn validate(model: &QueryModel) -> ModelResult<()> {
    for projection in &model.projections {
        let role = projection_role(projection.operation);
        check_usage(&projection.column, role, projection.operation)?;
    }

    for aggregation in &model.aggregations {
        check_usage(&aggregation.column, ColumnRole::Axis, aggregation.operation)?;
        let restated = model.projections.iter().any(|p| {
            p.column.same_column(&aggregation.column) && p.operation == aggregation.operation
        });
        if !restated {
            return Err(ModelError::AggregationWithoutProjection {
                column: aggregation.column.to_string(),
                operation: aggregation.operation,
            });
        }
    }

    for filter in &model.filters {
        check_usage(&filter.column, ColumnRole::Filter, filter.operation)?;
        check_values(filter)?;
    }

    for ordering in &model.orderings {
        check_extension_id(&ordering.column)?;
        if !model.is_projected(&ordering.column) {
            return Err(ModelError::OrderingNotProjected(ordering.column.to_string()));
        }
    }

    if model.is_aggregated() {
        for projection in model
            .projections
            .iter()
            .filter(|p| !p.operation.is_aggregate())
        {
            let covered = model.aggregations.iter().any(|a| {
                a.column.same_column(&projection.column) && a.operation == projection.operation
            });
            if !covered {
                return Err(ModelError::AggregationNotCovering {
                    column: projection.column.to_string(),
                    operation: projection.operation,
                });
            }
        }
    }

    Ok(())
}

/// Measures select an aggregate; everything else is an axis.
fn projection_role(operation: Operation) -> ColumnRole {
    if operation.is_aggregate() {
        ColumnRole::Measure
    } else {
        ColumnRole::Axis
    }
}

fn check_usage(column: &ColumnRef, role: ColumnRole, operation: Operation) -> ModelResult<()> {
    let prototype = &column.prototype;
    if !prototype.allows(role) {
        return Err(ModelError::RoleNotAllowed {
            column: column.to_string(),
            role,
        });
    }
    if !is_legal(role, prototype.data_type, operation) {
        return Err(ModelError::IllegalOperation {
            column: column.to_string(),
            role,
            operation,
        });
    }
    check_extension_id(column)
}

fn check_extension_id(column: &ColumnRef) -> ModelResult<()> {
    match (column.prototype.is_extension(), column.cuf_id) {
        (true, None) => Err(ModelError::MissingExtensionId(column.label().to_string())),
        (false, Some(_)) => Err(ModelError::UnexpectedExtensionId(column.label().to_string())),
        _ => Ok(()),
    }
}

fn check_values(filter: &FilterColumn) -> ModelResult<()> {
    let got = filter.values.len();
    match filter.operation.arity() {
        Some(expected) if expected != got => Err(ModelError::ValueCount {
            column: filter.column.to_string(),
            operation: filter.operation,
            expected,
            got,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, SortDirection};
    use crate::model::{AggregationColumn, OrderingColumn, ProjectionColumn};

    fn col(label: &str) -> ColumnRef {
        ColumnRef::new(Catalog::builtin().lookup(label).unwrap().clone())
    }

    #[test]
    fn test_valid_model() {
        let model = QueryModel::new()
            .project(ProjectionColumn::new(col("TEST_CASE_ENTITY")))
            .project(ProjectionColumn::new(col("TEST_CASE_NAME")))
            .filter(FilterColumn::new(col("TEST_CASE_NAME"), Operation::Like, ["foo"]))
            .order_by(OrderingColumn::new(col("TEST_CASE_NAME"), SortDirection::Desc));
        assert_eq!(model.validate(), Ok(()));
    }

    #[test]
    fn test_ordering_must_be_projected() {
        let model = QueryModel::new()
            .project(ProjectionColumn::new(col("TEST_CASE_ENTITY")))
            .order_by(OrderingColumn::new(col("TEST_CASE_NAME"), SortDirection::Asc));
        assert_eq!(
            model.validate(),
            Err(ModelError::OrderingNotProjected("TEST_CASE_NAME".into()))
        );
    }

    #[test]
    fn test_aggregation_must_cover_axes() {
        let model = QueryModel::new()
            .project(ProjectionColumn::new(col("TEST_CASE_IMPORTANCE")))
            .project(ProjectionColumn::new(col("TEST_CASE_STATUS")))
            .project(ProjectionColumn::new(col("TEST_CASE_ID")).with_operation(Operation::Count))
            .aggregate(AggregationColumn::new(col("TEST_CASE_IMPORTANCE"), Operation::None));
        assert!(matches!(
            model.validate(),
            Err(ModelError::AggregationNotCovering { ref column, .. }) if column == "TEST_CASE_STATUS"
        ));

        let fixed = model.group_by_axes();
        assert_eq!(fixed.aggregations.len(), 2);
        assert_eq!(fixed.validate(), Ok(()));
    }

    #[test]
    fn test_aggregation_must_restate_projection() {
        let model = QueryModel::new()
            .project(ProjectionColumn::new(col("TEST_CASE_CREATED_ON")).with_operation(Operation::ByMonth))
            .aggregate(AggregationColumn::new(col("TEST_CASE_CREATED_ON"), Operation::ByYear));
        assert!(matches!(
            model.validate(),
            Err(ModelError::AggregationWithoutProjection { .. })
        ));
    }

    #[test]
    fn test_illegal_filter_operation() {
        let model = QueryModel::new().filter(FilterColumn::new(
            col("TEST_CASE_CREATED_ON"),
            Operation::Like,
            ["2024"],
        ));
        assert!(matches!(
            model.validate(),
            Err(ModelError::IllegalOperation { operation: Operation::Like, .. })
        ));
    }

    #[test]
    fn test_role_not_allowed() {
        let model = QueryModel::new().project(ProjectionColumn::new(col("TEST_CASE_DESCRIPTION")));
        assert!(matches!(
            model.validate(),
            Err(ModelError::RoleNotAllowed { role: ColumnRole::Axis, .. })
        ));
    }

    #[test]
    fn test_between_needs_two_values() {
        let model = QueryModel::new().filter(FilterColumn::new(
            col("TEST_CASE_CREATED_ON"),
            Operation::Between,
            ["2024-01-01"],
        ));
        assert!(matches!(model.validate(), Err(ModelError::ValueCount { got: 1, .. })));
    }

    #[test]
    fn test_extension_id_side_channel() {
        let cuf = col("TEST_CASE_CUF_TEXT");
        let model = QueryModel::new().filter(FilterColumn::new(cuf.clone(), Operation::Like, ["x"]));
        assert_eq!(
            model.validate(),
            Err(ModelError::MissingExtensionId("TEST_CASE_CUF_TEXT".into()))
        );

        let bound = ColumnRef::extension(cuf.prototype, 7);
        let model = QueryModel::new().filter(FilterColumn::new(bound, Operation::Like, ["x"]));
        assert_eq!(model.validate(), Ok(()));

        let mut name = col("TEST_CASE_NAME");
        name.cuf_id = Some(3);
        let model = QueryModel::new().filter(FilterColumn::new(name, Operation::Like, ["x"]));
        assert_eq!(
            model.validate(),
            Err(ModelError::UnexpectedExtensionId("TEST_CASE_NAME".into()))
        );
    }
}
