//! Query Model - the role-partitioned description of one query.
//!
//! A model holds four ordered usage lists:
//!
//! ```text
//! QueryModel
//! ├── aggregations  group-by keys, each restating a projection
//! ├── filters       column + operation + literal values
//! ├── projections   selected columns (first = root entity)
//! └── orderings     column + direction, each also projected
//! ```
//!
//! The model is the contract between the compiler and the execution adapter.
//! Its serialized form is [`WireQueryModel`].

mod usage;
mod validate;
mod wire;

use serde::{Deserialize, Serialize};

use crate::catalog::{ColumnRole, Operation};

pub use usage::{AggregationColumn, ColumnRef, FilterColumn, OrderingColumn, ProjectionColumn};
pub use wire::{WireColumn, WireFilter, WireOrdering, WireQueryModel};

/// Structural violations of a query model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("Ordered column '{0}' is not projected")]
    OrderingNotProjected(String),

    #[error("Projection '{column}' ({operation}) is not covered by the aggregation")]
    AggregationNotCovering { column: String, operation: Operation },

    #[error("Aggregation '{column}' ({operation}) does not restate a projection")]
    AggregationWithoutProjection { column: String, operation: Operation },

    #[error("Operation {operation} is illegal for '{column}' as {role}")]
    IllegalOperation {
        column: String,
        role: ColumnRole,
        operation: Operation,
    },

    #[error("Column '{column}' cannot be used as {role}")]
    RoleNotAllowed { column: String, role: ColumnRole },

    #[error("Filter '{column}' ({operation}) expects {expected} value(s), got {got}")]
    ValueCount {
        column: String,
        operation: Operation,
        expected: usize,
        got: usize,
    },

    #[error("Extension column '{0}' needs a custom field id")]
    MissingExtensionId(String),

    #[error("Column '{0}' is not an extension but carries a custom field id")]
    UnexpectedExtensionId(String),
}

pub type ModelResult<T> = Result<T, ModelError>;

/// How the model is embedded in the final query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryStrategy {
    /// A top-level query.
    #[default]
    Main,
    /// Rendered as a correlated sub-query.
    Subquery,
    /// Spliced into an enclosing query as an expression.
    Inlined,
}

/// Join policy between the entities a model touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JoinStyle {
    #[default]
    Inner,
    /// Outer joins: rows survive a missing related entity.
    Left,
}

impl JoinStyle {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "inner" => Some(JoinStyle::Inner),
            "left" | "outer" => Some(JoinStyle::Left),
            _ => None,
        }
    }
}

/// One compiled query.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(into = "WireQueryModel")]
#[must_use = "builders have no effect until used"]
pub struct QueryModel {
    pub strategy: QueryStrategy,
    pub join_style: JoinStyle,
    pub aggregations: Vec<AggregationColumn>,
    pub filters: Vec<FilterColumn>,
    pub projections: Vec<ProjectionColumn>,
    pub orderings: Vec<OrderingColumn>,
}

impl QueryModel {
    /// An empty main query with inner joins.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(mut self, strategy: QueryStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_join_style(mut self, join_style: JoinStyle) -> Self {
        self.join_style = join_style;
        self
    }

    pub fn project(mut self, projection: ProjectionColumn) -> Self {
        self.projections.push(projection);
        self
    }

    pub fn filter(mut self, filter: FilterColumn) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn aggregate(mut self, aggregation: AggregationColumn) -> Self {
        self.aggregations.push(aggregation);
        self
    }

    pub fn order_by(mut self, ordering: OrderingColumn) -> Self {
        self.orderings.push(ordering);
        self
    }

    /// Group by every projection that is not a measure.
    pub fn group_by_axes(mut self) -> Self {
        self.aggregations = self
            .projections
            .iter()
            .filter(|p| !p.operation.is_aggregate())
            .map(ProjectionColumn::to_aggregation)
            .collect();
        self
    }

    /// Whether `column` already appears among the projections.
    pub fn is_projected(&self, column: &ColumnRef) -> bool {
        self.projections
            .iter()
            .any(|p| p.column.same_column(column))
    }

    pub fn is_aggregated(&self) -> bool {
        !self.aggregations.is_empty()
    }

    /// Check the structural invariants and the legality of every usage.
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> ModelResult<()> {
        validate::validate(self)
    }
}
