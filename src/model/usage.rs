//! Column usages - one appearance of a prototype in a query model.

use std::fmt;
use std::sync::Arc;

use crate::catalog::{ColumnPrototype, Operation, SortDirection};

// =============================================================================
// Column reference
// =============================================================================

/// A catalog prototype plus the custom field id for extension slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub prototype: Arc<ColumnPrototype>,
    pub cuf_id: Option<i64>,
}

impl ColumnRef {
    pub fn new(prototype: Arc<ColumnPrototype>) -> Self {
        Self {
            prototype,
            cuf_id: None,
        }
    }

    pub fn extension(prototype: Arc<ColumnPrototype>, cuf_id: i64) -> Self {
        Self {
            prototype,
            cuf_id: Some(cuf_id),
        }
    }

    pub fn label(&self) -> &str {
        &self.prototype.label
    }

    /// Two references name the same column when label and custom field agree.
    pub fn same_column(&self, other: &ColumnRef) -> bool {
        self.prototype.label == other.prototype.label && self.cuf_id == other.cuf_id
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cuf_id {
            Some(id) => write!(f, "{}#{}", self.prototype.label, id),
            None => f.write_str(&self.prototype.label),
        }
    }
}

// =============================================================================
// Usages
// =============================================================================

/// Group-by key. Must restate a projection (same column, same operation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationColumn {
    pub column: ColumnRef,
    pub operation: Operation,
}

/// A predicate over one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterColumn {
    pub column: ColumnRef,
    pub operation: Operation,
    pub values: Vec<String>,
}

/// A selected column. `operation` is `None` unless it is a measure aggregate
/// or a date bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionColumn {
    pub column: ColumnRef,
    pub operation: Operation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderingColumn {
    pub column: ColumnRef,
    pub direction: SortDirection,
}

impl AggregationColumn {
    pub fn new(column: ColumnRef, operation: Operation) -> Self {
        Self { column, operation }
    }
}

impl FilterColumn {
    pub fn new<I, S>(column: ColumnRef, operation: Operation, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            column,
            operation,
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

impl ProjectionColumn {
    pub fn new(column: ColumnRef) -> Self {
        Self {
            column,
            operation: Operation::None,
        }
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = operation;
        self
    }

    /// The aggregation usage that groups by this projection.
    pub fn to_aggregation(&self) -> AggregationColumn {
        AggregationColumn::new(self.column.clone(), self.operation)
    }
}

impl OrderingColumn {
    pub fn new(column: ColumnRef, direction: SortDirection) -> Self {
        Self { column, direction }
    }
}
