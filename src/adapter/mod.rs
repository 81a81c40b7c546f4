//! Execution adapters: turn a compiled search into something a store runs.
//!
//! ```text
//! CompiledSearch { model, special_filters, special_orders }
//!        │
//!        ▼
//! ExecutionAdapter::compile_fetch / compile_count
//!        │
//!        ▼ (SqlAdapter)
//! SqlBindings ──▶ joins, predicates ──▶ sql::Query ──▶ Statement { sql, params }
//! ```

pub mod bindings;
pub mod handlers;
pub mod presets;
mod sql;

use crate::catalog::Operation;
use crate::compiler::{CompiledSearch, SpecialFilter, SpecialOrder};
use crate::model::{ModelError, QueryModel, QueryStrategy};

pub use bindings::{CustomFieldBinding, EntityBinding, JoinBinding, LinkTable, SqlBindings, TagTable};
pub use handlers::{ExistsFilter, ExpressionOrder, HandlerContext, SharedHandler, SqlHandler};
pub use sql::{FetchQuery, SqlAdapter};

/// Errors raised while rendering a model for a store.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("Invalid query model: {0}")]
    InvalidModel(#[from] ModelError),

    #[error("Missing binding for {0}")]
    MissingBinding(String),

    #[error("No join path from '{from}' to '{to}'")]
    NoJoinPath { from: String, to: String },

    #[error("Operation {operation} is not supported on '{column}'")]
    UnsupportedOperation { column: String, operation: Operation },

    #[error("Invalid value '{value}' for '{column}': {reason}")]
    InvalidLiteral {
        column: String,
        value: String,
        reason: String,
    },

    #[error("Query strategy {0:?} cannot render as a standalone statement")]
    UnsupportedStrategy(QueryStrategy),

    #[error("Special handler '{key}' failed: {reason}")]
    Handler { key: String, reason: String },

    #[error("Failed to read bindings file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse bindings file: {0}")]
    ParseError(#[from] toml::de::Error),
}

pub type AdapterResult<T> = Result<T, AdapterError>;

/// A zero-based result page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u64,
    pub size: u64,
}

impl Page {
    pub fn new(number: u64, size: u64) -> Self {
        Self { number, size }
    }

    pub fn offset(&self) -> u64 {
        self.number.saturating_mul(self.size)
    }
}

/// A store-specific renderer of query models.
///
/// `H` is the handler type carried by the search domain the model was
/// compiled against.
pub trait ExecutionAdapter<H> {
    type Fetch;
    type Count;

    /// Query returning the projected rows.
    fn compile_fetch(
        &self,
        model: &QueryModel,
        filters: &[SpecialFilter<H>],
        orders: &[SpecialOrder<H>],
    ) -> AdapterResult<Self::Fetch>;

    /// Query returning the number of distinct root entities.
    fn compile_count(&self, model: &QueryModel, filters: &[SpecialFilter<H>]) -> AdapterResult<Self::Count>;

    fn fetch(&self, search: &CompiledSearch<H>) -> AdapterResult<Self::Fetch> {
        self.compile_fetch(&search.model, &search.special_filters, &search.special_orders)
    }

    fn count(&self, search: &CompiledSearch<H>) -> AdapterResult<Self::Count> {
        self.compile_count(&search.model, &search.special_filters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offset() {
        assert_eq!(Page::new(0, 25).offset(), 0);
        assert_eq!(Page::new(3, 25).offset(), 75);
        assert_eq!(Page::new(u64::MAX, 2).offset(), u64::MAX);
    }
}
