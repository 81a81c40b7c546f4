//! # Quarry
//!
//! Compiles search screens into typed query models, and query models into
//! parameterized multi-dialect SQL.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │          SearchRequest (form key → FieldValue, sort)     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [compiler + mapping + security]
//! ┌─────────────────────────────────────────────────────────┐
//! │   CompiledSearch { QueryModel, special filters/orders }  │
//! │   (validated against the catalog compatibility matrix)   │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [adapter + bindings]
//! ┌─────────────────────────────────────────────────────────┐
//! │              sql::Query → Statement { sql, params }      │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod adapter;
pub mod catalog;
pub mod compiler;
pub mod config;
pub mod mapping;
pub mod model;
pub mod search;
pub mod sql;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::adapter::{
        presets, ExecutionAdapter, FetchQuery, Page, SharedHandler, SqlAdapter, SqlBindings,
        SqlHandler,
    };
    pub use crate::catalog::{Catalog, ColumnRole, DataType, EntityType, Operation, SortDirection};
    pub use crate::compiler::{
        CompiledSearch, ScopeSecurity, SearchCompiler, SearchDomain, StaticScopeSecurity,
    };
    pub use crate::config::Settings;
    pub use crate::mapping::ColumnMappings;
    pub use crate::model::{
        ColumnRef, FilterColumn, JoinStyle, OrderingColumn, ProjectionColumn, QueryModel,
    };
    pub use crate::search::{FieldValue, SearchRequest, SortEntry};
    pub use crate::sql::{Dialect, Statement};
}
