//! SQL generation module.
//!
//! This module provides a type-safe SQL builder that generates multi-dialect
//! SELECT statements with bound parameters. It includes:
//!
//! - [`query`] - SELECT query builder
//! - [`expr`] - Expression AST and builder DSL
//! - [`token`] - Token types for SQL generation
//! - [`value`] - Bound parameter values
//! - [`dialect`] - SQL dialect implementations

pub mod dialect;
pub mod expr;
pub mod query;
pub mod token;
pub mod value;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types at the sql module level
pub use dialect::{DateBucket, Dialect, SqlDialect};
pub use expr::{
    count_distinct, func, param, raw_sql, table_col, BinaryOperator, Expr, ExprExt,
};
pub use query::{Join, JoinType, OrderByExpr, Query, SelectExpr, SortDir, TableRef};
pub use token::{Statement, Token, TokenStream};
pub use value::SqlValue;
