//! DuckDB SQL dialect.
//!
//! DuckDB is PostgreSQL-compatible with extensions:
//! - ANSI identifier quoting (`"`)
//! - Positional `?` placeholders
//! - DATE_TRUNC
//! - No fulltext predicate without the fts extension

use super::helpers;
use super::SqlDialect;
use crate::sql::expr::Expr;

/// DuckDB SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct DuckDb;

impl SqlDialect for DuckDb {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_literal(b)
    }

    fn placeholder(&self, n: usize) -> String {
        helpers::placeholder_positional(n)
    }

    // Uses default emit_limit_offset (LIMIT ... OFFSET ...) and DATE_TRUNC

    fn fulltext_match(&self, _column: Expr, _query: Expr) -> Option<Expr> {
        None
    }
}
