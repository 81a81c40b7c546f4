//! PostgreSQL SQL dialect.
//!
//! PostgreSQL features:
//! - ANSI identifier quoting (`"`)
//! - Native boolean type (true/false)
//! - Numbered placeholders (`$1`)
//! - Text search with `to_tsvector(..) @@ websearch_to_tsquery(..)`

use super::helpers;
use super::SqlDialect;
use crate::sql::expr::{func, BinaryOperator, Expr, ExprExt};

/// PostgreSQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_literal(b)
    }

    fn placeholder(&self, n: usize) -> String {
        helpers::placeholder_numbered(n)
    }

    // Uses default emit_limit_offset (LIMIT ... OFFSET ...) and DATE_TRUNC

    fn fulltext_match(&self, column: Expr, query: Expr) -> Option<Expr> {
        // websearch_to_tsquery understands the "or" token between words
        Some(func("to_tsvector", vec![column]).binary(
            BinaryOperator::TextMatch,
            func("websearch_to_tsquery", vec![query]),
        ))
    }
}
