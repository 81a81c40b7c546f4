//! MySQL SQL dialect.
//!
//! MySQL differences from ANSI:
//! - Backtick identifier quoting (`` `name` ``)
//! - Boolean is TINYINT(1), returns 1/0
//! - Positional `?` placeholders
//! - No DATE_TRUNC (use DATE() / DATE_FORMAT())
//! - MATCH ... AGAINST for fulltext indexes

use super::helpers;
use super::{DateBucket, SqlDialect};
use crate::sql::expr::Expr;

/// MySQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct MySql;

impl SqlDialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_backtick(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    fn placeholder(&self, n: usize) -> String {
        helpers::placeholder_positional(n)
    }

    // Uses default emit_limit_offset (LIMIT ... OFFSET ...)

    fn date_bucket(&self, bucket: DateBucket, expr: Expr) -> Expr {
        helpers::date_bucket_mysql(bucket, expr)
    }

    fn fulltext_match(&self, column: Expr, query: Expr) -> Option<Expr> {
        Some(Expr::MatchAgainst {
            columns: vec![column],
            query: Box::new(query),
        })
    }
}
