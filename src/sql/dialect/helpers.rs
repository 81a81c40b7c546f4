//! Shared helper functions for SQL dialect implementations.
//!
//! This module provides reusable building blocks that dialects can compose
//! to implement the `SqlDialect` trait with minimal duplication.

use super::super::expr::{func, Expr};
use super::super::token::{Token, TokenStream};
use super::DateBucket;

// =============================================================================
// Identifier Quoting
// =============================================================================

/// Quote identifier with double quotes (ANSI style).
/// Used by: Postgres, DuckDB
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote identifier with backticks.
/// Used by: MySQL
pub fn quote_backtick(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

// =============================================================================
// String Quoting
// =============================================================================

/// Quote string with single quotes (standard SQL).
/// Used by: All dialects
pub fn quote_string_single(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

// =============================================================================
// Boolean Formatting
// =============================================================================

/// Format boolean as literal true/false.
/// Used by: Postgres, DuckDB
pub fn format_bool_literal(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}

/// Format boolean as numeric 1/0.
/// Used by: MySQL
pub fn format_bool_numeric(b: bool) -> &'static str {
    if b {
        "1"
    } else {
        "0"
    }
}

// =============================================================================
// Placeholders
// =============================================================================

/// Numbered placeholder `$n`.
/// Used by: Postgres
pub fn placeholder_numbered(n: usize) -> String {
    format!("${}", n)
}

/// Positional placeholder `?`.
/// Used by: MySQL, DuckDB
pub fn placeholder_positional(_n: usize) -> String {
    "?".into()
}

// =============================================================================
// Pagination
// =============================================================================

/// Emit LIMIT ... OFFSET ... (standard SQL).
/// Used by: Postgres, DuckDB, MySQL
pub fn emit_limit_offset_standard(limit: Option<u64>, offset: Option<u64>) -> TokenStream {
    let mut ts = TokenStream::new();

    if let Some(lim) = limit {
        ts.push(Token::Limit)
            .space()
            .push(Token::LitInt(lim as i64));
    }

    if let Some(off) = offset {
        if limit.is_some() {
            ts.space();
        }
        ts.push(Token::Offset)
            .space()
            .push(Token::LitInt(off as i64));
    }

    ts
}

// =============================================================================
// Date Buckets
// =============================================================================

/// `DATE_TRUNC('unit', expr)`.
/// Used by: Postgres, DuckDB
pub fn date_trunc(bucket: DateBucket, expr: Expr) -> Expr {
    func("DATE_TRUNC", vec![Expr::Str(bucket.unit().into()), expr])
}

/// Date truncation with MySQL date functions.
/// Used by: MySQL
pub fn date_bucket_mysql(bucket: DateBucket, expr: Expr) -> Expr {
    match bucket {
        DateBucket::Day => func("DATE", vec![expr]),
        DateBucket::Week => func(
            "SUBDATE",
            vec![func("DATE", vec![expr.clone()]), func("WEEKDAY", vec![expr])],
        ),
        DateBucket::Month => func("DATE_FORMAT", vec![expr, Expr::Str("%Y-%m-01".into())]),
        DateBucket::Year => func("DATE_FORMAT", vec![expr, Expr::Str("%Y-01-01".into())]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoting() {
        assert_eq!(quote_double("a\"b"), "\"a\"\"b\"");
        assert_eq!(quote_backtick("a`b"), "`a``b`");
        assert_eq!(quote_string_single("it's"), "'it''s'");
    }

    #[test]
    fn test_limit_offset() {
        let dialect = crate::sql::dialect::Dialect::Postgres;
        assert_eq!(
            emit_limit_offset_standard(Some(10), Some(5)).serialize(dialect),
            "LIMIT 10 OFFSET 5"
        );
        assert_eq!(
            emit_limit_offset_standard(None, Some(5)).serialize(dialect),
            "OFFSET 5"
        );
        assert!(emit_limit_offset_standard(None, None).is_empty());
    }
}
