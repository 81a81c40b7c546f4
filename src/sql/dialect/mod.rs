//! SQL Dialect definitions and formatting rules.
//!
//! This module provides a trait-based abstraction for SQL dialect differences.
//! Each dialect implements `SqlDialect` to handle its specific syntax:
//!
//! - Identifier quoting: `"` (PG/DuckDB), `` ` `` (MySQL)
//! - Placeholders: `$n` (PG) vs `?` (MySQL/DuckDB)
//! - Boolean literals: true/false vs 1/0
//! - Date truncation: DATE_TRUNC vs DATE()/DATE_FORMAT()
//! - Fulltext predicates: tsvector match vs MATCH ... AGAINST
//!
//! # Usage
//!
//! ```ignore
//! use quarry::sql::dialect::{Dialect, SqlDialect};
//!
//! let dialect = Dialect::Postgres;
//! let quoted = dialect.quote_identifier("user");  // "user"
//! ```

mod duckdb;
pub mod helpers;
mod mysql;
mod postgres;

pub use duckdb::DuckDb;
pub use mysql::MySql;
pub use postgres::Postgres;

use serde::{Deserialize, Serialize};

use super::expr::Expr;
use super::token::TokenStream;

/// Calendar unit a date column is truncated to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBucket {
    Day,
    Week,
    Month,
    Year,
}

impl DateBucket {
    /// DATE_TRUNC unit name.
    pub fn unit(&self) -> &'static str {
        match self {
            DateBucket::Day => "day",
            DateBucket::Week => "week",
            DateBucket::Month => "month",
            DateBucket::Year => "year",
        }
    }
}

/// SQL dialect trait - defines how SQL constructs are rendered.
///
/// Implementations handle dialect-specific syntax differences.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    // =========================================================================
    // Identifier and Literal Quoting
    // =========================================================================

    /// Quote an identifier (table, column, alias).
    ///
    /// - PostgreSQL/DuckDB: `"identifier"`
    /// - MySQL: `` `identifier` ``
    fn quote_identifier(&self, ident: &str) -> String;

    /// Quote a string literal.
    ///
    /// All dialects use single quotes with `''` for escaping.
    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_single(s)
    }

    /// Format a boolean literal.
    ///
    /// - PostgreSQL/DuckDB: `true`/`false`
    /// - MySQL: `1`/`0`
    fn format_bool(&self, b: bool) -> &'static str;

    /// Placeholder for the `n`-th (1-based) bound parameter.
    fn placeholder(&self, n: usize) -> String;

    // =========================================================================
    // Pagination
    // =========================================================================

    /// Emit LIMIT/OFFSET pagination clause.
    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        helpers::emit_limit_offset_standard(limit, offset)
    }

    // =========================================================================
    // Functions
    // =========================================================================

    /// Truncate a date expression to the start of its bucket.
    fn date_bucket(&self, bucket: DateBucket, expr: Expr) -> Expr {
        helpers::date_trunc(bucket, expr)
    }

    /// Fulltext predicate of `column` against the bound `query`.
    ///
    /// `None` when the dialect has no fulltext support; callers fall back to
    /// per-word LIKE.
    fn fulltext_match(&self, column: Expr, query: Expr) -> Option<Expr>;
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Postgres,
    MySql,
    DuckDb,
}

impl Dialect {
    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Postgres => &Postgres,
            Dialect::MySql => &MySql,
            Dialect::DuckDb => &DuckDb,
        }
    }

    /// Parse a dialect name (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Some(Dialect::Postgres),
            "mysql" => Some(Dialect::MySql),
            "duckdb" => Some(Dialect::DuckDb),
            _ => None,
        }
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        self.dialect().format_bool(b)
    }

    fn placeholder(&self, n: usize) -> String {
        self.dialect().placeholder(n)
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        self.dialect().emit_limit_offset(limit, offset)
    }

    fn date_bucket(&self, bucket: DateBucket, expr: Expr) -> Expr {
        self.dialect().date_bucket(bucket, expr)
    }

    fn fulltext_match(&self, column: Expr, query: Expr) -> Option<Expr> {
        self.dialect().fulltext_match(column, query)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}
