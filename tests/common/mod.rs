//! Shared helpers for integration tests.

use quarry::sql::Dialect;
use sqlparser::dialect::{DuckDbDialect, MySqlDialect, PostgreSqlDialect};
use sqlparser::parser::Parser;

/// Panics unless `sql` parses under `dialect`.
pub fn assert_valid_sql(sql: &str, dialect: Dialect) {
    let parser: Box<dyn sqlparser::dialect::Dialect> = match dialect {
        Dialect::Postgres => Box::new(PostgreSqlDialect {}),
        Dialect::MySql => Box::new(MySqlDialect {}),
        Dialect::DuckDb => Box::new(DuckDbDialect {}),
    };
    if let Err(e) = Parser::parse_sql(&*parser, sql) {
        panic!("invalid SQL for {}: {}\n{}", dialect, e, sql);
    }
}
