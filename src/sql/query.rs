//! Query builder - construct SELECT statements with a fluent API.

use super::dialect::{Dialect, SqlDialect};
use super::expr::{Expr, ExprExt};
use super::token::{Statement, Token, TokenStream};

// =============================================================================
// Select Expression (column with optional alias)
// =============================================================================

/// A SELECT list item: expression with optional alias.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct SelectExpr {
    pub expr: Expr,
    pub alias: Option<String>,
}

impl SelectExpr {
    pub fn new(expr: Expr) -> Self {
        Self { expr, alias: None }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        let mut ts = self.expr.to_tokens(dialect);
        if let Some(alias) = &self.alias {
            ts.space()
                .push(Token::As)
                .space()
                .push(Token::Ident(alias.clone()));
        }
        ts
    }
}

impl From<Expr> for SelectExpr {
    fn from(expr: Expr) -> Self {
        SelectExpr::new(expr)
    }
}

// =============================================================================
// Table Reference
// =============================================================================

/// A table reference with optional alias.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct TableRef {
    pub table: String,
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.into(),
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::Ident(self.table.clone()));
        if let Some(alias) = &self.alias {
            ts.space()
                .push(Token::As)
                .space()
                .push(Token::Ident(alias.clone()));
        }
        ts
    }
}

// =============================================================================
// Joins
// =============================================================================

/// Type of join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
}

/// A JOIN clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub join_type: JoinType,
    pub table: TableRef,
    pub on: Expr,
}

impl Join {
    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();

        ts.push(match self.join_type {
            JoinType::Inner => Token::Inner,
            JoinType::Left => Token::Left,
        });
        ts.space().push(Token::Join).space();
        ts.append(&self.table.to_tokens());
        ts.space().push(Token::On).space();
        ts.append(&self.on.to_tokens(dialect));

        ts
    }
}

// =============================================================================
// ORDER BY
// =============================================================================

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

/// An ORDER BY expression.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct OrderByExpr {
    pub expr: Expr,
    pub dir: SortDir,
}

impl OrderByExpr {
    pub fn asc(expr: Expr) -> Self {
        Self {
            expr,
            dir: SortDir::Asc,
        }
    }

    pub fn desc(expr: Expr) -> Self {
        Self {
            expr,
            dir: SortDir::Desc,
        }
    }

    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        let mut ts = self.expr.to_tokens(dialect);
        ts.space().push(match self.dir {
            SortDir::Asc => Token::Asc,
            SortDir::Desc => Token::Desc,
        });
        ts
    }
}

// =============================================================================
// Query Builder
// =============================================================================

/// A SELECT query.
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use = "Query has no effect until converted to SQL with to_sql() or to_statement()"]
pub struct Query {
    pub select: Vec<SelectExpr>,
    pub distinct: bool,
    pub from: Option<TableRef>,
    pub joins: Vec<Join>,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub order_by: Vec<OrderByExpr>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Query {
    /// Create a new empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the SELECT list.
    pub fn select(mut self, exprs: Vec<impl Into<SelectExpr>>) -> Self {
        self.select = exprs.into_iter().map(|e| e.into()).collect();
        self
    }

    /// Add DISTINCT.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Set the FROM table.
    pub fn from(mut self, table: TableRef) -> Self {
        self.from = Some(table);
        self
    }

    /// Add a JOIN.
    pub fn join(mut self, join_type: JoinType, table: TableRef, on: Expr) -> Self {
        self.joins.push(Join {
            join_type,
            table,
            on,
        });
        self
    }

    /// Whether a join (or the FROM table) already uses this alias.
    pub fn has_alias(&self, alias: &str) -> bool {
        let named = |t: &TableRef| t.alias.as_deref().unwrap_or(&t.table) == alias;
        self.from.as_ref().is_some_and(named) || self.joins.iter().any(|j| named(&j.table))
    }

    /// Add a WHERE condition (ANDed with existing conditions).
    pub fn filter(mut self, condition: Expr) -> Self {
        self.where_clause = Some(match self.where_clause {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }

    /// Set the GROUP BY clause.
    pub fn group_by(mut self, exprs: Vec<Expr>) -> Self {
        self.group_by = exprs;
        self
    }

    /// Set the ORDER BY clause.
    pub fn order_by(mut self, exprs: Vec<OrderByExpr>) -> Self {
        self.order_by = exprs;
        self
    }

    /// Set LIMIT.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set OFFSET.
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Convert to token stream for a specific dialect.
    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();

        // SELECT
        ts.push(Token::Select);
        if self.distinct {
            ts.space().push(Token::Distinct);
        }

        // Columns
        for (i, select_expr) in self.select.iter().enumerate() {
            if i == 0 {
                ts.newline().indent(1);
            } else {
                ts.comma().newline().indent(1);
            }
            ts.append(&select_expr.to_tokens(dialect));
        }

        // FROM
        if let Some(from) = &self.from {
            ts.newline().push(Token::From).space();
            ts.append(&from.to_tokens());
        }

        // JOINs
        for join in &self.joins {
            ts.newline();
            ts.append(&join.to_tokens(dialect));
        }

        // WHERE
        if let Some(where_clause) = &self.where_clause {
            ts.newline().push(Token::Where).space();
            ts.append(&where_clause.to_tokens(dialect));
        }

        // GROUP BY
        if !self.group_by.is_empty() {
            ts.newline().push(Token::GroupBy).space();
            for (i, expr) in self.group_by.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.append(&expr.to_tokens(dialect));
            }
        }

        // ORDER BY
        if !self.order_by.is_empty() {
            ts.newline().push(Token::OrderBy).space();
            for (i, order_expr) in self.order_by.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.append(&order_expr.to_tokens(dialect));
            }
        }

        // LIMIT / OFFSET
        if self.limit.is_some() || self.offset.is_some() {
            ts.newline();
            ts.append(&dialect.emit_limit_offset(self.limit, self.offset));
        }

        ts
    }

    /// Render SQL text and bound parameters for a specific dialect.
    pub fn to_statement(&self, dialect: Dialect) -> Statement {
        self.to_tokens(dialect).render(dialect)
    }

    /// Generate SQL string for a specific dialect.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens(dialect).serialize(dialect)
    }
}

impl std::fmt::Display for Query {
    /// Formats the query using the default dialect (Postgres).
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_sql(Dialect::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::expr::{count_distinct, param, table_col};
    use crate::sql::test_utils::validate_sql;
    use crate::sql::value::SqlValue;

    fn sample() -> Query {
        Query::new()
            .distinct()
            .select(vec![
                SelectExpr::new(table_col("tc", "id")).with_alias("TEST_CASE_ID"),
                SelectExpr::new(table_col("tc", "name")).with_alias("TEST_CASE_NAME"),
            ])
            .from(TableRef::new("test_case").with_alias("tc"))
            .join(
                JoinType::Inner,
                TableRef::new("project").with_alias("p"),
                table_col("p", "id").eq(table_col("tc", "project_id")),
            )
            .filter(table_col("tc", "name").like(param("%login%")))
            .filter(table_col("p", "id").in_list(vec![param(1), param(2)]))
            .order_by(vec![OrderByExpr::desc(table_col("tc", "name"))])
            .limit(20)
            .offset(40)
    }

    #[test]
    fn test_select_layout() {
        insta::assert_snapshot!(sample().to_sql(Dialect::Postgres), @r#"
        SELECT DISTINCT
          "tc"."id" AS "TEST_CASE_ID",
          "tc"."name" AS "TEST_CASE_NAME"
        FROM "test_case" AS "tc"
        INNER JOIN "project" AS "p" ON "p"."id" = "tc"."project_id"
        WHERE "tc"."name" LIKE $1 AND "p"."id" IN ($2, $3)
        ORDER BY "tc"."name" DESC
        LIMIT 20 OFFSET 40
        "#);
    }

    #[test]
    fn test_statement_params_follow_placeholders() {
        let stmt = sample().to_statement(Dialect::MySql);
        assert_eq!(
            stmt.params,
            vec![
                SqlValue::Text("%login%".into()),
                SqlValue::Int(1),
                SqlValue::Int(2)
            ]
        );
        assert_eq!(stmt.sql.matches('?').count(), 3);
    }

    #[test]
    fn test_sql_is_valid_per_dialect() {
        for dialect in [Dialect::Postgres, Dialect::MySql, Dialect::DuckDb] {
            validate_sql(&sample().to_sql(dialect), dialect).unwrap();
        }
    }

    #[test]
    fn test_count_query() {
        let q = Query::new()
            .select(vec![count_distinct(table_col("tc", "id"))])
            .from(TableRef::new("test_case").with_alias("tc"));
        assert_eq!(
            q.to_sql(Dialect::DuckDb),
            "SELECT\n  COUNT(DISTINCT \"tc\".\"id\")\nFROM \"test_case\" AS \"tc\""
        );
    }

    #[test]
    fn test_has_alias() {
        let q = sample();
        assert!(q.has_alias("tc"));
        assert!(q.has_alias("p"));
        assert!(!q.has_alias("r"));
    }
}
