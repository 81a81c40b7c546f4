//! Expression AST for the predicates and select items the adapter emits.

use super::dialect::Dialect;
use super::query::Query;
use super::token::{Token, TokenStream};
use super::value::SqlValue;

// =============================================================================
// Expression AST
// =============================================================================

/// A SQL expression.
///
/// Every variant must be handled in `to_tokens()` - the compiler enforces this.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column reference: optional_table.column
    Column {
        table: Option<String>,
        column: String,
    },

    /// Inline integer literal (never user input).
    Int(i64),

    /// Inline string literal (never user input).
    Str(String),

    /// Bound parameter.
    Param(SqlValue),

    /// TRUE / FALSE
    Bool(bool),

    /// Binary operation: left op right
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },

    /// NOT expr
    Not(Box<Expr>),

    /// Function call: name(args...)
    Function {
        name: String,
        args: Vec<Expr>,
        distinct: bool,
    },

    /// IN: expr IN (values...)
    In {
        expr: Box<Expr>,
        values: Vec<Expr>,
        negated: bool,
    },

    /// BETWEEN: expr BETWEEN low AND high
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
    },

    /// IS NULL / IS NOT NULL
    IsNull { expr: Box<Expr>, negated: bool },

    /// expr LIKE pattern [ESCAPE 'c']
    Like {
        expr: Box<Expr>,
        pattern: Box<Expr>,
        escape: Option<char>,
    },

    /// MySQL `MATCH (columns) AGAINST (query IN BOOLEAN MODE)`
    MatchAgainst {
        columns: Vec<Expr>,
        query: Box<Expr>,
    },

    /// EXISTS (SELECT ...)
    Exists(Box<Query>),

    /// Parenthesized expression
    Paren(Box<Expr>),

    /// Raw SQL expression passed directly to output without escaping.
    ///
    /// Only for trusted fragments coming from bindings.
    Raw(String),
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Eq,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,
    And,
    Or,
    TextMatch,
}

fn binary_op_to_token(op: BinaryOperator) -> Token {
    match op {
        BinaryOperator::Eq => Token::Eq,
        BinaryOperator::Ne => Token::Ne,
        BinaryOperator::Lt => Token::Lt,
        BinaryOperator::Gt => Token::Gt,
        BinaryOperator::Lte => Token::Lte,
        BinaryOperator::Gte => Token::Gte,
        BinaryOperator::And => Token::And,
        BinaryOperator::Or => Token::Or,
        BinaryOperator::TextMatch => Token::TextMatch,
    }
}

fn comma_separated(ts: &mut TokenStream, exprs: &[Expr], dialect: Dialect) {
    for (i, expr) in exprs.iter().enumerate() {
        if i > 0 {
            ts.comma().space();
        }
        ts.append(&expr.to_tokens(dialect));
    }
}

impl Expr {
    /// Convert this expression to a token stream for a specific dialect.
    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();

        match self {
            Expr::Column { table, column } => {
                if let Some(t) = table {
                    ts.push(Token::Ident(t.clone()));
                    ts.push(Token::Dot);
                }
                ts.push(Token::Ident(column.clone()));
            }

            Expr::Int(n) => {
                ts.push(Token::LitInt(*n));
            }

            Expr::Str(s) => {
                ts.push(Token::LitString(s.clone()));
            }

            Expr::Param(value) => {
                ts.push(Token::Param(value.clone()));
            }

            Expr::Bool(b) => {
                ts.push(if *b { Token::True } else { Token::False });
            }

            Expr::BinaryOp { left, op, right } => {
                ts.append(&left.to_tokens(dialect));
                ts.space();
                ts.push(binary_op_to_token(*op));
                ts.space();
                ts.append(&right.to_tokens(dialect));
            }

            Expr::Not(expr) => {
                ts.push(Token::Not).space();
                ts.append(&expr.to_tokens(dialect));
            }

            Expr::Function {
                name,
                args,
                distinct,
            } => {
                ts.push(Token::FunctionName(name.clone()));
                ts.lparen();
                if *distinct {
                    ts.push(Token::Distinct).space();
                }
                comma_separated(&mut ts, args, dialect);
                ts.rparen();
            }

            Expr::In {
                expr,
                values,
                negated,
            } => {
                // "x IN ()" is invalid SQL: an empty IN is FALSE, NOT IN is TRUE
                if values.is_empty() {
                    ts.push(if *negated { Token::True } else { Token::False });
                } else {
                    ts.append(&expr.to_tokens(dialect));
                    if *negated {
                        ts.space().push(Token::Not);
                    }
                    ts.space().push(Token::In).space().lparen();
                    comma_separated(&mut ts, values, dialect);
                    ts.rparen();
                }
            }

            Expr::Between { expr, low, high } => {
                ts.append(&expr.to_tokens(dialect));
                ts.space().push(Token::Between).space();
                ts.append(&low.to_tokens(dialect));
                ts.space().push(Token::And).space();
                ts.append(&high.to_tokens(dialect));
            }

            Expr::IsNull { expr, negated } => {
                ts.append(&expr.to_tokens(dialect));
                ts.space();
                ts.push(if *negated {
                    Token::IsNotNull
                } else {
                    Token::IsNull
                });
            }

            Expr::Like {
                expr,
                pattern,
                escape,
            } => {
                ts.append(&expr.to_tokens(dialect));
                ts.space().push(Token::Like).space();
                ts.append(&pattern.to_tokens(dialect));
                if let Some(c) = escape {
                    ts.space().push(Token::Escape).space();
                    ts.push(Token::LitString(c.to_string()));
                }
            }

            Expr::MatchAgainst { columns, query } => {
                ts.push(Token::Match).space().lparen();
                comma_separated(&mut ts, columns, dialect);
                ts.rparen().space().push(Token::Against).space().lparen();
                ts.append(&query.to_tokens(dialect));
                ts.space().push(Token::InBooleanMode).rparen();
            }

            Expr::Exists(query) => {
                ts.push(Token::Exists).space().lparen();
                ts.append(&query.to_tokens(dialect));
                ts.rparen();
            }

            Expr::Paren(expr) => {
                ts.lparen();
                ts.append(&expr.to_tokens(dialect));
                ts.rparen();
            }

            Expr::Raw(sql) => {
                ts.push(Token::Raw(sql.clone()));
            }
        }

        ts
    }

    /// Join predicates with AND, parenthesizing OR branches. `None` when empty.
    pub fn conjunction(predicates: Vec<Expr>) -> Option<Expr> {
        predicates
            .into_iter()
            .map(Expr::parenthesize_or)
            .reduce(|acc, p| acc.and(p))
    }

    /// Join predicates with OR. `None` when empty.
    pub fn disjunction(predicates: Vec<Expr>) -> Option<Expr> {
        predicates.into_iter().reduce(|acc, p| acc.or(p))
    }

    fn parenthesize_or(self) -> Expr {
        match self {
            Expr::BinaryOp {
                op: BinaryOperator::Or,
                ..
            } => Expr::Paren(Box::new(self)),
            other => other,
        }
    }
}

// =============================================================================
// Constructors
// =============================================================================

/// Create a qualified column reference: `table.column`.
pub fn table_col(table: &str, column: &str) -> Expr {
    Expr::Column {
        table: Some(table.into()),
        column: column.into(),
    }
}

/// Create a bound parameter.
pub fn param(value: impl Into<SqlValue>) -> Expr {
    Expr::Param(value.into())
}

/// Create a function call.
pub fn func(name: &str, args: Vec<Expr>) -> Expr {
    Expr::Function {
        name: name.into(),
        args,
        distinct: false,
    }
}

/// COUNT(DISTINCT expr)
pub fn count_distinct(expr: Expr) -> Expr {
    Expr::Function {
        name: "COUNT".into(),
        args: vec![expr],
        distinct: true,
    }
}

/// Trusted raw SQL. Never pass user input.
pub fn raw_sql(sql: &str) -> Expr {
    Expr::Raw(sql.into())
}

// =============================================================================
// Fluent extension trait
// =============================================================================

/// Fluent builders for predicates.
pub trait ExprExt: Sized {
    fn into_expr(self) -> Expr;

    fn binary(self, op: BinaryOperator, other: impl Into<Expr>) -> Expr {
        Expr::BinaryOp {
            left: Box::new(self.into_expr()),
            op,
            right: Box::new(other.into()),
        }
    }

    fn eq(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Eq, other)
    }

    fn ne(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Ne, other)
    }

    fn gt(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Gt, other)
    }

    fn gte(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Gte, other)
    }

    fn lt(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Lt, other)
    }

    fn lte(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Lte, other)
    }

    fn and(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::And, other)
    }

    fn or(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Or, other)
    }

    fn like(self, pattern: impl Into<Expr>) -> Expr {
        Expr::Like {
            expr: Box::new(self.into_expr()),
            pattern: Box::new(pattern.into()),
            escape: None,
        }
    }

    /// `LIKE` whose pattern escapes wildcards with `escape`.
    fn like_escaped(self, pattern: impl Into<Expr>, escape: char) -> Expr {
        Expr::Like {
            expr: Box::new(self.into_expr()),
            pattern: Box::new(pattern.into()),
            escape: Some(escape),
        }
    }

    fn in_list(self, values: Vec<Expr>) -> Expr {
        Expr::In {
            expr: Box::new(self.into_expr()),
            values,
            negated: false,
        }
    }

    fn between(self, low: impl Into<Expr>, high: impl Into<Expr>) -> Expr {
        Expr::Between {
            expr: Box::new(self.into_expr()),
            low: Box::new(low.into()),
            high: Box::new(high.into()),
        }
    }

    fn is_null(self) -> Expr {
        Expr::IsNull {
            expr: Box::new(self.into_expr()),
            negated: false,
        }
    }

    fn is_not_null(self) -> Expr {
        Expr::IsNull {
            expr: Box::new(self.into_expr()),
            negated: true,
        }
    }
}

impl ExprExt for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

impl From<SqlValue> for Expr {
    fn from(value: SqlValue) -> Self {
        Expr::Param(value)
    }
}

impl From<i64> for Expr {
    fn from(n: i64) -> Self {
        Expr::Int(n)
    }
}

impl From<bool> for Expr {
    fn from(b: bool) -> Self {
        Expr::Bool(b)
    }
}
