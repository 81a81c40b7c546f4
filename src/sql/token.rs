//! SQL Tokens - the atomic units of SQL output.
//!
//! Tokens are dialect-agnostic representations that serialize
//! to dialect-specific strings. Bound parameters travel inside the
//! stream and are numbered in output order when it is rendered.

use super::dialect::{Dialect, SqlDialect};
use super::value::SqlValue;

/// SQL Token - every element the adapter emits.
///
/// Adding a new variant here will cause compile errors everywhere
/// it needs to be handled (exhaustive matching).
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // === Keywords ===
    Select,
    Distinct,
    From,
    Where,
    And,
    Or,
    Not,
    As,
    On,
    Join,
    Inner,
    Left,
    GroupBy,
    OrderBy,
    Asc,
    Desc,
    Limit,
    Offset,
    In,
    Between,
    Like,
    Escape,
    IsNull,
    IsNotNull,
    Exists,
    Match,
    Against,
    InBooleanMode,
    True,
    False,

    // === Punctuation ===
    Comma,
    Dot,
    LParen,
    RParen,

    // === Operators ===
    Eq,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,
    /// Postgres text-search match `@@`.
    TextMatch,

    // === Whitespace / Formatting ===
    Space,
    Newline,
    Indent(usize),

    // === Dynamic Content ===
    /// Simple identifier (table, column, alias)
    Ident(String),
    /// Integer literal
    LitInt(i64),
    /// String literal
    LitString(String),
    /// Bound parameter, rendered as the dialect's placeholder.
    Param(SqlValue),
    /// Function name, rendered upper-case
    FunctionName(String),

    // === Escape Hatch ===
    /// Raw SQL passed directly to output without escaping.
    ///
    /// # Security Warning
    ///
    /// **Never pass user input to this variant.** Only bindings-provided
    /// fragments (calculated column templates, handler expressions) go here.
    /// User values are always [`Token::Param`].
    Raw(String),
}

impl Token {
    /// Serialize this token to a string for the given dialect.
    ///
    /// `param_index` is the 1-based position used if this is a parameter.
    pub fn serialize(&self, dialect: Dialect, param_index: usize) -> String {
        match self {
            // Keywords
            Token::Select => "SELECT".into(),
            Token::Distinct => "DISTINCT".into(),
            Token::From => "FROM".into(),
            Token::Where => "WHERE".into(),
            Token::And => "AND".into(),
            Token::Or => "OR".into(),
            Token::Not => "NOT".into(),
            Token::As => "AS".into(),
            Token::On => "ON".into(),
            Token::Join => "JOIN".into(),
            Token::Inner => "INNER".into(),
            Token::Left => "LEFT".into(),
            Token::GroupBy => "GROUP BY".into(),
            Token::OrderBy => "ORDER BY".into(),
            Token::Asc => "ASC".into(),
            Token::Desc => "DESC".into(),
            Token::Limit => "LIMIT".into(),
            Token::Offset => "OFFSET".into(),
            Token::In => "IN".into(),
            Token::Between => "BETWEEN".into(),
            Token::Like => "LIKE".into(),
            Token::Escape => "ESCAPE".into(),
            Token::IsNull => "IS NULL".into(),
            Token::IsNotNull => "IS NOT NULL".into(),
            Token::Exists => "EXISTS".into(),
            Token::Match => "MATCH".into(),
            Token::Against => "AGAINST".into(),
            Token::InBooleanMode => "IN BOOLEAN MODE".into(),
            Token::True => dialect.format_bool(true).into(),
            Token::False => dialect.format_bool(false).into(),

            // Punctuation
            Token::Comma => ",".into(),
            Token::Dot => ".".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),

            // Operators
            Token::Eq => "=".into(),
            Token::Ne => "<>".into(),
            Token::Lt => "<".into(),
            Token::Gt => ">".into(),
            Token::Lte => "<=".into(),
            Token::Gte => ">=".into(),
            Token::TextMatch => "@@".into(),

            // Whitespace
            Token::Space => " ".into(),
            Token::Newline => "\n".into(),
            Token::Indent(n) => "  ".repeat(*n),

            // Dynamic - dialect-specific formatting
            Token::Ident(name) => dialect.quote_identifier(name),
            Token::LitInt(n) => n.to_string(),
            Token::LitString(s) => dialect.quote_string(s),
            Token::Param(_) => dialect.placeholder(param_index),
            Token::FunctionName(name) => name.to_uppercase(),

            // Escape hatch
            Token::Raw(s) => s.clone(),
        }
    }
}

/// A rendered statement: SQL text plus its parameters in placeholder order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// A stream of tokens that can be serialized to SQL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Create an empty token stream.
    pub fn new() -> Self {
        Self { tokens: vec![] }
    }

    /// Push a single token.
    pub fn push(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self
    }

    /// Append another token stream.
    pub fn append(&mut self, other: &TokenStream) -> &mut Self {
        self.tokens.extend(other.tokens.iter().cloned());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Render to SQL, numbering parameters from 1 in output order.
    pub fn render(&self, dialect: Dialect) -> Statement {
        let mut statement = Statement::default();
        for token in &self.tokens {
            if let Token::Param(value) = token {
                statement.params.push(value.clone());
            }
            statement
                .sql
                .push_str(&token.serialize(dialect, statement.params.len()));
        }
        statement
    }

    /// Serialize all tokens to a SQL string, dropping parameter values.
    pub fn serialize(&self, dialect: Dialect) -> String {
        self.render(dialect).sql
    }

    // Convenience methods for common tokens
    pub fn space(&mut self) -> &mut Self {
        self.push(Token::Space)
    }
    pub fn newline(&mut self) -> &mut Self {
        self.push(Token::Newline)
    }
    pub fn indent(&mut self, n: usize) -> &mut Self {
        self.push(Token::Indent(n))
    }
    pub fn comma(&mut self) -> &mut Self {
        self.push(Token::Comma)
    }
    pub fn lparen(&mut self) -> &mut Self {
        self.push(Token::LParen)
    }
    pub fn rparen(&mut self) -> &mut Self {
        self.push(Token::RParen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_serialize() {
        assert_eq!(Token::Select.serialize(Dialect::DuckDb, 0), "SELECT");
        assert_eq!(Token::GroupBy.serialize(Dialect::MySql, 0), "GROUP BY");
    }

    #[test]
    fn test_ident_serialize() {
        let tok = Token::Ident("test_case".into());
        assert_eq!(tok.serialize(Dialect::DuckDb, 0), "\"test_case\"");
        assert_eq!(tok.serialize(Dialect::MySql, 0), "`test_case`");
    }

    #[test]
    fn test_bool_follows_dialect() {
        assert_eq!(Token::False.serialize(Dialect::Postgres, 0), "false");
        assert_eq!(Token::False.serialize(Dialect::MySql, 0), "0");
    }

    #[test]
    fn test_params_are_numbered_in_order() {
        let mut ts = TokenStream::new();
        ts.push(Token::Ident("a".into()))
            .space()
            .push(Token::Eq)
            .space()
            .push(Token::Param(SqlValue::Int(1)))
            .space()
            .push(Token::And)
            .space()
            .push(Token::Ident("b".into()))
            .space()
            .push(Token::Eq)
            .space()
            .push(Token::Param(SqlValue::Text("x".into())));

        let pg = ts.render(Dialect::Postgres);
        assert_eq!(pg.sql, "\"a\" = $1 AND \"b\" = $2");
        assert_eq!(pg.params, vec![SqlValue::Int(1), SqlValue::Text("x".into())]);

        let my = ts.render(Dialect::MySql);
        assert_eq!(my.sql, "`a` = ? AND `b` = ?");
        assert_eq!(my.params.len(), 2);
    }
}
