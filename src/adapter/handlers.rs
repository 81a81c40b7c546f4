//! Special handlers: query transformations the generic model cannot express.

use std::fmt;
use std::sync::Arc;

use super::sql::typed_value;
use super::{AdapterError, AdapterResult};
use crate::catalog::DataType;
use crate::search::FieldValue;
use crate::sql::{param, raw_sql, table_col, Dialect, Expr, ExprExt, Query, SqlDialect, TableRef};

/// Where a handler's expression is spliced in.
#[derive(Debug, Clone, Copy)]
pub struct HandlerContext<'a> {
    pub dialect: Dialect,
    /// Alias of the root entity in the enclosing query.
    pub root_alias: &'a str,
    /// Identifier column of the root entity.
    pub root_id: &'a str,
}

impl HandlerContext<'_> {
    pub fn root_id_expr(&self) -> Expr {
        table_col(self.root_alias, self.root_id)
    }
}

/// A special handler of the SQL adapter.
///
/// A key used as a special filter calls [`SqlHandler::filter`]; a key used as a
/// special sort calls [`SqlHandler::order`].
pub trait SqlHandler: fmt::Debug + Send + Sync {
    /// Predicate restricting the root rows.
    fn filter(&self, ctx: &HandlerContext<'_>, key: &str, value: &FieldValue) -> AdapterResult<Expr> {
        let _ = (ctx, value);
        Err(AdapterError::Handler {
            key: key.to_string(),
            reason: "handler does not filter".into(),
        })
    }

    /// Expression the root rows are sorted by.
    fn order(&self, ctx: &HandlerContext<'_>, key: &str) -> AdapterResult<Expr> {
        let _ = ctx;
        Err(AdapterError::Handler {
            key: key.to_string(),
            reason: "handler does not order".into(),
        })
    }
}

/// Handler type carried by SQL search domains.
pub type SharedHandler = Arc<dyn SqlHandler>;

/// Keep root rows owning at least one child row whose value matches.
///
/// `EXISTS (SELECT 1 FROM table WHERE table.owner = root.id AND table.value IN (...))`
///
/// Values bind as `value_type`, [`DataType::String`] unless set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistsFilter {
    pub table: String,
    pub owner_column: String,
    pub value_column: String,
    pub value_type: DataType,
}

impl ExistsFilter {
    pub fn new(table: &str, owner_column: &str, value_column: &str) -> Self {
        Self {
            table: table.into(),
            owner_column: owner_column.into(),
            value_column: value_column.into(),
            value_type: DataType::String,
        }
    }

    pub fn with_value_type(mut self, value_type: DataType) -> Self {
        self.value_type = value_type;
        self
    }

    fn bind(&self, key: &str, raw: &str) -> AdapterResult<Expr> {
        typed_value(self.value_type, raw)
            .map(param)
            .map_err(|reason| AdapterError::Handler {
                key: key.to_string(),
                reason: format!("'{}' is {}", raw.trim(), reason),
            })
    }

    pub fn shared(self) -> SharedHandler {
        Arc::new(self)
    }
}

impl SqlHandler for ExistsFilter {
    fn filter(&self, ctx: &HandlerContext<'_>, key: &str, value: &FieldValue) -> AdapterResult<Expr> {
        const CHILD: &str = "child";
        let target = table_col(CHILD, &self.value_column);

        let predicate = match value {
            FieldValue::Single { value } => target.eq(self.bind(key, value)?),
            FieldValue::List { values }
            | FieldValue::Multilist { values }
            | FieldValue::CfList { values, .. }
            | FieldValue::CfCheckbox { values, .. } => target.in_list(
                values
                    .iter()
                    .map(|v| self.bind(key, v))
                    .collect::<AdapterResult<Vec<_>>>()?,
            ),
            other => {
                return Err(AdapterError::Handler {
                    key: key.to_string(),
                    reason: format!("cannot filter on {} values", other.kind()),
                })
            }
        };

        let child_rows = Query::new()
            .select(vec![Expr::Int(1)])
            .from(TableRef::new(&self.table).with_alias(CHILD))
            .filter(table_col(CHILD, &self.owner_column).eq(ctx.root_id_expr()))
            .filter(predicate);

        Ok(Expr::Exists(Box::new(child_rows)))
    }
}

/// Sort by a trusted SQL expression; `{alias}` names the root entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionOrder {
    pub template: String,
}

impl ExpressionOrder {
    pub fn new(template: &str) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn shared(self) -> SharedHandler {
        Arc::new(self)
    }
}

impl SqlHandler for ExpressionOrder {
    fn order(&self, ctx: &HandlerContext<'_>, _key: &str) -> AdapterResult<Expr> {
        let alias = ctx.dialect.quote_identifier(ctx.root_alias);
        Ok(raw_sql(&self.template.replace("{alias}", &alias)))
    }
}
