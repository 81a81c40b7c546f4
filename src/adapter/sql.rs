//! SQL execution adapter: renders a query model through [`SqlBindings`].

use std::collections::HashSet;

use super::bindings::SqlBindings;
use super::handlers::{HandlerContext, SharedHandler};
use super::{AdapterError, AdapterResult, ExecutionAdapter, Page};
use crate::catalog::{ColumnType, DataType, Operation, SortDirection};
use crate::compiler::{SpecialFilter, SpecialOrder};
use crate::model::{
    ColumnRef, FilterColumn, JoinStyle, ModelError, ProjectionColumn, QueryModel, QueryStrategy,
};
use crate::search::literal::{infinity_of, Bound};
use crate::sql::{
    count_distinct, func, param, raw_sql, table_col, DateBucket, Dialect, Expr, ExprExt, Join,
    JoinType, OrderByExpr, Query, SelectExpr, SqlDialect, SqlValue, Statement, TableRef,
};

/// Alias of the custom field value row inside an EXISTS sub-query.
const CFV: &str = "cfv";
/// Alias of the tag row inside an EXISTS sub-query.
const TAG: &str = "tag";
/// Escape character of LIKE patterns built from user text.
const LIKE_ESCAPE: char = '!';

/// A rendered fetch query, optionally paged.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchQuery {
    query: Query,
    dialect: Dialect,
}

impl FetchQuery {
    pub fn paged(mut self, page: Page) -> Self {
        self.query = self.query.limit(page.size).offset(page.offset());
        self
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn to_statement(&self) -> Statement {
        self.query.to_statement(self.dialect)
    }

    pub fn to_sql(&self) -> String {
        self.query.to_sql(self.dialect)
    }
}

/// Renders query models to parameterized SQL.
#[derive(Debug, Clone)]
pub struct SqlAdapter<'a> {
    bindings: &'a SqlBindings,
    dialect: Dialect,
    fulltext_or_token: String,
}

impl<'a> SqlAdapter<'a> {
    pub fn new(bindings: &'a SqlBindings, dialect: Dialect) -> Self {
        Self {
            bindings,
            dialect,
            fulltext_or_token: "or".to_string(),
        }
    }

    /// Token the compiler spliced between fulltext words.
    pub fn with_fulltext_or_token(mut self, token: &str) -> Self {
        self.fulltext_or_token = token.to_string();
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn renderer(&self, style: JoinStyle) -> Renderer<'_> {
        Renderer {
            bindings: self.bindings,
            dialect: self.dialect,
            or_token: &self.fulltext_or_token,
            join_type: match style {
                JoinStyle::Inner => JoinType::Inner,
                JoinStyle::Left => JoinType::Left,
            },
            joins: Vec::new(),
            joined: HashSet::new(),
        }
    }

    /// Only top-level models render as standalone statements.
    fn check(&self, model: &QueryModel) -> AdapterResult<()> {
        model.validate()?;
        match model.strategy {
            QueryStrategy::Main => Ok(()),
            other => Err(AdapterError::UnsupportedStrategy(other)),
        }
    }

    fn root(&self) -> AdapterResult<(TableRef, HandlerContext<'_>)> {
        let root = self.bindings.entity(&self.bindings.root)?;
        let table = TableRef::new(&root.table).with_alias(&self.bindings.root);
        let ctx = HandlerContext {
            dialect: self.dialect,
            root_alias: &self.bindings.root,
            root_id: &root.id,
        };
        Ok((table, ctx))
    }
}

impl ExecutionAdapter<SharedHandler> for SqlAdapter<'_> {
    type Fetch = FetchQuery;
    type Count = Statement;

    fn compile_fetch(
        &self,
        model: &QueryModel,
        filters: &[SpecialFilter<SharedHandler>],
        orders: &[SpecialOrder<SharedHandler>],
    ) -> AdapterResult<FetchQuery> {
        self.check(model)?;
        let (from, ctx) = self.root()?;
        let mut r = self.renderer(model.join_style);

        let mut select = model
            .projections
            .iter()
            .map(|p| Ok(SelectExpr::new(r.projection(p)?).with_alias(&p.column.to_string())))
            .collect::<AdapterResult<Vec<_>>>()?;

        let predicates = r.predicates(model, filters, &ctx)?;

        let group_by = model
            .aggregations
            .iter()
            .map(|a| {
                let expr = r.column(&a.column)?;
                apply(self.dialect, &a.column, expr, a.operation)
            })
            .collect::<AdapterResult<Vec<_>>>()?;

        let mut order_by = Vec::new();
        for ordering in &model.orderings {
            let projection = model
                .projections
                .iter()
                .find(|p| p.column.same_column(&ordering.column))
                .ok_or_else(|| ModelError::OrderingNotProjected(ordering.column.to_string()))?;
            order_by.push(sorted(r.projection(projection)?, ordering.direction));
        }
        for order in orders {
            let expr = order.handler.order(&ctx, &order.key)?;
            // DISTINCT requires ORDER BY expressions in the select list
            if !model.is_aggregated() {
                select.push(SelectExpr::new(expr.clone()).with_alias(&format!("order_{}", order.key)));
            }
            order_by.push(sorted(expr, order.direction));
        }

        let mut query = Query::new().distinct().select(select).from(from);
        if let Some(condition) = Expr::conjunction(predicates) {
            query = query.filter(condition);
        }
        query.joins = r.joins;
        let query = query.group_by(group_by).order_by(order_by);

        tracing::debug!(
            dialect = %self.dialect,
            joins = query.joins.len(),
            "rendered fetch query"
        );

        Ok(FetchQuery {
            query,
            dialect: self.dialect,
        })
    }

    fn compile_count(
        &self,
        model: &QueryModel,
        filters: &[SpecialFilter<SharedHandler>],
    ) -> AdapterResult<Statement> {
        self.check(model)?;
        let (from, ctx) = self.root()?;
        let mut r = self.renderer(model.join_style);

        let predicates = r.predicates(model, filters, &ctx)?;

        let mut query = Query::new()
            .select(vec![count_distinct(ctx.root_id_expr())])
            .from(from);
        if let Some(condition) = Expr::conjunction(predicates) {
            query = query.filter(condition);
        }
        query.joins = r.joins;

        tracing::debug!(dialect = %self.dialect, joins = query.joins.len(), "rendered count query");

        Ok(query.to_statement(self.dialect))
    }
}

/// Wrap a projected value in its aggregate or date bucket.
fn apply(dialect: Dialect, column: &ColumnRef, expr: Expr, operation: Operation) -> AdapterResult<Expr> {
    Ok(match operation {
        Operation::None => expr,
        Operation::Avg => func("AVG", vec![expr]),
        Operation::Count => func("COUNT", vec![expr]),
        Operation::Min => func("MIN", vec![expr]),
        Operation::Max => func("MAX", vec![expr]),
        Operation::Sum => func("SUM", vec![expr]),
        Operation::ByDay => dialect.date_bucket(DateBucket::Day, expr),
        Operation::ByWeek => dialect.date_bucket(DateBucket::Week, expr),
        Operation::ByMonth => dialect.date_bucket(DateBucket::Month, expr),
        Operation::ByYear => dialect.date_bucket(DateBucket::Year, expr),
        other => {
            return Err(AdapterError::UnsupportedOperation {
                column: column.to_string(),
                operation: other,
            })
        }
    })
}

fn sorted(expr: Expr, direction: SortDirection) -> OrderByExpr {
    match direction {
        SortDirection::Asc => OrderByExpr::asc(expr),
        SortDirection::Desc => OrderByExpr::desc(expr),
    }
}

// =============================================================================
// Rendering state of one query
// =============================================================================

struct Renderer<'a> {
    bindings: &'a SqlBindings,
    dialect: Dialect,
    or_token: &'a str,
    join_type: JoinType,
    joins: Vec<Join>,
    joined: HashSet<String>,
}

impl Renderer<'_> {
    /// Join every entity between the root and `alias`, once.
    fn join_to(&mut self, alias: &str) -> AdapterResult<()> {
        let bindings = self.bindings;
        for step in bindings.join_chain(alias)? {
            if !self.joined.insert(step.to_string()) {
                continue;
            }
            let entity = bindings.entity(step)?;
            let Some(parent) = entity.parent.as_ref() else {
                return Err(AdapterError::NoJoinPath {
                    from: bindings.root.clone(),
                    to: step.to_string(),
                });
            };

            let target = match &parent.via {
                Some(link) => {
                    let link_alias = format!("{}__link", step);
                    self.joins.push(Join {
                        join_type: self.join_type,
                        table: TableRef::new(&link.table).with_alias(&link_alias),
                        on: table_col(&link_alias, &link.parent_column)
                            .eq(table_col(&parent.entity, &parent.remote)),
                    });
                    table_col(&link_alias, &link.child_column)
                }
                None => table_col(&parent.entity, &parent.remote),
            };
            self.joins.push(Join {
                join_type: self.join_type,
                table: TableRef::new(&entity.table).with_alias(step),
                on: table_col(step, &parent.local).eq(target),
            });
        }
        Ok(())
    }

    /// Value expression of a column, joining what it needs.
    fn column(&mut self, column: &ColumnRef) -> AdapterResult<Expr> {
        let prototype = &column.prototype;
        let alias = prototype.specialized_type.alias();
        self.join_to(&alias)?;
        let bindings = self.bindings;

        match prototype.column_type {
            ColumnType::Entity => Ok(table_col(&alias, &bindings.entity(&alias)?.id)),
            ColumnType::Attribute => {
                let attribute = attribute_of(column)?;
                Ok(table_col(&alias, bindings.column(&alias, attribute)?))
            }
            ColumnType::Calculated => {
                let template = bindings.calculated.get(&prototype.label).ok_or_else(|| {
                    AdapterError::MissingBinding(format!("calculated column '{}'", prototype.label))
                })?;
                let quoted = self.dialect.quote_identifier(&alias);
                Ok(raw_sql(&template.replace("{alias}", &quoted)))
            }
            ColumnType::Extension => self.extension_value(column, &alias),
        }
    }

    /// LEFT JOIN the value row of one custom field.
    fn extension_value(&mut self, column: &ColumnRef, owner_alias: &str) -> AdapterResult<Expr> {
        let cuf_id = cuf_id_of(column)?;
        let cf = self.bindings.custom_fields()?;
        let owner = self.bindings.entity(owner_alias)?;
        let alias = format!("cuf_{}", cuf_id);

        if self.joined.insert(alias.clone()) {
            let mut on = vec![
                table_col(&alias, &cf.entity_column).eq(table_col(owner_alias, &owner.id)),
                table_col(&alias, &cf.field_column).eq(Expr::Int(cuf_id)),
            ];
            if let Some(type_column) = &cf.entity_type_column {
                on.push(
                    table_col(&alias, type_column)
                        .eq(Expr::Str(column.prototype.entity_type().as_str().into())),
                );
            }
            self.joins.push(Join {
                join_type: JoinType::Left,
                table: TableRef::new(&cf.table).with_alias(&alias),
                on: Expr::conjunction(on).unwrap_or(Expr::Bool(true)),
            });
        }

        let (value_column, _) = value_column(cf, column.prototype.data_type);
        Ok(table_col(&alias, value_column))
    }

    fn projection(&mut self, projection: &ProjectionColumn) -> AdapterResult<Expr> {
        let expr = self.column(&projection.column)?;
        apply(self.dialect, &projection.column, expr, projection.operation)
    }

    /// Generic filters then special filters, in model order.
    fn predicates(
        &mut self,
        model: &QueryModel,
        filters: &[SpecialFilter<SharedHandler>],
        ctx: &HandlerContext<'_>,
    ) -> AdapterResult<Vec<Expr>> {
        let mut predicates = Vec::with_capacity(model.filters.len() + filters.len());
        for filter in &model.filters {
            predicates.push(self.filter(filter)?);
        }
        for special in filters {
            predicates.push(special.handler.filter(ctx, &special.key, &special.value)?);
        }
        Ok(predicates)
    }

    fn filter(&mut self, filter: &FilterColumn) -> AdapterResult<Expr> {
        if filter.column.prototype.is_extension() {
            return self.extension_filter(filter);
        }
        let target = self.column(&filter.column)?;
        self.predicate(target, filter, filter.column.prototype.data_type)
    }

    /// `EXISTS` over the custom field value rows of the owning entity.
    fn extension_filter(&mut self, filter: &FilterColumn) -> AdapterResult<Expr> {
        let column = &filter.column;
        let cuf_id = cuf_id_of(column)?;
        let owner_alias = column.prototype.specialized_type.alias();
        self.join_to(&owner_alias)?;

        let bindings = self.bindings;
        let cf = bindings.custom_fields()?;
        let owner = bindings.entity(&owner_alias)?;

        let mut rows = Query::new()
            .select(vec![Expr::Int(1)])
            .from(TableRef::new(&cf.table).with_alias(CFV))
            .filter(table_col(CFV, &cf.entity_column).eq(table_col(&owner_alias, &owner.id)))
            .filter(table_col(CFV, &cf.field_column).eq(Expr::Int(cuf_id)));
        if let Some(type_column) = &cf.entity_type_column {
            rows = rows.filter(
                table_col(CFV, type_column).eq(Expr::Str(column.prototype.entity_type().as_str().into())),
            );
        }

        let predicate = if column.prototype.data_type == DataType::Tag {
            let tags = cf
                .tags
                .as_ref()
                .ok_or_else(|| AdapterError::MissingBinding("custom field tags".into()))?;
            rows = rows.join(
                JoinType::Inner,
                TableRef::new(&tags.table).with_alias(TAG),
                table_col(TAG, &tags.value_column).eq(table_col(CFV, &cf.id_column)),
            );
            self.predicate(table_col(TAG, &tags.label_column), filter, DataType::String)?
        } else {
            let (value_column, data_type) = value_column(cf, column.prototype.data_type);
            self.predicate(table_col(CFV, value_column), filter, data_type)?
        };

        Ok(Expr::Exists(Box::new(rows.filter(predicate))))
    }

    fn predicate(&self, target: Expr, filter: &FilterColumn, data_type: DataType) -> AdapterResult<Expr> {
        let first = || first_value(filter);
        let literal = |raw: &str| literal(filter, data_type, raw);

        Ok(match filter.operation {
            Operation::Equals => target.eq(param(literal(first()?)?)),
            Operation::NotEquals => target.ne(param(literal(first()?)?)),
            Operation::GreaterEqual => lower_bound(target, first()?, false, literal)?,
            Operation::Greater => lower_bound(target, first()?, true, literal)?,
            Operation::LowerEqual => upper_bound(target, first()?, false, literal)?,
            Operation::Lower => upper_bound(target, first()?, true, literal)?,
            Operation::Between => {
                let (low, high) = match filter.values.as_slice() {
                    [low, high] => (low.as_str(), high.as_str()),
                    _ => return Err(invalid(filter, "", "BETWEEN needs two values")),
                };
                match (infinity_of(low), infinity_of(high)) {
                    (None, None) => target.between(param(literal(low)?), param(literal(high)?)),
                    (Some(Bound::Min), Some(Bound::Max)) => target.is_not_null(),
                    _ => Expr::Paren(Box::new(
                        lower_bound(target.clone(), low, false, literal)?
                            .and(upper_bound(target, high, false, literal)?),
                    )),
                }
            }
            Operation::Like => func("LOWER", vec![target])
                .like_escaped(param(contains_pattern(first()?)), LIKE_ESCAPE),
            Operation::In => target.in_list(
                filter
                    .values
                    .iter()
                    .map(|v| literal(v.as_str()).map(param))
                    .collect::<AdapterResult<Vec<_>>>()?,
            ),
            Operation::Fulltext => {
                let text = first()?;
                match self.dialect.fulltext_match(target.clone(), param(text)) {
                    Some(expr) => expr,
                    None => self.fulltext_fallback(target, text),
                }
            }
            Operation::IsNull => target.is_null(),
            Operation::NotNull => target.is_not_null(),
            other => {
                return Err(AdapterError::UnsupportedOperation {
                    column: filter.column.to_string(),
                    operation: other,
                })
            }
        })
    }

    /// Any word matching, for dialects without a fulltext predicate.
    fn fulltext_fallback(&self, target: Expr, text: &str) -> Expr {
        let words = text
            .split_whitespace()
            .filter(|w| !w.eq_ignore_ascii_case(self.or_token))
            .map(|w| {
                func("LOWER", vec![target.clone()]).like_escaped(param(contains_pattern(w)), LIKE_ESCAPE)
            })
            .collect();
        match Expr::disjunction(words) {
            Some(any) => Expr::Paren(Box::new(any)),
            None => Expr::Bool(false),
        }
    }
}

/// `target >= value`; an infinite value is maximally permissive or restrictive.
fn lower_bound(
    target: Expr,
    raw: &str,
    strict: bool,
    literal: impl Fn(&str) -> AdapterResult<SqlValue>,
) -> AdapterResult<Expr> {
    Ok(match infinity_of(raw) {
        Some(Bound::Min) => target.is_not_null(),
        Some(Bound::Max) => Expr::Bool(false),
        None if strict => target.gt(param(literal(raw)?)),
        None => target.gte(param(literal(raw)?)),
    })
}

/// `target <= value`; an infinite value is maximally permissive or restrictive.
fn upper_bound(
    target: Expr,
    raw: &str,
    strict: bool,
    literal: impl Fn(&str) -> AdapterResult<SqlValue>,
) -> AdapterResult<Expr> {
    Ok(match infinity_of(raw) {
        Some(Bound::Max) => target.is_not_null(),
        Some(Bound::Min) => Expr::Bool(false),
        None if strict => target.lt(param(literal(raw)?)),
        None => target.lte(param(literal(raw)?)),
    })
}

fn first_value(filter: &FilterColumn) -> AdapterResult<&str> {
    filter
        .values
        .first()
        .map(String::as_str)
        .ok_or_else(|| invalid(filter, "", "missing value"))
}

/// Bind a user literal with the type of its column.
fn literal(filter: &FilterColumn, data_type: DataType, raw: &str) -> AdapterResult<SqlValue> {
    typed_value(data_type, raw).map_err(|reason| invalid(filter, raw.trim(), reason))
}

/// Parse `raw` as a value of `data_type`; the error is the reason it does not.
pub(super) fn typed_value(data_type: DataType, raw: &str) -> Result<SqlValue, &'static str> {
    let raw = raw.trim();
    match data_type {
        DataType::Numeric => raw
            .parse::<i64>()
            .map(SqlValue::Int)
            .or_else(|_| match raw.parse::<f64>() {
                Ok(x) if x.is_finite() => Ok(SqlValue::Float(x)),
                _ => Err("not a number"),
            }),
        DataType::Boolean => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(SqlValue::Bool(true)),
            "false" | "0" => Ok(SqlValue::Bool(false)),
            _ => Err("not a boolean"),
        },
        _ => Ok(SqlValue::Text(raw.to_string())),
    }
}

/// `%text%` lower-cased, with the LIKE wildcards of `text` escaped.
fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.to_lowercase().chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn invalid(filter: &FilterColumn, raw: &str, reason: &str) -> AdapterError {
    AdapterError::InvalidLiteral {
        column: filter.column.to_string(),
        value: raw.to_string(),
        reason: reason.to_string(),
    }
}

fn attribute_of(column: &ColumnRef) -> AdapterResult<&str> {
    column
        .prototype
        .attribute_name
        .as_deref()
        .ok_or_else(|| AdapterError::MissingBinding(format!("attribute of '{}'", column)))
}

fn cuf_id_of(column: &ColumnRef) -> AdapterResult<i64> {
    column
        .cuf_id
        .ok_or_else(|| ModelError::MissingExtensionId(column.label().to_string()).into())
}

/// Column holding a custom field value, and the type its literals bind as.
fn value_column(cf: &super::bindings::CustomFieldBinding, data_type: DataType) -> (&str, DataType) {
    match (&cf.numeric_value_column, data_type) {
        (Some(numeric), DataType::Numeric) => (numeric.as_str(), DataType::Numeric),
        _ => (cf.value_column.as_str(), DataType::String),
    }
}
