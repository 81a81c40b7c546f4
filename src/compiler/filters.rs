//! Filter synthesis: one field value becomes at most one filter usage.

use std::fmt::Write;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::{NoExpand, Regex};

use super::{CompileError, CompileResult};
use crate::catalog::{DataType, Operation};
use crate::config::CompilerSettings;
use crate::model::{ColumnRef, FilterColumn};
use crate::search::literal::{self, Bound};
use crate::search::FieldValue;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Build the filter for `value` over `column`.
///
/// `None` when the value carries nothing to filter on.
pub(super) fn synthesize(
    key: &str,
    column: ColumnRef,
    value: &FieldValue,
    settings: &CompilerSettings,
) -> CompileResult<Option<FilterColumn>> {
    let filter = match value {
        FieldValue::Single { value } | FieldValue::CfSingle { value, .. } => {
            let operation = if column.prototype.data_type == DataType::Numeric {
                Operation::Equals
            } else {
                Operation::Like
            };
            Some(FilterColumn::new(column, operation, [value.trim()]))
        }

        FieldValue::Text { value } => {
            let separator = format!(" {} ", settings.fulltext_or_token);
            let query = WHITESPACE.replace_all(value.trim(), NoExpand(&separator));
            Some(FilterColumn::new(column, Operation::Fulltext, [query]))
        }

        FieldValue::Tags {
            tags, operation, ..
        } => {
            // AND and OR both compile to membership
            tracing::debug!(key, combinator = ?operation, "tags compile to IN");
            Some(FilterColumn::new(column, Operation::In, tags.iter().cloned()))
        }

        FieldValue::List { values }
        | FieldValue::Multilist { values }
        | FieldValue::CfList { values, .. }
        | FieldValue::CfCheckbox { values, .. } => {
            Some(FilterColumn::new(column, Operation::In, values.iter().cloned()))
        }

        FieldValue::Range { min, max } => range(
            column,
            min.map(|n| n.to_string()),
            max.map(|n| n.to_string()),
        ),

        FieldValue::NumericRange { min, max } | FieldValue::CfNumericRange { min, max, .. } => {
            range(
                column,
                decimal_bound(key, min.as_deref(), Bound::Min),
                decimal_bound(key, max.as_deref(), Bound::Max),
            )
        }

        FieldValue::TimeInterval {
            start_date,
            end_date,
        }
        | FieldValue::CfTimeInterval {
            start_date,
            end_date,
            ..
        } => range(
            column,
            start_date
                .map(|d| format_date(d, &settings.date_format))
                .transpose()?,
            end_date
                .map(|d| format_date(d, &settings.date_format))
                .transpose()?,
        ),

        FieldValue::Unknown => {
            return Err(CompileError::UnsupportedFieldKind {
                key: key.to_string(),
                kind: value.kind().to_string(),
            })
        }
    };

    Ok(filter)
}

/// BETWEEN, >= or <= depending on which bounds are present.
fn range(column: ColumnRef, low: Option<String>, high: Option<String>) -> Option<FilterColumn> {
    match (low, high) {
        (Some(low), Some(high)) => Some(FilterColumn::new(column, Operation::Between, [low, high])),
        (Some(low), None) => Some(FilterColumn::new(column, Operation::GreaterEqual, [low])),
        (None, Some(high)) => Some(FilterColumn::new(column, Operation::LowerEqual, [high])),
        (None, None) => None,
    }
}

/// A decimal bound; blank is absent, garbage becomes the bound's infinity.
fn decimal_bound(key: &str, raw: Option<&str>, bound: Bound) -> Option<String> {
    let raw = raw.map(str::trim).filter(|r| !r.is_empty())?;
    Some(literal::normalize_decimal(raw).unwrap_or_else(|| {
        tracing::warn!(key, raw, ?bound, "unparsable numeric bound, using infinity");
        bound.infinity().to_string()
    }))
}

fn format_date(date: NaiveDate, format: &str) -> CompileResult<String> {
    let mut out = String::new();
    write!(out, "{}", date.format(format))
        .map_err(|_| CompileError::InvalidDateFormat(format.to_string()))?;
    Ok(out)
}
