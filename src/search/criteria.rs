//! Search criteria: typed field values keyed by form key.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::SortDirection;

/// Form key → field value. Keys iterate in sorted order.
pub type SearchCriteria = BTreeMap<String, FieldValue>;

/// Combinator of a TAGS field. Both compile to membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TagsOperation {
    And,
    #[default]
    Or,
}

/// One search form field, tagged by kind.
///
/// `CF_*` kinds and `TAGS` designate a custom field by numeric id; the
/// form key they are stored under carries no meaning for resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldValue {
    Single {
        value: String,
    },
    Text {
        value: String,
    },
    List {
        #[serde(default)]
        values: Vec<String>,
    },
    Multilist {
        #[serde(default)]
        values: Vec<String>,
    },
    /// Integer range.
    Range {
        min: Option<i64>,
        max: Option<i64>,
    },
    /// Decimal range; bounds are user text, `,` or `.` as separator.
    NumericRange {
        min: Option<String>,
        max: Option<String>,
    },
    TimeInterval {
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    },
    Tags {
        #[serde(default)]
        tags: Vec<String>,
        #[serde(default)]
        operation: TagsOperation,
        cuf_id: i64,
    },
    CfSingle {
        value: String,
        cuf_id: i64,
    },
    CfList {
        #[serde(default)]
        values: Vec<String>,
        cuf_id: i64,
    },
    CfCheckbox {
        #[serde(default)]
        values: Vec<String>,
        cuf_id: i64,
    },
    CfNumericRange {
        min: Option<String>,
        max: Option<String>,
        cuf_id: i64,
    },
    CfTimeInterval {
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        cuf_id: i64,
    },
    /// A kind this crate does not know. Compiling it is an error.
    #[serde(other)]
    Unknown,
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl FieldValue {
    /// Wire tag of this kind, also the key of the extension-type table.
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Single { .. } => "SINGLE",
            FieldValue::Text { .. } => "TEXT",
            FieldValue::List { .. } => "LIST",
            FieldValue::Multilist { .. } => "MULTILIST",
            FieldValue::Range { .. } => "RANGE",
            FieldValue::NumericRange { .. } => "NUMERIC_RANGE",
            FieldValue::TimeInterval { .. } => "TIME_INTERVAL",
            FieldValue::Tags { .. } => "TAGS",
            FieldValue::CfSingle { .. } => "CF_SINGLE",
            FieldValue::CfList { .. } => "CF_LIST",
            FieldValue::CfCheckbox { .. } => "CF_CHECKBOX",
            FieldValue::CfNumericRange { .. } => "CF_NUMERIC_RANGE",
            FieldValue::CfTimeInterval { .. } => "CF_TIME_INTERVAL",
            FieldValue::Unknown => "UNKNOWN",
        }
    }

    /// Custom field id for kinds that designate an extension column.
    pub fn cuf_id(&self) -> Option<i64> {
        match self {
            FieldValue::Tags { cuf_id, .. }
            | FieldValue::CfSingle { cuf_id, .. }
            | FieldValue::CfList { cuf_id, .. }
            | FieldValue::CfCheckbox { cuf_id, .. }
            | FieldValue::CfNumericRange { cuf_id, .. }
            | FieldValue::CfTimeInterval { cuf_id, .. } => Some(*cuf_id),
            _ => None,
        }
    }

    /// Whether the field constrains anything.
    ///
    /// Blank text, empty selections and ranges without bounds are unset.
    /// An unknown kind counts as set so that compiling it fails.
    pub fn is_set(&self) -> bool {
        match self {
            FieldValue::Single { value }
            | FieldValue::Text { value }
            | FieldValue::CfSingle { value, .. } => !value.trim().is_empty(),
            FieldValue::List { values }
            | FieldValue::Multilist { values }
            | FieldValue::CfList { values, .. }
            | FieldValue::CfCheckbox { values, .. } => !values.is_empty(),
            FieldValue::Tags { tags, .. } => !tags.is_empty(),
            FieldValue::Range { min, max } => min.is_some() || max.is_some(),
            FieldValue::NumericRange { min, max } | FieldValue::CfNumericRange { min, max, .. } => {
                has_text(min) || has_text(max)
            }
            FieldValue::TimeInterval {
                start_date,
                end_date,
            }
            | FieldValue::CfTimeInterval {
                start_date,
                end_date,
                ..
            } => start_date.is_some() || end_date.is_some(),
            FieldValue::Unknown => true,
        }
    }

    /// Selected values of a LIST or MULTILIST field.
    pub fn selection(&self) -> Option<&[String]> {
        match self {
            FieldValue::List { values } | FieldValue::Multilist { values } => Some(values),
            _ => None,
        }
    }

    pub fn single(value: impl Into<String>) -> Self {
        FieldValue::Single {
            value: value.into(),
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text {
            value: value.into(),
        }
    }

    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldValue::List {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn numeric_range(min: Option<&str>, max: Option<&str>) -> Self {
        FieldValue::NumericRange {
            min: min.map(String::from),
            max: max.map(String::from),
        }
    }
}

/// One requested sort entry, keyed in the result-table vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortEntry {
    pub key: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortEntry {
    pub fn new(key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: key.into(),
            direction,
        }
    }

    /// Parse `key` or `key:asc` / `key:desc`.
    pub fn parse(spec: &str) -> Option<Self> {
        match spec.rsplit_once(':') {
            Some((key, dir)) if !key.is_empty() => {
                SortDirection::from_str(dir).map(|d| SortEntry::new(key, d))
            }
            Some(_) => None,
            None if !spec.is_empty() => Some(SortEntry::new(spec, SortDirection::Asc)),
            None => None,
        }
    }
}

/// Criteria plus the requested sort: the full input of one compilation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    pub criteria: SearchCriteria,
    pub sort: Vec<SortEntry>,
}

impl SearchRequest {
    pub fn new(criteria: SearchCriteria) -> Self {
        Self {
            criteria,
            sort: Vec::new(),
        }
    }

    pub fn with_criterion(mut self, key: impl Into<String>, value: FieldValue) -> Self {
        self.criteria.insert(key.into(), value);
        self
    }

    pub fn sorted_by(mut self, entry: SortEntry) -> Self {
        self.sort.push(entry);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_tagged() {
        let criteria: SearchCriteria = serde_json::from_str(
            r#"{
                "name": {"type": "SINGLE", "value": "foo"},
                "age": {"type": "NUMERIC_RANGE", "min": "3,5", "max": null},
                "created": {"type": "TIME_INTERVAL", "start_date": "2024-01-31", "end_date": null},
                "tags": {"type": "TAGS", "tags": ["a"], "operation": "AND", "cuf_id": 9},
                "weird": {"type": "GEOLOCATION"}
            }"#,
        )
        .unwrap();

        assert_eq!(criteria["name"], FieldValue::single("foo"));
        assert_eq!(criteria["age"], FieldValue::numeric_range(Some("3,5"), None));
        assert_eq!(criteria["tags"].cuf_id(), Some(9));
        assert_eq!(criteria["weird"], FieldValue::Unknown);
        match &criteria["created"] {
            FieldValue::TimeInterval { start_date, .. } => {
                assert_eq!(*start_date, NaiveDate::from_ymd_opt(2024, 1, 31));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_unset_values() {
        assert!(!FieldValue::list(Vec::<String>::new()).is_set());
        assert!(!FieldValue::text("   ").is_set());
        assert!(!FieldValue::Range { min: None, max: None }.is_set());
        assert!(!FieldValue::numeric_range(Some(" "), None).is_set());
        assert!(FieldValue::numeric_range(Some("garbage"), None).is_set());
        assert!(FieldValue::Unknown.is_set());
    }

    #[test]
    fn test_sort_entry_parse() {
        assert_eq!(
            SortEntry::parse("name:desc"),
            Some(SortEntry::new("name", SortDirection::Desc))
        );
        assert_eq!(
            SortEntry::parse("name"),
            Some(SortEntry::new("name", SortDirection::Asc))
        );
        assert_eq!(SortEntry::parse("name:sideways"), None);
        assert_eq!(SortEntry::parse(":asc"), None);
    }
}
