//! Scope-visibility predicate and the narrowing of the scope criterion.

use std::collections::BTreeSet;

use crate::search::FieldValue;

/// Read access of the current principal over scopes (usually projects).
///
/// The principal is carried by the implementation.
pub trait ScopeSecurity {
    fn can_read(&self, scope_id: i64, scope_type: &str) -> bool;

    /// Every scope the principal may read.
    fn readable_scope_ids(&self) -> Vec<i64>;
}

/// A fixed set of readable scopes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticScopeSecurity {
    readable: BTreeSet<i64>,
}

impl StaticScopeSecurity {
    pub fn new(readable: impl IntoIterator<Item = i64>) -> Self {
        Self {
            readable: readable.into_iter().collect(),
        }
    }
}

impl ScopeSecurity for StaticScopeSecurity {
    fn can_read(&self, scope_id: i64, _scope_type: &str) -> bool {
        self.readable.contains(&scope_id)
    }

    fn readable_scope_ids(&self) -> Vec<i64> {
        self.readable.iter().copied().collect()
    }
}

/// Restrict a scope selection to what the principal may read.
///
/// An empty selection widens to every readable scope. Unreadable or
/// non-numeric identifiers are dropped with a warning. Returns `None` when
/// the field is not a selection.
pub(super) fn narrow(
    key: &str,
    value: &FieldValue,
    security: &dyn ScopeSecurity,
    scope_type: &str,
) -> Option<FieldValue> {
    let selection = value.selection()?;

    let ids: Vec<String> = if selection.is_empty() {
        security
            .readable_scope_ids()
            .into_iter()
            .map(|id| id.to_string())
            .collect()
    } else {
        selection
            .iter()
            .filter(|raw| match raw.trim().parse::<i64>() {
                Ok(id) if security.can_read(id, scope_type) => true,
                Ok(id) => {
                    tracing::warn!(key, scope_id = id, scope_type, "dropping unreadable scope");
                    false
                }
                Err(_) => {
                    tracing::warn!(key, raw = raw.as_str(), "dropping non-numeric scope id");
                    false
                }
            })
            .map(|raw| raw.trim().to_string())
            .collect()
    };

    Some(match value {
        FieldValue::Multilist { .. } => FieldValue::Multilist { values: ids },
        _ => FieldValue::List { values: ids },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(v: &FieldValue) -> Vec<String> {
        v.selection().unwrap().to_vec()
    }

    #[test]
    fn test_empty_selection_widens() {
        let security = StaticScopeSecurity::new([3, 1, 2]);
        let narrowed = narrow("project.id", &FieldValue::list(Vec::<String>::new()), &security, "PROJECT")
            .unwrap();
        assert_eq!(values(&narrowed), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_unreadable_ids_dropped() {
        let security = StaticScopeSecurity::new([1, 2]);
        let narrowed = narrow(
            "project.id",
            &FieldValue::list(["2", "7", "x", " 1 "]),
            &security,
            "PROJECT",
        )
        .unwrap();
        assert_eq!(values(&narrowed), vec!["2", "1"]);
    }

    #[test]
    fn test_everything_rejected_stays_empty() {
        let security = StaticScopeSecurity::new([1]);
        let narrowed = narrow("project.id", &FieldValue::list(["9"]), &security, "PROJECT").unwrap();
        assert!(values(&narrowed).is_empty());
    }

    #[test]
    fn test_multilist_kind_kept() {
        let security = StaticScopeSecurity::new([1]);
        let narrowed = narrow(
            "project.id",
            &FieldValue::Multilist { values: vec!["1".into()] },
            &security,
            "PROJECT",
        )
        .unwrap();
        assert!(matches!(narrowed, FieldValue::Multilist { .. }));
    }

    #[test]
    fn test_non_selection_is_none() {
        let security = StaticScopeSecurity::new([1]);
        assert!(narrow("project.id", &FieldValue::single("1"), &security, "PROJECT").is_none());
    }
}
