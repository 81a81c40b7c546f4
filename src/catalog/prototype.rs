//! Column prototypes - the catalog entries.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::types::{ColumnRole, ColumnType, DataType, EntityType, SpecializedEntityType};

/// One selectable, filterable or orderable logical attribute.
///
/// Prototypes are reference data: the compiler only looks them up by label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPrototype {
    pub id: u32,
    /// Unique wire-level name.
    pub label: String,
    pub column_type: ColumnType,
    pub specialized_type: SpecializedEntityType,
    pub data_type: DataType,
    pub roles: BTreeSet<ColumnRole>,
    /// Absent exactly when `column_type` is `Entity`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_name: Option<String>,
    /// Exposed to end users for ad-hoc query construction.
    #[serde(default = "default_business")]
    pub business: bool,
}

fn default_business() -> bool {
    true
}

impl ColumnPrototype {
    pub fn entity_type(&self) -> EntityType {
        self.specialized_type.entity_type
    }

    pub fn allows(&self, role: ColumnRole) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_extension(&self) -> bool {
        self.column_type == ColumnType::Extension
    }

    pub fn is_entity(&self) -> bool {
        self.column_type == ColumnType::Entity
    }

    /// Check the shape rules a prototype must satisfy to enter a catalog.
    pub(crate) fn shape_error(&self) -> Option<String> {
        if self.label.trim().is_empty() {
            return Some("label is empty".into());
        }
        if self.roles.is_empty() {
            return Some("no allowed roles".into());
        }
        match (self.column_type, &self.attribute_name) {
            (ColumnType::Entity, Some(attr)) => {
                Some(format!("entity column carries attribute '{}'", attr))
            }
            (ColumnType::Entity, None) => None,
            (_, None) => Some("attribute name is required".into()),
            (_, Some(_)) => None,
        }
    }
}
