//! Physical bindings: where each entity, attribute and custom field lives.
//!
//! ```toml
//! root = "test_case"
//!
//! [entities.test_case]
//! table = "test_case"
//! id = "tcln_id"
//! columns = { name = "name", reference = "reference" }
//!
//! [entities."project@test_case_project"]
//! table = "project"
//! id = "project_id"
//! parent = { entity = "test_case", local = "project_id", remote = "project_id" }
//!
//! [calculated]
//! TEST_CASE_STEPCOUNT = "(SELECT COUNT(*) FROM test_case_steps s WHERE s.test_case_id = {alias}.tcln_id)"
//!
//! [custom_fields]
//! table = "custom_field_value"
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{AdapterError, AdapterResult};

/// Bindings of one search domain.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SqlBindings {
    /// Alias of the root entity; every join chain ends here.
    pub root: String,

    /// Specialized entity alias → table binding.
    pub entities: BTreeMap<String, EntityBinding>,

    /// Calculated prototype label → trusted SQL template.
    ///
    /// `{alias}` is replaced by the quoted alias of the prototype's entity.
    #[serde(default)]
    pub calculated: BTreeMap<String, String>,

    #[serde(default)]
    pub custom_fields: Option<CustomFieldBinding>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EntityBinding {
    pub table: String,

    #[serde(default = "default_id")]
    pub id: String,

    /// Attribute name → column.
    #[serde(default)]
    pub columns: BTreeMap<String, String>,

    /// How to reach this entity from one closer to the root.
    #[serde(default)]
    pub parent: Option<JoinBinding>,
}

fn default_id() -> String {
    "id".to_string()
}

/// `this.local = parent.remote`, optionally through a link table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct JoinBinding {
    /// Alias of the parent entity.
    pub entity: String,
    pub local: String,
    pub remote: String,
    #[serde(default)]
    pub via: Option<LinkTable>,
}

/// A many-to-many link: `link.parent_column = parent.remote` and
/// `this.local = link.child_column`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LinkTable {
    pub table: String,
    pub parent_column: String,
    pub child_column: String,
}

/// Storage of custom field values.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CustomFieldBinding {
    pub table: String,
    pub id_column: String,
    pub entity_column: String,
    /// Discriminates the entity kind a value is bound to.
    pub entity_type_column: Option<String>,
    pub field_column: String,
    pub value_column: String,
    /// Numeric copy of the value, compared for numeric fields.
    pub numeric_value_column: Option<String>,
    pub tags: Option<TagTable>,
}

impl Default for CustomFieldBinding {
    fn default() -> Self {
        Self {
            table: "custom_field_value".into(),
            id_column: "cfv_id".into(),
            entity_column: "bound_entity_id".into(),
            entity_type_column: Some("bound_entity_type".into()),
            field_column: "cf_id".into(),
            value_column: "value".into(),
            numeric_value_column: Some("numeric_value".into()),
            tags: Some(TagTable::default()),
        }
    }
}

/// Tag values, one row per tag of a custom field value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TagTable {
    pub table: String,
    /// References [`CustomFieldBinding::id_column`].
    pub value_column: String,
    pub label_column: String,
}

impl Default for TagTable {
    fn default() -> Self {
        Self {
            table: "custom_field_value_option".into(),
            value_column: "cfv_id".into(),
            label_column: "label".into(),
        }
    }
}

impl SqlBindings {
    /// Parse bindings from TOML.
    pub fn from_toml_str(content: &str) -> AdapterResult<Self> {
        let bindings: SqlBindings = toml::from_str(content)?;
        bindings.entity(&bindings.root)?;
        Ok(bindings)
    }

    /// Load bindings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> AdapterResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn entity(&self, alias: &str) -> AdapterResult<&EntityBinding> {
        self.entities
            .get(alias)
            .ok_or_else(|| AdapterError::MissingBinding(format!("entity '{}'", alias)))
    }

    /// Physical column of an attribute.
    pub fn column(&self, alias: &str, attribute: &str) -> AdapterResult<&str> {
        self.entity(alias)?
            .columns
            .get(attribute)
            .map(String::as_str)
            .ok_or_else(|| AdapterError::MissingBinding(format!("attribute '{}.{}'", alias, attribute)))
    }

    pub fn custom_fields(&self) -> AdapterResult<&CustomFieldBinding> {
        self.custom_fields
            .as_ref()
            .ok_or_else(|| AdapterError::MissingBinding("custom fields".into()))
    }

    /// Aliases from the root (excluded) down to `alias` (included).
    pub fn join_chain<'a>(&'a self, alias: &'a str) -> AdapterResult<Vec<&'a str>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = alias;

        while current != self.root {
            if !seen.insert(current) {
                return Err(self.no_path(alias));
            }
            let binding = self.entity(current)?;
            let parent = binding.parent.as_ref().ok_or_else(|| self.no_path(alias))?;
            chain.push(current);
            current = parent.entity.as_str();
        }

        chain.reverse();
        Ok(chain)
    }

    fn no_path(&self, alias: &str) -> AdapterError {
        AdapterError::NoJoinPath {
            from: self.root.clone(),
            to: alias.to_string(),
        }
    }
}
