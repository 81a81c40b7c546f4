//! Column catalog and compatibility matrix.
//!
//! The catalog is loaded once and consulted read-only; it is `Send + Sync`
//! and shared across compilations behind a plain reference.
//!
//! ```text
//! label ──lookup──▶ ColumnPrototype { column_type, specialized_type, data_type, roles }
//!                                         │
//!                    compat::is_legal(role, data_type, operation)
//! ```

pub mod compat;
mod extension;
mod prototype;
mod seed;
pub mod types;

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use serde::Deserialize;

pub use compat::{is_legal, legal_operations};
pub use extension::{ExtensionFieldProvider, MappedExtensionProvider};
pub use prototype::ColumnPrototype;
pub use types::{
    ColumnRole, ColumnType, DataType, EntityRole, EntityType, Operation, SortDirection,
    SpecializedEntityType,
};

/// Errors raised while building or querying a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Unknown column: '{0}'")]
    UnknownColumn(String),

    #[error("Duplicate column label: '{0}'")]
    DuplicateLabel(String),

    #[error("Duplicate column id {id} ('{label}')")]
    DuplicateId { id: u32, label: String },

    #[error("Invalid column '{label}': {reason}")]
    InvalidPrototype { label: String, reason: String },

    #[error("Failed to read catalog file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse catalog file: {0}")]
    ParseError(#[from] toml::de::Error),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

static BUILTIN: LazyLock<Catalog> = LazyLock::new(|| Catalog::index(seed::prototypes()));

/// Registry of column prototypes, indexed by label.
#[derive(Debug, Clone)]
pub struct Catalog {
    columns: Vec<Arc<ColumnPrototype>>,
    by_label: HashMap<String, usize>,
}

/// On-disk catalog layout.
///
/// ```toml
/// [[columns]]
/// id = 1
/// label = "TEST_CASE_NAME"
/// column_type = "ATTRIBUTE"
/// specialized_type = { entity_type = "TEST_CASE" }
/// data_type = "STRING"
/// roles = ["AXIS", "FILTER"]
/// attribute_name = "name"
/// ```
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    columns: Vec<ColumnPrototype>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate labels/ids and malformed prototypes.
    pub fn new(columns: Vec<ColumnPrototype>) -> CatalogResult<Self> {
        let mut ids = HashMap::new();
        let mut labels = HashMap::new();

        for column in &columns {
            if let Some(reason) = column.shape_error() {
                return Err(CatalogError::InvalidPrototype {
                    label: column.label.clone(),
                    reason,
                });
            }
            if labels.insert(column.label.as_str(), ()).is_some() {
                return Err(CatalogError::DuplicateLabel(column.label.clone()));
            }
            if ids.insert(column.id, ()).is_some() {
                return Err(CatalogError::DuplicateId {
                    id: column.id,
                    label: column.label.clone(),
                });
            }
        }

        Ok(Self::index(columns))
    }

    fn index(columns: Vec<ColumnPrototype>) -> Self {
        let columns: Vec<_> = columns.into_iter().map(Arc::new).collect();
        let by_label = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.label.clone(), i))
            .collect();
        Self { columns, by_label }
    }

    /// The process-wide built-in catalog.
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    /// Parse a catalog from TOML.
    pub fn from_toml_str(content: &str) -> CatalogResult<Self> {
        let file: CatalogFile = toml::from_str(content)?;
        Self::new(file.columns)
    }

    /// Load a catalog from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> CatalogResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Look up a prototype by label.
    pub fn lookup(&self, label: &str) -> CatalogResult<&Arc<ColumnPrototype>> {
        self.get(label)
            .ok_or_else(|| CatalogError::UnknownColumn(label.to_string()))
    }

    pub fn get(&self, label: &str) -> Option<&Arc<ColumnPrototype>> {
        self.by_label.get(label).map(|&i| &self.columns[i])
    }

    pub fn contains(&self, label: &str) -> bool {
        self.by_label.contains_key(label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ColumnPrototype>> {
        self.columns.iter()
    }

    /// Prototypes exposed to end users.
    pub fn business_columns(&self) -> impl Iterator<Item = &Arc<ColumnPrototype>> {
        self.columns.iter().filter(|c| c.business)
    }

    /// Prototypes belonging to one entity kind, in catalog order.
    pub fn columns_of(&self, entity: EntityType) -> impl Iterator<Item = &Arc<ColumnPrototype>> {
        self.columns
            .iter()
            .filter(move |c| c.entity_type() == entity)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
