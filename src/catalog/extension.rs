//! Custom-field metadata: resolving a field type tag to an extension slot.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::prototype::ColumnPrototype;
use super::{Catalog, CatalogError, CatalogResult};

/// Resolves a user-defined field to the catalog slot that carries it.
///
/// The custom field's identity does not live on the prototype; callers keep
/// `cuf_id` on the column usage.
pub trait ExtensionFieldProvider {
    fn resolve(&self, kind: &str, cuf_id: i64) -> CatalogResult<Arc<ColumnPrototype>>;
}

/// Provider backed by a field-kind → label table and a catalog.
///
/// The table is usually the label dictionary of the extension-type
/// [`ColumnMappings`](crate::mapping::ColumnMappings).
#[derive(Debug, Clone, Copy)]
pub struct MappedExtensionProvider<'a> {
    catalog: &'a Catalog,
    labels: &'a BTreeMap<String, String>,
}

impl<'a> MappedExtensionProvider<'a> {
    pub fn new(catalog: &'a Catalog, labels: &'a BTreeMap<String, String>) -> Self {
        Self { catalog, labels }
    }
}

impl ExtensionFieldProvider for MappedExtensionProvider<'_> {
    fn resolve(&self, kind: &str, cuf_id: i64) -> CatalogResult<Arc<ColumnPrototype>> {
        let label = self.labels.get(kind).ok_or_else(|| {
            CatalogError::UnknownColumn(format!("{} (custom field {})", kind, cuf_id))
        })?;
        let prototype = self.catalog.lookup(label)?;
        if !prototype.is_extension() {
            return Err(CatalogError::InvalidPrototype {
                label: label.clone(),
                reason: format!("custom field kind '{}' must map to an extension column", kind),
            });
        }
        Ok(Arc::clone(prototype))
    }
}
