//! Column Mapping Tables: context-specific key → label / handler dictionaries.
//!
//! One table exists per context (search form, result table, custom field
//! types). A key lives in at most one of the two dictionaries; the builder
//! rejects a second registration of the same key.

use std::collections::BTreeMap;
use std::fmt;

/// Errors raised by mapping tables.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingError {
    #[error("Unmapped key: '{0}'")]
    UnmappedKey(String),

    #[error("Key '{0}' is already mapped")]
    ConflictingKey(String),
}

pub type MappingResult<T> = Result<T, MappingError>;

/// What a key resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a, H> {
    Label(&'a str),
    Handler(&'a H),
}

/// A finished mapping table, generic over the special handler type.
#[derive(Clone)]
pub struct ColumnMappings<H> {
    labels: BTreeMap<String, String>,
    handlers: BTreeMap<String, H>,
}

impl<H> fmt::Debug for ColumnMappings<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnMappings")
            .field("labels", &self.labels)
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<H> Default for ColumnMappings<H> {
    fn default() -> Self {
        Self {
            labels: BTreeMap::new(),
            handlers: BTreeMap::new(),
        }
    }
}

impl<H> ColumnMappings<H> {
    pub fn builder() -> MappingsBuilder<H> {
        MappingsBuilder {
            mappings: ColumnMappings::default(),
            conflict: None,
        }
    }

    /// The key resolves to a catalog label.
    pub fn is_mapped_key(&self, key: &str) -> bool {
        self.labels.contains_key(key)
    }

    /// The key resolves to a special handler.
    pub fn is_special_key(&self, key: &str) -> bool {
        self.handlers.contains_key(key)
    }

    pub fn resolve_label(&self, key: &str) -> MappingResult<&str> {
        self.labels
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| MappingError::UnmappedKey(key.to_string()))
    }

    pub fn resolve_handler(&self, key: &str) -> MappingResult<&H> {
        self.handlers
            .get(key)
            .ok_or_else(|| MappingError::UnmappedKey(key.to_string()))
    }

    pub fn resolve(&self, key: &str) -> MappingResult<Resolution<'_, H>> {
        if let Some(label) = self.labels.get(key) {
            return Ok(Resolution::Label(label));
        }
        self.handlers
            .get(key)
            .map(Resolution::Handler)
            .ok_or_else(|| MappingError::UnmappedKey(key.to_string()))
    }

    /// The key → label dictionary.
    pub fn labels(&self) -> &BTreeMap<String, String> {
        &self.labels
    }
}

/// Append-only builder for [`ColumnMappings`].
///
/// The first conflicting registration is remembered and reported by
/// [`build`](MappingsBuilder::build), so calls can be chained.
#[must_use = "builders have no effect until used"]
pub struct MappingsBuilder<H> {
    mappings: ColumnMappings<H>,
    conflict: Option<String>,
}

impl<H> MappingsBuilder<H> {
    pub fn map(mut self, key: impl Into<String>, label: impl Into<String>) -> Self {
        let key = key.into();
        if self.taken(&key) {
            self.conflict.get_or_insert(key);
        } else {
            self.mappings.labels.insert(key, label.into());
        }
        self
    }

    pub fn map_handler(mut self, key: impl Into<String>, handler: H) -> Self {
        let key = key.into();
        if self.taken(&key) {
            self.conflict.get_or_insert(key);
        } else {
            self.mappings.handlers.insert(key, handler);
        }
        self
    }

    fn taken(&self, key: &str) -> bool {
        self.mappings.is_mapped_key(key) || self.mappings.is_special_key(key)
    }

    pub fn build(self) -> MappingResult<ColumnMappings<H>> {
        match self.conflict {
            Some(key) => Err(MappingError::ConflictingKey(key)),
            None => Ok(self.mappings),
        }
    }
}
