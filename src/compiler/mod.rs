//! Search-Model-to-Query compiler.
//!
//! Turns a [`SearchRequest`] into a [`QueryModel`] plus the special-handler
//! instructions the execution adapter applies afterwards.
//!
//! ```text
//! SearchRequest ─┬─ 1. narrow scope criterion   (ScopeSecurity)
//!                ├─ 2. projections              (root entity + sort columns)
//!                ├─ 3. filters                  (form / extension mappings)
//!                ├─ 4. orderings                (result mapping)
//!                └─ 5. validate + emit          → CompiledSearch
//! ```
//!
//! A compiler borrows every input and holds no per-request state; one
//! instance may compile any number of requests.

mod filters;
mod security;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::catalog::{
    Catalog, CatalogError, ColumnPrototype, EntityType, ExtensionFieldProvider,
    MappedExtensionProvider, SortDirection,
};
use crate::config::CompilerSettings;
use crate::mapping::{ColumnMappings, MappingError, Resolution};
use crate::model::{
    ColumnRef, FilterColumn, ModelError, OrderingColumn, ProjectionColumn, QueryModel,
    QueryStrategy,
};
use crate::search::{FieldValue, SearchRequest, SortEntry};

pub use security::{ScopeSecurity, StaticScopeSecurity};

/// Errors raised while compiling a search.
///
/// All of them are caller-contract violations: a criteria model and mapping
/// tables that do not belong together.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Unsupported field kind {kind} for key '{key}'")]
    UnsupportedFieldKind { key: String, kind: String },

    #[error("Invalid date format: '{0}'")]
    InvalidDateFormat(String),
}

pub type CompileResult<T> = Result<T, CompileError>;

/// The vocabulary of one search screen.
#[derive(Debug, Clone)]
pub struct SearchDomain<H> {
    /// Entity every result row is about.
    pub root: EntityType,
    /// Search form keys.
    pub form: ColumnMappings<H>,
    /// Result table keys, used by the sort.
    pub result: ColumnMappings<H>,
    /// Custom field kind (`CF_LIST`, `TAGS`, ...) → extension slot label.
    pub extensions: ColumnMappings<H>,
}

/// A special filter instruction, applied by the adapter after compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecialFilter<H> {
    pub key: String,
    pub handler: H,
    pub value: FieldValue,
}

/// A special ordering instruction, appended after the generic orderings.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecialOrder<H> {
    pub key: String,
    pub handler: H,
    pub direction: SortDirection,
}

/// Output of one compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSearch<H> {
    pub model: QueryModel,
    pub special_filters: Vec<SpecialFilter<H>>,
    pub special_orders: Vec<SpecialOrder<H>>,
}

/// Compiles search requests of one domain.
pub struct SearchCompiler<'a, H> {
    catalog: &'a Catalog,
    domain: &'a SearchDomain<H>,
    security: &'a dyn ScopeSecurity,
    extensions: Box<dyn ExtensionFieldProvider + 'a>,
    settings: CompilerSettings,
}

impl<'a, H: Clone> SearchCompiler<'a, H> {
    pub fn new(
        catalog: &'a Catalog,
        domain: &'a SearchDomain<H>,
        security: &'a dyn ScopeSecurity,
    ) -> Self {
        Self {
            catalog,
            domain,
            security,
            extensions: Box::new(MappedExtensionProvider::new(
                catalog,
                domain.extensions.labels(),
            )),
            settings: CompilerSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: CompilerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replace the custom-field resolution backed by the extension mapping.
    pub fn with_extension_provider(mut self, provider: impl ExtensionFieldProvider + 'a) -> Self {
        self.extensions = Box::new(provider);
        self
    }

    pub fn compile(&self, request: &SearchRequest) -> CompileResult<CompiledSearch<H>> {
        let scoped = self.narrow_scope(request)?;

        let projections = self.projections(&request.sort)?;
        let (filters, special_filters) = self.filters(request, &scoped)?;
        let (orderings, special_orders) = self.orderings(&request.sort)?;

        let model = QueryModel {
            strategy: QueryStrategy::Main,
            join_style: self.settings.join_style,
            aggregations: Vec::new(),
            filters,
            projections,
            orderings,
        };
        model.validate()?;

        tracing::debug!(
            root = %self.domain.root,
            projections = model.projections.len(),
            filters = model.filters.len(),
            orderings = model.orderings.len(),
            special_filters = special_filters.len(),
            special_orders = special_orders.len(),
            "compiled search"
        );

        Ok(CompiledSearch {
            model,
            special_filters,
            special_orders,
        })
    }

    // =========================================================================
    // Step 1: scope narrowing
    // =========================================================================

    fn narrow_scope(&self, request: &SearchRequest) -> CompileResult<BTreeMap<String, FieldValue>> {
        let scope = &self.settings.scope;
        let mut scoped = BTreeMap::new();

        for (key, value) in &request.criteria {
            if !scope.key.matches(key) {
                continue;
            }
            let narrowed = security::narrow(key, value, self.security, &scope.scope_type)
                .ok_or_else(|| CompileError::UnsupportedFieldKind {
                    key: key.clone(),
                    kind: value.kind().to_string(),
                })?;
            scoped.insert(key.clone(), narrowed);
        }

        Ok(scoped)
    }

    // =========================================================================
    // Step 2: projections
    // =========================================================================

    fn projections(&self, sort: &[SortEntry]) -> CompileResult<Vec<ProjectionColumn>> {
        let root = self.lookup(&self.domain.root.entity_label())?;
        let mut projections = vec![ProjectionColumn::new(root)];

        for entry in sort {
            let Resolution::Label(label) = self.domain.result.resolve(&entry.key)? else {
                continue;
            };
            let column = self.lookup(label)?;
            if !projections.iter().any(|p| p.column.same_column(&column)) {
                projections.push(ProjectionColumn::new(column));
            }
        }

        // Keep the fetch tuple at two or more columns
        if projections.len() == 1 {
            let placeholder = self.lookup(&self.domain.root.id_label())?;
            projections.push(ProjectionColumn::new(placeholder));
        }

        Ok(projections)
    }

    // =========================================================================
    // Step 3: filters
    // =========================================================================

    fn filters(
        &self,
        request: &SearchRequest,
        scoped: &BTreeMap<String, FieldValue>,
    ) -> CompileResult<(Vec<FilterColumn>, Vec<SpecialFilter<H>>)> {
        let mut generic = Vec::new();
        let mut special = Vec::new();

        for (key, original) in &request.criteria {
            let is_scope = scoped.contains_key(key);
            let value = scoped.get(key).unwrap_or(original);

            if !value.is_set() && !is_scope {
                tracing::trace!(key = key.as_str(), "skipping unset criterion");
                continue;
            }

            if self.domain.form.is_special_key(key) {
                tracing::trace!(key = key.as_str(), "forwarding special filter");
                special.push(SpecialFilter {
                    key: key.clone(),
                    handler: self.domain.form.resolve_handler(key)?.clone(),
                    value: value.clone(),
                });
                continue;
            }

            if let FieldValue::Unknown = value {
                return Err(CompileError::UnsupportedFieldKind {
                    key: key.clone(),
                    kind: value.kind().to_string(),
                });
            }

            let column = self.filter_column(key, value)?;
            tracing::trace!(key = key.as_str(), column = %column, kind = value.kind(), "resolved criterion");
            if let Some(filter) = filters::synthesize(key, column, value, &self.settings)? {
                generic.push(filter);
            }
        }

        Ok((generic, special))
    }

    fn filter_column(&self, key: &str, value: &FieldValue) -> CompileResult<ColumnRef> {
        match value.cuf_id() {
            Some(cuf_id) => {
                let slot = self.extensions.resolve(value.kind(), cuf_id)?;
                Ok(ColumnRef::extension(slot, cuf_id))
            }
            None => {
                let label = self.domain.form.resolve_label(key)?;
                self.lookup(label)
            }
        }
    }

    // =========================================================================
    // Step 4: orderings
    // =========================================================================

    fn orderings(
        &self,
        sort: &[SortEntry],
    ) -> CompileResult<(Vec<OrderingColumn>, Vec<SpecialOrder<H>>)> {
        let mut generic = Vec::new();
        let mut special = Vec::new();

        for entry in sort {
            match self.domain.result.resolve(&entry.key)? {
                Resolution::Label(label) => {
                    generic.push(OrderingColumn::new(self.lookup(label)?, entry.direction));
                }
                Resolution::Handler(handler) => special.push(SpecialOrder {
                    key: entry.key.clone(),
                    handler: handler.clone(),
                    direction: entry.direction,
                }),
            }
        }

        Ok((generic, special))
    }

    fn lookup(&self, label: &str) -> CompileResult<ColumnRef> {
        let prototype: &Arc<ColumnPrototype> = self.catalog.lookup(label)?;
        Ok(ColumnRef::new(Arc::clone(prototype)))
    }
}
