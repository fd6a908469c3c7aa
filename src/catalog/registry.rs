//! Node definition catalog.
//!
//! The catalog is populated once, before any graph is built, and is read-only
//! afterwards. Graphs hold it behind an `Arc`, so independent graphs on
//! separate threads can share one catalog without locking.

use crate::core::error::{GraphError, GraphResult};
use crate::core::node::{Dialect, NodeDefinition};
use indexmap::IndexMap;
use std::sync::Arc;

/// Catalog of every node kind known to the engine.
#[derive(Debug, Clone, Default)]
pub struct DefinitionCatalog {
    /// Definitions indexed by their unique ID.
    definitions: IndexMap<String, NodeDefinition>,
    /// Definition IDs grouped by dialect.
    dialects: IndexMap<Dialect, Vec<String>>,
}

impl DefinitionCatalog {
    /// Create a new empty catalog.
    pub fn new() -> Self {
        Self {
            definitions: IndexMap::new(),
            dialects: IndexMap::new(),
        }
    }

    /// Create a catalog pre-populated with the built-in definitions.
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        crate::catalog::builtin::register_all(&mut catalog);
        catalog
    }

    /// Register a definition.
    ///
    /// Fails with `DuplicateIdentifier` when the id is already taken.
    pub fn register(&mut self, definition: NodeDefinition) -> GraphResult<()> {
        if self.definitions.contains_key(&definition.id) {
            return Err(GraphError::DuplicateIdentifier(definition.id));
        }

        let id = definition.id.clone();
        let dialect = definition.dialect;
        self.definitions.insert(id.clone(), definition);
        self.dialects.entry(dialect).or_default().push(id);
        Ok(())
    }

    /// Look up a definition by ID.
    pub fn lookup(&self, id: &str) -> Option<&NodeDefinition> {
        self.definitions.get(id)
    }

    /// Look up a definition, failing with `UnknownDefinition`.
    pub fn require(&self, id: &str) -> GraphResult<&NodeDefinition> {
        self.lookup(id)
            .ok_or_else(|| GraphError::UnknownDefinition(id.to_string()))
    }

    /// Check if a definition is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    /// Get all registered definition IDs.
    pub fn definition_ids(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(|s| s.as_str())
    }

    /// Get definition IDs of one dialect.
    pub fn definitions_in(&self, dialect: Dialect) -> Vec<&str> {
        self.dialects
            .get(&dialect)
            .map(|ids| ids.iter().map(|s| s.as_str()).collect())
            .unwrap_or_default()
    }

    /// Search definitions by id, name, description or tag.
    pub fn search(&self, query: &str) -> Vec<&str> {
        let query = query.to_lowercase();

        self.definitions
            .iter()
            .filter(|(_, def)| {
                def.id.to_lowercase().contains(&query)
                    || def.name.to_lowercase().contains(&query)
                    || def.description.to_lowercase().contains(&query)
                    || def.tags.iter().any(|t| t.to_lowercase().contains(&query))
            })
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Get the total number of registered definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Freeze the catalog for sharing between graphs.
    pub fn into_shared(self) -> Arc<DefinitionCatalog> {
        Arc::new(self)
    }
}

/// Builder for a customized catalog.
pub struct CatalogBuilder {
    catalog: DefinitionCatalog,
    include_builtins: bool,
}

impl CatalogBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            catalog: DefinitionCatalog::new(),
            include_builtins: true,
        }
    }

    /// Include or exclude built-in definitions.
    pub fn with_builtins(mut self, include: bool) -> Self {
        self.include_builtins = include;
        self
    }

    /// Register a custom definition.
    pub fn register(mut self, definition: NodeDefinition) -> GraphResult<Self> {
        self.catalog.register(definition)?;
        Ok(self)
    }

    /// Build the shared catalog.
    pub fn build(mut self) -> Arc<DefinitionCatalog> {
        if self.include_builtins {
            crate::catalog::builtin::register_all(&mut self.catalog);
        }
        self.catalog.into_shared()
    }
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::node::NodeKind;
    use crate::core::pin::PinDefinition;
    use crate::core::types::PinType;

    fn dot() -> NodeDefinition {
        NodeDefinition::builder("dot", "Dot", Dialect::Compositing)
            .kind(NodeKind::Passthrough)
            .description("Forwards its input")
            .input(PinDefinition::input("input", PinType::ENTRY_VARIANT))
            .output(PinDefinition::output("output", PinType::ENTRY_VARIANT))
            .tags(["routing"])
            .build()
    }

    #[test]
    fn test_register_and_lookup() {
        let mut catalog = DefinitionCatalog::new();
        catalog.register(dot()).unwrap();

        assert!(catalog.contains("dot"));
        assert_eq!(catalog.lookup("dot").unwrap().name, "Dot");
        assert!(catalog.lookup("missing").is_none());
        assert!(matches!(
            catalog.require("missing"),
            Err(GraphError::UnknownDefinition(_))
        ));
    }

    #[test]
    fn test_duplicate_registration() {
        let mut catalog = DefinitionCatalog::new();
        catalog.register(dot()).unwrap();

        let result = catalog.register(dot());
        assert_eq!(result, Err(GraphError::DuplicateIdentifier("dot".to_string())));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_dialect_grouping_and_search() {
        let mut catalog = DefinitionCatalog::new();
        catalog.register(dot()).unwrap();

        assert_eq!(catalog.definitions_in(Dialect::Compositing), vec!["dot"]);
        assert!(catalog.definitions_in(Dialect::Function).is_empty());
        assert_eq!(catalog.search("ROUT"), vec!["dot"]);
        assert!(catalog.search("nonexistent").is_empty());
    }

    #[test]
    fn test_builder() {
        let catalog = CatalogBuilder::new()
            .with_builtins(false)
            .register(dot())
            .unwrap()
            .build();
        assert_eq!(catalog.len(), 1);

        let catalog = CatalogBuilder::new().build();
        assert!(catalog.contains("blend"));
    }
}
