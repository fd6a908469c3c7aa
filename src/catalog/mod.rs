//! Node definition catalog.
//!
//! The catalog is the read-only table of node kinds a graph binds its nodes
//! to. Graphs receive it as an injected `Arc<DefinitionCatalog>` rather than
//! reaching for a global, which keeps tests hermetic.

pub mod builtin;
pub mod registry;

pub use registry::{CatalogBuilder, DefinitionCatalog};
