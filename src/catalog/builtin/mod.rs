//! Built-in node definitions.
//!
//! A representative slice of every dialect's node table. Tools load their
//! full tables from their own resource files and register them next to (or
//! instead of) these.

mod compositing;
mod function;
mod fxmap;
mod material;

use crate::catalog::registry::DefinitionCatalog;
use crate::core::node::NodeDefinition;
use log::warn;

/// Register all built-in definitions.
pub fn register_all(catalog: &mut DefinitionCatalog) {
    compositing::register(catalog);
    function::register(catalog);
    fxmap::register(catalog);
    material::register(catalog);
}

/// Register one definition, keeping any definition already registered under its id.
fn register_or_keep(catalog: &mut DefinitionCatalog, definition: NodeDefinition) {
    if let Err(err) = catalog.register(definition) {
        warn!("Skipping built-in definition: {}", err);
    }
}
