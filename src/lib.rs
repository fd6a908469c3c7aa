//! # Procgraph - Node-graph Engine for Procedural Content
//!
//! Procgraph is the graph engine shared by every procedural graph dialect:
//! compositing graphs, function sub-graphs, FxMap scatter graphs and
//! material graphs. It keeps a typed, acyclic graph valid under incremental
//! edits and provides the structural algorithms authoring tools need.
//!
//! ## Features
//!
//! - **Validated edits**: every connection is checked for membership, pin
//!   existence, type compatibility and cycle safety before it is committed
//! - **Deterministic order**: a stable topological sort for evaluation and
//!   serialization
//! - **Iteration**: clone a node or connected pattern N times and chain the
//!   generations together
//! - **Pruning**: drop nodes and graph inputs that cannot reach an output
//!
//! ## Quick Start
//!
//! ```rust
//! use procgraph::prelude::*;
//!
//! let catalog = DefinitionCatalog::with_builtins().into_shared();
//! let mut graph = Graph::new(catalog);
//!
//! let noise = graph.create_node("perlin_noise", Position::default()).unwrap();
//! let blur = graph.create_node("blur", Position::new(150.0, 0.0, 0.0)).unwrap();
//! let output = graph.create_node("output", Position::new(300.0, 0.0, 0.0)).unwrap();
//!
//! graph.connect(noise, None, blur, "input").unwrap();
//! graph.connect(blur, None, output, "input").unwrap();
//!
//! // Three more blurs between the first one and the output.
//! let clones = PatternIterator::iterate(
//!     &mut graph,
//!     &[blur],
//!     3,
//!     None,
//!     None,
//!     &IterationOptions::default(),
//! )
//! .unwrap();
//! assert_eq!(clones.len(), 3);
//! assert_eq!(graph.topological_order().unwrap().len(), 6);
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: pin types, values, definitions, ids, errors and configuration
//! - [`catalog`]: the read-only table of node definitions
//! - [`graph`]: the node arena, ordering, pruning, iteration and snapshots
//! - [`validation`]: the connection gate and the invariant audit

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod core;
pub mod graph;
pub mod validation;

/// Prelude module for convenient imports.
///
/// Import everything commonly needed with:
/// ```rust
/// use procgraph::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::core::types::{is_compatible, DynamicValue, PinType, Value};

    // Definitions
    pub use crate::core::node::{Dialect, NodeDefinition, NodeKind};
    pub use crate::core::pin::{ParameterDefinition, PinDefinition, PinDirection};

    // Errors and configuration
    pub use crate::core::config::EngineConfig;
    pub use crate::core::error::{
        ConnectionId, EngineError, EngineResult, GraphError, GraphId, GraphResult, NodeId,
    };

    // Catalog
    pub use crate::catalog::registry::{CatalogBuilder, DefinitionCatalog};

    // Graph
    pub use crate::graph::connection::{Connected, Connection};
    pub use crate::graph::document::GraphDocument;
    pub use crate::graph::iteration::{ChainLink, IterationOptions, PatternIterator};
    pub use crate::graph::pruning::{PruneReport, ReachabilityPruner};
    pub use crate::graph::structure::{Frame, Graph, GraphNode, GraphReference, InputParameter, Position};
    pub use crate::graph::topology::{TopologicalSorter, TopologyAnalyzer};

    // Validation
    pub use crate::validation::audit::{AuditReport, AuditViolation, InvariantAudit};
    pub use crate::validation::connection::{ConnectionPlan, ConnectionValidator};
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
        assert_eq!(super::NAME, "procgraph");
    }

    #[test]
    fn test_compositing_session() {
        let catalog = DefinitionCatalog::with_builtins().into_shared();
        let mut graph = Graph::new(catalog);

        let color = graph.create_node("input_color", Position::default()).unwrap();
        let noise = graph.create_node("perlin_noise", Position::default()).unwrap();
        let blend = graph.create_node("blend", Position::default()).unwrap();
        let output = graph.create_node("output", Position::default()).unwrap();

        graph.connect(color, None, blend, "source").unwrap();
        graph.connect(noise, None, blend, "destination").unwrap();
        graph.connect(noise, None, blend, "opacity").unwrap();
        graph.connect(blend, None, output, "input").unwrap();

        // A color entry cannot feed a grayscale-only input.
        let result = graph.connect(color, None, blend, "opacity");
        assert!(matches!(result, Err(GraphError::IncompatibleType { .. })));

        assert!(ReachabilityPruner::new(&graph).unreachable_nodes().is_empty());
        assert!(InvariantAudit::new(&graph).run().is_clean());
    }

    #[test]
    fn test_function_graph_needs_explicit_expansion() {
        let catalog = DefinitionCatalog::with_builtins().into_shared();
        let mut graph = Graph::new(catalog);

        let x = graph.create_node("const_float1", Position::default()).unwrap();
        let swizzle = graph.create_node("swizzle1", Position::default()).unwrap();
        let add = graph.create_node("add", Position::default()).unwrap();
        let flag = graph.create_node("const_bool", Position::default()).unwrap();

        let vector = graph.create_node("vector2", Position::default()).unwrap();
        graph.connect(x, None, vector, "x").unwrap();
        graph.connect(vector, None, swizzle, "vector").unwrap();
        graph.connect(swizzle, None, add, "a").unwrap();
        assert!(matches!(
            graph.connect(flag, None, add, "b"),
            Err(GraphError::IncompatibleType { .. })
        ));

        graph.declare_output(add).unwrap();
        assert_eq!(graph.declared_outputs(), vec![add]);
        let report = ReachabilityPruner::prune(&mut graph).unwrap();
        assert_eq!(report.removed_nodes, vec![flag]);
    }
}
