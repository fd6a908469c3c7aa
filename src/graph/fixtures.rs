//! Shared test fixtures: a small scalar catalog and graph builders.

use crate::catalog::registry::{CatalogBuilder, DefinitionCatalog};
use crate::core::config::EngineConfig;
use crate::core::error::NodeId;
use crate::core::node::{Dialect, NodeDefinition, NodeKind};
use crate::core::pin::{ParameterDefinition, PinDefinition};
use crate::core::types::{PinType, Value};
use crate::graph::structure::{Graph, Position};
use std::sync::Arc;

pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Catalog of Float1 nodes:
/// - `source`: constant with one output `out` and an unused `seed` input
/// - `scalar`: inputs `in` (Float1) and `boolIn` (Boolean), output `out`
/// - `sink`: output placeholder with input `in`, forwarded to `out`
/// - `pair`: two Float1 inputs `a`, `b`, output `out`
/// - `input`: input placeholder with output `out`
/// - `merge`: variadic `items` input, output `out`
pub(crate) fn scalar_catalog() -> Arc<DefinitionCatalog> {
    let definitions = vec![
        NodeDefinition::builder("source", "A", Dialect::Function)
            .kind(NodeKind::Constant)
            .input(PinDefinition::input("seed", PinType::FLOAT1))
            .output(PinDefinition::output("out", PinType::FLOAT1))
            .build(),
        NodeDefinition::builder("scalar", "B", Dialect::Function)
            .input(PinDefinition::input("in", PinType::FLOAT1))
            .input(PinDefinition::input("boolIn", PinType::BOOLEAN))
            .output(PinDefinition::output("out", PinType::FLOAT1))
            .parameter(ParameterDefinition::new("gain", PinType::FLOAT1, Value::Float(1.0)))
            .parameter(ParameterDefinition::new("index", PinType::INTEGER1, Value::Int(0)))
            .parameter(ParameterDefinition::random_seed("randomseed"))
            .build(),
        NodeDefinition::builder("sink", "C", Dialect::Function)
            .kind(NodeKind::Output)
            .input(PinDefinition::input("in", PinType::FLOAT1))
            .output(PinDefinition::output("out", PinType::FLOAT1))
            .build(),
        NodeDefinition::builder("pair", "Pair", Dialect::Function)
            .input(PinDefinition::input("a", PinType::FLOAT1))
            .input(PinDefinition::input("b", PinType::FLOAT1))
            .output(PinDefinition::output("out", PinType::FLOAT1))
            .build(),
        NodeDefinition::builder("input", "Input", Dialect::Function)
            .kind(NodeKind::Input)
            .output(PinDefinition::output("out", PinType::FLOAT1))
            .build(),
        NodeDefinition::builder("merge", "Merge", Dialect::Function)
            .input(PinDefinition::input("items", PinType::FLOAT1).variadic())
            .output(PinDefinition::output("out", PinType::FLOAT1))
            .build(),
    ];

    let mut builder = CatalogBuilder::new().with_builtins(false);
    for definition in definitions {
        builder = builder.register(definition).expect("fixture ids are unique");
    }
    builder.build()
}

pub(crate) fn scalar_graph() -> Graph {
    Graph::with_config(scalar_catalog(), EngineConfig::new().with_random_seed(7))
}

/// Build A -> B -> C and return the three ids.
pub(crate) fn chain_abc(graph: &mut Graph) -> (NodeId, NodeId, NodeId) {
    let a = graph.create_node("source", Position::new(0.0, 0.0, 0.0)).unwrap();
    let b = graph.create_node("scalar", Position::new(150.0, 0.0, 0.0)).unwrap();
    let c = graph.create_node("sink", Position::new(300.0, 0.0, 0.0)).unwrap();
    graph.connect(a, None, b, "in").unwrap();
    graph.connect(b, None, c, "in").unwrap();
    (a, b, c)
}
