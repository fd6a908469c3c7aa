//! FxMap definitions: quad-tree scatter nodes.

use super::register_or_keep;
use crate::catalog::registry::DefinitionCatalog;
use crate::core::node::{Dialect, NodeDefinition, NodeKind};
use crate::core::pin::{ParameterDefinition, PinDefinition};
use crate::core::types::{PinType, Value};

/// Register FxMap definitions.
pub fn register(catalog: &mut DefinitionCatalog) {
    for definition in definitions() {
        register_or_keep(catalog, definition);
    }
}

fn definitions() -> Vec<NodeDefinition> {
    let child = PinType::ENTRY_VARIANT.optional();

    vec![
        NodeDefinition::builder("fx_quadrant", "Quadrant", Dialect::FxMap)
            .description("Splits its cell in four and scatters a pattern")
            .input(PinDefinition::input("input0", child))
            .input(PinDefinition::input("input1", child))
            .input(PinDefinition::input("input2", child))
            .input(PinDefinition::input("input3", child))
            .output(PinDefinition::output("output", PinType::ENTRY_VARIANT))
            .parameter(ParameterDefinition::new("patterntype", PinType::INTEGER1, Value::Int(1)))
            .parameter(ParameterDefinition::random_seed("randomseed"))
            .build(),
        NodeDefinition::builder("fx_switch", "Switch", Dialect::FxMap)
            .input(PinDefinition::input("input_true", child))
            .input(PinDefinition::input("input_false", child))
            .output(PinDefinition::output("output", PinType::ENTRY_VARIANT))
            .parameter(ParameterDefinition::new("switch", PinType::BOOLEAN, Value::Bool(true)))
            .build(),
        NodeDefinition::builder("fx_iterate", "Iterate", Dialect::FxMap)
            .input(PinDefinition::input("initial", child))
            .input(PinDefinition::input("iterated", child))
            .output(PinDefinition::output("output", PinType::ENTRY_VARIANT))
            .parameter(ParameterDefinition::new("number", PinType::INTEGER1, Value::Int(4)))
            .build(),
        NodeDefinition::builder("fx_output", "FxMap Output", Dialect::FxMap)
            .kind(NodeKind::Output)
            .input(PinDefinition::input("input", PinType::ENTRY_VARIANT))
            .build(),
    ]
}
