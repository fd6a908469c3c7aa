//! Function graph definitions: scalar and vector expressions.

use super::register_or_keep;
use crate::catalog::registry::DefinitionCatalog;
use crate::core::node::{Dialect, NodeDefinition, NodeKind};
use crate::core::pin::{ParameterDefinition, PinDefinition};
use crate::core::types::{PinType, Value};

/// Register function definitions.
pub fn register(catalog: &mut DefinitionCatalog) {
    for definition in definitions() {
        register_or_keep(catalog, definition);
    }
}

fn definitions() -> Vec<NodeDefinition> {
    vec![
        NodeDefinition::builder("const_float1", "Float", Dialect::Function)
            .kind(NodeKind::Constant)
            .output(PinDefinition::output("value", PinType::FLOAT1))
            .parameter(ParameterDefinition::new("value", PinType::FLOAT1, Value::Float(0.0)))
            .build(),
        NodeDefinition::builder("const_bool", "Boolean", Dialect::Function)
            .kind(NodeKind::Constant)
            .output(PinDefinition::output("value", PinType::BOOLEAN))
            .parameter(ParameterDefinition::new("value", PinType::BOOLEAN, Value::Bool(false)))
            .build(),
        NodeDefinition::builder("get_float1", "Get Float", Dialect::Function)
            .kind(NodeKind::Input)
            .description("Reads a float input parameter of the enclosing graph")
            .output(PinDefinition::output("value", PinType::FLOAT1))
            .parameter(ParameterDefinition::new(
                "name",
                PinType::STRING,
                Value::String(String::new()),
            ))
            .build(),
        NodeDefinition::builder("add", "Add", Dialect::Function)
            .input(PinDefinition::input("a", PinType::FLOAT1))
            .input(PinDefinition::input("b", PinType::FLOAT1))
            .output(PinDefinition::output("result", PinType::FLOAT1))
            .build(),
        NodeDefinition::builder("vector2", "Vector Float2", Dialect::Function)
            .description("Builds a Float2 from two scalars")
            .input(PinDefinition::input("x", PinType::FLOAT1))
            .input(PinDefinition::input("y", PinType::FLOAT1))
            .output(PinDefinition::output("vector", PinType::FLOAT2))
            .tags(["expansion"])
            .build(),
        NodeDefinition::builder("swizzle1", "Swizzle Float1", Dialect::Function)
            .input(PinDefinition::input("vector", PinType::FLOAT_VARIANT))
            .output(PinDefinition::output("component", PinType::FLOAT1))
            .parameter(ParameterDefinition::new("index", PinType::INTEGER1, Value::Int(0)))
            .build(),
        NodeDefinition::builder("ifelse", "If Else", Dialect::Function)
            .input(PinDefinition::input("condition", PinType::BOOLEAN))
            .input(PinDefinition::input("ifpath", PinType::FLOAT1))
            .input(PinDefinition::input("elsepath", PinType::FLOAT1))
            .output(PinDefinition::output("result", PinType::FLOAT1))
            .build(),
    ]
}
