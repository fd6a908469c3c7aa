//! Material description definitions.

use super::register_or_keep;
use crate::catalog::registry::DefinitionCatalog;
use crate::core::node::{Dialect, NodeDefinition, NodeKind};
use crate::core::pin::{ParameterDefinition, PinDefinition};
use crate::core::types::{PinType, Value};

/// Register material definitions.
pub fn register(catalog: &mut DefinitionCatalog) {
    for definition in definitions() {
        register_or_keep(catalog, definition);
    }
}

fn definitions() -> Vec<NodeDefinition> {
    vec![
        NodeDefinition::builder("mdl_constant_color", "Constant Color", Dialect::Material)
            .kind(NodeKind::Constant)
            .output(PinDefinition::output("color", PinType::FLOAT3))
            .parameter(ParameterDefinition::new(
                "value",
                PinType::FLOAT3,
                Value::Float3([0.5, 0.5, 0.5]),
            ))
            .build(),
        NodeDefinition::builder("mdl_texture_input", "Texture Input", Dialect::Material)
            .kind(NodeKind::Input)
            .output(PinDefinition::output("color", PinType::FLOAT3))
            .build(),
        NodeDefinition::builder("mdl_mix", "Mix", Dialect::Material)
            .description("Weighted mix of any number of layers")
            .input(PinDefinition::input("layers", PinType::FLOAT3).variadic())
            .output(PinDefinition::output("result", PinType::FLOAT3))
            .parameter(ParameterDefinition::new("weight", PinType::FLOAT1, Value::Float(0.5)))
            .build(),
        NodeDefinition::builder("mdl_output", "Material Output", Dialect::Material)
            .kind(NodeKind::Output)
            .input(PinDefinition::input("surface", PinType::FLOAT3))
            .build(),
    ]
}
