//! Compositing graph definitions: image entries flowing between filters.

use super::register_or_keep;
use crate::catalog::registry::DefinitionCatalog;
use crate::core::node::{Dialect, NodeDefinition, NodeKind};
use crate::core::pin::{ParameterDefinition, PinDefinition};
use crate::core::types::{PinType, Value};

/// Register compositing definitions.
pub fn register(catalog: &mut DefinitionCatalog) {
    for definition in definitions() {
        register_or_keep(catalog, definition);
    }
}

fn image_filter(id: &str, name: &str, description: &str) -> NodeDefinition {
    NodeDefinition::builder(id, name, Dialect::Compositing)
        .description(description)
        .input(PinDefinition::input("input", PinType::ENTRY_VARIANT))
        .output(PinDefinition::output("output", PinType::ENTRY_VARIANT))
        .build()
}

fn definitions() -> Vec<NodeDefinition> {
    let mut blur = image_filter("blur", "Blur", "Box blur of the input entry");
    blur.parameters
        .push(ParameterDefinition::new("intensity", PinType::FLOAT1, Value::Float(10.0)));

    let mut levels = image_filter("levels", "Levels", "Remaps the input value range");
    levels.parameters.push(ParameterDefinition::new(
        "levelinlow",
        PinType::FLOAT4,
        Value::Float4([0.0; 4]),
    ));
    levels.parameters.push(ParameterDefinition::new(
        "levelinhigh",
        PinType::FLOAT4,
        Value::Float4([1.0; 4]),
    ));

    vec![
        NodeDefinition::builder("input_color", "Input Color", Dialect::Compositing)
            .kind(NodeKind::Input)
            .description("Color image exposed as a graph input")
            .output(PinDefinition::output("output", PinType::ENTRY_COLOR))
            .parameter(ParameterDefinition::new(
                "identifier",
                PinType::STRING,
                Value::String("input".to_string()),
            ))
            .build(),
        NodeDefinition::builder("input_grayscale", "Input Grayscale", Dialect::Compositing)
            .kind(NodeKind::Input)
            .description("Grayscale image exposed as a graph input")
            .output(PinDefinition::output("output", PinType::ENTRY_GRAYSCALE))
            .parameter(ParameterDefinition::new(
                "identifier",
                PinType::STRING,
                Value::String("input".to_string()),
            ))
            .build(),
        NodeDefinition::builder("output", "Output", Dialect::Compositing)
            .kind(NodeKind::Output)
            .description("Graph output")
            .input(PinDefinition::input("input", PinType::ENTRY_VARIANT))
            .parameter(ParameterDefinition::new(
                "usage",
                PinType::STRING,
                Value::String("baseColor".to_string()),
            ))
            .build(),
        NodeDefinition::builder("uniform", "Uniform Color", Dialect::Compositing)
            .kind(NodeKind::Constant)
            .description("Fills the output with a single color")
            .output(PinDefinition::output("output", PinType::ENTRY_COLOR))
            .parameter(ParameterDefinition::new(
                "outputcolor",
                PinType::FLOAT4,
                Value::Float4([0.0, 0.0, 0.0, 1.0]),
            ))
            .build(),
        NodeDefinition::builder("passthrough", "Dot", Dialect::Compositing)
            .kind(NodeKind::Passthrough)
            .description("Routes its input unchanged")
            .input(PinDefinition::input("input", PinType::ENTRY_VARIANT))
            .output(PinDefinition::output("output", PinType::ENTRY_VARIANT))
            .tags(["routing"])
            .build(),
        NodeDefinition::builder("blend", "Blend", Dialect::Compositing)
            .description("Blends a foreground over a background")
            .input(PinDefinition::input("source", PinType::ENTRY_VARIANT))
            .input(PinDefinition::input("destination", PinType::ENTRY_VARIANT))
            .input(PinDefinition::input("opacity", PinType::ENTRY_GRAYSCALE.optional()))
            .output(PinDefinition::output("output", PinType::ENTRY_VARIANT))
            .parameter(ParameterDefinition::new("blendingmode", PinType::INTEGER1, Value::Int(0)))
            .parameter(ParameterDefinition::new("opacitymult", PinType::FLOAT1, Value::Float(1.0)))
            .build(),
        blur,
        levels,
        NodeDefinition::builder("grayscale_conversion", "Grayscale Conversion", Dialect::Compositing)
            .description("Converts a color entry to grayscale")
            .input(PinDefinition::input("input", PinType::ENTRY_COLOR))
            .output(PinDefinition::output("output", PinType::ENTRY_GRAYSCALE))
            .build(),
        NodeDefinition::builder("gradient_map", "Gradient Map", Dialect::Compositing)
            .description("Maps grayscale values onto a gradient")
            .input(PinDefinition::input("input", PinType::ENTRY_GRAYSCALE))
            .output(PinDefinition::output("output", PinType::ENTRY_COLOR))
            .build(),
        NodeDefinition::builder("perlin_noise", "Perlin Noise", Dialect::Compositing)
            .description("Procedural grayscale noise")
            .output(PinDefinition::output("output", PinType::ENTRY_GRAYSCALE))
            .parameter(ParameterDefinition::random_seed("randomseed"))
            .parameter(ParameterDefinition::new("scale", PinType::INTEGER1, Value::Int(32)))
            .tags(["noise", "generator"])
            .build(),
        NodeDefinition::builder("graph_instance", "Graph Instance", Dialect::Compositing)
            .kind(NodeKind::GraphInstance)
            .description("Instance of another compositing graph")
            .input(PinDefinition::input("input", PinType::ENTRY_VARIANT.optional()))
            .output(PinDefinition::output("output", PinType::ENTRY_VARIANT))
            .build(),
    ]
}
