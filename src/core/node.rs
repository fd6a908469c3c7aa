//! Node kinds and node definitions.
//!
//! Heterogeneous node kinds are a tagged sum type plus capability queries.
//! New kinds are added by extending [`NodeKind`] and registering definitions
//! in a catalog, never by subtyping.

use crate::core::pin::{ParameterDefinition, PinDefinition};
use serde::{Deserialize, Serialize};

/// Graph dialect a node definition belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// Image compositing graph
    Compositing,
    /// Expression / function sub-graph
    Function,
    /// Quad-tree scatter sub-graph
    FxMap,
    /// Material description graph
    Material,
}

impl Dialect {
    /// Get the display name for this dialect.
    pub fn display_name(&self) -> &'static str {
        match self {
            Dialect::Compositing => "Compositing",
            Dialect::Function => "Function",
            Dialect::FxMap => "FxMap",
            Dialect::Material => "Material",
        }
    }
}

/// Structural role of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Operator transforming its inputs
    Filter,
    /// Instance of another graph (own package or external)
    GraphInstance,
    /// Graph input placeholder
    Input,
    /// Graph output placeholder
    Output,
    /// Constant value source
    Constant,
    /// Dot node forwarding its single input
    Passthrough,
}

impl Default for NodeKind {
    fn default() -> Self {
        NodeKind::Filter
    }
}

/// Static description of a node kind: pins and parameter schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeDefinition {
    /// Unique identifier for this kind (e.g., "blend")
    pub id: String,
    /// Human-readable name (e.g., "Blend")
    pub name: String,
    /// Dialect the kind belongs to
    pub dialect: Dialect,
    /// Structural role
    pub kind: NodeKind,
    /// Detailed description
    pub description: String,
    /// Input pin definitions
    pub inputs: Vec<PinDefinition>,
    /// Output pin definitions
    pub outputs: Vec<PinDefinition>,
    /// Parameter definitions
    pub parameters: Vec<ParameterDefinition>,
    /// Searchable tags
    pub tags: Vec<String>,
}

impl NodeDefinition {
    /// Create a new definition builder.
    pub fn builder(
        id: impl Into<String>,
        name: impl Into<String>,
        dialect: Dialect,
    ) -> NodeDefinitionBuilder {
        NodeDefinitionBuilder::new(id, name, dialect)
    }

    /// Find an input pin by id.
    pub fn get_input(&self, id: &str) -> Option<&PinDefinition> {
        self.inputs.iter().find(|p| p.id == id)
    }

    /// Find an output pin by id.
    pub fn get_output(&self, id: &str) -> Option<&PinDefinition> {
        self.outputs.iter().find(|p| p.id == id)
    }

    /// Resolve an output pin; `None` names the default (sole) output.
    pub fn resolve_output(&self, id: Option<&str>) -> Option<&PinDefinition> {
        match id {
            Some(id) => self.get_output(id),
            None if self.outputs.len() == 1 => self.outputs.first(),
            None => None,
        }
    }

    /// Find a parameter by id.
    pub fn get_parameter(&self, id: &str) -> Option<&ParameterDefinition> {
        self.parameters.iter().find(|p| p.id == id)
    }

    /// Whether the kind has input pins.
    pub fn has_inputs(&self) -> bool {
        !self.inputs.is_empty()
    }

    /// Whether the kind has output pins.
    pub fn has_outputs(&self) -> bool {
        !self.outputs.is_empty()
    }

    /// Whether the kind has parameters.
    pub fn has_parameters(&self) -> bool {
        !self.parameters.is_empty()
    }

    /// Whether instances point at another graph.
    pub fn is_graph_reference(&self) -> bool {
        self.kind == NodeKind::GraphInstance
    }

    /// Whether the kind forwards its input untouched.
    pub fn is_passthrough(&self) -> bool {
        self.kind == NodeKind::Passthrough
    }

    /// Whether any input accepts a sequence of connections.
    pub fn is_variadic_input(&self) -> bool {
        self.inputs.iter().any(|p| p.variadic)
    }
}

/// Builder for NodeDefinition.
pub struct NodeDefinitionBuilder {
    id: String,
    name: String,
    dialect: Dialect,
    kind: NodeKind,
    description: String,
    inputs: Vec<PinDefinition>,
    outputs: Vec<PinDefinition>,
    parameters: Vec<ParameterDefinition>,
    tags: Vec<String>,
}

impl NodeDefinitionBuilder {
    /// Create a new builder with required fields.
    pub fn new(id: impl Into<String>, name: impl Into<String>, dialect: Dialect) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            dialect,
            kind: NodeKind::Filter,
            description: String::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            parameters: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Set the structural role.
    pub fn kind(mut self, kind: NodeKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add an input pin.
    pub fn input(mut self, pin: PinDefinition) -> Self {
        self.inputs.push(pin);
        self
    }

    /// Add an output pin.
    pub fn output(mut self, pin: PinDefinition) -> Self {
        self.outputs.push(pin);
        self
    }

    /// Add a parameter.
    pub fn parameter(mut self, param: ParameterDefinition) -> Self {
        self.parameters.push(param);
        self
    }

    /// Add multiple tags.
    pub fn tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags.extend(tags.into_iter().map(|t| t.into()));
        self
    }

    /// Build the definition.
    pub fn build(self) -> NodeDefinition {
        NodeDefinition {
            id: self.id,
            name: self.name,
            dialect: self.dialect,
            kind: self.kind,
            description: self.description,
            inputs: self.inputs,
            outputs: self.outputs,
            parameters: self.parameters,
            tags: self.tags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{PinType, Value};

    fn mix() -> NodeDefinition {
        NodeDefinition::builder("mdl_mix", "Mix", Dialect::Material)
            .description("Mixes any number of layers")
            .input(PinDefinition::input("layers", PinType::FLOAT3).variadic())
            .output(PinDefinition::output("result", PinType::FLOAT3))
            .parameter(ParameterDefinition::new("weight", PinType::FLOAT1, Value::Float(0.5)))
            .tags(["mix", "layer"])
            .build()
    }

    #[test]
    fn test_definition_builder() {
        let def = mix();
        assert_eq!(def.id, "mdl_mix");
        assert_eq!(def.kind, NodeKind::Filter);
        assert_eq!(def.tags.len(), 2);
        assert!(def.get_input("layers").is_some());
        assert!(def.get_output("layers").is_none());
        assert!(def.get_parameter("weight").is_some());
    }

    #[test]
    fn test_capabilities() {
        let def = mix();
        assert!(def.has_inputs());
        assert!(def.has_outputs());
        assert!(def.has_parameters());
        assert!(def.is_variadic_input());
        assert!(!def.is_graph_reference());
        assert!(!def.is_passthrough());

        let dot = NodeDefinition::builder("dot", "Dot", Dialect::Compositing)
            .kind(NodeKind::Passthrough)
            .build();
        assert!(dot.is_passthrough());
        assert!(!dot.has_inputs());
    }

    #[test]
    fn test_default_output() {
        let def = mix();
        assert_eq!(def.resolve_output(None).map(|p| p.id.as_str()), Some("result"));

        let split = NodeDefinition::builder("split", "Split", Dialect::Function)
            .output(PinDefinition::output("x", PinType::FLOAT1))
            .output(PinDefinition::output("y", PinType::FLOAT1))
            .build();
        assert!(split.resolve_output(None).is_none());
        assert!(split.resolve_output(Some("y")).is_some());
    }

    #[test]
    fn test_dialect_display() {
        assert_eq!(Dialect::FxMap.display_name(), "FxMap");
    }
}
