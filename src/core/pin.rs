//! Pin and parameter definitions.
//!
//! Pins define the interface of a node kind: what it accepts and what it
//! produces. Parameters are the node's own settings, edited in the property
//! panel rather than wired to other nodes.

use crate::core::types::{PinType, Value};
use serde::{Deserialize, Serialize};

/// Direction of a pin (input or output).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PinDirection {
    Input,
    Output,
}

/// Definition of a node pin (input or output).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PinDefinition {
    /// Identifier, unique among the pins of one direction on the node kind
    pub id: String,
    /// Human-readable name (used in UI)
    pub display_name: String,
    /// Type of data this pin accepts/produces
    pub pin_type: PinType,
    /// Direction (input or output)
    pub direction: PinDirection,
    /// Whether an input accepts any number of connections
    pub variadic: bool,
    /// Description for documentation and tooltips
    pub description: String,
}

impl PinDefinition {
    /// Create a new input pin definition.
    pub fn input(id: impl Into<String>, pin_type: PinType) -> Self {
        let id = id.into();
        Self {
            display_name: Self::id_to_display(&id),
            id,
            pin_type,
            direction: PinDirection::Input,
            variadic: false,
            description: String::new(),
        }
    }

    /// Create a new output pin definition.
    pub fn output(id: impl Into<String>, pin_type: PinType) -> Self {
        let id = id.into();
        Self {
            display_name: Self::id_to_display(&id),
            id,
            pin_type,
            direction: PinDirection::Output,
            variadic: false,
            description: String::new(),
        }
    }

    /// Set the display name.
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Let this input accept a sequence of connections.
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    /// Whether this input may stay unconnected.
    pub fn is_optional(&self) -> bool {
        self.pin_type.is_optional_entry()
    }

    /// Convert snake_case id to Title Case display name.
    fn id_to_display(id: &str) -> String {
        id.split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Definition of a node parameter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParameterDefinition {
    /// Unique identifier within the node kind
    pub id: String,
    /// Human-readable name
    pub display_name: String,
    /// Type of the parameter
    pub param_type: PinType,
    /// Default value a new node starts with
    pub default_value: Value,
    /// Description for documentation
    pub description: String,
    /// Whether this parameter is a random seed (re-rolled on iteration)
    pub random_seed: bool,
    /// Group name for organizing parameters in UI
    pub group: Option<String>,
}

impl ParameterDefinition {
    /// Create a new parameter definition.
    pub fn new(id: impl Into<String>, param_type: PinType, default_value: Value) -> Self {
        let id = id.into();
        Self {
            display_name: PinDefinition::id_to_display(&id),
            id,
            param_type,
            default_value,
            description: String::new(),
            random_seed: false,
            group: None,
        }
    }

    /// Create an integer random seed parameter defaulting to zero.
    pub fn random_seed(id: impl Into<String>) -> Self {
        let mut param = Self::new(id, PinType::INTEGER1, Value::Int(0));
        param.random_seed = true;
        param
    }

    /// Set the display name.
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the parameter group.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Validate a value against this parameter's type.
    pub fn validate(&self, value: &Value) -> Result<(), String> {
        if !self.param_type.accepts(value) {
            return Err(format!(
                "Type mismatch for parameter '{}': expected {}, got {}",
                self.id,
                self.param_type,
                value.pin_type()
            ));
        }
        Ok(())
    }
}
