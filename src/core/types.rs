//! Pin types and parameter values.
//!
//! Pin types are bit masks rather than an enum: a single bit names a concrete
//! type, several bits name a variant family (for example an entry that accepts
//! either a color or a grayscale image). Compatibility is a family
//! intersection, which keeps every query a couple of bit operations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr};

/// Type of a pin or parameter, as a bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PinType(pub u32);

impl PinType {
    /// No type at all; compatible with nothing.
    pub const NONE: PinType = PinType(0);
    /// Color image entry.
    pub const ENTRY_COLOR: PinType = PinType(1);
    /// Grayscale image entry.
    pub const ENTRY_GRAYSCALE: PinType = PinType(2);
    /// Color or grayscale image entry.
    pub const ENTRY_VARIANT: PinType = PinType(3);
    /// Boolean value.
    pub const BOOLEAN: PinType = PinType(4);
    /// Integer scalar.
    pub const INTEGER1: PinType = PinType(16);
    /// 2-component integer vector.
    pub const INTEGER2: PinType = PinType(32);
    /// 3-component integer vector.
    pub const INTEGER3: PinType = PinType(64);
    /// 4-component integer vector.
    pub const INTEGER4: PinType = PinType(128);
    /// Float scalar.
    pub const FLOAT1: PinType = PinType(256);
    /// 2-component float vector.
    pub const FLOAT2: PinType = PinType(512);
    /// 3-component float vector.
    pub const FLOAT3: PinType = PinType(1024);
    /// 4-component float vector.
    pub const FLOAT4: PinType = PinType(2048);
    /// Any float arity.
    pub const FLOAT_VARIANT: PinType = PinType(256 | 512 | 1024 | 2048);
    /// UTF-8 string.
    pub const STRING: PinType = PinType(16384);
    /// Modifier: the entry may be left unconnected.
    pub const ENTRY_OPTIONAL: PinType = PinType(1 << 20);

    const MODIFIERS: u32 = Self::ENTRY_OPTIONAL.0;

    const NAMES: &'static [(PinType, &'static str)] = &[
        (PinType::ENTRY_COLOR, "Color"),
        (PinType::ENTRY_GRAYSCALE, "Grayscale"),
        (PinType::BOOLEAN, "Boolean"),
        (PinType::INTEGER1, "Integer1"),
        (PinType::INTEGER2, "Integer2"),
        (PinType::INTEGER3, "Integer3"),
        (PinType::INTEGER4, "Integer4"),
        (PinType::FLOAT1, "Float1"),
        (PinType::FLOAT2, "Float2"),
        (PinType::FLOAT3, "Float3"),
        (PinType::FLOAT4, "Float4"),
        (PinType::STRING, "String"),
    ];

    /// Raw mask value.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// The type with modifier bits (optional flag) removed.
    pub const fn family(self) -> PinType {
        PinType(self.0 & !Self::MODIFIERS)
    }

    /// Mark an entry type as optional.
    pub const fn optional(self) -> PinType {
        PinType(self.0 | Self::MODIFIERS)
    }

    /// Check whether every bit of `other` is set in `self`.
    pub const fn contains(self, other: PinType) -> bool {
        self.0 & other.0 == other.0
    }

    /// Check whether the two families share at least one member.
    pub const fn intersects(self, other: PinType) -> bool {
        self.family().0 & other.family().0 != 0
    }

    /// Whether this type names more than one concrete member.
    pub fn is_variant(self) -> bool {
        self.family().0.count_ones() > 1
    }

    /// Whether this is an image entry (color, grayscale or both).
    pub const fn is_entry(self) -> bool {
        self.0 & Self::ENTRY_VARIANT.0 != 0
    }

    /// Whether this is an image entry that may stay unconnected.
    pub const fn is_optional_entry(self) -> bool {
        self.is_entry() && self.0 & Self::MODIFIERS != 0
    }

    /// Number of components carried by a value of this type.
    ///
    /// Variant types report the arity of their widest member.
    pub fn arity(self) -> u32 {
        self.members()
            .map(|member| match member {
                PinType::INTEGER2 | PinType::FLOAT2 => 2,
                PinType::INTEGER3 | PinType::FLOAT3 => 3,
                PinType::INTEGER4 | PinType::FLOAT4 => 4,
                _ => 1,
            })
            .max()
            .unwrap_or(0)
    }

    /// Iterate over the concrete single-bit members of this family.
    pub fn members(self) -> impl Iterator<Item = PinType> {
        let bits = self.family().0;
        (0..u32::BITS)
            .map(|shift| 1u32 << shift)
            .filter(move |bit| bits & bit != 0)
            .map(PinType)
    }

    /// Check whether an output of this type may feed an input of `input` type.
    ///
    /// A variant accepts any of its members and a member fits any variant
    /// containing it. Scalars never widen to vectors here: dialects expose
    /// explicit expansion nodes for that.
    pub fn compatible_with(self, input: PinType) -> bool {
        self.family().0 != 0 && self.intersects(input)
    }

    /// Check if a parameter value matches this type.
    pub fn accepts(self, value: &Value) -> bool {
        self.intersects(value.pin_type())
    }

    /// Get a human-readable name for this type.
    pub fn display_name(self) -> String {
        let family = self.family();
        let base = match family {
            PinType::NONE => "None".to_string(),
            PinType::ENTRY_VARIANT => "ColorOrGrayscale".to_string(),
            PinType::FLOAT_VARIANT => "FloatVariant".to_string(),
            _ => family
                .members()
                .map(|member| {
                    Self::NAMES
                        .iter()
                        .find(|(ty, _)| *ty == member)
                        .map(|(_, name)| (*name).to_string())
                        .unwrap_or_else(|| format!("0x{:x}", member.0))
                })
                .collect::<Vec<_>>()
                .join("|"),
        };
        if self.is_optional_entry() {
            format!("Optional<{}>", base)
        } else {
            base
        }
    }
}

/// Check whether an output of type `output` may feed an input of type `input`.
pub fn is_compatible(output: PinType, input: PinType) -> bool {
    output.compatible_with(input)
}

impl BitOr for PinType {
    type Output = PinType;

    fn bitor(self, rhs: PinType) -> PinType {
        PinType(self.0 | rhs.0)
    }
}

impl BitAnd for PinType {
    type Output = PinType;

    fn bitand(self, rhs: PinType) -> PinType {
        PinType(self.0 & rhs.0)
    }
}

impl fmt::Display for PinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Parameter value stored on a node or exposed by a graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum Value {
    /// Boolean flag
    Bool(bool),
    /// Integer scalar
    Int(i32),
    /// 2-component integer vector
    Int2([i32; 2]),
    /// 3-component integer vector
    Int3([i32; 3]),
    /// 4-component integer vector
    Int4([i32; 4]),
    /// Float scalar
    Float(f32),
    /// 2-component float vector
    Float2([f32; 2]),
    /// 3-component float vector
    Float3([f32; 3]),
    /// 4-component float vector (also used for RGBA colors)
    Float4([f32; 4]),
    /// UTF-8 string
    String(String),
}

impl Value {
    /// Get the pin type of this value.
    pub fn pin_type(&self) -> PinType {
        match self {
            Value::Bool(_) => PinType::BOOLEAN,
            Value::Int(_) => PinType::INTEGER1,
            Value::Int2(_) => PinType::INTEGER2,
            Value::Int3(_) => PinType::INTEGER3,
            Value::Int4(_) => PinType::INTEGER4,
            Value::Float(_) => PinType::FLOAT1,
            Value::Float2(_) => PinType::FLOAT2,
            Value::Float3(_) => PinType::FLOAT3,
            Value::Float4(_) => PinType::FLOAT4,
            Value::String(_) => PinType::STRING,
        }
    }

    /// Zero value for a concrete type, if the type carries values.
    pub fn zero(ty: PinType) -> Option<Value> {
        match ty.family() {
            PinType::BOOLEAN => Some(Value::Bool(false)),
            PinType::INTEGER1 => Some(Value::Int(0)),
            PinType::INTEGER2 => Some(Value::Int2([0; 2])),
            PinType::INTEGER3 => Some(Value::Int3([0; 3])),
            PinType::INTEGER4 => Some(Value::Int4([0; 4])),
            PinType::FLOAT1 => Some(Value::Float(0.0)),
            PinType::FLOAT2 => Some(Value::Float2([0.0; 2])),
            PinType::FLOAT3 => Some(Value::Float3([0.0; 3])),
            PinType::FLOAT4 => Some(Value::Float4([0.0; 4])),
            PinType::STRING => Some(Value::String(String::new())),
            _ => None,
        }
    }

    /// Try to get this value as an integer scalar.
    pub fn as_int(&self) -> Option<i32> {
        if let Value::Int(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    /// Try to get this value as a float scalar.
    /// Integers are converted.
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f32),
            _ => None,
        }
    }

    /// Try to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        if let Value::Bool(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_string(&self) -> Option<&str> {
        if let Value::String(s) = self {
            Some(s)
        } else {
            None
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Int2(v) => write!(f, "{:?}", v),
            Value::Int3(v) => write!(f, "{:?}", v),
            Value::Int4(v) => write!(f, "{:?}", v),
            Value::Float(v) => write!(f, "{:.4}", v),
            Value::Float2(v) => write!(f, "{:?}", v),
            Value::Float3(v) => write!(f, "{:?}", v),
            Value::Float4(v) => write!(f, "{:?}", v),
            Value::String(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// A parameter driven by an expression over the graph's input parameters.
///
/// Both dynamic parameter functions and input visibility conditions refer to
/// graph inputs as `input["identifier"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicValue {
    /// Expression source.
    pub expression: String,
}

impl DynamicValue {
    /// Create a dynamic value from an expression.
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
        }
    }

    /// Identifiers of the graph inputs this expression reads.
    pub fn referenced_inputs(&self) -> Vec<String> {
        referenced_inputs(&self.expression)
    }
}

/// Extract every `input["identifier"]` reference from an expression.
///
/// Duplicates are reported once, in order of first appearance.
pub fn referenced_inputs(expression: &str) -> Vec<String> {
    const OPEN: &str = "input[\"";
    let mut found: Vec<String> = Vec::new();
    let mut rest = expression;

    while let Some(start) = rest.find(OPEN) {
        let after = &rest[start + OPEN.len()..];
        match after.find("\"]") {
            Some(end) => {
                let name = &after[..end];
                if !name.is_empty() && !found.iter().any(|f| f == name) {
                    found.push(name.to_string());
                }
                rest = &after[end + 2..];
            }
            None => break,
        }
    }

    found
}
