//! Core types for the procgraph engine.
//!
//! This module contains the foundational types every dialect shares:
//! - Pin types and parameter values
//! - Pin and parameter definitions
//! - Node kinds and definitions
//! - Identifiers and error types
//! - Engine configuration

pub mod config;
pub mod error;
pub mod node;
pub mod pin;
pub mod types;

// Re-export commonly used types
pub use config::EngineConfig;
pub use error::{ConnectionId, EngineError, GraphError, GraphId, GraphResult, NodeId};
pub use node::{Dialect, NodeDefinition, NodeKind};
pub use pin::{ParameterDefinition, PinDefinition, PinDirection};
pub use types::{is_compatible, DynamicValue, PinType, Value};
