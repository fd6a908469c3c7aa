//! Error and identifier types for procgraph.
//!
//! Uses thiserror for structured errors with context. Errors are designed to:
//! - Be serializable so editor front-ends can display them
//! - Name the node, pin or parameter at fault
//! - Be raised before any mutation, so a failed call leaves the graph untouched

use crate::core::types::PinType;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Identity of a graph instance.
///
/// Every node id carries the id of the graph that allocated it, which is how
/// mixing nodes from two graphs is detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphId(pub Uuid);

impl GraphId {
    /// Create a new random graph ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GraphId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Unique identifier for a node in a graph.
///
/// `uid` is unique within the owning graph and never handed out twice, even
/// after the node it named has been deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId {
    /// Graph that allocated this id.
    pub graph: GraphId,
    /// Graph-local node number.
    pub uid: u32,
}

impl NodeId {
    /// Create a node ID for the given graph.
    pub fn new(graph: GraphId, uid: u32) -> Self {
        Self { graph, uid }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.uid)
    }
}

/// Unique identifier for a connection in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Create a new random connection ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Top-level error type for procgraph.
///
/// Encompasses the graph errors plus the failures of the ambient layers
/// (configuration parsing, snapshot serialization).
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors related to graph structure and operations.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GraphError {
    #[error("Node {0} not found")]
    UnknownNode(NodeId),

    #[error("Unknown node definition '{0}'")]
    UnknownDefinition(String),

    #[error("Pin '{pin}' not found on node {node_id}")]
    InvalidPin { node_id: NodeId, pin: String },

    #[error("Cannot connect {from_type} to {to_type}")]
    IncompatibleType { from_type: PinType, to_type: PinType },

    #[error("Cycle detected in graph involving nodes: {nodes:?}")]
    CycleDetected { nodes: Vec<NodeId> },

    #[error("Node {node_id} belongs to graph {node_graph}, not to graph {graph}")]
    CrossGraph {
        node_id: NodeId,
        node_graph: GraphId,
        graph: GraphId,
    },

    #[error("Cannot infer chain pin for '{pin}' on node {node_id}: {candidates} candidate(s)")]
    AmbiguousChainInference {
        node_id: NodeId,
        pin: String,
        candidates: usize,
    },

    #[error("Identifier '{0}' is already in use")]
    DuplicateIdentifier(String),

    #[error("Parameter '{parameter}' not found")]
    UnknownParameter {
        node_id: Option<NodeId>,
        parameter: String,
    },

    #[error("Parameter '{parameter}' expects {expected}, got {got}")]
    ParameterTypeMismatch {
        parameter: String,
        expected: PinType,
        got: PinType,
    },

    #[error("Invalid iteration pattern: {reason}")]
    InvalidPattern { reason: String },

    #[error("Iteration count {requested} exceeds the configured limit of {limit}")]
    IterationLimit { requested: usize, limit: usize },
}

impl GraphError {
    /// Get list of affected node IDs.
    pub fn affected_nodes(&self) -> Vec<NodeId> {
        match self {
            GraphError::UnknownNode(node_id)
            | GraphError::InvalidPin { node_id, .. }
            | GraphError::CrossGraph { node_id, .. }
            | GraphError::AmbiguousChainInference { node_id, .. } => vec![*node_id],
            GraphError::UnknownParameter {
                node_id: Some(node_id),
                ..
            } => vec![*node_id],
            GraphError::CycleDetected { nodes } => nodes.clone(),
            _ => vec![],
        }
    }

    /// Get suggestion for fixing this error.
    pub fn suggested_fix(&self) -> Option<String> {
        match self {
            GraphError::IncompatibleType { from_type, to_type } => Some(format!(
                "Insert a conversion node to turn {} into {}",
                from_type, to_type
            )),
            GraphError::AmbiguousChainInference { .. } => {
                Some("Pass explicit chain links to the iteration".to_string())
            }
            GraphError::CycleDetected { .. } => {
                Some("Remove one of the connections forming the loop".to_string())
            }
            _ => None,
        }
    }
}

/// Result type alias for procgraph operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Result type alias for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;
