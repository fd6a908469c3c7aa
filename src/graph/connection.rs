//! Connection types for the graph.
//!
//! A connection is stored on the node that owns its input pin. It names the
//! source by id and never holds a reference to it.

use crate::core::error::{ConnectionId, NodeId};
use serde::{Deserialize, Serialize};

/// An edge feeding one input pin of the owning node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Unique identifier for this connection.
    pub id: ConnectionId,
    /// Node producing the value.
    pub source: NodeId,
    /// Output pin on the source; `None` is the source's default output.
    pub source_pin: Option<String>,
    /// Input pin on the owning node.
    pub input_pin: String,
}

impl Connection {
    /// Create a new connection with a fresh id.
    pub fn new(source: NodeId, source_pin: Option<String>, input_pin: impl Into<String>) -> Self {
        Self {
            id: ConnectionId::new(),
            source,
            source_pin,
            input_pin: input_pin.into(),
        }
    }

    /// Create with a specific ID.
    pub fn with_id(mut self, id: ConnectionId) -> Self {
        self.id = id;
        self
    }

    /// Whether this edge comes from `source` and feeds `input_pin`.
    pub fn links(&self, source: NodeId, input_pin: &str) -> bool {
        self.source == source && self.input_pin == input_pin
    }
}

/// Outcome of a successful `connect`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connected {
    /// Id of the new connection.
    pub id: ConnectionId,
    /// Connection previously occupying the destination pin, if any.
    pub replaced: Option<Connection>,
}
