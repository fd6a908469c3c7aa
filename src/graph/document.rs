//! Graph snapshots for saving and loading.
//!
//! A `GraphDocument` is built from the graph's query interface and loaded
//! back through the restore path, so node uids survive a round trip.

use crate::catalog::registry::DefinitionCatalog;
use crate::core::config::EngineConfig;
use crate::core::error::{EngineResult, NodeId};
use crate::core::types::{DynamicValue, Value};
use crate::graph::structure::{Graph, GraphReference, InputParameter, Position};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Serializable representation of a graph node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Graph-local node number
    pub uid: u32,
    /// Definition ID (to look up in the catalog)
    pub definition_id: String,
    /// Position in the editor
    pub position: Position,
    /// Parameter values
    pub parameters: IndexMap<String, Value>,
    /// Expression-driven parameters
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub dynamic_parameters: IndexMap<String, DynamicValue>,
    /// Referenced graph, for graph instances
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_reference: Option<GraphReference>,
}

/// Serializable representation of a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    /// Source node uid
    pub source: u32,
    /// Source output pin, when named
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_pin: Option<String>,
    /// Destination node uid
    pub dest: u32,
    /// Destination input pin
    pub dest_pin: String,
}

/// Serializable representation of a frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Frame identifier
    pub id: String,
    /// Display label
    pub label: String,
    /// Member node uids
    pub members: Vec<u32>,
}

/// Serializable representation of a complete graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    /// Document format version
    pub version: String,
    /// Nodes, in arena order
    pub nodes: Vec<NodeRecord>,
    /// Connections, grouped by destination in arena order
    pub connections: Vec<ConnectionRecord>,
    /// Graph input parameters
    #[serde(default)]
    pub input_parameters: Vec<InputParameter>,
    /// Explicitly designated outputs
    #[serde(default)]
    pub outputs: Vec<u32>,
    /// UI frames
    #[serde(default)]
    pub frames: Vec<FrameRecord>,
}

impl GraphDocument {
    /// Current format version.
    pub const VERSION: &'static str = "1.0.0";

    /// Snapshot a graph.
    pub fn from_graph(graph: &Graph) -> Self {
        let nodes = graph
            .nodes()
            .map(|n| NodeRecord {
                uid: n.id.uid,
                definition_id: n.definition_id.clone(),
                position: n.position,
                parameters: n.parameters.clone(),
                dynamic_parameters: n.dynamic_parameters.clone(),
                graph_reference: n.graph_reference.clone(),
            })
            .collect();

        let connections = graph
            .edges()
            .map(|(dest, c)| ConnectionRecord {
                source: c.source.uid,
                source_pin: c.source_pin.clone(),
                dest: dest.uid,
                dest_pin: c.input_pin.clone(),
            })
            .collect();

        let frames = graph
            .frames()
            .iter()
            .map(|f| FrameRecord {
                id: f.id.clone(),
                label: f.label.clone(),
                members: f.members.iter().map(|m| m.uid).collect(),
            })
            .collect();

        Self {
            version: Self::VERSION.to_string(),
            nodes,
            connections,
            input_parameters: graph.input_parameters().cloned().collect(),
            outputs: graph.explicit_outputs().iter().map(|o| o.uid).collect(),
            frames,
        }
    }

    /// Rebuild a graph through the restore path.
    pub fn into_graph(self, catalog: Arc<DefinitionCatalog>, config: EngineConfig) -> EngineResult<Graph> {
        let mut graph = Graph::with_config(catalog, config);
        let graph_id = graph.id();
        let node = move |uid: u32| NodeId::new(graph_id, uid);

        for record in self.nodes {
            let restored = graph.restore_node(
                &record.definition_id,
                Some(record.uid),
                record.position,
                record.parameters,
            )?;
            for (param, value) in record.dynamic_parameters {
                graph.set_dynamic_parameter(restored, &param, value)?;
            }
            if let Some(reference) = record.graph_reference {
                graph.set_graph_reference(restored, reference)?;
            }
        }

        for record in self.connections {
            graph.restore_connection(
                node(record.source),
                record.source_pin.as_deref(),
                node(record.dest),
                &record.dest_pin,
            )?;
        }

        for input in self.input_parameters {
            graph.add_input_parameter(input)?;
        }
        for uid in self.outputs {
            graph.declare_output(node(uid))?;
        }
        for frame in self.frames {
            graph.add_frame(frame.id.clone(), frame.label)?;
            for uid in frame.members {
                graph.add_to_frame(&frame.id, node(uid))?;
            }
        }

        debug!(
            "Loaded graph with {} node(s) and {} connection(s)",
            graph.node_count(),
            graph.connection_count()
        );
        Ok(graph)
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
