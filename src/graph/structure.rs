//! Graph structure and node management.
//!
//! The Graph is an arena: it owns every node by uid, and every connection is
//! stored on the node owning its input pin. Cross references are ids resolved
//! through the graph. Connections are only created through validator-gated
//! operations or the trusted restore path used by loaders.

use crate::catalog::registry::DefinitionCatalog;
use crate::core::config::EngineConfig;
use crate::core::error::{ConnectionId, GraphError, GraphId, GraphResult, NodeId};
use crate::core::node::{NodeDefinition, NodeKind};
use crate::core::types::{referenced_inputs, DynamicValue, PinType, Value};
use crate::graph::connection::{Connected, Connection};
use crate::graph::topology::TopologicalSorter;
use crate::validation::connection::ConnectionValidator;
use indexmap::IndexMap;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::ops::{Add, Mul};
use std::sync::Arc;

/// Authoring position of a node. Layout only, never semantic.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Position {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
    /// Depth, for stacked layouts
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Mul<f64> for Position {
    type Output = Position;

    fn mul(self, factor: f64) -> Position {
        Position::new(self.x * factor, self.y * factor, self.z * factor)
    }
}

/// Target of a graph instance node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum GraphReference {
    /// Graph defined in the same package, by identifier.
    Package(String),
    /// Graph in another package, by resource URL.
    External(String),
}

/// A node instance in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Unique identifier
    pub id: NodeId,
    /// Definition this node instantiates
    pub definition_id: String,
    /// Position in the editor
    pub position: Position,
    /// Parameter values, initialised from the definition defaults
    pub parameters: IndexMap<String, Value>,
    /// Parameters driven by an expression over the graph inputs
    pub dynamic_parameters: IndexMap<String, DynamicValue>,
    /// Referenced graph, for graph instance nodes
    pub graph_reference: Option<GraphReference>,
    /// Incoming connections, owned by this node
    pub connections: Vec<Connection>,
}

impl GraphNode {
    fn new(id: NodeId, definition: &NodeDefinition, position: Position) -> Self {
        Self {
            id,
            definition_id: definition.id.clone(),
            position,
            parameters: definition
                .parameters
                .iter()
                .map(|p| (p.id.clone(), p.default_value.clone()))
                .collect(),
            dynamic_parameters: IndexMap::new(),
            graph_reference: None,
            connections: Vec::new(),
        }
    }

    /// Get a parameter value.
    pub fn parameter(&self, id: &str) -> Option<&Value> {
        self.parameters.get(id)
    }

    /// Get the expression driving a parameter, if any.
    pub fn dynamic_parameter(&self, id: &str) -> Option<&DynamicValue> {
        self.dynamic_parameters.get(id)
    }

    /// Connections feeding one input pin.
    pub fn incoming<'a>(&'a self, pin: &'a str) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.iter().filter(move |c| c.input_pin == pin)
    }

    /// Check if an input pin has at least one connection.
    pub fn is_input_connected(&self, pin: &str) -> bool {
        self.incoming(pin).next().is_some()
    }
}

/// A graph input parameter exposed to users of the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputParameter {
    /// Identifier, referenced by expressions as `input["id"]`
    pub id: String,
    /// Display label
    pub label: String,
    /// Type of the value
    pub param_type: PinType,
    /// Default value
    pub default: Value,
    /// Visibility condition over other inputs
    pub visible_if: Option<String>,
}

impl InputParameter {
    /// Create an input parameter.
    pub fn new(id: impl Into<String>, param_type: PinType, default: Value) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            param_type,
            default,
            visible_if: None,
        }
    }

    /// Set the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the visibility condition.
    pub fn with_visible_if(mut self, condition: impl Into<String>) -> Self {
        self.visible_if = Some(condition.into());
        self
    }

    /// Inputs read by the visibility condition.
    pub fn visibility_references(&self) -> Vec<String> {
        self.visible_if
            .as_deref()
            .map(referenced_inputs)
            .unwrap_or_default()
    }
}

/// UI grouping of nodes. Purely cosmetic, but must not name deleted nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Frame identifier
    pub id: String,
    /// Display label
    pub label: String,
    /// Framed nodes, in insertion order
    pub members: Vec<NodeId>,
}

/// The node graph.
///
/// Uses IndexMap to maintain insertion order for consistent iteration.
#[derive(Debug, Clone)]
pub struct Graph {
    id: GraphId,
    catalog: Arc<DefinitionCatalog>,
    config: EngineConfig,
    /// All nodes, indexed by uid.
    nodes: IndexMap<u32, GraphNode>,
    next_uid: u32,
    /// Uids of deleted nodes; never handed out again.
    retired: HashSet<u32>,
    input_parameters: IndexMap<String, InputParameter>,
    /// Outputs designated explicitly rather than by node kind.
    explicit_outputs: Vec<NodeId>,
    frames: Vec<Frame>,
}

impl Graph {
    /// Create a new empty graph bound to a catalog.
    pub fn new(catalog: Arc<DefinitionCatalog>) -> Self {
        Self::with_config(catalog, EngineConfig::default())
    }

    /// Create a new empty graph with an explicit configuration.
    pub fn with_config(catalog: Arc<DefinitionCatalog>, config: EngineConfig) -> Self {
        Self {
            id: GraphId::new(),
            catalog,
            config,
            nodes: IndexMap::new(),
            next_uid: 1,
            retired: HashSet::new(),
            input_parameters: IndexMap::new(),
            explicit_outputs: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Identity of this graph instance.
    pub fn id(&self) -> GraphId {
        self.id
    }

    /// The catalog nodes are bound to.
    pub fn catalog(&self) -> &DefinitionCatalog {
        &self.catalog
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ========================================================================
    // Node Management
    // ========================================================================

    /// Create a node from a definition, with parameters at their defaults.
    pub fn create_node(&mut self, definition_id: &str, position: Position) -> GraphResult<NodeId> {
        let catalog = Arc::clone(&self.catalog);
        let definition = catalog.require(definition_id)?;
        let id = NodeId::new(self.id, self.allocate_uid()?);
        let node = GraphNode::new(id, definition, position);
        self.nodes.insert(id.uid, node);
        debug!("Created node {} ({})", id, definition_id);
        Ok(id)
    }

    /// Recreate a node from saved data.
    ///
    /// With `uid` set the node keeps that number; a uid that is live or was
    /// retired fails with `DuplicateIdentifier`. Initial parameters override
    /// the defaults and are type checked.
    pub fn restore_node(
        &mut self,
        definition_id: &str,
        uid: Option<u32>,
        position: Position,
        parameters: IndexMap<String, Value>,
    ) -> GraphResult<NodeId> {
        let catalog = Arc::clone(&self.catalog);
        let definition = catalog.require(definition_id)?;

        if let Some(uid) = uid {
            if self.nodes.contains_key(&uid) || self.retired.contains(&uid) {
                return Err(GraphError::DuplicateIdentifier(format!("node uid {}", uid)));
            }
        }

        let id = NodeId::new(self.id, uid.unwrap_or(0));
        for (param, value) in &parameters {
            check_parameter(definition, id, param, value)?;
        }

        let uid = match uid {
            Some(uid) => {
                self.next_uid = self.next_uid.max(uid.saturating_add(1));
                uid
            }
            None => self.allocate_uid()?,
        };
        let id = NodeId::new(self.id, uid);

        let mut node = GraphNode::new(id, definition, position);
        node.parameters.extend(parameters);
        self.nodes.insert(uid, node);
        trace!("Restored node {} ({})", id, definition_id);
        Ok(id)
    }

    /// Delete a node with every incident connection and frame membership.
    pub fn delete_node(&mut self, id: NodeId) -> GraphResult<GraphNode> {
        self.check_owned(id)?;
        let node = self
            .nodes
            .shift_remove(&id.uid)
            .ok_or(GraphError::UnknownNode(id))?;

        let mut outgoing = 0;
        for other in self.nodes.values_mut() {
            let before = other.connections.len();
            other.connections.retain(|c| c.source != id);
            outgoing += before - other.connections.len();
        }
        for frame in &mut self.frames {
            frame.members.retain(|m| *m != id);
        }
        self.explicit_outputs.retain(|o| *o != id);
        self.retired.insert(id.uid);

        debug!(
            "Deleted node {} ({}): {} incoming, {} outgoing connection(s) removed",
            id,
            node.definition_id,
            node.connections.len(),
            outgoing
        );
        Ok(node)
    }

    /// Get a reference to a node.
    pub fn node(&self, id: NodeId) -> GraphResult<&GraphNode> {
        self.check_owned(id)?;
        self.nodes.get(&id.uid).ok_or(GraphError::UnknownNode(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> GraphResult<&mut GraphNode> {
        self.check_owned(id)?;
        self.nodes.get_mut(&id.uid).ok_or(GraphError::UnknownNode(id))
    }

    /// Get the definition a node instantiates.
    pub fn definition(&self, id: NodeId) -> GraphResult<&NodeDefinition> {
        let node = self.node(id)?;
        self.catalog.require(&node.definition_id)
    }

    /// Check if a node exists in this graph.
    pub fn has_node(&self, id: NodeId) -> bool {
        id.graph == self.id && self.nodes.contains_key(&id.uid)
    }

    /// Get all nodes, in arena order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    /// Get all node IDs, in arena order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.values().map(|n| n.id)
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Fail with `CrossGraph` for ids allocated by another graph.
    pub fn check_owned(&self, id: NodeId) -> GraphResult<()> {
        if id.graph != self.id {
            return Err(GraphError::CrossGraph {
                node_id: id,
                node_graph: id.graph,
                graph: self.id,
            });
        }
        Ok(())
    }

    /// Next free uid. The top of the range is never handed out, so a graph
    /// restored with `u32::MAX` reports exhaustion instead of wrapping.
    fn allocate_uid(&mut self) -> GraphResult<u32> {
        let exhausted = || GraphError::DuplicateIdentifier("node uid space exhausted".to_string());
        let mut uid = self.next_uid;
        while self.nodes.contains_key(&uid) || self.retired.contains(&uid) {
            uid = uid.checked_add(1).ok_or_else(exhausted)?;
        }
        self.next_uid = uid.checked_add(1).ok_or_else(exhausted)?;
        Ok(uid)
    }

    // ========================================================================
    // Connection Management
    // ========================================================================

    /// Connect an output pin to an input pin.
    ///
    /// `source_pin` may be `None` when the source has exactly one output. An
    /// occupied non-variadic input is rewired and the previous connection is
    /// handed back. Nothing changes when validation fails.
    pub fn connect(
        &mut self,
        source: NodeId,
        source_pin: Option<&str>,
        dest: NodeId,
        dest_pin: &str,
    ) -> GraphResult<Connected> {
        let plan = ConnectionValidator::new(self).validate(source, source_pin, dest, dest_pin)?;

        let connection = Connection::new(source, source_pin.map(str::to_string), dest_pin);
        let id = connection.id;
        let node = self.node_mut(dest)?;

        let replaced = match plan.replaced {
            Some(old) => match node.connections.iter().position(|c| c.id == old) {
                Some(index) => {
                    let previous = std::mem::replace(&mut node.connections[index], connection);
                    Some(previous)
                }
                None => {
                    node.connections.push(connection);
                    None
                }
            },
            None => {
                node.connections.push(connection);
                None
            }
        };

        if let Some(previous) = &replaced {
            debug!(
                "Replaced connection {} from {} on {}.{}",
                previous.id, previous.source, dest, dest_pin
            );
        }
        debug!("Connected {} -> {}.{} ({})", source, dest, dest_pin, id);
        Ok(Connected { id, replaced })
    }

    /// Recreate a saved connection.
    ///
    /// Only ids and pins are checked; the saved graph was valid when written.
    /// An occupied non-variadic input is overwritten.
    pub fn restore_connection(
        &mut self,
        source: NodeId,
        source_pin: Option<&str>,
        dest: NodeId,
        dest_pin: &str,
    ) -> GraphResult<ConnectionId> {
        let validator = ConnectionValidator::new(self);
        validator.check_membership(source, dest)?;
        let (_, input) = validator.resolve_pins(source, source_pin, dest, dest_pin)?;
        let variadic = input.variadic;

        let connection = Connection::new(source, source_pin.map(str::to_string), dest_pin);
        let id = connection.id;
        let node = self.node_mut(dest)?;
        if !variadic {
            node.connections.retain(|c| c.input_pin != dest_pin);
        }
        node.connections.push(connection);
        trace!("Restored connection {} -> {}.{}", source, dest, dest_pin);
        Ok(id)
    }

    /// Remove the connection from `source` into `dest.dest_pin`.
    ///
    /// Returns `None` when no such connection exists.
    pub fn disconnect(&mut self, dest: NodeId, dest_pin: &str, source: NodeId) -> Option<Connection> {
        let node = self.node_mut(dest).ok()?;
        let index = node.connections.iter().position(|c| c.links(source, dest_pin))?;
        let removed = node.connections.remove(index);
        debug!("Disconnected {} -> {}.{}", source, dest, dest_pin);
        Some(removed)
    }

    /// Remove a connection by ID. Returns `None` when it does not exist.
    pub fn disconnect_by_id(&mut self, id: ConnectionId) -> Option<Connection> {
        for node in self.nodes.values_mut() {
            if let Some(index) = node.connections.iter().position(|c| c.id == id) {
                let removed = node.connections.remove(index);
                debug!("Disconnected {} -> {}.{}", removed.source, node.id, removed.input_pin);
                return Some(removed);
            }
        }
        None
    }

    /// Get a connection by ID, with the node owning it.
    pub fn connection(&self, id: ConnectionId) -> Option<(NodeId, &Connection)> {
        self.edges().find(|(_, c)| c.id == id)
    }

    /// Every connection, as (destination, connection), in arena order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, &Connection)> {
        self.nodes
            .values()
            .flat_map(|n| n.connections.iter().map(move |c| (n.id, c)))
    }

    /// Connections feeding a node.
    pub fn connections_to(&self, id: NodeId) -> &[Connection] {
        self.node(id).map(|n| n.connections.as_slice()).unwrap_or(&[])
    }

    /// Connections leaving a node, as (destination, connection).
    pub fn connections_from(&self, id: NodeId) -> Vec<(NodeId, &Connection)> {
        self.edges().filter(|(_, c)| c.source == id).collect()
    }

    /// Get the number of connections.
    pub fn connection_count(&self) -> usize {
        self.nodes.values().map(|n| n.connections.len()).sum()
    }

    /// Name of the output pin a connection reads, resolving the default pin.
    pub fn resolved_source_pin<'a>(&'a self, connection: &'a Connection) -> Option<&'a str> {
        match &connection.source_pin {
            Some(pin) => Some(pin.as_str()),
            None => self
                .definition(connection.source)
                .ok()?
                .resolve_output(None)
                .map(|p| p.id.as_str()),
        }
    }

    /// Check if `target` is reachable from `start` following connections.
    ///
    /// Walks incoming edges back from `target`, visiting each node once.
    pub fn is_reachable(&self, start: NodeId, target: NodeId) -> bool {
        if start == target {
            return true;
        }

        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(target);

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            for conn in self.connections_to(current) {
                if conn.source == start {
                    return true;
                }
                queue.push_back(conn.source);
            }
        }

        false
    }

    // ========================================================================
    // Parameters
    // ========================================================================

    /// Get a node parameter value.
    pub fn parameter(&self, id: NodeId, param: &str) -> GraphResult<&Value> {
        self.node(id)?
            .parameter(param)
            .ok_or_else(|| GraphError::UnknownParameter {
                node_id: Some(id),
                parameter: param.to_string(),
            })
    }

    /// Set a node parameter, returning the previous value.
    pub fn set_parameter(&mut self, id: NodeId, param: &str, value: Value) -> GraphResult<Option<Value>> {
        check_parameter(self.definition(id)?, id, param, &value)?;
        let node = self.node_mut(id)?;
        trace!("Set {}.{} = {}", id, param, value);
        Ok(node.parameters.insert(param.to_string(), value))
    }

    /// Drive a node parameter by an expression over the graph inputs.
    pub fn set_dynamic_parameter(&mut self, id: NodeId, param: &str, value: DynamicValue) -> GraphResult<()> {
        if self.definition(id)?.get_parameter(param).is_none() {
            return Err(GraphError::UnknownParameter {
                node_id: Some(id),
                parameter: param.to_string(),
            });
        }
        self.node_mut(id)?
            .dynamic_parameters
            .insert(param.to_string(), value);
        Ok(())
    }

    /// Return a parameter to its static value.
    pub fn clear_dynamic_parameter(&mut self, id: NodeId, param: &str) -> GraphResult<Option<DynamicValue>> {
        Ok(self.node_mut(id)?.dynamic_parameters.shift_remove(param))
    }

    /// Point a graph instance node at its graph.
    pub fn set_graph_reference(&mut self, id: NodeId, reference: GraphReference) -> GraphResult<()> {
        if !self.definition(id)?.is_graph_reference() {
            return Err(GraphError::UnknownParameter {
                node_id: Some(id),
                parameter: "graph_reference".to_string(),
            });
        }
        self.node_mut(id)?.graph_reference = Some(reference);
        Ok(())
    }

    // ========================================================================
    // Graph Inputs and Outputs
    // ========================================================================

    /// Expose a new graph input parameter.
    pub fn add_input_parameter(&mut self, input: InputParameter) -> GraphResult<()> {
        if self.input_parameters.contains_key(&input.id) {
            return Err(GraphError::DuplicateIdentifier(input.id));
        }
        if !input.param_type.accepts(&input.default) {
            return Err(GraphError::ParameterTypeMismatch {
                parameter: input.id,
                expected: input.param_type,
                got: input.default.pin_type(),
            });
        }
        debug!("Added input parameter '{}'", input.id);
        self.input_parameters.insert(input.id.clone(), input);
        Ok(())
    }

    /// Remove a graph input parameter. Removing an absent one is a no-op.
    pub fn delete_input_parameter(&mut self, id: &str) -> Option<InputParameter> {
        let removed = self.input_parameters.shift_remove(id);
        if removed.is_some() {
            debug!("Deleted input parameter '{}'", id);
        }
        removed
    }

    /// Get a graph input parameter.
    pub fn input_parameter(&self, id: &str) -> Option<&InputParameter> {
        self.input_parameters.get(id)
    }

    /// All graph input parameters, in declaration order.
    pub fn input_parameters(&self) -> impl Iterator<Item = &InputParameter> {
        self.input_parameters.values()
    }

    /// Designate a node as a graph output regardless of its kind.
    pub fn declare_output(&mut self, id: NodeId) -> GraphResult<()> {
        self.node(id)?;
        if !self.explicit_outputs.contains(&id) {
            self.explicit_outputs.push(id);
        }
        Ok(())
    }

    /// Drop an explicit output designation.
    pub fn undeclare_output(&mut self, id: NodeId) -> bool {
        let before = self.explicit_outputs.len();
        self.explicit_outputs.retain(|o| *o != id);
        before != self.explicit_outputs.len()
    }

    /// Output nodes: every Output-kind node, then explicit designations.
    pub fn declared_outputs(&self) -> Vec<NodeId> {
        let mut outputs: Vec<NodeId> = self
            .nodes
            .values()
            .filter(|n| self.kind_of(n) == Some(NodeKind::Output))
            .map(|n| n.id)
            .collect();
        for id in &self.explicit_outputs {
            if !outputs.contains(id) {
                outputs.push(*id);
            }
        }
        outputs
    }

    /// Nodes explicitly designated as outputs.
    pub fn explicit_outputs(&self) -> &[NodeId] {
        &self.explicit_outputs
    }

    pub(crate) fn kind_of(&self, node: &GraphNode) -> Option<NodeKind> {
        self.catalog.lookup(&node.definition_id).map(|d| d.kind)
    }

    // ========================================================================
    // Frames
    // ========================================================================

    /// Add an empty frame.
    pub fn add_frame(&mut self, id: impl Into<String>, label: impl Into<String>) -> GraphResult<()> {
        let id = id.into();
        if self.frames.iter().any(|f| f.id == id) {
            return Err(GraphError::DuplicateIdentifier(id));
        }
        self.frames.push(Frame {
            id,
            label: label.into(),
            members: Vec::new(),
        });
        Ok(())
    }

    /// Put a node in a frame. Returns `false` when the frame does not exist.
    pub fn add_to_frame(&mut self, frame: &str, id: NodeId) -> GraphResult<bool> {
        self.node(id)?;
        match self.frames.iter_mut().find(|f| f.id == frame) {
            Some(frame) => {
                if !frame.members.contains(&id) {
                    frame.members.push(id);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// All frames.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    // ========================================================================
    // Ordering
    // ========================================================================

    /// Node ids in a dependency-respecting order, stable w.r.t. arena order.
    pub fn topological_order(&self) -> GraphResult<Vec<NodeId>> {
        let nodes: Vec<NodeId> = self.node_ids().collect();
        let edges: Vec<(NodeId, NodeId)> = self.edges().map(|(dest, c)| (c.source, dest)).collect();
        TopologicalSorter::sort(&nodes, &edges)
    }

    /// Reorder the arena so that enumeration is topological.
    pub fn sort_nodes(&mut self) -> GraphResult<()> {
        let order = self.topological_order()?;
        let rank: HashMap<u32, usize> = order
            .iter()
            .enumerate()
            .map(|(index, id)| (id.uid, index))
            .collect();
        self.nodes.sort_by(|a, _, b, _| {
            let a = rank.get(a).copied().unwrap_or(usize::MAX);
            let b = rank.get(b).copied().unwrap_or(usize::MAX);
            a.cmp(&b)
        });
        Ok(())
    }
}

/// Check a value against a node definition's parameter schema.
fn check_parameter(definition: &NodeDefinition, id: NodeId, param: &str, value: &Value) -> GraphResult<()> {
    let schema = definition
        .get_parameter(param)
        .ok_or_else(|| GraphError::UnknownParameter {
            node_id: Some(id),
            parameter: param.to_string(),
        })?;
    if !schema.param_type.accepts(value) {
        return Err(GraphError::ParameterTypeMismatch {
            parameter: param.to_string(),
            expected: schema.param_type,
            got: value.pin_type(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::fixtures::{chain_abc, init_logging, scalar_graph};

    #[test]
    fn test_create_and_delete_node() {
        init_logging();
        let mut graph = scalar_graph();

        let id = graph.create_node("scalar", Position::default()).unwrap();
        assert_eq!(graph.node_count(), 1);
        assert!(graph.has_node(id));
        assert_eq!(graph.parameter(id, "gain").unwrap(), &Value::Float(1.0));

        graph.delete_node(id).unwrap();
        assert_eq!(graph.node_count(), 0);
        assert!(!graph.has_node(id));
        assert_eq!(graph.delete_node(id), Err(GraphError::UnknownNode(id)));
    }

    #[test]
    fn test_unknown_definition() {
        let mut graph = scalar_graph();
        let result = graph.create_node("missing", Position::default());
        assert_eq!(result, Err(GraphError::UnknownDefinition("missing".to_string())));
        assert!(graph.is_empty());
    }

    #[test]
    fn test_uids_never_reused() {
        let mut graph = scalar_graph();
        let a = graph.create_node("scalar", Position::default()).unwrap();
        graph.delete_node(a).unwrap();
        let b = graph.create_node("scalar", Position::default()).unwrap();
        assert_ne!(a.uid, b.uid);

        let result = graph.restore_node("scalar", Some(a.uid), Position::default(), IndexMap::new());
        assert!(matches!(result, Err(GraphError::DuplicateIdentifier(_))));
        let result = graph.restore_node("scalar", Some(b.uid), Position::default(), IndexMap::new());
        assert!(matches!(result, Err(GraphError::DuplicateIdentifier(_))));
    }

    #[test]
    fn test_restore_node_advances_allocator() {
        let mut graph = scalar_graph();
        let mut params = IndexMap::new();
        params.insert("gain".to_string(), Value::Float(3.0));

        let restored = graph
            .restore_node("scalar", Some(40), Position::default(), params)
            .unwrap();
        assert_eq!(restored.uid, 40);
        assert_eq!(graph.parameter(restored, "gain").unwrap(), &Value::Float(3.0));

        let next = graph.create_node("scalar", Position::default()).unwrap();
        assert!(next.uid > 40);

        let mut bad = IndexMap::new();
        bad.insert("gain".to_string(), Value::Bool(true));
        let result = graph.restore_node("scalar", None, Position::default(), bad);
        assert!(matches!(result, Err(GraphError::ParameterTypeMismatch { .. })));
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_uid_space_exhaustion() {
        let mut graph = scalar_graph();
        let top = graph
            .restore_node("scalar", Some(u32::MAX), Position::default(), IndexMap::new())
            .unwrap();
        assert_eq!(top.uid, u32::MAX);

        let result = graph.create_node("scalar", Position::default());
        assert!(matches!(result, Err(GraphError::DuplicateIdentifier(_))));
        let result = graph.restore_node("scalar", None, Position::default(), IndexMap::new());
        assert!(matches!(result, Err(GraphError::DuplicateIdentifier(_))));
        assert_eq!(graph.node_count(), 1);

        // Explicit uids below the top stay usable.
        let low = graph
            .restore_node("scalar", Some(3), Position::default(), IndexMap::new())
            .unwrap();
        assert_eq!(low.uid, 3);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_connect_and_disconnect_round_trip() {
        let mut graph = scalar_graph();
        let a = graph.create_node("source", Position::default()).unwrap();
        let b = graph.create_node("scalar", Position::default()).unwrap();

        let connected = graph.connect(a, None, b, "in").unwrap();
        assert!(connected.replaced.is_none());
        assert_eq!(graph.connection_count(), 1);
        assert_eq!(graph.connections_from(a).len(), 1);
        assert_eq!(graph.resolved_source_pin(&graph.connections_to(b)[0]), Some("out"));

        let removed = graph.disconnect(b, "in", a).unwrap();
        assert_eq!(removed.id, connected.id);
        assert_eq!(graph.connection_count(), 0);
        assert!(graph.disconnect(b, "in", a).is_none());
        assert!(graph.disconnect_by_id(connected.id).is_none());
    }

    #[test]
    fn test_connect_replaces_occupied_input() {
        let mut graph = scalar_graph();
        let a1 = graph.create_node("source", Position::default()).unwrap();
        let a2 = graph.create_node("source", Position::default()).unwrap();
        let b = graph.create_node("scalar", Position::default()).unwrap();

        let first = graph.connect(a1, None, b, "in").unwrap();
        let second = graph.connect(a2, Some("out"), b, "in").unwrap();

        assert_eq!(second.replaced.map(|c| c.id), Some(first.id));
        assert_eq!(graph.connection_count(), 1);
        assert_eq!(graph.connections_to(b)[0].source, a2);
    }

    #[test]
    fn test_variadic_input_accumulates() {
        let mut graph = scalar_graph();
        let a1 = graph.create_node("source", Position::default()).unwrap();
        let a2 = graph.create_node("source", Position::default()).unwrap();
        let merge = graph.create_node("merge", Position::default()).unwrap();

        graph.connect(a1, None, merge, "items").unwrap();
        let second = graph.connect(a2, None, merge, "items").unwrap();
        assert!(second.replaced.is_none());
        assert_eq!(graph.node(merge).unwrap().incoming("items").count(), 2);
    }

    #[test]
    fn test_delete_removes_incident_connections() {
        let mut graph = scalar_graph();
        let (a, b, c) = chain_abc(&mut graph);
        graph.add_frame("frame", "Frame").unwrap();
        assert!(graph.add_to_frame("frame", b).unwrap());
        assert!(!graph.add_to_frame("nowhere", b).unwrap());
        graph.declare_output(b).unwrap();

        graph.delete_node(b).unwrap();

        assert_eq!(graph.connection_count(), 0);
        assert!(graph.edges().all(|(dest, conn)| dest != b && conn.source != b));
        assert!(graph.frames()[0].members.is_empty());
        assert!(!graph.explicit_outputs().contains(&b));
        assert!(graph.has_node(a) && graph.has_node(c));
    }

    #[test]
    fn test_cross_graph_ids() {
        let mut graph = scalar_graph();
        let mut other = scalar_graph();
        let foreign = other.create_node("scalar", Position::default()).unwrap();
        let local = graph.create_node("source", Position::default()).unwrap();

        assert!(matches!(graph.node(foreign), Err(GraphError::CrossGraph { .. })));
        assert!(matches!(
            graph.connect(local, None, foreign, "in"),
            Err(GraphError::CrossGraph { .. })
        ));
        assert!(matches!(graph.delete_node(foreign), Err(GraphError::CrossGraph { .. })));
    }

    #[test]
    fn test_parameters() {
        let mut graph = scalar_graph();
        let b = graph.create_node("scalar", Position::default()).unwrap();

        let previous = graph.set_parameter(b, "gain", Value::Float(2.0)).unwrap();
        assert_eq!(previous, Some(Value::Float(1.0)));
        assert!(matches!(
            graph.set_parameter(b, "gain", Value::String("x".into())),
            Err(GraphError::ParameterTypeMismatch { .. })
        ));
        assert!(matches!(
            graph.set_parameter(b, "missing", Value::Float(0.0)),
            Err(GraphError::UnknownParameter { .. })
        ));

        graph
            .set_dynamic_parameter(b, "gain", DynamicValue::new(r#"input["amount"] * 2"#))
            .unwrap();
        assert!(graph.node(b).unwrap().dynamic_parameter("gain").is_some());
        assert!(graph.clear_dynamic_parameter(b, "gain").unwrap().is_some());
        assert!(graph.clear_dynamic_parameter(b, "gain").unwrap().is_none());
    }

    #[test]
    fn test_graph_reference_only_on_instances() {
        let mut graph = Graph::new(DefinitionCatalog::with_builtins().into_shared());
        let instance = graph.create_node("graph_instance", Position::default()).unwrap();
        let blur = graph.create_node("blur", Position::default()).unwrap();

        graph
            .set_graph_reference(instance, GraphReference::Package("tile".into()))
            .unwrap();
        assert!(graph.node(instance).unwrap().graph_reference.is_some());
        assert!(graph
            .set_graph_reference(blur, GraphReference::External("pkg://x".into()))
            .is_err());
    }

    #[test]
    fn test_input_parameters() {
        let mut graph = scalar_graph();
        graph
            .add_input_parameter(InputParameter::new("amount", PinType::FLOAT1, Value::Float(0.5)))
            .unwrap();

        let duplicate =
            graph.add_input_parameter(InputParameter::new("amount", PinType::FLOAT1, Value::Float(0.0)));
        assert!(matches!(duplicate, Err(GraphError::DuplicateIdentifier(_))));
        let mistyped =
            graph.add_input_parameter(InputParameter::new("flag", PinType::BOOLEAN, Value::Float(0.0)));
        assert!(matches!(mistyped, Err(GraphError::ParameterTypeMismatch { .. })));

        assert!(graph.delete_input_parameter("amount").is_some());
        assert!(graph.delete_input_parameter("amount").is_none());
    }

    #[test]
    fn test_declared_outputs() {
        let mut graph = scalar_graph();
        let (_, b, c) = chain_abc(&mut graph);
        assert_eq!(graph.declared_outputs(), vec![c]);

        graph.declare_output(b).unwrap();
        graph.declare_output(c).unwrap();
        assert_eq!(graph.declared_outputs(), vec![c, b]);
        assert!(graph.undeclare_output(b));
        assert_eq!(graph.declared_outputs(), vec![c]);
    }

    #[test]
    fn test_sort_nodes_reorders_arena() {
        let mut graph = scalar_graph();
        let c = graph.create_node("sink", Position::default()).unwrap();
        let b = graph.create_node("scalar", Position::default()).unwrap();
        let a = graph.create_node("source", Position::default()).unwrap();
        graph.connect(b, None, c, "in").unwrap();
        graph.connect(a, None, b, "in").unwrap();

        graph.sort_nodes().unwrap();
        assert_eq!(graph.node_ids().collect::<Vec<_>>(), vec![a, b, c]);
    }

    #[test]
    fn test_reachability() {
        let mut graph = scalar_graph();
        let (a, b, c) = chain_abc(&mut graph);

        assert!(graph.is_reachable(a, c));
        assert!(graph.is_reachable(b, b));
        assert!(!graph.is_reachable(c, a));
    }

    #[test]
    fn test_position_arithmetic() {
        let origin = Position::new(10.0, 0.0, 1.0);
        let step = Position::new(150.0, 5.0, 0.0);
        assert_eq!(origin + step * 2.0, Position::new(310.0, 10.0, 1.0));
    }
}
