//! Whole-graph invariant audit.
//!
//! The graph keeps its invariants incrementally; the audit re-derives them
//! from scratch. Loaders run it after restoring a saved graph, and the
//! property tests run it after every random edit.

use crate::core::error::{ConnectionId, GraphError, NodeId};
use crate::core::types::{is_compatible, PinType};
use crate::graph::structure::Graph;
use std::collections::HashMap;
use std::fmt;

/// One broken invariant.
#[derive(Debug, Clone, PartialEq)]
pub enum AuditViolation {
    /// The graph contains a loop through these nodes.
    Cycle { nodes: Vec<NodeId> },
    /// A node names a definition missing from the catalog.
    UnknownDefinition { node: NodeId, definition: String },
    /// A connection reads from a node that does not exist.
    DanglingSource { connection: ConnectionId, source: NodeId },
    /// A connection names a pin missing from the definitions.
    UnknownPin { connection: ConnectionId, pin: String },
    /// A connection joins incompatible pin types.
    TypeMismatch {
        connection: ConnectionId,
        from_type: PinType,
        to_type: PinType,
    },
    /// A non-variadic input holds more than one connection.
    Overoccupied { node: NodeId, pin: String, count: usize },
    /// A frame or output designation names a deleted node.
    StaleReference { node: NodeId },
}

impl fmt::Display for AuditViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditViolation::Cycle { nodes } => write!(f, "cycle through {:?}", nodes),
            AuditViolation::UnknownDefinition { node, definition } => {
                write!(f, "node {} uses unknown definition '{}'", node, definition)
            }
            AuditViolation::DanglingSource { connection, source } => {
                write!(f, "connection {} reads missing node {}", connection, source)
            }
            AuditViolation::UnknownPin { connection, pin } => {
                write!(f, "connection {} names missing pin '{}'", connection, pin)
            }
            AuditViolation::TypeMismatch {
                connection,
                from_type,
                to_type,
            } => write!(f, "connection {} joins {} to {}", connection, from_type, to_type),
            AuditViolation::Overoccupied { node, pin, count } => {
                write!(f, "input {}.{} holds {} connections", node, pin, count)
            }
            AuditViolation::StaleReference { node } => write!(f, "stale reference to {}", node),
        }
    }
}

/// Result of an audit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditReport {
    /// Every violation found, in discovery order
    pub violations: Vec<AuditViolation>,
}

impl AuditReport {
    /// Whether every invariant holds.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Re-checks every structural invariant of a graph.
pub struct InvariantAudit<'a> {
    graph: &'a Graph,
}

impl<'a> InvariantAudit<'a> {
    /// Create an audit of the given graph.
    pub fn new(graph: &'a Graph) -> Self {
        Self { graph }
    }

    /// Run every check.
    pub fn run(&self) -> AuditReport {
        let mut violations = Vec::new();
        self.check_connections(&mut violations);
        self.check_references(&mut violations);

        if let Err(GraphError::CycleDetected { nodes }) = self.graph.topological_order() {
            violations.push(AuditViolation::Cycle { nodes });
        }

        AuditReport { violations }
    }

    fn check_connections(&self, violations: &mut Vec<AuditViolation>) {
        let graph = self.graph;

        for node in graph.nodes() {
            let Some(definition) = graph.catalog().lookup(&node.definition_id) else {
                violations.push(AuditViolation::UnknownDefinition {
                    node: node.id,
                    definition: node.definition_id.clone(),
                });
                continue;
            };

            let mut occupancy: HashMap<&str, usize> = HashMap::new();
            for conn in &node.connections {
                *occupancy.entry(conn.input_pin.as_str()).or_default() += 1;

                if !graph.has_node(conn.source) {
                    violations.push(AuditViolation::DanglingSource {
                        connection: conn.id,
                        source: conn.source,
                    });
                    continue;
                }

                let output = graph
                    .definition(conn.source)
                    .ok()
                    .and_then(|d| d.resolve_output(conn.source_pin.as_deref()));
                let input = definition.get_input(&conn.input_pin);

                match (output, input) {
                    (Some(output), Some(input)) => {
                        if !is_compatible(output.pin_type, input.pin_type) {
                            violations.push(AuditViolation::TypeMismatch {
                                connection: conn.id,
                                from_type: output.pin_type,
                                to_type: input.pin_type,
                            });
                        }
                    }
                    (None, _) => violations.push(AuditViolation::UnknownPin {
                        connection: conn.id,
                        pin: conn.source_pin.clone().unwrap_or_default(),
                    }),
                    (_, None) => violations.push(AuditViolation::UnknownPin {
                        connection: conn.id,
                        pin: conn.input_pin.clone(),
                    }),
                }
            }

            for (pin, count) in occupancy {
                let variadic = definition.get_input(pin).map_or(false, |p| p.variadic);
                if count > 1 && !variadic {
                    violations.push(AuditViolation::Overoccupied {
                        node: node.id,
                        pin: pin.to_string(),
                        count,
                    });
                }
            }
        }
    }

    fn check_references(&self, violations: &mut Vec<AuditViolation>) {
        let graph = self.graph;
        let framed = graph.frames().iter().flat_map(|f| f.members.iter());
        for &node in framed.chain(graph.explicit_outputs()) {
            if !graph.has_node(node) {
                violations.push(AuditViolation::StaleReference { node });
            }
        }
    }
}
