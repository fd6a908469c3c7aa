//! Connection validation.
//!
//! Every edge committed through `Graph::connect` passes this gate first. The
//! validator only reads the graph, so a rejected edge leaves it untouched.

use crate::core::error::{ConnectionId, GraphError, GraphResult, NodeId};
use crate::core::pin::PinDefinition;
use crate::core::types::is_compatible;
use crate::graph::structure::Graph;
use log::trace;

/// What committing a validated edge will do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionPlan {
    /// Resolved output pin on the source.
    pub source_pin: String,
    /// Connection that will be displaced from a non-variadic input.
    pub replaced: Option<ConnectionId>,
}

/// Read-only gate for new connections.
pub struct ConnectionValidator<'a> {
    graph: &'a Graph,
}

impl<'a> ConnectionValidator<'a> {
    /// Create a validator for the given graph.
    pub fn new(graph: &'a Graph) -> Self {
        Self { graph }
    }

    /// Check a prospective edge `source.source_pin -> dest.dest_pin`.
    ///
    /// Checks run in order: graph membership, node existence, pins, type
    /// compatibility, occupancy of the destination, then cycle safety.
    pub fn validate(
        &self,
        source: NodeId,
        source_pin: Option<&str>,
        dest: NodeId,
        dest_pin: &str,
    ) -> GraphResult<ConnectionPlan> {
        self.check_membership(source, dest)?;
        let (output, input) = self.resolve_pins(source, source_pin, dest, dest_pin)?;

        if !is_compatible(output.pin_type, input.pin_type) {
            return Err(GraphError::IncompatibleType {
                from_type: output.pin_type,
                to_type: input.pin_type,
            });
        }

        let replaced = if input.variadic {
            None
        } else {
            self.graph
                .node(dest)?
                .incoming(dest_pin)
                .next()
                .map(|c| c.id)
        };

        if self.would_create_cycle(source, dest) {
            return Err(GraphError::CycleDetected {
                nodes: vec![source, dest],
            });
        }

        trace!("Validated {}.{} -> {}.{}", source, output.id, dest, dest_pin);
        Ok(ConnectionPlan {
            source_pin: output.id.clone(),
            replaced,
        })
    }

    /// Both ids must come from this graph and name live nodes.
    pub fn check_membership(&self, source: NodeId, dest: NodeId) -> GraphResult<()> {
        self.graph.check_owned(source)?;
        self.graph.check_owned(dest)?;
        self.graph.node(source)?;
        self.graph.node(dest)?;
        Ok(())
    }

    /// Resolve the output pin of `source` and the input pin of `dest`.
    ///
    /// An omitted source pin names the source's only output.
    pub fn resolve_pins(
        &self,
        source: NodeId,
        source_pin: Option<&str>,
        dest: NodeId,
        dest_pin: &str,
    ) -> GraphResult<(&'a PinDefinition, &'a PinDefinition)> {
        let graph = self.graph;
        let output = graph
            .definition(source)?
            .resolve_output(source_pin)
            .ok_or_else(|| GraphError::InvalidPin {
                node_id: source,
                pin: source_pin.unwrap_or("<default>").to_string(),
            })?;
        let input = graph
            .definition(dest)?
            .get_input(dest_pin)
            .ok_or_else(|| GraphError::InvalidPin {
                node_id: dest,
                pin: dest_pin.to_string(),
            })?;
        Ok((output, input))
    }

    /// Whether adding `source -> dest` would close a loop, that is whether
    /// `source` already depends on `dest`.
    pub fn would_create_cycle(&self, source: NodeId, dest: NodeId) -> bool {
        self.graph.is_reachable(dest, source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PinType;
    use crate::graph::fixtures::{chain_abc, init_logging, scalar_graph};
    use crate::graph::structure::Position;

    #[test]
    fn test_scenario_b_cycle_rejected() {
        init_logging();
        let mut graph = scalar_graph();
        let (a, b, c) = chain_abc(&mut graph);
        let d = graph.create_node("scalar", Position::default()).unwrap();

        let result = graph.connect(c, None, a, "seed");
        assert!(matches!(result, Err(GraphError::CycleDetected { .. })));
        assert_eq!(graph.connection_count(), 2);

        let result = graph.connect(b, None, b, "in");
        assert!(matches!(result, Err(GraphError::CycleDetected { .. })));
        assert_eq!(graph.connection_count(), 2);

        let validator = ConnectionValidator::new(&graph);
        assert!(validator.would_create_cycle(b, a));
        assert!(!validator.would_create_cycle(a, d));
    }

    #[test]
    fn test_cycle_check_matches_reachability() {
        let mut graph = scalar_graph();
        let (a, b, c) = chain_abc(&mut graph);
        let d = graph.create_node("scalar", Position::default()).unwrap();
        let validator = ConnectionValidator::new(&graph);

        for source in [a, b, c, d] {
            for dest in [a, b, c, d] {
                assert_eq!(
                    validator.would_create_cycle(source, dest),
                    graph.is_reachable(dest, source),
                    "{} -> {}",
                    source,
                    dest
                );
            }
        }
    }

    #[test]
    fn test_cycle_through_longer_path() {
        let mut graph = scalar_graph();
        let a = graph.create_node("source", Position::default()).unwrap();
        let b1 = graph.create_node("scalar", Position::default()).unwrap();
        let b2 = graph.create_node("scalar", Position::default()).unwrap();
        let b3 = graph.create_node("scalar", Position::default()).unwrap();
        graph.connect(a, None, b1, "in").unwrap();
        graph.connect(b1, None, b2, "in").unwrap();
        graph.connect(b2, None, b3, "in").unwrap();

        let before = graph.connection_count();
        let result = graph.connect(b3, None, b1, "in");
        assert!(matches!(result, Err(GraphError::CycleDetected { .. })));
        assert_eq!(graph.connection_count(), before);
        assert_eq!(graph.connections_to(b1)[0].source, a);
    }

    #[test]
    fn test_scenario_c_incompatible_type() {
        let mut graph = scalar_graph();
        let a = graph.create_node("source", Position::default()).unwrap();
        let b = graph.create_node("scalar", Position::default()).unwrap();

        let result = graph.connect(a, None, b, "boolIn");
        assert_eq!(
            result,
            Err(GraphError::IncompatibleType {
                from_type: PinType::FLOAT1,
                to_type: PinType::BOOLEAN,
            })
        );
        assert_eq!(graph.connection_count(), 0);
    }

    #[test]
    fn test_invalid_pins() {
        let mut graph = scalar_graph();
        let a = graph.create_node("source", Position::default()).unwrap();
        let b = graph.create_node("scalar", Position::default()).unwrap();
        let pair = graph.create_node("pair", Position::default()).unwrap();

        assert!(matches!(
            graph.connect(a, Some("nope"), b, "in"),
            Err(GraphError::InvalidPin { node_id, .. }) if node_id == a
        ));
        assert!(matches!(
            graph.connect(a, None, b, "nope"),
            Err(GraphError::InvalidPin { node_id, .. }) if node_id == b
        ));
        assert!(matches!(
            graph.connect(b, Some("in"), pair, "a"),
            Err(GraphError::InvalidPin { .. })
        ));
    }

    #[test]
    fn test_unknown_node_after_delete() {
        let mut graph = scalar_graph();
        let a = graph.create_node("source", Position::default()).unwrap();
        let b = graph.create_node("scalar", Position::default()).unwrap();
        graph.delete_node(a).unwrap();

        assert_eq!(graph.connect(a, None, b, "in"), Err(GraphError::UnknownNode(a)));
    }

    #[test]
    fn test_plan_reports_replacement() {
        let mut graph = scalar_graph();
        let (a, b, _) = chain_abc(&mut graph);
        let other = graph.create_node("source", Position::default()).unwrap();
        let existing = graph.connections_to(b)[0].id;

        let plan = ConnectionValidator::new(&graph)
            .validate(other, None, b, "in")
            .unwrap();
        assert_eq!(plan.source_pin, "out");
        assert_eq!(plan.replaced, Some(existing));
        // Validation alone changes nothing.
        assert_eq!(graph.connections_to(b)[0].source, a);
    }

    #[test]
    fn test_restore_connection_checks_pins_only() {
        let mut graph = scalar_graph();
        let a = graph.create_node("source", Position::default()).unwrap();
        let b = graph.create_node("scalar", Position::default()).unwrap();

        assert!(matches!(
            graph.restore_connection(a, None, b, "missing"),
            Err(GraphError::InvalidPin { .. })
        ));
        // Types are trusted on restore.
        graph.restore_connection(a, None, b, "boolIn").unwrap();
        assert_eq!(graph.connection_count(), 1);
    }
}
