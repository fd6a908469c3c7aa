//! Removal of nodes and graph inputs that cannot affect any output.

use crate::core::error::{GraphResult, NodeId};
use crate::core::node::NodeKind;
use crate::graph::structure::Graph;
use crate::graph::topology::TopologyAnalyzer;
use indexmap::IndexSet;
use log::debug;

/// What a prune removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PruneReport {
    /// Deleted nodes, in arena order
    pub removed_nodes: Vec<NodeId>,
    /// Deleted graph input parameters
    pub removed_parameters: Vec<String>,
}

impl PruneReport {
    /// Whether nothing was removed.
    pub fn is_empty(&self) -> bool {
        self.removed_nodes.is_empty() && self.removed_parameters.is_empty()
    }
}

/// Reachability analysis from the declared outputs.
pub struct ReachabilityPruner<'a> {
    graph: &'a Graph,
}

impl<'a> ReachabilityPruner<'a> {
    /// Create a pruner analysing the given graph.
    pub fn new(graph: &'a Graph) -> Self {
        Self { graph }
    }

    /// Nodes with no path to any declared output, in arena order.
    ///
    /// Input placeholders are never reported: they define the graph's
    /// interface whether or not anything reads them.
    pub fn unreachable_nodes(&self) -> Vec<NodeId> {
        let outputs = self.graph.declared_outputs();
        let reachable = TopologyAnalyzer::new(self.graph).upstream_closure(&outputs);

        self.graph
            .nodes()
            .filter(|n| !reachable.contains(&n.id))
            .filter(|n| self.graph.kind_of(n) != Some(NodeKind::Input))
            .map(|n| n.id)
            .collect()
    }

    /// Graph inputs read by no node expression, directly or through the
    /// visibility condition of another kept input.
    pub fn unreachable_parameters(&self) -> Vec<String> {
        let graph = self.graph;
        let mut kept: IndexSet<String> = IndexSet::new();

        for node in graph.nodes() {
            for dynamic in node.dynamic_parameters.values() {
                for name in dynamic.referenced_inputs() {
                    if graph.input_parameter(&name).is_some() {
                        kept.insert(name);
                    }
                }
            }
        }

        // Grow to a fixed point over visibility conditions.
        let mut cursor = 0;
        while cursor < kept.len() {
            let referenced = kept
                .get_index(cursor)
                .and_then(|id| graph.input_parameter(id))
                .map(|p| p.visibility_references())
                .unwrap_or_default();
            for name in referenced {
                if graph.input_parameter(&name).is_some() {
                    kept.insert(name);
                }
            }
            cursor += 1;
        }

        graph
            .input_parameters()
            .filter(|p| !kept.contains(&p.id))
            .map(|p| p.id.clone())
            .collect()
    }

    /// Delete every unreachable node, then every unreferenced input.
    ///
    /// Running it again on the result removes nothing.
    pub fn prune(graph: &mut Graph) -> GraphResult<PruneReport> {
        let mut report = PruneReport::default();

        let nodes = ReachabilityPruner::new(graph).unreachable_nodes();
        for id in nodes {
            graph.delete_node(id)?;
            report.removed_nodes.push(id);
        }
        let parameters = ReachabilityPruner::new(graph).unreachable_parameters();
        for id in parameters {
            if graph.delete_input_parameter(&id).is_some() {
                report.removed_parameters.push(id);
            }
        }

        debug!(
            "Pruned {} node(s) and {} input parameter(s)",
            report.removed_nodes.len(),
            report.removed_parameters.len()
        );
        Ok(report)
    }
}
