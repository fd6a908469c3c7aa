//! Topological analysis and sorting of graphs.
//!
//! Provides algorithms for:
//! - Stable topological sorting (evaluation and serialization order)
//! - Sources, sinks and dependency closures
//! - Weakly connected components

use crate::core::error::{GraphError, GraphResult, NodeId};
use crate::graph::structure::Graph;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

/// Stable Kahn sort over an explicit node list and edge list.
pub struct TopologicalSorter;

impl TopologicalSorter {
    /// Sort `nodes` so that every edge `(from, to)` has `from` before `to`.
    ///
    /// Among ready nodes the one listed first in `nodes` wins, so an already
    /// sorted input comes back unchanged. A cyclic input fails with
    /// `CycleDetected` naming the nodes left unsorted.
    pub fn sort(nodes: &[NodeId], edges: &[(NodeId, NodeId)]) -> GraphResult<Vec<NodeId>> {
        let mut index: HashMap<NodeId, usize> = HashMap::with_capacity(nodes.len());
        let mut order: Vec<NodeId> = Vec::with_capacity(nodes.len());
        for &node in nodes {
            if !index.contains_key(&node) {
                index.insert(node, order.len());
                order.push(node);
            }
        }

        let mut in_degree = vec![0usize; order.len()];
        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); order.len()];

        for &(from, to) in edges {
            let from = *index.get(&from).ok_or(GraphError::UnknownNode(from))?;
            let to = *index.get(&to).ok_or(GraphError::UnknownNode(to))?;
            adjacency[from].push(to);
            in_degree[to] += 1;
        }

        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(i, _)| Reverse(i))
            .collect();

        let mut result = Vec::with_capacity(order.len());

        while let Some(Reverse(current)) = ready.pop() {
            result.push(order[current]);

            for &next in &adjacency[current] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    ready.push(Reverse(next));
                }
            }
        }

        if result.len() != order.len() {
            let remaining: Vec<NodeId> = in_degree
                .iter()
                .enumerate()
                .filter(|(_, degree)| **degree > 0)
                .map(|(i, _)| order[i])
                .collect();

            return Err(GraphError::CycleDetected { nodes: remaining });
        }

        Ok(result)
    }
}

/// Analyzer for graph topology.
pub struct TopologyAnalyzer<'a> {
    graph: &'a Graph,
}

impl<'a> TopologyAnalyzer<'a> {
    /// Create a new analyzer for the given graph.
    pub fn new(graph: &'a Graph) -> Self {
        Self { graph }
    }

    /// Nodes with no incoming connections.
    pub fn source_nodes(&self) -> Vec<NodeId> {
        self.graph
            .nodes()
            .filter(|n| n.connections.is_empty())
            .map(|n| n.id)
            .collect()
    }

    /// Nodes with no outgoing connections.
    pub fn sink_nodes(&self) -> Vec<NodeId> {
        let fed: HashSet<NodeId> = self.graph.edges().map(|(_, c)| c.source).collect();
        self.graph.node_ids().filter(|id| !fed.contains(id)).collect()
    }

    /// All nodes the given node depends on, nearest first.
    pub fn upstream(&self, node_id: NodeId) -> Vec<NodeId> {
        self.closure(&[node_id], |id| {
            self.graph.connections_to(id).iter().map(|c| c.source).collect()
        })
    }

    /// All nodes that depend on the given node, nearest first.
    pub fn downstream(&self, node_id: NodeId) -> Vec<NodeId> {
        self.closure(&[node_id], |id| {
            self.graph
                .connections_from(id)
                .into_iter()
                .map(|(dest, _)| dest)
                .collect()
        })
    }

    /// Backward closure of a set of roots, roots included.
    pub fn upstream_closure(&self, roots: &[NodeId]) -> HashSet<NodeId> {
        let mut reached: HashSet<NodeId> = roots
            .iter()
            .copied()
            .filter(|id| self.graph.has_node(*id))
            .collect();
        reached.extend(self.closure(roots, |id| {
            self.graph.connections_to(id).iter().map(|c| c.source).collect()
        }));
        reached
    }

    /// Find all weakly connected components, in arena order.
    pub fn find_subgraphs(&self) -> Vec<HashSet<NodeId>> {
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut subgraphs = Vec::new();

        for node_id in self.graph.node_ids() {
            if !visited.contains(&node_id) {
                let subgraph = self.flood_fill(node_id, None);
                visited.extend(&subgraph);
                subgraphs.push(subgraph);
            }
        }

        subgraphs
    }

    /// Whether `nodes` form one weakly connected piece using only edges
    /// between members.
    pub fn is_connected_subset(&self, nodes: &[NodeId]) -> bool {
        let Some(&first) = nodes.first() else {
            return false;
        };
        let members: HashSet<NodeId> = nodes.iter().copied().collect();
        self.flood_fill(first, Some(&members)).len() == members.len()
    }

    /// Breadth-first walk from `roots` along `next`, excluding the roots.
    fn closure<F>(&self, roots: &[NodeId], next: F) -> Vec<NodeId>
    where
        F: Fn(NodeId) -> Vec<NodeId>,
    {
        let mut result = Vec::new();
        let mut visited: HashSet<NodeId> = roots.iter().copied().collect();
        let mut queue: VecDeque<NodeId> = roots.iter().copied().collect();

        while let Some(current) = queue.pop_front() {
            for neighbor in next(current) {
                if visited.insert(neighbor) {
                    result.push(neighbor);
                    queue.push_back(neighbor);
                }
            }
        }

        result
    }

    /// Flood fill ignoring edge direction, optionally restricted to `within`.
    fn flood_fill(&self, start: NodeId, within: Option<&HashSet<NodeId>>) -> HashSet<NodeId> {
        let allowed = |id: &NodeId| within.map_or(true, |set| set.contains(id));
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            if visited.insert(current) {
                for (dest, _) in self.graph.connections_from(current) {
                    if allowed(&dest) {
                        queue.push_back(dest);
                    }
                }
                for conn in self.graph.connections_to(current) {
                    if allowed(&conn.source) {
                        queue.push_back(conn.source);
                    }
                }
            }
        }

        visited
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::GraphId;
    use crate::graph::fixtures::{chain_abc, scalar_graph};
    use crate::graph::structure::Position;
    use proptest::prelude::*;

    fn ids(count: u32) -> Vec<NodeId> {
        let graph = GraphId::new();
        (1..=count).map(|uid| NodeId::new(graph, uid)).collect()
    }

    #[test]
    fn test_topological_sort() {
        let n = ids(3);
        let sorted = TopologicalSorter::sort(&[n[2], n[1], n[0]], &[(n[0], n[1]), (n[1], n[2])]).unwrap();
        assert_eq!(sorted, vec![n[0], n[1], n[2]]);
    }

    #[test]
    fn test_sort_is_stable() {
        let n = ids(4);
        // Diamond: 0 -> 1, 0 -> 2, 1 -> 3, 2 -> 3
        let edges = [(n[0], n[1]), (n[0], n[2]), (n[1], n[3]), (n[2], n[3])];
        let sorted = TopologicalSorter::sort(&n, &edges).unwrap();
        assert_eq!(sorted, n);

        let swapped = [n[0], n[2], n[1], n[3]];
        assert_eq!(TopologicalSorter::sort(&swapped, &edges).unwrap(), swapped.to_vec());
    }

    #[test]
    fn test_sort_reports_cycle() {
        let n = ids(4);
        let edges = [(n[0], n[1]), (n[1], n[2]), (n[2], n[1]), (n[2], n[3])];
        match TopologicalSorter::sort(&n, &edges) {
            Err(GraphError::CycleDetected { nodes }) => assert_eq!(nodes, vec![n[1], n[2], n[3]]),
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_sort_unknown_edge_endpoint() {
        let n = ids(3);
        let result = TopologicalSorter::sort(&n[..2], &[(n[0], n[2])]);
        assert_eq!(result, Err(GraphError::UnknownNode(n[2])));
    }

    #[test]
    fn test_scenario_a_graph_order() {
        let mut graph = scalar_graph();
        let (a, b, c) = chain_abc(&mut graph);
        assert_eq!(graph.topological_order().unwrap(), vec![a, b, c]);
    }

    #[test]
    fn test_sources_sinks_and_closures() {
        let mut graph = scalar_graph();
        let (a, b, c) = chain_abc(&mut graph);
        let analyzer = TopologyAnalyzer::new(&graph);

        assert_eq!(analyzer.source_nodes(), vec![a]);
        assert_eq!(analyzer.sink_nodes(), vec![c]);
        assert_eq!(analyzer.downstream(a), vec![b, c]);
        assert_eq!(analyzer.upstream(c), vec![b, a]);
        assert_eq!(analyzer.upstream_closure(&[b]), [a, b].into_iter().collect());
    }

    #[test]
    fn test_find_subgraphs_and_connected_subset() {
        let mut graph = scalar_graph();
        let (a, b, c) = chain_abc(&mut graph);
        let lone = graph.create_node("scalar", Position::default()).unwrap();

        let analyzer = TopologyAnalyzer::new(&graph);
        assert_eq!(analyzer.find_subgraphs().len(), 2);
        assert!(analyzer.is_connected_subset(&[a, b]));
        assert!(analyzer.is_connected_subset(&[b]));
        assert!(!analyzer.is_connected_subset(&[a, c]));
        assert!(!analyzer.is_connected_subset(&[b, lone]));
        assert!(!analyzer.is_connected_subset(&[]));
    }

    proptest! {
        #[test]
        fn prop_sort_respects_edges(
            count in 1u32..12,
            raw_edges in proptest::collection::vec((0usize..12, 0usize..12), 0..30),
        ) {
            let n = ids(count);
            // Only forward edges, so the input is acyclic.
            let edges: Vec<(NodeId, NodeId)> = raw_edges
                .into_iter()
                .filter(|(x, y)| x < y && *y < n.len())
                .map(|(x, y)| (n[x], n[y]))
                .collect();

            let sorted = TopologicalSorter::sort(&n, &edges).unwrap();
            prop_assert_eq!(sorted.len(), n.len());
            let position: HashMap<NodeId, usize> =
                sorted.iter().enumerate().map(|(i, id)| (*id, i)).collect();
            for (from, to) in &edges {
                prop_assert!(position[from] < position[to]);
            }

            // Sorting an already sorted list is the identity.
            prop_assert_eq!(TopologicalSorter::sort(&sorted, &edges).unwrap(), sorted);
        }
    }
}
