//! Structural duplication of a node or connected pattern.
//!
//! `PatternIterator::iterate` clones a pattern N times. Generation 0 is the
//! original pattern; generation g is laid out at `offset × g`. Edges inside
//! the pattern are copied onto every generation, and chain links wire
//! generation g into generation g+1. Consumers of the chained output are
//! moved to the last generation, so iterating B in `A → B → C` three times
//! yields `A → B → B1 → B2 → B3 → C`.

use crate::core::error::{ConnectionId, GraphError, GraphResult, NodeId};
use crate::core::types::{is_compatible, PinType, Value};
use crate::graph::structure::{Graph, GraphNode, Position};
use crate::graph::topology::TopologyAnalyzer;
use crate::validation::connection::ConnectionValidator;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Wiring from one generation of a pattern to the next.
///
/// Omitted pins are inferred: the output when the node has exactly one, the
/// input when exactly one is compatible with the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainLink {
    /// Pattern node whose output feeds the next generation
    pub out_node: NodeId,
    /// Output pin on `out_node`
    pub out_pin: Option<String>,
    /// Pattern node fed from the previous generation
    pub in_node: NodeId,
    /// Input pin on `in_node`
    pub in_pin: Option<String>,
}

impl ChainLink {
    /// Link two pattern nodes, inferring both pins.
    pub fn new(out_node: NodeId, in_node: NodeId) -> Self {
        Self {
            out_node,
            out_pin: None,
            in_node,
            in_pin: None,
        }
    }

    /// Name the output pin.
    pub fn with_out_pin(mut self, pin: impl Into<String>) -> Self {
        self.out_pin = Some(pin.into());
        self
    }

    /// Name the input pin.
    pub fn with_in_pin(mut self, pin: impl Into<String>) -> Self {
        self.in_pin = Some(pin.into());
        self
    }
}

/// Per-clone parameter edits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IterationOptions {
    /// Give every random seed parameter a fresh value on each clone.
    pub randomize_seeds: bool,
    /// Parameter receiving the 1-based generation index.
    pub index_parameter: Option<String>,
}

/// A chain link with pins resolved, as indices into the pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedLink {
    out_index: usize,
    out_pin: String,
    in_index: usize,
    in_pin: String,
}

/// An edge between two pattern nodes, as indices into the pattern.
struct InternalEdge {
    source: usize,
    source_pin: Option<String>,
    dest: usize,
    dest_pin: String,
}

/// Everything iteration needs, computed before the first mutation.
struct IterationPlan {
    templates: Vec<GraphNode>,
    internal: Vec<InternalEdge>,
    links: Vec<ResolvedLink>,
    /// Outside consumers of a chained output: (consumer, connection, link).
    consumers: Vec<(NodeId, ConnectionId, usize)>,
}

/// Duplicates patterns of nodes.
pub struct PatternIterator;

impl PatternIterator {
    /// Clone `pattern` `count` times and return the clones, generation-major.
    ///
    /// Without `chain`, a single-node pattern infers its chain from the
    /// connections it already has; a larger pattern is copied unchained.
    /// `offset` defaults to the configured iteration offset.
    ///
    /// Pattern and chain errors are raised before any mutation. If committing
    /// a generation fails, that generation is removed again and the earlier
    /// ones stay.
    ///
    /// Outside consumers are moved to the last generation only when the
    /// connection validator accepts the new source; otherwise they stay on the
    /// original pattern and a warning is logged.
    pub fn iterate(
        graph: &mut Graph,
        pattern: &[NodeId],
        count: usize,
        chain: Option<&[ChainLink]>,
        offset: Option<Position>,
        options: &IterationOptions,
    ) -> GraphResult<Vec<NodeId>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let limit = graph.config().max_iteration_count;
        if count > limit {
            return Err(GraphError::IterationLimit {
                requested: count,
                limit,
            });
        }

        let plan = Self::plan(graph, pattern, chain)?;
        let offset = offset.unwrap_or(graph.config().default_iteration_offset);
        let mut rng = match graph.config().random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut result = Vec::with_capacity(count * pattern.len());
        let mut previous: Vec<NodeId> = pattern.to_vec();

        for generation in 1..=count {
            let mut created = Vec::with_capacity(pattern.len());
            let committed = Self::commit_generation(
                graph,
                &plan,
                &previous,
                generation,
                offset,
                options,
                &mut rng,
                &mut created,
            );

            if let Err(err) = committed {
                warn!("Rolling back iteration generation {}: {}", generation, err);
                for id in created {
                    if let Err(cleanup) = graph.delete_node(id) {
                        warn!("Rollback could not delete {}: {}", id, cleanup);
                    }
                }
                return Err(err);
            }

            debug!("Committed iteration generation {} of {}", generation, count);
            result.extend_from_slice(&created);
            previous = created;
        }

        Self::move_consumers(graph, &plan, &previous);
        Ok(result)
    }

    /// Validate the pattern and resolve everything that could fail.
    fn plan(graph: &Graph, pattern: &[NodeId], chain: Option<&[ChainLink]>) -> GraphResult<IterationPlan> {
        if pattern.is_empty() {
            return Err(invalid_pattern("pattern is empty"));
        }

        let mut index: HashMap<NodeId, usize> = HashMap::with_capacity(pattern.len());
        let mut templates = Vec::with_capacity(pattern.len());
        for (i, &id) in pattern.iter().enumerate() {
            let node = graph
                .node(id)
                .map_err(|err| invalid_pattern(&format!("node {} does not resolve: {}", id, err)))?;
            if index.insert(id, i).is_some() {
                return Err(invalid_pattern(&format!("node {} is listed twice", id)));
            }
            templates.push(node.clone());
        }

        if !TopologyAnalyzer::new(graph).is_connected_subset(pattern) {
            return Err(invalid_pattern("pattern is not connected"));
        }

        let mut internal = Vec::new();
        for (dest, template) in templates.iter().enumerate() {
            for conn in &template.connections {
                if let Some(&source) = index.get(&conn.source) {
                    internal.push(InternalEdge {
                        source,
                        source_pin: conn.source_pin.clone(),
                        dest,
                        dest_pin: conn.input_pin.clone(),
                    });
                }
            }
        }

        let links = match chain {
            Some(links) => links
                .iter()
                .map(|link| resolve_link(graph, &index, link))
                .collect::<GraphResult<Vec<_>>>()?,
            None if pattern.len() == 1 => infer_links(graph, pattern[0])?,
            None => Vec::new(),
        };

        for link in &links {
            let fed_internally = internal
                .iter()
                .any(|edge| edge.dest == link.in_index && edge.dest_pin == link.in_pin);
            let variadic = graph
                .definition(pattern[link.in_index])?
                .get_input(&link.in_pin)
                .map_or(false, |pin| pin.variadic);
            if fed_internally && !variadic {
                return Err(invalid_pattern(&format!(
                    "chain input {}.{} is already fed inside the pattern",
                    pattern[link.in_index], link.in_pin
                )));
            }
        }

        let mut consumers = Vec::new();
        for (link_index, link) in links.iter().enumerate() {
            let out_node = pattern[link.out_index];
            for (dest, conn) in graph.connections_from(out_node) {
                if index.contains_key(&dest) {
                    continue;
                }
                if graph.resolved_source_pin(conn) == Some(link.out_pin.as_str()) {
                    consumers.push((dest, conn.id, link_index));
                }
            }
        }

        Ok(IterationPlan {
            templates,
            internal,
            links,
            consumers,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn commit_generation(
        graph: &mut Graph,
        plan: &IterationPlan,
        previous: &[NodeId],
        generation: usize,
        offset: Position,
        options: &IterationOptions,
        rng: &mut StdRng,
        created: &mut Vec<NodeId>,
    ) -> GraphResult<()> {
        for template in &plan.templates {
            let position = template.position + offset * generation as f64;
            let id = graph.create_node(&template.definition_id, position)?;
            created.push(id);

            let node = graph.node_mut(id)?;
            node.parameters = template.parameters.clone();
            node.dynamic_parameters = template.dynamic_parameters.clone();
            node.graph_reference = template.graph_reference.clone();

            Self::apply_options(graph, id, generation, options, rng)?;
        }

        for edge in &plan.internal {
            graph.restore_connection(
                created[edge.source],
                edge.source_pin.as_deref(),
                created[edge.dest],
                &edge.dest_pin,
            )?;
        }

        for link in &plan.links {
            graph.connect(
                previous[link.out_index],
                Some(&link.out_pin),
                created[link.in_index],
                &link.in_pin,
            )?;
        }

        Ok(())
    }

    fn apply_options(
        graph: &mut Graph,
        id: NodeId,
        generation: usize,
        options: &IterationOptions,
        rng: &mut StdRng,
    ) -> GraphResult<()> {
        let definition = graph.definition(id)?;

        let mut edits: Vec<(String, Value)> = Vec::new();
        if options.randomize_seeds {
            for param in definition.parameters.iter().filter(|p| p.random_seed) {
                edits.push((param.id.clone(), Value::Int(rng.gen_range(0..i32::MAX))));
            }
        }
        if let Some(name) = &options.index_parameter {
            if let Some(param) = definition.get_parameter(name) {
                edits.push((param.id.clone(), index_value(param.param_type, generation)));
            }
        }

        for (param, value) in edits {
            graph.set_parameter(id, &param, value)?;
        }
        Ok(())
    }

    /// Point the outside consumers of every chained output at the last generation.
    fn move_consumers(graph: &mut Graph, plan: &IterationPlan, last: &[NodeId]) {
        for &(dest, connection, link_index) in &plan.consumers {
            let link = &plan.links[link_index];
            let source = last[link.out_index];
            let Some(input_pin) = graph.connection(connection).map(|(_, c)| c.input_pin.clone()) else {
                continue;
            };

            let checked = ConnectionValidator::new(graph).validate(source, Some(&link.out_pin), dest, &input_pin);
            if let Err(err) = checked {
                warn!("Keeping consumer {}.{} on the original pattern: {}", dest, input_pin, err);
                continue;
            }

            let Ok(node) = graph.node_mut(dest) else {
                continue;
            };
            if let Some(conn) = node.connections.iter_mut().find(|c| c.id == connection) {
                conn.source = source;
                conn.source_pin = Some(link.out_pin.clone());
                debug!("Moved consumer {}.{} to {}", dest, input_pin, source);
            }
        }
    }
}

fn invalid_pattern(reason: &str) -> GraphError {
    GraphError::InvalidPattern {
        reason: reason.to_string(),
    }
}

fn index_value(param_type: PinType, generation: usize) -> Value {
    if param_type.accepts(&Value::Int(0)) {
        Value::Int(generation as i32)
    } else {
        Value::Float(generation as f32)
    }
}

/// Resolve the pins of an explicit chain link.
fn resolve_link(graph: &Graph, index: &HashMap<NodeId, usize>, link: &ChainLink) -> GraphResult<ResolvedLink> {
    let position = |id: NodeId| {
        index
            .get(&id)
            .copied()
            .ok_or_else(|| invalid_pattern(&format!("chain node {} is not in the pattern", id)))
    };
    let out_index = position(link.out_node)?;
    let in_index = position(link.in_node)?;

    let out_definition = graph.definition(link.out_node)?;
    let output = match &link.out_pin {
        Some(pin) => out_definition
            .get_output(pin)
            .ok_or_else(|| GraphError::InvalidPin {
                node_id: link.out_node,
                pin: pin.clone(),
            })?,
        None => out_definition
            .resolve_output(None)
            .ok_or(GraphError::AmbiguousChainInference {
                node_id: link.out_node,
                pin: "<output>".to_string(),
                candidates: out_definition.outputs.len(),
            })?,
    };

    let in_definition = graph.definition(link.in_node)?;
    let in_pin = match &link.in_pin {
        Some(pin) => {
            in_definition
                .get_input(pin)
                .ok_or_else(|| GraphError::InvalidPin {
                    node_id: link.in_node,
                    pin: pin.clone(),
                })?
                .id
                .clone()
        }
        None => {
            let candidates: Vec<&str> = in_definition
                .inputs
                .iter()
                .filter(|p| is_compatible(output.pin_type, p.pin_type))
                .map(|p| p.id.as_str())
                .collect();
            unique(candidates, link.in_node, "<input>")?
        }
    };

    Ok(ResolvedLink {
        out_index,
        out_pin: output.id.clone(),
        in_index,
        in_pin,
    })
}

/// Infer chain links for a single-node pattern from its boundary edges.
///
/// An incoming edge `X.o -> P.i` chains the clone's output typed like `X.o`
/// into `i`; an outgoing edge `P.o -> Y.i` chains `o` into the clone's input
/// typed like `Y.i`. Each must find exactly one candidate.
fn infer_links(graph: &Graph, node: NodeId) -> GraphResult<Vec<ResolvedLink>> {
    let definition = graph.definition(node)?;
    let mut links: Vec<ResolvedLink> = Vec::new();

    for conn in graph.connections_to(node) {
        let source_type = graph
            .definition(conn.source)?
            .resolve_output(conn.source_pin.as_deref())
            .map(|p| p.pin_type)
            .unwrap_or(PinType::NONE);
        let candidates: Vec<&str> = definition
            .outputs
            .iter()
            .filter(|p| p.pin_type.intersects(source_type))
            .map(|p| p.id.as_str())
            .collect();
        let out_pin = unique(candidates, node, &conn.input_pin)?;
        push_unique(&mut links, out_pin, conn.input_pin.clone());
    }

    for (dest, conn) in graph.connections_from(node) {
        let input_type = graph
            .definition(dest)?
            .get_input(&conn.input_pin)
            .map(|p| p.pin_type)
            .unwrap_or(PinType::NONE);
        let candidates: Vec<&str> = definition
            .inputs
            .iter()
            .filter(|p| p.pin_type.intersects(input_type))
            .map(|p| p.id.as_str())
            .collect();
        let out_pin = graph
            .resolved_source_pin(conn)
            .unwrap_or_default()
            .to_string();
        let in_pin = unique(candidates, node, &out_pin)?;
        push_unique(&mut links, out_pin, in_pin);
    }

    Ok(links)
}

fn unique(candidates: Vec<&str>, node_id: NodeId, pin: &str) -> GraphResult<String> {
    match candidates.as_slice() {
        [only] => Ok((*only).to_string()),
        _ => Err(GraphError::AmbiguousChainInference {
            node_id,
            pin: pin.to_string(),
            candidates: candidates.len(),
        }),
    }
}

fn push_unique(links: &mut Vec<ResolvedLink>, out_pin: String, in_pin: String) {
    let link = ResolvedLink {
        out_index: 0,
        out_pin,
        in_index: 0,
        in_pin,
    };
    if !links.contains(&link) {
        links.push(link);
    }
}
