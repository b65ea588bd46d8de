use std::collections::HashMap;

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::error::EngineError;

use super::types::{TaskEdge, TaskNode};

/// Immutable per-run view of a workflow graph.
///
/// Built once from the caller-supplied nodes and edges; the scheduler only
/// reads from it. There are no mutation methods.
#[derive(Debug)]
pub struct GraphModel {
    graph: StableDiGraph<TaskNode, TaskEdge>,
    node_index_map: HashMap<String, NodeIndex>,
    /// Node IDs in declaration order; start-node selection is deterministic.
    order: Vec<String>,
}

impl GraphModel {
    pub fn build(nodes: &[TaskNode], edges: &[TaskEdge]) -> Result<Self, EngineError> {
        let mut graph = StableDiGraph::new();
        let mut node_index_map: HashMap<String, NodeIndex> = HashMap::new();
        let mut order = Vec::with_capacity(nodes.len());

        for node in nodes {
            if node_index_map.contains_key(&node.id) {
                return Err(EngineError::GraphBuildError(format!(
                    "Duplicate node id: {}",
                    node.id
                )));
            }
            let idx = graph.add_node(node.clone());
            node_index_map.insert(node.id.clone(), idx);
            order.push(node.id.clone());
        }

        for edge in edges {
            let source_idx = node_index_map.get(&edge.source).ok_or_else(|| {
                EngineError::GraphBuildError(format!("Source node not found: {}", edge.source))
            })?;
            let target_idx = node_index_map.get(&edge.target).ok_or_else(|| {
                EngineError::GraphBuildError(format!("Target node not found: {}", edge.target))
            })?;
            graph.add_edge(*source_idx, *target_idx, edge.clone());
        }

        Ok(Self {
            graph,
            node_index_map,
            order,
        })
    }

    pub fn node(&self, node_id: &str) -> Option<&TaskNode> {
        let idx = self.node_index_map.get(node_id)?;
        self.graph.node_weight(*idx)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Node IDs in declaration order.
    pub fn node_ids(&self) -> &[String] {
        &self.order
    }

    /// The first node in declaration order with no incoming edge, or `None`
    /// when every node has a predecessor (a cyclic graph with no entry).
    pub fn start_node(&self) -> Option<&TaskNode> {
        self.start_nodes().into_iter().next()
    }

    /// All nodes with no incoming edge, in declaration order. Each is an
    /// independent root of the traversal.
    pub fn start_nodes(&self) -> Vec<&TaskNode> {
        self.order
            .iter()
            .filter_map(|id| {
                let idx = self.node_index_map.get(id)?;
                if self.incoming_edge_count_idx(*idx) == 0 {
                    self.graph.node_weight(*idx)
                } else {
                    None
                }
            })
            .collect()
    }

    /// All edges whose source is `node_id`, in insertion order.
    pub fn outgoing_edges(&self, node_id: &str) -> Vec<&TaskEdge> {
        let Some(idx) = self.node_index_map.get(node_id) else {
            return Vec::new();
        };
        let mut edges: Vec<&TaskEdge> = self
            .graph
            .edges_directed(*idx, Direction::Outgoing)
            .map(|e| e.weight())
            .collect();
        // petgraph iterates edges most-recent-first; restore insertion order
        edges.reverse();
        edges
    }

    /// Number of incoming edges, counting parallel edges individually.
    pub fn incoming_edge_count(&self, node_id: &str) -> usize {
        self.node_index_map
            .get(node_id)
            .map(|idx| self.incoming_edge_count_idx(*idx))
            .unwrap_or(0)
    }

    fn incoming_edge_count_idx(&self, idx: NodeIndex) -> usize {
        self.graph.edges_directed(idx, Direction::Incoming).count()
    }
}
