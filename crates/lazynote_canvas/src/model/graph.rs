//! Node/edge graph value and its pure mutation functions.
//!
//! # Responsibility
//! - Hold the ordered node and edge sequences of one canvas.
//! - Provide total mutation functions that return a new `Graph` value.
//!
//! # Invariants
//! - Mutations never modify `self`; callers swap in the returned value.
//! - `remove_nodes` cascades to every edge touching a removed node.
//! - `add_edge` keeps the graph unchanged for self-loops, unknown endpoints
//!   and duplicate edge ids. Parallel edges are allowed.
//! - Node/edge order is insertion order and survives every mutation.

use super::edge::{Edge, EdgePatch};
use super::ids::{EdgeId, NodeId};
use super::node::{Node, NodePayload, Point, StylePatch};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// What `Graph::normalized` had to drop to restore the graph invariants.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphRepair {
    /// Nodes dropped because their id repeated an earlier node or they
    /// failed validation.
    pub dropped_nodes: Vec<NodeId>,
    /// Edges dropped because an endpoint is missing, they connect a node
    /// to itself, or their id repeated.
    pub dropped_edges: Vec<Edge>,
}

impl GraphRepair {
    pub fn is_clean(&self) -> bool {
        self.dropped_nodes.is_empty() && self.dropped_edges.is_empty()
    }
}

impl Graph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Whether `id` is used by any node or edge. Used by id generation.
    pub fn contains_id(&self, id: &str) -> bool {
        self.contains_node(id) || self.edge(id).is_some()
    }

    pub fn add_node(&self, node: Node) -> Self {
        if self.contains_node(&node.id) || node.validate().is_err() {
            return self.clone();
        }
        let mut next = self.clone();
        next.nodes.push(node);
        next
    }

    /// Appends several nodes, skipping any that would break id uniqueness.
    pub fn add_nodes(&self, nodes: impl IntoIterator<Item = Node>) -> Self {
        nodes
            .into_iter()
            .fold(self.clone(), |graph, node| graph.add_node(node))
    }

    pub fn remove_nodes(&self, ids: &[NodeId]) -> Self {
        let removed: HashSet<&str> = ids.iter().map(String::as_str).collect();
        Self {
            nodes: self
                .nodes
                .iter()
                .filter(|node| !removed.contains(node.id.as_str()))
                .cloned()
                .collect(),
            edges: self
                .edges
                .iter()
                .filter(|edge| {
                    !removed.contains(edge.source.as_str())
                        && !removed.contains(edge.target.as_str())
                })
                .cloned()
                .collect(),
        }
    }

    pub fn remove_edges(&self, ids: &[EdgeId]) -> Self {
        let removed: HashSet<&str> = ids.iter().map(String::as_str).collect();
        Self {
            nodes: self.nodes.clone(),
            edges: self
                .edges
                .iter()
                .filter(|edge| !removed.contains(edge.id.as_str()))
                .cloned()
                .collect(),
        }
    }

    pub fn add_edge(&self, edge: Edge) -> Self {
        if edge.source == edge.target
            || !self.contains_node(&edge.source)
            || !self.contains_node(&edge.target)
            || self.edge(&edge.id).is_some()
        {
            return self.clone();
        }
        let mut next = self.clone();
        next.edges.push(edge);
        next
    }

    pub fn update_node_position(&self, id: &str, position: Point) -> Self {
        if !position.is_finite() {
            return self.clone();
        }
        self.map_nodes(|node| {
            if node.id == id {
                node.position = position;
            }
        })
    }

    /// Replaces the payload of one node. Size and style are kept, even when
    /// the payload kind changes.
    pub fn update_node_payload(&self, id: &str, payload: &NodePayload) -> Self {
        self.map_nodes(|node| {
            if node.id == id {
                node.payload = payload.clone();
            }
        })
    }

    pub fn restyle_nodes(&self, ids: &[NodeId], patch: &StylePatch) -> Self {
        let targets: HashSet<&str> = ids.iter().map(String::as_str).collect();
        self.map_nodes(|node| {
            if targets.contains(node.id.as_str()) {
                patch.apply_to(&mut node.style);
            }
        })
    }

    pub fn update_edge(&self, id: &str, patch: &EdgePatch) -> Self {
        let mut next = self.clone();
        for edge in next.edges.iter_mut().filter(|edge| edge.id == id) {
            patch.apply_to(edge);
        }
        next
    }

    /// Returns a copy whose selection flags match exactly the given ids.
    pub fn with_selection(&self, node_ids: &[NodeId], edge_ids: &[EdgeId]) -> Self {
        let nodes: HashSet<&str> = node_ids.iter().map(String::as_str).collect();
        let edges: HashSet<&str> = edge_ids.iter().map(String::as_str).collect();
        let mut next = self.clone();
        for node in &mut next.nodes {
            node.selected = nodes.contains(node.id.as_str());
        }
        for edge in &mut next.edges {
            edge.selected = edges.contains(edge.id.as_str());
        }
        next
    }

    pub fn selected_node_ids(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|node| node.selected)
            .map(|node| node.id.clone())
            .collect()
    }

    pub fn selected_edge_ids(&self) -> Vec<EdgeId> {
        self.edges
            .iter()
            .filter(|edge| edge.selected)
            .map(|edge| edge.id.clone())
            .collect()
    }

    /// Replaces node positions from a layout result, matched by id.
    pub fn with_positions(&self, laid_out: &[Node]) -> Self {
        self.map_nodes(|node| {
            if let Some(placed) = laid_out.iter().find(|placed| placed.id == node.id) {
                if placed.position.is_finite() {
                    node.position = placed.position;
                }
            }
        })
    }

    /// Drops edges whose endpoints are missing. Dropped edges are returned
    /// so callers can report them.
    pub fn drop_dangling_edges(&self) -> (Self, Vec<Edge>) {
        let node_ids: HashSet<&str> = self.nodes.iter().map(|node| node.id.as_str()).collect();
        let (kept, dropped): (Vec<Edge>, Vec<Edge>) =
            self.edges.iter().cloned().partition(|edge| {
                node_ids.contains(edge.source.as_str()) && node_ids.contains(edge.target.as_str())
            });
        (
            Self {
                nodes: self.nodes.clone(),
                edges: kept,
            },
            dropped,
        )
    }

    /// Restores every graph invariant on untrusted input (drafts, imports,
    /// store rows): duplicate or invalid nodes first, then duplicate,
    /// dangling and self-loop edges.
    pub fn normalized(&self) -> (Self, GraphRepair) {
        let mut repair = GraphRepair::default();
        let mut seen_nodes = HashSet::new();
        let mut nodes = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if node.validate().is_err() || !seen_nodes.insert(node.id.as_str()) {
                repair.dropped_nodes.push(node.id.clone());
                continue;
            }
            nodes.push(node.clone());
        }

        let mut seen_edges = HashSet::new();
        let mut edges = Vec::with_capacity(self.edges.len());
        for edge in &self.edges {
            let endpoints_present = seen_nodes.contains(edge.source.as_str())
                && seen_nodes.contains(edge.target.as_str());
            let self_loop = edge.source == edge.target;
            if !endpoints_present || self_loop || !seen_edges.insert(edge.id.as_str()) {
                repair.dropped_edges.push(edge.clone());
                continue;
            }
            edges.push(edge.clone());
        }

        (Self { nodes, edges }, repair)
    }

    fn map_nodes(&self, mut apply: impl FnMut(&mut Node)) -> Self {
        let mut next = self.clone();
        for node in &mut next.nodes {
            apply(node);
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::Graph;
    use crate::model::{Edge, Node, NodeKind, Point};

    fn sticky(id: &str) -> Node {
        Node::new(id, NodeKind::Sticky.empty_payload(), Point::default())
    }

    #[test]
    fn mutations_leave_source_graph_untouched() {
        let graph = Graph::default().add_node(sticky("a"));
        let moved = graph.update_node_position("a", Point::new(10.0, 20.0));
        assert_eq!(graph.nodes[0].position, Point::default());
        assert_eq!(moved.nodes[0].position, Point::new(10.0, 20.0));
    }

    #[test]
    fn normalized_keeps_first_duplicate_and_drops_its_dangling_edges() {
        let mut duplicate = sticky("a");
        duplicate.position = Point::new(99.0, 99.0);
        let graph = Graph::new(
            vec![sticky("a"), duplicate, sticky("b")],
            vec![Edge::new("e1", "a", "b"), Edge::new("e2", "b", "ghost")],
        );

        let (fixed, repair) = graph.normalized();
        assert_eq!(fixed.nodes.len(), 2);
        assert_eq!(fixed.nodes[0].position, Point::default());
        assert_eq!(fixed.edges.len(), 1);
        assert_eq!(repair.dropped_nodes, vec!["a".to_string()]);
        assert_eq!(repair.dropped_edges[0].id, "e2");
    }
}
