//! Automatic layout strategies for canvas nodes.
//!
//! # Responsibility
//! - Compute new node positions for one of five named strategies.
//! - Keep every strategy a pure function of `(nodes, edges, config)`.
//!
//! # Invariants
//! - Output has the same nodes, ids, payloads, and order as the input; only
//!   `position` changes. Edges are never touched.
//! - Every strategy is deterministic: nodes are processed in id order and
//!   "random" starts are seeded from the sorted id list, never the clock.
//! - Output coordinates are always finite.
//! - Empty input is rejected with `LayoutError::NoNodes`.

mod circular;
mod force;
mod grid;
mod hierarchical;
mod tree;

use crate::model::{Edge, Node, Point};
use log::warn;
use rustc_hash::FxHashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub type LayoutResult<T> = Result<T, LayoutError>;

/// Named layout algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutStrategy {
    Grid,
    Circular,
    Tree,
    Hierarchical,
    ForceDirected,
}

impl LayoutStrategy {
    pub const ALL: [LayoutStrategy; 5] = [
        Self::Grid,
        Self::Circular,
        Self::Tree,
        Self::Hierarchical,
        Self::ForceDirected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::Circular => "circular",
            Self::Tree => "tree",
            Self::Hierarchical => "hierarchical",
            Self::ForceDirected => "force",
        }
    }
}

impl Display for LayoutStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutStrategy {
    type Err = LayoutError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "grid" => Ok(Self::Grid),
            "circular" | "circle" => Ok(Self::Circular),
            "tree" => Ok(Self::Tree),
            "hierarchical" | "layered" => Ok(Self::Hierarchical),
            "force" | "force_directed" | "force-directed" => Ok(Self::ForceDirected),
            other => Err(LayoutError::UnknownStrategy(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// Layout was requested for a canvas without nodes.
    NoNodes,
    /// Strategy name could not be parsed.
    UnknownStrategy(String),
}

impl Display for LayoutError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoNodes => write!(f, "add some nodes before applying a layout"),
            Self::UnknownStrategy(value) => write!(
                f,
                "unknown layout strategy `{value}`; expected grid|circular|tree|hierarchical|force"
            ),
        }
    }
}

impl Error for LayoutError {}

/// Tuning knobs shared by all strategies.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Top-left anchor of the laid-out bounding box.
    pub origin: Point,
    /// Gap between neighbouring cells/siblings.
    pub margin: f64,
    /// Vertical gap between tree/hierarchy levels.
    pub level_gap: f64,
    /// Barycenter sweeps for the hierarchical strategy.
    pub hierarchy_passes: usize,
    /// Integration steps for the force-directed strategy.
    pub force_steps: usize,
    pub force_repulsion: f64,
    pub force_attraction: f64,
    /// Pull towards the layout center; keeps disconnected parts bounded.
    pub force_gravity: f64,
    /// Spring rest length. `None` derives it from the average node size.
    pub force_rest_length: Option<f64>,
    /// Mixed into the id-derived seed of the force-directed start.
    pub seed: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            origin: Point::new(0.0, 0.0),
            margin: 40.0,
            level_gap: 80.0,
            hierarchy_passes: 4,
            force_steps: 200,
            force_repulsion: 1_000_000.0,
            force_attraction: 0.08,
            force_gravity: 0.01,
            force_rest_length: None,
            seed: 0,
        }
    }
}

/// Applies `strategy` with the default configuration.
pub fn apply_layout(
    strategy: LayoutStrategy,
    nodes: &[Node],
    edges: &[Edge],
) -> LayoutResult<Vec<Node>> {
    apply_layout_with(strategy, nodes, edges, &LayoutConfig::default())
}

/// Applies `strategy` and returns repositioned copies of `nodes`.
pub fn apply_layout_with(
    strategy: LayoutStrategy,
    nodes: &[Node],
    edges: &[Edge],
    config: &LayoutConfig,
) -> LayoutResult<Vec<Node>> {
    if nodes.is_empty() {
        return Err(LayoutError::NoNodes);
    }

    let graph = LayoutGraph::new(nodes, edges);
    let positions = match strategy {
        LayoutStrategy::Grid => grid::place(&graph, config),
        LayoutStrategy::Circular => circular::place(&graph, config),
        LayoutStrategy::Tree => tree::place(&graph, config),
        LayoutStrategy::Hierarchical => hierarchical::place(&graph, config),
        LayoutStrategy::ForceDirected => force::place(&graph, config),
    };

    let mut laid_out = nodes.to_vec();
    for (sorted_index, position) in positions.into_iter().enumerate() {
        let original_index = graph.order[sorted_index];
        let node = &mut laid_out[original_index];
        if position.is_finite() {
            node.position = position;
        } else {
            warn!(
                "event=layout_guard module=layout status=fallback strategy={} reason=non_finite",
                strategy
            );
        }
    }
    Ok(laid_out)
}

/// Id-sorted adjacency view of the input used by every strategy.
///
/// Index `i` always refers to the `i`-th node in id order, so sorting by
/// index equals sorting by id.
struct LayoutGraph<'a> {
    nodes: Vec<&'a Node>,
    /// `order[i]` is the input index of sorted node `i`.
    order: Vec<usize>,
    /// Deduplicated out-neighbours, ascending.
    children: Vec<Vec<usize>>,
    /// Deduplicated in-neighbours, ascending.
    parents: Vec<Vec<usize>>,
    /// Deduplicated directed pairs `(source, target)`, self-loops removed.
    links: Vec<(usize, usize)>,
}

impl<'a> LayoutGraph<'a> {
    fn new(nodes: &'a [Node], edges: &[Edge]) -> Self {
        let mut order: Vec<usize> = (0..nodes.len()).collect();
        order.sort_by(|&a, &b| nodes[a].id.cmp(&nodes[b].id).then(a.cmp(&b)));
        let sorted: Vec<&Node> = order.iter().map(|&index| &nodes[index]).collect();

        let mut index: FxHashMap<&str, usize> = FxHashMap::default();
        for (position, node) in sorted.iter().enumerate() {
            index.entry(node.id.as_str()).or_insert(position);
        }

        let mut links: Vec<(usize, usize)> = edges
            .iter()
            .filter_map(|edge| {
                let source = *index.get(edge.source.as_str())?;
                let target = *index.get(edge.target.as_str())?;
                (source != target).then_some((source, target))
            })
            .collect();
        links.sort_unstable();
        links.dedup();

        let mut children = vec![Vec::new(); sorted.len()];
        let mut parents = vec![Vec::new(); sorted.len()];
        for &(source, target) in &links {
            children[source].push(target);
            parents[target].push(source);
        }
        for list in parents.iter_mut() {
            list.sort_unstable();
        }

        Self {
            nodes: sorted,
            order,
            children,
            parents,
            links,
        }
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }

    fn max_width(&self) -> f64 {
        self.nodes
            .iter()
            .map(|node| node.size.width)
            .fold(0.0, f64::max)
    }

    fn max_height(&self) -> f64 {
        self.nodes
            .iter()
            .map(|node| node.size.height)
            .fold(0.0, f64::max)
    }

    /// Average of `max(width, height)` over all nodes.
    fn average_extent(&self) -> f64 {
        let total: f64 = self
            .nodes
            .iter()
            .map(|node| node.size.width.max(node.size.height))
            .sum();
        total / self.len() as f64
    }

    /// Converts a center point of sorted node `index` to its top-left corner.
    fn top_left(&self, index: usize, center: Point) -> Point {
        let size = self.nodes[index].size;
        Point::new(center.x - size.width / 2.0, center.y - size.height / 2.0)
    }
}

/// Shifts `positions` so that the bounding box of the placed nodes starts at
/// `origin`.
fn anchor_to_origin(positions: &mut [Point], origin: Point) {
    let min_x = positions.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let min_y = positions.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    if !min_x.is_finite() || !min_y.is_finite() {
        return;
    }
    for position in positions.iter_mut() {
        *position = position.offset(origin.x - min_x, origin.y - min_y);
    }
}
