//! Tidy-tree placement over a spanning forest of the edge set.
//!
//! # Invariants
//! - One root per weakly connected component: the lowest-id node without
//!   incoming edges, or the lowest id when every node has one (cycles).
//! - Nodes a root's BFS cannot reach become extra roots by the same rule.
//! - Leaves take consecutive horizontal slots; parents sit centered over
//!   their first and last child.

use super::{LayoutConfig, LayoutGraph};
use crate::model::Point;
use std::collections::VecDeque;

/// BFS spanning forest shared by the tree and hierarchical strategies.
pub(super) struct Forest {
    pub roots: Vec<usize>,
    /// Tree children in id order.
    pub children: Vec<Vec<usize>>,
    pub depth: Vec<usize>,
}

impl Forest {
    pub fn build(graph: &LayoutGraph<'_>) -> Self {
        let count = graph.len();
        let mut roots = Vec::new();
        let mut children = vec![Vec::new(); count];
        let mut depth = vec![0usize; count];
        let mut visited = vec![false; count];
        let mut in_component = vec![false; count];

        for start in 0..count {
            if in_component[start] {
                continue;
            }
            let component = weak_component(graph, start, &mut in_component);

            while let Some(root) = pick_root(graph, &component, &visited) {
                roots.push(root);
                visited[root] = true;
                depth[root] = 0;
                let mut queue = VecDeque::from([root]);
                while let Some(current) = queue.pop_front() {
                    for &child in &graph.children[current] {
                        if visited[child] {
                            continue;
                        }
                        visited[child] = true;
                        depth[child] = depth[current] + 1;
                        children[current].push(child);
                        queue.push_back(child);
                    }
                }
            }
        }

        Self {
            roots,
            children,
            depth,
        }
    }

    /// Horizontal slot centers: leaves consecutive, parents centered.
    ///
    /// Iterative post-order so deep chains cannot overflow the stack.
    pub fn slot_centers(&self, slot_width: f64) -> Vec<f64> {
        let mut x = vec![0.0; self.depth.len()];
        let mut next_slot = 0usize;

        for &root in &self.roots {
            let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
            while let Some((node, next_child)) = stack.pop() {
                let kids = &self.children[node];
                if next_child < kids.len() {
                    stack.push((node, next_child + 1));
                    stack.push((kids[next_child], 0));
                    continue;
                }
                x[node] = match (kids.first(), kids.last()) {
                    (Some(&first), Some(&last)) => (x[first] + x[last]) / 2.0,
                    _ => {
                        let slot = next_slot as f64 * slot_width;
                        next_slot += 1;
                        slot
                    }
                };
            }
        }
        x
    }
}

/// Ascending list of nodes weakly connected to `start`.
fn weak_component(graph: &LayoutGraph<'_>, start: usize, seen: &mut [bool]) -> Vec<usize> {
    let mut members = Vec::new();
    let mut queue = VecDeque::from([start]);
    seen[start] = true;
    while let Some(current) = queue.pop_front() {
        members.push(current);
        let neighbours = graph.children[current]
            .iter()
            .chain(graph.parents[current].iter());
        for &next in neighbours {
            if !seen[next] {
                seen[next] = true;
                queue.push_back(next);
            }
        }
    }
    members.sort_unstable();
    members
}

/// Lowest unvisited node without incoming edges, else lowest unvisited.
///
/// An unvisited node never has a visited parent (BFS would have reached it),
/// so the indegree test needs no filtering.
fn pick_root(graph: &LayoutGraph<'_>, component: &[usize], visited: &[bool]) -> Option<usize> {
    let mut unvisited = component.iter().copied().filter(|&node| !visited[node]);
    let fallback = unvisited.clone().next()?;
    Some(
        unvisited
            .find(|&node| graph.parents[node].is_empty())
            .unwrap_or(fallback),
    )
}

pub(super) fn place(graph: &LayoutGraph<'_>, config: &LayoutConfig) -> Vec<Point> {
    let forest = Forest::build(graph);
    let max_width = graph.max_width();
    let level_height = graph.max_height() + config.level_gap;
    let centers = forest.slot_centers(max_width + config.margin);

    (0..graph.len())
        .map(|index| {
            let half_width = graph.nodes[index].size.width / 2.0;
            Point::new(
                config.origin.x + centers[index] + max_width / 2.0 - half_width,
                config.origin.y + forest.depth[index] as f64 * level_height,
            )
        })
        .collect()
}
