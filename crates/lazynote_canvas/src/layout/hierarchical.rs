//! Layered placement with barycenter crossing reduction.
//!
//! Layers come from the spanning-forest depths. Starting from the tidy-tree
//! x coordinates, alternating downward/upward sweeps move every node to the
//! mean x of its neighbours in the adjacent layer, then restore the minimum
//! spacing left to right.

use super::tree::Forest;
use super::{anchor_to_origin, LayoutConfig, LayoutGraph};
use crate::model::Point;

pub(super) fn place(graph: &LayoutGraph<'_>, config: &LayoutConfig) -> Vec<Point> {
    let forest = Forest::build(graph);
    let max_width = graph.max_width();
    let spacing = max_width + config.margin;
    let level_height = graph.max_height() + config.level_gap;

    let mut x = forest.slot_centers(spacing);
    let layers = build_layers(&forest.depth, &x);

    for pass in 0..config.hierarchy_passes {
        if pass % 2 == 0 {
            for layer in layers.iter().skip(1) {
                let desired = barycenters(layer, &x, |node| {
                    let depth = forest.depth[node];
                    let direct: Vec<usize> = graph.parents[node]
                        .iter()
                        .copied()
                        .filter(|&parent| forest.depth[parent] + 1 == depth)
                        .collect();
                    if direct.is_empty() {
                        graph.parents[node]
                            .iter()
                            .copied()
                            .filter(|&parent| forest.depth[parent] < depth)
                            .collect()
                    } else {
                        direct
                    }
                });
                spread_layer(desired, spacing, &mut x);
            }
        } else {
            for layer in layers.iter().rev().skip(1) {
                let desired = barycenters(layer, &x, |node| {
                    graph.children[node]
                        .iter()
                        .copied()
                        .filter(|&child| forest.depth[child] == forest.depth[node] + 1)
                        .collect()
                });
                spread_layer(desired, spacing, &mut x);
            }
        }
    }

    let mut positions: Vec<Point> = (0..graph.len())
        .map(|index| {
            let half_width = graph.nodes[index].size.width / 2.0;
            Point::new(
                x[index] + max_width / 2.0 - half_width,
                forest.depth[index] as f64 * level_height,
            )
        })
        .collect();
    anchor_to_origin(&mut positions, config.origin);
    positions
}

/// Groups nodes by depth, each layer ordered by its initial x then id.
fn build_layers(depth: &[usize], x: &[f64]) -> Vec<Vec<usize>> {
    let layer_count = depth.iter().copied().max().map_or(0, |max| max + 1);
    let mut layers = vec![Vec::new(); layer_count];
    for (node, &level) in depth.iter().enumerate() {
        layers[level].push(node);
    }
    for layer in &mut layers {
        layer.sort_by(|&a, &b| x[a].total_cmp(&x[b]).then(a.cmp(&b)));
    }
    layers
}

/// Desired x per node: mean x of `neighbours(node)`, or its current x when
/// it has none.
fn barycenters(
    layer: &[usize],
    x: &[f64],
    neighbours: impl Fn(usize) -> Vec<usize>,
) -> Vec<(usize, f64)> {
    layer
        .iter()
        .map(|&node| {
            let linked = neighbours(node);
            if linked.is_empty() {
                (node, x[node])
            } else {
                let sum: f64 = linked.iter().map(|&other| x[other]).sum();
                (node, sum / linked.len() as f64)
            }
        })
        .collect()
}

/// Orders a layer by desired x and enforces `spacing` between neighbours,
/// keeping the layer centered on the mean of its desired positions.
fn spread_layer(mut desired: Vec<(usize, f64)>, spacing: f64, x: &mut [f64]) {
    if desired.is_empty() {
        return;
    }
    desired.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

    let mut placed = Vec::with_capacity(desired.len());
    let mut previous: Option<f64> = None;
    for &(_, want) in &desired {
        let at = match previous {
            Some(prev) => want.max(prev + spacing),
            None => want,
        };
        placed.push(at);
        previous = Some(at);
    }

    let count = desired.len() as f64;
    let desired_mean: f64 = desired.iter().map(|(_, want)| want).sum::<f64>() / count;
    let placed_mean: f64 = placed.iter().sum::<f64>() / count;
    let shift = desired_mean - placed_mean;
    for ((node, _), at) in desired.iter().zip(placed) {
        x[*node] = at + shift;
    }
}
