//! Force-directed spring embedder.
//!
//! # Invariants
//! - Starting positions come from `StdRng` seeded with an `FxHasher` digest
//!   of the id-sorted node list (xor `LayoutConfig::seed`), so equal inputs
//!   give equal outputs.
//! - Displacement per step is capped by a temperature that decays linearly
//!   to zero over `force_steps`.
//! - Pair distances are floored at 1.0; coincident pairs are pushed apart
//!   along a direction derived from their indices.

use super::{anchor_to_origin, LayoutConfig, LayoutGraph};
use crate::model::Point;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

const MIN_DISTANCE: f64 = 1.0;
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

pub(super) fn place(graph: &LayoutGraph<'_>, config: &LayoutConfig) -> Vec<Point> {
    let count = graph.len();
    let rest_length = config
        .force_rest_length
        .filter(|length| length.is_finite() && *length > 0.0)
        .unwrap_or_else(|| graph.average_extent() * std::f64::consts::SQRT_2 + config.margin);

    let mut centers = initial_centers(graph, config.seed, rest_length);
    let initial_temperature = rest_length;
    let steps = config.force_steps;

    for step in 0..steps {
        let temperature = initial_temperature * (steps - step) as f64 / steps as f64;
        let mut displacement = vec![(0.0f64, 0.0f64); count];

        for i in 0..count {
            for j in (i + 1)..count {
                let (ux, uy, distance) = direction(centers[i], centers[j], i, j);
                let force = config.force_repulsion / (distance * distance);
                displacement[i].0 += ux * force;
                displacement[i].1 += uy * force;
                displacement[j].0 -= ux * force;
                displacement[j].1 -= uy * force;
            }
        }

        for &(source, target) in &graph.links {
            let (ux, uy, distance) = direction(centers[target], centers[source], target, source);
            // Positive force pulls the endpoints together.
            let force = config.force_attraction * (distance - rest_length);
            displacement[source].0 += ux * force;
            displacement[source].1 += uy * force;
            displacement[target].0 -= ux * force;
            displacement[target].1 -= uy * force;
        }

        for (index, center) in centers.iter_mut().enumerate() {
            let (mut dx, mut dy) = displacement[index];
            dx -= config.force_gravity * center.x;
            dy -= config.force_gravity * center.y;
            let length = (dx * dx + dy * dy).sqrt();
            if !length.is_finite() || length == 0.0 {
                continue;
            }
            let scale = length.min(temperature) / length;
            *center = center.offset(dx * scale, dy * scale);
        }
    }

    let mut positions: Vec<Point> = centers
        .into_iter()
        .enumerate()
        .map(|(index, center)| graph.top_left(index, center))
        .collect();
    anchor_to_origin(&mut positions, config.origin);
    positions
}

/// Unit vector pointing from `to` towards `from`, plus the floored distance.
fn direction(from: Point, to: Point, i: usize, j: usize) -> (f64, f64, f64) {
    let dx = from.x - to.x;
    let dy = from.y - to.y;
    let distance = (dx * dx + dy * dy).sqrt();
    if distance < f64::EPSILON {
        let angle = (i + j + 1) as f64 * GOLDEN_ANGLE + i as f64;
        return (angle.cos(), angle.sin(), MIN_DISTANCE);
    }
    (dx / distance, dy / distance, distance.max(MIN_DISTANCE))
}

fn initial_centers(graph: &LayoutGraph<'_>, seed: u64, rest_length: f64) -> Vec<Point> {
    let mut hasher = FxHasher::default();
    for node in &graph.nodes {
        node.id.hash(&mut hasher);
    }
    let mut rng = StdRng::seed_from_u64(hasher.finish() ^ seed);

    let half_side = rest_length * (graph.len() as f64).sqrt() / 2.0;
    (0..graph.len())
        .map(|_| {
            Point::new(
                rng.gen_range(-half_side..=half_side),
                rng.gen_range(-half_side..=half_side),
            )
        })
        .collect()
}
