//! Circular placement: node centers evenly spaced on one circle.

use super::{LayoutConfig, LayoutGraph};
use crate::model::Point;
use std::f64::consts::TAU;

pub(super) fn place(graph: &LayoutGraph<'_>, config: &LayoutConfig) -> Vec<Point> {
    let count = graph.len();
    let extent = graph.average_extent();
    let radius = (count as f64 * (extent + config.margin) / TAU).max(extent);
    // Circle center chosen so the circle's bounding box starts at the origin.
    let center = config.origin.offset(radius, radius);

    (0..count)
        .map(|index| {
            let angle = TAU * index as f64 / count as f64;
            let on_circle = center.offset(radius * angle.cos(), radius * angle.sin());
            graph.top_left(index, on_circle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::place;
    use crate::layout::{LayoutConfig, LayoutGraph};
    use crate::model::{Node, NodeKind, Point};

    #[test]
    fn centers_share_one_radius() {
        let nodes: Vec<Node> = ["a", "b", "c", "d", "e", "f"]
            .iter()
            .map(|id| Node::new(*id, NodeKind::Sticky.empty_payload(), Point::default()))
            .collect();
        let graph = LayoutGraph::new(&nodes, &[]);
        let positions = place(&graph, &LayoutConfig::default());

        let center_of = |p: &Point| Point::new(p.x + 100.0, p.y + 100.0);
        let hub = {
            let first = center_of(&positions[0]);
            let opposite = center_of(&positions[3]);
            Point::new((first.x + opposite.x) / 2.0, (first.y + opposite.y) / 2.0)
        };
        let radii: Vec<f64> = positions
            .iter()
            .map(|p| {
                let c = center_of(p);
                ((c.x - hub.x).powi(2) + (c.y - hub.y).powi(2)).sqrt()
            })
            .collect();
        for radius in &radii {
            assert!((radius - radii[0]).abs() < 1e-6);
        }
        assert!(radii[0] >= 200.0);
    }
}
