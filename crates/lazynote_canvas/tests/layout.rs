use lazynote_canvas::layout::{
    apply_layout, apply_layout_with, LayoutConfig, LayoutError, LayoutStrategy,
};
use lazynote_canvas::model::{Edge, Node, NodeKind, NodePayload, Point};
use std::collections::BTreeMap;

fn sticky(id: &str) -> Node {
    Node::new(
        id,
        NodePayload::Sticky {
            text: id.to_string(),
        },
        Point::new(7.0, 11.0),
    )
}

fn positions(nodes: &[Node]) -> BTreeMap<String, Point> {
    nodes
        .iter()
        .map(|node| (node.id.clone(), node.position))
        .collect()
}

fn sample_graph() -> (Vec<Node>, Vec<Edge>) {
    let mut nodes: Vec<Node> = ["root", "a", "b", "c", "d", "e"]
        .iter()
        .map(|id| sticky(id))
        .collect();
    nodes.push(Node::new("code", NodeKind::Code.empty_payload(), Point::default()));
    let edges = vec![
        Edge::new("e1", "root", "a"),
        Edge::new("e2", "root", "b"),
        Edge::new("e3", "a", "c"),
        Edge::new("e4", "a", "d"),
        Edge::new("e5", "b", "e"),
        Edge::new("e6", "e", "root"),
        Edge::new("e7", "d", "ghost"),
    ];
    (nodes, edges)
}

#[test]
fn empty_input_is_rejected_for_every_strategy() {
    for strategy in LayoutStrategy::ALL {
        assert_eq!(apply_layout(strategy, &[], &[]), Err(LayoutError::NoNodes));
    }
}

#[test]
fn every_strategy_keeps_ids_payloads_order_and_finite_positions() {
    let (nodes, edges) = sample_graph();
    for strategy in LayoutStrategy::ALL {
        let laid_out = apply_layout(strategy, &nodes, &edges).unwrap();
        assert_eq!(laid_out.len(), nodes.len(), "{strategy}");
        for (before, after) in nodes.iter().zip(&laid_out) {
            assert_eq!(before.id, after.id, "{strategy}");
            assert_eq!(before.payload, after.payload, "{strategy}");
            assert_eq!(before.size, after.size, "{strategy}");
            assert!(after.position.is_finite(), "{strategy}");
        }
    }
}

#[test]
fn every_strategy_is_deterministic_and_independent_of_input_order() {
    let (nodes, edges) = sample_graph();
    let mut reversed_nodes = nodes.clone();
    reversed_nodes.reverse();
    let mut reversed_edges = edges.clone();
    reversed_edges.reverse();

    for strategy in LayoutStrategy::ALL {
        let first = apply_layout(strategy, &nodes, &edges).unwrap();
        let second = apply_layout(strategy, &nodes, &edges).unwrap();
        let shuffled = apply_layout(strategy, &reversed_nodes, &reversed_edges).unwrap();
        assert_eq!(first, second, "{strategy}");
        assert_eq!(positions(&first), positions(&shuffled), "{strategy}");
    }
}

#[test]
fn grid_places_four_nodes_in_two_by_two_cells() {
    let nodes: Vec<Node> = ["d", "c", "b", "a"].iter().map(|id| sticky(id)).collect();
    let laid_out = apply_layout(LayoutStrategy::Grid, &nodes, &[]).unwrap();
    let placed = positions(&laid_out);

    // Sticky nodes are 200x200 and the default margin is 40.
    assert_eq!(placed["a"], Point::new(0.0, 0.0));
    assert_eq!(placed["b"], Point::new(240.0, 0.0));
    assert_eq!(placed["c"], Point::new(0.0, 240.0));
    assert_eq!(placed["d"], Point::new(240.0, 240.0));
}

#[test]
fn grid_respects_configured_origin() {
    let nodes = vec![sticky("a")];
    let config = LayoutConfig {
        origin: Point::new(-100.0, 50.0),
        ..LayoutConfig::default()
    };
    let laid_out = apply_layout_with(LayoutStrategy::Grid, &nodes, &[], &config).unwrap();
    assert_eq!(laid_out[0].position, Point::new(-100.0, 50.0));
}

#[test]
fn tree_centers_root_over_its_two_children() {
    let nodes = vec![sticky("root"), sticky("left"), sticky("right")];
    let edges = vec![Edge::new("e1", "root", "left"), Edge::new("e2", "root", "right")];
    let placed = positions(&apply_layout(LayoutStrategy::Tree, &nodes, &edges).unwrap());

    let root = placed["root"];
    let left = placed["left"];
    let right = placed["right"];
    assert_eq!(root.x, (left.x + right.x) / 2.0);
    assert_eq!(left.y, right.y);
    assert!(root.y < left.y);
    assert!(right.x - left.x >= 200.0);
}

#[test]
fn tree_places_disconnected_components_side_by_side() {
    let nodes = vec![sticky("a"), sticky("b"), sticky("x"), sticky("y")];
    let edges = vec![Edge::new("e1", "a", "b"), Edge::new("e2", "x", "y")];
    let placed = positions(&apply_layout(LayoutStrategy::Tree, &nodes, &edges).unwrap());

    assert_eq!(placed["a"].y, placed["x"].y);
    assert_eq!(placed["b"].y, placed["y"].y);
    assert!(placed["x"].x > placed["a"].x);
}

#[test]
fn hierarchical_layers_do_not_overlap() {
    let (nodes, edges) = sample_graph();
    let laid_out = apply_layout(LayoutStrategy::Hierarchical, &nodes, &edges).unwrap();

    let mut by_row: BTreeMap<i64, Vec<&Node>> = BTreeMap::new();
    for node in &laid_out {
        by_row.entry(node.position.y as i64).or_default().push(node);
    }
    assert!(by_row.len() >= 3);
    for row in by_row.values_mut() {
        row.sort_by(|a, b| a.position.x.total_cmp(&b.position.x));
        for pair in row.windows(2) {
            assert!(
                pair[0].position.x + pair[0].size.width <= pair[1].position.x + 1e-9,
                "{} overlaps {}",
                pair[0].id,
                pair[1].id
            );
        }
    }
}

#[test]
fn hierarchical_children_sit_below_parents() {
    let nodes = vec![sticky("a"), sticky("b"), sticky("c")];
    let edges = vec![Edge::new("e1", "a", "b"), Edge::new("e2", "b", "c")];
    let placed = positions(&apply_layout(LayoutStrategy::Hierarchical, &nodes, &edges).unwrap());
    assert!(placed["a"].y < placed["b"].y);
    assert!(placed["b"].y < placed["c"].y);
}

#[test]
fn circular_single_node_is_placed_at_a_finite_spot() {
    let laid_out = apply_layout(LayoutStrategy::Circular, &[sticky("solo")], &[]).unwrap();
    assert!(laid_out[0].position.is_finite());
}

#[test]
fn force_directed_anchors_bounding_box_at_origin_and_honors_seed() {
    let (nodes, edges) = sample_graph();
    let laid_out = apply_layout(LayoutStrategy::ForceDirected, &nodes, &edges).unwrap();
    let min_x = laid_out.iter().map(|n| n.position.x).fold(f64::INFINITY, f64::min);
    let min_y = laid_out.iter().map(|n| n.position.y).fold(f64::INFINITY, f64::min);
    assert!(min_x.abs() < 1e-9);
    assert!(min_y.abs() < 1e-9);

    let seeded = LayoutConfig {
        seed: 42,
        ..LayoutConfig::default()
    };
    let first = apply_layout_with(LayoutStrategy::ForceDirected, &nodes, &edges, &seeded).unwrap();
    let second = apply_layout_with(LayoutStrategy::ForceDirected, &nodes, &edges, &seeded).unwrap();
    assert_eq!(first, second);
}

#[test]
fn force_directed_pushes_unconnected_nodes_apart() {
    let nodes = vec![sticky("a"), sticky("b")];
    let laid_out = apply_layout(LayoutStrategy::ForceDirected, &nodes, &[]).unwrap();
    let (a, b) = (laid_out[0].center(), laid_out[1].center());
    let distance = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
    assert!(distance > 200.0, "distance was {distance}");
}
