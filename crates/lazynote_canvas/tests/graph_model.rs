use lazynote_canvas::model::{
    next_edge_id, next_node_id, Canvas, ChecklistItem, Edge, EdgeKind, EdgePatch, Graph, Node,
    NodeKind, NodePayload, Point, StylePatch,
};
use std::collections::HashSet;

fn sticky(id: &str) -> Node {
    Node::new(id, NodeKind::Sticky.empty_payload(), Point::default())
}

fn abc_graph() -> Graph {
    Graph::default()
        .add_nodes([sticky("a"), sticky("b"), sticky("c")])
        .add_edge(Edge::new("ab", "a", "b"))
        .add_edge(Edge::new("bc", "b", "c"))
        .add_edge(Edge::new("ca", "c", "a"))
}

#[test]
fn remove_nodes_cascades_to_touching_edges() {
    let graph = abc_graph().remove_nodes(&["b".to_string()]);

    let ids: Vec<&str> = graph.nodes.iter().map(|node| node.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c"]);
    assert_eq!(graph.edges.len(), 1);
    assert_eq!(graph.edges[0].id, "ca");
    for edge in &graph.edges {
        assert!(graph.contains_node(&edge.source));
        assert!(graph.contains_node(&edge.target));
    }
}

#[test]
fn add_edge_rejects_self_loops_unknown_endpoints_and_duplicate_ids() {
    let graph = abc_graph();
    assert_eq!(graph.add_edge(Edge::new("aa", "a", "a")), graph);
    assert_eq!(graph.add_edge(Edge::new("ax", "a", "ghost")), graph);
    assert_eq!(graph.add_edge(Edge::new("ab", "b", "c")), graph);

    let parallel = graph.add_edge(Edge::new("ab-2", "a", "b"));
    assert_eq!(parallel.edges.len(), graph.edges.len() + 1);
}

#[test]
fn add_node_ignores_duplicate_ids() {
    let graph = abc_graph();
    let mut clash = sticky("a");
    clash.position = Point::new(5.0, 5.0);
    assert_eq!(graph.add_node(clash), graph);
}

#[test]
fn update_node_position_rejects_non_finite_values() {
    let graph = abc_graph();
    assert_eq!(
        graph.update_node_position("a", Point::new(f64::INFINITY, 0.0)),
        graph
    );
    let moved = graph.update_node_position("a", Point::new(3.0, 4.0));
    assert_eq!(moved.node("a").unwrap().position, Point::new(3.0, 4.0));
}

#[test]
fn restyle_and_edge_patch_touch_only_their_targets() {
    let graph = abc_graph()
        .restyle_nodes(
            &["a".to_string()],
            &StylePatch {
                background_color: Some("#000000".to_string()),
                ..StylePatch::default()
            },
        )
        .update_edge(
            "ab",
            &EdgePatch {
                kind: Some(EdgeKind::Animated),
                label: Some(Some("next".to_string())),
                color: None,
            },
        );

    assert_eq!(graph.node("a").unwrap().style.background_color, "#000000");
    assert_eq!(
        graph.node("b").unwrap().style,
        NodeKind::Sticky.default_style()
    );
    let ab = graph.edge("ab").unwrap();
    assert_eq!(ab.kind, EdgeKind::Animated);
    assert_eq!(ab.label.as_deref(), Some("next"));
    assert_eq!(graph.edge("bc").unwrap().kind, EdgeKind::Default);
}

#[test]
fn drop_dangling_edges_reports_what_was_dropped() {
    let graph = Graph::new(
        vec![sticky("a"), sticky("b")],
        vec![Edge::new("ok", "a", "b"), Edge::new("bad", "a", "ghost")],
    );
    let (fixed, dropped) = graph.drop_dangling_edges();
    assert_eq!(fixed.edges.len(), 1);
    assert_eq!(dropped.len(), 1);
    assert_eq!(dropped[0].id, "bad");
}

#[test]
fn normalized_drops_and_reports_self_loops() {
    let graph = Graph::new(
        vec![sticky("a"), sticky("b")],
        vec![Edge::new("aa", "a", "a"), Edge::new("ab", "a", "b")],
    );
    let (fixed, repair) = graph.normalized();

    let ids: Vec<&str> = fixed.edges.iter().map(|edge| edge.id.as_str()).collect();
    assert_eq!(ids, vec!["ab"]);
    assert_eq!(repair.dropped_edges.len(), 1);
    assert_eq!(repair.dropped_edges[0].id, "aa");
    assert!(repair.dropped_nodes.is_empty());
}

#[test]
fn selection_is_not_serialized() {
    let mut canvas = Canvas::new("board");
    canvas.graph = abc_graph().with_selection(&["a".to_string()], &["ab".to_string()]);
    assert_eq!(canvas.graph.selected_node_ids(), vec!["a".to_string()]);

    let json = serde_json::to_string(&canvas).unwrap();
    assert!(!json.contains("selected"));
    let back: Canvas = serde_json::from_str(&json).unwrap();
    assert!(back.graph.selected_node_ids().is_empty());
    assert!(back.graph.selected_edge_ids().is_empty());
}

#[test]
fn payload_serializes_with_kind_tag() {
    let node = Node::new(
        "todo",
        NodePayload::Checklist {
            title: "Launch".to_string(),
            items: vec![ChecklistItem {
                text: "write docs".to_string(),
                done: false,
            }],
        },
        Point::default(),
    );
    let value = serde_json::to_value(&node).unwrap();
    assert_eq!(value["payload"]["kind"], "checklist");
    assert_eq!(value["payload"]["items"][0]["text"], "write docs");
}

#[test]
fn generated_ids_are_unique_and_prefixed() {
    let mut seen = HashSet::new();
    for _ in 0..1_000 {
        let node_id = next_node_id(|id| seen.contains(id));
        assert!(node_id.starts_with("node-"));
        assert!(seen.insert(node_id));
    }
    let edge_id = next_edge_id(|_| false);
    assert!(edge_id.starts_with("edge-"));
}
