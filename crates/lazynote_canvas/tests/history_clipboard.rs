use lazynote_canvas::model::{Graph, Node, NodeKind, Point};
use lazynote_canvas::service::{
    duplicate, CanvasSession, Clipboard, HistoryManager, Snapshot, DUPLICATE_OFFSET, PASTE_OFFSET,
};
use std::collections::HashSet;

fn session_with_nodes(count: usize) -> (CanvasSession, Vec<String>) {
    let mut session = CanvasSession::new();
    let ids = (0..count)
        .map(|i| {
            session
                .add_node(NodeKind::Sticky, Point::new(i as f64 * 300.0, 0.0))
                .unwrap()
        })
        .collect();
    (session, ids)
}

#[test]
fn undo_then_redo_restores_the_same_document() {
    let (mut session, ids) = session_with_nodes(2);
    session.connect(&ids[0], &ids[1]).unwrap();
    session.set_title("Roadmap");
    let after_edits = session.canvas().clone();

    assert!(session.undo());
    assert_ne!(session.title(), "Roadmap");
    assert_eq!(session.edges().len(), 1);
    assert!(session.undo());
    assert!(session.edges().is_empty());

    assert!(session.redo());
    assert!(session.redo());
    assert_eq!(session.canvas().title, after_edits.title);
    assert_eq!(session.canvas().graph, after_edits.graph);
    assert!(!session.can_redo());
}

#[test]
fn undo_walks_back_to_the_empty_document() {
    let (mut session, _) = session_with_nodes(3);
    let mut steps = 0;
    while session.undo() {
        steps += 1;
    }
    assert_eq!(steps, 3);
    assert!(session.nodes().is_empty());
    assert!(!session.undo());
}

#[test]
fn new_command_after_undo_clears_redo() {
    let (mut session, _) = session_with_nodes(2);
    assert!(session.undo());
    assert!(session.can_redo());

    session.add_node(NodeKind::Code, Point::default()).unwrap();
    assert!(!session.can_redo());
    assert!(!session.redo());
}

#[test]
fn history_capacity_bounds_undo_depth() {
    let mut session = CanvasSession::new();
    session.set_history(HistoryManager::with_capacity(2));
    for _ in 0..5 {
        session.add_node(NodeKind::Sticky, Point::default()).unwrap();
    }

    assert!(session.undo());
    assert!(session.undo());
    assert!(!session.undo());
    assert_eq!(session.nodes().len(), 3);
}

#[test]
fn history_manager_undo_redo_swaps_current_state() {
    let mut history = HistoryManager::new();
    history.record_before_mutation(Snapshot::new("v1", Graph::default()));

    let restored = history.undo(Snapshot::new("v2", Graph::default())).unwrap();
    assert_eq!(restored.title, "v1");
    let redone = history.redo(restored).unwrap();
    assert_eq!(redone.title, "v2");
    assert!(history.can_undo());
    assert!(!history.can_redo());
}

#[test]
fn duplicate_offsets_clones_and_selects_them() {
    let (mut session, ids) = session_with_nodes(2);
    session.select_nodes(&ids);

    let clones = session.duplicate_selection().unwrap();
    assert_eq!(clones.len(), 2);
    assert_eq!(session.nodes().len(), 4);
    assert_eq!(session.selected_node_ids(), clones);

    for (original, clone) in ids.iter().zip(&clones) {
        assert_ne!(original, clone);
        let source = session.canvas().graph.node(original).unwrap();
        let copy = session.canvas().graph.node(clone).unwrap();
        assert_eq!(
            copy.position,
            source.position.offset(DUPLICATE_OFFSET, DUPLICATE_OFFSET)
        );
        assert_eq!(copy.payload, source.payload);
    }
}

#[test]
fn paste_twice_never_reuses_an_id() {
    let (mut session, ids) = session_with_nodes(3);
    session.connect(&ids[0], &ids[1]).unwrap();
    session.select_nodes(&ids);
    assert_eq!(session.copy_selection().unwrap(), 3);
    let edges_before = session.edges().len();

    let first = session.paste().unwrap();
    let second = session.paste().unwrap();

    let all: HashSet<&str> = session.nodes().iter().map(|node| node.id.as_str()).collect();
    assert_eq!(all.len(), 9);
    assert!(first.iter().all(|id| !second.contains(id)));
    assert_eq!(session.edges().len(), edges_before);
}

#[test]
fn pasted_nodes_keep_clipboard_positions_plus_offset() {
    let mut clipboard = Clipboard::new();
    let source = Node::new("a", NodeKind::Image.empty_payload(), Point::new(10.0, -5.0));
    assert!(clipboard.copy(&[source]));
    assert!(!clipboard.copy(&[]));
    assert_eq!(clipboard.len(), 1);

    let pasted = clipboard.paste(|id| id == "a");
    assert_eq!(pasted[0].position, Point::new(10.0 + PASTE_OFFSET, -5.0 + PASTE_OFFSET));
    assert!(!pasted[0].selected);
}

#[test]
fn duplicate_skips_ids_reported_as_taken() {
    let nodes = vec![Node::new("a", NodeKind::Sticky.empty_payload(), Point::default())];
    let mut taken: HashSet<String> = HashSet::new();
    for _ in 0..50 {
        let clone = duplicate(&nodes, |id| taken.contains(id)).remove(0);
        assert!(taken.insert(clone.id));
    }
}

#[test]
fn paste_and_duplicate_are_single_undo_steps() {
    let (mut session, ids) = session_with_nodes(2);
    session.select_nodes(&ids);
    session.copy_selection().unwrap();
    session.paste().unwrap();
    assert_eq!(session.nodes().len(), 4);

    assert!(session.undo());
    assert_eq!(session.nodes().len(), 2);
}
