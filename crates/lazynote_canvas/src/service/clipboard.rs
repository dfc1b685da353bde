//! In-session clipboard and duplication.
//!
//! # Responsibility
//! - Hold deep copies of copied nodes independent of later document edits.
//! - Produce offset clones with fresh ids for paste and duplicate.
//!
//! # Invariants
//! - Clones never reuse an id that is taken in the document or already
//!   handed out in the same batch.
//! - Only nodes are copied. Edges between copied nodes are not carried over,
//!   for both paste and duplicate.
//! - Produced clones are never marked selected; the session decides.

use crate::model::{next_node_id, Node};
use std::collections::HashSet;

pub const DUPLICATE_OFFSET: f64 = 40.0;
pub const PASTE_OFFSET: f64 = 60.0;

#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    nodes: Vec<Node>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the clipboard content. An empty selection leaves the
    /// previous content in place and returns `false`.
    pub fn copy(&mut self, selected: &[Node]) -> bool {
        if selected.is_empty() {
            return false;
        }
        self.nodes = selected
            .iter()
            .cloned()
            .map(|mut node| {
                node.selected = false;
                node
            })
            .collect();
        true
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Clones the clipboard content at `+PASTE_OFFSET` on both axes.
    ///
    /// The clipboard keeps its content, so pasting twice yields two batches.
    pub fn paste(&self, is_taken: impl Fn(&str) -> bool) -> Vec<Node> {
        clone_with_offset(&self.nodes, PASTE_OFFSET, is_taken)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

/// Clones `selected` at `+DUPLICATE_OFFSET` on both axes with fresh ids.
pub fn duplicate(selected: &[Node], is_taken: impl Fn(&str) -> bool) -> Vec<Node> {
    clone_with_offset(selected, DUPLICATE_OFFSET, is_taken)
}

fn clone_with_offset(source: &[Node], offset: f64, is_taken: impl Fn(&str) -> bool) -> Vec<Node> {
    let mut issued: HashSet<String> = HashSet::with_capacity(source.len());
    source
        .iter()
        .map(|node| {
            let id = next_node_id(|candidate| is_taken(candidate) || issued.contains(candidate));
            issued.insert(id.clone());
            Node {
                id,
                position: node.position.offset(offset, offset),
                selected: false,
                ..node.clone()
            }
        })
        .collect()
}
