//! Undo/redo history over whole-document snapshots.
//!
//! # Responsibility
//! - Keep bounded undo and redo stacks of `(title, graph)` snapshots.
//!
//! # Invariants
//! - `record_before_mutation` is called exactly once per mutating command,
//!   before the mutation, and always clears the redo stack.
//! - `undo`/`redo` move the *current* state onto the opposite stack, so
//!   `undo` followed by `redo` restores the pre-undo state exactly.
//! - When the undo stack exceeds its capacity the oldest snapshot is evicted.

use crate::model::Graph;
use std::collections::VecDeque;

pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Owned copy of the undoable part of a canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub title: String,
    pub graph: Graph,
}

impl Snapshot {
    pub fn new(title: impl Into<String>, graph: Graph) -> Self {
        Self {
            title: title.into(),
            graph,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HistoryManager {
    undo_stack: VecDeque<Snapshot>,
    redo_stack: Vec<Snapshot>,
    capacity: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capacity is clamped to at least one snapshot.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn record_before_mutation(&mut self, current: Snapshot) {
        self.undo_stack.push_back(current);
        while self.undo_stack.len() > self.capacity {
            self.undo_stack.pop_front();
        }
        self.redo_stack.clear();
    }

    /// Returns the state to restore, or `None` when there is nothing to undo.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo_stack.pop_back()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push_back(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
