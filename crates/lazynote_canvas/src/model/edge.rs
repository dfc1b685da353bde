//! Canvas edge model.
//!
//! # Invariants
//! - `source` and `target` must reference nodes of the same canvas at save
//!   time; dangling edges are dropped on load, never persisted.
//! - Parallel edges (same endpoints, different ids) are allowed.

use super::ids::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};

/// Edge rendering variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    #[default]
    Default,
    Animated,
}

impl EdgeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Animated => "animated",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "default" => Some(Self::Default),
            "animated" => Some(Self::Animated),
            _ => None,
        }
    }
}

/// Directed connection between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub kind: EdgeKind,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(skip)]
    pub selected: bool,
}

impl Edge {
    pub fn new(
        id: impl Into<EdgeId>,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            kind: EdgeKind::Default,
            label: None,
            color: None,
            selected: false,
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// Partial edge update. `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgePatch {
    pub kind: Option<EdgeKind>,
    pub label: Option<Option<String>>,
    pub color: Option<Option<String>>,
}

impl EdgePatch {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.label.is_none() && self.color.is_none()
    }

    pub fn apply_to(&self, edge: &mut Edge) {
        if let Some(kind) = self.kind {
            edge.kind = kind;
        }
        if let Some(label) = &self.label {
            edge.label = label.clone();
        }
        if let Some(color) = &self.color {
            edge.color = color.clone();
        }
    }
}
