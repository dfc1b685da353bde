//! Canvas document model.
//!
//! # Responsibility
//! - Bundle the graph with document metadata (title, workspace, visibility).
//! - Define the draft shape used to seed a session from elsewhere in the app.
//!
//! # Invariants
//! - `id` is `None` until the first successful save assigns one.
//! - Metadata changes are not part of undo history; only `(title, graph)` is.

use super::graph::Graph;
use super::ids::CanvasId;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CANVAS_TITLE: &str = "Untitled canvas";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Private,
    Public,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Public => "public",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "private" => Some(Self::Private),
            "public" => Some(Self::Public),
            _ => None,
        }
    }
}

/// The persisted graph-diagram document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub id: Option<CanvasId>,
    pub title: String,
    #[serde(flatten)]
    pub graph: Graph,
    #[serde(default)]
    pub workspace_id: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(DEFAULT_CANVAS_TITLE)
    }
}

impl Canvas {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            graph: Graph::default(),
            workspace_id: None,
            visibility: Visibility::Private,
        }
    }

    pub fn metadata(&self) -> CanvasMetadata {
        CanvasMetadata {
            title: self.title.clone(),
            workspace_id: self.workspace_id.clone(),
            visibility: self.visibility,
        }
    }
}

/// Pre-built graph handed over by another part of the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasDraft {
    pub title: String,
    #[serde(flatten)]
    pub graph: Graph,
}

/// Store-level canvas metadata (everything except nodes and edges).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasMetadata {
    pub title: String,
    pub workspace_id: Option<String>,
    pub visibility: Visibility,
}

/// Partial metadata update. `workspace_id: Some(None)` clears the link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanvasMetadataPatch {
    pub title: Option<String>,
    pub workspace_id: Option<Option<String>>,
    pub visibility: Option<Visibility>,
}

impl From<&CanvasMetadata> for CanvasMetadataPatch {
    fn from(value: &CanvasMetadata) -> Self {
        Self {
            title: Some(value.title.clone()),
            workspace_id: Some(value.workspace_id.clone()),
            visibility: Some(value.visibility),
        }
    }
}
