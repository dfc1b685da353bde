//! Canvas node model.
//!
//! # Responsibility
//! - Define the typed node record shared by layout, session and persistence.
//! - Provide per-kind defaults for size and style.
//!
//! # Invariants
//! - `id` is non-empty and stable for the lifetime of the document.
//! - `kind()` is derived from `payload`; the two cannot disagree.
//! - `position` and `size` are finite; `size` is strictly positive.
//! - `selected` is transient and never serialized.

use super::ids::NodeId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// 2D point in canvas coordinates. Node positions are top-left corners.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Node box size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Node category. Serialized in snake_case to match the store schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Sticky,
    Image,
    Checklist,
    LinkPreview,
    Code,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sticky => "sticky",
            Self::Image => "image",
            Self::Checklist => "checklist",
            Self::LinkPreview => "link_preview",
            Self::Code => "code",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "sticky" => Some(Self::Sticky),
            "image" => Some(Self::Image),
            "checklist" => Some(Self::Checklist),
            "link_preview" => Some(Self::LinkPreview),
            "code" => Some(Self::Code),
            _ => None,
        }
    }

    /// Default box size for freshly created nodes of this kind.
    pub fn default_size(self) -> Size {
        match self {
            Self::Sticky => Size::new(200.0, 200.0),
            Self::Image => Size::new(240.0, 180.0),
            Self::Checklist => Size::new(220.0, 160.0),
            Self::LinkPreview => Size::new(280.0, 120.0),
            Self::Code => Size::new(320.0, 200.0),
        }
    }

    pub fn default_style(self) -> NodeStyle {
        let (foreground, background, border) = match self {
            Self::Sticky => ("#1f2937", "#fef3c7", "#f59e0b"),
            Self::Image => ("#1f2937", "#ffffff", "#d1d5db"),
            Self::Checklist => ("#1f2937", "#ecfdf5", "#10b981"),
            Self::LinkPreview => ("#1e3a8a", "#eff6ff", "#3b82f6"),
            Self::Code => ("#e5e7eb", "#111827", "#374151"),
        };
        NodeStyle {
            foreground_color: foreground.to_string(),
            background_color: background.to_string(),
            border_color: border.to_string(),
        }
    }

    /// Empty payload used by "add node" commands.
    pub fn empty_payload(self) -> NodePayload {
        match self {
            Self::Sticky => NodePayload::Sticky {
                text: String::new(),
            },
            Self::Image => NodePayload::Image {
                src: String::new(),
                alt: None,
            },
            Self::Checklist => NodePayload::Checklist {
                title: String::new(),
                items: Vec::new(),
            },
            Self::LinkPreview => NodePayload::LinkPreview(LinkMetadata::default()),
            Self::Code => NodePayload::Code {
                code: String::new(),
                language: "plaintext".to_string(),
            },
        }
    }
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Colors applied when a node is drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStyle {
    pub foreground_color: String,
    pub background_color: String,
    pub border_color: String,
}

/// Partial style update used by selection-scoped bulk edits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StylePatch {
    pub foreground_color: Option<String>,
    pub background_color: Option<String>,
    pub border_color: Option<String>,
}

impl StylePatch {
    pub fn is_empty(&self) -> bool {
        self.foreground_color.is_none()
            && self.background_color.is_none()
            && self.border_color.is_none()
    }

    pub fn apply_to(&self, style: &mut NodeStyle) {
        if let Some(color) = &self.foreground_color {
            style.foreground_color = color.clone();
        }
        if let Some(color) = &self.background_color {
            style.background_color = color.clone();
        }
        if let Some(color) = &self.border_color {
            style.border_color = color.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub text: String,
    pub done: bool,
}

/// Metadata captured for a link preview card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkMetadata {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

/// Kind-specific node content. The variant tag doubles as the node kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodePayload {
    Sticky {
        text: String,
    },
    Image {
        src: String,
        alt: Option<String>,
    },
    Checklist {
        title: String,
        items: Vec<ChecklistItem>,
    },
    LinkPreview(LinkMetadata),
    Code {
        code: String,
        language: String,
    },
}

impl NodePayload {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Sticky { .. } => NodeKind::Sticky,
            Self::Image { .. } => NodeKind::Image,
            Self::Checklist { .. } => NodeKind::Checklist,
            Self::LinkPreview(_) => NodeKind::LinkPreview,
            Self::Code { .. } => NodeKind::Code,
        }
    }

    /// One-line label used by exports.
    pub fn label(&self) -> String {
        match self {
            Self::Sticky { text } => first_line(text).to_string(),
            Self::Image { src, alt } => alt.clone().unwrap_or_else(|| src.clone()),
            Self::Checklist { title, items } => {
                let done = items.iter().filter(|item| item.done).count();
                format!("{} ({done}/{})", first_line(title), items.len())
            }
            Self::LinkPreview(meta) => meta.title.clone().unwrap_or_else(|| meta.url.clone()),
            Self::Code { code, language } => format!("[{language}] {}", first_line(code)),
        }
    }
}

fn first_line(value: &str) -> &str {
    value.lines().next().unwrap_or("").trim()
}

/// Validation failures for node records.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeValidationError {
    EmptyId,
    NonFinitePosition { id: NodeId },
    InvalidSize { id: NodeId },
}

impl Display for NodeValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "node id must not be empty"),
            Self::NonFinitePosition { id } => {
                write!(f, "node `{id}` has a non-finite position")
            }
            Self::InvalidSize { id } => {
                write!(f, "node `{id}` must have a finite, positive size")
            }
        }
    }
}

impl Error for NodeValidationError {}

/// A single canvas node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub position: Point,
    pub size: Size,
    pub style: NodeStyle,
    pub payload: NodePayload,
    #[serde(skip)]
    pub selected: bool,
}

impl Node {
    /// Creates a node with the default size and style of the payload kind.
    pub fn new(id: impl Into<NodeId>, payload: NodePayload, position: Point) -> Self {
        let kind = payload.kind();
        Self {
            id: id.into(),
            position,
            size: kind.default_size(),
            style: kind.default_style(),
            payload,
            selected: false,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.payload.kind()
    }

    pub fn label(&self) -> String {
        self.payload.label()
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.position.x + self.size.width / 2.0,
            self.position.y + self.size.height / 2.0,
        )
    }

    pub fn validate(&self) -> Result<(), NodeValidationError> {
        if self.id.trim().is_empty() {
            return Err(NodeValidationError::EmptyId);
        }
        if !self.position.is_finite() {
            return Err(NodeValidationError::NonFinitePosition {
                id: self.id.clone(),
            });
        }
        if !self.size.is_valid() {
            return Err(NodeValidationError::InvalidSize {
                id: self.id.clone(),
            });
        }
        Ok(())
    }
}
