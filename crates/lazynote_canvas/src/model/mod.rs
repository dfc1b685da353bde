//! Canvas document model.
//!
//! # Responsibility
//! - Define nodes, edges, and the canvas document.
//! - Own the pure graph mutation functions every editing path goes through.
//!
//! # Invariants
//! - Node and edge ids are unique within one canvas.
//! - `selected` flags are transient and never serialized.
//!
//! # See also
//! - `crate::service::canvas_session` for the command layer on top.

pub mod canvas;
pub mod edge;
pub mod graph;
pub mod ids;
pub mod node;

pub use canvas::{
    Canvas, CanvasDraft, CanvasMetadata, CanvasMetadataPatch, Visibility, DEFAULT_CANVAS_TITLE,
};
pub use edge::{Edge, EdgeKind, EdgePatch};
pub use graph::{Graph, GraphRepair};
pub use ids::{next_edge_id, next_node_id, CanvasId, EdgeId, NodeId};
pub use node::{
    ChecklistItem, LinkMetadata, Node, NodeKind, NodePayload, NodeStyle, NodeValidationError,
    Point, Size, StylePatch,
};
