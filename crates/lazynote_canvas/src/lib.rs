//! Canvas core for LazyNote: graph document model, automatic layout,
//! editing sessions with undo, persistence protocol and export.
//! This crate is the single source of truth for canvas invariants.

pub mod db;
pub mod export;
pub mod layout;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod sync;

pub use export::{
    export_file_name, export_json, export_png, export_svg, from_snapshot_json, render_png,
    render_svg, to_snapshot_json, ExportArtifact, ExportError, ExportFormat, ExportResult,
    RasterOptions, SvgOptions, Viewport,
};
pub use layout::{
    apply_layout, apply_layout_with, LayoutConfig, LayoutError, LayoutResult, LayoutStrategy,
};
pub use logging::{default_log_level, init_logging, init_logging_from_env, logging_status};
pub use model::{
    Canvas, CanvasDraft, CanvasId, Edge, EdgeId, EdgeKind, EdgePatch, Graph, GraphRepair, Node,
    NodeId, NodeKind, NodePayload, NodeStyle, Point, Size, StylePatch, Visibility,
};
pub use repo::{CanvasStore, SqliteCanvasStore, StoreError, StoreResult};
pub use service::{CanvasSession, HistoryManager, SessionError, SessionResult};
pub use sync::{CanvasSync, LoadedCanvas, SaveOutcome, SaveRequest, SyncError, SyncResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
