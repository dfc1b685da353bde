//! Versioned JSON snapshot of a whole canvas.

use super::{ExportError, ExportResult};
use crate::model::{Canvas, GraphRepair};
use serde::{Deserialize, Serialize};

pub const SNAPSHOT_FORMAT: &str = "lazynote-canvas";
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotOut<'a> {
    format: &'static str,
    version: u32,
    canvas: &'a Canvas,
}

#[derive(Deserialize)]
struct SnapshotIn {
    format: String,
    version: u32,
    canvas: Canvas,
}

/// Pretty-printed `{format, version, canvas}` document.
pub fn to_snapshot_json(canvas: &Canvas) -> ExportResult<String> {
    Ok(serde_json::to_string_pretty(&SnapshotOut {
        format: SNAPSHOT_FORMAT,
        version: SNAPSHOT_VERSION,
        canvas,
    })?)
}

/// Parses a snapshot. The graph is normalized; anything dropped on the way
/// is returned next to the canvas.
pub fn from_snapshot_json(text: &str) -> ExportResult<(Canvas, GraphRepair)> {
    let snapshot: SnapshotIn = serde_json::from_str(text)?;
    if snapshot.format != SNAPSHOT_FORMAT {
        return Err(ExportError::UnsupportedFormat(snapshot.format));
    }
    if snapshot.version > SNAPSHOT_VERSION {
        return Err(ExportError::UnsupportedVersion(snapshot.version));
    }
    let mut canvas = snapshot.canvas;
    let (graph, repair) = canvas.graph.normalized();
    canvas.graph = graph;
    Ok((canvas, repair))
}
