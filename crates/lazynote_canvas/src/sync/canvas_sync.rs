//! Load/save protocol between an editing session and a `CanvasStore`.
//!
//! # Responsibility
//! - Load a canvas by id, repairing and reporting invalid rows.
//! - Save a snapshot: create on first save, otherwise update metadata, then
//!   replace all nodes and edges.
//!
//! # Invariants
//! - Store calls run on the blocking pool; the caller's task never blocks.
//! - Saves for one `SaveLane` run one at a time; a save with a newer save
//!   already waiting is skipped as `SaveOutcome::Superseded`.
//! - Once a lane obtained a canvas id, later saves on that lane update it
//!   even if the create's content write failed.
//! - Dropping a `load`/`save` future abandons interest without error. A
//!   store call already handed to the blocking pool still runs to its end.
//! - Known limitation: a save dropped while its `create_canvas` call is on
//!   the blocking pool never records the new id on the lane. That canvas
//!   stays in the store, and the lane's next save creates another one.

use super::mapping::{canvas_from_record, edge_to_record, node_to_record};
use super::save_lane::SaveRequest;
use crate::model::{Canvas, CanvasId, CanvasMetadataPatch, GraphRepair};
use crate::repo::{CanvasStore, EdgeRecord, NodeRecord, StoreError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

pub type SyncResult<T> = Result<T, SyncError>;

#[derive(Debug)]
pub enum SyncError {
    Store(StoreError),
    NotFound(CanvasId),
    /// A node payload or style could not be encoded for the store.
    Encode(serde_json::Error),
    /// The blocking store call panicked or was cancelled.
    Worker(tokio::task::JoinError),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "canvas not found: {id}"),
            Self::Encode(err) => write!(f, "failed to encode canvas node: {err}"),
            Self::Worker(err) => write!(f, "canvas store worker failed: {err}"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Encode(err) => Some(err),
            Self::Worker(err) => Some(err),
        }
    }
}

impl From<StoreError> for SyncError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(id) => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

impl From<tokio::task::JoinError> for SyncError {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::Worker(value)
    }
}

/// A loaded canvas plus what was dropped to make it consistent.
#[derive(Debug, Clone)]
pub struct LoadedCanvas {
    pub canvas: Canvas,
    pub repair: GraphRepair,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved {
        canvas_id: CanvasId,
        node_count: usize,
        edge_count: usize,
    },
    /// A newer save for the same document was waiting; this one was skipped.
    Superseded,
}

/// Async front of a blocking `CanvasStore`.
pub struct CanvasSync<S> {
    store: Arc<S>,
}

impl<S> Clone for CanvasSync<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> CanvasSync<S>
where
    S: CanvasStore + Send + Sync + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub async fn load(&self, id: CanvasId) -> SyncResult<LoadedCanvas> {
        let started_at = Instant::now();
        let store = Arc::clone(&self.store);
        let record = tokio::task::spawn_blocking(move || store.load_canvas(id))
            .await??
            .ok_or(SyncError::NotFound(id))?;

        let (canvas, repair) = canvas_from_record(record);
        if !repair.is_clean() {
            warn!(
                "event=canvas_load module=sync status=repaired canvas_id={} dropped_nodes={} dropped_edges={}",
                id,
                repair.dropped_nodes.len(),
                repair.dropped_edges.len()
            );
        }
        info!(
            "event=canvas_load module=sync status=ok canvas_id={} nodes={} edges={} duration_ms={}",
            id,
            canvas.graph.nodes.len(),
            canvas.graph.edges.len(),
            started_at.elapsed().as_millis()
        );
        Ok(LoadedCanvas { canvas, repair })
    }

    pub async fn save(&self, request: &SaveRequest) -> SyncResult<SaveOutcome> {
        let started_at = Instant::now();
        let lane = request.lane();
        let ticket = lane.enter(request.ticket());
        let mut state = lane.acquire().await;

        if ticket.is_superseded() {
            info!(
                "event=canvas_save module=sync status=superseded ticket={}",
                request.ticket()
            );
            return Ok(SaveOutcome::Superseded);
        }

        let canvas = request.canvas();
        let nodes: Vec<NodeRecord> = canvas
            .graph
            .nodes
            .iter()
            .map(node_to_record)
            .collect::<Result<_, _>>()?;
        let edges: Vec<EdgeRecord> = canvas.graph.edges.iter().map(edge_to_record).collect();
        let node_count = nodes.len();
        let edge_count = edges.len();

        let known_id = state.canvas_id.or(canvas.id);
        let metadata = canvas.metadata();
        let store = Arc::clone(&self.store);
        let canvas_id = tokio::task::spawn_blocking(move || match known_id {
            Some(id) => store
                .update_canvas_metadata(id, &CanvasMetadataPatch::from(&metadata))
                .map(|()| id),
            None => store.create_canvas(&metadata),
        })
        .await
        .map_err(SyncError::from)
        .and_then(|result| result.map_err(SyncError::from))
        .map_err(|err| log_save_error(request.ticket(), err))?;
        state.canvas_id = Some(canvas_id);

        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || {
            store.replace_canvas_contents(canvas_id, &nodes, &edges)
        })
        .await
        .map_err(SyncError::from)
        .and_then(|result| result.map_err(SyncError::from))
        .map_err(|err| log_save_error(request.ticket(), err))?;

        info!(
            "event=canvas_save module=sync status=ok canvas_id={} nodes={} edges={} duration_ms={}",
            canvas_id,
            node_count,
            edge_count,
            started_at.elapsed().as_millis()
        );
        Ok(SaveOutcome::Saved {
            canvas_id,
            node_count,
            edge_count,
        })
    }
}

fn log_save_error(ticket: u64, err: SyncError) -> SyncError {
    warn!(
        "event=canvas_save module=sync status=error ticket={} error={}",
        ticket, err
    );
    err
}
