//! Editing session over one canvas document.
//!
//! # Responsibility
//! - Turn user commands into graph mutations with undo support.
//! - Own selection, clipboard, layout settings and the document's save lane.
//! - Hand out detached save requests so editing continues while saving.
//!
//! # Invariants
//! - Every mutating command validates first, then records exactly one
//!   history snapshot, then applies. A rejected command changes nothing.
//! - Selection and metadata changes (visibility, workspace) are not undoable.
//! - The canvas id is only ever set from a successful save or a load.

use super::clipboard::{duplicate, Clipboard};
use super::history::{HistoryManager, Snapshot};
use crate::layout::{apply_layout_with, LayoutConfig, LayoutError, LayoutStrategy};
use crate::model::{
    next_edge_id, next_node_id, Canvas, CanvasDraft, CanvasId, Edge, EdgeId, EdgePatch,
    GraphRepair, Node, NodeId, NodeKind, NodePayload, Point, StylePatch, Visibility,
    DEFAULT_CANVAS_TITLE,
};
use crate::repo::CanvasStore;
use crate::sync::{
    CanvasSync, LoadedCanvas, SaveLane, SaveOutcome, SaveRequest, SyncError, SyncResult,
};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type SessionResult<T> = Result<T, SessionError>;

/// Rejected command. The session is unchanged when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    NodeNotFound(NodeId),
    EdgeNotFound(EdgeId),
    /// Source and target of a new edge are the same node.
    SelfLoop(NodeId),
    InvalidPosition,
    NothingSelected,
    ClipboardEmpty,
    Layout(LayoutError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NodeNotFound(id) => write!(f, "node not found: {id}"),
            Self::EdgeNotFound(id) => write!(f, "edge not found: {id}"),
            Self::SelfLoop(id) => write!(f, "cannot connect node `{id}` to itself"),
            Self::InvalidPosition => write!(f, "position must be finite"),
            Self::NothingSelected => write!(f, "nothing is selected"),
            Self::ClipboardEmpty => write!(f, "clipboard is empty"),
            Self::Layout(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Layout(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LayoutError> for SessionError {
    fn from(value: LayoutError) -> Self {
        Self::Layout(value)
    }
}

type SaveCallback = Box<dyn FnMut(&SaveOutcome) + Send>;

pub struct CanvasSession {
    canvas: Canvas,
    history: HistoryManager,
    clipboard: Clipboard,
    layout_config: LayoutConfig,
    lane: Arc<SaveLane>,
    on_save: Option<SaveCallback>,
}

impl Default for CanvasSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasSession {
    /// Starts an empty, never-saved canvas.
    pub fn new() -> Self {
        Self::with_canvas(Canvas::default())
    }

    /// Starts from a draft built elsewhere. Invalid nodes and dangling edges
    /// are dropped and returned.
    pub fn from_draft(draft: CanvasDraft) -> (Self, GraphRepair) {
        let (graph, repair) = draft.graph.normalized();
        if !repair.is_clean() {
            warn!(
                "event=canvas_draft module=session status=repaired dropped_nodes={} dropped_edges={}",
                repair.dropped_nodes.len(),
                repair.dropped_edges.len()
            );
        }
        let title = if draft.title.trim().is_empty() {
            DEFAULT_CANVAS_TITLE.to_string()
        } else {
            draft.title
        };
        let canvas = Canvas {
            title,
            graph,
            ..Canvas::default()
        };
        (Self::with_canvas(canvas), repair)
    }

    /// Starts from an optional draft; `None` gives an empty canvas.
    pub fn with_draft(draft: Option<CanvasDraft>) -> (Self, GraphRepair) {
        match draft {
            Some(draft) => Self::from_draft(draft),
            None => (Self::new(), GraphRepair::default()),
        }
    }

    pub fn from_loaded(loaded: LoadedCanvas) -> Self {
        Self::with_canvas(loaded.canvas)
    }

    /// Falls back to an empty canvas when loading failed, handing the error
    /// back for display.
    pub fn open_or_empty(loaded: SyncResult<LoadedCanvas>) -> (Self, Option<SyncError>) {
        match loaded {
            Ok(loaded) => (Self::from_loaded(loaded), None),
            Err(err) => {
                error!(
                    "event=canvas_open module=session status=error fallback=empty error={}",
                    err
                );
                (Self::new(), Some(err))
            }
        }
    }

    fn with_canvas(mut canvas: Canvas) -> Self {
        let selection_cleared = canvas.graph.with_selection(&[], &[]);
        canvas.graph = selection_cleared;
        let lane = SaveLane::new(canvas.id);
        Self {
            canvas,
            history: HistoryManager::default(),
            clipboard: Clipboard::new(),
            layout_config: LayoutConfig::default(),
            lane,
            on_save: None,
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn id(&self) -> Option<CanvasId> {
        self.canvas.id
    }

    pub fn title(&self) -> &str {
        &self.canvas.title
    }

    pub fn nodes(&self) -> &[Node] {
        &self.canvas.graph.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.canvas.graph.edges
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn clipboard_len(&self) -> usize {
        self.clipboard.len()
    }

    pub fn layout_config(&self) -> &LayoutConfig {
        &self.layout_config
    }

    pub fn set_layout_config(&mut self, config: LayoutConfig) {
        self.layout_config = config;
    }

    /// Replaces the history manager, e.g. to change its capacity.
    pub fn set_history(&mut self, history: HistoryManager) {
        self.history = history;
    }

    /// Registers a callback fired after every successful save.
    pub fn set_on_save(&mut self, callback: impl FnMut(&SaveOutcome) + Send + 'static) {
        self.on_save = Some(Box::new(callback));
    }

    // ---- document commands -------------------------------------------------

    pub fn add_node(&mut self, kind: NodeKind, position: Point) -> SessionResult<NodeId> {
        self.add_node_with_payload(kind.empty_payload(), position)
    }

    pub fn add_node_with_payload(
        &mut self,
        payload: NodePayload,
        position: Point,
    ) -> SessionResult<NodeId> {
        if !position.is_finite() {
            return Err(SessionError::InvalidPosition);
        }
        let graph = &self.canvas.graph;
        let id = next_node_id(|candidate| graph.contains_id(candidate));
        let node = Node::new(id.clone(), payload, position);
        self.record();
        self.canvas.graph = self.canvas.graph.add_node(node);
        Ok(id)
    }

    pub fn move_node(&mut self, id: &str, position: Point) -> SessionResult<()> {
        self.require_node(id)?;
        if !position.is_finite() {
            return Err(SessionError::InvalidPosition);
        }
        self.record();
        self.canvas.graph = self.canvas.graph.update_node_position(id, position);
        Ok(())
    }

    /// Replaces a node's content. A payload of another kind changes the
    /// node's kind; size and style are kept.
    pub fn edit_node(&mut self, id: &str, payload: NodePayload) -> SessionResult<()> {
        self.require_node(id)?;
        self.record();
        self.canvas.graph = self.canvas.graph.update_node_payload(id, &payload);
        Ok(())
    }

    /// Renames the canvas. Setting the current title records nothing.
    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        if title == self.canvas.title {
            return;
        }
        self.record();
        self.canvas.title = title;
    }

    pub fn connect(&mut self, source: &str, target: &str) -> SessionResult<EdgeId> {
        if source == target {
            return Err(SessionError::SelfLoop(source.to_string()));
        }
        self.require_node(source)?;
        self.require_node(target)?;

        let graph = &self.canvas.graph;
        let id = next_edge_id(|candidate| graph.contains_id(candidate));
        self.record();
        self.canvas.graph = self
            .canvas
            .graph
            .add_edge(Edge::new(id.clone(), source, target));
        Ok(id)
    }

    pub fn update_edge(&mut self, id: &str, patch: &EdgePatch) -> SessionResult<()> {
        if self.canvas.graph.edge(id).is_none() {
            return Err(SessionError::EdgeNotFound(id.to_string()));
        }
        if patch.is_empty() {
            return Ok(());
        }
        self.record();
        self.canvas.graph = self.canvas.graph.update_edge(id, patch);
        Ok(())
    }

    /// Deletes selected edges and nodes; edges touching a deleted node go too.
    /// Returns how many nodes and edges were removed in total.
    pub fn delete_selection(&mut self) -> SessionResult<usize> {
        let node_ids = self.canvas.graph.selected_node_ids();
        let edge_ids = self.canvas.graph.selected_edge_ids();
        if node_ids.is_empty() && edge_ids.is_empty() {
            return Err(SessionError::NothingSelected);
        }
        let before = self.canvas.graph.nodes.len() + self.canvas.graph.edges.len();
        self.record();
        self.canvas.graph = self
            .canvas
            .graph
            .remove_edges(&edge_ids)
            .remove_nodes(&node_ids);
        let after = self.canvas.graph.nodes.len() + self.canvas.graph.edges.len();
        Ok(before - after)
    }

    /// Applies a style patch to every selected node.
    pub fn restyle_selection(&mut self, patch: &StylePatch) -> SessionResult<()> {
        let node_ids = self.canvas.graph.selected_node_ids();
        if node_ids.is_empty() {
            return Err(SessionError::NothingSelected);
        }
        if patch.is_empty() {
            return Ok(());
        }
        self.record();
        self.canvas.graph = self.canvas.graph.restyle_nodes(&node_ids, patch);
        Ok(())
    }

    /// Repositions all nodes with `strategy` as one undoable step.
    pub fn apply_layout(&mut self, strategy: LayoutStrategy) -> SessionResult<()> {
        let graph = &self.canvas.graph;
        let laid_out =
            apply_layout_with(strategy, &graph.nodes, &graph.edges, &self.layout_config)?;
        self.record();
        self.canvas.graph = self.canvas.graph.with_positions(&laid_out);
        info!(
            "event=layout_apply module=session status=ok strategy={} nodes={}",
            strategy,
            laid_out.len()
        );
        Ok(())
    }

    // ---- clipboard ---------------------------------------------------------

    /// Copies selected nodes. Edges are not copied.
    pub fn copy_selection(&mut self) -> SessionResult<usize> {
        let selected = self.selected_nodes();
        if !self.clipboard.copy(&selected) {
            return Err(SessionError::NothingSelected);
        }
        Ok(selected.len())
    }

    /// Pastes the clipboard offset from the copied nodes. The pasted nodes
    /// become the selection.
    pub fn paste(&mut self) -> SessionResult<Vec<NodeId>> {
        if self.clipboard.is_empty() {
            return Err(SessionError::ClipboardEmpty);
        }
        let graph = &self.canvas.graph;
        let pasted = self.clipboard.paste(|candidate| graph.contains_id(candidate));
        Ok(self.insert_clones(pasted))
    }

    /// Duplicates selected nodes next to the originals. The duplicates become
    /// the selection.
    pub fn duplicate_selection(&mut self) -> SessionResult<Vec<NodeId>> {
        let selected = self.selected_nodes();
        if selected.is_empty() {
            return Err(SessionError::NothingSelected);
        }
        let graph = &self.canvas.graph;
        let clones = duplicate(&selected, |candidate| graph.contains_id(candidate));
        Ok(self.insert_clones(clones))
    }

    fn insert_clones(&mut self, clones: Vec<Node>) -> Vec<NodeId> {
        let ids: Vec<NodeId> = clones.iter().map(|node| node.id.clone()).collect();
        self.record();
        self.canvas.graph = self
            .canvas
            .graph
            .add_nodes(clones)
            .with_selection(&ids, &[]);
        ids
    }

    // ---- history -----------------------------------------------------------

    /// Restores the previous snapshot. Returns `false` when there is none.
    pub fn undo(&mut self) -> bool {
        match self.history.undo(self.snapshot()) {
            Some(previous) => {
                self.restore(previous);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo(self.snapshot()) {
            Some(next) => {
                self.restore(next);
                true
            }
            None => false,
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.canvas.title.clone(), self.canvas.graph.clone())
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.canvas.title = snapshot.title;
        self.canvas.graph = snapshot.graph;
    }

    fn record(&mut self) {
        let snapshot = self.snapshot();
        self.history.record_before_mutation(snapshot);
    }

    // ---- selection ---------------------------------------------------------

    /// Selects exactly the given nodes. Unknown ids are ignored.
    pub fn select_nodes(&mut self, ids: &[NodeId]) {
        self.canvas.graph = self.canvas.graph.with_selection(ids, &[]);
    }

    pub fn select_edges(&mut self, ids: &[EdgeId]) {
        self.canvas.graph = self.canvas.graph.with_selection(&[], ids);
    }

    pub fn select_all(&mut self) {
        let graph = &self.canvas.graph;
        let nodes: Vec<NodeId> = graph.nodes.iter().map(|node| node.id.clone()).collect();
        let edges: Vec<EdgeId> = graph.edges.iter().map(|edge| edge.id.clone()).collect();
        self.canvas.graph = graph.with_selection(&nodes, &edges);
    }

    pub fn clear_selection(&mut self) {
        self.canvas.graph = self.canvas.graph.with_selection(&[], &[]);
    }

    pub fn selected_node_ids(&self) -> Vec<NodeId> {
        self.canvas.graph.selected_node_ids()
    }

    pub fn selected_edge_ids(&self) -> Vec<EdgeId> {
        self.canvas.graph.selected_edge_ids()
    }

    fn selected_nodes(&self) -> Vec<Node> {
        self.canvas
            .graph
            .nodes
            .iter()
            .filter(|node| node.selected)
            .cloned()
            .collect()
    }

    fn require_node(&self, id: &str) -> SessionResult<()> {
        if self.canvas.graph.contains_node(id) {
            Ok(())
        } else {
            Err(SessionError::NodeNotFound(id.to_string()))
        }
    }

    // ---- metadata ----------------------------------------------------------

    pub fn set_visibility(&mut self, visibility: Visibility) {
        self.canvas.visibility = visibility;
    }

    pub fn set_workspace(&mut self, workspace_id: Option<String>) {
        self.canvas.workspace_id = workspace_id;
    }

    // ---- saving ------------------------------------------------------------

    /// Snapshots the document into a request that can be saved while the
    /// session keeps editing.
    pub fn save_request(&self) -> SaveRequest {
        let mut snapshot = self.canvas.clone();
        snapshot.graph = snapshot.graph.with_selection(&[], &[]);
        self.lane.request(snapshot)
    }

    /// Applies the result of a save started with `save_request`.
    pub fn complete_save(&mut self, result: &SyncResult<SaveOutcome>) {
        match result {
            Ok(outcome @ SaveOutcome::Saved { canvas_id, .. }) => {
                self.canvas.id = Some(*canvas_id);
                if let Some(callback) = self.on_save.as_mut() {
                    callback(outcome);
                }
            }
            Ok(SaveOutcome::Superseded) => {}
            Err(err) => {
                warn!(
                    "event=canvas_save module=session status=error canvas_id={} error={}",
                    self.canvas
                        .id
                        .map_or_else(|| "unsaved".to_string(), |id| id.to_string()),
                    err
                );
            }
        }
    }

    /// Saves the current state and applies the result.
    pub async fn save<S>(&mut self, sync: &CanvasSync<S>) -> SyncResult<SaveOutcome>
    where
        S: CanvasStore + Send + Sync + 'static,
    {
        let request = self.save_request();
        let result = sync.save(&request).await;
        self.complete_save(&result);
        result
    }
}
