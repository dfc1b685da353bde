//! Canvas store contract and its SQLite implementation.
//!
//! # Responsibility
//! - Define the load / create / replace-all / metadata contract the sync
//!   protocol talks to.
//! - Keep SQL and column naming inside this module.
//!
//! # Invariants
//! - Records use the store's own field names; mapping to domain types
//!   happens in `crate::sync`.
//! - `replace_canvas_contents` is atomic: either every node and edge of the
//!   canvas is replaced, or nothing changes.
//! - Row order is preserved through `sort_order`.
//!
//! # See also
//! - `crate::db` for connection bootstrap and schema.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::{CanvasId, CanvasMetadata, CanvasMetadataPatch};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    NotFound(CanvasId),
    /// Persisted row cannot be interpreted.
    InvalidData(String),
    /// A previous holder of the connection panicked.
    Poisoned,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "canvas not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted canvas data: {message}"),
            Self::Poisoned => write!(f, "canvas store connection is poisoned"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) | Self::Poisoned => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// One stored node row. `style_json`/`data_json` are opaque JSON documents.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub node_id: String,
    pub node_type: String,
    pub position_x: f64,
    pub position_y: f64,
    pub width: f64,
    pub height: f64,
    pub style_json: String,
    pub data_json: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeRecord {
    pub edge_id: String,
    pub source_node_id: String,
    pub target_node_id: String,
    pub edge_type: String,
    pub label: Option<String>,
    pub color: Option<String>,
}

/// A stored canvas with its contents in stored order.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasRecord {
    pub canvas_uuid: CanvasId,
    pub title: String,
    pub workspace_id: Option<String>,
    pub visibility: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
}

/// Listing projection without node/edge payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasSummary {
    pub canvas_uuid: CanvasId,
    pub title: String,
    pub workspace_id: Option<String>,
    pub visibility: String,
    pub node_count: u32,
    pub updated_at: i64,
}

/// External store the sync protocol persists canvases through.
pub trait CanvasStore {
    fn load_canvas(&self, id: CanvasId) -> StoreResult<Option<CanvasRecord>>;
    fn create_canvas(&self, metadata: &CanvasMetadata) -> StoreResult<CanvasId>;
    /// Replaces every node and edge of `id` with the given rows.
    fn replace_canvas_contents(
        &self,
        id: CanvasId,
        nodes: &[NodeRecord],
        edges: &[EdgeRecord],
    ) -> StoreResult<()>;
    fn update_canvas_metadata(&self, id: CanvasId, patch: &CanvasMetadataPatch)
        -> StoreResult<()>;
    /// Lists canvases by `updated_at DESC, canvas_uuid ASC`. `None` lists all.
    fn list_canvases(&self, workspace_id: Option<&str>) -> StoreResult<Vec<CanvasSummary>>;
}

/// SQLite-backed canvas store. The connection is guarded so the store can
/// be shared with blocking worker threads.
pub struct SqliteCanvasStore {
    conn: Mutex<Connection>,
}

impl SqliteCanvasStore {
    /// Wraps an already migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl CanvasStore for SqliteCanvasStore {
    fn load_canvas(&self, id: CanvasId) -> StoreResult<Option<CanvasRecord>> {
        let conn = self.lock()?;
        let header = conn
            .query_row(
                "SELECT title, workspace_id, visibility, created_at, updated_at
                 FROM canvases
                 WHERE canvas_uuid = ?1;",
                params![id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, i64>(4)?,
                    ))
                },
            )
            .optional()?;
        let Some((title, workspace_id, visibility, created_at, updated_at)) = header else {
            return Ok(None);
        };

        let mut node_stmt = conn.prepare(
            "SELECT node_id, node_type, position_x, position_y, width, height, style_json, data_json
             FROM canvas_nodes
             WHERE canvas_uuid = ?1
             ORDER BY sort_order ASC, node_id ASC;",
        )?;
        let nodes = node_stmt
            .query_map(params![id.to_string()], parse_node_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut edge_stmt = conn.prepare(
            "SELECT edge_id, source_node_id, target_node_id, edge_type, label, color
             FROM canvas_edges
             WHERE canvas_uuid = ?1
             ORDER BY sort_order ASC, edge_id ASC;",
        )?;
        let edges = edge_stmt
            .query_map(params![id.to_string()], parse_edge_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(CanvasRecord {
            canvas_uuid: id,
            title,
            workspace_id,
            visibility,
            created_at,
            updated_at,
            nodes,
            edges,
        }))
    }

    fn create_canvas(&self, metadata: &CanvasMetadata) -> StoreResult<CanvasId> {
        let id = Uuid::new_v4();
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO canvases (canvas_uuid, title, workspace_id, visibility, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, (strftime('%s', 'now') * 1000), (strftime('%s', 'now') * 1000));",
            params![
                id.to_string(),
                metadata.title.as_str(),
                metadata.workspace_id.as_deref(),
                metadata.visibility.as_str(),
            ],
        )?;
        Ok(id)
    }

    fn replace_canvas_contents(
        &self,
        id: CanvasId,
        nodes: &[NodeRecord],
        edges: &[EdgeRecord],
    ) -> StoreResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let key = id.to_string();

        let touched = tx.execute(
            "UPDATE canvases SET updated_at = (strftime('%s', 'now') * 1000) WHERE canvas_uuid = ?1;",
            params![key],
        )?;
        if touched == 0 {
            return Err(StoreError::NotFound(id));
        }

        tx.execute("DELETE FROM canvas_edges WHERE canvas_uuid = ?1;", params![key])?;
        tx.execute("DELETE FROM canvas_nodes WHERE canvas_uuid = ?1;", params![key])?;

        {
            let mut insert_node = tx.prepare(
                "INSERT INTO canvas_nodes (
                    canvas_uuid, node_id, sort_order, node_type,
                    position_x, position_y, width, height, style_json, data_json
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            )?;
            for (order, node) in nodes.iter().enumerate() {
                insert_node.execute(params![
                    key,
                    node.node_id,
                    order as i64,
                    node.node_type,
                    node.position_x,
                    node.position_y,
                    node.width,
                    node.height,
                    node.style_json,
                    node.data_json,
                ])?;
            }

            let mut insert_edge = tx.prepare(
                "INSERT INTO canvas_edges (
                    canvas_uuid, edge_id, sort_order, source_node_id, target_node_id,
                    edge_type, label, color
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            )?;
            for (order, edge) in edges.iter().enumerate() {
                insert_edge.execute(params![
                    key,
                    edge.edge_id,
                    order as i64,
                    edge.source_node_id,
                    edge.target_node_id,
                    edge.edge_type,
                    edge.label,
                    edge.color,
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn update_canvas_metadata(
        &self,
        id: CanvasId,
        patch: &CanvasMetadataPatch,
    ) -> StoreResult<()> {
        let conn = self.lock()?;
        let (set_workspace, workspace_id) = match &patch.workspace_id {
            Some(value) => (true, value.as_deref()),
            None => (false, None),
        };
        let changed = conn.execute(
            "UPDATE canvases
             SET
                title = COALESCE(?2, title),
                visibility = COALESCE(?3, visibility),
                workspace_id = CASE WHEN ?4 THEN ?5 ELSE workspace_id END,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE canvas_uuid = ?1;",
            params![
                id.to_string(),
                patch.title.as_deref(),
                patch.visibility.map(|visibility| visibility.as_str()),
                set_workspace,
                workspace_id,
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    fn list_canvases(&self, workspace_id: Option<&str>) -> StoreResult<Vec<CanvasSummary>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT
                c.canvas_uuid,
                c.title,
                c.workspace_id,
                c.visibility,
                (SELECT COUNT(*) FROM canvas_nodes n WHERE n.canvas_uuid = c.canvas_uuid),
                c.updated_at
             FROM canvases c
             WHERE ?1 IS NULL OR c.workspace_id = ?1
             ORDER BY c.updated_at DESC, c.canvas_uuid ASC;",
        )?;
        let rows = stmt
            .query_map(params![workspace_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, u32>(4)?,
                    row.get::<_, i64>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(
                |(raw_id, title, workspace_id, visibility, node_count, updated_at)| {
                    Ok(CanvasSummary {
                        canvas_uuid: parse_canvas_uuid(&raw_id)?,
                        title,
                        workspace_id,
                        visibility,
                        node_count,
                        updated_at,
                    })
                },
            )
            .collect()
    }
}

fn parse_node_row(row: &Row<'_>) -> rusqlite::Result<NodeRecord> {
    Ok(NodeRecord {
        node_id: row.get(0)?,
        node_type: row.get(1)?,
        position_x: row.get(2)?,
        position_y: row.get(3)?,
        width: row.get(4)?,
        height: row.get(5)?,
        style_json: row.get(6)?,
        data_json: row.get(7)?,
    })
}

fn parse_edge_row(row: &Row<'_>) -> rusqlite::Result<EdgeRecord> {
    Ok(EdgeRecord {
        edge_id: row.get(0)?,
        source_node_id: row.get(1)?,
        target_node_id: row.get(2)?,
        edge_type: row.get(3)?,
        label: row.get(4)?,
        color: row.get(5)?,
    })
}

fn parse_canvas_uuid(value: &str) -> StoreResult<CanvasId> {
    Uuid::parse_str(value)
        .map_err(|err| StoreError::InvalidData(format!("invalid canvas uuid `{value}`: {err}")))
}
