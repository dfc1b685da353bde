//! Conversion between store records and the canvas model.
//!
//! # Invariants
//! - `data_json` holds the payload fields without the kind tag; the kind
//!   lives in `node_type` only.
//! - Reading is lenient: a row that cannot be interpreted is dropped and
//!   reported, never fatal for the whole canvas.
//! - Writing is strict: a payload that cannot be encoded fails the save.

use crate::model::{
    Canvas, Edge, EdgeKind, Graph, GraphRepair, Node, NodeKind, NodePayload, NodeStyle, Point,
    Size, Visibility,
};
use crate::repo::{CanvasRecord, EdgeRecord, NodeRecord};
use serde_json::Value;

const PAYLOAD_TAG: &str = "kind";

/// Builds the canvas held by `record`, returning what had to be dropped.
pub fn canvas_from_record(record: CanvasRecord) -> (Canvas, GraphRepair) {
    let mut unreadable_nodes = Vec::new();
    let nodes: Vec<Node> = record
        .nodes
        .into_iter()
        .filter_map(|row| {
            let node_id = row.node_id.clone();
            let node = node_from_record(row);
            if node.is_none() {
                unreadable_nodes.push(node_id);
            }
            node
        })
        .collect();
    let edges: Vec<Edge> = record.edges.into_iter().map(edge_from_record).collect();

    let (graph, mut repair) = Graph::new(nodes, edges).normalized();
    unreadable_nodes.append(&mut repair.dropped_nodes);
    repair.dropped_nodes = unreadable_nodes;

    let canvas = Canvas {
        id: Some(record.canvas_uuid),
        title: record.title,
        graph,
        workspace_id: record.workspace_id,
        visibility: Visibility::parse(&record.visibility).unwrap_or_default(),
    };
    (canvas, repair)
}

/// Returns `None` for rows with an unknown type or an unreadable payload.
pub fn node_from_record(row: NodeRecord) -> Option<Node> {
    let kind = NodeKind::parse(&row.node_type)?;

    let mut data = match serde_json::from_str::<Value>(&row.data_json).ok()? {
        Value::Object(map) => map,
        _ => return None,
    };
    data.insert(
        PAYLOAD_TAG.to_string(),
        Value::String(kind.as_str().to_string()),
    );
    let payload: NodePayload = serde_json::from_value(Value::Object(data)).ok()?;

    let style = serde_json::from_str::<NodeStyle>(&row.style_json)
        .unwrap_or_else(|_| kind.default_style());
    let size = Size::new(row.width, row.height);

    Some(Node {
        id: row.node_id,
        position: Point::new(row.position_x, row.position_y),
        size: if size.is_valid() {
            size
        } else {
            kind.default_size()
        },
        style,
        payload,
        selected: false,
    })
}

pub fn edge_from_record(row: EdgeRecord) -> Edge {
    Edge {
        id: row.edge_id,
        source: row.source_node_id,
        target: row.target_node_id,
        kind: EdgeKind::parse(&row.edge_type).unwrap_or_default(),
        label: row.label,
        color: row.color,
        selected: false,
    }
}

pub fn node_to_record(node: &Node) -> serde_json::Result<NodeRecord> {
    let mut data = serde_json::to_value(&node.payload)?;
    if let Value::Object(map) = &mut data {
        map.remove(PAYLOAD_TAG);
    }
    Ok(NodeRecord {
        node_id: node.id.clone(),
        node_type: node.kind().as_str().to_string(),
        position_x: node.position.x,
        position_y: node.position.y,
        width: node.size.width,
        height: node.size.height,
        style_json: serde_json::to_string(&node.style)?,
        data_json: serde_json::to_string(&data)?,
    })
}

pub fn edge_to_record(edge: &Edge) -> EdgeRecord {
    EdgeRecord {
        edge_id: edge.id.clone(),
        source_node_id: edge.source.clone(),
        target_node_id: edge.target.clone(),
        edge_type: edge.kind.as_str().to_string(),
        label: edge.label.clone(),
        color: edge.color.clone(),
    }
}
