//! Node/edge id generation.
//!
//! # Responsibility
//! - Produce ids that stay unique within one canvas, even for bursts of
//!   programmatic inserts inside the same millisecond.
//!
//! # Invariants
//! - Generated ids have the shape `<prefix>-<epoch_ms>-<sequence>-<token>`.
//! - The sequence is process-wide and strictly increasing.
//! - A candidate that collides with a caller-provided taken id is re-rolled.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier of a persisted canvas (assigned by the store).
pub type CanvasId = Uuid;

/// Canvas-local node identifier.
pub type NodeId = String;

/// Canvas-local edge identifier.
pub type EdgeId = String;

const NODE_PREFIX: &str = "node";
const EDGE_PREFIX: &str = "edge";
const TOKEN_CHARS: usize = 6;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Generates a fresh node id that is not present in `taken`.
pub fn next_node_id(taken: impl Fn(&str) -> bool) -> NodeId {
    next_id(NODE_PREFIX, taken)
}

/// Generates a fresh edge id that is not present in `taken`.
pub fn next_edge_id(taken: impl Fn(&str) -> bool) -> EdgeId {
    next_id(EDGE_PREFIX, taken)
}

fn next_id(prefix: &str, taken: impl Fn(&str) -> bool) -> String {
    loop {
        let candidate = format!(
            "{prefix}-{}-{:x}-{}",
            epoch_millis(),
            SEQUENCE.fetch_add(1, Ordering::Relaxed),
            random_token()
        );
        if !taken(candidate.as_str()) {
            return candidate;
        }
    }
}

fn epoch_millis() -> u128 {
    // A clock before 1970 only loses the timestamp part; the sequence still
    // keeps ids apart.
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or(0)
}

fn random_token() -> String {
    Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(TOKEN_CHARS)
        .collect()
}
