//! Persistence protocol between editing sessions and the canvas store.
//!
//! # Responsibility
//! - Map store records to the model and back.
//! - Serialize saves per document and run store calls off the caller's task.
//!
//! # See also
//! - `crate::repo::canvas_repo` for the store contract.

mod canvas_sync;
mod mapping;
mod save_lane;

pub use canvas_sync::{CanvasSync, LoadedCanvas, SaveOutcome, SyncError, SyncResult};
pub use mapping::{canvas_from_record, edge_to_record, node_to_record};
pub use save_lane::{SaveLane, SaveRequest};
