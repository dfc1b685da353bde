//! Persistence contracts for canvases.
//!
//! # Responsibility
//! - Define the store interface the sync protocol depends on.
//! - Provide the SQLite reference implementation.
//!
//! # Invariants
//! - Store APIs return semantic errors (`NotFound`) besides transport errors.

pub mod canvas_repo;

pub use canvas_repo::{
    CanvasRecord, CanvasStore, CanvasSummary, EdgeRecord, NodeRecord, SqliteCanvasStore,
    StoreError, StoreResult,
};
