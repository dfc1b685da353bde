//! Editing services on top of the canvas model.
//!
//! # Responsibility
//! - Run user commands with undo history, clipboard and layout.
//! - Keep UI layers decoupled from graph mutation and persistence details.

pub mod canvas_session;
pub mod clipboard;
pub mod history;

pub use canvas_session::{CanvasSession, SessionError, SessionResult};
pub use clipboard::{duplicate, Clipboard, DUPLICATE_OFFSET, PASTE_OFFSET};
pub use history::{HistoryManager, Snapshot, DEFAULT_HISTORY_CAPACITY};
