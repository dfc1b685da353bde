//! Per-document save serialization.
//!
//! # Responsibility
//! - Run saves of one document one at a time, in arrival order.
//! - Skip a waiting save when a newer save for the same document is
//!   already waiting behind it.
//! - Remember the store id obtained by the first successful create.
//!
//! # Invariants
//! - Tickets are issued in request order and never reused.
//! - A ticket counts as pending from the first poll of its save until the
//!   save finishes or its future is dropped.

use crate::model::{Canvas, CanvasId};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, MutexGuard as AsyncMutexGuard};

#[derive(Debug)]
pub(crate) struct LaneState {
    pub canvas_id: Option<CanvasId>,
}

/// Serializes saves of one canvas. Shared between the session and every
/// `SaveRequest` it hands out.
#[derive(Debug)]
pub struct SaveLane {
    state: AsyncMutex<LaneState>,
    pending: Mutex<BTreeSet<u64>>,
    next_ticket: AtomicU64,
}

impl SaveLane {
    pub fn new(canvas_id: Option<CanvasId>) -> Arc<Self> {
        Arc::new(Self {
            state: AsyncMutex::new(LaneState { canvas_id }),
            pending: Mutex::new(BTreeSet::new()),
            next_ticket: AtomicU64::new(1),
        })
    }

    /// Issues a request that owns `canvas` as its snapshot.
    pub fn request(self: &Arc<Self>, canvas: Canvas) -> SaveRequest {
        SaveRequest {
            lane: Arc::clone(self),
            ticket: self.next_ticket.fetch_add(1, Ordering::Relaxed),
            canvas,
        }
    }

    pub(crate) fn enter(&self, ticket: u64) -> TicketGuard<'_> {
        if let Ok(mut pending) = self.pending.lock() {
            pending.insert(ticket);
        }
        TicketGuard { lane: self, ticket }
    }

    pub(crate) async fn acquire(&self) -> AsyncMutexGuard<'_, LaneState> {
        self.state.lock().await
    }

    fn has_newer_than(&self, ticket: u64) -> bool {
        self.pending
            .lock()
            .map(|pending| pending.range(ticket + 1..).next().is_some())
            .unwrap_or(false)
    }
}

/// Marks a save as pending until dropped.
pub(crate) struct TicketGuard<'a> {
    lane: &'a SaveLane,
    ticket: u64,
}

impl TicketGuard<'_> {
    pub fn is_superseded(&self) -> bool {
        self.lane.has_newer_than(self.ticket)
    }
}

impl Drop for TicketGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.lane.pending.lock() {
            pending.remove(&self.ticket);
        }
    }
}

/// A save of one canvas snapshot, detached from the live session.
#[derive(Debug)]
pub struct SaveRequest {
    lane: Arc<SaveLane>,
    ticket: u64,
    canvas: Canvas,
}

impl SaveRequest {
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    pub(crate) fn lane(&self) -> &SaveLane {
        &self.lane
    }
}
