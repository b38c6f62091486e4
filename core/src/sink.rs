//! The core-to-display seam.
//!
//! The engine only ever pushes structural ops through this trait and
//! probes `is_idle` for backpressure; it never reads tree state back
//! from a sink.

use replay_protocol::StructuralOp;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Consumer of structural operations (in production, a tree widget
/// adapter; in tests, [`RecordingSink`]).
pub trait StructuralSink {
    /// Forward one tree mutation.
    fn apply(&mut self, op: &StructuralOp);

    /// Backpressure probe: `false` while the sink is still processing a
    /// previous batch. The scheduler skips ticks while busy instead of
    /// queuing.
    fn is_idle(&self) -> bool {
        true
    }
}

#[derive(Debug, Default)]
struct RecordingSinkInner {
    ops: Mutex<Vec<StructuralOp>>,
    live: Mutex<HashSet<String>>,
    busy: AtomicBool,
}

/// Test double: records every op and exposes a scriptable busy flag.
/// Clones share state, so a handle kept outside the scheduler observes
/// everything the scheduler forwards.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    inner: Arc<RecordingSinkInner>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all ops received so far, in order.
    pub fn ops(&self) -> Vec<StructuralOp> {
        self.inner
            .ops
            .lock()
            .map(|ops| ops.clone())
            .unwrap_or_default()
    }

    pub fn op_count(&self) -> usize {
        self.inner.ops.lock().map(|ops| ops.len()).unwrap_or(0)
    }

    /// Existence query over the projected display: created and not yet
    /// marked deleted.
    pub fn contains_node(&self, id: &str) -> bool {
        self.inner
            .live
            .lock()
            .map(|live| live.contains(id))
            .unwrap_or(false)
    }

    pub fn set_busy(&self, busy: bool) {
        self.inner.busy.store(busy, Ordering::SeqCst);
    }
}

impl StructuralSink for RecordingSink {
    fn apply(&mut self, op: &StructuralOp) {
        if let Ok(mut live) = self.inner.live.lock() {
            match op {
                StructuralOp::CreateNode { id, .. } => {
                    live.insert(id.clone());
                }
                StructuralOp::MarkDeleted { id } => {
                    live.remove(id);
                }
                StructuralOp::MoveNode { .. }
                | StructuralOp::UpdateStatus { .. }
                | StructuralOp::SelectNode { .. } => {}
            }
        }
        if let Ok(mut ops) = self.inner.ops.lock() {
            ops.push(op.clone());
        }
    }

    fn is_idle(&self) -> bool {
        !self.inner.busy.load(Ordering::SeqCst)
    }
}
