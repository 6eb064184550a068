//! Deferred work handoff from completion handlers to a lower-priority context.
//!
//! Conversion-complete handlers must stay short, so they only push the raw
//! sample and post a work item; the filter output and velocity publication
//! run later in the deferred context. Posting the same item repeatedly is
//! harmless since the filter always reads the latest ring contents.

use crossbeam::channel::{Receiver, Sender, unbounded};

use crate::state::AxisId;

/// Work items the deferred context understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredWork {
    /// Run the velocity filter for one axis and publish the result.
    Filter(AxisId),
}

/// Posting side of the deferred handoff. Implemented by the host executor
/// here and by interrupt-level software-event posters on embedded targets.
pub trait DeferredExecutor: Send + Sync {
    /// Queue `work` for the deferred context. Must not block.
    fn post(&self, work: DeferredWork);
}

/// Channel-backed executor for hosted targets.
#[derive(Debug, Clone)]
pub struct ChannelExecutor {
    tx: Sender<DeferredWork>,
}

impl ChannelExecutor {
    /// Create the executor and the receiving end the worker thread drains.
    #[must_use]
    pub fn new() -> (Self, Receiver<DeferredWork>) {
        let (tx, rx) = unbounded();
        (Self { tx }, rx)
    }
}

impl DeferredExecutor for ChannelExecutor {
    fn post(&self, work: DeferredWork) {
        if self.tx.send(work).is_err() {
            // Receiver dropped during shutdown; the work is moot.
        }
    }
}
