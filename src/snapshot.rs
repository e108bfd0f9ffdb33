// Latest-instruction cell shared between the frame loop and the render side.
// Writers swap in a whole `Arc<Instruction>`; readers never see a half-applied update.

use std::sync::{Arc, PoisonError, RwLock};

use crate::focus::Instruction;

/// Write side, owned by the pipeline.
#[derive(Debug)]
pub struct SnapshotPublisher {
    slot: Arc<RwLock<Arc<Instruction>>>,
}

/// Read side. Cheap to clone and hand to another thread.
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    slot: Arc<RwLock<Arc<Instruction>>>,
}

impl SnapshotPublisher {
    pub fn new(initial: Instruction) -> Self {
        SnapshotPublisher {
            slot: Arc::new(RwLock::new(Arc::new(initial))),
        }
    }

    pub fn publish(&self, instruction: Instruction) {
        let next = Arc::new(instruction);
        // The slot only ever holds a complete value, so a poisoned lock is still usable.
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = next;
    }

    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader {
            slot: Arc::clone(&self.slot),
        }
    }

    pub fn latest(&self) -> Arc<Instruction> {
        self.reader().latest()
    }
}

impl SnapshotReader {
    /// The most recently published instruction.
    pub fn latest(&self) -> Arc<Instruction> {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&slot)
    }
}
