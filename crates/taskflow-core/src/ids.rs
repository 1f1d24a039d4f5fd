use std::sync::atomic::{AtomicU64, Ordering};

use taskflow_model::TaskId;

/// Issues task identifiers. Every call must return an id not returned before.
pub trait IdSource: Send + Sync {
    fn next_id(&self) -> TaskId;
}

/// Monotonic counter starting at 1.
#[derive(Debug)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSource for SequentialIds {
    fn next_id(&self) -> TaskId {
        TaskId::from(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

/// Random v4 UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&self) -> TaskId {
        TaskId::from(uuid::Uuid::new_v4().to_string())
    }
}
