use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use thiserror::Error;

use crate::{ALREADY_COMPLETED_MESSAGE, FAIL_MESSAGE, STALE_MESSAGE, TaskId};

/// Why a task ended up on the failure channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The job itself returned `false`.
    JobFailed,
    /// The job returned `true`, but the task was older than the staleness threshold when checked.
    Stale,
    /// The task already carried a result when a worker picked it up; the job was not run again.
    AlreadyCompleted,
}

impl FailureReason {
    pub fn message(&self) -> &'static str {
        match self {
            FailureReason::JobFailed => FAIL_MESSAGE,
            FailureReason::Stale => STALE_MESSAGE,
            FailureReason::AlreadyCompleted => ALREADY_COMPLETED_MESSAGE,
        }
    }
}

/// Error value routed to the failure channel for every task that did not succeed.
///
/// Renders as `task id <id> time <created_at>; err=<message>`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("task id {id} time {}; err={}", rfc3339(.created_at), .reason.message())]
pub struct TaskFailure {
    id: TaskId,
    created_at: OffsetDateTime,
    reason: FailureReason,
}

impl TaskFailure {
    pub fn new(id: TaskId, created_at: OffsetDateTime, reason: FailureReason) -> Self {
        Self {
            id,
            created_at,
            reason,
        }
    }

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    pub fn reason(&self) -> FailureReason {
        self.reason
    }

    pub fn message(&self) -> &'static str {
        self.reason.message()
    }

    #[inline]
    pub fn is_stale(&self) -> bool {
        self.reason == FailureReason::Stale
    }
}

pub(crate) fn rfc3339(ts: &OffsetDateTime) -> String {
    ts.format(&Rfc3339).unwrap_or_else(|_| ts.to_string())
}
