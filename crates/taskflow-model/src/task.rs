use std::{fmt, sync::Arc};

use time::OffsetDateTime;

use crate::{ModelError, TaskId, TaskReport, TaskResult};

/// Unit of work carried by a task. Returns `true` when the work succeeded.
pub type Job = Arc<dyn Fn() -> bool + Send + Sync>;

/// A single fire-once unit of work.
///
/// The id and creation time are fixed at construction.
/// The result and completion time are recorded together, exactly once, by the worker that executes the task.
#[derive(Clone)]
pub struct Task {
    id: TaskId,
    created_at: OffsetDateTime,
    completed_at: Option<OffsetDateTime>,
    result: Option<TaskResult>,
    job: Job,
}

impl Task {
    pub fn new(id: TaskId, created_at: OffsetDateTime, job: Job) -> Self {
        Self {
            id,
            created_at,
            completed_at: None,
            result: None,
            job,
        }
    }

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    pub fn completed_at(&self) -> Option<OffsetDateTime> {
        self.completed_at
    }

    pub fn result(&self) -> Option<&TaskResult> {
        self.result.as_ref()
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        self.result.is_some()
    }

    /// Invoke the embedded job.
    pub fn run_job(&self) -> bool {
        (self.job)()
    }

    /// Record the terminal result.
    ///
    /// Fails if a result has already been recorded; the existing result is left untouched.
    pub fn complete(
        &mut self,
        result: TaskResult,
        completed_at: OffsetDateTime,
    ) -> Result<(), ModelError> {
        if self.result.is_some() {
            return Err(ModelError::AlreadyCompleted(self.id.clone()));
        }
        self.result = Some(result);
        self.completed_at = Some(completed_at);
        Ok(())
    }

    /// Read-only snapshot suitable for presentation or serialization.
    pub fn report(&self) -> TaskReport {
        TaskReport {
            id: self.id.clone(),
            created_at: self.created_at,
            completed_at: self.completed_at,
            result: self.result.clone(),
        }
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("completed_at", &self.completed_at)
            .field("result", &self.result)
            .finish_non_exhaustive()
    }
}
