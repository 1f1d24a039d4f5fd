use serde::{Deserialize, Serialize};

/// Message attached to a task that passed both the job and the staleness check.
pub const SUCCESS_MESSAGE: &str = "task has been succeeded";
/// Message attached to a task whose job returned `false`.
pub const FAIL_MESSAGE: &str = "something went wrong";
/// Message attached to a task whose job succeeded too late.
pub const STALE_MESSAGE: &str = "task exceeded staleness threshold";
/// Message attached to a task that reached a worker with a result already recorded.
pub const ALREADY_COMPLETED_MESSAGE: &str = "task already has a recorded result";

/// Terminal result of a single task execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum TaskResult {
    /// Job returned `true` before the task went stale.
    Success { message: String },
    /// Job returned `false`, or the task was too old when checked.
    Fail { message: String },
}

impl TaskResult {
    pub fn success() -> Self {
        TaskResult::Success {
            message: SUCCESS_MESSAGE.to_string(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        TaskResult::Fail {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            TaskResult::Success { message } | TaskResult::Fail { message } => message,
        }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, TaskResult::Success { .. })
    }
}
