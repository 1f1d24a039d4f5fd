mod error;
pub use error::ModelError;

mod task_id;
pub use task_id::TaskId;

mod task_result;
pub use task_result::{
    ALREADY_COMPLETED_MESSAGE, FAIL_MESSAGE, STALE_MESSAGE, SUCCESS_MESSAGE, TaskResult,
};

mod failure;
pub use failure::{FailureReason, TaskFailure};

mod task;
pub use task::{Job, Task};

mod report;
pub use report::TaskReport;

/// Probability in `[0, 1]` that a freshly created task carries a failing job.
pub type FailureProbability = f64;
