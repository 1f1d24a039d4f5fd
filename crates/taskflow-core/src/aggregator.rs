use std::collections::HashMap;

use taskflow_model::{Task, TaskFailure, TaskId};
use tracing::{debug, warn};

use crate::{
    channels::{FailureReceiver, SuccessReceiver},
    error::PipelineError,
};

/// Everything read from the result channels.
#[derive(Debug, Default)]
pub struct Collected {
    /// Successful tasks keyed by id.
    pub results: HashMap<TaskId, Task>,
    /// Failures in arrival order.
    pub errors: Vec<TaskFailure>,
    /// Successful tasks replaced by a later task with the same id.
    pub overwritten: usize,
}

/// Fan-in of the success and failure channels.
///
/// Each channel is drained by its own reader task, which exclusively owns the container it fills.
pub struct ResultAggregator;

impl ResultAggregator {
    /// Read both channels until each is closed and drained.
    pub async fn collect(
        success: SuccessReceiver,
        failure: FailureReceiver,
    ) -> Result<Collected, PipelineError> {
        let successes = tokio::spawn(read_successes(success));
        let failures = tokio::spawn(read_failures(failure));

        let (successes, failures) = tokio::join!(successes, failures);
        let (results, overwritten) =
            successes.map_err(|e| PipelineError::join("success reader", e))?;
        let errors = failures.map_err(|e| PipelineError::join("failure reader", e))?;

        debug!(
            succeeded = results.len(),
            failed = errors.len(),
            overwritten,
            "result channels drained"
        );
        Ok(Collected {
            results,
            errors,
            overwritten,
        })
    }
}

async fn read_successes(mut rx: SuccessReceiver) -> (HashMap<TaskId, Task>, usize) {
    let mut results = HashMap::new();
    let mut overwritten = 0usize;

    while let Some(task) = rx.recv().await {
        let id = task.id().clone();
        // Last write wins.
        if results.insert(id.clone(), task).is_some() {
            overwritten += 1;
            warn!(%id, "duplicate task id; earlier result replaced");
        }
    }
    (results, overwritten)
}

async fn read_failures(mut rx: FailureReceiver) -> Vec<TaskFailure> {
    let mut errors = Vec::new();
    while let Some(err) = rx.recv().await {
        errors.push(err);
    }
    errors
}
