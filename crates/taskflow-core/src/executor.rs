use std::{sync::Arc, time::Duration};

use taskflow_model::{FailureReason, Task, TaskFailure, TaskResult};
use time::OffsetDateTime;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    Clock,
    channels::{FailureSender, SuccessSender, TaskReceiver},
};

/// Decide a task's outcome.
///
/// Success requires both a successful job and an age strictly below `staleness` at `checked_at`.
pub fn evaluate(
    job_ok: bool,
    created_at: OffsetDateTime,
    checked_at: OffsetDateTime,
    staleness: Duration,
) -> Result<TaskResult, FailureReason> {
    if !job_ok {
        return Err(FailureReason::JobFailed);
    }
    if checked_at - created_at < staleness {
        Ok(TaskResult::success())
    } else {
        Err(FailureReason::Stale)
    }
}

/// What the worker pool did before it shut down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutorReport {
    /// Tasks routed to exactly one of the result channels.
    pub routed: usize,
    /// Tasks left in the queue unattempted.
    pub discarded: usize,
    /// Workers that terminated by panicking.
    pub panicked: usize,
}

/// Pool of workers draining the task channel.
#[derive(Clone)]
pub struct TaskExecutor {
    clock: Arc<dyn Clock>,
    latency: Duration,
    staleness: Duration,
    cancel: CancellationToken,
}

impl TaskExecutor {
    pub fn new(
        clock: Arc<dyn Clock>,
        latency: Duration,
        staleness: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            clock,
            latency,
            staleness,
            cancel,
        }
    }

    /// Run `workers` concurrent workers until the input is closed and drained (or cancellation).
    ///
    /// The pool owns the result senders: each worker gets its own handle, and the pool releases its handles only after every worker has been joined.
    /// The result channels therefore close once, after the last send.
    #[instrument(level = "debug", skip_all, fields(workers = workers))]
    pub async fn run(
        &self,
        input: TaskReceiver,
        success: SuccessSender,
        failure: FailureSender,
        workers: usize,
    ) -> ExecutorReport {
        let mut pool = JoinSet::new();
        for worker in 0..workers.max(1) {
            let this = self.clone();
            let input = input.clone();
            let success = success.share();
            let failure = failure.share();
            pool.spawn(async move { this.work(worker, input, success, failure).await });
        }

        let mut report = ExecutorReport::default();
        while let Some(joined) = pool.join_next().await {
            match joined {
                Ok(routed) => report.routed += routed,
                Err(e) => {
                    error!(error = %e, "worker terminated abnormally");
                    report.panicked += 1;
                }
            }
        }

        success.close();
        failure.close();

        report.discarded = input.drain().await;
        if report.discarded > 0 {
            warn!(discarded = report.discarded, "queued tasks dropped without execution");
        }
        info!(routed = report.routed, "worker pool stopped");
        report
    }

    pub fn spawn(
        self,
        input: TaskReceiver,
        success: SuccessSender,
        failure: FailureSender,
        workers: usize,
    ) -> JoinHandle<ExecutorReport> {
        tokio::spawn(async move { self.run(input, success, failure, workers).await })
    }

    async fn work(
        self,
        worker: usize,
        input: TaskReceiver,
        success: SuccessSender,
        failure: FailureSender,
    ) -> usize {
        let mut routed = 0usize;

        loop {
            let task = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                next = input.recv() => match next {
                    Some(task) => task,
                    None => break,
                },
            };

            if !self.execute(worker, task, &success, &failure).await {
                break;
            }
            routed += 1;

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = self.clock.sleep(self.latency) => {}
            }
        }

        debug!(worker, routed, "worker finished");
        routed
    }

    /// Run one task and send it to exactly one result channel.
    ///
    /// Returns `false` if that channel has no reader anymore.
    async fn execute(
        &self,
        worker: usize,
        mut task: Task,
        success: &SuccessSender,
        failure: &FailureSender,
    ) -> bool {
        let outcome = if task.is_completed() {
            warn!(worker, id = %task.id(), "task arrived with a recorded result; job not run");
            Err(FailureReason::AlreadyCompleted)
        } else {
            self.attempt(&mut task)
        };

        match outcome {
            Ok(_) => {
                debug!(worker, id = %task.id(), "task succeeded");
                if let Err(task) = success.send(task).await {
                    warn!(worker, id = %task.id(), "success channel closed; worker stopping");
                    return false;
                }
            }
            Err(reason) => {
                let err = TaskFailure::new(task.id().clone(), task.created_at(), reason);
                debug!(worker, error = %err, "task failed");
                if let Err(err) = failure.send(err).await {
                    warn!(worker, id = %err.id(), "failure channel closed; worker stopping");
                    return false;
                }
            }
        }
        true
    }

    /// Run the job of a task without a result and record the outcome on it.
    fn attempt(&self, task: &mut Task) -> Result<TaskResult, FailureReason> {
        let job_ok = task.run_job();
        let checked_at = self.clock.now();
        let outcome = evaluate(job_ok, task.created_at(), checked_at, self.staleness);

        let result = match &outcome {
            Ok(result) => result.clone(),
            Err(reason) => TaskResult::fail(reason.message()),
        };
        // Only called for tasks without a result, so recording cannot be rejected.
        let _ = task.complete(result, checked_at);
        outcome
    }
}
