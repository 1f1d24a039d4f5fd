use std::{collections::HashMap, sync::Arc};

use taskflow_model::{Task, TaskFailure, TaskId};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::{
    Clock, Collected, ExecutorReport, IdSource, PipelineConfig, RandomSource, ResultAggregator, SequentialIds, SystemClock,
    TaskExecutor, TaskFactory, TaskGenerator, ThreadRandom,
    channels::{failure_channel, success_channel, task_channel},
    error::PipelineError,
};

/// Final collections of a pipeline run.
#[derive(Debug, Default)]
pub struct PipelineOutcome {
    /// Successful tasks keyed by id.
    pub results: HashMap<TaskId, Task>,
    /// Failures in the order the aggregator received them.
    pub errors: Vec<TaskFailure>,
    /// Tasks the generator put into the queue.
    pub generated: usize,
    /// Queued tasks dropped unattempted after cancellation.
    pub discarded: usize,
    /// Successful tasks replaced in `results` by a later task with the same id.
    pub overwritten: usize,
}

impl PipelineOutcome {
    /// Number of tasks that reached a terminal result.
    pub fn completed(&self) -> usize {
        self.results.len() + self.overwritten + self.errors.len()
    }
}

/// Wires generator -> worker pool -> aggregator.
///
/// Each channel has a single closer: the generator closes the task channel, the worker pool closes both result channels, and the aggregator only reads.
pub struct Pipeline {
    config: PipelineConfig,
    clock: Arc<dyn Clock>,
    random: Arc<dyn RandomSource>,
    ids: Arc<dyn IdSource>,
    cancel: CancellationToken,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
            random: Arc::new(ThreadRandom),
            ids: Arc::new(SequentialIds::new()),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    pub fn with_ids(mut self, ids: Arc<dyn IdSource>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that stops the run early when cancelled.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run to completion and return both result collections.
    ///
    /// Individual task failures are part of the outcome, never an `Err`.
    #[instrument(level = "info", skip(self), fields(workers = self.config.workers))]
    pub async fn run(self) -> Result<PipelineOutcome, PipelineError> {
        self.config.validate()?;
        let cfg = &self.config;
        info!(
            window_ms = cfg.window.as_millis() as u64,
            latency_ms = cfg.latency.as_millis() as u64,
            staleness_ms = cfg.staleness.as_millis() as u64,
            failure_probability = cfg.failure_probability,
            "pipeline starting"
        );

        let (task_tx, task_rx) = task_channel(cfg.input_capacity);
        let (ok_tx, ok_rx) = success_channel(cfg.result_capacity);
        let (err_tx, err_rx) = failure_channel(cfg.result_capacity);

        let factory = TaskFactory::new(
            Arc::clone(&self.clock),
            Arc::clone(&self.random),
            Arc::clone(&self.ids),
            cfg.failure_probability,
        );
        let generator =
            TaskGenerator::new(factory, self.cancel.clone()).spawn(cfg.window, task_tx);
        let pool = TaskExecutor::new(
            Arc::clone(&self.clock),
            cfg.latency,
            cfg.staleness,
            self.cancel.clone(),
        )
        .spawn(task_rx, ok_tx, err_tx, cfg.workers);

        // An early return, or dropping this future, stops the spawned stages.
        let stop_on_exit = self.cancel.clone().drop_guard();

        let collected = ResultAggregator::collect(ok_rx, err_rx).await?;
        let report = pool
            .await
            .map_err(|e| PipelineError::join("worker pool", e))?;
        let generated = generator
            .await
            .map_err(|e| PipelineError::join("generator", e))?;

        stop_on_exit.disarm();
        finish(collected, report, generated)
    }
}

fn finish(
    collected: Collected,
    report: ExecutorReport,
    generated: usize,
) -> Result<PipelineOutcome, PipelineError> {
    if report.panicked > 0 {
        return Err(PipelineError::WorkerPanicked {
            count: report.panicked,
        });
    }

    info!(
        generated,
        succeeded = collected.results.len(),
        failed = collected.errors.len(),
        discarded = report.discarded,
        "pipeline finished"
    );
    Ok(PipelineOutcome {
        results: collected.results,
        errors: collected.errors,
        generated,
        discarded: report.discarded,
        overwritten: collected.overwritten,
    })
}
