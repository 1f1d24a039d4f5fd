use std::{collections::HashSet, sync::Arc, time::Duration};

use taskflow_core::{
    IdSource, ManualClock, Pipeline, PipelineConfig, PipelineOutcome, RandomIds, SeededRandom,
};
use taskflow_model::{FAIL_MESSAGE, TaskId};
use time::macros::datetime;
use tokio_util::sync::CancellationToken;

const GRACE: Duration = Duration::from_secs(10);

fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::with_tick(
        datetime!(2024-05-01 12:00:00 UTC),
        Duration::from_millis(1),
    ))
}

fn fast_config(p: f64) -> PipelineConfig {
    PipelineConfig::default()
        .with_window(Duration::from_millis(200))
        .with_latency(Duration::ZERO)
        .with_failure_probability(p)
}

async fn run(pipeline: Pipeline) -> PipelineOutcome {
    tokio::time::timeout(GRACE, pipeline.run())
        .await
        .expect("pipeline did not terminate")
        .expect("pipeline failed")
}

fn assert_partitioned(out: &PipelineOutcome) {
    let mut seen: HashSet<TaskId> = out.results.keys().cloned().collect();
    for err in &out.errors {
        assert!(seen.insert(err.id().clone()), "task {} routed twice", err.id());
    }
    assert_eq!(seen.len(), out.generated);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn every_task_lands_in_exactly_one_collection() {
    let pipeline = Pipeline::new(fast_config(0.5))
        .with_clock(manual_clock())
        .with_random(Arc::new(SeededRandom::new(99)));

    let out = run(pipeline).await;

    assert!(out.generated > 0);
    assert_eq!(out.discarded, 0);
    assert_eq!(out.results.len() + out.errors.len(), out.generated);
    assert_partitioned(&out);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn zero_window_yields_nothing() {
    let cfg = fast_config(0.5).with_window(Duration::ZERO);
    let out = run(Pipeline::new(cfg)).await;

    assert_eq!(out.generated, 0);
    assert!(out.results.is_empty());
    assert!(out.errors.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn zero_failure_probability_yields_only_successes() {
    let pipeline = Pipeline::new(fast_config(0.0)).with_clock(manual_clock());
    let out = run(pipeline).await;

    assert!(out.generated > 0);
    assert!(out.errors.is_empty());
    assert_eq!(out.results.len(), out.generated);
    assert!(
        out.results
            .values()
            .all(|t| t.result().is_some_and(|r| r.is_success()))
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn certain_failure_yields_only_failures() {
    let pipeline = Pipeline::new(fast_config(1.0)).with_clock(manual_clock());
    let out = run(pipeline).await;

    assert!(out.generated > 0);
    assert!(out.results.is_empty());
    assert_eq!(out.errors.len(), out.generated);
    for err in &out.errors {
        assert!(!err.is_stale());
        assert_eq!(err.message(), FAIL_MESSAGE);
        assert!(err.to_string().contains(&format!("task id {} ", err.id())));
        assert!(err.to_string().ends_with("err=something went wrong"));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn staleness_overrides_successful_job() {
    // Age is never strictly below zero, so every successful job is already stale.
    let cfg = fast_config(0.0).with_staleness(Duration::ZERO);
    let out = run(Pipeline::new(cfg).with_clock(manual_clock())).await;

    assert!(out.generated > 0);
    assert!(out.results.is_empty());
    assert_eq!(out.errors.len(), out.generated);
    assert!(out.errors.iter().all(|e| e.is_stale()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn terminates_for_any_pool_size() {
    for workers in 1..=8 {
        let cfg = PipelineConfig::default()
            .with_window(Duration::from_millis(50))
            .with_latency(Duration::from_millis(1))
            .with_workers(workers);

        let out = run(Pipeline::new(cfg)).await;
        assert_eq!(
            out.results.len() + out.errors.len(),
            out.generated,
            "workers = {workers}"
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn buffered_result_channels_lose_nothing() {
    for capacity in [1, 4, 64] {
        let cfg = fast_config(0.5)
            .with_workers(3)
            .with_result_capacity(capacity);
        let out = run(Pipeline::new(cfg).with_clock(manual_clock())).await;

        assert_partitioned(&out);
        assert_eq!(
            out.results.len() + out.errors.len(),
            out.generated,
            "capacity = {capacity}"
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn ids_stay_unique_within_one_second() {
    // Real clock, no latency: hundreds of tasks share the same wall-clock second.
    let cfg = PipelineConfig::default()
        .with_window(Duration::from_millis(300))
        .with_latency(Duration::ZERO)
        .with_failure_probability(0.0);

    for pipeline in [
        Pipeline::new(cfg.clone()),
        Pipeline::new(cfg.clone()).with_ids(Arc::new(RandomIds)),
    ] {
        let out = run(pipeline).await;
        assert!(out.generated > 1);
        assert_eq!(out.overwritten, 0);
        assert_eq!(out.results.len(), out.generated);
    }
}

struct SameId;

impl IdSource for SameId {
    fn next_id(&self) -> TaskId {
        TaskId::from("collision")
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn colliding_ids_keep_last_write() {
    let pipeline = Pipeline::new(fast_config(0.0))
        .with_clock(manual_clock())
        .with_ids(Arc::new(SameId));
    let out = run(pipeline).await;

    assert!(out.generated > 1);
    assert_eq!(out.results.len(), 1);
    assert_eq!(out.overwritten, out.generated - 1);
    assert_eq!(out.completed(), out.generated);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cancellation_shuts_down_gracefully() {
    let cancel = CancellationToken::new();
    let cfg = PipelineConfig::default()
        .with_window(Duration::from_secs(3600))
        .with_latency(Duration::from_millis(5));
    let pipeline = Pipeline::new(cfg).with_cancellation(cancel.clone());

    let trigger = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
    });

    let out = run(pipeline).await;
    trigger.await.unwrap();

    assert!(out.generated > 0);
    assert_eq!(
        out.results.len() + out.errors.len() + out.discarded,
        out.generated
    );
}
