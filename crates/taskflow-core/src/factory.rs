use std::sync::Arc;

use taskflow_model::{FailureProbability, Job, Task};
use tracing::trace;

use crate::{Clock, IdSource, RandomSource};

/// Builds tasks with unique ids and randomized jobs.
#[derive(Clone)]
pub struct TaskFactory {
    clock: Arc<dyn Clock>,
    random: Arc<dyn RandomSource>,
    ids: Arc<dyn IdSource>,
    failure_probability: FailureProbability,
}

impl TaskFactory {
    pub fn new(
        clock: Arc<dyn Clock>,
        random: Arc<dyn RandomSource>,
        ids: Arc<dyn IdSource>,
        failure_probability: FailureProbability,
    ) -> Self {
        Self {
            clock,
            random,
            ids,
            failure_probability,
        }
    }

    /// New task whose job fails with the configured probability.
    ///
    /// The outcome is drawn once here; the job itself is a constant.
    pub fn create(&self) -> Task {
        let fails = self.random.chance(self.failure_probability);
        let job: Job = if fails {
            Arc::new(|| false)
        } else {
            Arc::new(|| true)
        };
        let task = self.create_with(job);
        trace!(id = %task.id(), fails, "task created");
        task
    }

    /// New task carrying the given job.
    pub fn create_with(&self, job: Job) -> Task {
        Task::new(self.ids.next_id(), self.clock.now(), job)
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ManualClock, SeededRandom, SequentialIds};
    use std::collections::HashSet;
    use taskflow_model::TaskId;
    use time::macros::datetime;

    fn factory(p: f64) -> TaskFactory {
        TaskFactory::new(
            Arc::new(ManualClock::new(datetime!(2024-05-01 12:00:00 UTC))),
            Arc::new(SeededRandom::new(11)),
            Arc::new(SequentialIds::new()),
            p,
        )
    }

    #[test]
    fn created_task_is_pending_with_clock_time() {
        let task = factory(0.0).create();
        assert_eq!(task.id(), &TaskId::from("1"));
        assert_eq!(task.created_at(), datetime!(2024-05-01 12:00:00 UTC));
        assert!(!task.is_completed());
    }

    #[test]
    fn probability_controls_job_outcome() {
        let never = factory(0.0);
        assert!((0..200).all(|_| never.create().run_job()));

        let always = factory(1.0);
        assert!((0..200).all(|_| !always.create().run_job()));
    }

    #[test]
    fn job_outcome_is_stable_per_task() {
        let f = factory(0.5);
        for _ in 0..100 {
            let task = f.create();
            let first = task.run_job();
            assert!((0..5).all(|_| task.run_job() == first));
        }
    }

    #[test]
    fn ids_unique_within_same_instant() {
        // The clock never moves, so every task shares one creation time.
        let f = factory(0.5);
        let ids: HashSet<_> = (0..5_000).map(|_| f.create().id().clone()).collect();
        assert_eq!(ids.len(), 5_000);
    }

    #[test]
    fn create_with_uses_given_job() {
        let task = factory(1.0).create_with(Arc::new(|| true));
        assert!(task.run_job());
    }
}
