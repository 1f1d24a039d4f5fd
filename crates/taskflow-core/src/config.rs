//! Pipeline tuning knobs.
//!
//! Every value has a default matching the reference workload (3s of generation, 150ms of simulated work per task, 20s staleness threshold).
//! Values can be overridden field by field, or loaded from `TASKFLOW_*` environment variables via [`PipelineConfig::from_env`].
use std::{str::FromStr, time::Duration};

use taskflow_model::FailureProbability;

use crate::error::ConfigError;

pub const ENV_WINDOW_MS: &str = "TASKFLOW_WINDOW_MS";
pub const ENV_LATENCY_MS: &str = "TASKFLOW_LATENCY_MS";
pub const ENV_STALENESS_MS: &str = "TASKFLOW_STALENESS_MS";
pub const ENV_INPUT_CAPACITY: &str = "TASKFLOW_INPUT_CAPACITY";
pub const ENV_RESULT_CAPACITY: &str = "TASKFLOW_RESULT_CAPACITY";
pub const ENV_WORKERS: &str = "TASKFLOW_WORKERS";
pub const ENV_FAILURE_PROBABILITY: &str = "TASKFLOW_FAILURE_PROBABILITY";

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// How long the generator keeps producing tasks.
    pub window: Duration,
    /// Simulated work delay applied by a worker after routing each task.
    pub latency: Duration,
    /// Maximum task age at check time that still allows a success.
    pub staleness: Duration,
    /// Buffer size of the generator -> workers channel.
    pub input_capacity: usize,
    /// Buffer size of each workers -> aggregator channel.
    pub result_capacity: usize,
    /// Number of concurrent workers.
    pub workers: usize,
    /// Chance that a generated task carries a failing job.
    pub failure_probability: FailureProbability,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(3),
            latency: Duration::from_millis(150),
            staleness: Duration::from_secs(20),
            input_capacity: 10,
            result_capacity: 1,
            workers: 4,
            failure_probability: 0.5,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.input_capacity == 0 {
            return Err(ConfigError::ZeroCapacity("input"));
        }
        if self.result_capacity == 0 {
            return Err(ConfigError::ZeroCapacity("result"));
        }
        if !(0.0..=1.0).contains(&self.failure_probability) {
            return Err(ConfigError::InvalidProbability(self.failure_probability));
        }
        Ok(())
    }

    /// Defaults overridden by whichever `TASKFLOW_*` variables are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(ms) = parse::<u64, _>(&lookup, ENV_WINDOW_MS)? {
            cfg.window = Duration::from_millis(ms);
        }
        if let Some(ms) = parse::<u64, _>(&lookup, ENV_LATENCY_MS)? {
            cfg.latency = Duration::from_millis(ms);
        }
        if let Some(ms) = parse::<u64, _>(&lookup, ENV_STALENESS_MS)? {
            cfg.staleness = Duration::from_millis(ms);
        }
        if let Some(n) = parse(&lookup, ENV_INPUT_CAPACITY)? {
            cfg.input_capacity = n;
        }
        if let Some(n) = parse(&lookup, ENV_RESULT_CAPACITY)? {
            cfg.result_capacity = n;
        }
        if let Some(n) = parse(&lookup, ENV_WORKERS)? {
            cfg.workers = n;
        }
        if let Some(p) = parse(&lookup, ENV_FAILURE_PROBABILITY)? {
            cfg.failure_probability = p;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_staleness(mut self, staleness: Duration) -> Self {
        self.staleness = staleness;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_input_capacity(mut self, capacity: usize) -> Self {
        self.input_capacity = capacity;
        self
    }

    pub fn with_result_capacity(mut self, capacity: usize) -> Self {
        self.result_capacity = capacity;
        self
    }

    pub fn with_failure_probability(mut self, p: FailureProbability) -> Self {
        self.failure_probability = p;
        self
    }
}

fn parse<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}
