pub mod error;
pub use error::{ConfigError, PipelineError};

pub mod config;
pub use config::PipelineConfig;

mod clock;
pub use clock::{Clock, ManualClock, SystemClock};

mod random;
pub use random::{RandomSource, SeededRandom, ThreadRandom};

mod ids;
pub use ids::{IdSource, RandomIds, SequentialIds};

pub mod channels;

mod factory;
pub use factory::TaskFactory;

mod generator;
pub use generator::TaskGenerator;

mod executor;
pub use executor::{ExecutorReport, TaskExecutor, evaluate};

mod aggregator;
pub use aggregator::{Collected, ResultAggregator};

mod pipeline;
pub use pipeline::{Pipeline, PipelineOutcome};
