//! Background job scheduler and job implementations.

mod alert_evaluation;
mod pool_metrics;
mod scheduler;

pub use alert_evaluation::{AlertEvaluationJob, AlertEvaluator};
pub use pool_metrics::PoolMetricsJob;
pub use scheduler::{Job, JobFrequency, JobScheduler};
