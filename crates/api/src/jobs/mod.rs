//! Background job scheduler and job implementations.

mod pool_metrics;
mod scheduler;
mod set_and_forget;

pub use pool_metrics::PoolMetricsJob;
pub use scheduler::{Job, JobFrequency, JobScheduler};
pub use set_and_forget::{plan_status_changes, SetAndForgetJob, StatusChange};
