//! Store metrics: per-query latency and pool gauges.

use metrics::{counter, gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

pub const QUERY_DURATION: &str = "registration_store_query_duration_seconds";
pub const QUERY_ERRORS: &str = "registration_store_query_errors_total";

pub fn record_query_duration(query: &'static str, duration_secs: f64) {
    histogram!(QUERY_DURATION, "query" => query).record(duration_secs);
}

/// Samples the pool. Saturation is the share of the pool's maximum in use.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size();
    let idle = u32::try_from(pool.num_idle()).unwrap_or(u32::MAX);
    let active = size.saturating_sub(idle);
    let max = pool.options().get_max_connections();

    gauge!("registration_store_connections_active").set(f64::from(active));
    gauge!("registration_store_connections_idle").set(f64::from(idle));
    gauge!("registration_store_connections_total").set(f64::from(size));
    gauge!("registration_store_pool_saturation").set(saturation(active, max));
}

fn saturation(active: u32, max: u32) -> f64 {
    if max == 0 {
        return 0.0;
    }
    f64::from(active) / f64::from(max)
}

/// Times one named repository query.
///
/// ```ignore
/// let timer = QueryTimer::new("find_registration_by_id");
/// let row = sqlx::query_as::<_, RegistrationEntity>(...).fetch_optional(&self.pool).await;
/// timer.record();
/// ```
pub struct QueryTimer {
    query: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query: &'static str) -> Self {
        Self {
            query,
            start: Instant::now(),
        }
    }

    pub fn record(self) {
        record_query_duration(self.query, self.start.elapsed().as_secs_f64());
    }

    /// Records the latency and counts the query as failed when `result` is an error.
    pub fn record_result<T, E>(self, result: &Result<T, E>) {
        if result.is_err() {
            counter!(QUERY_ERRORS, "query" => self.query).increment(1);
        }
        self.record();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_timer_keeps_name() {
        let timer = QueryTimer::new("find_host");
        assert_eq!(timer.query, "find_host");
        timer.record();
    }

    #[test]
    fn test_record_result_accepts_both_outcomes() {
        QueryTimer::new("upsert_host").record_result(&Ok::<_, ()>(1));
        QueryTimer::new("upsert_host").record_result(&Err::<(), _>("unique violation"));
    }

    #[test]
    fn test_saturation() {
        assert_eq!(saturation(0, 10), 0.0);
        assert_eq!(saturation(5, 10), 0.5);
        assert_eq!(saturation(3, 0), 0.0);
    }
}
