//! Opens and closes registration on hosts as their open and close dates pass.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use domain::models::RegistrationSettings;
use domain::services::schedule::status_change;
use domain::services::Clock;
use persistence::repositories::RegistrationSettingsRepository;
use sqlx::PgPool;
use tracing::{debug, info};

use super::scheduler::{Job, JobFrequency};
use crate::middleware::metrics::record_status_changes;

/// A pending status flip for one settings row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub settings_id: i64,
    pub status: bool,
}

/// Status flips due at `now` among the given settings.
pub fn plan_status_changes(
    settings: &[RegistrationSettings],
    now: DateTime<Utc>,
) -> Vec<StatusChange> {
    settings
        .iter()
        .filter_map(|s| {
            let settings_id = s.settings_id?;
            status_change(s, now).map(|status| StatusChange { settings_id, status })
        })
        .collect()
}

pub struct SetAndForgetJob {
    repo: RegistrationSettingsRepository,
    clock: Arc<dyn Clock>,
    interval_minutes: u64,
}

impl SetAndForgetJob {
    pub fn new(pool: PgPool, clock: Arc<dyn Clock>, interval_minutes: u64) -> Self {
        Self {
            repo: RegistrationSettingsRepository::new(pool),
            clock,
            interval_minutes,
        }
    }
}

#[async_trait::async_trait]
impl Job for SetAndForgetJob {
    fn name(&self) -> &'static str {
        "set_and_forget"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(self.interval_minutes)
    }

    fn run_on_start(&self) -> bool {
        true
    }

    async fn execute(&self) -> Result<(), String> {
        let now = self.clock.now();
        let settings: Vec<RegistrationSettings> = self
            .repo
            .list_scheduled()
            .await
            .map_err(|e| format!("Failed to load scheduled settings: {}", e))?
            .into_iter()
            .map(RegistrationSettings::from)
            .collect();

        let changes = plan_status_changes(&settings, now);
        let mut applied = 0u64;
        for change in &changes {
            let updated = self
                .repo
                .update_status(change.settings_id, change.status, now)
                .await
                .map_err(|e| {
                    format!(
                        "Failed to update status of settings {}: {}",
                        change.settings_id, e
                    )
                })?;
            if updated {
                debug!(
                    settings_id = change.settings_id,
                    status = change.status,
                    "Registration status changed by schedule"
                );
                applied += 1;
            }
        }

        record_status_changes(applied);
        if applied > 0 {
            info!(
                checked = settings.len(),
                changed = applied,
                "Scheduled registration status changes applied"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use domain::models::HostRef;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 1, 8, 0, 0).unwrap()
    }

    fn settings(id: i64, status: bool) -> RegistrationSettings {
        let mut settings = RegistrationSettings::new(&HostRef::new("node", id), "en");
        settings.settings_id = Some(id);
        settings.status = status;
        settings
    }

    #[test]
    fn test_opens_when_open_date_passed() {
        let mut s = settings(1, false);
        s.open = Some(now() - Duration::hours(1));

        assert_eq!(
            plan_status_changes(&[s], now()),
            vec![StatusChange {
                settings_id: 1,
                status: true
            }]
        );
    }

    #[test]
    fn test_closes_when_close_date_passed() {
        let mut s = settings(2, true);
        s.open = Some(now() - Duration::days(3));
        s.close = Some(now() - Duration::minutes(5));

        assert_eq!(
            plan_status_changes(&[s], now()),
            vec![StatusChange {
                settings_id: 2,
                status: false
            }]
        );
    }

    #[test]
    fn test_unchanged_and_unscheduled_rows_skipped() {
        let mut open_already = settings(3, true);
        open_already.open = Some(now() - Duration::hours(1));
        let unscheduled = settings(4, false);
        let mut not_yet = settings(5, false);
        not_yet.open = Some(now() + Duration::hours(1));

        assert!(plan_status_changes(&[open_already, unscheduled, not_yet], now()).is_empty());
    }

    #[test]
    fn test_unsaved_settings_skipped() {
        let mut s = settings(6, false);
        s.settings_id = None;
        s.open = Some(now() - Duration::hours(1));

        assert!(plan_status_changes(&[s], now()).is_empty());
    }
}
