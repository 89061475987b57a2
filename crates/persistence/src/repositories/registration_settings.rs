//! Registration settings repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::{HostRef, RegistrationSettings};
use sqlx::PgPool;
use tracing::debug;

use crate::entities::{RegistrationSettingsEntity, RegistrationSettingsWithHostEntity};
use crate::error::PersistenceError;
use crate::metrics::QueryTimer;

const SETTINGS_COLUMNS: &str = "settings_id, entity_type_id, entity_id, langcode, status, capacity, \
     open_date, close_date, send_reminder, reminder_date, reminder_template, maximum_spaces, \
     multiple_registrations, from_address, confirmation, confirmation_redirect, created_at, changed_at";

/// Repository for per-host registration settings.
#[derive(Clone)]
pub struct RegistrationSettingsRepository {
    pool: PgPool,
}

impl RegistrationSettingsRepository {
    /// Creates a new RegistrationSettingsRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Find the settings saved for a host.
    pub async fn find_by_host(
        &self,
        host: &HostRef,
    ) -> Result<Option<RegistrationSettingsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_registration_settings_by_host");
        let sql = format!(
            "SELECT {} FROM registration_settings WHERE entity_type_id = $1 AND entity_id = $2",
            SETTINGS_COLUMNS
        );
        let result = sqlx::query_as::<_, RegistrationSettingsEntity>(&sql)
            .bind(&host.entity_type_id)
            .bind(host.entity_id)
            .fetch_optional(&self.pool)
            .await;
        timer.record_result(&result);
        result
    }

    /// List saved settings with host columns, most recently changed first.
    pub async fn list(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RegistrationSettingsWithHostEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_registration_settings");
        let result = sqlx::query_as::<_, RegistrationSettingsWithHostEntity>(
            r#"
            SELECT
                s.settings_id, s.entity_type_id, s.entity_id, s.langcode, s.status, s.capacity,
                s.open_date, s.close_date, s.send_reminder, s.reminder_date, s.reminder_template,
                s.maximum_spaces, s.multiple_registrations, s.from_address, s.confirmation,
                s.confirmation_redirect, s.created_at, s.changed_at,
                h.bundle AS host_bundle,
                h.label AS host_label,
                h.owner_uid AS host_owner_uid,
                h.registration_type AS host_registration_type
            FROM registration_settings s
            JOIN host_entities h
              ON h.entity_type_id = s.entity_type_id AND h.entity_id = s.entity_id
            ORDER BY s.changed_at DESC, s.settings_id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record_result(&result);
        result
    }

    /// Insert or update the settings of a host.
    ///
    /// Fails without touching the database when a host key is missing.
    pub async fn upsert(
        &self,
        settings: &RegistrationSettings,
    ) -> Result<RegistrationSettingsEntity, PersistenceError> {
        settings.validate_for_save()?;
        debug!(
            entity_type_id = %settings.entity_type_id,
            entity_id = ?settings.entity_id,
            "Saving registration settings"
        );

        let timer = QueryTimer::new("upsert_registration_settings");
        let sql = format!(
            r#"
            INSERT INTO registration_settings
                (entity_type_id, entity_id, langcode, status, capacity, open_date, close_date,
                 send_reminder, reminder_date, reminder_template, maximum_spaces,
                 multiple_registrations, from_address, confirmation, confirmation_redirect)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ON CONFLICT (entity_type_id, entity_id) DO UPDATE SET
                langcode = EXCLUDED.langcode,
                status = EXCLUDED.status,
                capacity = EXCLUDED.capacity,
                open_date = EXCLUDED.open_date,
                close_date = EXCLUDED.close_date,
                send_reminder = EXCLUDED.send_reminder,
                reminder_date = EXCLUDED.reminder_date,
                reminder_template = EXCLUDED.reminder_template,
                maximum_spaces = EXCLUDED.maximum_spaces,
                multiple_registrations = EXCLUDED.multiple_registrations,
                from_address = EXCLUDED.from_address,
                confirmation = EXCLUDED.confirmation,
                confirmation_redirect = EXCLUDED.confirmation_redirect,
                changed_at = NOW()
            RETURNING {}
            "#,
            SETTINGS_COLUMNS
        );
        let result = sqlx::query_as::<_, RegistrationSettingsEntity>(&sql)
            .bind(&settings.entity_type_id)
            .bind(settings.entity_id)
            .bind(&settings.langcode)
            .bind(settings.status)
            .bind(to_db_int(settings.capacity))
            .bind(settings.open)
            .bind(settings.close)
            .bind(settings.send_reminder)
            .bind(settings.reminder_date)
            .bind(settings.reminder_template.as_deref())
            .bind(to_db_int(settings.maximum_spaces))
            .bind(settings.multiple_registrations)
            .bind(settings.from_address.as_deref())
            .bind(settings.confirmation.as_deref())
            .bind(settings.confirmation_redirect.as_deref())
            .fetch_one(&self.pool)
            .await;
        timer.record_result(&result);
        Ok(result?)
    }

    /// Settings with an open or close date, candidates for scheduled status changes.
    pub async fn list_scheduled(&self) -> Result<Vec<RegistrationSettingsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_scheduled_registration_settings");
        let sql = format!(
            "SELECT {} FROM registration_settings \
             WHERE open_date IS NOT NULL OR close_date IS NOT NULL \
             ORDER BY settings_id",
            SETTINGS_COLUMNS
        );
        let result = sqlx::query_as::<_, RegistrationSettingsEntity>(&sql)
            .fetch_all(&self.pool)
            .await;
        timer.record_result(&result);
        result
    }

    /// Set the status of one settings row. Returns whether a row was updated.
    pub async fn update_status(
        &self,
        settings_id: i64,
        status: bool,
        changed_at: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("update_registration_settings_status");
        let result = sqlx::query(
            r#"
            UPDATE registration_settings
            SET status = $2, changed_at = $3
            WHERE settings_id = $1
            "#,
        )
        .bind(settings_id)
        .bind(status)
        .bind(changed_at)
        .execute(&self.pool)
        .await;
        timer.record_result(&result);
        Ok(result?.rows_affected() > 0)
    }
}

fn to_db_int(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
