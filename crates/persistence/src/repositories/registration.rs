//! Registration repository for database operations.

use domain::models::{HostRef, Registration, RegistrationState};
use shared::pagination::Cursor;
use sqlx::PgPool;

use crate::entities::RegistrationEntity;
use crate::metrics::QueryTimer;

const REGISTRATION_COLUMNS: &str = "registration_id, registration_type, entity_type_id, entity_id, \
     count, user_uid, anon_mail, author_uid, state, langcode, created_at, changed_at, completed_at";

/// Repository for registrations.
#[derive(Clone)]
pub struct RegistrationRepository {
    pool: PgPool,
}

impl RegistrationRepository {
    /// Creates a new RegistrationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// All registrations of a host in any state, oldest first.
    pub async fn list_for_host(&self, host: &HostRef) -> Result<Vec<RegistrationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_registrations_for_host");
        let sql = format!(
            "SELECT {} FROM registrations \
             WHERE entity_type_id = $1 AND entity_id = $2 \
             ORDER BY created_at, registration_id",
            REGISTRATION_COLUMNS
        );
        let result = sqlx::query_as::<_, RegistrationEntity>(&sql)
            .bind(&host.entity_type_id)
            .bind(host.entity_id)
            .fetch_all(&self.pool)
            .await;
        timer.record_result(&result);
        result
    }

    /// Find a registration by id.
    pub async fn find_by_id(
        &self,
        registration_id: i64,
    ) -> Result<Option<RegistrationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_registration_by_id");
        let sql = format!(
            "SELECT {} FROM registrations WHERE registration_id = $1",
            REGISTRATION_COLUMNS
        );
        let result = sqlx::query_as::<_, RegistrationEntity>(&sql)
            .bind(registration_id)
            .fetch_optional(&self.pool)
            .await;
        timer.record_result(&result);
        result
    }

    /// Store a new registration.
    pub async fn insert(&self, registration: &Registration) -> Result<RegistrationEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_registration");
        let sql = format!(
            r#"
            INSERT INTO registrations
                (registration_type, entity_type_id, entity_id, count, user_uid, anon_mail,
                 author_uid, state, langcode, created_at, changed_at, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            REGISTRATION_COLUMNS
        );
        let result = sqlx::query_as::<_, RegistrationEntity>(&sql)
            .bind(&registration.registration_type)
            .bind(&registration.host.entity_type_id)
            .bind(registration.host.entity_id)
            .bind(to_db_count(registration.count))
            .bind(registration.registrant.user_uid())
            .bind(registration.registrant.anon_mail())
            .bind(registration.author_uid)
            .bind(registration.state.as_str())
            .bind(&registration.langcode)
            .bind(registration.created_at)
            .bind(registration.changed_at)
            .bind(registration.completed_at)
            .fetch_one(&self.pool)
            .await;
        timer.record_result(&result);
        result
    }

    /// Save changes to the mutable fields of an existing registration.
    pub async fn update(
        &self,
        registration_id: i64,
        registration: &Registration,
    ) -> Result<Option<RegistrationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_registration");
        let sql = format!(
            r#"
            UPDATE registrations
            SET count = $2, anon_mail = $3, state = $4, changed_at = $5, completed_at = $6
            WHERE registration_id = $1
            RETURNING {}
            "#,
            REGISTRATION_COLUMNS
        );
        let result = sqlx::query_as::<_, RegistrationEntity>(&sql)
            .bind(registration_id)
            .bind(to_db_count(registration.count))
            .bind(registration.registrant.anon_mail())
            .bind(registration.state.as_str())
            .bind(registration.changed_at)
            .bind(registration.completed_at)
            .fetch_optional(&self.pool)
            .await;
        timer.record_result(&result);
        result
    }

    /// Spaces reserved on a host by registrations in the given states.
    pub async fn sum_spaces(
        &self,
        host: &HostRef,
        states: &[RegistrationState],
    ) -> Result<i64, sqlx::Error> {
        let states: Vec<String> = states.iter().map(|s| s.as_str().to_string()).collect();

        let timer = QueryTimer::new("sum_registration_spaces");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(count), 0)::BIGINT
            FROM registrations
            WHERE entity_type_id = $1 AND entity_id = $2 AND state = ANY($3)
            "#,
        )
        .bind(&host.entity_type_id)
        .bind(host.entity_id)
        .bind(states)
        .fetch_one(&self.pool)
        .await;
        timer.record_result(&result);
        result
    }

    /// One page of a host's registrations, newest first.
    ///
    /// `cursor` is the last row of the previous page.
    pub async fn list_page(
        &self,
        host: &HostRef,
        state: Option<RegistrationState>,
        cursor: Option<Cursor>,
        limit: i64,
    ) -> Result<Vec<RegistrationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_registrations_page");
        let sql = format!(
            r#"
            SELECT {}
            FROM registrations
            WHERE entity_type_id = $1 AND entity_id = $2
              AND ($3::TEXT IS NULL OR state = $3)
              AND ($4::TIMESTAMPTZ IS NULL OR (created_at, registration_id) < ($4, $5))
            ORDER BY created_at DESC, registration_id DESC
            LIMIT $6
            "#,
            REGISTRATION_COLUMNS
        );
        let result = sqlx::query_as::<_, RegistrationEntity>(&sql)
            .bind(&host.entity_type_id)
            .bind(host.entity_id)
            .bind(state.map(|s| s.as_str()))
            .bind(cursor.map(|c| c.created_at))
            .bind(cursor.map(|c| c.id).unwrap_or_default())
            .bind(limit)
            .fetch_all(&self.pool)
            .await;
        timer.record_result(&result);
        result
    }
}

fn to_db_count(count: u32) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}
