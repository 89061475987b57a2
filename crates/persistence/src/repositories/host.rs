//! Host record repository for database operations.

use domain::models::HostRecord;
use sqlx::PgPool;

use crate::entities::HostEntityRow;
use crate::metrics::QueryTimer;

const HOST_COLUMNS: &str = "entity_type_id, entity_id, bundle, label, langcode, owner_uid, \
                            registration_type, default_settings, created_at";

/// Repository for host records.
#[derive(Clone)]
pub struct HostRepository {
    pool: PgPool,
}

impl HostRepository {
    /// Creates a new HostRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Find a host record by entity type and id.
    pub async fn find(
        &self,
        entity_type_id: &str,
        entity_id: i64,
    ) -> Result<Option<HostEntityRow>, sqlx::Error> {
        let timer = QueryTimer::new("find_host");
        let sql = format!(
            "SELECT {} FROM host_entities WHERE entity_type_id = $1 AND entity_id = $2",
            HOST_COLUMNS
        );
        let result = sqlx::query_as::<_, HostEntityRow>(&sql)
            .bind(entity_type_id)
            .bind(entity_id)
            .fetch_optional(&self.pool)
            .await;
        timer.record_result(&result);
        result
    }

    /// Insert or update a host record. The record must carry an id.
    pub async fn upsert(&self, host: &HostRecord) -> Result<HostEntityRow, sqlx::Error> {
        let field = host.registration_field.as_ref();
        let registration_type = field.and_then(|f| f.registration_type.clone());
        let default_settings = field
            .map(|f| serde_json::Value::Object(f.default_settings.clone()))
            .unwrap_or_else(|| serde_json::json!({}));

        let timer = QueryTimer::new("upsert_host");
        let sql = format!(
            r#"
            INSERT INTO host_entities
                (entity_type_id, entity_id, bundle, label, langcode, owner_uid, registration_type, default_settings)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (entity_type_id, entity_id) DO UPDATE SET
                bundle = EXCLUDED.bundle,
                label = EXCLUDED.label,
                langcode = EXCLUDED.langcode,
                owner_uid = EXCLUDED.owner_uid,
                registration_type = EXCLUDED.registration_type,
                default_settings = EXCLUDED.default_settings
            RETURNING {}
            "#,
            HOST_COLUMNS
        );
        let result = sqlx::query_as::<_, HostEntityRow>(&sql)
            .bind(host.entity_type_id())
            .bind(host.id.unwrap_or_default())
            .bind(host.bundle.as_deref())
            .bind(host.label.as_deref())
            .bind(host.langcode.as_deref())
            .bind(host.owner_uid)
            .bind(registration_type)
            .bind(default_settings)
            .fetch_one(&self.pool)
            .await;
        timer.record_result(&result);
        result
    }
}
