//! User repository for database operations.

use sqlx::PgPool;

use crate::entities::UserEntity;
use crate::metrics::QueryTimer;

/// Repository for user accounts referenced by registrations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Find a user by uid.
    pub async fn find_by_uid(&self, uid: i64) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_uid");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT uid, name, mail, created_at
            FROM users
            WHERE uid = $1
            "#,
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await;
        timer.record_result(&result);
        result
    }

    /// Create a user.
    pub async fn create(&self, name: &str, mail: Option<&str>) -> Result<UserEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_user");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            INSERT INTO users (name, mail)
            VALUES ($1, $2)
            RETURNING uid, name, mail, created_at
            "#,
        )
        .bind(name)
        .bind(mail)
        .fetch_one(&self.pool)
        .await;
        timer.record_result(&result);
        result
    }
}
