//! User entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::UserRef;
use sqlx::FromRow;

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub uid: i64,
    pub name: String,
    pub mail: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<UserEntity> for UserRef {
    fn from(entity: UserEntity) -> Self {
        Self {
            uid: entity.uid,
            name: entity.name,
            mail: entity.mail,
        }
    }
}
