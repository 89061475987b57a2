//! Registration entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{HostRef, Registrant, Registration};
use domain::DomainError;
use sqlx::FromRow;

/// Database row mapping for the registrations table.
#[derive(Debug, Clone, FromRow)]
pub struct RegistrationEntity {
    pub registration_id: i64,
    pub registration_type: String,
    pub entity_type_id: String,
    pub entity_id: i64,
    pub count: i32,
    pub user_uid: Option<i64>,
    pub anon_mail: Option<String>,
    pub author_uid: Option<i64>,
    pub state: String,
    pub langcode: String,
    pub created_at: DateTime<Utc>,
    pub changed_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<RegistrationEntity> for Registration {
    type Error = DomainError;

    fn try_from(entity: RegistrationEntity) -> Result<Self, Self::Error> {
        let count = u32::try_from(entity.count)
            .ok()
            .filter(|count| *count >= 1)
            .ok_or(DomainError::InvalidSpaces)?;

        Ok(Self {
            registration_id: Some(entity.registration_id),
            registration_type: entity.registration_type,
            host: HostRef::new(entity.entity_type_id, entity.entity_id),
            count,
            registrant: Registrant::from_parts(entity.user_uid, entity.anon_mail)?,
            author_uid: entity.author_uid,
            state: entity.state.parse()?,
            langcode: entity.langcode,
            created_at: entity.created_at,
            changed_at: entity.changed_at,
            completed_at: entity.completed_at,
        })
    }
}
