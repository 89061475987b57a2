//! Registration settings entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{HostKind, HostRecord, RegistrationField, RegistrationSettings};
use domain::DomainError;
use sqlx::FromRow;

/// Database row mapping for the registration_settings table.
#[derive(Debug, Clone, FromRow)]
pub struct RegistrationSettingsEntity {
    pub settings_id: i64,
    pub entity_type_id: String,
    pub entity_id: i64,
    pub langcode: String,
    pub status: bool,
    pub capacity: i32,
    pub open_date: Option<DateTime<Utc>>,
    pub close_date: Option<DateTime<Utc>>,
    pub send_reminder: bool,
    pub reminder_date: Option<DateTime<Utc>>,
    pub reminder_template: Option<String>,
    pub maximum_spaces: i32,
    pub multiple_registrations: bool,
    pub from_address: Option<String>,
    pub confirmation: Option<String>,
    pub confirmation_redirect: Option<String>,
    pub created_at: DateTime<Utc>,
    pub changed_at: DateTime<Utc>,
}

impl From<RegistrationSettingsEntity> for RegistrationSettings {
    fn from(entity: RegistrationSettingsEntity) -> Self {
        Self {
            settings_id: Some(entity.settings_id),
            entity_type_id: entity.entity_type_id,
            entity_id: Some(entity.entity_id),
            langcode: entity.langcode,
            status: entity.status,
            // Non-negative by table constraint.
            capacity: u32::try_from(entity.capacity).unwrap_or(0),
            open: entity.open_date,
            close: entity.close_date,
            send_reminder: entity.send_reminder,
            reminder_date: entity.reminder_date,
            reminder_template: entity.reminder_template,
            maximum_spaces: u32::try_from(entity.maximum_spaces).unwrap_or(0),
            multiple_registrations: entity.multiple_registrations,
            from_address: entity.from_address,
            confirmation: entity.confirmation,
            confirmation_redirect: entity.confirmation_redirect,
            changed_at: Some(entity.changed_at),
        }
    }
}

/// Settings row joined with the columns of its host needed by listings.
#[derive(Debug, Clone, FromRow)]
pub struct RegistrationSettingsWithHostEntity {
    #[sqlx(flatten)]
    pub settings: RegistrationSettingsEntity,
    pub host_bundle: Option<String>,
    pub host_label: Option<String>,
    pub host_owner_uid: Option<i64>,
    pub host_registration_type: Option<String>,
}

impl RegistrationSettingsWithHostEntity {
    /// Host record rebuilt from the joined columns. Default settings are not loaded.
    pub fn host_record(&self) -> Result<HostRecord, DomainError> {
        let kind: HostKind = self.settings.entity_type_id.parse()?;
        Ok(HostRecord {
            kind,
            id: Some(self.settings.entity_id),
            bundle: self.host_bundle.clone(),
            label: self.host_label.clone(),
            langcode: Some(self.settings.langcode.clone()),
            owner_uid: self.host_owner_uid,
            registration_field: Some(RegistrationField {
                registration_type: self.host_registration_type.clone(),
                default_settings: serde_json::Map::new(),
            }),
        })
    }
}
