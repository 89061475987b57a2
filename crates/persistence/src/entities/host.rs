//! Host record entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{HostKind, HostRecord, RegistrationField};
use domain::DomainError;
use sqlx::FromRow;

/// Database row mapping for the host_entities table.
#[derive(Debug, Clone, FromRow)]
pub struct HostEntityRow {
    pub entity_type_id: String,
    pub entity_id: i64,
    pub bundle: Option<String>,
    pub label: Option<String>,
    pub langcode: Option<String>,
    pub owner_uid: Option<i64>,
    pub registration_type: Option<String>,
    pub default_settings: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<HostEntityRow> for HostRecord {
    type Error = DomainError;

    fn try_from(row: HostEntityRow) -> Result<Self, Self::Error> {
        let kind: HostKind = row.entity_type_id.parse()?;
        let default_settings = match row.default_settings {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };

        Ok(Self {
            kind,
            id: Some(row.entity_id),
            bundle: row.bundle,
            label: row.label,
            langcode: row.langcode,
            owner_uid: row.owner_uid,
            registration_field: Some(RegistrationField {
                registration_type: row.registration_type,
                default_settings,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(entity_type_id: &str) -> HostEntityRow {
        HostEntityRow {
            entity_type_id: entity_type_id.to_string(),
            entity_id: 8,
            bundle: Some("event".to_string()),
            label: Some("Meetup".to_string()),
            langcode: None,
            owner_uid: Some(2),
            registration_type: Some("conference".to_string()),
            default_settings: json!({"capacity": 30}),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_host_row_to_domain() {
        let host = HostRecord::try_from(row("node")).unwrap();

        assert_eq!(host.kind, HostKind::Node);
        assert_eq!(host.id, Some(8));
        assert_eq!(host.registration_type_bundle(), Some("conference"));
        let field = host.registration_field.unwrap();
        assert_eq!(field.default_settings["capacity"], json!(30));
    }

    #[test]
    fn test_unknown_entity_type_rejected() {
        assert_eq!(
            HostRecord::try_from(row("block_content")).unwrap_err(),
            DomainError::UnknownHostKind("block_content".to_string())
        );
    }

    #[test]
    fn test_non_object_defaults_ignored() {
        let mut row = row("node");
        row.default_settings = json!([1, 2]);
        let host = HostRecord::try_from(row).unwrap();
        assert!(host.registration_field.unwrap().default_settings.is_empty());
    }
}
