//! Per-host registration settings.
//!
//! Every host record has at most one settings record. Until an administrator
//! saves one, the settings are computed from the defaults carried by the
//! host's registration field.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use validator::Validate;

use super::host::{HostRecord, HostRef};
use crate::error::DomainError;

/// Upper bound for capacity and per-registration spaces.
pub const MAX_SPACES: u32 = 99_999;

/// Language used when neither the caller nor the host supplies one.
pub const DEFAULT_LANGCODE: &str = "en";

/// Closed set of setting names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingKey {
    Status,
    Capacity,
    Open,
    Close,
    SendReminder,
    ReminderDate,
    ReminderTemplate,
    MaximumSpaces,
    MultipleRegistrations,
    FromAddress,
    Confirmation,
    ConfirmationRedirect,
    EntityTypeId,
    EntityId,
    Langcode,
}

impl SettingKey {
    pub const ALL: [SettingKey; 15] = [
        SettingKey::Status,
        SettingKey::Capacity,
        SettingKey::Open,
        SettingKey::Close,
        SettingKey::SendReminder,
        SettingKey::ReminderDate,
        SettingKey::ReminderTemplate,
        SettingKey::MaximumSpaces,
        SettingKey::MultipleRegistrations,
        SettingKey::FromAddress,
        SettingKey::Confirmation,
        SettingKey::ConfirmationRedirect,
        SettingKey::EntityTypeId,
        SettingKey::EntityId,
        SettingKey::Langcode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::Status => "status",
            SettingKey::Capacity => "capacity",
            SettingKey::Open => "open",
            SettingKey::Close => "close",
            SettingKey::SendReminder => "send_reminder",
            SettingKey::ReminderDate => "reminder_date",
            SettingKey::ReminderTemplate => "reminder_template",
            SettingKey::MaximumSpaces => "maximum_spaces",
            SettingKey::MultipleRegistrations => "multiple_registrations",
            SettingKey::FromAddress => "from_address",
            SettingKey::Confirmation => "confirmation",
            SettingKey::ConfirmationRedirect => "confirmation_redirect",
            SettingKey::EntityTypeId => "entity_type_id",
            SettingKey::EntityId => "entity_id",
            SettingKey::Langcode => "langcode",
        }
    }
}

impl std::fmt::Display for SettingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| DomainError::UnknownSetting(s.to_string()))
    }
}

/// A typed setting value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Integer(i64),
    Date(DateTime<Utc>),
    Text(String),
}

impl SettingValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            SettingValue::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

/// Registration settings for one host record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RegistrationSettings {
    /// `None` until saved.
    #[serde(default)]
    pub settings_id: Option<i64>,
    pub entity_type_id: String,
    pub entity_id: Option<i64>,
    pub langcode: String,
    pub status: bool,
    /// Total spaces available. 0 means unlimited.
    pub capacity: u32,
    pub open: Option<DateTime<Utc>>,
    pub close: Option<DateTime<Utc>>,
    pub send_reminder: bool,
    pub reminder_date: Option<DateTime<Utc>>,
    pub reminder_template: Option<String>,
    /// Spaces one registration may reserve. 0 means unlimited.
    pub maximum_spaces: u32,
    pub multiple_registrations: bool,
    pub from_address: Option<String>,
    pub confirmation: Option<String>,
    pub confirmation_redirect: Option<String>,
    #[serde(default)]
    pub changed_at: Option<DateTime<Utc>>,
}

impl RegistrationSettings {
    /// Field defaults for the given host.
    pub fn new(host: &HostRef, langcode: impl Into<String>) -> Self {
        Self {
            settings_id: None,
            entity_type_id: host.entity_type_id.clone(),
            entity_id: Some(host.entity_id),
            langcode: langcode.into(),
            status: false,
            capacity: 0,
            open: None,
            close: None,
            send_reminder: false,
            reminder_date: None,
            reminder_template: None,
            maximum_spaces: 1,
            multiple_registrations: false,
            from_address: None,
            confirmation: None,
            confirmation_redirect: None,
            changed_at: None,
        }
    }

    /// Builds unsaved settings from the host's registration field defaults.
    ///
    /// Unknown keys are ignored. Keys absent from the default map keep their
    /// field default.
    pub fn init_from_defaults(host: &HostRecord, langcode: Option<&str>) -> Self {
        let langcode = langcode
            .or(host.langcode.as_deref())
            .unwrap_or(DEFAULT_LANGCODE);
        let mut settings = Self::new(&host.host_ref(), langcode);

        if let Some(field) = &host.registration_field {
            for (name, value) in &field.default_settings {
                match name.parse::<SettingKey>() {
                    Ok(key) => {
                        if !settings.apply_default(key, value) {
                            tracing::warn!(
                                setting = %key,
                                host = %host.host_ref(),
                                "Ignoring default setting with unexpected value type"
                            );
                        }
                    }
                    Err(err) => {
                        tracing::debug!(error = %err, "Ignoring unknown default setting");
                    }
                }
            }
        }

        settings
    }

    /// Applies one default value. Returns false on a type mismatch.
    fn apply_default(&mut self, key: SettingKey, value: &Value) -> bool {
        // Field defaults may be wrapped as {"value": ...}.
        let value = match value {
            Value::Object(map) if map.contains_key("value") => &map["value"],
            other => other,
        };

        match key {
            SettingKey::Status => set_bool(&mut self.status, value),
            SettingKey::SendReminder => set_bool(&mut self.send_reminder, value),
            SettingKey::MultipleRegistrations => set_bool(&mut self.multiple_registrations, value),
            SettingKey::Capacity => set_spaces(&mut self.capacity, value),
            SettingKey::MaximumSpaces => set_spaces(&mut self.maximum_spaces, value),
            SettingKey::Open => set_date(&mut self.open, value),
            SettingKey::Close => set_date(&mut self.close, value),
            SettingKey::ReminderDate => set_date(&mut self.reminder_date, value),
            SettingKey::ReminderTemplate => set_text(&mut self.reminder_template, value),
            SettingKey::FromAddress => set_text(&mut self.from_address, value),
            SettingKey::Confirmation => set_text(&mut self.confirmation, value),
            SettingKey::ConfirmationRedirect => set_text(&mut self.confirmation_redirect, value),
            // Host keys and language come from the host, never from defaults.
            SettingKey::EntityTypeId | SettingKey::EntityId | SettingKey::Langcode => true,
        }
    }

    pub fn host_ref(&self) -> Option<HostRef> {
        self.entity_id
            .map(|id| HostRef::new(self.entity_type_id.clone(), id))
    }

    pub fn is_new(&self) -> bool {
        self.settings_id.is_none()
    }

    /// Typed lookup. Unset optional settings yield `None`.
    pub fn get_setting(&self, key: SettingKey) -> Option<SettingValue> {
        match key {
            SettingKey::Status => Some(SettingValue::Bool(self.status)),
            SettingKey::Capacity => Some(SettingValue::Integer(self.capacity.into())),
            SettingKey::Open => self.open.map(SettingValue::Date),
            SettingKey::Close => self.close.map(SettingValue::Date),
            SettingKey::SendReminder => Some(SettingValue::Bool(self.send_reminder)),
            SettingKey::ReminderDate => self.reminder_date.map(SettingValue::Date),
            SettingKey::ReminderTemplate => self.reminder_template.clone().map(SettingValue::Text),
            SettingKey::MaximumSpaces => Some(SettingValue::Integer(self.maximum_spaces.into())),
            SettingKey::MultipleRegistrations => {
                Some(SettingValue::Bool(self.multiple_registrations))
            }
            SettingKey::FromAddress => self.from_address.clone().map(SettingValue::Text),
            SettingKey::Confirmation => self.confirmation.clone().map(SettingValue::Text),
            SettingKey::ConfirmationRedirect => {
                self.confirmation_redirect.clone().map(SettingValue::Text)
            }
            SettingKey::EntityTypeId => Some(SettingValue::Text(self.entity_type_id.clone()))
                .filter(|_| !self.entity_type_id.is_empty()),
            SettingKey::EntityId => self.entity_id.map(SettingValue::Integer),
            SettingKey::Langcode => Some(SettingValue::Text(self.langcode.clone())),
        }
    }

    /// Lookup by setting name. Unknown names yield `None`.
    pub fn get_setting_by_name(&self, name: &str) -> Option<SettingValue> {
        name.parse::<SettingKey>()
            .ok()
            .and_then(|key| self.get_setting(key))
    }

    /// Checks the host keys before the record is written.
    pub fn validate_for_save(&self) -> Result<(), DomainError> {
        if self.entity_type_id.is_empty() {
            return Err(DomainError::MissingHostField("entity_type_id"));
        }
        match self.entity_id {
            Some(id) if id > 0 => Ok(()),
            _ => Err(DomainError::MissingHostField("entity_id")),
        }
    }
}

fn set_bool(target: &mut bool, value: &Value) -> bool {
    match value {
        Value::Bool(b) => *target = *b,
        // Checkbox defaults are often stored as 0/1.
        Value::Number(n) if n.as_i64().is_some() => *target = n.as_i64() != Some(0),
        Value::Null => {}
        _ => return false,
    }
    true
}

fn set_spaces(target: &mut u32, value: &Value) -> bool {
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        Value::Null => return true,
        _ => None,
    };
    match parsed {
        Some(n) if n <= u64::from(MAX_SPACES) => {
            *target = n as u32;
            true
        }
        _ => false,
    }
}

fn set_date(target: &mut Option<DateTime<Utc>>, value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) if s.is_empty() => {
            *target = None;
            true
        }
        Value::String(s) => match parse_setting_date(s) {
            Some(date) => {
                *target = Some(date);
                true
            }
            None => false,
        },
        _ => false,
    }
}

fn set_text(target: &mut Option<String>, value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => {
            *target = Some(s.clone()).filter(|s| !s.is_empty());
            true
        }
        _ => false,
    }
}

/// Parses RFC 3339 or `YYYY-MM-DDTHH:MM:SS` (taken as UTC).
pub fn parse_setting_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|d| d.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Request to save the settings of a host. Replaces every editable field.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateRegistrationSettingsRequest {
    #[serde(default)]
    pub status: bool,

    #[validate(range(max = 99999, message = "Capacity must be between 0 and 99999"))]
    #[serde(default)]
    pub capacity: u32,

    pub open: Option<DateTime<Utc>>,
    pub close: Option<DateTime<Utc>>,

    #[serde(default)]
    pub send_reminder: bool,
    pub reminder_date: Option<DateTime<Utc>>,
    #[validate(length(max = 65535, message = "Reminder template is too long"))]
    pub reminder_template: Option<String>,

    #[validate(range(
        max = 99999,
        message = "Spaces allowed per registration must be between 0 and 99999"
    ))]
    #[serde(default = "default_maximum_spaces")]
    pub maximum_spaces: u32,

    #[serde(default)]
    pub multiple_registrations: bool,

    #[validate(email(message = "Invalid from address"))]
    #[validate(length(max = 255, message = "From address must be at most 255 characters"))]
    pub from_address: Option<String>,

    pub confirmation: Option<String>,

    #[validate(length(max = 2048, message = "Confirmation redirect is too long"))]
    pub confirmation_redirect: Option<String>,
}

fn default_maximum_spaces() -> u32 {
    1
}

impl UpdateRegistrationSettingsRequest {
    pub fn apply_to(self, settings: &mut RegistrationSettings) {
        settings.status = self.status;
        settings.capacity = self.capacity;
        settings.open = self.open;
        settings.close = self.close;
        settings.send_reminder = self.send_reminder;
        settings.reminder_date = self.reminder_date;
        settings.reminder_template = self.reminder_template.filter(|s| !s.is_empty());
        settings.maximum_spaces = self.maximum_spaces;
        settings.multiple_registrations = self.multiple_registrations;
        settings.from_address = self.from_address.filter(|s| !s.is_empty());
        settings.confirmation = self.confirmation.filter(|s| !s.is_empty());
        settings.confirmation_redirect = self.confirmation_redirect.filter(|s| !s.is_empty());
    }
}

/// A link offered next to a settings row in administrative listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SettingsOperation {
    pub title: String,
    pub route_name: String,
    pub url: String,
    pub weight: i32,
}

/// One row of the settings listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RegistrationSettingsListItem {
    #[serde(flatten)]
    pub settings: RegistrationSettings,
    pub host_label: Option<String>,
    pub operations: Vec<SettingsOperation>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListRegistrationSettingsResponse {
    pub data: Vec<RegistrationSettingsListItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::host::{HostKind, RegistrationField};
    use chrono::TimeZone;
    use serde_json::json;

    fn host_with_defaults(defaults: Value) -> HostRecord {
        let default_settings = match defaults {
            Value::Object(map) => map,
            _ => panic!("defaults must be an object"),
        };
        HostRecord::new(HostKind::Node, 7)
            .with_bundle("event")
            .with_registration_field(RegistrationField {
                registration_type: Some("conference".to_string()),
                default_settings,
            })
    }

    #[test]
    fn test_field_defaults() {
        let settings = RegistrationSettings::new(&HostRef::new("node", 1), "en");
        assert!(!settings.status);
        assert_eq!(settings.capacity, 0);
        assert_eq!(settings.maximum_spaces, 1);
        assert!(settings.is_new());
    }

    #[test]
    fn test_init_from_defaults() {
        let host = host_with_defaults(json!({
            "status": {"value": true},
            "capacity": 25,
            "maximum_spaces": "3",
            "open": "2024-05-01T09:00:00",
            "close": "2024-05-10T17:00:00+00:00",
            "confirmation": "See you there!",
            "colour": "green"
        }));

        let settings = RegistrationSettings::init_from_defaults(&host, Some("fr"));

        assert!(settings.status);
        assert_eq!(settings.capacity, 25);
        assert_eq!(settings.maximum_spaces, 3);
        assert_eq!(
            settings.open,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap())
        );
        assert_eq!(
            settings.close,
            Some(Utc.with_ymd_and_hms(2024, 5, 10, 17, 0, 0).unwrap())
        );
        assert_eq!(settings.confirmation.as_deref(), Some("See you there!"));
        assert_eq!(settings.langcode, "fr");
        assert_eq!(settings.entity_id, Some(7));
        assert!(!settings.multiple_registrations);
    }

    #[test]
    fn test_init_from_defaults_skips_mismatched_values() {
        let host = host_with_defaults(json!({
            "capacity": "lots",
            "status": "yes",
            "entity_id": 99
        }));

        let settings = RegistrationSettings::init_from_defaults(&host, None);

        assert_eq!(settings.capacity, 0);
        assert!(!settings.status);
        assert_eq!(settings.entity_id, Some(7));
        assert_eq!(settings.langcode, DEFAULT_LANGCODE);
    }

    #[test]
    fn test_get_setting() {
        let mut settings = RegistrationSettings::new(&HostRef::new("node", 3), "en");
        settings.capacity = 10;

        assert_eq!(
            settings.get_setting(SettingKey::Capacity),
            Some(SettingValue::Integer(10))
        );
        assert_eq!(settings.get_setting(SettingKey::Open), None);
        assert_eq!(settings.get_setting(SettingKey::FromAddress), None);
        assert_eq!(
            settings.get_setting_by_name("status"),
            Some(SettingValue::Bool(false))
        );
        assert_eq!(settings.get_setting_by_name("no_such_setting"), None);
    }

    #[test]
    fn test_setting_key_parse() {
        assert_eq!(
            "maximum_spaces".parse::<SettingKey>(),
            Ok(SettingKey::MaximumSpaces)
        );
        assert_eq!(
            "seats".parse::<SettingKey>(),
            Err(DomainError::UnknownSetting("seats".to_string()))
        );
        for key in SettingKey::ALL {
            assert_eq!(key.as_str().parse::<SettingKey>(), Ok(key));
        }
    }

    #[test]
    fn test_validate_for_save() {
        let mut settings = RegistrationSettings::new(&HostRef::new("node", 3), "en");
        assert!(settings.validate_for_save().is_ok());

        settings.entity_id = None;
        assert_eq!(
            settings.validate_for_save().unwrap_err().to_string(),
            "Required registration settings field \"entity_id\" is empty."
        );

        settings.entity_type_id = String::new();
        assert_eq!(
            settings.validate_for_save(),
            Err(DomainError::MissingHostField("entity_type_id"))
        );
    }

    #[test]
    fn test_update_request_validation() {
        let request: UpdateRegistrationSettingsRequest = serde_json::from_value(json!({
            "status": true,
            "capacity": 100000,
            "from_address": "not-an-email"
        }))
        .unwrap();

        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("capacity"));
        assert!(fields.contains_key("from_address"));
    }

    #[test]
    fn test_update_request_apply() {
        let request: UpdateRegistrationSettingsRequest = serde_json::from_value(json!({
            "status": true,
            "capacity": 40,
            "confirmation_redirect": ""
        }))
        .unwrap();
        assert!(request.validate().is_ok());

        let mut settings = RegistrationSettings::new(&HostRef::new("node", 3), "en");
        settings.confirmation_redirect = Some("/old".to_string());
        request.apply_to(&mut settings);

        assert!(settings.status);
        assert_eq!(settings.capacity, 40);
        assert_eq!(settings.maximum_spaces, 1);
        assert_eq!(settings.confirmation_redirect, None);
    }
}
