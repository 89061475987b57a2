//! Registration domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::host::HostRef;
use super::workflow::RegistrationState;
use crate::error::DomainError;

/// Who a registration is being made for, as chosen on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrantType {
    /// The acting account itself.
    Me,
    /// Another existing account.
    User,
    /// A person identified only by email.
    Anon,
}

impl RegistrantType {
    pub fn label(&self) -> &'static str {
        match self {
            RegistrantType::Me => "Myself",
            RegistrantType::User => "Other account",
            RegistrantType::Anon => "Other person",
        }
    }
}

impl std::fmt::Display for RegistrantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistrantType::Me => write!(f, "me"),
            RegistrantType::User => write!(f, "user"),
            RegistrantType::Anon => write!(f, "anon"),
        }
    }
}

/// The identity holding a registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Registrant {
    User { uid: i64 },
    Anonymous { email: String },
}

impl Registrant {
    pub fn user_uid(&self) -> Option<i64> {
        match self {
            Registrant::User { uid } => Some(*uid),
            Registrant::Anonymous { .. } => None,
        }
    }

    pub fn anon_mail(&self) -> Option<&str> {
        match self {
            Registrant::User { .. } => None,
            Registrant::Anonymous { email } => Some(email),
        }
    }

    /// Rebuilds a registrant from the stored column pair. Exactly one must be set.
    pub fn from_parts(user_uid: Option<i64>, anon_mail: Option<String>) -> Result<Self, DomainError> {
        match (user_uid, anon_mail) {
            (Some(uid), None) if uid > 0 => Ok(Registrant::User { uid }),
            (None, Some(email)) if !email.trim().is_empty() => Ok(Registrant::Anonymous { email }),
            _ => Err(DomainError::InvalidRegistrant),
        }
    }
}

/// One registrant's reservation of spaces on a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Registration {
    /// `None` until saved.
    pub registration_id: Option<i64>,
    pub registration_type: String,
    pub host: HostRef,
    /// Spaces reserved. Always at least 1.
    pub count: u32,
    pub registrant: Registrant,
    /// Account that created the registration.
    pub author_uid: Option<i64>,
    pub state: RegistrationState,
    pub langcode: String,
    pub created_at: DateTime<Utc>,
    pub changed_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Registration {
    pub fn new(
        registration_type: impl Into<String>,
        host: HostRef,
        count: u32,
        registrant: Registrant,
        state: RegistrationState,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if count < 1 {
            return Err(DomainError::InvalidSpaces);
        }
        if let Registrant::Anonymous { email } = &registrant {
            if email.trim().is_empty() {
                return Err(DomainError::InvalidRegistrant);
            }
        }

        Ok(Self {
            registration_id: None,
            registration_type: registration_type.into(),
            host,
            count,
            registrant,
            author_uid: None,
            state,
            langcode: super::settings::DEFAULT_LANGCODE.to_string(),
            created_at: now,
            changed_at: now,
            completed_at: (state == RegistrationState::Complete).then_some(now),
        })
    }

    pub fn is_new(&self) -> bool {
        self.registration_id.is_none()
    }

    /// Whether this is the same stored registration as `other`.
    pub fn same_as(&self, other: &Registration) -> bool {
        matches!((self.registration_id, other.registration_id), (Some(a), Some(b)) if a == b)
    }

    /// Moves to `state`, stamping completion the first time it completes.
    pub fn set_state(&mut self, state: RegistrationState, now: DateTime<Utc>) {
        if state == RegistrationState::Complete && self.completed_at.is_none() {
            self.completed_at = Some(now);
        }
        self.state = state;
        self.changed_at = now;
    }

    /// Email the registration is tied to: the anonymous address, else the
    /// supplied account mail.
    pub fn email<'a>(&'a self, account_mail: Option<&'a str>) -> Option<&'a str> {
        self.registrant.anon_mail().or(account_mail)
    }
}

/// Request to register for a host.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct RegisterRequest {
    pub who_is_registering: Option<RegistrantType>,

    #[validate(range(min = 1, message = "Invalid user id"))]
    pub user_uid: Option<i64>,

    #[validate(email(message = "Invalid email address"))]
    #[validate(length(max = 254, message = "Email must be at most 254 characters"))]
    pub anon_mail: Option<String>,

    #[validate(range(min = 1, max = 99999, message = "Spaces must be between 1 and 99999"))]
    #[serde(default = "default_count")]
    pub count: u32,

    pub state: Option<RegistrationState>,
}

fn default_count() -> u32 {
    1
}

/// Request to edit an existing registration.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateRegistrationRequest {
    #[validate(range(min = 1, max = 99999, message = "Spaces must be between 1 and 99999"))]
    pub count: Option<u32>,

    pub state: Option<RegistrationState>,

    #[validate(email(message = "Invalid email address"))]
    pub anon_mail: Option<String>,
}

/// Response after a registration is saved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SaveRegistrationResponse {
    pub registration: Registration,
    pub message: String,
    pub redirect: String,
}

/// Manage Registrations listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ManageRegistrationsResponse {
    pub caption: String,
    pub empty_text: String,
    pub show_find_filter: bool,
    pub spaces_reserved: u64,
    pub data: Vec<Registration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ManageRegistrationsQuery {
    pub cursor: Option<String>,
    pub limit: Option<i64>,
    pub state: Option<RegistrationState>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_new_rejects_zero_spaces() {
        let result = Registration::new(
            "conference",
            HostRef::new("node", 1),
            0,
            Registrant::User { uid: 2 },
            RegistrationState::Pending,
            now(),
        );
        assert_eq!(result, Err(DomainError::InvalidSpaces));
    }

    #[test]
    fn test_new_rejects_blank_email() {
        let result = Registration::new(
            "conference",
            HostRef::new("node", 1),
            1,
            Registrant::Anonymous {
                email: "  ".to_string(),
            },
            RegistrationState::Pending,
            now(),
        );
        assert_eq!(result, Err(DomainError::InvalidRegistrant));
    }

    #[test]
    fn test_registrant_from_parts() {
        assert_eq!(
            Registrant::from_parts(Some(4), None),
            Ok(Registrant::User { uid: 4 })
        );
        assert_eq!(
            Registrant::from_parts(None, Some("a@example.com".to_string())),
            Ok(Registrant::Anonymous {
                email: "a@example.com".to_string()
            })
        );
        assert!(Registrant::from_parts(Some(4), Some("a@example.com".to_string())).is_err());
        assert!(Registrant::from_parts(None, None).is_err());
    }

    #[test]
    fn test_set_state_stamps_completion_once() {
        let mut registration = Registration::new(
            "conference",
            HostRef::new("node", 1),
            2,
            Registrant::User { uid: 2 },
            RegistrationState::Pending,
            now(),
        )
        .unwrap();
        assert!(registration.completed_at.is_none());

        let later = now() + chrono::Duration::hours(1);
        registration.set_state(RegistrationState::Complete, later);
        assert_eq!(registration.completed_at, Some(later));

        registration.set_state(RegistrationState::Complete, later + chrono::Duration::hours(1));
        assert_eq!(registration.completed_at, Some(later));
    }

    #[test]
    fn test_register_request_defaults_and_validation() {
        let request: RegisterRequest =
            serde_json::from_str(r#"{"who_is_registering":"anon","anon_mail":"bad"}"#).unwrap();
        assert_eq!(request.count, 1);
        assert_eq!(request.who_is_registering, Some(RegistrantType::Anon));
        assert!(request.validate().unwrap_err().field_errors().contains_key("anon_mail"));
    }
}
