//! Host record domain models.
//!
//! A host is the content item registrations attach to, for example an event
//! node. Only a handful of entity types can host registrations and each one
//! is a variant of [`HostKind`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::error::DomainError;

/// Entity types that can host registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostKind {
    Node,
    CommerceProduct,
    TaxonomyTerm,
    User,
}

impl HostKind {
    pub const ALL: [HostKind; 4] = [
        HostKind::Node,
        HostKind::CommerceProduct,
        HostKind::TaxonomyTerm,
        HostKind::User,
    ];

    /// Machine name of the entity type, e.g. "node".
    pub fn entity_type_id(&self) -> &'static str {
        match self {
            HostKind::Node => "node",
            HostKind::CommerceProduct => "commerce_product",
            HostKind::TaxonomyTerm => "taxonomy_term",
            HostKind::User => "user",
        }
    }

    /// Whether records of this kind are split into bundles.
    pub fn has_bundles(&self) -> bool {
        !matches!(self, HostKind::User)
    }
}

impl std::fmt::Display for HostKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.entity_type_id())
    }
}

impl FromStr for HostKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HostKind::ALL
            .into_iter()
            .find(|kind| kind.entity_type_id() == s)
            .ok_or_else(|| DomainError::UnknownHostKind(s.to_string()))
    }
}

/// Reference to a host record: entity type plus id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HostRef {
    pub entity_type_id: String,
    pub entity_id: i64,
}

impl HostRef {
    pub fn new(entity_type_id: impl Into<String>, entity_id: i64) -> Self {
        Self {
            entity_type_id: entity_type_id.into(),
            entity_id,
        }
    }
}

impl std::fmt::Display for HostRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.entity_type_id, self.entity_id)
    }
}

/// The registration field attached to a host record.
///
/// `registration_type` is empty when the field exists but registration is
/// switched off for this record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RegistrationField {
    pub registration_type: Option<String>,
    /// Default values for new settings records, keyed by setting name.
    #[serde(default)]
    pub default_settings: Map<String, Value>,
}

/// A record able to host registrations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HostRecord {
    pub kind: HostKind,
    /// `None` until the record has been saved.
    pub id: Option<i64>,
    pub bundle: Option<String>,
    pub label: Option<String>,
    pub langcode: Option<String>,
    pub owner_uid: Option<i64>,
    pub registration_field: Option<RegistrationField>,
}

impl HostRecord {
    pub fn new(kind: HostKind, id: i64) -> Self {
        Self {
            kind,
            id: Some(id),
            bundle: None,
            label: None,
            langcode: None,
            owner_uid: None,
            registration_field: None,
        }
    }

    pub fn with_bundle(mut self, bundle: impl Into<String>) -> Self {
        self.bundle = Some(bundle.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_owner(mut self, uid: i64) -> Self {
        self.owner_uid = Some(uid);
        self
    }

    pub fn with_registration_field(mut self, field: RegistrationField) -> Self {
        self.registration_field = Some(field);
        self
    }

    pub fn entity_type_id(&self) -> &'static str {
        self.kind.entity_type_id()
    }

    /// The bundle, falling back to the entity type id for kinds without bundles.
    pub fn bundle(&self) -> &str {
        match (&self.bundle, self.kind.has_bundles()) {
            (Some(bundle), true) => bundle,
            _ => self.kind.entity_type_id(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Reference to this record. New records reference id 0.
    pub fn host_ref(&self) -> HostRef {
        HostRef::new(self.kind.entity_type_id(), self.id.unwrap_or(0))
    }

    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }

    /// The registration type bundle from the registration field, if set.
    pub fn registration_type_bundle(&self) -> Option<&str> {
        self.registration_field
            .as_ref()
            .and_then(|field| field.registration_type.as_deref())
            .filter(|bundle| !bundle.is_empty())
    }
}
