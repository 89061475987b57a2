//! Access checks for registration operations.
//!
//! Host record update access is delegated to a [`HostAccess`] oracle so the
//! content rules of the surrounding site stay outside this crate.

use serde::Serialize;
use url::form_urlencoded::byte_serialize;

use crate::models::permission::{self, ACCESS_USER_PROFILES, ADMINISTER_REGISTRATION};
use crate::models::settings::SettingsOperation;
use crate::models::{Account, HostRecord, Registration};

use super::host_entity::HostEntity;
use super::routes::{route_name, RouteKind};

/// Result of an access check.
///
/// `Neutral` means no opinion; callers treat it as a denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessResult {
    Allowed,
    Neutral,
    Forbidden,
}

impl AccessResult {
    pub fn allowed_if(condition: bool) -> Self {
        if condition {
            AccessResult::Allowed
        } else {
            AccessResult::Neutral
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessResult::Allowed)
    }
}

/// Decides whether an account may update a host record.
pub trait HostAccess: Send + Sync {
    fn can_update(&self, account: &Account, host: &HostRecord) -> bool;
}

/// Content permission rules: `edit any B content`, or `edit own B content`
/// for the record's owner.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentPermissionAccess;

impl HostAccess for ContentPermissionAccess {
    fn can_update(&self, account: &Account, host: &HostRecord) -> bool {
        let bundle = host.bundle();
        if account.has_permission(&permission::edit_any_content(bundle)) {
            return true;
        }
        account.is_authenticated()
            && host.owner_uid == Some(account.uid)
            && account.has_permission(&permission::edit_own_content(bundle))
    }
}

/// Whether the account administers registrations of `registration_type`.
pub fn is_registration_admin(account: &Account, registration_type: &str) -> bool {
    account.has_permission(ADMINISTER_REGISTRATION)
        || account.has_permission(&permission::administer_type(registration_type))
}

/// Access to the Manage Registrations page of a host.
pub fn manage_registrations_access(
    account: &Account,
    host: &HostRecord,
    host_access: &dyn HostAccess,
) -> AccessResult {
    let Some(registration_type) = host.registration_type_bundle() else {
        return AccessResult::Neutral;
    };

    AccessResult::allowed_if(
        is_registration_admin(account, registration_type)
            || (account.has_permission(&permission::update_own(registration_type))
                && host_access.can_update(account, host)),
    )
}

/// Settings form access: administrators of the host's registration type.
pub fn settings_access(account: &Account, host: &HostRecord) -> AccessResult {
    match host.registration_type_bundle() {
        Some(registration_type) => {
            AccessResult::allowed_if(is_registration_admin(account, registration_type))
        }
        None => AccessResult::Neutral,
    }
}

/// Operations offered for a settings row.
///
/// `destination` is appended as the `destination` query so the settings form
/// returns to the listing after saving.
pub fn settings_operations(
    account: &Account,
    host: &HostRecord,
    destination: Option<&str>,
) -> Vec<SettingsOperation> {
    if !settings_access(account, host).is_allowed() {
        return Vec::new();
    }
    let Some(id) = host.id else {
        return Vec::new();
    };

    let entity_type_id = host.entity_type_id();
    let mut url = format!("/{}/{}/registrations/settings", entity_type_id, id);
    if let Some(destination) = destination {
        url.push_str("?destination=");
        url.extend(byte_serialize(destination.as_bytes()));
    }

    vec![SettingsOperation {
        title: "Edit settings".to_string(),
        route_name: route_name(entity_type_id, RouteKind::Settings),
        url,
        weight: 0,
    }]
}

/// Whether the account may view a registration.
pub fn can_view_registration(account: &Account, registration: &Registration) -> bool {
    if is_registration_admin(account, &registration.registration_type) {
        return true;
    }
    account.is_authenticated()
        && registration.registrant.user_uid() == Some(account.uid)
        && account.has_permission(&permission::view_own(&registration.registration_type))
}

/// Whether the account may edit an existing registration.
pub fn can_update_registration(
    account: &Account,
    registration: &Registration,
    host: &HostEntity,
    host_access: &dyn HostAccess,
) -> bool {
    is_registration_admin(account, &registration.registration_type)
        || (account.has_permission(&permission::update_own(&registration.registration_type))
            && (registration.registrant.user_uid() == Some(account.uid)
                || host_access.can_update(account, host.record())))
}

/// Whether the account may set the state field of `registration_type`.
pub fn can_edit_state(account: &Account, registration_type: &str) -> bool {
    account.has_permission(&permission::edit_state(registration_type))
}

pub fn can_access_user_profiles(account: &Account) -> bool {
    account.has_permission(ACCESS_USER_PROFILES)
}
