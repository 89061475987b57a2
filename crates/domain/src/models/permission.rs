//! Permission catalogue.
//!
//! Global permissions have fixed names. Per-type permissions embed the
//! registration type id, e.g. "administer conference registration".

use serde::{Deserialize, Serialize};

pub const ADMINISTER_REGISTRATION: &str = "administer registration";
pub const ACCESS_USER_PROFILES: &str = "access user profiles";
pub const VIEW_ADMIN_THEME: &str = "view the administration theme";
pub const ACCESS_CONTENT: &str = "access content";

/// Permission category for grouping related permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionCategory {
    Administration,
    Registrations,
    Content,
}

impl std::fmt::Display for PermissionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PermissionCategory::Administration => write!(f, "administration"),
            PermissionCategory::Registrations => write!(f, "registrations"),
            PermissionCategory::Content => write!(f, "content"),
        }
    }
}

/// A permission with full metadata including name, description, and category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Permission {
    /// The permission name (e.g., "administer registration")
    pub name: String,
    pub description: String,
    pub category: PermissionCategory,
}

pub fn administer_type(registration_type: &str) -> String {
    format!("administer {} registration", registration_type)
}

pub fn update_own(registration_type: &str) -> String {
    format!("update own {} registration", registration_type)
}

pub fn edit_state(registration_type: &str) -> String {
    format!("edit {} registration state", registration_type)
}

pub fn create_self(registration_type: &str) -> String {
    format!("create {} registration self", registration_type)
}

pub fn create_other_users(registration_type: &str) -> String {
    format!("create {} registration other users", registration_type)
}

pub fn create_other_anonymous(registration_type: &str) -> String {
    format!("create {} registration other anonymous", registration_type)
}

pub fn view_own(registration_type: &str) -> String {
    format!("view own {} registration", registration_type)
}

/// Content update permissions used by the default host access oracle.
pub fn edit_any_content(bundle: &str) -> String {
    format!("edit any {} content", bundle)
}

pub fn edit_own_content(bundle: &str) -> String {
    format!("edit own {} content", bundle)
}

/// Global permissions.
pub fn global_permissions() -> Vec<Permission> {
    vec![
        Permission {
            name: ADMINISTER_REGISTRATION.to_string(),
            description: "Manage registration settings and all registrations".to_string(),
            category: PermissionCategory::Administration,
        },
        Permission {
            name: ACCESS_USER_PROFILES.to_string(),
            description: "View user accounts referenced by registrations".to_string(),
            category: PermissionCategory::Administration,
        },
        Permission {
            name: VIEW_ADMIN_THEME.to_string(),
            description: "Use the administration theme on registration admin pages".to_string(),
            category: PermissionCategory::Administration,
        },
        Permission {
            name: ACCESS_CONTENT.to_string(),
            description: "View published content and site blocks".to_string(),
            category: PermissionCategory::Content,
        },
    ]
}

/// Permissions generated for one registration type.
pub fn type_permissions(registration_type: &str, label: &str) -> Vec<Permission> {
    let entry = |name: String, description: String| Permission {
        name,
        description,
        category: PermissionCategory::Registrations,
    };

    vec![
        entry(
            administer_type(registration_type),
            format!("{}: Administer settings and registrations", label),
        ),
        entry(
            update_own(registration_type),
            format!("{}: Manage registrations for own host entities", label),
        ),
        entry(
            edit_state(registration_type),
            format!("{}: Edit registration state", label),
        ),
        entry(
            create_self(registration_type),
            format!("{}: Register self", label),
        ),
        entry(
            create_other_users(registration_type),
            format!("{}: Register other accounts", label),
        ),
        entry(
            create_other_anonymous(registration_type),
            format!("{}: Register other people", label),
        ),
        entry(
            view_own(registration_type),
            format!("{}: View own registrations", label),
        ),
    ]
}

/// The full catalogue for the given `(id, label)` registration types.
pub fn get_all_permissions<'a, I>(registration_types: I) -> Vec<Permission>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut all = global_permissions();
    for (id, label) in registration_types {
        all.extend(type_permissions(id, label));
    }
    all
}
