//! Actor accounts.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Uid of the anonymous account.
pub const ANONYMOUS_UID: i64 = 0;

/// The account performing an operation, with its effective permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Account {
    pub uid: i64,
    pub name: Option<String>,
    pub mail: Option<String>,
    pub permissions: HashSet<String>,
}

impl Account {
    pub fn anonymous<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            uid: ANONYMOUS_UID,
            name: None,
            mail: None,
            permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn authenticated<I, S>(uid: i64, name: impl Into<String>, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            uid,
            name: Some(name.into()),
            mail: None,
            permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_mail(mut self, mail: impl Into<String>) -> Self {
        self.mail = Some(mail.into());
        self
    }

    pub fn is_anonymous(&self) -> bool {
        self.uid == ANONYMOUS_UID
    }

    pub fn is_authenticated(&self) -> bool {
        !self.is_anonymous()
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    pub fn has_any_permission(&self, permissions: &[&str]) -> bool {
        permissions.iter().any(|p| self.has_permission(p))
    }

    pub fn display_name(&self) -> &str {
        match &self.name {
            Some(name) if !name.is_empty() => name,
            _ if self.is_anonymous() => "Anonymous",
            _ => "",
        }
    }
}

/// A user account as stored, referenced by registrations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UserRef {
    pub uid: i64,
    pub name: String,
    pub mail: Option<String>,
}
