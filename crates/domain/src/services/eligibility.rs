//! Eligibility evaluation.
//!
//! Decides whether a host accepts a registration request. Every applicable
//! reason is collected; the evaluation never stops at the first failure and
//! never fails itself.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::RegistrationSettings;

/// Why a registration request is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    Disabled,
    NotOpen,
    Closed,
    InsufficientSpaces,
}

impl DenialReason {
    pub fn message(&self) -> &'static str {
        match self {
            DenialReason::Disabled => "registration is disabled",
            DenialReason::NotOpen => "registration has not opened yet",
            DenialReason::Closed => "registration has closed",
            DenialReason::InsufficientSpaces => "insufficient spaces remaining",
        }
    }

    /// Metric label.
    pub fn code(&self) -> &'static str {
        match self {
            DenialReason::Disabled => "disabled",
            DenialReason::NotOpen => "not_open",
            DenialReason::Closed => "closed",
            DenialReason::InsufficientSpaces => "insufficient_spaces",
        }
    }
}

impl std::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of an eligibility check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Eligibility {
    pub reasons: Vec<DenialReason>,
}

impl Eligibility {
    pub fn allowed(&self) -> bool {
        self.reasons.is_empty()
    }

    pub fn messages(&self) -> Vec<&'static str> {
        self.reasons.iter().map(DenialReason::message).collect()
    }

    /// One message per reason, as shown to a person registering for `label`.
    pub fn user_messages(&self, label: &str) -> Vec<String> {
        self.reasons
            .iter()
            .map(|reason| denial_message(label, *reason))
            .collect()
    }
}

pub fn denial_message(label: &str, reason: DenialReason) -> String {
    format!("Sorry, unable to register for {} due to: {}.", label, reason)
}

/// Whether `spaces` more fit next to `reserved`. Capacity 0 is unlimited.
pub fn has_room(capacity: u32, reserved: u64, spaces: u32) -> bool {
    capacity == 0 || reserved + u64::from(spaces) <= u64::from(capacity)
}

/// Evaluates a request for `spaces` against `settings` at `now`.
///
/// `reserved` is the number of spaces already held by registrations in
/// active or held states, minus any registration being edited.
pub fn evaluate(
    settings: &RegistrationSettings,
    reserved: u64,
    spaces: u32,
    now: DateTime<Utc>,
) -> Eligibility {
    let mut reasons = Vec::new();

    if !settings.status {
        reasons.push(DenialReason::Disabled);
    }
    if matches!(settings.open, Some(open) if now < open) {
        reasons.push(DenialReason::NotOpen);
    }
    if matches!(settings.close, Some(close) if now > close) {
        reasons.push(DenialReason::Closed);
    }
    if !has_room(settings.capacity, reserved, spaces) {
        reasons.push(DenialReason::InsufficientSpaces);
    }

    Eligibility { reasons }
}
