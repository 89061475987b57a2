//! Host wrapper.
//!
//! [`HostEntity`] adapts a [`HostRecord`] plus a snapshot of its settings
//! and registrations to the registration queries: spaces reserved, room
//! remaining, duplicate registrants and eligibility. The snapshot is loaded
//! by the caller for one request and nothing here is cached beyond it.

use std::borrow::Cow;

use crate::models::{
    Account, HostRecord, HostRef, Registration, RegistrationSettings, RegistrationState,
    RegistrationType, RegistrationWorkflow, SettingKey, SettingValue,
};

use super::clock::Clock;
use super::eligibility::{self, Eligibility};

#[derive(Debug, Clone)]
pub struct HostEntity {
    record: HostRecord,
    registration_type: Option<RegistrationType>,
    settings: Option<RegistrationSettings>,
    registrations: Vec<Registration>,
}

impl HostEntity {
    /// Wraps a host record.
    ///
    /// `settings` is `None` when no settings record has been saved yet.
    /// `registrations` must be every registration attached to the host.
    pub fn new(
        record: HostRecord,
        registration_type: Option<RegistrationType>,
        settings: Option<RegistrationSettings>,
        registrations: Vec<Registration>,
    ) -> Self {
        Self {
            record,
            registration_type,
            settings,
            registrations,
        }
    }

    pub fn record(&self) -> &HostRecord {
        &self.record
    }

    pub fn bundle(&self) -> &str {
        self.record.bundle()
    }

    pub fn entity_type_id(&self) -> &'static str {
        self.record.entity_type_id()
    }

    pub fn id(&self) -> Option<i64> {
        self.record.id
    }

    pub fn is_new(&self) -> bool {
        self.record.is_new()
    }

    pub fn label(&self) -> &str {
        self.record.label()
    }

    pub fn host_ref(&self) -> HostRef {
        self.record.host_ref()
    }

    pub fn get_registration_type(&self) -> Option<&RegistrationType> {
        self.registration_type.as_ref()
    }

    pub fn get_registration_type_bundle(&self) -> Option<&str> {
        self.record.registration_type_bundle()
    }

    /// Whether the host has a registration type selected.
    pub fn is_configured_for_registration(&self) -> bool {
        self.registration_type.is_some()
    }

    /// The workflow of the registration type, or the stock workflow.
    pub fn workflow(&self) -> Cow<'_, RegistrationWorkflow> {
        match &self.registration_type {
            Some(registration_type) => Cow::Borrowed(&registration_type.workflow),
            None => Cow::Owned(RegistrationWorkflow::default_workflow()),
        }
    }

    pub fn get_default_settings(&self, langcode: Option<&str>) -> RegistrationSettings {
        RegistrationSettings::init_from_defaults(&self.record, langcode)
    }

    /// Saved settings, or unsaved defaults when none exist yet.
    pub fn get_settings(&self) -> Cow<'_, RegistrationSettings> {
        match &self.settings {
            Some(settings) => Cow::Borrowed(settings),
            None => Cow::Owned(self.get_default_settings(None)),
        }
    }

    pub fn get_setting(&self, key: SettingKey) -> Option<SettingValue> {
        self.get_settings().get_setting(key)
    }

    /// Number of registrations in any state.
    pub fn get_registration_count(&self) -> usize {
        self.registrations.len()
    }

    /// Registrations, optionally restricted to `states`.
    pub fn get_registration_list(&self, states: &[RegistrationState]) -> Vec<&Registration> {
        self.registrations
            .iter()
            .filter(|r| states.is_empty() || states.contains(&r.state))
            .collect()
    }

    fn counted_registrations<'a>(
        &'a self,
        workflow: &'a RegistrationWorkflow,
    ) -> impl Iterator<Item = &'a Registration> + 'a {
        self.registrations
            .iter()
            .filter(move |r| workflow.counts_toward_capacity(r.state))
    }

    /// Spaces reserved by active and held registrations, leaving out `exclude`.
    pub fn get_active_spaces_reserved(&self, exclude: Option<&Registration>) -> u64 {
        let workflow = self.workflow();
        self.counted_registrations(&workflow)
            .filter(|r| !exclude.is_some_and(|excluded| r.same_as(excluded)))
            .map(|r| u64::from(r.count))
            .sum()
    }

    pub fn has_room(&self, spaces: u32, exclude: Option<&Registration>) -> bool {
        eligibility::has_room(
            self.get_settings().capacity,
            self.get_active_spaces_reserved(exclude),
            spaces,
        )
    }

    /// Spaces still available, or `None` when capacity is unlimited.
    pub fn spaces_remaining(&self, exclude: Option<&Registration>) -> Option<u64> {
        match self.get_settings().capacity {
            0 => None,
            capacity => {
                Some(u64::from(capacity).saturating_sub(self.get_active_spaces_reserved(exclude)))
            }
        }
    }

    pub fn is_enabled_for_registration(
        &self,
        spaces: u32,
        exclude: Option<&Registration>,
        clock: &dyn Clock,
    ) -> Eligibility {
        eligibility::evaluate(
            &self.get_settings(),
            self.get_active_spaces_reserved(exclude),
            spaces,
            clock.now(),
        )
    }

    /// Whether an anonymous registration with this email occupies spaces.
    /// Emails compare case-insensitively.
    pub fn is_email_registered(&self, email: &str) -> bool {
        let email = email.trim();
        let workflow = self.workflow();
        self.registrations.iter().any(|r| {
            workflow.counts_toward_capacity(r.state)
                && r.registrant
                    .anon_mail()
                    .is_some_and(|registered| registered.eq_ignore_ascii_case(email))
        })
    }

    /// Whether the account holds a registration that occupies spaces.
    pub fn is_user_registered(&self, account: &Account) -> bool {
        self.is_uid_registered(account.uid)
    }

    pub fn is_uid_registered(&self, uid: i64) -> bool {
        let workflow = self.workflow();
        self.registrations.iter().any(|r| {
            workflow.counts_toward_capacity(r.state) && r.registrant.user_uid() == Some(uid)
        })
    }
}
