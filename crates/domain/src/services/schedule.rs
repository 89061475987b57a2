//! Set-and-forget status computation.
//!
//! When set-and-forget is enabled site-wide, the status of each settings
//! record follows its open and close dates.

use chrono::{DateTime, Utc};

use crate::models::RegistrationSettings;

/// The status the settings should have at `now`, or `None` when neither
/// date is set and the status is left to the administrator.
pub fn scheduled_status(settings: &RegistrationSettings, now: DateTime<Utc>) -> Option<bool> {
    if settings.open.is_none() && settings.close.is_none() {
        return None;
    }

    let opened = settings.open.map_or(true, |open| now >= open);
    let not_closed = settings.close.map_or(true, |close| now <= close);
    Some(opened && not_closed)
}

/// The new status when it differs from the current one.
pub fn status_change(settings: &RegistrationSettings, now: DateTime<Utc>) -> Option<bool> {
    scheduled_status(settings, now).filter(|status| *status != settings.status)
}
