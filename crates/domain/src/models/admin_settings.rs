//! Global registration administration settings.

use serde::{Deserialize, Serialize};

/// Site-wide registration settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RegistrationAdminSettings {
    /// Recompute the status of every host from its open and close dates.
    pub set_and_forget: bool,
    /// Registration count at which listings show the find filter.
    pub hide_filter: u32,
    /// Recipient count above which notifications are queued instead of sent.
    pub queue_notifications: u32,
}

impl Default for RegistrationAdminSettings {
    fn default() -> Self {
        Self {
            set_and_forget: true,
            hide_filter: 10,
            queue_notifications: 50,
        }
    }
}

impl RegistrationAdminSettings {
    pub fn show_find_filter(&self, registration_count: u64) -> bool {
        registration_count >= u64::from(self.hide_filter)
    }

    pub fn should_queue_notifications(&self, recipient_count: u64) -> bool {
        recipient_count > u64::from(self.queue_notifications)
    }
}
