//! Manage Registrations listing helpers.

use super::host_entity::HostEntity;

/// Caption above the listing, summarising how full the host is.
pub fn caption(host: &HostEntity) -> String {
    let label = host.label();
    let capacity = host.get_settings().capacity;
    let spaces = host.get_active_spaces_reserved(None);

    match (capacity, spaces) {
        (1, spaces) => format!(
            "List of registrations for {}. {} of 1 space is filled.",
            label, spaces
        ),
        (0, 1) => format!("List of registrations for {}. 1 space is filled.", label),
        (0, spaces) => format!(
            "List of registrations for {}. {} spaces are filled.",
            label, spaces
        ),
        (capacity, spaces) => format!(
            "List of registrations for {}. {} of {} spaces are filled.",
            label, spaces, capacity
        ),
    }
}

pub fn empty_text(host: &HostEntity) -> String {
    format!("There are no registrants for {}", host.label())
}

/// Default for the listing's host entity type argument.
pub fn host_entity_type_argument(host: Option<&HostEntity>) -> Option<&'static str> {
    host.map(HostEntity::entity_type_id)
}
