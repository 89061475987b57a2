//! Manage Registrations listing.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use domain::models::registration::{ManageRegistrationsQuery, ManageRegistrationsResponse};
use domain::models::Registration;
use domain::services::access::manage_registrations_access;
use domain::services::manage::{caption, empty_text, host_entity_type_argument};
use persistence::repositories::RegistrationRepository;
use shared::pagination::{clamp_page_size, Cursor};
use tracing::debug;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Actor;
use crate::services::hosts::{load_host_entity, parse_host_path};

/// List the registrations of a host, newest first.
///
/// GET /api/v1/hosts/:entity_type/:entity_id/registrations
pub async fn list_registrations(
    State(state): State<AppState>,
    actor: Actor,
    Path((entity_type, entity_id)): Path<(String, i64)>,
    Query(query): Query<ManageRegistrationsQuery>,
) -> Result<Json<ManageRegistrationsResponse>, ApiError> {
    let host_ref = parse_host_path(&entity_type, entity_id)?;
    let host = load_host_entity(&state, &host_ref).await?;

    if !manage_registrations_access(actor.account(), host.record(), state.host_access.as_ref())
        .is_allowed()
    {
        return Err(ApiError::Forbidden(
            "You are not allowed to manage registrations for this host".to_string(),
        ));
    }

    let cursor = query.cursor.as_deref().map(Cursor::decode).transpose()?;
    let limit = clamp_page_size(query.limit);

    let repo = RegistrationRepository::new(state.pool.clone());
    let mut rows = repo
        .list_page(&host_ref, query.state, cursor, limit + 1)
        .await?;
    let has_more = rows.len() as i64 > limit;
    rows.truncate(limit as usize);

    let data = rows
        .into_iter()
        .map(Registration::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    let next_cursor = if has_more {
        data.last().and_then(|last| {
            last.registration_id
                .map(|id| Cursor::new(last.created_at, id).encode())
        })
    } else {
        None
    };

    debug!(
        host = %host_ref,
        entity_type = ?host_entity_type_argument(Some(&host)),
        returned = data.len(),
        "Listing registrations"
    );

    let counted_states = host.workflow().active_or_held_states();
    let spaces_reserved = repo.sum_spaces(&host_ref, &counted_states).await?;

    let admin_settings = state.config.registration.admin_settings();
    Ok(Json(ManageRegistrationsResponse {
        caption: caption(&host),
        empty_text: empty_text(&host),
        show_find_filter: admin_settings.show_find_filter(host.get_registration_count() as u64),
        spaces_reserved: u64::try_from(spaces_reserved).unwrap_or(0),
        data,
        next_cursor,
    }))
}
