//! Registration settings endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use domain::models::permission::ADMINISTER_REGISTRATION;
use domain::models::settings::{
    ListRegistrationSettingsResponse, RegistrationSettingsListItem,
    UpdateRegistrationSettingsRequest,
};
use domain::models::{Account, RegistrationSettings};
use domain::services::access::{is_registration_admin, settings_access, settings_operations};
use persistence::repositories::RegistrationSettingsRepository;
use serde::Deserialize;
use shared::pagination::clamp_page_size;
use tracing::{info, warn};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Actor;
use crate::services::hosts::{load_host_entity, parse_host_path};

/// Where operations on listed settings return after saving.
const SETTINGS_LISTING_PATH: &str = "/api/v1/registration-settings";

/// Current settings of a host, or the defaults when none are saved.
///
/// GET /api/v1/hosts/:entity_type/:entity_id/registration-settings
pub async fn get_settings(
    State(state): State<AppState>,
    actor: Actor,
    Path((entity_type, entity_id)): Path<(String, i64)>,
) -> Result<Json<RegistrationSettings>, ApiError> {
    let host_ref = parse_host_path(&entity_type, entity_id)?;
    let host = load_host_entity(&state, &host_ref).await?;

    if !settings_access(actor.account(), host.record()).is_allowed() {
        return Err(ApiError::Forbidden(
            "You are not allowed to edit registration settings for this host".to_string(),
        ));
    }

    Ok(Json(host.get_settings().into_owned()))
}

/// Save the settings of a host.
///
/// PUT /api/v1/hosts/:entity_type/:entity_id/registration-settings
pub async fn update_settings(
    State(state): State<AppState>,
    actor: Actor,
    Path((entity_type, entity_id)): Path<(String, i64)>,
    Json(request): Json<UpdateRegistrationSettingsRequest>,
) -> Result<Json<RegistrationSettings>, ApiError> {
    request.validate()?;

    let host_ref = parse_host_path(&entity_type, entity_id)?;
    let host = load_host_entity(&state, &host_ref).await?;

    if !settings_access(actor.account(), host.record()).is_allowed() {
        return Err(ApiError::Forbidden(
            "You are not allowed to edit registration settings for this host".to_string(),
        ));
    }

    let mut settings = host.get_settings().into_owned();
    request.apply_to(&mut settings);

    let entity = RegistrationSettingsRepository::new(state.pool.clone())
        .upsert(&settings)
        .await?;
    let saved = RegistrationSettings::from(entity);

    info!(
        host = %host_ref,
        status = saved.status,
        capacity = saved.capacity,
        "Registration settings saved"
    );

    Ok(Json(saved))
}

#[derive(Debug, Deserialize)]
pub struct ListSettingsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Saved settings across hosts, with the operations the actor may use.
///
/// GET /api/v1/registration-settings
pub async fn list_settings(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<ListSettingsQuery>,
) -> Result<Json<ListRegistrationSettingsResponse>, ApiError> {
    let account = actor.account();
    if !can_list_settings(account, state.registration_types.keys().map(String::as_str)) {
        return Err(ApiError::Forbidden(
            "You are not allowed to list registration settings".to_string(),
        ));
    }

    let limit = clamp_page_size(query.limit);
    let offset = query.offset.unwrap_or(0).max(0);

    let rows = RegistrationSettingsRepository::new(state.pool.clone())
        .list(limit, offset)
        .await?;

    let mut data = Vec::with_capacity(rows.len());
    for row in rows {
        let host = match row.host_record() {
            Ok(host) => host,
            Err(e) => {
                warn!(
                    settings_id = row.settings.settings_id,
                    error = %e,
                    "Skipping settings row with an unusable host"
                );
                continue;
            }
        };
        let operations = settings_operations(account, &host, Some(SETTINGS_LISTING_PATH));
        data.push(RegistrationSettingsListItem {
            settings: RegistrationSettings::from(row.settings),
            host_label: host.label,
            operations,
        });
    }

    Ok(Json(ListRegistrationSettingsResponse { data }))
}

fn can_list_settings<'a>(
    account: &Account,
    mut registration_types: impl Iterator<Item = &'a str>,
) -> bool {
    account.has_permission(ADMINISTER_REGISTRATION)
        || registration_types.any(|id| is_registration_admin(account, id))
}
