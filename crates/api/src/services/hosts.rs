//! Loading host snapshots for request handlers.

use domain::models::{HostKind, HostRecord, HostRef, Registration, RegistrationSettings};
use domain::services::HostEntity;
use persistence::repositories::{
    HostRepository, RegistrationRepository, RegistrationSettingsRepository,
};
use tracing::warn;

use crate::app::AppState;
use crate::error::ApiError;

/// Parses the host path segments, rejecting unknown entity types as not found.
pub fn parse_host_path(entity_type: &str, entity_id: i64) -> Result<HostRef, ApiError> {
    let kind: HostKind = entity_type.parse()?;
    if entity_id <= 0 {
        return Err(ApiError::NotFound(format!("{} {} not found", kind, entity_id)));
    }
    Ok(HostRef::new(kind.entity_type_id(), entity_id))
}

/// Loads a host with its registration type, saved settings and every registration.
pub async fn load_host_entity(state: &AppState, host: &HostRef) -> Result<HostEntity, ApiError> {
    let row = HostRepository::new(state.pool.clone())
        .find(&host.entity_type_id, host.entity_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Host {} not found", host)))?;
    let record = HostRecord::try_from(row)?;

    let registration_type = match record.registration_type_bundle() {
        Some(bundle) => {
            let found = state.registration_type(bundle).cloned();
            if found.is_none() {
                warn!(host = %host, bundle, "Host references an unknown registration type");
            }
            found
        }
        None => None,
    };

    let settings = RegistrationSettingsRepository::new(state.pool.clone())
        .find_by_host(host)
        .await?
        .map(RegistrationSettings::from);

    let registrations = RegistrationRepository::new(state.pool.clone())
        .list_for_host(host)
        .await?
        .into_iter()
        .map(Registration::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ApiError::Internal(format!("Malformed registration for {}: {}", host, e)))?;

    Ok(HostEntity::new(record, registration_type, settings, registrations))
}

/// Loads a host and requires it to be registration enabled.
pub async fn load_registration_host(
    state: &AppState,
    host: &HostRef,
) -> Result<HostEntity, ApiError> {
    let entity = load_host_entity(state, host).await?;
    if !entity.is_configured_for_registration() {
        return Err(ApiError::NotFound(format!(
            "{} is not enabled for registration",
            host
        )));
    }
    Ok(entity)
}
