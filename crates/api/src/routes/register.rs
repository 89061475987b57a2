//! Register page endpoints: eligibility verdict and form state.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use domain::services::registration_form::{build_form, registrant_options};
use domain::services::{FormContext, RegisterForm};
use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Actor;
use crate::services::hosts::{load_registration_host, parse_host_path};

#[derive(Debug, Deserialize, Validate)]
pub struct EligibilityQuery {
    /// Spaces to check for, default 1.
    #[validate(range(min = 1, max = 99999, message = "Spaces must be between 1 and 99999"))]
    pub spaces: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EligibilityResponse {
    pub allowed: bool,
    pub reasons: Vec<&'static str>,
    pub messages: Vec<String>,
    pub spaces_reserved: u64,
    /// `None` when capacity is unlimited.
    pub spaces_remaining: Option<u64>,
}

/// Whether registration is open for the requested number of spaces.
///
/// GET /api/v1/hosts/:entity_type/:entity_id/eligibility
pub async fn get_eligibility(
    State(state): State<AppState>,
    Path((entity_type, entity_id)): Path<(String, i64)>,
    Query(query): Query<EligibilityQuery>,
) -> Result<Json<EligibilityResponse>, ApiError> {
    query.validate()?;

    let host_ref = parse_host_path(&entity_type, entity_id)?;
    let host = load_registration_host(&state, &host_ref).await?;
    let spaces = query.spaces.unwrap_or(1);

    let eligibility = host.is_enabled_for_registration(spaces, None, state.clock.as_ref());
    if !eligibility.allowed() {
        debug!(
            host = %host_ref,
            spaces,
            reasons = ?eligibility.messages(),
            "Registration not available"
        );
    }

    Ok(Json(EligibilityResponse {
        allowed: eligibility.allowed(),
        reasons: eligibility.reasons.iter().map(|r| r.code()).collect(),
        messages: eligibility.user_messages(host.label()),
        spaces_reserved: host.get_active_spaces_reserved(None),
        spaces_remaining: host.spaces_remaining(None),
    }))
}

/// The register form as the acting account would see it.
///
/// GET /api/v1/hosts/:entity_type/:entity_id/register
pub async fn get_register_form(
    State(state): State<AppState>,
    actor: Actor,
    Path((entity_type, entity_id)): Path<(String, i64)>,
) -> Result<Json<RegisterForm>, ApiError> {
    let host_ref = parse_host_path(&entity_type, entity_id)?;
    let host = load_registration_host(&state, &host_ref).await?;

    let registration_type = host.get_registration_type_bundle().unwrap_or_default();
    if registrant_options(actor.account(), registration_type).is_empty() {
        return Err(ApiError::Forbidden(
            "You are not allowed to register for this host".to_string(),
        ));
    }

    let ctx = FormContext {
        host: &host,
        actor: actor.account(),
        registration: None,
        clock: state.clock.as_ref(),
    };

    Ok(Json(build_form(&ctx)))
}
