//! Registration create and edit endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::registration::{
    RegisterRequest, SaveRegistrationResponse, UpdateRegistrationRequest,
};
use domain::models::{Account, Registrant, Registration, UserRef};
use domain::services::access::can_update_registration;
use domain::services::registration_form::{
    prepare_registration, registrant_options, registration_log_message, save_outcome, validate,
};
use domain::services::{FormContext, FormSubmission, HostEntity};
use persistence::repositories::{RegistrationRepository, UserRepository};
use tracing::{debug, info};
use validator::Validate;

use crate::app::AppState;
use crate::error::{ApiError, ValidationDetail};
use crate::extractors::Actor;
use crate::middleware::metrics::{record_registration_created, record_registration_denied};
use crate::services::hosts::{load_registration_host, parse_host_path};

/// Register for a host.
///
/// POST /api/v1/hosts/:entity_type/:entity_id/registrations
pub async fn create_registration(
    State(state): State<AppState>,
    actor: Actor,
    Path((entity_type, entity_id)): Path<(String, i64)>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SaveRegistrationResponse>), ApiError> {
    request.validate()?;

    let host_ref = parse_host_path(&entity_type, entity_id)?;
    let host = load_registration_host(&state, &host_ref).await?;
    let account = actor.account();

    let registration_type = host.get_registration_type_bundle().unwrap_or_default();
    if registrant_options(account, registration_type).is_empty() {
        return Err(ApiError::Forbidden(
            "You are not allowed to register for this host".to_string(),
        ));
    }

    let submission = FormSubmission {
        who_is_registering: request.who_is_registering,
        spaces: request.count,
        anon_mail: request.anon_mail.map(|mail| mail.trim().to_string()),
        user_uid: request.user_uid,
        state: request.state,
    };
    let selected_user = load_user(&state, submission.user_uid).await?;

    let ctx = FormContext {
        host: &host,
        actor: account,
        registration: None,
        clock: state.clock.as_ref(),
    };

    let errors = validate(&ctx, &submission, selected_user.as_ref());
    if !errors.is_empty() {
        let eligibility =
            host.is_enabled_for_registration(submission.spaces, None, state.clock.as_ref());
        for reason in &eligibility.reasons {
            record_registration_denied(reason.code());
        }
        debug!(host = %host_ref, errors = errors.len(), "Registration refused");
        return Err(ApiError::Unprocessable(
            errors.into_iter().map(ValidationDetail::from).collect(),
        ));
    }

    let registration = prepare_registration(&ctx, &submission, state.clock.now())?;
    let entity = RegistrationRepository::new(state.pool.clone())
        .insert(&registration)
        .await?;
    let saved = Registration::try_from(entity)?;

    log_saved(&host, account, selected_user.as_ref(), &saved);
    record_registration_created(&saved.registration_type);

    let outcome = save_outcome(&host, account, &saved);
    Ok((
        StatusCode::CREATED,
        Json(SaveRegistrationResponse {
            registration: saved,
            message: outcome.message,
            redirect: outcome.redirect.url(),
        }),
    ))
}

/// Edit the spaces, state or email of a registration.
///
/// PUT /api/v1/registrations/:registration_id
pub async fn update_registration(
    State(state): State<AppState>,
    actor: Actor,
    Path(registration_id): Path<i64>,
    Json(request): Json<UpdateRegistrationRequest>,
) -> Result<Json<SaveRegistrationResponse>, ApiError> {
    request.validate()?;

    let repo = RegistrationRepository::new(state.pool.clone());
    let existing = repo
        .find_by_id(registration_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Registration {} not found", registration_id)))?;
    let existing = Registration::try_from(existing)?;

    let host = load_registration_host(&state, &existing.host).await?;
    let account = actor.account();
    if !can_update_registration(account, &existing, &host, state.host_access.as_ref()) {
        return Err(ApiError::Forbidden(
            "You are not allowed to edit this registration".to_string(),
        ));
    }

    let submission = FormSubmission {
        who_is_registering: None,
        spaces: request.count.unwrap_or(existing.count),
        anon_mail: request.anon_mail.map(|mail| mail.trim().to_string()),
        user_uid: None,
        state: request.state,
    };
    let selected_user = load_user(&state, existing.registrant.user_uid()).await?;

    let ctx = FormContext {
        host: &host,
        actor: account,
        registration: Some(&existing),
        clock: state.clock.as_ref(),
    };

    let errors = validate(&ctx, &submission, selected_user.as_ref());
    if !errors.is_empty() {
        return Err(ApiError::Unprocessable(
            errors.into_iter().map(ValidationDetail::from).collect(),
        ));
    }

    let registration = prepare_registration(&ctx, &submission, state.clock.now())?;
    let entity = repo
        .update(registration_id, &registration)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Registration {} not found", registration_id)))?;
    let saved = Registration::try_from(entity)?;

    info!(
        registration_id,
        host = %saved.host,
        spaces = saved.count,
        state = %saved.state,
        "Registration updated"
    );

    let outcome = save_outcome(&host, account, &saved);
    Ok(Json(SaveRegistrationResponse {
        registration: saved,
        message: outcome.message,
        redirect: outcome.redirect.url(),
    }))
}

async fn load_user(state: &AppState, uid: Option<i64>) -> Result<Option<UserRef>, ApiError> {
    let Some(uid) = uid else {
        return Ok(None);
    };
    let user = UserRepository::new(state.pool.clone())
        .find_by_uid(uid)
        .await?
        .map(UserRef::from);
    Ok(user)
}

fn log_saved(
    host: &HostEntity,
    actor: &Account,
    selected_user: Option<&UserRef>,
    registration: &Registration,
) {
    let name = match registration.registrant {
        Registrant::User { uid } if uid == actor.uid => actor.name.as_deref(),
        Registrant::User { .. } => selected_user.map(|u| u.name.as_str()),
        Registrant::Anonymous { .. } => None,
    };
    let message = registration_log_message(
        name,
        registration.registrant.anon_mail(),
        host.label(),
        registration.registration_id.unwrap_or_default(),
    );

    info!(
        host = %registration.host,
        registration_id = ?registration.registration_id,
        spaces = registration.count,
        "{}",
        message
    );
}
