//! Site block endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::services::blocks::{HubActionsBlock, RenderedBlock};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Actor;
use crate::services::hosts::{load_host_entity, parse_host_path};

/// Hub actions heading for a host page.
///
/// GET /api/v1/hosts/:entity_type/:entity_id/blocks/hub-actions
pub async fn get_hub_actions_block(
    State(state): State<AppState>,
    actor: Actor,
    Path((entity_type, entity_id)): Path<(String, i64)>,
) -> Result<Json<RenderedBlock>, ApiError> {
    let host_ref = parse_host_path(&entity_type, entity_id)?;
    load_host_entity(&state, &host_ref).await?;

    let block = HubActionsBlock::default();
    if !block.access(actor.account()).is_allowed() {
        return Err(ApiError::Forbidden("Access denied".to_string()));
    }

    Ok(Json(block.build()))
}
