//! Daily objectives API — today's list, create, toggle.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path as AxumPath, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::{ApiError, AppState};
use crate::db::Objective;

#[derive(Deserialize)]
pub(super) struct CreateObjectivePayload {
    text: String,
}

pub(super) async fn handler_api_objectives_list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Objective>>, ApiError> {
    let objectives = state.db.get_objectives().await?;
    Ok(Json(objectives))
}

pub(super) async fn handler_api_objectives_create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateObjectivePayload>, JsonRejection>,
) -> Result<Json<Objective>, ApiError> {
    let Json(payload) = payload?;
    if payload.text.trim().is_empty() {
        return Err(ApiError::BadRequest("text must not be empty".into()));
    }
    let objective = state.db.create_objective(&payload.text).await?;
    state.prom_metrics.objectives_created.inc();
    info!(id = objective.id, "objective created");
    Ok(Json(objective))
}

pub(super) async fn handler_api_objective_toggle(
    State(state): State<Arc<AppState>>,
    AxumPath(raw_id): AxumPath<String>,
) -> Result<Json<Objective>, ApiError> {
    let id: i32 = raw_id.parse().map_err(|_| {
        ApiError::BadRequest(format!(
            "invalid objective id '{}': expected an integer",
            raw_id
        ))
    })?;
    match state.db.toggle_objective(id).await? {
        Some(objective) => {
            state.prom_metrics.objectives_toggled.inc();
            info!(id, completed = objective.completed, "objective toggled");
            Ok(Json(objective))
        }
        None => Err(ApiError::NotFound(format!("objective {} not found", id))),
    }
}
