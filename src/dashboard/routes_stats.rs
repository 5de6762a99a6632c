//! XP record API.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;

use super::{ApiError, AppState};
use crate::db::{Stats, StatsUpdate};

pub(super) async fn handler_api_stats_get(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Stats>, ApiError> {
    let stats = state.db.get_stats().await?;
    Ok(Json(stats))
}

/// Accepts a JSON object with any subset of `healthXP`, `financeXP`, `deenXP`,
/// `intellectXP`. Values below zero are stored as zero.
pub(super) async fn handler_api_stats_update(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Json<Stats>, ApiError> {
    // Objects only: the derived deserializer would also accept a positional array
    let Json(fields) = payload?;
    let update: StatsUpdate = serde_json::from_value(Value::Object(fields))
        .map_err(|e| ApiError::BadRequest(format!("invalid request body: {}", e)))?;
    let stats = state.db.update_stats(&update).await?;
    state.prom_metrics.stats_updates.inc();
    info!(
        health_xp = stats.health_xp,
        finance_xp = stats.finance_xp,
        deen_xp = stats.deen_xp,
        intellect_xp = stats.intellect_xp,
        "stats updated"
    );
    Ok(Json(stats))
}
