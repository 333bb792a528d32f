use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use super::dto::HealthMetrics;
use super::health_metrics;
use crate::error::{internal, ApiResult};
use crate::extractors::CurrentUser;
use crate::profile::repo;
use crate::state::AppState;

pub fn metrics_routes() -> Router<AppState> {
    Router::new().route("/metrics", get(get_metrics))
}

#[instrument(skip(state))]
pub async fn get_metrics(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<HealthMetrics> {
    let profile = repo::load(state.store.as_ref(), &user_id)
        .await
        .map_err(internal)?;
    Ok(Json(health_metrics(&profile, state.config.calorie_floor_kcal)))
}
