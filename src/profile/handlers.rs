use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::dto::SaveProfileRequest;
use super::repo::{self, Profile};
use super::services::{build_profile, complete_onboarding, ProfileError};
use crate::error::{internal, ApiResult};
use crate::extractors::CurrentUser;
use crate::state::AppState;

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).put(save_profile))
        .route("/profile/onboarding", post(onboarding))
}

fn rejected(e: ProfileError) -> (StatusCode, String) {
    warn!(error = %e, "profile rejected");
    (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<Profile> {
    let profile = repo::load(state.store.as_ref(), &user_id)
        .await
        .map_err(internal)?;
    Ok(Json(profile))
}

#[instrument(skip(state, payload))]
pub async fn save_profile(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<SaveProfileRequest>,
) -> ApiResult<Profile> {
    let current = repo::load(state.store.as_ref(), &user_id)
        .await
        .map_err(internal)?;
    let profile = build_profile(&user_id, &current, payload).map_err(rejected)?;
    repo::save(state.store.as_ref(), &profile)
        .await
        .map_err(internal)?;

    info!(user_id = %user_id, "profile saved");
    Ok(Json(profile))
}

#[instrument(skip(state, payload))]
pub async fn onboarding(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<SaveProfileRequest>,
) -> ApiResult<Profile> {
    let current = repo::load(state.store.as_ref(), &user_id)
        .await
        .map_err(internal)?;
    let profile = complete_onboarding(&user_id, &current, payload).map_err(rejected)?;
    repo::save(state.store.as_ref(), &profile)
        .await
        .map_err(internal)?;

    info!(
        user_id = %user_id,
        daily_calorie_target = ?profile.daily_calorie_target,
        "onboarding completed"
    );
    Ok(Json(profile))
}
