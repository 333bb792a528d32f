use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use tracing::{info, instrument};
use uuid::Uuid;

use super::repo::{self, WaterEntry};
use crate::error::{internal, ApiResult};
use crate::extractors::CurrentUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LogWaterRequest {
    #[serde(default)]
    pub date: Option<Date>,
    pub amount_ml: f64,
}

#[derive(Debug, Deserialize)]
pub struct WaterQuery {
    #[serde(default)]
    pub date: Option<Date>,
}

#[derive(Debug, Serialize)]
pub struct WaterDay {
    pub date: Date,
    pub total_ml: f64,
    pub entries: Vec<WaterEntry>,
}

pub fn water_routes() -> Router<AppState> {
    Router::new().route("/water", get(list_water).post(log_water))
}

#[instrument(skip(state))]
pub async fn log_water(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<LogWaterRequest>,
) -> Result<(StatusCode, Json<WaterEntry>), (StatusCode, String)> {
    if payload.amount_ml.is_nan() || payload.amount_ml <= 0.0 {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "amount_ml must be positive".into(),
        ));
    }

    let entry = WaterEntry {
        id: Uuid::new_v4(),
        date: payload
            .date
            .unwrap_or_else(|| OffsetDateTime::now_utc().date()),
        amount_ml: payload.amount_ml,
        created_at: OffsetDateTime::now_utc(),
    };
    repo::insert(state.store.as_ref(), &user_id, &entry)
        .await
        .map_err(internal)?;

    info!(user_id = %user_id, date = %entry.date, amount_ml = entry.amount_ml, "water logged");
    Ok((StatusCode::CREATED, Json(entry)))
}

#[instrument(skip(state))]
pub async fn list_water(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(q): Query<WaterQuery>,
) -> ApiResult<WaterDay> {
    let date = q.date.unwrap_or_else(|| OffsetDateTime::now_utc().date());
    let entries = repo::list_by_date(state.store.as_ref(), &user_id, date)
        .await
        .map_err(internal)?;
    Ok(Json(WaterDay {
        date,
        total_ml: entries.iter().map(|e| e.amount_ml).sum(),
        entries,
    }))
}
