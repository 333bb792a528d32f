use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::{Duration as DayDelta, OffsetDateTime};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{
    CreateMealPlanRequest, GeneratedPlanResponse, PlanDay, StartQuery, WeekPlanResponse,
};
use super::repo::{self, MealPlanItem};
use super::services::{build_item, generate_week_plan, PlanError};
use crate::aggregation::{build_week_skeleton, overlay_plan, start_of_week, sum_macros, WEEK_DAYS};
use crate::error::{generation_failed, internal, not_found, ApiResult};
use crate::extractors::CurrentUser;
use crate::state::AppState;

pub fn meal_plan_routes() -> Router<AppState> {
    Router::new()
        .route("/meal-plans", post(create_item))
        .route("/meal-plans/week", get(week_plan))
        .route("/meal-plans/generate", post(generate))
        .route("/meal-plans/:id", get(get_item).delete(delete_item))
}

#[instrument(skip(state))]
pub async fn week_plan(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(q): Query<StartQuery>,
) -> ApiResult<WeekPlanResponse> {
    let week_start = start_of_week(q.start.unwrap_or_else(|| OffsetDateTime::now_utc().date()));
    let week_end = week_start + DayDelta::days(WEEK_DAYS - 1);

    let items = repo::list_range(state.store.as_ref(), &user_id, week_start, week_end)
        .await
        .map_err(internal)?;

    let mut week = build_week_skeleton::<MealPlanItem>(week_start);
    overlay_plan(&mut week, &items);
    let days = week
        .into_iter()
        .map(|slots| {
            let day_items: Vec<MealPlanItem> =
                items.iter().filter(|i| i.date == slots.date).cloned().collect();
            PlanDay {
                planned: slots.filled(),
                totals: sum_macros(&day_items),
                slots,
            }
        })
        .collect();

    Ok(Json(WeekPlanResponse {
        week_start,
        days,
        items,
        generating: state.generation.is_running(&user_id),
    }))
}

#[instrument(skip(state))]
pub async fn get_item(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<MealPlanItem> {
    repo::get(state.store.as_ref(), &user_id, id)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or_else(|| not_found("Meal plan item"))
}

#[instrument(skip(state, payload))]
pub async fn create_item(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<CreateMealPlanRequest>,
) -> Result<(StatusCode, Json<MealPlanItem>), (StatusCode, String)> {
    let item = build_item(payload).map_err(|e| {
        warn!(user_id = %user_id, error = %e, "meal plan item rejected");
        (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
    })?;

    let evicted = repo::upsert_slot(state.store.as_ref(), &user_id, &item)
        .await
        .map_err(internal)?;

    info!(
        user_id = %user_id,
        item_id = %item.id,
        date = %item.date,
        meal_type = item.meal_type.as_str(),
        replaced = evicted.is_some(),
        "meal plan item saved"
    );
    Ok((StatusCode::CREATED, Json(item)))
}

#[instrument(skip(state))]
pub async fn delete_item(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    match repo::delete(state.store.as_ref(), &user_id, id)
        .await
        .map_err(internal)?
    {
        Some(_) => {
            info!(user_id = %user_id, item_id = %id, "meal plan item deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(not_found("Meal plan item")),
    }
}

#[instrument(skip(state))]
pub async fn generate(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(q): Query<StartQuery>,
) -> Result<(StatusCode, Json<GeneratedPlanResponse>), (StatusCode, String)> {
    let start = q.start.unwrap_or_else(|| OffsetDateTime::now_utc().date());
    let week = generate_week_plan(&state, &user_id, start)
        .await
        .map_err(|e| match e {
            PlanError::Generation(g) => generation_failed(g),
            PlanError::Storage(s) => internal(s),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(GeneratedPlanResponse {
            week_start: week.week_start,
            replaced: week.replaced,
            items: week.items,
        }),
    ))
}
