use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{DateQuery, DaySummary, EstimateRequest, LogFoodRequest, RejectedEntry};
use super::repo::{self, FoodEntry};
use super::services::{validate_entry, DEFAULT_QUANTITY, DEFAULT_UNIT};
use crate::aggregation::{group_by_meal_type, sum_macros};
use crate::error::{generation_failed, internal, not_found, ApiResult};
use crate::extractors::CurrentUser;
use crate::generation::NutritionEstimate;
use crate::state::AppState;

pub fn food_log_routes() -> Router<AppState> {
    Router::new()
        .route("/food-log", get(list_entries).post(log_food))
        .route("/food-log/summary", get(day_summary))
        .route("/food-log/estimate", post(estimate))
        .route("/food-log/:id", delete(delete_entry))
}

#[instrument(skip(state, payload))]
pub async fn log_food(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<LogFoodRequest>,
) -> Result<(StatusCode, Json<FoodEntry>), Response> {
    let today = OffsetDateTime::now_utc().date();
    let entry = match validate_entry(&payload, today) {
        Ok(e) => e,
        Err(e) => {
            warn!(user_id = %user_id, error = %e, "food entry rejected");
            let body = RejectedEntry {
                error: e.to_string(),
                input: payload,
            };
            return Err((StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response());
        }
    };

    repo::insert(state.store.as_ref(), &user_id, &entry)
        .await
        .map_err(|e| internal(e).into_response())?;

    info!(
        user_id = %user_id,
        entry_id = %entry.id,
        date = %entry.date,
        meal_type = entry.meal_type.as_str(),
        calories = entry.calories,
        "food logged"
    );
    Ok((StatusCode::CREATED, Json(entry)))
}

#[instrument(skip(state))]
pub async fn list_entries(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(q): Query<DateQuery>,
) -> ApiResult<Vec<FoodEntry>> {
    let date = q.date.unwrap_or_else(|| OffsetDateTime::now_utc().date());
    let entries = repo::list_by_date(state.store.as_ref(), &user_id, date)
        .await
        .map_err(internal)?;
    Ok(Json(entries))
}

#[instrument(skip(state))]
pub async fn day_summary(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(q): Query<DateQuery>,
) -> ApiResult<DaySummary> {
    let date = q.date.unwrap_or_else(|| OffsetDateTime::now_utc().date());
    let entries = repo::list_by_date(state.store.as_ref(), &user_id, date)
        .await
        .map_err(internal)?;

    Ok(Json(DaySummary {
        date,
        totals: sum_macros(&entries),
        entry_count: entries.len(),
        by_meal_type: group_by_meal_type(&entries),
    }))
}

#[instrument(skip(state))]
pub async fn delete_entry(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    match repo::delete(state.store.as_ref(), &user_id, id)
        .await
        .map_err(internal)?
    {
        Some(_) => {
            info!(user_id = %user_id, entry_id = %id, "food entry deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(not_found("Food entry")),
    }
}

#[instrument(skip(state, payload))]
pub async fn estimate(
    State(state): State<AppState>,
    CurrentUser(_user_id): CurrentUser,
    Json(payload): Json<EstimateRequest>,
) -> ApiResult<NutritionEstimate> {
    let name = payload.food_name.trim();
    if name.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "food_name is required".into()));
    }
    let quantity = payload
        .quantity
        .filter(|q| *q > 0.0)
        .unwrap_or(DEFAULT_QUANTITY);
    let unit = payload.unit.as_deref().unwrap_or(DEFAULT_UNIT);

    let fut = state.generator.estimate_nutrition(name, quantity, unit);
    let estimate = match tokio::time::timeout(state.config.generation.timeout(), fut).await {
        Ok(res) => res.map_err(generation_failed)?,
        Err(_) => {
            return Err(generation_failed(
                crate::generation::GenerationError::Timeout(state.config.generation.timeout()),
            ))
        }
    };
    Ok(Json(estimate))
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::app::build_app;
    use crate::state::AppState;

    async fn send(app: axum::Router, req: Request<Body>) -> (axum::http::StatusCode, Value) {
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        // Error bodies are plain text.
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn rejected_entry_echoes_input_and_stores_nothing() {
        let state = AppState::fake();
        let app = build_app(state.clone());

        let (status, body) = send(
            app.clone(),
            post(
                "/api/v1/food-log",
                json!({"food_name": "Toast", "protein_g": 4.0, "date": "2025-03-10"}),
            ),
        )
        .await;
        assert_eq!(status, axum::http::StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "calories are required");
        assert_eq!(body["input"]["food_name"], "Toast");
        assert_eq!(body["input"]["protein_g"], 4.0);

        let (_, list) = send(
            app,
            Request::get("/api/v1/food-log?date=2025-03-10")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(list, json!([]));
    }

    #[tokio::test]
    async fn log_summarize_and_delete() {
        let app = build_app(AppState::fake());

        let (status, created) = send(
            app.clone(),
            post(
                "/api/v1/food-log",
                json!({
                    "date": "2025-03-10", "meal_type": "lunch", "food_name": "Salad",
                    "calories": 300.0, "protein_g": 12.0, "carbs_g": 20.0, "fat_g": 9.0
                }),
            ),
        )
        .await;
        assert_eq!(status, axum::http::StatusCode::CREATED);
        let id = created["id"].as_str().unwrap().to_string();

        send(
            app.clone(),
            post(
                "/api/v1/food-log",
                json!({"date": "2025-03-10", "meal_type": "snack", "food_name": "Apple", "calories": 95.0}),
            ),
        )
        .await;

        let (status, summary) = send(
            app.clone(),
            Request::get("/api/v1/food-log/summary?date=2025-03-10")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, axum::http::StatusCode::OK);
        assert_eq!(summary["totals"]["calories"], 395.0);
        assert_eq!(summary["entry_count"], 2);
        assert_eq!(summary["by_meal_type"]["breakfast"], json!([]));
        assert_eq!(summary["by_meal_type"]["lunch"][0]["food_name"], "Salad");

        let del = Request::delete(format!("/api/v1/food-log/{}", id))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(app.clone(), del).await;
        assert_eq!(status, axum::http::StatusCode::NO_CONTENT);

        let del = Request::delete(format!("/api/v1/food-log/{}", id))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(app, del).await;
        assert_eq!(status, axum::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn entries_are_scoped_by_user_header() {
        let app = build_app(AppState::fake());
        let mut req = post(
            "/api/v1/food-log",
            json!({"date": "2025-03-10", "food_name": "Egg", "calories": 70.0}),
        );
        req.headers_mut()
            .insert("x-user-id", "alice".parse().unwrap());
        send(app.clone(), req).await;

        let (_, mine) = send(
            app.clone(),
            Request::get("/api/v1/food-log?date=2025-03-10")
                .header("x-user-id", "alice")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(mine.as_array().unwrap().len(), 1);

        let (_, default_user) = send(
            app,
            Request::get("/api/v1/food-log?date=2025-03-10")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(default_user, json!([]));
    }

    #[tokio::test]
    async fn estimate_uses_generator() {
        let app = build_app(AppState::fake());
        let (status, body) = send(
            app,
            post(
                "/api/v1/food-log/estimate",
                json!({"food_name": "rice", "quantity": 200.0, "unit": "grams"}),
            ),
        )
        .await;
        assert_eq!(status, axum::http::StatusCode::OK);
        assert_eq!(body["calories"], 300.0);
    }
}
