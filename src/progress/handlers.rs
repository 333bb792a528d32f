use axum::{extract::State, routing::get, Json, Router};
use time::{Duration as DayDelta, OffsetDateTime};
use tracing::{debug, instrument};

use super::achievements;
use super::dto::{Dashboard, ProgressReport};
use crate::aggregation::{
    average_daily_calories, compute_streak, daily_series, insights, progress_percent, sum_macros,
    DEFAULT_STREAK_LOOKBACK, WEEK_DAYS,
};
use crate::error::{internal, ApiResult};
use crate::extractors::CurrentUser;
use crate::food_log::repo as food_log;
use crate::metrics::health_metrics;
use crate::profile::repo as profile;
use crate::state::AppState;
use crate::water::repo as water;

pub fn progress_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/progress", get(progress))
}

#[instrument(skip(state))]
pub async fn dashboard(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<Dashboard> {
    let store = state.store.as_ref();
    let today = OffsetDateTime::now_utc().date();

    let profile = profile::load(store, &user_id).await.map_err(internal)?;
    let entries = food_log::list_by_date(store, &user_id, today)
        .await
        .map_err(internal)?;
    let water_ml = water::total_ml(store, &user_id, today)
        .await
        .map_err(internal)?;

    let totals = sum_macros(&entries);
    let calorie_target = profile.daily_calorie_target;
    let water_target_ml = profile.daily_water_target_ml;

    debug!(user_id = %user_id, entries = entries.len(), calories = totals.calories, "dashboard built");
    Ok(Json(Dashboard {
        date: today,
        totals: totals.rounded(),
        water_ml: water_ml.round(),
        calorie_target,
        water_target_ml,
        calorie_progress: progress_percent(totals.calories, calorie_target),
        water_progress: progress_percent(water_ml, water_target_ml),
        metrics: health_metrics(&profile, state.config.calorie_floor_kcal),
        insights: insights(totals.calories, water_ml, calorie_target, water_target_ml),
        entries,
    }))
}

#[instrument(skip(state))]
pub async fn progress(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<ProgressReport> {
    let store = state.store.as_ref();
    let today = OffsetDateTime::now_utc().date();

    let profile = profile::load(store, &user_id).await.map_err(internal)?;
    let week = food_log::list_range(store, &user_id, today - DayDelta::days(WEEK_DAYS - 1), today)
        .await
        .map_err(internal)?;
    let total_entries = food_log::count_all(store, &user_id)
        .await
        .map_err(internal)?;
    let dates = food_log::logged_dates(store, &user_id)
        .await
        .map_err(internal)?;

    let avg = average_daily_calories(&week, today);
    let goal_progress = progress_percent(avg, profile.daily_calorie_target).round();
    let streak = compute_streak(dates, today, DEFAULT_STREAK_LOOKBACK);

    Ok(Json(ProgressReport {
        days: daily_series(&week, today, WEEK_DAYS),
        total_entries,
        avg_calories: avg.round(),
        goal_progress,
        streak,
        achievements: achievements(streak, total_entries, goal_progress),
    }))
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use time::{Duration, OffsetDateTime};
    use tower::ServiceExt;

    use crate::app::build_app;
    use crate::food_log::repo::{insert, sample_entry};
    use crate::models::MealType;
    use crate::state::AppState;

    async fn get_json(app: axum::Router, uri: &str) -> Value {
        let res = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn dashboard_for_default_profile() {
        let state = AppState::fake();
        let today = OffsetDateTime::now_utc().date();
        let user = state.config.default_user_id.clone();
        insert(state.store.as_ref(), &user, &sample_entry(today, MealType::Lunch, 900.0))
            .await
            .unwrap();

        let body = get_json(build_app(state), "/api/v1/dashboard").await;
        assert_eq!(body["totals"]["calories"], 900.0);
        assert_eq!(body["calorie_target"], 1800.0);
        assert_eq!(body["calorie_progress"], 50.0);
        assert_eq!(body["water_progress"], 0.0);
        assert_eq!(body["metrics"]["bmi"]["value"], 20.2);
        assert!(body["metrics"]["energy"].is_null());
        assert_eq!(body["insights"][0]["kind"], "within_calorie_goal");
        assert_eq!(body["entries"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn progress_counts_streak_and_average() {
        let state = AppState::fake();
        let today = OffsetDateTime::now_utc().date();
        let user = state.config.default_user_id.clone();
        for back in 0..3 {
            let day = today - Duration::days(back);
            insert(state.store.as_ref(), &user, &sample_entry(day, MealType::Dinner, 700.0))
                .await
                .unwrap();
        }
        insert(
            state.store.as_ref(),
            &user,
            &sample_entry(today - Duration::days(10), MealType::Dinner, 5000.0),
        )
        .await
        .unwrap();

        let body = get_json(build_app(state), "/api/v1/progress").await;
        assert_eq!(body["streak"], 3);
        assert_eq!(body["total_entries"], 4);
        assert_eq!(body["avg_calories"], 300.0);
        // 300 / 1800 rounds to 17%.
        assert_eq!(body["goal_progress"], 17.0);
        assert_eq!(body["days"].as_array().unwrap().len(), 7);
        assert_eq!(body["days"][6]["totals"]["calories"], 700.0);
        assert_eq!(body["achievements"][0], "just_getting_started");
    }
}
