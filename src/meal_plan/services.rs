use thiserror::Error;
use time::{Date, Duration as DayDelta, OffsetDateTime};
use tracing::{info, warn};
use uuid::Uuid;

use super::dto::CreateMealPlanRequest;
use super::repo::{self, MealPlanItem};
use crate::aggregation::start_of_week;
use crate::generation::{
    validate_week, GeneratedMeal, GenerationError, PlanRequest, WeeklyPlan,
    DEFAULT_PREP_TIME_MINUTES,
};
use crate::profile;
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

#[derive(Debug, Error, PartialEq)]
pub enum ItemError {
    #[error("title is required")]
    MissingTitle,
    #[error("{field} cannot be negative")]
    Negative { field: &'static str },
}

/// Outcome of a successful generation.
#[derive(Debug)]
pub struct GeneratedWeek {
    pub week_start: Date,
    pub replaced: usize,
    pub items: Vec<MealPlanItem>,
}

fn item_from_generated(meal: GeneratedMeal, date: Date, now: OffsetDateTime) -> MealPlanItem {
    MealPlanItem {
        id: Uuid::new_v4(),
        date,
        meal_type: meal.meal_type,
        title: meal.title.trim().to_string(),
        description: meal.description.unwrap_or_default(),
        ingredients: meal.ingredients.unwrap_or_default(),
        instructions: meal.instructions.unwrap_or_default(),
        prep_time_minutes: meal.prep_time_minutes.unwrap_or(DEFAULT_PREP_TIME_MINUTES),
        estimated_calories: meal.estimated_calories.unwrap_or(0.0),
        estimated_protein: meal.estimated_protein.unwrap_or(0.0),
        estimated_carbs: meal.estimated_carbs.unwrap_or(0.0),
        estimated_fat: meal.estimated_fat.unwrap_or(0.0),
        ai_generated: true,
        created_at: now,
    }
}

/// Day `i` of the plan lands on `week_start + i`.
fn plan_to_items(plan: WeeklyPlan, week_start: Date) -> Vec<MealPlanItem> {
    let now = OffsetDateTime::now_utc();
    plan.weekly_plan
        .into_iter()
        .enumerate()
        .flat_map(|(i, day)| {
            let date = week_start + DayDelta::days(i as i64);
            day.meals
                .into_iter()
                .map(move |m| item_from_generated(m, date, now))
        })
        .collect()
}

/// Generates a week for `user_id` and swaps it in for every stored item.
///
/// At most one generation runs per user. Stored items are replaced only
/// after the whole week validated; any failure leaves them as they were.
pub async fn generate_week_plan(
    state: &AppState,
    user_id: &str,
    start: Date,
) -> Result<GeneratedWeek, PlanError> {
    let Some(_permit) = state.generation.try_acquire(user_id) else {
        return Err(GenerationError::Busy.into());
    };

    let week_start = start_of_week(start);
    let store = state.store.as_ref();
    let profile = profile::repo::load(store, user_id).await?;
    let request = PlanRequest::from_profile(&profile);

    let limit = state.config.generation.timeout();
    let plan = match tokio::time::timeout(limit, state.generator.generate_week(&request)).await {
        Ok(res) => res?,
        Err(_) => return Err(GenerationError::Timeout(limit).into()),
    };
    validate_week(&plan)?;

    let items = plan_to_items(plan, week_start);
    let replaced = repo::replace_all(store, user_id, &items).await?;

    info!(
        user_id = %user_id,
        week_start = %week_start,
        items = items.len(),
        replaced,
        "meal plan generated"
    );
    Ok(GeneratedWeek {
        week_start,
        replaced,
        items,
    })
}

fn non_negative(field: &'static str, v: Option<f64>) -> Result<f64, ItemError> {
    match v {
        Some(x) if x.is_nan() || x < 0.0 => Err(ItemError::Negative { field }),
        Some(x) => Ok(x),
        None => Ok(0.0),
    }
}

/// Builds a hand-made plan item. It takes over its slot when stored.
pub fn build_item(req: CreateMealPlanRequest) -> Result<MealPlanItem, ItemError> {
    let title = req.title.trim();
    if title.is_empty() {
        warn!("meal plan item without title");
        return Err(ItemError::MissingTitle);
    }
    Ok(MealPlanItem {
        id: Uuid::new_v4(),
        date: req.date,
        meal_type: req.meal_type,
        title: title.to_string(),
        description: req.description.unwrap_or_default(),
        ingredients: req.ingredients.unwrap_or_default(),
        instructions: req.instructions.unwrap_or_default(),
        prep_time_minutes: req.prep_time_minutes.unwrap_or(DEFAULT_PREP_TIME_MINUTES),
        estimated_calories: non_negative("estimated_calories", req.estimated_calories)?,
        estimated_protein: non_negative("estimated_protein", req.estimated_protein)?,
        estimated_carbs: non_negative("estimated_carbs", req.estimated_carbs)?,
        estimated_fat: non_negative("estimated_fat", req.estimated_fat)?,
        ai_generated: false,
        created_at: OffsetDateTime::now_utc(),
    })
}
