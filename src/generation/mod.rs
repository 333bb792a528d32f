//! Meal plan generation boundary.
//!
//! The rest of the service only depends on the [`WeeklyPlan`] shape. How the
//! content is produced (canned stub, templates, a remote model) is up to the
//! [`PlanGenerator`] implementation.

mod guard;
pub mod prompt;
mod stub;

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::MealType;

pub use guard::GenerationGuard;
pub use prompt::PlanRequest;
pub use stub::StubGenerator;

pub const DAYS_PER_PLAN: usize = 7;
pub const DEFAULT_PREP_TIME_MINUTES: u32 = 30;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("a generation is already running for this user")]
    Busy,
    #[error("generator failed: {0}")]
    Upstream(String),
    #[error("generator returned {days} days, expected 7")]
    WrongDayCount { days: usize },
    #[error("day {day} is malformed: {reason}")]
    MalformedDay { day: usize, reason: String },
    #[error("generator timed out after {0:?}")]
    Timeout(Duration),
}

/// One meal as a generator reports it. Everything except the meal type and
/// title may be omitted and is defaulted when stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedMeal {
    pub meal_type: MealType,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub ingredients: Option<Vec<String>>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default, alias = "prep_time")]
    pub prep_time_minutes: Option<u32>,
    #[serde(default)]
    pub estimated_calories: Option<f64>,
    #[serde(default)]
    pub estimated_protein: Option<f64>,
    #[serde(default)]
    pub estimated_carbs: Option<f64>,
    #[serde(default)]
    pub estimated_fat: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedDay {
    #[serde(default)]
    pub day: Option<String>,
    #[serde(default)]
    pub meals: Vec<GeneratedMeal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyPlan {
    pub weekly_plan: Vec<GeneratedDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionEstimate {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default)]
    pub fiber: Option<f64>,
}

#[async_trait]
pub trait PlanGenerator: Send + Sync {
    async fn generate_week(&self, req: &PlanRequest) -> Result<WeeklyPlan, GenerationError>;

    async fn estimate_nutrition(
        &self,
        food_name: &str,
        quantity: f64,
        unit: &str,
    ) -> Result<NutritionEstimate, GenerationError>;
}

/// A plan is usable only as a whole: seven days, each holding every meal
/// type exactly once.
pub fn validate_week(plan: &WeeklyPlan) -> Result<(), GenerationError> {
    if plan.weekly_plan.len() != DAYS_PER_PLAN {
        return Err(GenerationError::WrongDayCount {
            days: plan.weekly_plan.len(),
        });
    }

    for (day, entry) in plan.weekly_plan.iter().enumerate() {
        let seen: BTreeSet<MealType> = entry.meals.iter().map(|m| m.meal_type).collect();
        if entry.meals.len() != MealType::ALL.len() || seen.len() != MealType::ALL.len() {
            return Err(GenerationError::MalformedDay {
                day,
                reason: format!(
                    "expected one each of breakfast, lunch, dinner, snack; got {} meals",
                    entry.meals.len()
                ),
            });
        }
        if let Some(m) = entry.meals.iter().find(|m| m.title.trim().is_empty()) {
            return Err(GenerationError::MalformedDay {
                day,
                reason: format!("{} has no title", m.meal_type.as_str()),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meal(meal_type: MealType) -> GeneratedMeal {
        GeneratedMeal {
            meal_type,
            title: format!("{} dish", meal_type.as_str()),
            description: None,
            ingredients: None,
            instructions: None,
            prep_time_minutes: None,
            estimated_calories: None,
            estimated_protein: None,
            estimated_carbs: None,
            estimated_fat: None,
        }
    }

    fn full_day() -> GeneratedDay {
        GeneratedDay {
            day: None,
            meals: MealType::ALL.iter().map(|m| meal(*m)).collect(),
        }
    }

    #[test]
    fn full_week_is_valid() {
        let plan = WeeklyPlan {
            weekly_plan: vec![full_day(); 7],
        };
        assert!(validate_week(&plan).is_ok());
    }

    #[test]
    fn short_week_is_rejected() {
        let plan = WeeklyPlan {
            weekly_plan: vec![full_day(); 6],
        };
        assert!(matches!(
            validate_week(&plan),
            Err(GenerationError::WrongDayCount { days: 6 })
        ));
    }

    #[test]
    fn duplicated_meal_type_is_rejected() {
        let mut days = vec![full_day(); 7];
        days[3].meals[3] = meal(MealType::Lunch);
        let err = validate_week(&WeeklyPlan { weekly_plan: days }).unwrap_err();
        assert!(matches!(err, GenerationError::MalformedDay { day: 3, .. }));
    }

    #[test]
    fn schema_shaped_json_parses_with_defaults() {
        let raw = r#"{"weekly_plan":[{"day":"Sunday","meals":[
            {"meal_type":"breakfast","title":"Oats","prep_time":5}
        ]}]}"#;
        let plan: WeeklyPlan = serde_json::from_str(raw).unwrap();
        let m = &plan.weekly_plan[0].meals[0];
        assert_eq!(m.prep_time_minutes, Some(5));
        assert!(m.ingredients.is_none());
    }
}
