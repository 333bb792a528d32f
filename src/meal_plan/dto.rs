use serde::{Deserialize, Serialize};
use time::Date;

use super::repo::MealPlanItem;
use crate::aggregation::DaySlots;
use crate::models::{Macros, MealType};

#[derive(Debug, Deserialize)]
pub struct StartQuery {
    #[serde(default)]
    pub start: Option<Date>,
}

#[derive(Debug, Serialize)]
pub struct PlanDay {
    #[serde(flatten)]
    pub slots: DaySlots<MealPlanItem>,
    pub planned: usize,
    pub totals: Macros,
}

#[derive(Debug, Serialize)]
pub struct WeekPlanResponse {
    pub week_start: Date,
    pub days: Vec<PlanDay>,
    pub items: Vec<MealPlanItem>,
    /// A generation for this user is in flight.
    pub generating: bool,
}

#[derive(Debug, Serialize)]
pub struct GeneratedPlanResponse {
    pub week_start: Date,
    pub replaced: usize,
    pub items: Vec<MealPlanItem>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMealPlanRequest {
    pub date: Date,
    pub meal_type: MealType,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub ingredients: Option<Vec<String>>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
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
