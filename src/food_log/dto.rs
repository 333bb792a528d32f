use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::Date;

use super::repo::FoodEntry;
use crate::models::{Macros, MealType};

/// Form body for logging food. Numeric fields stay optional so a rejected
/// submission can be echoed back as entered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogFoodRequest {
    #[serde(default)]
    pub date: Option<Date>,
    #[serde(default)]
    pub meal_type: MealType,
    #[serde(default)]
    pub food_name: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub calories: Option<f64>,
    #[serde(default)]
    pub protein_g: Option<f64>,
    #[serde(default)]
    pub carbs_g: Option<f64>,
    #[serde(default)]
    pub fat_g: Option<f64>,
    #[serde(default)]
    pub fiber_g: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct RejectedEntry {
    pub error: String,
    pub input: LogFoodRequest,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    #[serde(default)]
    pub date: Option<Date>,
}

#[derive(Debug, Serialize)]
pub struct DaySummary {
    pub date: Date,
    pub totals: Macros,
    pub entry_count: usize,
    pub by_meal_type: BTreeMap<MealType, Vec<FoodEntry>>,
}

#[derive(Debug, Deserialize)]
pub struct EstimateRequest {
    pub food_name: String,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}
