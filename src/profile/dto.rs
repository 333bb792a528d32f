use std::collections::BTreeSet;

use serde::Deserialize;

use crate::models::{ActivityLevel, Gender};

/// Full profile body for a wholesale save.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveProfileRequest {
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub goal_weight_kg: Option<f64>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub activity_level: ActivityLevel,
    #[serde(default)]
    pub daily_calorie_target: Option<f64>,
    #[serde(default)]
    pub daily_water_target_ml: Option<f64>,
    #[serde(default)]
    pub dietary_preferences: BTreeSet<String>,
    #[serde(default)]
    pub allergies: BTreeSet<String>,
    #[serde(default)]
    pub health_goals: BTreeSet<String>,
}
