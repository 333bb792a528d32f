use serde::Serialize;
use time::Date;

use crate::aggregation::{DailyPoint, Insight};
use crate::food_log::repo::FoodEntry;
use crate::metrics::dto::HealthMetrics;
use crate::models::Macros;

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub date: Date,
    pub totals: Macros,
    pub water_ml: f64,
    pub calorie_target: Option<f64>,
    pub water_target_ml: Option<f64>,
    pub calorie_progress: f64,
    pub water_progress: f64,
    pub metrics: HealthMetrics,
    pub insights: Vec<Insight>,
    pub entries: Vec<FoodEntry>,
}

#[derive(Debug, Serialize)]
pub struct ProgressReport {
    pub days: Vec<DailyPoint>,
    pub total_entries: usize,
    pub avg_calories: f64,
    pub goal_progress: f64,
    pub streak: u32,
    pub achievements: Vec<Achievement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    WeekWarrior,
    DataDevotee,
    GoalGetter,
    JustGettingStarted,
}
