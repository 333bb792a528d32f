use serde::Serialize;

use super::formulas::{BmiCategory, CalorieGoals};

#[derive(Debug, Clone, Serialize)]
pub struct BmiReport {
    pub value: f64,
    pub category: BmiCategory,
    pub label: &'static str,
    pub scale_position: f64,
    pub tip: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnergyReport {
    pub bmr: f64,
    pub tdee: f64,
    pub activity_label: &'static str,
    pub goals: CalorieGoals,
}

/// Derived metrics for a profile. Sections are `None` when their inputs are
/// missing from the profile.
#[derive(Debug, Clone, Serialize)]
pub struct HealthMetrics {
    pub bmi: Option<BmiReport>,
    pub energy: Option<EnergyReport>,
}
