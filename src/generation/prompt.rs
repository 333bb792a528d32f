use std::collections::BTreeSet;

use serde::Serialize;

use crate::metrics::formulas::FALLBACK_CALORIE_TARGET;
use crate::profile::repo::Profile;

/// Inputs a generator sees. Built from the profile, never from raw request
/// bodies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanRequest {
    pub dietary_preferences: BTreeSet<String>,
    pub allergies: BTreeSet<String>,
    pub health_goals: BTreeSet<String>,
    pub daily_calorie_target: f64,
}

impl PlanRequest {
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            dietary_preferences: profile.dietary_preferences.clone(),
            allergies: profile.allergies.clone(),
            health_goals: profile.health_goals.clone(),
            daily_calorie_target: profile
                .daily_calorie_target
                .filter(|t| *t > 0.0)
                .unwrap_or(FALLBACK_CALORIE_TARGET),
        }
    }
}

fn joined(set: &BTreeSet<String>, empty: &str) -> String {
    if set.is_empty() {
        empty.to_string()
    } else {
        set.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}

pub fn build_prompt(req: &PlanRequest) -> String {
    format!(
        "Create a 7-day meal plan for someone with:\n\
         - Dietary preferences: {}\n\
         - Allergies: {}\n\
         - Health goals: {}\n\
         - Daily calorie target: {} calories\n\
         \n\
         For each day, provide breakfast, lunch, dinner, and one healthy snack.\n\
         Include meal names, brief descriptions, estimated prep time, and nutrition estimates.\n\
         Provide the response in the requested JSON schema.",
        joined(&req.dietary_preferences, "none"),
        joined(&req.allergies, "none"),
        joined(&req.health_goals, "general health"),
        req.daily_calorie_target.round(),
    )
}

pub fn build_estimate_prompt(food_name: &str, quantity: f64, unit: &str) -> String {
    format!(
        "Estimate the nutrition facts for {} {} of {}. Provide realistic estimates.",
        quantity, unit, food_name
    )
}
