pub mod dto;
pub mod formulas;
mod handlers;

use axum::Router;

use crate::profile::repo::Profile;
use crate::state::AppState;

use dto::{BmiReport, EnergyReport, HealthMetrics};
use formulas::{bmi, bmi_category, bmi_scale_position, bmr, calorie_goals, round1, tdee};

pub fn router() -> Router<AppState> {
    handlers::metrics_routes()
}

/// Display-ready metrics, rounded the way the dashboard shows them.
pub fn health_metrics(profile: &Profile, calorie_floor_kcal: f64) -> HealthMetrics {
    let weight = profile.weight_kg.unwrap_or(0.0);
    let height = profile.height_cm.unwrap_or(0.0);

    let raw_bmi = bmi(weight, height);
    let bmi_report = (raw_bmi > 0.0).then(|| {
        let category = bmi_category(raw_bmi);
        BmiReport {
            value: round1(raw_bmi),
            category,
            label: category.label(),
            scale_position: round1(bmi_scale_position(raw_bmi)),
            tip: category.tip(),
        }
    });

    let age = profile.age.map(f64::from).unwrap_or(0.0);
    let raw_bmr = bmr(weight, height, age);
    let energy = (raw_bmr > 0.0).then(|| {
        let base = raw_bmr.round();
        let daily = tdee(base, profile.activity_level).round();
        let goals = calorie_goals(daily, calorie_floor_kcal);
        EnergyReport {
            bmr: base,
            tdee: daily,
            activity_label: profile.activity_level.label(),
            goals: formulas::CalorieGoals {
                loss: goals.loss.round(),
                maintain: goals.maintain.round(),
                gain: goals.gain.round(),
                loss_floored: goals.loss_floored,
            },
        }
    });

    HealthMetrics {
        bmi: bmi_report,
        energy,
    }
}
