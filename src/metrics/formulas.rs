//! Body metrics: BMI, BMR (Mifflin-St Jeor), TDEE and calorie goal bands.
//!
//! Every function is total. Missing or non-positive inputs yield `0.0`
//! and the display layer decides how to render absence.

use serde::Serialize;

use crate::models::ActivityLevel;

/// Weekly deficit/surplus of roughly 0.5 kg.
pub const GOAL_ADJUSTMENT_KCAL: f64 = 500.0;

/// Target used when the profile lacks the inputs for a BMR.
pub const FALLBACK_CALORIE_TARGET: f64 = 2000.0;

const BMI_SCALE_MIN: f64 = 15.0;
const BMI_SCALE_MAX: f64 = 35.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn label(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal weight",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }

    pub fn tip(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => {
                "Consider consulting with a healthcare provider about healthy ways to gain weight."
            }
            BmiCategory::Normal => {
                "Great job! Maintain your healthy lifestyle with balanced nutrition and regular exercise."
            }
            BmiCategory::Overweight => {
                "Focus on a balanced diet and regular physical activity to reach a healthier weight."
            }
            BmiCategory::Obese => {
                "Consult with a healthcare provider to develop a safe and effective weight management plan."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalorieGoals {
    pub loss: f64,
    pub maintain: f64,
    pub gain: f64,
    /// True when `loss` was raised to the floor.
    pub loss_floored: bool,
}

pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

pub fn bmi(weight_kg: f64, height_cm: f64) -> f64 {
    if weight_kg <= 0.0 || height_cm <= 0.0 {
        return 0.0;
    }
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

/// Lower bounds inclusive, upper bounds exclusive.
pub fn bmi_category(bmi: f64) -> BmiCategory {
    if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::Normal
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else {
        BmiCategory::Obese
    }
}

/// Position (0..=100) of `bmi` on a 15–35 gauge.
pub fn bmi_scale_position(bmi: f64) -> f64 {
    let clamped = bmi.clamp(BMI_SCALE_MIN, BMI_SCALE_MAX);
    (clamped - BMI_SCALE_MIN) / (BMI_SCALE_MAX - BMI_SCALE_MIN) * 100.0
}

/// Mifflin-St Jeor with the male offset (+5) applied regardless of gender.
pub fn bmr(weight_kg: f64, height_cm: f64, age_years: f64) -> f64 {
    if weight_kg <= 0.0 || height_cm <= 0.0 || age_years <= 0.0 {
        return 0.0;
    }
    10.0 * weight_kg + 6.25 * height_cm - 5.0 * age_years + 5.0
}

pub fn tdee(bmr: f64, activity_level: ActivityLevel) -> f64 {
    bmr * activity_level.multiplier()
}

/// Loss target never drops below `floor_kcal` (or below TDEE itself when
/// TDEE is already under the floor).
pub fn calorie_goals(tdee: f64, floor_kcal: f64) -> CalorieGoals {
    let raw_loss = tdee - GOAL_ADJUSTMENT_KCAL;
    let floor = floor_kcal.min(tdee).max(0.0);
    let loss_floored = raw_loss < floor;
    CalorieGoals {
        loss: if loss_floored { floor } else { raw_loss },
        maintain: tdee,
        gain: tdee + GOAL_ADJUSTMENT_KCAL,
        loss_floored,
    }
}

/// Daily target derived at onboarding: rounded TDEE, or the fallback when
/// BMR inputs are missing.
pub fn daily_calorie_target(
    weight_kg: Option<f64>,
    height_cm: Option<f64>,
    age: Option<u32>,
    activity_level: ActivityLevel,
) -> f64 {
    let base = bmr(
        weight_kg.unwrap_or(0.0),
        height_cm.unwrap_or(0.0),
        age.map(f64::from).unwrap_or(0.0),
    );
    let base = if base > 0.0 {
        base
    } else {
        FALLBACK_CALORIE_TARGET
    };
    tdee(base, activity_level).round()
}
