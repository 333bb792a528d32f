use std::time::Duration;

use async_trait::async_trait;
use time::{Duration as DayDelta, OffsetDateTime};
use tracing::{debug, info};

use super::prompt::{build_estimate_prompt, build_prompt};
use super::{
    GeneratedDay, GeneratedMeal, GenerationError, NutritionEstimate, PlanGenerator, PlanRequest,
    WeeklyPlan, DAYS_PER_PLAN,
};
use crate::models::MealType;

/// Stand-in for a remote model: waits `delay`, then answers with canned data.
#[derive(Debug, Clone)]
pub struct StubGenerator {
    delay: Duration,
    days: usize,
}

impl StubGenerator {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            days: DAYS_PER_PLAN,
        }
    }

    /// Returns `days` days instead of a full week.
    #[cfg(test)]
    pub fn with_days(mut self, days: usize) -> Self {
        self.days = days;
        self
    }
}

#[allow(clippy::too_many_arguments)]
fn canned(
    meal_type: MealType,
    title: &str,
    description: &str,
    prep: u32,
    kcal: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
    ingredients: &[&str],
) -> GeneratedMeal {
    GeneratedMeal {
        meal_type,
        title: title.into(),
        description: Some(description.into()),
        ingredients: Some(ingredients.iter().map(|s| s.to_string()).collect()),
        instructions: None,
        prep_time_minutes: Some(prep),
        estimated_calories: Some(kcal),
        estimated_protein: Some(protein),
        estimated_carbs: Some(carbs),
        estimated_fat: Some(fat),
    }
}

fn canned_day() -> Vec<GeneratedMeal> {
    vec![
        canned(
            MealType::Breakfast,
            "Oatmeal w/ Berries",
            "Quick, balanced start.",
            5,
            350.0,
            15.0,
            50.0,
            8.0,
            &["Oats", "Milk", "Berries", "Chia Seeds"],
        ),
        canned(
            MealType::Lunch,
            "Chickpea Salad Sandwich",
            "Vegetarian high-protein lunch.",
            15,
            450.0,
            20.0,
            60.0,
            12.0,
            &["Chickpeas", "Bread", "Mayo (light)", "Veggies"],
        ),
        canned(
            MealType::Dinner,
            "Vegetable Curry",
            "Healthy Indian-style curry.",
            35,
            600.0,
            25.0,
            80.0,
            20.0,
            &["Veggies", "Curry Paste", "Rice", "Yogurt"],
        ),
        canned(
            MealType::Snack,
            "Apple and Almonds",
            "Crunchy and satisfying snack.",
            2,
            200.0,
            8.0,
            30.0,
            6.0,
            &["Apple", "Almonds"],
        ),
    ]
}

fn weekday_name(offset: usize) -> String {
    // Day labels follow the plan's Sunday start.
    let today = OffsetDateTime::now_utc().date();
    let sunday = crate::aggregation::start_of_week(today);
    (sunday + DayDelta::days(offset as i64)).weekday().to_string()
}

#[async_trait]
impl PlanGenerator for StubGenerator {
    async fn generate_week(&self, req: &PlanRequest) -> Result<WeeklyPlan, GenerationError> {
        debug!(prompt = %build_prompt(req), "stub generator invoked");
        tokio::time::sleep(self.delay).await;

        let weekly_plan = (0..self.days)
            .map(|i| GeneratedDay {
                day: Some(weekday_name(i)),
                meals: canned_day(),
            })
            .collect();
        info!(days = self.days, "stub generator produced plan");
        Ok(WeeklyPlan { weekly_plan })
    }

    async fn estimate_nutrition(
        &self,
        food_name: &str,
        quantity: f64,
        unit: &str,
    ) -> Result<NutritionEstimate, GenerationError> {
        debug!(prompt = %build_estimate_prompt(food_name, quantity, unit), "stub estimate invoked");
        tokio::time::sleep(self.delay).await;

        // Canned per-100g profile; other units count as servings.
        let factor = match unit.trim().to_lowercase().as_str() {
            "g" | "gram" | "grams" | "ml" => quantity / 100.0,
            _ => quantity,
        };
        Ok(NutritionEstimate {
            calories: (150.0 * factor).round(),
            protein: (5.0 * factor).round(),
            carbs: (20.0 * factor).round(),
            fat: (5.0 * factor).round(),
            fiber: Some((2.0 * factor).round()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::validate_week;
    use crate::profile::repo::Profile;

    #[tokio::test]
    async fn stub_week_is_complete() {
        let gen = StubGenerator::new(Duration::ZERO);
        let req = PlanRequest::from_profile(&Profile::default_for("u"));
        let plan = gen.generate_week(&req).await.unwrap();
        assert_eq!(plan.weekly_plan.len(), 7);
        assert!(validate_week(&plan).is_ok());
        assert_eq!(plan.weekly_plan[0].day.as_deref(), Some("Sunday"));
    }

    #[tokio::test]
    async fn short_stub_fails_validation() {
        let gen = StubGenerator::new(Duration::ZERO).with_days(6);
        let req = PlanRequest::from_profile(&Profile::default_for("u"));
        let plan = gen.generate_week(&req).await.unwrap();
        assert!(validate_week(&plan).is_err());
    }

    #[tokio::test]
    async fn estimate_scales_by_grams() {
        let gen = StubGenerator::new(Duration::ZERO);
        let e = gen.estimate_nutrition("rice", 200.0, "grams").await.unwrap();
        assert_eq!(e.calories, 300.0);
        assert_eq!(e.protein, 10.0);
        let e = gen.estimate_nutrition("egg", 2.0, "pieces").await.unwrap();
        assert_eq!(e.calories, 300.0);
    }
}
