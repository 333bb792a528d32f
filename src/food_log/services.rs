use thiserror::Error;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::dto::LogFoodRequest;
use super::repo::FoodEntry;

pub const DEFAULT_QUANTITY: f64 = 100.0;
pub const DEFAULT_UNIT: &str = "grams";

#[derive(Debug, Error, PartialEq)]
pub enum EntryError {
    #[error("food name is required")]
    MissingName,
    #[error("calories are required")]
    MissingCalories,
    #[error("{field} cannot be negative")]
    Negative { field: &'static str },
}

fn non_negative(field: &'static str, v: Option<f64>) -> Result<f64, EntryError> {
    match v {
        Some(x) if x.is_nan() || x < 0.0 => Err(EntryError::Negative { field }),
        Some(x) => Ok(x),
        None => Ok(0.0),
    }
}

/// Checks a submission and builds the entry to persist. Nothing is stored
/// when this fails.
pub fn validate_entry(req: &LogFoodRequest, today: Date) -> Result<FoodEntry, EntryError> {
    let food_name = req
        .food_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or(EntryError::MissingName)?;
    let calories = req.calories.ok_or(EntryError::MissingCalories)?;
    let calories = non_negative("calories", Some(calories))?;

    let quantity = match req.quantity {
        Some(q) if q > 0.0 => q,
        Some(q) if q.is_nan() || q < 0.0 => return Err(EntryError::Negative { field: "quantity" }),
        _ => DEFAULT_QUANTITY,
    };
    let unit = req
        .unit
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .unwrap_or(DEFAULT_UNIT);

    Ok(FoodEntry {
        id: Uuid::new_v4(),
        date: req.date.unwrap_or(today),
        meal_type: req.meal_type,
        food_name: food_name.to_string(),
        quantity,
        unit: unit.to_string(),
        calories,
        protein_g: non_negative("protein_g", req.protein_g)?,
        carbs_g: non_negative("carbs_g", req.carbs_g)?,
        fat_g: non_negative("fat_g", req.fat_g)?,
        fiber_g: req
            .fiber_g
            .map(|f| non_negative("fiber_g", Some(f)))
            .transpose()?,
        created_at: OffsetDateTime::now_utc(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MealType;
    use time::macros::date;

    fn req() -> LogFoodRequest {
        LogFoodRequest {
            food_name: Some("  Greek yogurt ".into()),
            calories: Some(120.0),
            meal_type: MealType::Snack,
            ..LogFoodRequest::default()
        }
    }

    #[test]
    fn fills_defaults() {
        let today = date!(2025 - 03 - 10);
        let e = validate_entry(&req(), today).unwrap();
        assert_eq!(e.food_name, "Greek yogurt");
        assert_eq!(e.date, today);
        assert_eq!(e.quantity, 100.0);
        assert_eq!(e.unit, "grams");
        assert_eq!(e.protein_g, 0.0);
        assert_eq!(e.meal_type, MealType::Snack);
        assert!(e.fiber_g.is_none());
    }

    #[test]
    fn rejects_missing_name_or_calories() {
        let today = date!(2025 - 03 - 10);
        let mut r = req();
        r.food_name = Some("   ".into());
        assert_eq!(validate_entry(&r, today).unwrap_err(), EntryError::MissingName);

        let mut r = req();
        r.calories = None;
        assert_eq!(
            validate_entry(&r, today).unwrap_err(),
            EntryError::MissingCalories
        );
    }

    #[test]
    fn rejects_negative_macros() {
        let mut r = req();
        r.fat_g = Some(-1.0);
        assert_eq!(
            validate_entry(&r, date!(2025 - 03 - 10)).unwrap_err(),
            EntryError::Negative { field: "fat_g" }
        );
    }

    #[test]
    fn zero_calories_are_allowed() {
        let mut r = req();
        r.calories = Some(0.0);
        assert!(validate_entry(&r, date!(2025 - 03 - 10)).is_ok());
    }
}
