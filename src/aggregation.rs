//! Grouping and summing of food log and meal plan records.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use time::{Date, Duration};

use crate::models::{MacroSource, Macros, MealSlot, MealType};

pub const DEFAULT_STREAK_LOOKBACK: u32 = 30;
pub const WEEK_DAYS: i64 = 7;

pub fn sum_macros<T: MacroSource>(items: &[T]) -> Macros {
    items
        .iter()
        .fold(Macros::default(), |acc, item| acc + item.macros())
}

/// Every meal type is present in the result, possibly with an empty list.
/// Items keep their input order within a group.
pub fn group_by_meal_type<T: MealSlot + Clone>(items: &[T]) -> BTreeMap<MealType, Vec<T>> {
    let mut grouped: BTreeMap<MealType, Vec<T>> =
        MealType::ALL.iter().map(|m| (*m, Vec::new())).collect();
    for item in items {
        grouped.entry(item.meal_type()).or_default().push(item.clone());
    }
    grouped
}

/// Sunday on or before `date`.
pub fn start_of_week(date: Date) -> Date {
    date - Duration::days(date.weekday().number_days_from_sunday() as i64)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySlots<T> {
    pub date: Date,
    pub breakfast: Option<T>,
    pub lunch: Option<T>,
    pub dinner: Option<T>,
    pub snack: Option<T>,
}

impl<T> DaySlots<T> {
    pub fn empty(date: Date) -> Self {
        Self {
            date,
            breakfast: None,
            lunch: None,
            dinner: None,
            snack: None,
        }
    }

    pub fn slot(&self, meal_type: MealType) -> Option<&T> {
        match meal_type {
            MealType::Breakfast => self.breakfast.as_ref(),
            MealType::Lunch => self.lunch.as_ref(),
            MealType::Dinner => self.dinner.as_ref(),
            MealType::Snack => self.snack.as_ref(),
        }
    }

    fn slot_mut(&mut self, meal_type: MealType) -> &mut Option<T> {
        match meal_type {
            MealType::Breakfast => &mut self.breakfast,
            MealType::Lunch => &mut self.lunch,
            MealType::Dinner => &mut self.dinner,
            MealType::Snack => &mut self.snack,
        }
    }

    pub fn filled(&self) -> usize {
        MealType::ALL
            .iter()
            .filter(|m| self.slot(**m).is_some())
            .count()
    }
}

/// Seven consecutive days starting at `week_start`, all slots empty.
pub fn build_week_skeleton<T>(week_start: Date) -> Vec<DaySlots<T>> {
    (0..WEEK_DAYS)
        .map(|i| DaySlots::empty(week_start + Duration::days(i)))
        .collect()
}

/// Places items into their (date, meal type) slot. Items outside the
/// skeleton's days are ignored; a later item wins a contested slot.
pub fn overlay_plan<T: MealSlot + Clone>(week: &mut [DaySlots<T>], items: &[T]) {
    for item in items {
        if let Some(day) = week.iter_mut().find(|d| d.date == item.date()) {
            *day.slot_mut(item.meal_type()) = Some(item.clone());
        }
    }
}

/// Consecutive days with at least one entry, walking back from `today`.
pub fn compute_streak<I>(dates: I, today: Date, max_lookback: u32) -> u32
where
    I: IntoIterator<Item = Date>,
{
    let logged: BTreeSet<Date> = dates.into_iter().collect();
    let mut streak = 0;
    for i in 0..max_lookback {
        let day = today - Duration::days(i as i64);
        if logged.contains(&day) {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

/// `value` as a percentage of `target`; 0 without a positive target.
pub fn progress_percent(value: f64, target: Option<f64>) -> f64 {
    match target {
        Some(t) if t > 0.0 => value / t * 100.0,
        _ => 0.0,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: Date,
    pub totals: Macros,
    pub entries: usize,
}

/// Rounded per-day totals for the `days` days ending at `today`, oldest first.
pub fn daily_series<T>(items: &[T], today: Date, days: i64) -> Vec<DailyPoint>
where
    T: MacroSource + MealSlot,
{
    (0..days)
        .rev()
        .map(|back| {
            let date = today - Duration::days(back);
            let (totals, entries) = items
                .iter()
                .filter(|i| i.date() == date)
                .fold((Macros::default(), 0), |(acc, n), i| (acc + i.macros(), n + 1));
            DailyPoint {
                date,
                totals: totals.rounded(),
                entries,
            }
        })
        .collect()
}

/// Calories logged over the last seven days (today included), spread over
/// seven days regardless of how many had entries.
pub fn average_daily_calories<T>(items: &[T], today: Date) -> f64
where
    T: MacroSource + MealSlot,
{
    let from = today - Duration::days(WEEK_DAYS - 1);
    let total: f64 = items
        .iter()
        .filter(|i| i.date() >= from && i.date() <= today)
        .map(|i| i.macros().calories)
        .sum();
    total / WEEK_DAYS as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    CalorieTargetExceeded,
    Hydrate,
    WithinCalorieGoal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub message: String,
}

/// Dashboard hints for the day so far.
pub fn insights(
    calories: f64,
    water_ml: f64,
    calorie_target: Option<f64>,
    water_target_ml: Option<f64>,
) -> Vec<Insight> {
    let mut out = Vec::new();

    if let Some(target) = calorie_target.filter(|t| *t > 0.0) {
        if calories > target {
            out.push(Insight {
                kind: InsightKind::CalorieTargetExceeded,
                message: format!(
                    "You've exceeded your calorie target by {} calories.",
                    (calories - target).round()
                ),
            });
        }
    }

    if let Some(target) = water_target_ml.filter(|t| *t > 0.0) {
        if progress_percent(water_ml, Some(target)) < 50.0 {
            out.push(Insight {
                kind: InsightKind::Hydrate,
                message: format!(
                    "Stay hydrated! You need {}ml more water today.",
                    (target - water_ml).round()
                ),
            });
        }
    }

    if let Some(target) = calorie_target.filter(|t| *t > 0.0) {
        if calories < target * 0.8 {
            out.push(Insight {
                kind: InsightKind::WithinCalorieGoal,
                message: "Great job staying within your calorie goals!".into(),
            });
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        date: Date,
        meal: MealType,
        kcal: f64,
        protein: f64,
    }

    impl MacroSource for Item {
        fn macros(&self) -> Macros {
            Macros {
                calories: self.kcal,
                protein: self.protein,
                ..Macros::default()
            }
        }
    }

    impl MealSlot for Item {
        fn date(&self) -> Date {
            self.date
        }
        fn meal_type(&self) -> MealType {
            self.meal
        }
    }

    fn item(date: Date, meal: MealType, kcal: f64) -> Item {
        Item {
            date,
            meal,
            kcal,
            protein: kcal / 10.0,
        }
    }

    #[test]
    fn sum_of_nothing_is_zero() {
        let empty: Vec<Item> = Vec::new();
        assert_eq!(sum_macros(&empty), Macros::default());
    }

    #[test]
    fn sum_is_order_independent() {
        let d = date!(2025 - 03 - 10);
        let mut items = vec![
            item(d, MealType::Breakfast, 350.0),
            item(d, MealType::Lunch, 450.0),
            item(d, MealType::Snack, 200.0),
        ];
        let forward = sum_macros(&items);
        items.reverse();
        assert_eq!(sum_macros(&items), forward);
        items.swap(0, 1);
        assert_eq!(sum_macros(&items), forward);
        assert_eq!(forward.calories, 1000.0);
        assert_eq!(forward.protein, 100.0);
    }

    #[test]
    fn grouping_keeps_every_meal_type() {
        let d = date!(2025 - 03 - 10);
        let a = item(d, MealType::Lunch, 1.0);
        let b = item(d, MealType::Lunch, 2.0);
        let grouped = group_by_meal_type(&[a.clone(), b.clone()]);
        assert_eq!(grouped.len(), 4);
        assert_eq!(grouped[&MealType::Lunch], vec![a, b]);
        assert!(grouped[&MealType::Breakfast].is_empty());
        assert!(grouped[&MealType::Snack].is_empty());
    }

    #[test]
    fn week_starts_on_sunday() {
        // 2025-03-12 is a Wednesday.
        assert_eq!(start_of_week(date!(2025 - 03 - 12)), date!(2025 - 03 - 09));
        assert_eq!(start_of_week(date!(2025 - 03 - 09)), date!(2025 - 03 - 09));
        assert_eq!(start_of_week(date!(2025 - 03 - 15)), date!(2025 - 03 - 09));
    }

    #[test]
    fn skeleton_overlay_fills_matching_slots_only() {
        let start = date!(2025 - 03 - 09);
        let mut week = build_week_skeleton::<Item>(start);
        assert_eq!(week.len(), 7);
        assert!(week.iter().all(|d| d.filled() == 0));

        let tue_dinner = item(date!(2025 - 03 - 11), MealType::Dinner, 600.0);
        let outside = item(date!(2025 - 03 - 20), MealType::Lunch, 1.0);
        overlay_plan(&mut week, &[tue_dinner.clone(), outside]);

        assert_eq!(week[2].slot(MealType::Dinner), Some(&tue_dinner));
        assert_eq!(week[2].filled(), 1);
        assert_eq!(week.iter().map(|d| d.filled()).sum::<usize>(), 1);
        assert_eq!(week[6].date, date!(2025 - 03 - 15));
    }

    #[test]
    fn streak_stops_at_first_gap() {
        let today = date!(2025 - 03 - 10);
        let days = [
            today,
            today - Duration::days(1),
            today - Duration::days(2),
            today - Duration::days(4),
        ];
        assert_eq!(compute_streak(days, today, DEFAULT_STREAK_LOOKBACK), 3);
    }

    #[test]
    fn streak_zero_without_entry_today_and_capped_by_lookback() {
        let today = date!(2025 - 03 - 10);
        assert_eq!(
            compute_streak([today - Duration::days(1)], today, DEFAULT_STREAK_LOOKBACK),
            0
        );
        let forty: Vec<Date> = (0..40).map(|i| today - Duration::days(i)).collect();
        assert_eq!(compute_streak(forty, today, DEFAULT_STREAK_LOOKBACK), 30);
    }

    #[test]
    fn progress_without_target_is_zero() {
        assert_eq!(progress_percent(900.0, Some(1800.0)), 50.0);
        assert_eq!(progress_percent(900.0, None), 0.0);
        assert_eq!(progress_percent(900.0, Some(0.0)), 0.0);
    }

    #[test]
    fn series_and_average_cover_last_week() {
        let today = date!(2025 - 03 - 10);
        let items = vec![
            item(today, MealType::Breakfast, 350.4),
            item(today, MealType::Dinner, 600.0),
            item(today - Duration::days(6), MealType::Lunch, 450.0),
            item(today - Duration::days(7), MealType::Lunch, 999.0),
        ];
        let series = daily_series(&items, today, 7);
        assert_eq!(series.len(), 7);
        assert_eq!(series[0].date, today - Duration::days(6));
        assert_eq!(series[0].totals.calories, 450.0);
        assert_eq!(series[6].entries, 2);
        assert_eq!(series[6].totals.calories, 950.0);

        let avg = average_daily_calories(&items, today);
        assert!((avg - 1400.4 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn insights_follow_targets() {
        let over = insights(2000.0, 2000.0, Some(1800.0), Some(2000.0));
        assert_eq!(over.len(), 1);
        assert_eq!(over[0].kind, InsightKind::CalorieTargetExceeded);
        assert!(over[0].message.contains("200"));

        let low = insights(1000.0, 500.0, Some(1800.0), Some(2000.0));
        let kinds: Vec<_> = low.iter().map(|i| i.kind).collect();
        assert_eq!(kinds, vec![InsightKind::Hydrate, InsightKind::WithinCalorieGoal]);
        assert!(low[0].message.contains("1500ml"));

        assert!(insights(1000.0, 0.0, None, None).is_empty());
    }
}
