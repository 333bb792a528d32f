use anyhow::Context;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::models::{MacroSource, Macros, MealSlot, MealType};
use crate::storage::{get_json, put_json, KvStore};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlanItem {
    pub id: Uuid,
    pub date: Date,
    pub meal_type: MealType,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: String,
    pub prep_time_minutes: u32,
    #[serde(default)]
    pub estimated_calories: f64,
    #[serde(default)]
    pub estimated_protein: f64,
    #[serde(default)]
    pub estimated_carbs: f64,
    #[serde(default)]
    pub estimated_fat: f64,
    #[serde(default)]
    pub ai_generated: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl MacroSource for MealPlanItem {
    fn macros(&self) -> Macros {
        Macros {
            calories: self.estimated_calories,
            protein: self.estimated_protein,
            carbs: self.estimated_carbs,
            fat: self.estimated_fat,
        }
    }
}

impl MealSlot for MealPlanItem {
    fn date(&self) -> Date {
        self.date
    }

    fn meal_type(&self) -> MealType {
        self.meal_type
    }
}

fn plan_key(user_id: &str) -> String {
    format!("meal_plans:{}", user_id)
}

/// Every stored item, ordered by date then meal type.
pub async fn list(store: &dyn KvStore, user_id: &str) -> anyhow::Result<Vec<MealPlanItem>> {
    let mut items: Vec<MealPlanItem> = get_json(store, &plan_key(user_id))
        .await?
        .unwrap_or_default();
    items.sort_by_key(|i| (i.date, i.meal_type));
    Ok(items)
}

pub async fn list_range(
    store: &dyn KvStore,
    user_id: &str,
    from: Date,
    to: Date,
) -> anyhow::Result<Vec<MealPlanItem>> {
    let mut items = list(store, user_id).await?;
    items.retain(|i| i.date >= from && i.date <= to);
    Ok(items)
}

pub async fn get(
    store: &dyn KvStore,
    user_id: &str,
    id: Uuid,
) -> anyhow::Result<Option<MealPlanItem>> {
    Ok(list(store, user_id)
        .await?
        .into_iter()
        .find(|i| i.id == id))
}

/// Stores `item`, evicting whatever held its (date, meal type) slot.
/// Returns the evicted item.
pub async fn upsert_slot(
    store: &dyn KvStore,
    user_id: &str,
    item: &MealPlanItem,
) -> anyhow::Result<Option<MealPlanItem>> {
    let _guard = store.lock_scope(&plan_key(user_id)).await;
    let mut items = list(store, user_id).await?;
    let evicted = items
        .iter()
        .position(|i| i.date == item.date && i.meal_type == item.meal_type)
        .map(|pos| items.remove(pos));
    items.push(item.clone());
    put_json(store, &plan_key(user_id), &items)
        .await
        .context("store meal plan")?;
    Ok(evicted)
}

pub async fn delete(
    store: &dyn KvStore,
    user_id: &str,
    id: Uuid,
) -> anyhow::Result<Option<MealPlanItem>> {
    let _guard = store.lock_scope(&plan_key(user_id)).await;
    let mut items = list(store, user_id).await?;
    let Some(pos) = items.iter().position(|i| i.id == id) else {
        return Ok(None);
    };
    let removed = items.remove(pos);
    put_json(store, &plan_key(user_id), &items)
        .await
        .context("store meal plan")?;
    Ok(Some(removed))
}

/// Drops every stored item and writes `items` in a single store write.
/// Returns how many items were dropped.
pub async fn replace_all(
    store: &dyn KvStore,
    user_id: &str,
    items: &[MealPlanItem],
) -> anyhow::Result<usize> {
    let _guard = store.lock_scope(&plan_key(user_id)).await;
    let previous = list(store, user_id).await?.len();
    put_json(store, &plan_key(user_id), &items)
        .await
        .context("replace meal plan")?;
    Ok(previous)
}

#[cfg(test)]
pub(crate) fn sample_item(date: Date, meal_type: MealType, title: &str) -> MealPlanItem {
    MealPlanItem {
        id: Uuid::new_v4(),
        date,
        meal_type,
        title: title.into(),
        description: String::new(),
        ingredients: Vec::new(),
        instructions: String::new(),
        prep_time_minutes: 30,
        estimated_calories: 400.0,
        estimated_protein: 20.0,
        estimated_carbs: 40.0,
        estimated_fat: 10.0,
        ai_generated: false,
        created_at: OffsetDateTime::now_utc(),
    }
}
