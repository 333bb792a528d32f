use std::collections::BTreeSet;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::models::{MacroSource, Macros, MealSlot, MealType};
use crate::storage::{get_json, KvStore};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodEntry {
    pub id: Uuid,
    pub date: Date,
    pub meal_type: MealType,
    pub food_name: String,
    pub quantity: f64,
    pub unit: String,
    pub calories: f64,
    #[serde(default)]
    pub protein_g: f64,
    #[serde(default)]
    pub carbs_g: f64,
    #[serde(default)]
    pub fat_g: f64,
    #[serde(default)]
    pub fiber_g: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl MacroSource for FoodEntry {
    fn macros(&self) -> Macros {
        Macros {
            calories: self.calories,
            protein: self.protein_g,
            carbs: self.carbs_g,
            fat: self.fat_g,
        }
    }
}

impl MealSlot for FoodEntry {
    fn date(&self) -> Date {
        self.date
    }

    fn meal_type(&self) -> MealType {
        self.meal_type
    }
}

fn day_key(user_id: &str, date: Date) -> String {
    format!("food_log:{}:{}", user_id, date)
}

fn dates_key(user_id: &str) -> String {
    format!("food_log:{}:dates", user_id)
}

fn write_scope(user_id: &str) -> String {
    format!("food_log:{}", user_id)
}

/// Dates that have at least one entry.
pub async fn logged_dates(store: &dyn KvStore, user_id: &str) -> anyhow::Result<BTreeSet<Date>> {
    Ok(get_json(store, &dates_key(user_id)).await?.unwrap_or_default())
}

/// Entries for one day, newest first.
pub async fn list_by_date(
    store: &dyn KvStore,
    user_id: &str,
    date: Date,
) -> anyhow::Result<Vec<FoodEntry>> {
    let mut entries: Vec<FoodEntry> = get_json(store, &day_key(user_id, date))
        .await?
        .unwrap_or_default();
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(entries)
}

/// Entries dated within `from..=to`.
pub async fn list_range(
    store: &dyn KvStore,
    user_id: &str,
    from: Date,
    to: Date,
) -> anyhow::Result<Vec<FoodEntry>> {
    let dates = logged_dates(store, user_id).await?;
    let mut out = Vec::new();
    for date in dates.range(from..=to) {
        out.extend(list_by_date(store, user_id, *date).await?);
    }
    Ok(out)
}

/// Number of entries across every logged day.
pub async fn count_all(store: &dyn KvStore, user_id: &str) -> anyhow::Result<usize> {
    let dates = logged_dates(store, user_id).await?;
    let mut total = 0;
    for date in dates {
        total += list_by_date(store, user_id, date).await?.len();
    }
    Ok(total)
}

pub async fn insert(store: &dyn KvStore, user_id: &str, entry: &FoodEntry) -> anyhow::Result<()> {
    let _guard = store.lock_scope(&write_scope(user_id)).await;
    let mut day = list_by_date(store, user_id, entry.date).await?;
    day.push(entry.clone());
    let mut dates = logged_dates(store, user_id).await?;
    dates.insert(entry.date);

    store
        .put_many(vec![
            (
                day_key(user_id, entry.date),
                serde_json::to_value(&day).context("encode food log day")?,
            ),
            (
                dates_key(user_id),
                serde_json::to_value(&dates).context("encode food log dates")?,
            ),
        ])
        .await
}

/// Removes the entry with `id`. Returns the removed entry, if any.
/// A day left without entries drops out of the date index and its key is
/// deleted.
pub async fn delete(
    store: &dyn KvStore,
    user_id: &str,
    id: Uuid,
) -> anyhow::Result<Option<FoodEntry>> {
    let _guard = store.lock_scope(&write_scope(user_id)).await;
    let mut dates = logged_dates(store, user_id).await?;
    for date in dates.clone() {
        let mut day = list_by_date(store, user_id, date).await?;
        let Some(pos) = day.iter().position(|e| e.id == id) else {
            continue;
        };
        let removed = day.remove(pos);
        if day.is_empty() {
            dates.remove(&date);
        }
        store
            .put_many(vec![
                (
                    day_key(user_id, date),
                    serde_json::to_value(&day).context("encode food log day")?,
                ),
                (
                    dates_key(user_id),
                    serde_json::to_value(&dates).context("encode food log dates")?,
                ),
            ])
            .await?;
        if day.is_empty() {
            store.delete(&day_key(user_id, date)).await?;
        }
        return Ok(Some(removed));
    }
    Ok(None)
}

#[cfg(test)]
pub(crate) fn sample_entry(date: Date, meal_type: MealType, calories: f64) -> FoodEntry {
    FoodEntry {
        id: Uuid::new_v4(),
        date,
        meal_type,
        food_name: "Oatmeal".into(),
        quantity: 100.0,
        unit: "grams".into(),
        calories,
        protein_g: 10.0,
        carbs_g: 50.0,
        fat_g: 5.0,
        fiber_g: None,
        created_at: OffsetDateTime::now_utc(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::storage::MemoryStore;
    use time::macros::date;

    #[tokio::test]
    async fn insert_indexes_by_date() {
        let store = MemoryStore::new();
        let d = date!(2025 - 03 - 10);
        insert(&store, "u", &sample_entry(d, MealType::Lunch, 400.0))
            .await
            .unwrap();
        insert(&store, "u", &sample_entry(d, MealType::Dinner, 600.0))
            .await
            .unwrap();
        insert(
            &store,
            "u",
            &sample_entry(date!(2025 - 03 - 12), MealType::Snack, 100.0),
        )
        .await
        .unwrap();

        assert_eq!(list_by_date(&store, "u", d).await.unwrap().len(), 2);
        assert_eq!(logged_dates(&store, "u").await.unwrap().len(), 2);
        assert_eq!(count_all(&store, "u").await.unwrap(), 3);
        assert!(list_by_date(&store, "other", d).await.unwrap().is_empty());

        let ranged = list_range(&store, "u", d, date!(2025 - 03 - 11)).await.unwrap();
        assert_eq!(ranged.len(), 2);
    }

    #[tokio::test]
    async fn delete_drops_empty_days_from_index() {
        let store = MemoryStore::new();
        let d = date!(2025 - 03 - 10);
        let e = sample_entry(d, MealType::Lunch, 400.0);
        insert(&store, "u", &e).await.unwrap();

        let removed = delete(&store, "u", e.id).await.unwrap();
        assert_eq!(removed.map(|r| r.id), Some(e.id));
        assert!(logged_dates(&store, "u").await.unwrap().is_empty());
        assert!(store.get(&day_key("u", d)).await.unwrap().is_none());
        assert!(delete(&store, "u", e.id).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_inserts_are_all_kept() {
        let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let d = date!(2025 - 03 - 10);

        let tasks: Vec<_> = (0..50)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    let entry = sample_entry(d, MealType::Snack, i as f64);
                    insert(store.as_ref(), "u", &entry).await
                })
            })
            .collect();
        for t in tasks {
            t.await.unwrap().unwrap();
        }

        assert_eq!(list_by_date(store.as_ref(), "u", d).await.unwrap().len(), 50);
    }
}
