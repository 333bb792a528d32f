use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::storage::{get_json, put_json, KvStore};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterEntry {
    pub id: Uuid,
    pub date: Date,
    pub amount_ml: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

fn day_key(user_id: &str, date: Date) -> String {
    format!("water:{}:{}", user_id, date)
}

pub async fn list_by_date(
    store: &dyn KvStore,
    user_id: &str,
    date: Date,
) -> anyhow::Result<Vec<WaterEntry>> {
    Ok(get_json(store, &day_key(user_id, date))
        .await?
        .unwrap_or_default())
}

pub async fn total_ml(store: &dyn KvStore, user_id: &str, date: Date) -> anyhow::Result<f64> {
    Ok(list_by_date(store, user_id, date)
        .await?
        .iter()
        .map(|e| e.amount_ml)
        .sum())
}

pub async fn insert(store: &dyn KvStore, user_id: &str, entry: &WaterEntry) -> anyhow::Result<()> {
    let _guard = store.lock_scope(&format!("water:{}", user_id)).await;
    let mut day = list_by_date(store, user_id, entry.date).await?;
    day.push(entry.clone());
    put_json(store, &day_key(user_id, entry.date), &day).await
}
