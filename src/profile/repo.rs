use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::models::{ActivityLevel, Gender};
use crate::storage::{get_json, put_json, KvStore};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub goal_weight_kg: Option<f64>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub activity_level: ActivityLevel,
    #[serde(default)]
    pub daily_calorie_target: Option<f64>,
    #[serde(default)]
    pub daily_water_target_ml: Option<f64>,
    #[serde(default)]
    pub dietary_preferences: BTreeSet<String>,
    #[serde(default)]
    pub allergies: BTreeSet<String>,
    #[serde(default)]
    pub health_goals: BTreeSet<String>,
    #[serde(default)]
    pub onboarding_completed: bool,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl Profile {
    /// Profile served before the user has saved anything.
    pub fn default_for(user_id: &str) -> Self {
        Self {
            id: user_id.to_string(),
            email: "local@user.app".into(),
            full_name: None,
            gender: Some(Gender::Female),
            height_cm: Some(165.0),
            weight_kg: Some(55.0),
            goal_weight_kg: None,
            age: None,
            activity_level: ActivityLevel::default(),
            daily_calorie_target: Some(1800.0),
            daily_water_target_ml: None,
            dietary_preferences: BTreeSet::from(["vegetarian".to_string()]),
            allergies: BTreeSet::new(),
            health_goals: BTreeSet::from(["maintain weight".to_string()]),
            onboarding_completed: false,
            updated_at: None,
        }
    }
}

fn profile_key(user_id: &str) -> String {
    format!("profile:{}", user_id)
}

/// Stored profile, or the default one when nothing was saved yet.
pub async fn load(store: &dyn KvStore, user_id: &str) -> anyhow::Result<Profile> {
    let stored: Option<Profile> = get_json(store, &profile_key(user_id)).await?;
    Ok(stored.unwrap_or_else(|| Profile::default_for(user_id)))
}

pub async fn save(store: &dyn KvStore, profile: &Profile) -> anyhow::Result<()> {
    put_json(store, &profile_key(&profile.id), profile).await
}
