use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use time::OffsetDateTime;

use super::dto::SaveProfileRequest;
use super::repo::Profile;
use crate::metrics::formulas::daily_calorie_target;

#[derive(Debug, Error, PartialEq)]
pub enum ProfileError {
    #[error("invalid email")]
    InvalidEmail,
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn positive(field: &'static str, value: Option<f64>) -> Result<(), ProfileError> {
    match value {
        Some(v) if v.is_nan() || v <= 0.0 => Err(ProfileError::NotPositive { field, value: v }),
        _ => Ok(()),
    }
}

fn clean_tags(tags: BTreeSet<String>) -> BTreeSet<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Validates a save request and turns it into the profile to store.
/// Onboarding state is carried over from `current`.
pub fn build_profile(
    user_id: &str,
    current: &Profile,
    req: SaveProfileRequest,
) -> Result<Profile, ProfileError> {
    let email = req.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(ProfileError::InvalidEmail);
    }
    positive("height_cm", req.height_cm)?;
    positive("weight_kg", req.weight_kg)?;
    positive("goal_weight_kg", req.goal_weight_kg)?;
    positive("daily_calorie_target", req.daily_calorie_target)?;
    positive("daily_water_target_ml", req.daily_water_target_ml)?;
    if req.age == Some(0) {
        return Err(ProfileError::NotPositive {
            field: "age",
            value: 0.0,
        });
    }

    Ok(Profile {
        id: user_id.to_string(),
        email,
        full_name: req.full_name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        gender: req.gender,
        height_cm: req.height_cm,
        weight_kg: req.weight_kg,
        goal_weight_kg: req.goal_weight_kg,
        age: req.age,
        activity_level: req.activity_level,
        daily_calorie_target: req.daily_calorie_target,
        daily_water_target_ml: req.daily_water_target_ml,
        dietary_preferences: clean_tags(req.dietary_preferences),
        allergies: clean_tags(req.allergies),
        health_goals: clean_tags(req.health_goals),
        onboarding_completed: current.onboarding_completed,
        updated_at: Some(OffsetDateTime::now_utc()),
    })
}

/// Onboarding derives the calorie target from the body metrics and marks
/// the profile complete.
pub fn complete_onboarding(
    user_id: &str,
    current: &Profile,
    req: SaveProfileRequest,
) -> Result<Profile, ProfileError> {
    let mut profile = build_profile(user_id, current, req)?;
    profile.daily_calorie_target = Some(daily_calorie_target(
        profile.weight_kg,
        profile.height_cm,
        profile.age,
        profile.activity_level,
    ));
    profile.onboarding_completed = true;
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActivityLevel;

    fn request() -> SaveProfileRequest {
        serde_json::from_value(serde_json::json!({
            "email": "  Jane@Example.COM ",
            "height_cm": 165.0,
            "weight_kg": 55.0,
            "age": 30,
            "activity_level": "sedentary",
            "allergies": ["peanuts", "  ", " shellfish "]
        }))
        .unwrap()
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("nope"));
        assert!(!is_valid_email("a b@c.d"));
    }

    #[test]
    fn build_normalizes_fields() {
        let current = Profile::default_for("u");
        let p = build_profile("u", &current, request()).unwrap();
        assert_eq!(p.email, "jane@example.com");
        assert_eq!(p.activity_level, ActivityLevel::Sedentary);
        assert_eq!(
            p.allergies.iter().cloned().collect::<Vec<_>>(),
            vec!["peanuts".to_string(), "shellfish".to_string()]
        );
        assert!(!p.onboarding_completed);
        assert!(p.updated_at.is_some());
    }

    #[test]
    fn build_rejects_bad_input() {
        let current = Profile::default_for("u");
        let mut req = request();
        req.email = "broken".into();
        assert_eq!(
            build_profile("u", &current, req).unwrap_err(),
            ProfileError::InvalidEmail
        );

        let mut req = request();
        req.weight_kg = Some(-3.0);
        assert!(matches!(
            build_profile("u", &current, req),
            Err(ProfileError::NotPositive { field: "weight_kg", .. })
        ));

        let mut req = request();
        req.weight_kg = Some(0.0);
        assert_eq!(
            build_profile("u", &current, req).unwrap_err(),
            ProfileError::NotPositive {
                field: "weight_kg",
                value: 0.0
            }
        );
    }

    #[test]
    fn onboarding_sets_target_and_flag() {
        let current = Profile::default_for("u");
        let p = complete_onboarding("u", &current, request()).unwrap();
        assert_eq!(p.daily_calorie_target, Some(1724.0));
        assert!(p.onboarding_completed);
    }
}
