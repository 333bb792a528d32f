//! Dashboard and progress views over the food log, water log and profile.

use crate::state::AppState;
use axum::Router;

pub mod dto;
mod handlers;

use dto::Achievement;

pub const STREAK_BADGE_DAYS: u32 = 7;
pub const ENTRY_BADGE_COUNT: usize = 50;

pub fn router() -> Router<AppState> {
    handlers::progress_routes()
}

/// Badges earned so far. `goal_progress` is the rounded percentage of the
/// calorie target met on average; 80–120 counts as on target.
pub fn achievements(streak: u32, total_entries: usize, goal_progress: f64) -> Vec<Achievement> {
    let mut out = Vec::new();
    if streak >= STREAK_BADGE_DAYS {
        out.push(Achievement::WeekWarrior);
    }
    if total_entries >= ENTRY_BADGE_COUNT {
        out.push(Achievement::DataDevotee);
    }
    if (80.0..=120.0).contains(&goal_progress) {
        out.push(Achievement::GoalGetter);
    }
    if out.is_empty() {
        out.push(Achievement::JustGettingStarted);
    }
    out
}
