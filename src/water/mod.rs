//! Water intake log, tracked against the profile's daily water target.

use crate::state::AppState;
use axum::Router;

pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    handlers::water_routes()
}
