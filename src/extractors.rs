use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

use crate::state::AppState;

pub const USER_HEADER: &str = "x-user-id";

pub(crate) fn is_valid_user_id(id: &str) -> bool {
    lazy_static! {
        static ref USER_ID_RE: Regex = Regex::new(r"^[A-Za-z0-9_.@-]{1,128}$").unwrap();
    }
    USER_ID_RE.is_match(id)
}

/// Identifies whose data a request reads and writes. There is no
/// authentication: the id comes from `X-User-Id` or the configured local user.
#[derive(Debug)]
pub struct CurrentUser(pub String);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(raw) = parts.headers.get(USER_HEADER) else {
            return Ok(CurrentUser(state.config.default_user_id.clone()));
        };

        let id = raw
            .to_str()
            .map(str::trim)
            .map_err(|_| (StatusCode::BAD_REQUEST, "invalid X-User-Id header".to_string()))?;

        if !is_valid_user_id(id) {
            warn!(user_id = %id, "rejected malformed user id");
            return Err((StatusCode::BAD_REQUEST, "invalid X-User-Id header".to_string()));
        }

        Ok(CurrentUser(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_shape() {
        assert!(is_valid_user_id("local_user_12345"));
        assert!(is_valid_user_id("a.b@c-d"));
        assert!(!is_valid_user_id(""));
        assert!(!is_valid_user_id("has space"));
        assert!(!is_valid_user_id("profile:other"));
    }
}
