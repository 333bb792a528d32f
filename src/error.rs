use axum::http::StatusCode;
use tracing::{error, warn};

use crate::generation::GenerationError;

/// Handler result shape: JSON body or a status with a plain message.
pub type ApiResult<T> = Result<axum::Json<T>, (StatusCode, String)>;

pub fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    error!(error = %e, "internal error");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

pub fn not_found(what: &str) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("{} not found", what))
}

pub fn generation_failed(e: GenerationError) -> (StatusCode, String) {
    let status = match &e {
        GenerationError::Busy => StatusCode::CONFLICT,
        GenerationError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        GenerationError::Upstream(_)
        | GenerationError::WrongDayCount { .. }
        | GenerationError::MalformedDay { .. } => StatusCode::BAD_GATEWAY,
    };
    warn!(error = %e, %status, "generation failed");
    (status, e.to_string())
}
