//! Error types for the tiered cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache layers and the service facade.
///
/// Only `UnknownPattern` and `InvalidPattern` ever reach callers of the
/// service; the remaining variants are absorbed by the tier that produced
/// them and surface as an absent value or a `false` write.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Caller referenced a pattern that was never registered
    #[error("Unknown cache pattern: {0}")]
    UnknownPattern(String),

    /// Pattern rejected at registration
    #[error("Invalid cache pattern: {0}")]
    InvalidPattern(String),

    /// Remote tier has no connection
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Remote call exceeded its response timeout
    #[error("Backend timed out after {0} ms")]
    Timeout(u64),

    /// Value could not be encoded or decoded as JSON
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Redis reported an error
    #[error("Redis error: {0}")]
    Backend(#[from] redis::RedisError),

    /// Internal bookkeeping fault
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::UnknownPattern(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidPattern(_) => StatusCode::BAD_REQUEST,
            CacheError::BackendUnavailable(_) | CacheError::Timeout(_) | CacheError::Backend(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            CacheError::Serialization(_) | CacheError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
