//! API Handlers
//!
//! Pull-style monitoring endpoints over the cache service.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::error::Result;
use crate::service::{CacheService, HealthReport, HealthStatus, PatternId, PerformanceStats};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CacheService>,
}

impl AppState {
    pub fn new(service: CacheService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Response body for `DELETE /patterns/:name`
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    pub pattern: PatternId,
    pub cleared: bool,
}

/// Handler for GET /health
///
/// 503 only when the check failed outright; a degraded cache still serves.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let report = state.service.health_check().await;
    let status = match report.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(report))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<PerformanceStats> {
    Json(state.service.get_performance_stats().await)
}

/// Handler for DELETE /patterns/:name
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<InvalidateResponse>> {
    let pattern: PatternId = name.parse()?;
    let cleared = state.service.invalidate_pattern(pattern).await?;
    Ok(Json(InvalidateResponse { pattern, cleared }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{InMemoryBackend, MemoryCache, MultiLevelCache, RemoteCache};
    use crate::error::CacheError;
    use crate::service::KeyArgs;
    use std::time::Duration;

    fn state() -> AppState {
        let remote = RemoteCache::with_backend(InMemoryBackend::new(), Duration::from_secs(1));
        let cache = MultiLevelCache::new(MemoryCache::new(100, Duration::from_secs(300)), remote);
        AppState::new(CacheService::new(cache).unwrap())
    }

    #[tokio::test]
    async fn test_health_handler() {
        let (status, Json(report)) = health_handler(State(state())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report.status, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let Json(stats) = stats_handler(State(state())).await;
        assert_eq!(stats.cache.aggregate.hits, 0);
        assert_eq!(stats.patterns.len(), PatternId::ALL.len());
    }

    #[tokio::test]
    async fn test_invalidate_handler() {
        let state = state();
        state
            .service
            .set_with_pattern(PatternId::CalculationResults, &KeyArgs::new().part(1), &10)
            .await
            .unwrap();

        let Json(response) =
            invalidate_handler(State(state.clone()), Path("calculation_results".to_string()))
                .await
                .unwrap();
        assert!(response.cleared);
        assert_eq!(response.pattern, PatternId::CalculationResults);
    }

    #[tokio::test]
    async fn test_invalidate_unknown_pattern() {
        let result = invalidate_handler(State(state()), Path("bogus".to_string())).await;
        assert!(matches!(result, Err(CacheError::UnknownPattern(_))));
    }
}
