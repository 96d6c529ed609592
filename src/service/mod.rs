//! Cache Service Module
//!
//! Domain facade over [`MultiLevelCache`]: callers name a pattern and pass
//! key parts; the service derives the key and applies the pattern's TTL.

mod health;
mod key;
mod pattern;

use std::fmt::Display;
use std::time::Duration;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::cache::MultiLevelCache;
use crate::error::Result;

pub use health::{HealthReport, HealthStatus, PerformanceStats, TierCheck};
pub use key::{generate_key, KeyArgs, MAX_KEY_LENGTH};
pub use pattern::{configure_patterns, CachePattern, PatternId, PatternRegistry, PatternSummary};

/// Prefix of the synthetic keys written by [`CacheService::health_check`]
const HEALTH_KEY_PREFIX: &str = "health_check";
const HEALTH_KEY_TTL: Duration = Duration::from_secs(60);

// == Cache Service ==
/// Pattern-driven access to the two-tier cache.
///
/// Built once by the application and shared by reference; it holds no state
/// beyond the cache and a pattern table that never changes after
/// construction.
#[derive(Debug)]
pub struct CacheService {
    cache: MultiLevelCache<Value>,
    patterns: PatternRegistry,
}

impl CacheService {
    /// Creates a service with the built-in pattern table.
    pub fn new(cache: MultiLevelCache<Value>) -> Result<Self> {
        Ok(Self::with_patterns(cache, configure_patterns()?))
    }

    pub fn with_patterns(cache: MultiLevelCache<Value>, patterns: PatternRegistry) -> Self {
        info!(patterns = patterns.len(), "Cache service ready");
        Self { cache, patterns }
    }

    pub fn cache(&self) -> &MultiLevelCache<Value> {
        &self.cache
    }

    pub fn patterns(&self) -> &PatternRegistry {
        &self.patterns
    }

    /// Key a pattern would use for `args`.
    pub fn key_for(&self, id: PatternId, args: &KeyArgs) -> Result<String> {
        let pattern = self.patterns.get(id)?;
        Ok(generate_key(pattern.key_prefix(), args))
    }

    // == Get With Pattern ==
    /// Reads a value cached under a pattern.
    ///
    /// Fails only for an unregistered pattern; a value that no longer
    /// decodes as `T` is treated as absent.
    pub async fn get_with_pattern<T: DeserializeOwned>(
        &self,
        id: PatternId,
        args: &KeyArgs,
    ) -> Result<Option<T>> {
        let key = self.key_for(id, args)?;
        let Some(value) = self.cache.get(&key).await else {
            return Ok(None);
        };

        match serde_json::from_value(value) {
            Ok(decoded) => Ok(Some(decoded)),
            Err(e) => {
                warn!(pattern = %id, key = %key, error = %e, "Cached value has unexpected shape");
                Ok(None)
            }
        }
    }

    // == Set With Pattern ==
    /// Caches a value under a pattern with the pattern's TTL.
    pub async fn set_with_pattern<T: Serialize + ?Sized>(
        &self,
        id: PatternId,
        args: &KeyArgs,
        value: &T,
    ) -> Result<bool> {
        let pattern = self.patterns.get(id)?;
        let key = generate_key(pattern.key_prefix(), args);

        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                warn!(pattern = %id, key = %key, error = %e, "Value cannot be cached as JSON");
                return Ok(false);
            }
        };

        Ok(self.cache.set(&key, value, Some(pattern.ttl())).await)
    }

    // == Invalidate Pattern ==
    /// Purges the whole memory tier and every remote key under the pattern.
    pub async fn invalidate_pattern(&self, id: PatternId) -> Result<bool> {
        let pattern = self.patterns.get(id)?;
        let cleared = self.cache.clear(pattern.invalidation_glob()).await;
        info!(pattern = %id, glob = pattern.invalidation_glob(), cleared, "Pattern invalidated");
        Ok(cleared)
    }

    // == Warm ==
    /// Runs `loader` and caches its result under the pattern.
    ///
    /// Returns `Ok(false)` when the loader fails or the write is rejected;
    /// loader errors are logged, never propagated.
    pub async fn warm<T, E, F>(&self, id: PatternId, args: &KeyArgs, loader: F) -> Result<bool>
    where
        T: Serialize,
        E: Display,
        F: FnOnce() -> std::result::Result<T, E>,
    {
        // Resolve before running the loader so an unknown pattern costs nothing
        self.patterns.get(id)?;

        let value = match loader() {
            Ok(value) => value,
            Err(e) => {
                warn!(pattern = %id, error = %e, "Cache warm loader failed");
                return Ok(false);
            }
        };

        let warmed = self.set_with_pattern(id, args, &value).await?;
        debug!(pattern = %id, warmed, "Cache warm finished");
        Ok(warmed)
    }

    // == Health Check ==
    /// Round-trips a synthetic key through set, get and delete on each tier.
    ///
    /// Each tier is checked directly, and the check stays out of the
    /// aggregate counters.
    pub async fn health_check(&self) -> HealthReport {
        let now = Utc::now();
        let key = format!(
            "{HEALTH_KEY_PREFIX}:{}",
            now.timestamp_nanos_opt().unwrap_or_else(|| now.timestamp_millis())
        );
        let sample = json!({ "status": "ok", "timestamp": now.to_rfc3339() });

        let memory = self.check_memory(&key, &sample);
        let remote = self.check_remote(&key, &sample).await;

        let status = HealthStatus::classify(&memory, &remote);
        if status != HealthStatus::Healthy {
            warn!(?status, ?memory, ?remote, "Cache health check failed");
        }

        HealthReport {
            status,
            memory,
            remote,
            remote_connected: remote.passed(),
            timestamp: now.to_rfc3339(),
        }
    }

    fn check_memory(&self, key: &str, sample: &Value) -> TierCheck {
        let tier = self.cache.memory();
        let set_ok = tier.set(key, sample.clone(), Some(HEALTH_KEY_TTL));
        let read_back = tier.get(key);
        let delete_ok = tier.delete(key);
        TierCheck {
            set_ok,
            get_ok: read_back.is_some(),
            delete_ok,
            value_matches: same_bytes(sample, read_back.as_ref()),
        }
    }

    async fn check_remote(&self, key: &str, sample: &Value) -> TierCheck {
        let tier = self.cache.remote();
        let set_ok = tier.set(key, sample, HEALTH_KEY_TTL).await;
        let read_back = tier.get::<Value>(key).await;
        let delete_ok = tier.delete(key).await;
        TierCheck {
            set_ok,
            get_ok: read_back.is_some(),
            delete_ok,
            value_matches: same_bytes(sample, read_back.as_ref()),
        }
    }

    // == Performance Stats ==
    pub async fn get_performance_stats(&self) -> PerformanceStats {
        PerformanceStats {
            cache: self.cache.stats().await,
            patterns: self.patterns.summaries(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// True when both values serialize to the same JSON text.
fn same_bytes(expected: &Value, actual: Option<&Value>) -> bool {
    match (serde_json::to_string(expected), actual.map(serde_json::to_string)) {
        (Ok(expected), Some(Ok(actual))) => expected == actual,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{FailingBackend, InMemoryBackend, MemoryCache, RemoteCache};
    use crate::error::CacheError;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Price {
        sku: String,
        hourly: f64,
    }

    fn service_over(remote: RemoteCache) -> CacheService {
        let cache = MultiLevelCache::new(MemoryCache::new(100, Duration::from_secs(300)), remote);
        CacheService::new(cache).unwrap()
    }

    fn service() -> (CacheService, InMemoryBackend) {
        let backend = InMemoryBackend::new();
        let remote = RemoteCache::with_backend(backend.clone(), Duration::from_secs(1));
        (service_over(remote), backend)
    }

    fn ec2_args() -> KeyArgs {
        KeyArgs::new().part("aws").part("us-east-1").named("tier", "ec2")
    }

    #[tokio::test]
    async fn test_set_and_get_with_pattern() {
        let (service, backend) = service();
        let price = Price {
            sku: "t3.micro".to_string(),
            hourly: 0.0104,
        };

        assert!(service
            .set_with_pattern(PatternId::PricingData, &ec2_args(), &price)
            .await
            .unwrap());
        assert_eq!(backend.keys(), vec!["pricing:aws:us-east-1:tier:ec2".to_string()]);

        let cached: Option<Price> = service
            .get_with_pattern(PatternId::PricingData, &ec2_args())
            .await
            .unwrap();
        assert_eq!(cached, Some(price));
    }

    #[tokio::test]
    async fn test_unknown_pattern_fails_before_io() {
        let backend = InMemoryBackend::new();
        let remote = RemoteCache::with_backend(backend.clone(), Duration::from_secs(1));
        let cache = MultiLevelCache::new(MemoryCache::new(10, Duration::from_secs(60)), remote);
        let service = CacheService::with_patterns(cache, PatternRegistry::new());

        let result = service
            .set_with_pattern(PatternId::Analytics, &KeyArgs::new(), &1)
            .await;
        assert!(matches!(result, Err(CacheError::UnknownPattern(_))));

        let result = service
            .get_with_pattern::<u32>(PatternId::Analytics, &KeyArgs::new())
            .await;
        assert!(matches!(result, Err(CacheError::UnknownPattern(_))));

        let stats = service.get_performance_stats().await;
        assert_eq!(stats.cache.l1.counters, Default::default());
        assert_eq!(stats.cache.l2.counters, Default::default());
        assert!(backend.keys().is_empty());
    }

    #[tokio::test]
    async fn test_shape_mismatch_reads_as_absent() {
        let (service, _) = service();
        service
            .set_with_pattern(PatternId::Analytics, &KeyArgs::new().part("daily"), &"text")
            .await
            .unwrap();

        let cached = service
            .get_with_pattern::<Price>(PatternId::Analytics, &KeyArgs::new().part("daily"))
            .await
            .unwrap();
        assert_eq!(cached, None);
    }

    #[tokio::test]
    async fn test_invalidate_pattern_leaves_other_patterns() {
        let (service, backend) = service();
        let args = KeyArgs::new().part("x");

        service
            .set_with_pattern(PatternId::PricingData, &args, &1)
            .await
            .unwrap();
        service
            .set_with_pattern(PatternId::PricingData, &ec2_args(), &2)
            .await
            .unwrap();
        service
            .set_with_pattern(PatternId::RegionData, &args, &3)
            .await
            .unwrap();

        assert!(service
            .invalidate_pattern(PatternId::PricingData)
            .await
            .unwrap());
        assert_eq!(backend.keys(), vec!["region:x".to_string()]);

        let pricing: Option<u32> = service
            .get_with_pattern(PatternId::PricingData, &args)
            .await
            .unwrap();
        let region: Option<u32> = service
            .get_with_pattern(PatternId::RegionData, &args)
            .await
            .unwrap();
        assert_eq!(pricing, None);
        assert_eq!(region, Some(3));
    }

    #[tokio::test]
    async fn test_warm_seeds_cache() {
        let (service, _) = service();
        let args = KeyArgs::new().part("summary");

        let warmed = service
            .warm(PatternId::Analytics, &args, || Ok::<_, String>(vec![1, 2, 3]))
            .await
            .unwrap();
        assert!(warmed);

        let cached: Option<Vec<u32>> = service
            .get_with_pattern(PatternId::Analytics, &args)
            .await
            .unwrap();
        assert_eq!(cached, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_warm_loader_failure_is_reported_not_raised() {
        let (service, backend) = service();

        let warmed = service
            .warm(PatternId::Analytics, &KeyArgs::new(), || {
                Err::<u32, _>("source offline")
            })
            .await
            .unwrap();
        assert!(!warmed);
        assert!(backend.keys().is_empty());
    }

    #[tokio::test]
    async fn test_health_check_healthy_with_remote() {
        let (service, backend) = service();

        let report = service.health_check().await;
        assert_eq!(report.status, HealthStatus::Healthy);
        assert!(report.remote_connected);
        assert!(report.memory.passed());
        assert!(report.remote.passed());
        assert!(backend.keys().is_empty(), "health key must be removed");
    }

    #[tokio::test]
    async fn test_health_check_degraded_when_remote_calls_fail() {
        let remote = RemoteCache::with_backend(FailingBackend, Duration::from_secs(1));
        let service = service_over(remote);

        let report = service.health_check().await;
        assert_eq!(report.status, HealthStatus::Degraded);
        assert!(!report.remote_connected);
        assert!(report.memory.passed());
        assert_eq!(report.remote, TierCheck::default());
    }

    #[tokio::test]
    async fn test_health_check_without_client_matches_failing_remote() {
        let service = service_over(RemoteCache::disconnected());

        let report = service.health_check().await;
        assert_eq!(report.status, HealthStatus::Degraded);
        assert!(!report.remote_connected);
        assert!(report.memory.passed());
        assert_eq!(report.remote, TierCheck::default());
    }

    #[tokio::test]
    async fn test_health_check_unhealthy_when_nothing_works() {
        let cache = MultiLevelCache::new(
            MemoryCache::new(0, Duration::from_secs(60)),
            RemoteCache::disconnected(),
        );
        let service = CacheService::new(cache).unwrap();

        let report = service.health_check().await;
        assert_eq!(report.status, HealthStatus::Unhealthy);
        assert!(!report.memory.any_ok());
        assert!(!report.remote.any_ok());
    }

    #[tokio::test]
    async fn test_health_check_stays_out_of_aggregate_counters() {
        let (service, _) = service();

        service.health_check().await;
        service.health_check().await;

        let stats = service.get_performance_stats().await;
        assert_eq!(stats.cache.aggregate, Default::default());
        assert_eq!(stats.cache.l1.memory_usage, 0);
    }

    #[tokio::test]
    async fn test_performance_stats_lists_patterns() {
        let (service, _) = service();
        let stats = service.get_performance_stats().await;

        assert_eq!(stats.patterns.len(), PatternId::ALL.len());
        assert!(stats.cache.l2.connected);
        let json = serde_json::to_value(&stats).unwrap();
        assert!(json["cache"]["aggregate"]["hit_ratio"].is_number());
        assert!(json["cache"]["l1"]["memory_usage"].is_number());
    }
}
