//! Cache Patterns
//!
//! Named caching policies: how long a class of data lives, which prefix its
//! keys carry, and which glob purges it.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

use crate::error::{CacheError, Result};

// == Pattern Id ==
/// The closed set of cached data classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternId {
    PricingData,
    CalculationResults,
    UserSessions,
    Analytics,
    RegionData,
}

impl PatternId {
    pub const ALL: [PatternId; 5] = [
        PatternId::PricingData,
        PatternId::CalculationResults,
        PatternId::UserSessions,
        PatternId::Analytics,
        PatternId::RegionData,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PatternId::PricingData => "pricing_data",
            PatternId::CalculationResults => "calculation_results",
            PatternId::UserSessions => "user_sessions",
            PatternId::Analytics => "analytics",
            PatternId::RegionData => "region_data",
        }
    }
}

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatternId {
    type Err = CacheError;

    fn from_str(name: &str) -> Result<Self> {
        PatternId::ALL
            .into_iter()
            .find(|id| id.as_str() == name)
            .ok_or_else(|| CacheError::UnknownPattern(name.to_string()))
    }
}

// == Cache Pattern ==
/// Policy for one class of cached data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePattern {
    ttl: Duration,
    key_prefix: String,
    invalidation_glob: String,
}

impl CachePattern {
    /// Validates and builds a pattern.
    ///
    /// The TTL must be non-zero, the prefix non-empty and free of glob
    /// metacharacters, and the glob must match keys derived from the prefix.
    pub fn new(
        ttl: Duration,
        key_prefix: impl Into<String>,
        invalidation_glob: impl Into<String>,
    ) -> Result<Self> {
        let key_prefix = key_prefix.into();
        let invalidation_glob = invalidation_glob.into();

        if ttl.is_zero() {
            return Err(CacheError::InvalidPattern(format!(
                "{key_prefix}: ttl must be greater than zero"
            )));
        }
        if key_prefix.is_empty() || key_prefix.contains(['*', '?', '[', ']']) {
            return Err(CacheError::InvalidPattern(format!(
                "invalid key prefix '{key_prefix}'"
            )));
        }

        let glob = glob::Pattern::new(&invalidation_glob).map_err(|e| {
            CacheError::InvalidPattern(format!("{invalidation_glob}: {e}"))
        })?;
        if !glob.matches(&format!("{key_prefix}:sample")) {
            return Err(CacheError::InvalidPattern(format!(
                "glob '{invalidation_glob}' does not cover keys under '{key_prefix}'"
            )));
        }

        Ok(Self {
            ttl,
            key_prefix,
            invalidation_glob,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    pub fn invalidation_glob(&self) -> &str {
        &self.invalidation_glob
    }
}

/// Serializable view of a registered pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternSummary {
    pub name: PatternId,
    pub ttl_secs: u64,
    pub key_prefix: String,
    pub invalidation_glob: String,
}

// == Pattern Registry ==
/// Pattern table, filled before traffic starts and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct PatternRegistry {
    patterns: BTreeMap<PatternId, CachePattern>,
}

impl PatternRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a pattern. Each id can be registered once.
    pub fn register(&mut self, id: PatternId, pattern: CachePattern) -> Result<()> {
        if self.patterns.contains_key(&id) {
            return Err(CacheError::InvalidPattern(format!("{id} is already registered")));
        }
        self.patterns.insert(id, pattern);
        Ok(())
    }

    pub fn get(&self, id: PatternId) -> Result<&CachePattern> {
        self.patterns
            .get(&id)
            .ok_or_else(|| CacheError::UnknownPattern(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn summaries(&self) -> Vec<PatternSummary> {
        self.patterns
            .iter()
            .map(|(id, pattern)| PatternSummary {
                name: *id,
                ttl_secs: pattern.ttl.as_secs(),
                key_prefix: pattern.key_prefix.clone(),
                invalidation_glob: pattern.invalidation_glob.clone(),
            })
            .collect()
    }
}

// == Default Table ==
/// `(id, ttl seconds, prefix, glob)` for every built-in pattern.
const DEFAULT_PATTERNS: [(PatternId, u64, &str, &str); 5] = [
    (PatternId::PricingData, 3600, "pricing", "pricing:*"),
    (PatternId::CalculationResults, 1800, "calc", "calc:*"),
    (PatternId::UserSessions, 86_400, "session", "session:*"),
    (PatternId::Analytics, 300, "analytics", "analytics:*"),
    (PatternId::RegionData, 7200, "region", "region:*"),
];

/// Builds the registry of built-in patterns.
pub fn configure_patterns() -> Result<PatternRegistry> {
    let mut registry = PatternRegistry::new();
    for (id, ttl, prefix, glob) in DEFAULT_PATTERNS {
        registry.register(id, CachePattern::new(Duration::from_secs(ttl), prefix, glob)?)?;
    }
    Ok(registry)
}
