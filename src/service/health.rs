//! Health and performance reports pulled by monitoring.

use serde::Serialize;

use crate::cache::MultiLevelStats;
use crate::service::PatternSummary;

// == Health Status ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    /// Classifies the two legs of a set → get → delete round trip.
    ///
    /// Healthy needs both tiers to pass. Nothing succeeding on either tier
    /// is unhealthy, anything else is degraded. A remote tier with no client
    /// fails its leg like one whose every call fails.
    pub fn classify(memory: &TierCheck, remote: &TierCheck) -> Self {
        if memory.passed() && remote.passed() {
            HealthStatus::Healthy
        } else if !memory.any_ok() && !remote.any_ok() {
            HealthStatus::Unhealthy
        } else {
            HealthStatus::Degraded
        }
    }
}

// == Tier Check ==
/// Outcome of one tier's leg of the health check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierCheck {
    pub set_ok: bool,
    pub get_ok: bool,
    pub delete_ok: bool,
    /// Read-back serialized identically to what was written
    pub value_matches: bool,
}

impl TierCheck {
    pub fn passed(&self) -> bool {
        self.set_ok && self.get_ok && self.delete_ok && self.value_matches
    }

    pub fn any_ok(&self) -> bool {
        self.set_ok || self.get_ok || self.delete_ok
    }
}

// == Health Report ==
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub memory: TierCheck,
    pub remote: TierCheck,
    /// True only when the remote leg of the check passed
    pub remote_connected: bool,
    /// RFC 3339 time of the check
    pub timestamp: String,
}

// == Performance Stats ==
/// Everything monitoring needs in one snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceStats {
    pub cache: MultiLevelStats,
    pub patterns: Vec<PatternSummary>,
    pub timestamp: String,
}
