//! Explore/exploit attempt statistics
//!
//! Per-phase counters reset at each [`RunStats::begin_phase`]; lifetime
//! counters persist across phases and drive the run-level explore budget.

use serde::{Deserialize, Serialize};

/// Counters for explore/exploit attempts and successes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    phase: String,
    /// Exploit passes attempted in the current phase
    pub exploit_attempts: u32,
    /// Exploit passes that found a consistent derivation, current phase
    pub exploit_successes: u32,
    /// Explore passes attempted in the current phase
    pub explore_attempts: u32,
    /// Explore passes that found a consistent derivation, current phase
    pub explore_successes: u32,
    /// Exploit passes attempted over the whole run
    pub lifetime_exploit_attempts: u32,
    /// Exploit successes over the whole run
    pub lifetime_exploit_successes: u32,
    /// Explore passes attempted over the whole run
    pub lifetime_explore_attempts: u32,
    /// Explore successes over the whole run
    pub lifetime_explore_successes: u32,
}

impl RunStats {
    /// Create zeroed stats with no phase
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a named phase (e.g. `"0.train"`), resetting phase counters
    ///
    /// Lifetime counters are untouched.
    pub fn begin_phase(&mut self, name: &str) {
        self.phase = name.to_string();
        self.exploit_attempts = 0;
        self.exploit_successes = 0;
        self.explore_attempts = 0;
        self.explore_successes = 0;
        tracing::debug!(phase = name, "run stats reset");
    }

    /// Name of the current phase
    pub fn phase(&self) -> &str {
        &self.phase
    }

    /// Record an exploit pass
    pub fn record_exploit(&mut self, success: bool) {
        self.exploit_attempts += 1;
        self.lifetime_exploit_attempts += 1;
        if success {
            self.exploit_successes += 1;
            self.lifetime_exploit_successes += 1;
        }
    }

    /// Record an explore pass
    pub fn record_explore(&mut self, success: bool) {
        self.explore_attempts += 1;
        self.lifetime_explore_attempts += 1;
        if success {
            self.explore_successes += 1;
            self.lifetime_explore_successes += 1;
        }
    }

    /// Human-readable success-rate summary for the current phase
    pub fn summary(&self) -> String {
        format!(
            "phase {}: exploit {}/{}, explore {}/{} (lifetime exploit {}/{}, explore {}/{})",
            if self.phase.is_empty() { "-" } else { &self.phase },
            self.exploit_successes,
            self.exploit_attempts,
            self.explore_successes,
            self.explore_attempts,
            self.lifetime_exploit_successes,
            self.lifetime_exploit_attempts,
            self.lifetime_explore_successes,
            self.lifetime_explore_attempts,
        )
    }
}
