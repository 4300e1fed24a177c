//! Restart policy for recognition sessions that end on their own.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Bounded exponential backoff for restarting a recognition session that
/// ended on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct RestartPolicy {
    /// Consecutive restarts allowed before giving up. A transcript resets
    /// the count.
    pub max_restarts: u32,
    pub base_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self {
            max_restarts: 5,
            base_backoff_ms: 250,
            max_backoff_ms: 4_000,
        }
    }
}

impl RestartPolicy {
    pub fn normalize(&mut self) {
        self.max_restarts = self.max_restarts.min(20);
        self.base_backoff_ms = self.base_backoff_ms.clamp(10, 10_000);
        self.max_backoff_ms = self.max_backoff_ms.clamp(self.base_backoff_ms, 60_000);
    }

    /// Whether restart number `attempt` (1-based) is still allowed.
    pub fn allows(&self, attempt: u32) -> bool {
        attempt >= 1 && attempt <= self.max_restarts
    }

    /// Delay before restart number `attempt` (1-based):
    /// `base * 2^(attempt - 1)`, capped at `max_backoff_ms`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let ms = self
            .base_backoff_ms
            .saturating_mul(1u64 << exponent)
            .min(self.max_backoff_ms);
        Duration::from_millis(ms)
    }
}
