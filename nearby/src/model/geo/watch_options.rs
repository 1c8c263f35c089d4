use std::time::Duration;

use serde::{Deserialize, Serialize};

/// options handed to the platform's continuous position capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchOptions {
    pub enable_high_accuracy: bool,
    /// oldest cached fix the platform may report, in milliseconds. enforced by
    /// the provider
    pub maximum_age_ms: u64,
    /// time allowed for the first fix after the watch opens, in milliseconds
    pub timeout_ms: u64,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            maximum_age_ms: 5_000,
            timeout_ms: 15_000,
        }
    }
}

impl WatchOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
