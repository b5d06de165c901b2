//! Shop queue configuration.
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `SHOPQ_USE_QUEUE` | `true` | `false` serves every request inline |
//! | `SHOPQ_POLL_INTERVAL_MS` | 150 | Caller poll interval (ms) |
//! | `SHOPQ_RESULT_TTL_SECS` | 600 | Unclaimed result lifetime, `0` keeps forever, capped at one year |
//! | `SHOPQ_WAIT_TIMEOUT_SECS` | 0 | Caller wait limit, `0` waits forever |

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

const DEFAULT_POLL_INTERVAL_MS: u64 = 150;
const DEFAULT_RESULT_TTL_SECS: u64 = 600;

/// Longest result TTL. The expiry timer wheel rejects deadlines past
/// roughly two years.
pub const MAX_RESULT_TTL_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct QueueConfig {
    /// Route cache misses through the queue. When off, every request is a
    /// synchronous passthrough to the provider.
    pub enabled: bool,
    pub poll_interval_ms: u64,
    pub result_ttl_secs: Option<u64>,
    pub wait_timeout_secs: Option<u64>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            result_ttl_secs: Some(DEFAULT_RESULT_TTL_SECS),
            wait_timeout_secs: None,
        }
    }
}

impl QueueConfig {
    /// Load from `SHOPQ_*` environment variables. Invalid values fall back
    /// to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let enabled = lookup("SHOPQ_USE_QUEUE")
            .and_then(|v| parse_bool(&v))
            .unwrap_or(defaults.enabled);
        let poll_interval_ms = parse_u64(&lookup, "SHOPQ_POLL_INTERVAL_MS")
            .unwrap_or(defaults.poll_interval_ms)
            .max(1);
        let result_ttl_secs = match parse_u64(&lookup, "SHOPQ_RESULT_TTL_SECS") {
            Some(0) => None,
            Some(secs) if secs > MAX_RESULT_TTL_SECS => {
                warn!(
                    requested_secs = secs,
                    max_secs = MAX_RESULT_TTL_SECS,
                    "SHOPQ_RESULT_TTL_SECS too large, capping"
                );
                Some(MAX_RESULT_TTL_SECS)
            }
            Some(secs) => Some(secs),
            None => defaults.result_ttl_secs,
        };
        let wait_timeout_secs = parse_u64(&lookup, "SHOPQ_WAIT_TIMEOUT_SECS").filter(|s| *s > 0);

        Self {
            enabled,
            poll_interval_ms,
            result_ttl_secs,
            wait_timeout_secs,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Never longer than [`MAX_RESULT_TTL_SECS`], whatever was deserialized.
    pub fn result_ttl(&self) -> Option<Duration> {
        self.result_ttl_secs
            .filter(|s| *s > 0)
            .map(|s| Duration::from_secs(s.min(MAX_RESULT_TTL_SECS)))
    }

    pub fn wait_timeout(&self) -> Option<Duration> {
        self.wait_timeout_secs
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
    }
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    lookup(key).and_then(|v| v.trim().parse::<u64>().ok())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
