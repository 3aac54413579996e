use std::time::Duration;

use tracing::warn;

const SETTLE_DELAY_ENV: &str = "GRANTOR_SETTLE_DELAY_MS";
const LIVENESS_INTERVAL_ENV: &str = "GRANTOR_LIVENESS_INTERVAL_MS";
const STRICT_ENV: &str = "GRANTOR_STRICT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantorConfig {
    /// Pause after the last settings screen returns, before the authority is
    /// queried again. Some devices report the new grant late.
    pub settle_delay: Duration,
    /// How often a request suspended on the host re-checks that the host is alive.
    pub liveness_interval: Duration,
    /// Reject duplicate capabilities and missing prerequisites instead of
    /// tolerating them.
    pub strict: bool,
}

impl Default for GrantorConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(200),
            liveness_interval: Duration::from_millis(500),
            strict: false,
        }
    }
}

impl GrantorConfig {
    /// Defaults overlaid with `GRANTOR_*` environment variables. Malformed
    /// values are logged and skipped.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(ms) = parse_millis(SETTLE_DELAY_ENV, lookup(SETTLE_DELAY_ENV)) {
            config.settle_delay = ms;
        }
        if let Some(ms) = parse_millis(LIVENESS_INTERVAL_ENV, lookup(LIVENESS_INTERVAL_ENV)) {
            config.liveness_interval = ms;
        }
        if let Some(strict) = parse_flag(STRICT_ENV, lookup(STRICT_ENV)) {
            config.strict = strict;
        }
        config
    }
}

fn parse_millis(key: &str, raw: Option<String>) -> Option<Duration> {
    let raw = raw?;
    match raw.trim().parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(err) => {
            warn!(key, value = %raw, %err, "ignoring malformed config override");
            None
        }
    }
}

fn parse_flag(key: &str, raw: Option<String>) -> Option<bool> {
    let raw = raw?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            warn!(key, value = %raw, "ignoring malformed config override");
            None
        }
    }
}
