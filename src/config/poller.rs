//! Configuration for credit event polling.

use serde::{Deserialize, Serialize};

/// Configuration for the credit notification poller.
///
/// The defaults are the standard profile; [`PollerConfig::production`] widens
/// the timings and enables the circuit breaker the way the deployed
/// storefront runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Whether polling is enabled
    pub enabled: bool,
    /// Seconds between poll cycles
    pub interval_seconds: u64,
    /// Timeout for each fetch request
    pub timeout_seconds: u64,
    /// Delay before the one-shot initial poll after sign-in
    pub initial_delay_ms: u64,
    /// Consecutive fetch failures before polling is disabled for the session
    pub max_consecutive_errors: u32,
    /// Whether the circuit breaker is active (production profile)
    pub breaker_enabled: bool,
    /// Consecutive failures before the breaker opens
    pub breaker_failure_threshold: u32,
    /// Seconds the breaker stays open before allowing a probe
    pub breaker_recovery_seconds: u64,
    /// Seconds between processed-log cleanup passes
    pub cleanup_interval_seconds: u64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 30,
            timeout_seconds: 10,
            initial_delay_ms: 1000,
            max_consecutive_errors: 5,
            breaker_enabled: false,
            breaker_failure_threshold: 3,
            breaker_recovery_seconds: 300,
            cleanup_interval_seconds: 600,
        }
    }
}

impl PollerConfig {
    /// The production profile: wider interval and timeout, a longer initial
    /// delay, and the circuit breaker active.
    pub fn production() -> Self {
        let mut config = Self::default();
        config.apply_production_profile();
        config
    }

    /// Widen this configuration to the production timings in place.
    pub fn apply_production_profile(&mut self) {
        self.interval_seconds = 45;
        self.timeout_seconds = 15;
        self.initial_delay_ms = 2000;
        self.breaker_enabled = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poller_config_default_values() {
        let config = PollerConfig::default();
        assert!(config.enabled);
        assert_eq!(config.interval_seconds, 30);
        assert_eq!(config.timeout_seconds, 10);
        assert_eq!(config.initial_delay_ms, 1000);
        assert_eq!(config.max_consecutive_errors, 5);
        assert!(!config.breaker_enabled);
        assert_eq!(config.breaker_failure_threshold, 3);
        assert_eq!(config.breaker_recovery_seconds, 300);
        assert_eq!(config.cleanup_interval_seconds, 600);
    }

    #[test]
    fn test_production_profile() {
        let config = PollerConfig::production();
        assert_eq!(config.interval_seconds, 45);
        assert_eq!(config.timeout_seconds, 15);
        assert_eq!(config.initial_delay_ms, 2000);
        assert!(config.breaker_enabled);
        // Unchanged by the profile
        assert_eq!(config.max_consecutive_errors, 5);
        assert_eq!(config.breaker_failure_threshold, 3);
        assert_eq!(config.breaker_recovery_seconds, 300);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml = r#"
            interval_seconds = 5
        "#;
        let config: PollerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.interval_seconds, 5);
        assert_eq!(config.timeout_seconds, 10);
        assert!(config.enabled);
    }
}
