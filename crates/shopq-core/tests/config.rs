use std::{collections::HashMap, time::Duration};

use shopq_core::{QueueConfig, config::MAX_RESULT_TTL_SECS};

fn from_vars(vars: &[(&str, &str)]) -> QueueConfig {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    QueueConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn defaults_without_env() {
    let config = from_vars(&[]);

    assert_eq!(config, QueueConfig::default());
    assert!(config.enabled);
    assert_eq!(config.poll_interval(), Duration::from_millis(150));
    assert_eq!(config.result_ttl(), Some(Duration::from_secs(600)));
    assert_eq!(config.wait_timeout(), None);
}

#[test]
fn env_overrides() {
    let config = from_vars(&[
        ("SHOPQ_USE_QUEUE", "false"),
        ("SHOPQ_POLL_INTERVAL_MS", "500"),
        ("SHOPQ_RESULT_TTL_SECS", "30"),
        ("SHOPQ_WAIT_TIMEOUT_SECS", "90"),
    ]);

    assert!(!config.enabled);
    assert_eq!(config.poll_interval(), Duration::from_millis(500));
    assert_eq!(config.result_ttl(), Some(Duration::from_secs(30)));
    assert_eq!(config.wait_timeout(), Some(Duration::from_secs(90)));
}

#[test]
fn zero_disables_ttl_and_timeout() {
    let config = from_vars(&[
        ("SHOPQ_RESULT_TTL_SECS", "0"),
        ("SHOPQ_WAIT_TIMEOUT_SECS", "0"),
    ]);

    assert_eq!(config.result_ttl(), None);
    assert_eq!(config.wait_timeout(), None);
}

#[test]
fn invalid_values_fall_back_to_defaults() {
    let config = from_vars(&[
        ("SHOPQ_USE_QUEUE", "maybe"),
        ("SHOPQ_POLL_INTERVAL_MS", "fast"),
        ("SHOPQ_RESULT_TTL_SECS", "-5"),
    ]);

    assert_eq!(config, QueueConfig::default());
}

#[test]
fn poll_interval_is_never_zero() {
    let config = from_vars(&[("SHOPQ_POLL_INTERVAL_MS", "0")]);
    assert_eq!(config.poll_interval(), Duration::from_millis(1));
}

#[test]
fn oversized_result_ttl_is_capped() {
    let config = from_vars(&[("SHOPQ_RESULT_TTL_SECS", "100000000")]);

    assert_eq!(config.result_ttl_secs, Some(MAX_RESULT_TTL_SECS));
    assert_eq!(
        config.result_ttl(),
        Some(Duration::from_secs(MAX_RESULT_TTL_SECS))
    );

    let built = QueueConfig {
        result_ttl_secs: Some(u64::MAX),
        ..QueueConfig::default()
    };
    assert_eq!(
        built.result_ttl(),
        Some(Duration::from_secs(MAX_RESULT_TTL_SECS))
    );
}
