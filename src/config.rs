// src/config.rs
// =============================================================================
// Runtime settings for an Analyzer.
//
// Defaults cover the common case. `from_env` lets a host override them with
// PAGE_ANALYZER_* variables (a .env file is honored), and the CLI applies its
// flags on top of whatever the environment produced.
// =============================================================================

use serde::Deserialize;
use std::time::Duration;

use crate::error::ConfigError;

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzerConfig {
    /// Maximum number of link probes in flight at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-link probe timeout, in milliseconds
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    /// Timeout for the page fetch itself, in milliseconds
    #[serde(default = "default_page_timeout_ms")]
    pub page_timeout_ms: u64,

    /// Overall budget for one analysis, in milliseconds. None = no deadline.
    #[serde(default)]
    pub deadline_ms: Option<u64>,

    /// Largest page body we are willing to read
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_concurrency() -> usize { 10 }
fn default_probe_timeout_ms() -> u64 { 5_000 }
fn default_page_timeout_ms() -> u64 { 15_000 }
fn default_max_body_bytes() -> usize { 10 * 1024 * 1024 }
fn default_max_redirects() -> usize { 5 }
fn default_user_agent() -> String {
    format!("page-analyzer/{}", env!("CARGO_PKG_VERSION"))
}

impl AnalyzerConfig {
    /// Builds a config from PAGE_ANALYZER_* variables, falling back to the
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = AnalyzerConfig::default();

        if let Some(v) = parse_var(&lookup, "PAGE_ANALYZER_CONCURRENCY")? {
            config.concurrency = v;
        }
        if let Some(v) = parse_var(&lookup, "PAGE_ANALYZER_PROBE_TIMEOUT_MS")? {
            config.probe_timeout_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "PAGE_ANALYZER_PAGE_TIMEOUT_MS")? {
            config.page_timeout_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "PAGE_ANALYZER_DEADLINE_MS")? {
            config.deadline_ms = Some(v);
        }
        if let Some(v) = parse_var(&lookup, "PAGE_ANALYZER_MAX_BODY_BYTES")? {
            config.max_body_bytes = v;
        }
        if let Some(v) = parse_var(&lookup, "PAGE_ANALYZER_MAX_REDIRECTS")? {
            config.max_redirects = v;
        }
        if let Some(v) = lookup("PAGE_ANALYZER_USER_AGENT") {
            config.user_agent = v;
        }

        config.validate()?;
        Ok(config)
    }

    /// A zero concurrency limit would stall the verifier forever.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError {
                key: "PAGE_ANALYZER_CONCURRENCY",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_millis(self.page_timeout_ms)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            concurrency: default_concurrency(),
            probe_timeout_ms: default_probe_timeout_ms(),
            page_timeout_ms: default_page_timeout_ms(),
            deadline_ms: None,
            max_body_bytes: default_max_body_bytes(),
            max_redirects: default_max_redirects(),
            user_agent: default_user_agent(),
        }
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let Some(value) = lookup(key) else {
        return Ok(None);
    };
    let parsed = value.trim().parse::<T>();
    match parsed {
        Ok(v) => Ok(Some(v)),
        Err(e) => Err(ConfigError {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = AnalyzerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.concurrency, 10);
        assert_eq!(config.probe_timeout(), Duration::from_secs(5));
        assert_eq!(config.deadline(), None);
        assert!(config.user_agent.starts_with("page-analyzer/"));
    }

    #[test]
    fn test_overrides_from_env() {
        let config = AnalyzerConfig::from_lookup(lookup_from(&[
            ("PAGE_ANALYZER_CONCURRENCY", "4"),
            ("PAGE_ANALYZER_DEADLINE_MS", " 30000 "),
            ("PAGE_ANALYZER_USER_AGENT", "audit-bot"),
        ]))
        .unwrap();
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.deadline(), Some(Duration::from_secs(30)));
        assert_eq!(config.user_agent, "audit-bot");
    }

    #[test]
    fn test_rejects_garbage_and_zero() {
        let err = AnalyzerConfig::from_lookup(lookup_from(&[("PAGE_ANALYZER_PROBE_TIMEOUT_MS", "soon")]))
            .unwrap_err();
        assert_eq!(err.key, "PAGE_ANALYZER_PROBE_TIMEOUT_MS");

        let err = AnalyzerConfig::from_lookup(lookup_from(&[("PAGE_ANALYZER_CONCURRENCY", "0")]))
            .unwrap_err();
        assert_eq!(err.key, "PAGE_ANALYZER_CONCURRENCY");
    }
}
