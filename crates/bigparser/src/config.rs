//! Client configuration and per-call options
//!
//! [`ClientConfig`] is resolved once (usually from the process environment)
//! and never changes afterwards. [`RequestOptions`] is the per-call bag that
//! picks the credential, the host and the path shape.

use std::time::Duration;
use tracing::warn;

pub const PRODUCTION_HOST: &str = "https://www.bigparser.com";
pub const QA_HOST: &str = "https://qa.bigparser.com";

/// Default request timeout, matching the other HTTP clients in this workspace
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const AUTH_ENV: &str = "BP_AUTH";
pub const PRODUCTION_HOST_ENV: &str = "BP_PRODUCTION_HOST";
pub const QA_HOST_ENV: &str = "BP_QA_HOST";
pub const TIMEOUT_ENV: &str = "BP_TIMEOUT_SECS";

/// Which deployment of the service a call targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Production,
    Qa,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Credential sent as `authId` when a call does not override it
    pub default_auth_id: String,
    pub production_host: String,
    pub qa_host: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_auth_id: String::new(),
            production_host: PRODUCTION_HOST.to_string(),
            qa_host: QA_HOST.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new(default_auth_id: impl Into<String>) -> Self {
        Self {
            default_auth_id: default_auth_id.into(),
            ..Self::default()
        }
    }

    /// Read configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// Unset or empty values fall back to the defaults. An unparsable
    /// timeout is ignored with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        match get(AUTH_ENV) {
            Some(auth_id) => config.default_auth_id = auth_id,
            None => warn!(
                "[ClientConfig] {} is not set; calls without an explicit authId will be rejected by the service",
                AUTH_ENV
            ),
        }
        if let Some(host) = get(PRODUCTION_HOST_ENV) {
            config.production_host = host;
        }
        if let Some(host) = get(QA_HOST_ENV) {
            config.qa_host = host;
        }
        if let Some(raw) = get(TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => config.timeout = Duration::from_secs(secs),
                Err(e) => warn!(
                    "[ClientConfig] Ignoring {}={:?}: {}",
                    TIMEOUT_ENV, raw, e
                ),
            }
        }

        config
    }

    pub fn with_hosts(mut self, production: impl Into<String>, qa: impl Into<String>) -> Self {
        self.production_host = production.into();
        self.qa_host = qa.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Host for the given environment, without a trailing slash
    pub fn host(&self, environment: Environment) -> &str {
        let host = match environment {
            Environment::Production => &self.production_host,
            Environment::Qa => &self.qa_host,
        };
        host.trim_end_matches('/')
    }
}

/// Per-call overrides
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Overrides [`ClientConfig::default_auth_id`] for this call
    pub auth_id: Option<String>,
    /// Routes the call through `/share/<view_id>/` instead of the direct path
    pub view_id: Option<String>,
    /// Targets the QA host instead of production
    pub qa: bool,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn auth_id(mut self, auth_id: impl Into<String>) -> Self {
        self.auth_id = Some(auth_id.into());
        self
    }

    pub fn view_id(mut self, view_id: impl Into<String>) -> Self {
        self.view_id = Some(view_id.into());
        self
    }

    pub fn qa(mut self, qa: bool) -> Self {
        self.qa = qa;
        self
    }

    pub fn environment(&self) -> Environment {
        if self.qa {
            Environment::Qa
        } else {
            Environment::Production
        }
    }

    /// Credential for this call: the override if present, else the default
    pub fn resolve_auth_id<'a>(&'a self, config: &'a ClientConfig) -> &'a str {
        self.auth_id.as_deref().unwrap_or(&config.default_auth_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = ClientConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.host(Environment::Production), PRODUCTION_HOST);
        assert_eq!(config.host(Environment::Qa), QA_HOST);
    }

    #[test]
    fn test_reads_all_keys() {
        let config = ClientConfig::from_lookup(lookup(&[
            (AUTH_ENV, "secret"),
            (PRODUCTION_HOST_ENV, "http://127.0.0.1:9000/"),
            (QA_HOST_ENV, "http://127.0.0.1:9001"),
            (TIMEOUT_ENV, "5"),
        ]));
        assert_eq!(config.default_auth_id, "secret");
        assert_eq!(config.host(Environment::Production), "http://127.0.0.1:9000");
        assert_eq!(config.host(Environment::Qa), "http://127.0.0.1:9001");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_bad_timeout_keeps_default() {
        let config = ClientConfig::from_lookup(lookup(&[(TIMEOUT_ENV, "soon")]));
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_auth_override_wins() {
        let config = ClientConfig::new("default");
        assert_eq!(RequestOptions::new().resolve_auth_id(&config), "default");
        assert_eq!(
            RequestOptions::new().auth_id("X").resolve_auth_id(&config),
            "X"
        );
    }

    #[test]
    fn test_qa_flag_selects_environment() {
        assert_eq!(RequestOptions::new().environment(), Environment::Production);
        assert_eq!(RequestOptions::new().qa(true).environment(), Environment::Qa);
    }
}
