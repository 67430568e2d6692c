//! Client configuration.
//!
//! Defaults point at the public messaging host. Every field can be
//! overridden from the environment (see [`ClientConfig::from_env`]); the
//! binary loads a `.env` file before reading it.

use std::env;
use std::time::Duration;

use thiserror::Error;

/// Messaging service host used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "https://forms-dev.winsor.edu";

const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a whole number of seconds, got {value:?}")]
    InvalidSeconds { var: &'static str, value: String },
}

/// What an authorized call does when there is no session at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthPolicy {
    /// Refuse the call with `AuthError::NotLoggedIn`.
    #[default]
    Strict,
    /// Report the missing session, then send the request with an empty
    /// bearer token and let the server reject it.
    Lenient,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub auth_policy: AuthPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            auth_policy: AuthPolicy::Strict,
        }
    }
}

impl ClientConfig {
    /// Configuration pointing at `base_url`, everything else default.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    /// Build a configuration from `MAILBOX_*` environment variables.
    ///
    /// - `MAILBOX_API_URL`: service host
    /// - `MAILBOX_TIMEOUT_SECS`: total request timeout
    /// - `MAILBOX_CONNECT_TIMEOUT_SECS`: connect timeout
    /// - `MAILBOX_LENIENT_AUTH`: `1`/`true` lets unauthenticated calls through
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("MAILBOX_API_URL") {
            config.base_url = url;
        }
        if let Some(secs) = seconds_var(&lookup, "MAILBOX_TIMEOUT_SECS")? {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = seconds_var(&lookup, "MAILBOX_CONNECT_TIMEOUT_SECS")? {
            config.connect_timeout = Duration::from_secs(secs);
        }
        if lookup("MAILBOX_LENIENT_AUTH").is_some_and(|flag| is_truthy(&flag)) {
            config.auth_policy = AuthPolicy::Lenient;
        }

        Ok(config)
    }
}

fn seconds_var<F>(lookup: &F, var: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidSeconds { var, value }),
        None => Ok(None),
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.auth_policy, AuthPolicy::Strict);
    }

    #[test]
    fn test_with_base_url_keeps_defaults() {
        let config = ClientConfig::with_base_url("http://localhost:3000");
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.auth_policy, AuthPolicy::Strict);
    }

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| vars.get(var).cloned()
    }

    #[test]
    fn test_lookup_without_vars_is_default() {
        let config = ClientConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.auth_policy, AuthPolicy::Strict);
    }

    #[test]
    fn test_lookup_overrides() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("MAILBOX_API_URL", "http://localhost:3000"),
            ("MAILBOX_TIMEOUT_SECS", " 30 "),
            ("MAILBOX_CONNECT_TIMEOUT_SECS", "2"),
            ("MAILBOX_LENIENT_AUTH", "true"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.auth_policy, AuthPolicy::Lenient);
    }

    #[test]
    fn test_lenient_flag_off_keeps_strict() {
        let config =
            ClientConfig::from_lookup(lookup_from(&[("MAILBOX_LENIENT_AUTH", "0")])).unwrap();
        assert_eq!(config.auth_policy, AuthPolicy::Strict);
    }

    #[test]
    fn test_invalid_seconds_is_config_error() {
        let err = ClientConfig::from_lookup(lookup_from(&[("MAILBOX_TIMEOUT_SECS", "abc")]))
            .unwrap_err();
        match err {
            ConfigError::InvalidSeconds { var, value } => {
                assert_eq!(var, "MAILBOX_TIMEOUT_SECS");
                assert_eq!(value, "abc");
            }
        }

        let err = ClientConfig::from_lookup(lookup_from(&[("MAILBOX_CONNECT_TIMEOUT_SECS", "-1")]));
        assert!(err.is_err());
    }

    #[test]
    fn test_is_truthy() {
        assert!(is_truthy("1"));
        assert!(is_truthy(" TRUE "));
        assert!(is_truthy("yes"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("false"));
        assert!(!is_truthy(""));
    }
}
