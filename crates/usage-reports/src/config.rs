//! Configuration for the Usage Reports client and snapshot reads.

use std::num::NonZeroUsize;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Environment variable for the IAM API key.
pub const ENV_API_KEY: &str = "IC_API_KEY";
/// Environment variable for a pre-issued IAM bearer token.
pub const ENV_IAM_TOKEN: &str = "IC_IAM_TOKEN";
/// Environment variable for the account whose snapshots are listed.
pub const ENV_ACCOUNT_ID: &str = "IC_ACCOUNT_ID";
/// Environment variable overriding the Usage Reports endpoint.
pub const ENV_USAGE_REPORTS_ENDPOINT: &str = "IBMCLOUD_USAGE_REPORTS_API_ENDPOINT";
/// Environment variable overriding the IAM endpoint.
pub const ENV_IAM_ENDPOINT: &str = "IBMCLOUD_IAM_API_ENDPOINT";
/// Environment variable for the page size.
pub const ENV_PAGE_LIMIT: &str = "IC_USAGE_REPORTS_PAGE_LIMIT";
/// Environment variable for the pagination safety bound.
pub const ENV_MAX_PAGES: &str = "IC_USAGE_REPORTS_MAX_PAGES";
/// Environment variable for the HTTP timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "IC_USAGE_REPORTS_TIMEOUT_SECS";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A URL setting could not be parsed.
    #[error("Invalid URL in {name}: {source}")]
    InvalidUrl {
        name: &'static str,
        #[source]
        source: url::ParseError,
    },

    /// A numeric setting could not be parsed.
    #[error("Invalid value for {name}: {value}")]
    InvalidNumber { name: &'static str, value: String },
}

/// Settings for reaching the Usage Reports API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageReportsConfig {
    /// IAM API key, exchanged for a bearer token.
    pub api_key: Option<String>,
    /// Pre-issued bearer token; skips the IAM exchange when set.
    pub bearer_token: Option<String>,
    /// Account whose snapshots are listed.
    pub account_id: Option<String>,
    /// Usage Reports endpoint; `None` uses the public one.
    pub base_url: Option<Url>,
    /// IAM endpoint; `None` uses the public one.
    pub iam_url: Option<Url>,
    /// Page size sent as `_limit`.
    pub page_limit: Option<u32>,
    /// Upper bound on pages per read. `None` follows the server until it stops.
    pub max_pages: Option<NonZeroUsize>,
    pub timeout: Option<Duration>,
}

impl UsageReportsConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a URL or numeric variable is malformed. Missing
    /// credentials are reported later, when a session is created.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a URL or numeric value is malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut config = Self {
            api_key: get(ENV_API_KEY),
            bearer_token: get(ENV_IAM_TOKEN),
            account_id: get(ENV_ACCOUNT_ID),
            ..Self::default()
        };

        if let Some(url) = get(ENV_USAGE_REPORTS_ENDPOINT) {
            config.base_url = Some(parse_url(ENV_USAGE_REPORTS_ENDPOINT, &url)?);
        }
        if let Some(url) = get(ENV_IAM_ENDPOINT) {
            config.iam_url = Some(parse_url(ENV_IAM_ENDPOINT, &url)?);
        }
        if let Some(value) = get(ENV_PAGE_LIMIT) {
            config.page_limit = Some(parse_number(ENV_PAGE_LIMIT, &value)?);
        }
        if let Some(value) = get(ENV_MAX_PAGES) {
            config.max_pages = Some(parse_number(ENV_MAX_PAGES, &value)?);
        }
        if let Some(value) = get(ENV_TIMEOUT_SECS) {
            config.timeout = Some(Duration::from_secs(parse_number(ENV_TIMEOUT_SECS, &value)?));
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    #[must_use]
    pub fn with_iam_url(mut self, iam_url: Url) -> Self {
        self.iam_url = Some(iam_url);
        self
    }
}

fn parse_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl { name, source })
}

fn parse_number<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        name,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = UsageReportsConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, UsageReportsConfig::default());
        assert!(config.base_url.is_none());
        assert!(config.iam_url.is_none());
        assert!(config.max_pages.is_none());
    }

    #[test]
    fn test_reads_all_variables() {
        let config = UsageReportsConfig::from_lookup(lookup(&[
            (ENV_API_KEY, "key"),
            (ENV_ACCOUNT_ID, "acc-123"),
            (ENV_USAGE_REPORTS_ENDPOINT, "http://localhost:9000"),
            (ENV_PAGE_LIMIT, "30"),
            (ENV_MAX_PAGES, "5"),
            (ENV_TIMEOUT_SECS, "10"),
        ]))
        .unwrap();

        assert_eq!(config.api_key.as_deref(), Some("key"));
        assert_eq!(config.account_id.as_deref(), Some("acc-123"));
        assert_eq!(
            config.base_url.as_ref().map(Url::as_str),
            Some("http://localhost:9000/")
        );
        assert_eq!(config.page_limit, Some(30));
        assert_eq!(config.max_pages, NonZeroUsize::new(5));
        assert_eq!(config.timeout, Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config =
            UsageReportsConfig::from_lookup(lookup(&[(ENV_ACCOUNT_ID, "  "), (ENV_IAM_TOKEN, "")]))
                .unwrap();
        assert!(config.account_id.is_none());
        assert!(config.bearer_token.is_none());
    }

    #[test]
    fn test_rejects_bad_number() {
        let err = UsageReportsConfig::from_lookup(lookup(&[(ENV_MAX_PAGES, "many")])).unwrap_err();
        assert!(err.to_string().contains(ENV_MAX_PAGES));
    }

    #[test]
    fn test_rejects_zero_max_pages() {
        let err = UsageReportsConfig::from_lookup(lookup(&[(ENV_MAX_PAGES, "0")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidNumber { name: ENV_MAX_PAGES, .. }
        ));
    }

    #[test]
    fn test_rejects_bad_url() {
        let err =
            UsageReportsConfig::from_lookup(lookup(&[(ENV_IAM_ENDPOINT, "not a url")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }
}
