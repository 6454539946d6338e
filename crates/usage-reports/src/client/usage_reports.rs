//! Usage Reports v4 API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use super::models::{GetReportsSnapshotOptions, SnapshotList, UsageReportsError};
use super::traits::{ClientError, SnapshotSource};

/// Default Usage Reports API endpoint.
pub const USAGE_REPORTS_API_BASE: &str = "https://billing.cloud.ibm.com";

const SNAPSHOTS_PATH: &str = "/v1/billing-reports-snapshots";

pub(crate) const USER_AGENT: &str = concat!("usage-reports/", env!("CARGO_PKG_VERSION"));

/// Treat the last path segment of an endpoint as a directory, so relative
/// joins append to it instead of replacing it.
pub(crate) fn as_base_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Usage Reports v4 API client.
///
/// Authenticates every request with a bearer token obtained by the session.
#[derive(Debug, Clone)]
pub struct UsageReportsClient {
    client: Client,
    base_url: Url,
    bearer_token: String,
}

impl UsageReportsClient {
    /// Create a client against the default endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or the HTTP client cannot be built.
    pub fn new(bearer_token: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder(bearer_token).build()
    }

    /// Start building a client with a custom endpoint or timeout.
    #[must_use]
    pub fn builder(bearer_token: impl Into<String>) -> UsageReportsClientBuilder {
        UsageReportsClientBuilder {
            bearer_token: bearer_token.into(),
            base_url: None,
            timeout: None,
        }
    }

    /// Endpoint this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Query parameters for a snapshot listing call, in request order.
    fn build_snapshot_query(options: &GetReportsSnapshotOptions) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("account_id", options.account_id.clone()),
            ("month", options.month.clone()),
        ];

        if let Some(date_from) = options.date_from {
            params.push(("date_from", date_from.to_string()));
        }

        if let Some(date_to) = options.date_to {
            params.push(("date_to", date_to.to_string()));
        }

        if let Some(limit) = options.limit {
            params.push(("_limit", limit.to_string()));
        }

        if let Some(start) = options.start.as_deref().filter(|s| !s.is_empty()) {
            params.push(("_start", start.to_string()));
        }

        params
    }

    fn snapshots_url(&self, options: &GetReportsSnapshotOptions) -> Result<Url, ClientError> {
        let mut url = self
            .base_url
            .join(SNAPSHOTS_PATH.trim_start_matches('/'))
            .map_err(|e| ClientError::Config(format!("invalid snapshots URL: {e}")))?;
        url.query_pairs_mut()
            .extend_pairs(Self::build_snapshot_query(options));
        Ok(url)
    }

    /// Make a GET request to the Usage Reports API.
    async fn get<T>(&self, url: Url) -> Result<T, ClientError>
    where
        T: serde::de::DeserializeOwned,
    {
        debug!(url = %url, "Making Usage Reports API request");

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.bearer_token)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<UsageReportsError>(&error_text)
                .ok()
                .and_then(UsageReportsError::into_message)
                .unwrap_or(error_text);
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(ClientError::Serialization)
    }
}

#[async_trait]
impl SnapshotSource for UsageReportsClient {
    #[instrument(skip(self, options), fields(account_id = %options.account_id, month = %options.month))]
    async fn get_reports_snapshot(
        &self,
        options: &GetReportsSnapshotOptions,
    ) -> Result<SnapshotList, ClientError> {
        let url = self.snapshots_url(options)?;
        self.get(url).await
    }
}

/// Builder for [`UsageReportsClient`].
#[derive(Debug)]
pub struct UsageReportsClientBuilder {
    bearer_token: String,
    base_url: Option<Url>,
    timeout: Option<Duration>,
}

impl UsageReportsClientBuilder {
    #[must_use]
    pub fn base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or the HTTP client cannot be built.
    pub fn build(self) -> Result<UsageReportsClient, ClientError> {
        if self.bearer_token.is_empty() {
            return Err(ClientError::Auth(
                "Usage Reports bearer token is required".to_string(),
            ));
        }

        let base_url = match self.base_url {
            Some(url) => as_base_url(url),
            None => Url::parse(USAGE_REPORTS_API_BASE)
                .map_err(|e| ClientError::Config(e.to_string()))?,
        };

        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ClientError::Http)?;

        Ok(UsageReportsClient {
            client,
            base_url,
            bearer_token: self.bearer_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_client_requires_token() {
        let result = UsageReportsClient::new("");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("bearer token"));
    }

    #[test]
    fn test_new_client_with_token() {
        let client = UsageReportsClient::new("token").unwrap();
        assert_eq!(client.base_url().as_str(), "https://billing.cloud.ibm.com/");
    }

    #[test]
    fn test_build_snapshot_query_required_only() {
        let options = GetReportsSnapshotOptions::new("acc-123", "2024-05");
        let query = UsageReportsClient::build_snapshot_query(&options);
        assert_eq!(
            query,
            vec![
                ("account_id", "acc-123".to_string()),
                ("month", "2024-05".to_string()),
            ]
        );
    }

    #[test]
    fn test_build_snapshot_query_with_window_and_start() {
        let options = GetReportsSnapshotOptions::new("acc-123", "2024-05")
            .with_date_from(1_714_521_600_000)
            .with_date_to(1_717_199_999_999)
            .with_limit(30)
            .with_start("tok1");
        let query = UsageReportsClient::build_snapshot_query(&options);
        assert!(query.contains(&("date_from", "1714521600000".to_string())));
        assert!(query.contains(&("date_to", "1717199999999".to_string())));
        assert!(query.contains(&("_limit", "30".to_string())));
        assert!(query.contains(&("_start", "tok1".to_string())));
    }

    #[test]
    fn test_build_snapshot_query_skips_empty_start() {
        let options = GetReportsSnapshotOptions::new("acc-123", "2024-05").with_start("");
        let query = UsageReportsClient::build_snapshot_query(&options);
        assert!(query.iter().all(|(k, _)| *k != "_start"));
    }

    #[test]
    fn test_snapshots_url_from_root_base() {
        let client = UsageReportsClient::builder("token")
            .base_url(Url::parse("http://localhost:8080/").unwrap())
            .build()
            .unwrap();
        let url = client
            .snapshots_url(&GetReportsSnapshotOptions::new("acc 1", "2024-05"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/v1/billing-reports-snapshots?account_id=acc+1&month=2024-05"
        );
    }

    #[test]
    fn test_snapshots_url_keeps_base_path_prefix() {
        for base in ["http://localhost:8080/billing", "http://localhost:8080/billing/"] {
            let client = UsageReportsClient::builder("token")
                .base_url(Url::parse(base).unwrap())
                .build()
                .unwrap();
            let url = client
                .snapshots_url(&GetReportsSnapshotOptions::new("acc-123", "2024-05"))
                .unwrap();
            assert_eq!(url.path(), "/billing/v1/billing-reports-snapshots", "base {base}");
        }
    }
}
