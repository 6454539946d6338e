//! IAM API key to bearer token exchange.

use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use super::models::IamTokenResponse;
use super::traits::ClientError;
use super::usage_reports::{as_base_url, USER_AGENT};

/// Default IAM endpoint.
pub const IAM_API_BASE: &str = "https://iam.cloud.ibm.com";

const TOKEN_PATH: &str = "identity/token";
const APIKEY_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

/// Exchanges an API key for an IAM access token.
#[derive(Debug, Clone)]
pub struct IamAuthenticator {
    client: Client,
    iam_url: Url,
    api_key: String,
}

impl IamAuthenticator {
    /// Create an authenticator for `api_key` against the default IAM endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ClientError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(ClientError::Auth("IAM API key is required".to_string()));
        }

        let iam_url = Url::parse(IAM_API_BASE).map_err(|e| ClientError::Config(e.to_string()))?;
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(ClientError::Http)?;

        Ok(Self {
            client,
            iam_url,
            api_key,
        })
    }

    /// Use a different IAM endpoint. A path prefix is kept.
    #[must_use]
    pub fn with_iam_url(mut self, iam_url: Url) -> Self {
        self.iam_url = as_base_url(iam_url);
        self
    }

    /// Request a fresh access token.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Auth`] if IAM rejects the key, or a transport error.
    #[instrument(skip(self), fields(iam_url = %self.iam_url))]
    pub async fn request_token(&self) -> Result<String, ClientError> {
        let url = self
            .iam_url
            .join(TOKEN_PATH)
            .map_err(|e| ClientError::Config(format!("invalid IAM URL: {e}")))?;
        debug!(url = %url, "Requesting IAM access token");

        let response = self
            .client
            .post(url)
            .header("Accept", "application/json")
            .form(&[
                ("grant_type", APIKEY_GRANT_TYPE),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClientError::Auth(format!(
                "IAM token request failed ({}): {error_text}",
                status.as_u16()
            )));
        }

        let body = response.text().await?;
        let token: IamTokenResponse = serde_json::from_str(&body)?;
        if token.access_token.is_empty() {
            return Err(ClientError::Auth(
                "IAM returned an empty access token".to_string(),
            ));
        }
        Ok(token.access_token)
    }
}
