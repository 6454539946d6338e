//! Client session: an authenticated snapshot source plus the caller's account.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::client::{ClientError, IamAuthenticator, SnapshotSource, UsageReportsClient};
use crate::config::UsageReportsConfig;

/// Errors raised while establishing a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No account identifier is configured.
    #[error("account ID is not configured (set IC_ACCOUNT_ID)")]
    MissingAccountId,

    /// Neither an API key nor a bearer token is configured.
    #[error("no credentials configured (set IC_API_KEY or IC_IAM_TOKEN)")]
    MissingCredentials,

    /// Building the client or exchanging credentials failed.
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Source of the client and account context for a read.
///
/// Passed into the lister explicitly; there is no process-wide session.
#[async_trait]
pub trait ClientSession: Send + Sync {
    /// Authenticated Usage Reports client.
    ///
    /// # Errors
    ///
    /// Returns an error if credentials are missing or rejected.
    async fn usage_reports(&self) -> Result<Arc<dyn SnapshotSource>, SessionError>;

    /// Account the caller is acting for.
    ///
    /// # Errors
    ///
    /// Returns an error if no account is known.
    fn account_id(&self) -> Result<String, SessionError>;
}

/// Session backed by [`UsageReportsConfig`].
#[derive(Debug, Clone)]
pub struct ConfigSession {
    config: UsageReportsConfig,
}

impl ConfigSession {
    #[must_use]
    pub fn new(config: UsageReportsConfig) -> Self {
        Self { config }
    }

    async fn bearer_token(&self) -> Result<String, SessionError> {
        if let Some(token) = &self.config.bearer_token {
            debug!("Using configured IAM bearer token");
            return Ok(token.clone());
        }

        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(SessionError::MissingCredentials)?;
        let mut authenticator = IamAuthenticator::new(api_key)?;
        if let Some(iam_url) = &self.config.iam_url {
            authenticator = authenticator.with_iam_url(iam_url.clone());
        }
        Ok(authenticator.request_token().await?)
    }
}

#[async_trait]
impl ClientSession for ConfigSession {
    async fn usage_reports(&self) -> Result<Arc<dyn SnapshotSource>, SessionError> {
        let token = self.bearer_token().await?;

        let mut builder = UsageReportsClient::builder(token);
        if let Some(base_url) = &self.config.base_url {
            builder = builder.base_url(base_url.clone());
        }
        if let Some(timeout) = self.config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Arc::new(builder.build()?))
    }

    fn account_id(&self) -> Result<String, SessionError> {
        self.config
            .account_id
            .clone()
            .ok_or(SessionError::MissingAccountId)
    }
}
