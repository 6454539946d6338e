//! Snapshot source trait and client errors.

use async_trait::async_trait;
use thiserror::Error;

use super::models::{GetReportsSnapshotOptions, SnapshotList};

/// Errors that can occur while talking to the Usage Reports or IAM APIs.
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Authentication error (missing or rejected credentials).
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A paginated source of billing report snapshots.
///
/// Implemented by [`super::UsageReportsClient`] for the real API and by
/// in-memory fakes in tests.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch one page of snapshots.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    async fn get_reports_snapshot(
        &self,
        options: &GetReportsSnapshotOptions,
    ) -> Result<SnapshotList, ClientError>;
}
