//! Usage Reports v4 API client.
//!
//! This module provides:
//!
//! - **Snapshots API**: paginated billing report snapshot listing.
//! - **IAM**: API key to bearer token exchange.
//!
//! ## Example
//!
//! ```rust,ignore
//! use usage_reports::client::{GetReportsSnapshotOptions, SnapshotSource, UsageReportsClient};
//!
//! let client = UsageReportsClient::new("bearer-token")?;
//! let page = client
//!     .get_reports_snapshot(&GetReportsSnapshotOptions::new("acc-123", "2024-05"))
//!     .await?;
//! ```

mod iam;
mod models;
mod traits;
mod usage_reports;

pub use iam::{IamAuthenticator, IAM_API_BASE};
pub use models::*;
pub use traits::{ClientError, SnapshotSource};
pub use usage_reports::{UsageReportsClient, UsageReportsClientBuilder, USAGE_REPORTS_API_BASE};
