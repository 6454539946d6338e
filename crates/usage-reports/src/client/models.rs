//! Usage Reports v4 API models.
//!
//! Every field is optional: the API omits keys it has no value for, and the
//! flattening layer must be able to tell "absent" from "empty".

use serde::{Deserialize, Serialize};
use serde_json::Number;

// ============================================================================
// Snapshot list response
// ============================================================================

/// One page of billing report snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotList {
    /// Number of snapshots in this page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
    /// Reference to the first page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<SnapshotListFirst>,
    /// Reference to the next page; absent on the last page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<SnapshotListNext>,
    /// Snapshots in server order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshots: Option<Vec<SnapshotListSnapshotsItem>>,
}

/// Link to the first page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotListFirst {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

/// Link to the next page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotListNext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// Continuation token, passed back as `_start`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
}

/// A single billing report snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotListSnapshotsItem {
    /// Account ID for which billing report snapshot is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    /// Month of captured snapshot (`yyyy-mm`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    /// `enterprise` or `account`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_type: Option<String>,
    /// Epoch millis, as sent. Narrowed when flattened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_processed_at: Option<Number>,
    /// `enabled` or `disabled`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_period: Option<BillingPeriod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// COS bucket holding the snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_types: Option<Vec<ReportTypesItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FilesItem>>,
    /// Epoch millis, as sent. Narrowed when flattened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<Number>,
}

/// Billing period covered by a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingPeriod {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

/// A report type configured for a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTypesItem {
    /// `account_summary`, `enterprise_summary` or `account_resource_instance_usage`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub report_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Location of one stored report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_types: Option<String>,
    /// Absolute path of the report in the COS instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

// ============================================================================
// Request options
// ============================================================================

/// Parameters for one `GET /v1/billing-reports-snapshots` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetReportsSnapshotOptions {
    pub account_id: String,
    pub month: String,
    pub date_from: Option<i64>,
    pub date_to: Option<i64>,
    /// Page size (`_limit`).
    pub limit: Option<u32>,
    /// Continuation token from the previous page (`_start`).
    pub start: Option<String>,
}

impl GetReportsSnapshotOptions {
    /// Create options for an account and month.
    #[must_use]
    pub fn new(account_id: impl Into<String>, month: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            month: month.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_date_from(mut self, date_from: i64) -> Self {
        self.date_from = Some(date_from);
        self
    }

    #[must_use]
    pub fn with_date_to(mut self, date_to: i64) -> Self {
        self.date_to = Some(date_to);
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_start(mut self, start: impl Into<String>) -> Self {
        self.start = Some(start.into());
        self
    }
}

// ============================================================================
// Error response
// ============================================================================

/// Error body returned by the Usage Reports API.
#[derive(Debug, Clone, Deserialize)]
pub struct UsageReportsError {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Vec<UsageReportsErrorItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UsageReportsErrorItem {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
}

impl UsageReportsError {
    /// Best human-readable message in the body.
    #[must_use]
    pub fn into_message(self) -> Option<String> {
        self.errors
            .into_iter()
            .next()
            .map(|e| e.message)
            .or(self.message)
    }
}

// ============================================================================
// IAM token response
// ============================================================================

/// Response from the IAM `identity/token` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct IamTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}
