//! Billing report snapshot listing for the IBM Cloud Usage Reports API.
//!
//! This crate reads the billing report snapshots captured for an account in a
//! given month and flattens them into rows for the
//! `ibm_billing_snapshot_list` data source:
//!
//! - **Client** - Usage Reports v4 snapshots endpoint and IAM token exchange
//! - **Session** - authenticated client plus the caller's account ID
//! - **Snapshots** - pagination, flattening, schema, and the data source read
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use usage_reports::config::UsageReportsConfig;
//! use usage_reports::session::ConfigSession;
//! use usage_reports::snapshots::{
//!     BillingSnapshotListArgs, BillingSnapshotListDataSource, SnapshotLister,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // IC_API_KEY and IC_ACCOUNT_ID from the environment
//!     let config = UsageReportsConfig::from_env()?;
//!     let lister = SnapshotLister::new()
//!         .with_page_limit(config.page_limit)
//!         .with_max_pages(config.max_pages);
//!     let session = ConfigSession::new(config);
//!
//!     let state = BillingSnapshotListDataSource::new(lister)
//!         .read(&session, &BillingSnapshotListArgs {
//!             month: "2024-05".into(),
//!             ..Default::default()
//!         })
//!         .await?;
//!
//!     for row in &state.snapshots {
//!         println!("{}", serde_json::to_string(row)?);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Pagination
//!
//! Pages are requested one after another, each carrying the previous page's
//! `next.offset` as `_start`, until the server omits the offset or returns an
//! empty one. A failed page aborts the whole read. An empty result is an
//! error, not an empty list.

pub mod client;
pub mod config;
pub mod session;
pub mod snapshots;

pub use client::{ClientError, SnapshotSource, UsageReportsClient};
pub use config::UsageReportsConfig;
pub use session::{ClientSession, ConfigSession, SessionError};
pub use snapshots::{
    BillingSnapshotListArgs, BillingSnapshotListDataSource, BillingSnapshotListState, FlatRow,
    SnapshotListError, SnapshotLister, SnapshotQuery,
};
