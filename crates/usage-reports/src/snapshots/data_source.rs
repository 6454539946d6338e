//! The `ibm_billing_snapshot_list` data source read.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::flatten::FlatRow;
use super::lister::{SnapshotLister, SnapshotQuery};
use super::SnapshotListError;
use crate::session::ClientSession;

/// User-supplied arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingSnapshotListArgs {
    /// Month in `yyyy-mm` form.
    pub month: String,
    /// Epoch millis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<i64>,
    /// Epoch millis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<i64>,
}

/// State produced by a successful read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingSnapshotListState {
    /// Wall-clock time of the read; differs on every read.
    pub id: String,
    pub month: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<i64>,
    /// Declared by the schema but never set by the read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshotcount: Option<i64>,
    pub snapshots: Vec<FlatRow>,
}

/// Reads billing report snapshots for the session's account.
#[derive(Debug, Clone, Copy, Default)]
pub struct BillingSnapshotListDataSource {
    lister: SnapshotLister,
}

impl BillingSnapshotListDataSource {
    #[must_use]
    pub fn new(lister: SnapshotLister) -> Self {
        Self { lister }
    }

    /// Read every snapshot for `args` through `session`.
    ///
    /// # Errors
    ///
    /// Session failures are returned unchanged; see [`SnapshotLister::list`]
    /// for the rest.
    #[instrument(skip(self, session), fields(month = %args.month))]
    pub async fn read(
        &self,
        session: &dyn ClientSession,
        args: &BillingSnapshotListArgs,
    ) -> Result<BillingSnapshotListState, SnapshotListError> {
        let client = session.usage_reports().await?;
        let account_id = session.account_id()?;

        let mut query = SnapshotQuery::new(account_id, args.month.clone());
        query.date_from = args.date_from;
        query.date_to = args.date_to;

        let snapshots = self.lister.list(client.as_ref(), &query).await?;
        info!(
            account_id = %query.account_id,
            snapshots = snapshots.len(),
            "Read billing snapshots"
        );

        Ok(BillingSnapshotListState {
            id: Utc::now().to_string(),
            month: args.month.clone(),
            date_from: args.date_from,
            date_to: args.date_to,
            snapshotcount: None,
            snapshots,
        })
    }
}
