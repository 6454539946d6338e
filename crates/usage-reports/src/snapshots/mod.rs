//! Billing report snapshot listing.
//!
//! The read path is: session → [`SnapshotLister`] walks every page →
//! [`flatten_snapshot`] turns each record into a [`FlatRow`] →
//! [`BillingSnapshotListDataSource`] wraps the rows in the data source state.

mod data_source;
mod flatten;
mod lister;
pub mod schema;

use thiserror::Error;

use crate::client::ClientError;
use crate::session::SessionError;

pub use data_source::{BillingSnapshotListArgs, BillingSnapshotListDataSource, BillingSnapshotListState};
pub use flatten::{flatten_snapshot, FlatRow};
pub use lister::{SnapshotLister, SnapshotQuery};

/// Errors returned by a snapshot read.
#[derive(Debug, Error)]
pub enum SnapshotListError {
    /// Client or account context could not be obtained.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A page request failed; nothing from earlier pages is returned.
    #[error("GetReportsSnapshot failed on page {page}: {source}")]
    Api {
        page: usize,
        #[source]
        source: ClientError,
    },

    /// Pagination finished without any snapshots.
    #[error("no snapshots found for account: {account_id}")]
    NotFound { account_id: String },

    /// A timestamp did not fit the schema integer type.
    #[error("cannot convert {field} value {value} to a schema integer")]
    Conversion { field: &'static str, value: String },

    /// The server kept returning continuation tokens past the configured bound.
    #[error("snapshot listing exceeded {max_pages} pages")]
    PageLimitExceeded { max_pages: usize },
}
