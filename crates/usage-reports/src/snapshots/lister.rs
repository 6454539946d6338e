//! Paginated snapshot listing.

use std::num::NonZeroUsize;

use tracing::{debug, instrument};

use super::flatten::{flatten_snapshot, FlatRow};
use super::SnapshotListError;
use crate::client::{GetReportsSnapshotOptions, SnapshotListSnapshotsItem, SnapshotSource};

/// Parameters for one snapshot read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotQuery {
    pub account_id: String,
    /// Month in `yyyy-mm` form. Validated by the API, not here.
    pub month: String,
    /// Epoch millis.
    pub date_from: Option<i64>,
    /// Epoch millis.
    pub date_to: Option<i64>,
}

impl SnapshotQuery {
    #[must_use]
    pub fn new(account_id: impl Into<String>, month: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            month: month.into(),
            date_from: None,
            date_to: None,
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

    fn page_options(&self, limit: Option<u32>, start: &str) -> GetReportsSnapshotOptions {
        let mut options = GetReportsSnapshotOptions::new(&self.account_id, &self.month);
        options.date_from = self.date_from;
        options.date_to = self.date_to;
        options.limit = limit;
        if !start.is_empty() {
            options.start = Some(start.to_string());
        }
        options
    }
}

/// Walks every page of the snapshot listing for a query.
///
/// Pages are fetched one at a time, in order, until the server stops
/// returning a continuation token.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotLister {
    page_limit: Option<u32>,
    max_pages: Option<NonZeroUsize>,
}

impl SnapshotLister {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Page size requested from the server.
    #[must_use]
    pub fn with_page_limit(mut self, limit: Option<u32>) -> Self {
        self.page_limit = limit;
        self
    }

    /// Fail instead of requesting more than `max` pages.
    #[must_use]
    pub fn with_max_pages(mut self, max: Option<NonZeroUsize>) -> Self {
        self.max_pages = max;
        self
    }

    /// Fetch every snapshot for `query`, in server order.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotListError::Api`] if any page request fails; records
    /// from earlier pages are dropped. Returns
    /// [`SnapshotListError::PageLimitExceeded`] if the configured bound is hit.
    #[instrument(skip(self, source), fields(account_id = %query.account_id, month = %query.month))]
    pub async fn fetch_all(
        &self,
        source: &dyn SnapshotSource,
        query: &SnapshotQuery,
    ) -> Result<Vec<SnapshotListSnapshotsItem>, SnapshotListError> {
        let mut snapshots = Vec::new();
        let mut next_ref = String::new();
        let mut page = 0_usize;

        loop {
            if self.max_pages.is_some_and(|max| page >= max.get()) {
                return Err(SnapshotListError::PageLimitExceeded {
                    max_pages: page,
                });
            }
            page += 1;

            let options = query.page_options(self.page_limit, &next_ref);
            let response = match source.get_reports_snapshot(&options).await {
                Ok(response) => response,
                Err(source) => {
                    debug!(page, error = %source, "GetReportsSnapshot failed");
                    return Err(SnapshotListError::Api { page, source });
                }
            };

            if let Some(items) = response.snapshots {
                snapshots.extend(items);
            }

            match response.next.and_then(|next| next.offset) {
                Some(offset) if !offset.is_empty() => next_ref = offset,
                _ => break,
            }
        }

        debug!(pages = page, snapshots = snapshots.len(), "Snapshot listing complete");
        Ok(snapshots)
    }

    /// Fetch and flatten every snapshot for `query`.
    ///
    /// # Errors
    ///
    /// Everything [`Self::fetch_all`] returns, plus
    /// [`SnapshotListError::NotFound`] when no snapshots exist and
    /// [`SnapshotListError::Conversion`] when a record cannot be flattened.
    pub async fn list(
        &self,
        source: &dyn SnapshotSource,
        query: &SnapshotQuery,
    ) -> Result<Vec<FlatRow>, SnapshotListError> {
        let snapshots = self.fetch_all(source, query).await?;

        if snapshots.is_empty() {
            return Err(SnapshotListError::NotFound {
                account_id: query.account_id.clone(),
            });
        }

        snapshots.iter().map(flatten_snapshot).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientError, SnapshotList, SnapshotListNext};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted pages and records every request.
    #[derive(Default)]
    struct ScriptedSource {
        pages: Mutex<VecDeque<Result<SnapshotList, ClientError>>>,
        requests: Mutex<Vec<GetReportsSnapshotOptions>>,
    }

    impl ScriptedSource {
        fn new(pages: Vec<Result<SnapshotList, ClientError>>) -> Self {
            Self {
                pages: Mutex::new(pages.into()),
                requests: Mutex::default(),
            }
        }

        fn requests(&self) -> Vec<GetReportsSnapshotOptions> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SnapshotSource for ScriptedSource {
        async fn get_reports_snapshot(
            &self,
            options: &GetReportsSnapshotOptions,
        ) -> Result<SnapshotList, ClientError> {
            self.requests.lock().unwrap().push(options.clone());
            self.pages
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(SnapshotList::default()))
        }
    }

    fn snapshot(id: &str) -> SnapshotListSnapshotsItem {
        SnapshotListSnapshotsItem {
            account_id: Some("acc-123".into()),
            snapshot_id: Some(id.into()),
            ..Default::default()
        }
    }

    fn page(ids: &[&str], offset: Option<&str>) -> Result<SnapshotList, ClientError> {
        Ok(SnapshotList {
            count: Some(ids.len() as i64),
            snapshots: Some(ids.iter().map(|id| snapshot(id)).collect()),
            next: offset.map(|o| SnapshotListNext {
                href: None,
                offset: Some(o.to_string()),
            }),
            ..Default::default()
        })
    }

    fn ids(rows: &[FlatRow]) -> Vec<&str> {
        rows.iter()
            .map(|r| r["snapshot_id"].as_str().unwrap())
            .collect()
    }

    fn query() -> SnapshotQuery {
        SnapshotQuery::new("acc-123", "2024-05")
    }

    #[tokio::test]
    async fn test_single_page_two_records() {
        let source = ScriptedSource::new(vec![page(&["a", "b"], None)]);
        let rows = SnapshotLister::new().list(&source, &query()).await.unwrap();

        assert_eq!(ids(&rows), vec!["a", "b"]);
        assert_eq!(source.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_follows_continuation_token() {
        let source = ScriptedSource::new(vec![page(&["a"], Some("tok1")), page(&["b"], None)]);
        let rows = SnapshotLister::new().list(&source, &query()).await.unwrap();

        assert_eq!(ids(&rows), vec!["a", "b"]);
        let requests = source.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].start, None);
        assert_eq!(requests[1].start.as_deref(), Some("tok1"));
        assert_eq!(requests[1].account_id, "acc-123");
        assert_eq!(requests[1].month, "2024-05");
    }

    #[tokio::test]
    async fn test_concatenates_many_pages_in_order() {
        let source = ScriptedSource::new(vec![
            page(&["a", "b"], Some("t1")),
            page(&[], Some("t2")),
            page(&["c"], Some("t3")),
            page(&["d", "e"], None),
        ]);
        let rows = SnapshotLister::new().list(&source, &query()).await.unwrap();

        assert_eq!(ids(&rows), vec!["a", "b", "c", "d", "e"]);
        assert_eq!(source.requests().len(), 4);
    }

    #[tokio::test]
    async fn test_stops_on_empty_offset() {
        let source = ScriptedSource::new(vec![page(&["a"], Some("")), page(&["b"], None)]);
        let rows = SnapshotLister::new().list(&source, &query()).await.unwrap();

        assert_eq!(ids(&rows), vec!["a"]);
        assert_eq!(source.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_stops_when_next_has_no_offset() {
        let mut first = page(&["a"], None).unwrap();
        first.next = Some(SnapshotListNext {
            href: Some("/v1/billing-reports-snapshots".into()),
            offset: None,
        });
        let source = ScriptedSource::new(vec![Ok(first), page(&["b"], None)]);
        let rows = SnapshotLister::new().list(&source, &query()).await.unwrap();

        assert_eq!(ids(&rows), vec!["a"]);
        assert_eq!(source.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_result_is_not_found() {
        let source = ScriptedSource::new(vec![page(&[], None)]);
        let err = SnapshotLister::new().list(&source, &query()).await.unwrap_err();

        assert!(matches!(err, SnapshotListError::NotFound { .. }));
        assert_eq!(err.to_string(), "no snapshots found for account: acc-123");
    }

    #[tokio::test]
    async fn test_missing_snapshots_field_is_not_found() {
        let source = ScriptedSource::new(vec![Ok(SnapshotList::default())]);
        let err = SnapshotLister::new().list(&source, &query()).await.unwrap_err();
        assert!(matches!(err, SnapshotListError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_failure_on_second_page_aborts() {
        let source = ScriptedSource::new(vec![
            page(&["a"], Some("t1")),
            Err(ClientError::Api {
                status: 500,
                message: "boom".into(),
            }),
            page(&["c"], None),
        ]);
        let err = SnapshotLister::new().list(&source, &query()).await.unwrap_err();

        match err {
            SnapshotListError::Api { page, source: inner } => {
                assert_eq!(page, 2);
                assert!(inner.to_string().contains("boom"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(source.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_date_window_passed_only_when_set() {
        let source = ScriptedSource::new(vec![page(&["a"], Some("t1")), page(&["b"], None)]);
        let query = query().with_date_from(1_714_521_600_000);
        SnapshotLister::new()
            .with_page_limit(Some(10))
            .list(&source, &query)
            .await
            .unwrap();

        for request in source.requests() {
            assert_eq!(request.date_from, Some(1_714_521_600_000));
            assert_eq!(request.date_to, None);
            assert_eq!(request.limit, Some(10));
        }
    }

    #[tokio::test]
    async fn test_max_pages_bound() {
        let source = ScriptedSource::new(vec![
            page(&["a"], Some("t1")),
            page(&["b"], Some("t2")),
            page(&["c"], Some("t3")),
        ]);
        let err = SnapshotLister::new()
            .with_max_pages(NonZeroUsize::new(2))
            .list(&source, &query())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SnapshotListError::PageLimitExceeded { max_pages: 2 }
        ));
        assert_eq!(source.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_max_pages_not_hit_when_server_stops() {
        let source = ScriptedSource::new(vec![page(&["a"], Some("t1")), page(&["b"], None)]);
        let rows = SnapshotLister::new()
            .with_max_pages(NonZeroUsize::new(2))
            .list(&source, &query())
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_max_pages_of_one_fetches_first_page() {
        let source = ScriptedSource::new(vec![page(&["a"], None)]);
        let rows = SnapshotLister::new()
            .with_max_pages(NonZeroUsize::new(1))
            .list(&source, &query())
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(source.requests().len(), 1);
    }
}
