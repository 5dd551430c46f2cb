//! Paginated file lookup
//!
//! Grids are deleted through `file/remove`, which wants the id of the file
//! backing the grid, not the grid id. The only way to get from one to the
//! other is to page through `get_grids` until an entry with the grid id
//! shows up.
//!
//! Pages are fetched strictly one after another: the total reported by one
//! page decides whether the next is requested at all.

use tracing::{debug, info};

use crate::client::GridClient;
use crate::config::RequestOptions;
use crate::endpoint::PAGE_SIZE;
use crate::error::Result;
use crate::models::GridListPage;

/// State of one scan through the listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupSession {
    grid_id: String,
    /// 1-based index of the next page's first entry
    start_index: u64,
    /// `None` until the first page arrives
    total: Option<u64>,
    file_id: Option<String>,
    pages_fetched: u64,
}

impl LookupSession {
    pub fn new(grid_id: impl Into<String>) -> Self {
        Self {
            grid_id: grid_id.into(),
            start_index: 1,
            total: None,
            file_id: None,
            pages_fetched: 0,
        }
    }

    /// Start index of the next page to fetch, or `None` when the scan is over
    pub fn next_start_index(&self) -> Option<u64> {
        if self.file_id.is_some() {
            return None;
        }
        match self.total {
            None => Some(self.start_index),
            Some(total) if self.start_index <= total => Some(self.start_index),
            Some(_) => None,
        }
    }

    /// Fold one fetched page into the session
    ///
    /// The total is refreshed from every page. The first entry matching the
    /// grid id wins. The cursor advances whether or not there was a match.
    pub fn observe(&mut self, page: &GridListPage) {
        self.total = Some(page.count);
        self.pages_fetched += 1;
        if self.file_id.is_none() {
            self.file_id = page
                .files
                .iter()
                .find(|file| file.grid_id.as_deref() == Some(self.grid_id.as_str()))
                .map(|file| file.id.clone());
        }
        self.start_index = self.start_index.saturating_add(PAGE_SIZE);
    }

    pub fn grid_id(&self) -> &str {
        &self.grid_id
    }

    pub fn file_id(&self) -> Option<&str> {
        self.file_id.as_deref()
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn pages_fetched(&self) -> u64 {
        self.pages_fetched
    }
}

/// Result of [`GridLocator::remove_grid`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    Removed { file_id: String },
    /// No listing entry carried the grid id; nothing was deleted
    NotFound,
}

/// Finds and deletes the file backing a grid
///
/// Failures are not captured: a failed page fetch or delete aborts the scan
/// and comes back as `Err`.
#[derive(Clone)]
pub struct GridLocator {
    client: GridClient,
    options: RequestOptions,
}

impl GridLocator {
    pub fn new(client: GridClient) -> Self {
        Self::with_options(client, RequestOptions::default())
    }

    /// `options.auth_id` and `options.qa` apply to every page and the delete
    pub fn with_options(client: GridClient, options: RequestOptions) -> Self {
        Self { client, options }
    }

    /// Scan the listing for `grid_id` without deleting anything
    #[tracing::instrument(name = "bigparser.locate", skip(self))]
    pub async fn find_file_id(&self, grid_id: &str) -> Result<Option<String>> {
        let session = self.scan(grid_id).await?;
        Ok(session.file_id)
    }

    /// Scan the listing for `grid_id` and delete its file if found
    #[tracing::instrument(name = "bigparser.remove_grid", skip(self))]
    pub async fn remove_grid(&self, grid_id: &str) -> Result<Removal> {
        let session = self.scan(grid_id).await?;

        match session.file_id {
            Some(file_id) => {
                self.client.remove_file(&file_id, &self.options).await?;
                info!(
                    "[GridLocator] Removed file {} backing grid {}",
                    file_id, grid_id
                );
                Ok(Removal::Removed { file_id })
            }
            None => {
                info!(
                    "[GridLocator] No file found for grid {} after {} page(s), nothing to remove",
                    grid_id, session.pages_fetched
                );
                Ok(Removal::NotFound)
            }
        }
    }

    async fn scan(&self, grid_id: &str) -> Result<LookupSession> {
        let mut session = LookupSession::new(grid_id);

        while let Some(start_index) = session.next_start_index() {
            let page = self.client.list_grids(start_index, &self.options).await?;
            debug!(
                "[GridLocator] Page at {}: {} file(s), total {}",
                start_index,
                page.files.len(),
                page.count
            );
            session.observe(&page);
        }

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::endpoint::HttpMethod;
    use crate::error::GridError;
    use crate::fake::FakeGridService;
    use crate::models::GridFile;
    use proptest::prelude::*;
    use serde_json::json;
    use std::sync::Arc;

    fn files(n: u64) -> Vec<GridFile> {
        (1..=n)
            .map(|i| GridFile::new(format!("file-{i}"), format!("grid-{i}")))
            .collect()
    }

    fn locator_over(fake: &Arc<FakeGridService>) -> GridLocator {
        let client = GridClient::with_transport(ClientConfig::new("auth"), fake.clone());
        GridLocator::new(client)
    }

    /// Drive a session over an in-memory listing, returning the session
    fn run_session(listing: &[GridFile], target: &str) -> LookupSession {
        let mut session = LookupSession::new(target);
        while let Some(start) = session.next_start_index() {
            let page = GridListPage {
                count: listing.len() as u64,
                files: listing
                    .iter()
                    .skip((start - 1) as usize)
                    .take(PAGE_SIZE as usize)
                    .cloned()
                    .collect(),
            };
            session.observe(&page);
        }
        session
    }

    #[tokio::test]
    async fn test_target_on_third_page() {
        let fake = Arc::new(FakeGridService::with_files(files(25)));
        let locator = locator_over(&fake);

        let removal = locator.remove_grid("grid-23").await.unwrap();

        assert_eq!(
            removal,
            Removal::Removed {
                file_id: "file-23".to_string()
            }
        );
        assert_eq!(fake.requests_to("/grid/get_grids").len(), 3);
        let deletes = fake.requests_to("/file/remove");
        assert_eq!(deletes.len(), 1);
        assert_eq!(deletes[0].method, HttpMethod::Delete);
        assert_eq!(deletes[0].body, Some(json!({ "id": "file-23" })));
        assert_eq!(fake.files().len(), 24);
    }

    #[tokio::test]
    async fn test_absent_target_scans_every_page_and_never_deletes() {
        let fake = Arc::new(FakeGridService::with_files(files(25)));
        let locator = locator_over(&fake);

        let removal = locator.remove_grid("grid-404").await.unwrap();

        assert_eq!(removal, Removal::NotFound);
        assert_eq!(fake.requests_to("/grid/get_grids").len(), 3);
        assert!(fake.requests_to("/file/remove").is_empty());
        assert_eq!(fake.files().len(), 25);
    }

    #[tokio::test]
    async fn test_single_file_listing() {
        let fake = Arc::new(FakeGridService::with_files(vec![GridFile::new("f1", "g1")]));
        let locator = locator_over(&fake);

        let removal = locator.remove_grid("g1").await.unwrap();

        assert_eq!(
            removal,
            Removal::Removed {
                file_id: "f1".to_string()
            }
        );
        let requests = fake.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[0].url,
            "https://www.bigparser.com/APIServices/api/grid/get_grids?startIndex=1&endIndex=10"
        );
        assert_eq!(requests[1].body, Some(json!({ "id": "f1" })));
    }

    #[tokio::test]
    async fn test_entry_just_past_a_page_boundary_is_found() {
        let fake = Arc::new(FakeGridService::with_files(files(11)));
        let locator = locator_over(&fake);

        let file_id = locator.find_file_id("grid-11").await.unwrap();

        assert_eq!(file_id.as_deref(), Some("file-11"));
        assert_eq!(fake.requests_to("/grid/get_grids").len(), 2);
        assert!(fake.requests_to("/file/remove").is_empty());
    }

    #[tokio::test]
    async fn test_empty_listing_fetches_one_page() {
        let fake = Arc::new(FakeGridService::with_files(vec![]));
        let locator = locator_over(&fake);

        assert_eq!(locator.remove_grid("g1").await.unwrap(), Removal::NotFound);
        assert_eq!(fake.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_first_match_in_response_order_wins() {
        let fake = Arc::new(FakeGridService::with_files(vec![
            GridFile::new("f-other", "g0"),
            GridFile::new("f-first", "g1"),
            GridFile::new("f-second", "g1"),
        ]));
        let locator = locator_over(&fake);

        let file_id = locator.find_file_id("g1").await.unwrap();
        assert_eq!(file_id.as_deref(), Some("f-first"));
    }

    #[tokio::test]
    async fn test_page_failure_aborts_scan() {
        let fake = Arc::new(FakeGridService::with_files(files(25)));
        fake.respond_json(200, json!({ "count": 25, "files": [] }));
        fake.respond_json(
            500,
            json!({ "errorMessage": "System error. Please contact admin.", "errorType": "SYSTEMERROR", "recoverable": false, "otherDetails": {} }),
        );
        let locator = locator_over(&fake);

        let err = locator.remove_grid("grid-23").await.unwrap_err();

        assert!(matches!(err, GridError::Api { status: 500, .. }));
        assert_eq!(fake.requests().len(), 2);
        assert!(fake.requests_to("/file/remove").is_empty());
    }

    #[tokio::test]
    async fn test_total_is_refreshed_from_each_page() {
        // The listing shrinks to 12 after the first page reports 40
        let fake = Arc::new(FakeGridService::with_files(files(12)));
        fake.respond_json(200, json!({ "count": 40, "files": [] }));
        let locator = locator_over(&fake);

        assert_eq!(locator.remove_grid("grid-404").await.unwrap(), Removal::NotFound);
        assert_eq!(fake.requests_to("/grid/get_grids").len(), 2);
    }

    #[tokio::test]
    async fn test_reported_total_decides_page_count() {
        // 5 real files, but every page claims 25
        let fake = Arc::new(FakeGridService::with_files(files(5)));
        fake.report_count(25);
        let locator = locator_over(&fake);

        assert_eq!(locator.find_file_id("grid-404").await.unwrap(), None);

        let starts: Vec<_> = fake
            .requests_to("/grid/get_grids")
            .iter()
            .map(|r| r.url.split_once('?').map(|(_, q)| q.to_string()))
            .collect();
        assert_eq!(
            starts,
            vec![
                Some("startIndex=1&endIndex=10".to_string()),
                Some("startIndex=11&endIndex=20".to_string()),
                Some("startIndex=21&endIndex=30".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_options_apply_to_pages_and_delete() {
        let fake = Arc::new(FakeGridService::with_files(files(3)));
        let client = GridClient::with_transport(ClientConfig::new("auth"), fake.clone());
        let locator =
            GridLocator::with_options(client, RequestOptions::new().auth_id("other").qa(true));

        locator.remove_grid("grid-2").await.unwrap();

        for request in fake.requests() {
            assert!(request.url.starts_with("https://qa.bigparser.com/APIServices/api/"));
            assert_eq!(request.header("authId"), Some("other"));
        }
    }

    #[test]
    fn test_session_starts_unbounded() {
        let session = LookupSession::new("g");
        assert_eq!(session.total(), None);
        assert_eq!(session.next_start_index(), Some(1));
    }

    #[test]
    fn test_zero_total_differs_from_unknown() {
        let mut session = LookupSession::new("g");
        session.observe(&GridListPage::default());
        assert_eq!(session.total(), Some(0));
        assert_eq!(session.next_start_index(), None);
    }

    proptest! {
        #[test]
        fn prop_absent_target_fetches_every_page(count in 1u64..300) {
            let listing = files(count);
            let session = run_session(&listing, "missing");
            prop_assert_eq!(session.pages_fetched(), count.div_ceil(PAGE_SIZE));
            prop_assert_eq!(session.file_id(), None);
        }

        #[test]
        fn prop_present_target_stops_on_its_page(
            (count, position) in (1u64..300).prop_flat_map(|count| (Just(count), 1..=count))
        ) {
            let listing = files(count);
            let session = run_session(&listing, &format!("grid-{position}"));
            let expected_file = format!("file-{position}");
            prop_assert_eq!(session.file_id(), Some(expected_file.as_str()));
            prop_assert_eq!(session.pages_fetched(), position.div_ceil(PAGE_SIZE));
        }
    }
}
