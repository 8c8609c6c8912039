//! A listing screen: filter state, accumulated results and a fetcher.
//!
//! The one-shot methods ([`ListingSession::dispatch`],
//! [`ListingSession::load_more`], [`ListingSession::refresh`]) run a whole
//! round trip. The two-phase methods (`begin_*` then
//! [`ListingSession::complete`]) split issuing a fetch from applying its
//! response, which is how interleaved responses are driven in tests.

use async_trait::async_trait;

use atelier_core::ListingParams;
use atelier_core::api::ListResponse;

use crate::accumulator::{FetchTicket, MergeOutcome, ResultAccumulator};
use crate::encoder::encode;
use crate::filter_state::{FilterAction, FilterError, FilterState};
use crate::http::{CatalogClient, ClientError};

/// Source of listing pages.
#[async_trait]
pub trait ListingFetcher: Send + Sync {
    async fn fetch(&self, params: &ListingParams) -> Result<ListResponse, ClientError>;
}

#[async_trait]
impl ListingFetcher for CatalogClient {
    async fn fetch(&self, params: &ListingParams) -> Result<ListResponse, ClientError> {
        self.list_products(params).await
    }
}

/// A fetch that has been issued but not yet applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFetch {
    pub ticket: FetchTicket,
    pub params: ListingParams,
}

/// Filter state and accumulated results for one listing.
#[derive(Debug)]
pub struct ListingSession<F> {
    fetcher: F,
    state: FilterState,
    results: ResultAccumulator,
    limit: u32,
}

impl<F: ListingFetcher> ListingSession<F> {
    /// Create an empty session fetching `limit` products per page.
    pub fn new(fetcher: F, limit: u32) -> Self {
        Self {
            fetcher,
            state: FilterState::default(),
            results: ResultAccumulator::new(),
            limit,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &FilterState {
        &self.state
    }

    #[must_use]
    pub const fn results(&self) -> &ResultAccumulator {
        &self.results
    }

    /// Apply `action` and, if the filters changed, reload from page 1.
    ///
    /// Returns whether a reload happened.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError`] for a rejected transition; the session is
    /// left unchanged.
    pub async fn dispatch(&mut self, action: FilterAction) -> Result<bool, FilterError> {
        let Some(pending) = self.begin_dispatch(action)? else {
            return Ok(false);
        };
        self.run(pending).await;
        Ok(true)
    }

    /// Reload from page 1 with the current filters.
    pub async fn refresh(&mut self) -> MergeOutcome {
        let pending = self.begin_refresh();
        self.run(pending).await
    }

    /// Fetch and append the next page.
    ///
    /// Returns `None` when the request was dropped because a fetch is
    /// already in flight or no pages remain.
    pub async fn load_more(&mut self) -> Option<MergeOutcome> {
        let pending = self.begin_load_more()?;
        Some(self.run(pending).await)
    }

    /// Apply `action` and issue a reset fetch if the filters changed.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError`] for a rejected transition.
    pub fn begin_dispatch(&mut self, action: FilterAction) -> Result<Option<PendingFetch>, FilterError> {
        let next = self.state.apply(action)?;
        if next == self.state {
            return Ok(None);
        }
        self.state = next;
        Ok(Some(self.begin_refresh()))
    }

    /// Issue a reset fetch for the current filters.
    pub fn begin_refresh(&mut self) -> PendingFetch {
        let ticket = self.results.begin_reset();
        self.pending(ticket)
    }

    /// Issue a fetch for the next page, unless one is in flight or none remain.
    pub fn begin_load_more(&mut self) -> Option<PendingFetch> {
        let ticket = self.results.begin_load_more()?;
        Some(self.pending(ticket))
    }

    /// Perform the request for `pending`.
    ///
    /// # Errors
    ///
    /// Returns the fetcher's [`ClientError`].
    pub async fn execute(&self, pending: &PendingFetch) -> Result<ListResponse, ClientError> {
        self.fetcher.fetch(&pending.params).await
    }

    /// Apply the response for `pending`.
    pub fn complete(
        &mut self,
        pending: &PendingFetch,
        result: Result<ListResponse, ClientError>,
    ) -> MergeOutcome {
        self.results.complete(pending.ticket, result)
    }

    async fn run(&mut self, pending: PendingFetch) -> MergeOutcome {
        let result = self.execute(&pending).await;
        self.complete(&pending, result)
    }

    fn pending(&self, ticket: FetchTicket) -> PendingFetch {
        PendingFetch {
            params: encode(&self.state, ticket.page, self.limit),
            ticket,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use atelier_core::{FilterCriteria, Price, Product, ProductId, ProductQuery, Slug};

    use super::*;

    /// Serves pages from a fixed catalog through the real query pipeline.
    struct FixtureFetcher {
        products: Vec<Product>,
        requests: Mutex<Vec<ListingParams>>,
        fail: Mutex<bool>,
    }

    impl FixtureFetcher {
        fn new(count: i32) -> Self {
            let products = (1..=count)
                .map(|id| {
                    let at = chrono::DateTime::from_timestamp(1_700_000_000 + i64::from(id), 0)
                        .unwrap();
                    Product {
                        id: ProductId::new(id),
                        name: format!("Item {id}"),
                        slug: Slug::parse(&format!("item-{id}")).unwrap(),
                        price: Price::from_units(u32::try_from(id).unwrap() * 5),
                        brand: "Atelier".to_owned(),
                        image: "/images/i.jpg".to_owned(),
                        category: if id % 2 == 0 { "Tops" } else { "Shorts" }.to_owned(),
                        dress_style: "Casual".to_owned(),
                        colors: vec!["Red".to_owned()],
                        sizes: vec!["M".to_owned()],
                        description: String::new(),
                        popularity: 0,
                        created_at: at,
                        updated_at: at,
                    }
                })
                .collect();
            Self {
                products,
                requests: Mutex::new(Vec::new()),
                fail: Mutex::new(false),
            }
        }
    }

    #[async_trait]
    impl ListingFetcher for FixtureFetcher {
        async fn fetch(&self, params: &ListingParams) -> Result<ListResponse, ClientError> {
            self.requests.lock().unwrap().push(params.clone());
            if *self.fail.lock().unwrap() {
                return Err(ClientError::Api {
                    status: 500,
                    message: "Internal server error".to_owned(),
                });
            }

            let criteria = FilterCriteria::from_params(params).unwrap();
            let query = ProductQuery::from_criteria(&criteria);
            let (rows, total) = query.apply(&self.products);
            let info = atelier_core::PageInfo::new(criteria.window(), total);
            Ok(atelier_core::Page::new(rows, info).into())
        }
    }

    #[tokio::test]
    async fn test_refresh_and_load_more_walk_all_pages() {
        let fixture = FixtureFetcher::new(5);
        let mut session = ListingSession::new(fixture, 2);

        session.refresh().await;
        assert_eq!(session.results().items().len(), 2);
        assert_eq!(session.results().total_pages(), 3);

        assert!(session.load_more().await.is_some());
        assert!(session.load_more().await.is_some());
        assert!(session.load_more().await.is_none());

        let mut ids: Vec<i32> = session.results().items().iter().map(|p| p.id.as_i32()).collect();
        assert_eq!(ids.len(), 5);
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[tokio::test]
    async fn test_dispatch_resets_to_first_page() {
        let fixture = FixtureFetcher::new(6);
        let mut session = ListingSession::new(fixture, 2);
        session.refresh().await;
        session.load_more().await;
        assert_eq!(session.results().next_page(), 3);

        let reloaded = session
            .dispatch(FilterAction::ToggleCategory("Tops".to_owned()))
            .await
            .unwrap();
        assert!(reloaded);
        assert_eq!(session.results().next_page(), 2);
        assert_eq!(session.results().total_products(), 3);
        assert!(session.results().items().iter().all(|p| p.category == "Tops"));

        let last = session.fetcher.requests.lock().unwrap().last().cloned().unwrap();
        assert_eq!(last.page.as_deref(), Some("1"));
        assert_eq!(last.categories.as_deref(), Some("Tops"));
    }

    #[tokio::test]
    async fn test_unchanged_dispatch_does_not_fetch() {
        let fixture = FixtureFetcher::new(3);
        let mut session = ListingSession::new(fixture, 2);
        session.refresh().await;

        let reloaded = session.dispatch(FilterAction::ClearAll).await.unwrap();
        assert!(!reloaded);
        assert_eq!(session.fetcher.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_action_leaves_session_untouched() {
        let fixture = FixtureFetcher::new(3);
        let mut session = ListingSession::new(fixture, 2);
        let err = session
            .dispatch(FilterAction::ToggleColor("Red,Blue".to_owned()))
            .await
            .unwrap_err();
        assert!(matches!(err, FilterError::CommaInValue(_)));
        assert_eq!(session.state(), &FilterState::default());
        assert!(session.fetcher.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stale_response_after_newer_reset_is_discarded() {
        let fixture = FixtureFetcher::new(6);
        let mut session = ListingSession::new(fixture, 10);

        let first = session
            .begin_dispatch(FilterAction::ToggleCategory("Shorts".to_owned()))
            .unwrap()
            .unwrap();
        let second = session
            .begin_dispatch(FilterAction::ToggleCategory("Shorts".to_owned()))
            .unwrap()
            .unwrap();

        let second_result = session.execute(&second).await;
        let first_result = session.execute(&first).await;

        assert!(matches!(
            session.complete(&second, second_result),
            MergeOutcome::Applied { added: 6 }
        ));
        assert_eq!(session.complete(&first, first_result), MergeOutcome::Stale);
        assert_eq!(session.results().items().len(), 6);
        assert!(session.state().is_unfiltered());
    }

    #[tokio::test]
    async fn test_failed_load_more_keeps_results() {
        let fixture = FixtureFetcher::new(4);
        let mut session = ListingSession::new(fixture, 2);
        session.refresh().await;

        *session.fetcher.fail.lock().unwrap() = true;
        assert_eq!(session.load_more().await, Some(MergeOutcome::Failed));
        assert_eq!(session.results().items().len(), 2);
        assert!(session.results().error().is_some());

        *session.fetcher.fail.lock().unwrap() = false;
        session.load_more().await;
        assert_eq!(session.results().items().len(), 4);
        assert_eq!(session.results().error(), None);
    }
}
