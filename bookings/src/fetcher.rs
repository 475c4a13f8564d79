//! Cursor-driven paging over the booking NFT listing.
//!
//! ```text
//!   set_owner(Some)        first page          page with cursor
//! Unresolved ---------> Loading ---------> Paging <-----------+
//!     ^                                      |  |  next page  |
//!     |  set_owner / refetch                 |  +-------------+
//!     +--------------------------------------+
//!                                            | page without cursor
//!                                            v
//!                                         Settled
//! ```
//!
//! A page request is split into [`PagedFetcher::next_request`] and
//! [`PagedFetcher::complete`] so a driver can publish the in-flight state
//! and abandon a request when the owner changes. Requests are issued one at
//! a time: `next_request` hands out nothing while one is outstanding, and a
//! completion from before the last reset is ignored.

use std::future::Future;
use std::sync::Arc;

use payloads::{
    APIClient, ApiBookingNft, ClientError, Cursor, Page, next_page_param,
    requests::BookingNftListingQuery,
};

/// Anything that can serve pages of booking NFTs.
pub trait BookingSource: Send + Sync + 'static {
    fn list_booking_nfts(
        &self,
        query: &BookingNftListingQuery,
        cursor: Option<&Cursor>,
    ) -> impl Future<Output = Result<Page<ApiBookingNft>, ClientError>> + Send;
}

impl BookingSource for APIClient {
    fn list_booking_nfts(
        &self,
        query: &BookingNftListingQuery,
        cursor: Option<&Cursor>,
    ) -> impl Future<Output = Result<Page<ApiBookingNft>, ClientError>> + Send
    {
        APIClient::list_booking_nfts(self, query, cursor)
    }
}

impl<S: BookingSource> BookingSource for Arc<S> {
    fn list_booking_nfts(
        &self,
        query: &BookingNftListingQuery,
        cursor: Option<&Cursor>,
    ) -> impl Future<Output = Result<Page<ApiBookingNft>, ClientError>> + Send
    {
        self.as_ref().list_booking_nfts(query, cursor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStatus {
    /// No owner, or nothing fetched yet for the current owner.
    #[default]
    Unresolved,
    /// First page in flight.
    Loading,
    /// At least one page received and the server reported more.
    Paging,
    /// Every page for the owner has been fetched.
    Settled,
}

/// A page request handed out by [`PagedFetcher::next_request`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub query: BookingNftListingQuery,
    pub cursor: Option<Cursor>,
    generation: u64,
}

pub struct PagedFetcher<S> {
    source: S,
    query: Option<BookingNftListingQuery>,
    pages: Vec<Page<ApiBookingNft>>,
    next_cursor: Option<Cursor>,
    status: FetchStatus,
    in_flight: bool,
    last_error: Option<String>,
    /// Bumped on every reset so stale completions can be recognised.
    generation: u64,
}

impl<S: BookingSource> PagedFetcher<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            query: None,
            pages: Vec::new(),
            next_cursor: None,
            status: FetchStatus::Unresolved,
            in_flight: false,
            last_error: None,
            generation: 0,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn owner(&self) -> Option<&str> {
        self.query.as_ref().and_then(|q| q.recipient.as_deref())
    }

    pub fn status(&self) -> FetchStatus {
        self.status
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// First page in flight, nothing to show yet.
    pub fn is_loading(&self) -> bool {
        self.status == FetchStatus::Loading
    }

    /// A page after the first is in flight.
    pub fn is_fetching_next_page(&self) -> bool {
        self.in_flight && !self.pages.is_empty()
    }

    pub fn has_next_page(&self) -> bool {
        self.query.is_some() && self.status != FetchStatus::Settled
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages.len()
    }

    /// All records fetched so far in server order, or `None` while nothing
    /// has resolved for the current owner.
    pub fn records(&self) -> Option<Vec<ApiBookingNft>> {
        if self.pages.is_empty() {
            return None;
        }
        Some(
            self.pages
                .iter()
                .flat_map(|page| page.data.iter().cloned())
                .collect(),
        )
    }

    /// Switch to a different owner, discarding everything fetched for the
    /// previous one. Setting the current owner again changes nothing.
    pub fn set_owner(&mut self, owner: Option<String>) {
        if self.owner() == owner.as_deref() {
            return;
        }
        tracing::debug!(?owner, "booking NFT owner changed");
        self.query = owner.map(BookingNftListingQuery::for_recipient);
        self.reset();
    }

    /// Start over from the first page for the current owner.
    pub fn refetch(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.pages.clear();
        self.next_cursor = None;
        self.status = FetchStatus::Unresolved;
        self.in_flight = false;
        self.last_error = None;
        self.generation += 1;
    }

    /// Claim the next page to fetch. Returns `None` when there is no owner,
    /// the listing is settled, a request is already outstanding, or the
    /// previous request failed (call [`Self::refetch`] to retry).
    pub fn next_request(&mut self) -> Option<PageRequest> {
        let query = self.query.clone()?;
        if self.in_flight
            || self.status == FetchStatus::Settled
            || self.last_error.is_some()
        {
            return None;
        }
        self.in_flight = true;
        if self.pages.is_empty() {
            self.status = FetchStatus::Loading;
        }
        Some(PageRequest {
            query,
            cursor: self.next_cursor.clone(),
            generation: self.generation,
        })
    }

    /// Give up on `request` without a result, e.g. because the driver
    /// stopped waiting for it. The same page is handed out again by the
    /// next [`Self::next_request`].
    pub fn abandon(&mut self, request: PageRequest) {
        if request.generation != self.generation {
            return;
        }
        self.in_flight = false;
        if self.pages.is_empty() {
            self.status = FetchStatus::Unresolved;
        }
    }

    /// Record the outcome of `request`. A request from before the last
    /// reset is dropped without touching any state.
    pub fn complete(
        &mut self,
        request: PageRequest,
        result: Result<Page<ApiBookingNft>, ClientError>,
    ) -> Result<(), ClientError> {
        if request.generation != self.generation {
            tracing::debug!(?request.cursor, "discarding stale page");
            return Ok(());
        }
        self.in_flight = false;

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                self.last_error = Some(e.to_string());
                if self.pages.is_empty() {
                    self.status = FetchStatus::Unresolved;
                }
                return Err(e);
            }
        };

        self.next_cursor = next_page_param(&page);
        tracing::info!(
            owner = ?request.query.recipient,
            cursor = ?request.cursor,
            records = page.data.len(),
            has_next_page = self.next_cursor.is_some(),
            "fetched booking NFT page"
        );
        self.pages.push(page);
        self.status = if self.next_cursor.is_some() {
            FetchStatus::Paging
        } else {
            FetchStatus::Settled
        };
        Ok(())
    }

    /// Fetch the next page, if any. Returns whether a request was made.
    pub async fn fetch_next_page(&mut self) -> Result<bool, ClientError> {
        let Some(request) = self.next_request() else {
            return Ok(false);
        };
        let result = self
            .source
            .list_booking_nfts(&request.query, request.cursor.as_ref())
            .await;
        self.complete(request, result)?;
        Ok(true)
    }

    /// Keep fetching pages one after another until the listing is settled.
    #[tracing::instrument(skip(self), fields(owner = ?self.owner()))]
    pub async fn fetch_all(&mut self) -> Result<(), ClientError> {
        while self.fetch_next_page().await? {}
        Ok(())
    }
}
