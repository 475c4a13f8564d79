//! Publishes the current account's booking NFTs and the aggregates derived
//! from them.
//!
//! [`BookingsProvider::spawn`] starts a task that owns a [`PagedFetcher`],
//! follows the account on the identity channel and pages through the
//! listing without being asked. Every state change is pushed to a watch
//! channel; [`BookingsHandle`] is the read side and can only be obtained
//! from a provider.

use std::sync::Arc;

use jiff::tz::TimeZone;
use payloads::{ApiBookingNft, ClientError, Page};
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;

use crate::derive::DerivedState;
use crate::fetcher::{BookingSource, FetchStatus, PageRequest, PagedFetcher};
use crate::telemetry::log_error;
use crate::time::TimeSource;

/// The connected wallet account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub address: String,
}

impl Account {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

/// Snapshot handed to consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MyBookingNfts {
    pub owner: Option<String>,
    /// Everything fetched so far, `None` until the first page arrives.
    pub my_booking_nfts: Option<Vec<ApiBookingNft>>,
    /// First page in flight.
    pub is_loading: bool,
    pub is_fetching_next_page: bool,
    pub my_last_booking_nft: Option<ApiBookingNft>,
    pub voting_power: Option<i64>,
    pub active_booking_nfts: Option<Vec<ApiBookingNft>>,
    pub status: FetchStatus,
    /// Message of the last failed page request. Paging stops until a
    /// refetch or an account change.
    pub error: Option<String>,
}

impl MyBookingNfts {
    pub fn is_settled(&self) -> bool {
        self.status == FetchStatus::Settled
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error(
        "Booking NFT provider is no longer running; handles can only be \
         used while their provider is alive"
    )]
    Closed,
    #[error("Failed to fetch booking NFTs: {0}")]
    Fetch(String),
}

/// Read access to the published booking state.
#[derive(Clone)]
pub struct BookingsHandle {
    rx: watch::Receiver<MyBookingNfts>,
}

impl BookingsHandle {
    /// The latest published snapshot.
    pub fn current(&self) -> MyBookingNfts {
        self.rx.borrow().clone()
    }

    /// Wait for the next published change.
    pub async fn changed(&mut self) -> Result<MyBookingNfts, ProviderError> {
        self.rx.changed().await.map_err(|_| ProviderError::Closed)?;
        Ok(self.rx.borrow_and_update().clone())
    }

    /// Wait until every page for the current account has been fetched.
    ///
    /// Fails if a page request fails first. With no account connected
    /// this waits until one is.
    pub async fn wait_until_settled(
        &mut self,
    ) -> Result<MyBookingNfts, ProviderError> {
        let state = self
            .rx
            .wait_for(|state| state.is_settled() || state.error.is_some())
            .await
            .map_err(|_| ProviderError::Closed)?
            .clone();
        match state.error {
            Some(e) => Err(ProviderError::Fetch(e)),
            None => Ok(state),
        }
    }
}

pub struct BookingsProvider {
    refetch: Arc<Notify>,
    task: JoinHandle<()>,
}

impl BookingsProvider {
    /// Start following `identity`, fetching from `source`. Remaining nights
    /// are counted from the current day in `time_zone`.
    pub fn spawn<S: BookingSource>(
        source: S,
        identity: watch::Receiver<Option<Account>>,
        time_source: TimeSource,
        time_zone: TimeZone,
    ) -> (Self, BookingsHandle) {
        let (tx, rx) = watch::channel(MyBookingNfts::default());
        let refetch = Arc::new(Notify::new());
        let driver = Driver {
            fetcher: PagedFetcher::new(source),
            identity,
            identity_open: true,
            refetch: refetch.clone(),
            time_source,
            time_zone,
            tx,
        };
        let task = tokio::spawn(driver.run());
        (Self { refetch, task }, BookingsHandle { rx })
    }

    /// Drop what has been fetched and page through the listing again.
    pub fn refetch(&self) {
        self.refetch.notify_one();
    }

    /// Stop the paging task. Outstanding handles see
    /// [`ProviderError::Closed`] from then on.
    pub fn shutdown(self) {
        self.task.abort();
    }
}

impl Drop for BookingsProvider {
    fn drop(&mut self) {
        self.task.abort();
    }
}

enum Event {
    Page(Result<Page<ApiBookingNft>, ClientError>),
    IdentityChanged,
    IdentityClosed,
    Refetch,
}

struct Driver<S> {
    fetcher: PagedFetcher<S>,
    identity: watch::Receiver<Option<Account>>,
    identity_open: bool,
    refetch: Arc<Notify>,
    time_source: TimeSource,
    time_zone: TimeZone,
    tx: watch::Sender<MyBookingNfts>,
}

impl<S: BookingSource> Driver<S> {
    async fn run(mut self) {
        self.follow_identity();
        loop {
            let request = self.fetcher.next_request();
            self.publish();

            let Some(request) = request else {
                let event = tokio::select! {
                    changed = self.identity.changed(), if self.identity_open => {
                        identity_event(changed)
                    }
                    _ = self.refetch.notified() => Event::Refetch,
                };
                self.handle(event);
                continue;
            };

            match self.wait_for_page(&request).await {
                Event::Page(result) => {
                    let _ = self
                        .fetcher
                        .complete(request, result)
                        .map_err(log_error);
                }
                event => {
                    // the request future was dropped with wait_for_page
                    self.fetcher.abandon(request);
                    self.handle(event);
                }
            }
        }
    }

    /// Wait for the page `request` asks for, or for an event that makes it
    /// obsolete. The identity channel announcing the account the request
    /// was made for again does not interrupt the request.
    async fn wait_for_page(&mut self, request: &PageRequest) -> Event {
        let page = self
            .fetcher
            .source()
            .list_booking_nfts(&request.query, request.cursor.as_ref());
        tokio::pin!(page);

        loop {
            tokio::select! {
                result = &mut page => return Event::Page(result),
                changed = self.identity.changed(), if self.identity_open => {
                    if changed.is_err() {
                        tracing::debug!("identity source closed");
                        self.identity_open = false;
                        continue;
                    }
                    let same_owner = self
                        .identity
                        .borrow()
                        .as_ref()
                        .map(|account| account.address.as_str())
                        == request.query.recipient.as_deref();
                    if !same_owner {
                        return Event::IdentityChanged;
                    }
                    tracing::trace!(
                        "account re-announced, keeping page request"
                    );
                }
                _ = self.refetch.notified() => return Event::Refetch,
            }
        }
    }

    fn handle(&mut self, event: Event) {
        match event {
            Event::Page(_) => {}
            Event::IdentityChanged => self.follow_identity(),
            Event::IdentityClosed => {
                tracing::debug!("identity source closed");
                self.identity_open = false;
            }
            Event::Refetch => {
                tracing::info!(owner = ?self.fetcher.owner(), "refetching");
                self.fetcher.refetch();
            }
        }
    }

    fn follow_identity(&mut self) {
        let owner = self
            .identity
            .borrow_and_update()
            .as_ref()
            .map(|account| account.address.clone());
        self.fetcher.set_owner(owner);
    }

    fn publish(&self) {
        let records = self.fetcher.records();
        let today = self.time_source.today(&self.time_zone);
        let derived = DerivedState::derive(records.as_deref(), |record| {
            record.remaining_nights(today)
        });
        let state = MyBookingNfts {
            owner: self.fetcher.owner().map(str::to_string),
            my_booking_nfts: records,
            is_loading: self.fetcher.is_loading(),
            is_fetching_next_page: self.fetcher.is_fetching_next_page(),
            my_last_booking_nft: derived.last,
            voting_power: derived.voting_power,
            active_booking_nfts: derived.active,
            status: self.fetcher.status(),
            error: self.fetcher.last_error().map(str::to_string),
        };
        self.tx.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            tracing::debug!(
                status = ?state.status,
                voting_power = ?state.voting_power,
                "publishing booking NFT state"
            );
            *current = state;
            true
        });
    }
}

fn identity_event(changed: Result<(), watch::error::RecvError>) -> Event {
    match changed {
        Ok(()) => Event::IdentityChanged,
        Err(_) => Event::IdentityClosed,
    }
}
