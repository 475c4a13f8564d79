pub mod mock;

use actix_web::{App, HttpResponse, HttpServer, get, web};
use bookings::{
    Account, BookingsHandle, BookingsProvider, telemetry, time::TimeSource,
};
use jiff::tz::TimeZone;
use payloads::{
    APIClient, ApiBookingNft, ClientError, Cursor, Page,
    requests::BookingNftListingParams,
};
use reqwest::StatusCode;
use std::net::TcpListener;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::watch;
use tracing_log::LogTracer;
use tracing_subscriber::util::SubscriberInitExt;

/// Records per page served by the mock indexer unless changed.
pub const DEFAULT_PAGE_SIZE: usize = 2;

/// In-memory stand-in for the booking NFT indexer.
///
/// Cursors are the decimal offset of the next record, so a listing of `n`
/// records takes `ceil(n / page_size)` requests (one for an empty listing).
#[derive(Default)]
pub struct MockIndexer {
    inner: Mutex<IndexerState>,
}

#[derive(Default)]
struct IndexerState {
    bookings: Vec<ApiBookingNft>,
    page_size: usize,
    delay: Duration,
    failures: Vec<(Option<String>, Option<String>, StatusCode)>,
    requests: Vec<BookingNftListingParams>,
}

impl MockIndexer {
    fn new() -> Self {
        let indexer = Self::default();
        indexer.lock().page_size = DEFAULT_PAGE_SIZE;
        indexer
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, IndexerState> {
        self.inner.lock().unwrap()
    }

    /// Serve one page, or the configured failure for it.
    fn page(
        &self,
        params: BookingNftListingParams,
    ) -> Result<Page<ApiBookingNft>, StatusCode> {
        let mut state = self.lock();
        state.requests.push(params.clone());

        let cursor = params.cursor.as_ref().map(|c| c.0.clone());
        if let Some((_, _, status)) = state
            .failures
            .iter()
            .find(|(r, c, _)| *r == params.recipient && *c == cursor)
        {
            return Err(*status);
        }

        let matching: Vec<_> = state
            .bookings
            .iter()
            .filter(|b| match &params.recipient {
                Some(recipient) => &b.recipient == recipient,
                None => true,
            })
            .cloned()
            .collect();

        let offset: usize = match &cursor {
            Some(c) => c.parse().map_err(|_| StatusCode::BAD_REQUEST)?,
            None => 0,
        };
        let end = (offset + state.page_size).min(matching.len());
        let data = matching.get(offset..end).unwrap_or_default().to_vec();

        Ok(if end < matching.len() {
            Page::with_cursor(data, Cursor(end.to_string()))
        } else {
            Page::last(data)
        })
    }
}

#[get("/bookingNFTs")]
async fn booking_nfts(
    params: web::Query<BookingNftListingParams>,
    indexer: web::Data<MockIndexer>,
) -> HttpResponse {
    let delay = indexer.lock().delay;
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    match indexer.page(params.into_inner()) {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(status) => {
            // actix and reqwest depend on different `http` major versions
            let status = actix_web::http::StatusCode::from_u16(status.as_u16())
                .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);
            HttpResponse::build(status).body("indexer unavailable")
        }
    }
}

pub struct TestApp {
    #[allow(unused)]
    pub port: u16,
    pub address: String,
    pub indexer: web::Data<MockIndexer>,
    pub time_source: TimeSource,
}

impl TestApp {
    /// A client pointed at the mock indexer.
    pub fn api_client(&self) -> APIClient {
        APIClient::new(&self.address)
    }

    /// Replace the bookings served by the indexer.
    pub fn set_bookings(&self, bookings: Vec<ApiBookingNft>) {
        self.indexer.lock().bookings = bookings;
    }

    pub fn add_bookings(&self, bookings: Vec<ApiBookingNft>) {
        self.indexer.lock().bookings.extend(bookings);
    }

    pub fn set_page_size(&self, page_size: usize) {
        self.indexer.lock().page_size = page_size.max(1);
    }

    /// Hold every response back for `delay`.
    pub fn set_delay(&self, delay: Duration) {
        self.indexer.lock().delay = delay;
    }

    /// Answer the page of `recipient` starting at `cursor` with `status`.
    pub fn fail_page(
        &self,
        recipient: &str,
        cursor: Option<&str>,
        status: StatusCode,
    ) {
        self.indexer.lock().failures.push((
            Some(recipient.into()),
            cursor.map(Into::into),
            status,
        ));
    }

    pub fn clear_failures(&self) {
        self.indexer.lock().failures.clear();
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<BookingNftListingParams> {
        self.indexer.lock().requests.clone()
    }

    /// Requests received for `recipient`.
    pub fn requests_for(&self, recipient: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.recipient.as_deref() == Some(recipient))
            .count()
    }

    /// Start a provider against this indexer, following `identity`.
    pub fn spawn_provider(
        &self,
        identity: watch::Receiver<Option<Account>>,
    ) -> (BookingsProvider, BookingsHandle) {
        BookingsProvider::spawn(
            self.api_client(),
            identity,
            self.time_source.clone(),
            TimeZone::UTC,
        )
    }

    /// Start a provider for a fixed account. The identity sender is
    /// returned so the caller can switch accounts.
    pub fn spawn_provider_for(
        &self,
        address: &str,
    ) -> (
        watch::Sender<Option<Account>>,
        BookingsProvider,
        BookingsHandle,
    ) {
        let (tx, rx) = watch::channel(Some(Account::new(address)));
        let (provider, handle) = self.spawn_provider(rx);
        (tx, provider, handle)
    }
}

/// Start the mock indexer on an OS-assigned port for parallel testing.
pub async fn spawn_app() -> TestApp {
    let subscriber = telemetry::get_subscriber("error".into());
    let _ = LogTracer::init();
    let _ = subscriber.try_init();

    #[cfg(feature = "mock-time")]
    let time_source = TimeSource::new(mock::NOW.parse().unwrap());

    #[cfg(not(feature = "mock-time"))]
    let time_source = TimeSource::new();

    let indexer = web::Data::new(MockIndexer::new());
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let app_indexer = indexer.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_indexer.clone())
            .service(web::scope("/api").service(booking_nfts))
    })
    .workers(1)
    .listen(listener)
    .unwrap()
    .run();
    tokio::spawn(server);
    tracing::debug!(port, "mock indexer listening");

    let address = format!("http://127.0.0.1:{port}/api/");
    TestApp {
        port,
        address,
        indexer,
        time_source,
    }
}

/// Assert that the result of an API action results in a specific status code.
pub fn assert_status_code<T>(
    result: Result<T, ClientError>,
    expected: StatusCode,
) {
    match result {
        Err(ClientError::APIError(code, _)) => {
            assert_eq!(code, expected)
        }
        _ => panic!("Expected APIError"),
    };
}
