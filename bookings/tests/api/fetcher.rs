use bookings::{DerivedState, FetchStatus, PagedFetcher};
use jiff::tz::TimeZone;
use reqwest::StatusCode;
use test_helpers::{
    mock::{ALICE, ALICE_VOTING_POWER, CHARLIE, alice_bookings, many_bookings},
    spawn_app,
};

#[tokio::test]
async fn two_pages_of_two_take_two_requests() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let bookings = alice_bookings();
    app.set_bookings(bookings.clone());

    let mut fetcher = PagedFetcher::new(app.api_client());
    fetcher.set_owner(Some(ALICE.into()));
    fetcher.fetch_all().await?;

    assert_eq!(fetcher.status(), FetchStatus::Settled);
    assert_eq!(fetcher.pages_fetched(), 2);
    assert_eq!(fetcher.records(), Some(bookings.clone()));
    assert_eq!(app.requests_for(ALICE), 2);

    let today = app.time_source.today(&TimeZone::UTC);
    let records = fetcher.records();
    let derived = DerivedState::derive(records.as_deref(), |record| {
        record.remaining_nights(today)
    });
    assert_eq!(derived.voting_power, Some(ALICE_VOTING_POWER));
    assert_eq!(derived.last, bookings.last().cloned());
    Ok(())
}

#[tokio::test]
async fn paging_terminates_on_large_listings() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.set_page_size(7);
    let bookings = many_bookings(ALICE, 50);
    app.set_bookings(bookings.clone());

    let mut fetcher = PagedFetcher::new(app.api_client());
    fetcher.set_owner(Some(ALICE.into()));
    fetcher.fetch_all().await?;

    // ceil(50 / 7)
    assert_eq!(app.requests_for(ALICE), 8);
    assert_eq!(fetcher.records(), Some(bookings));
    assert!(!fetcher.has_next_page());
    Ok(())
}

#[tokio::test]
async fn account_without_bookings_settles_after_one_request()
-> anyhow::Result<()> {
    let app = spawn_app().await;
    app.set_bookings(alice_bookings());

    let mut fetcher = PagedFetcher::new(app.api_client());
    fetcher.set_owner(Some(CHARLIE.into()));
    fetcher.fetch_all().await?;

    assert_eq!(fetcher.records(), Some(vec![]));
    assert_eq!(app.requests_for(CHARLIE), 1);
    Ok(())
}

#[tokio::test]
async fn failed_page_is_not_retried_until_refetch() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.set_bookings(alice_bookings());
    app.fail_page(ALICE, Some("2"), StatusCode::BAD_GATEWAY);

    let mut fetcher = PagedFetcher::new(app.api_client());
    fetcher.set_owner(Some(ALICE.into()));
    assert!(fetcher.fetch_all().await.is_err());
    assert!(!fetcher.fetch_next_page().await?);
    assert_eq!(fetcher.records().map(|r| r.len()), Some(2));
    assert_eq!(app.requests_for(ALICE), 2);

    app.clear_failures();
    fetcher.refetch();
    fetcher.fetch_all().await?;
    assert_eq!(fetcher.records().map(|r| r.len()), Some(4));
    assert_eq!(app.requests_for(ALICE), 4);
    Ok(())
}
