use payloads::{Cursor, next_page_param, requests::BookingNftListingQuery};
use reqwest::StatusCode;
use test_helpers::{
    assert_status_code,
    mock::{ALICE, BOB, alice_bookings, bob_bookings},
    spawn_app,
};

#[tokio::test]
async fn first_page_carries_a_cursor() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let bookings = alice_bookings();
    app.set_bookings(bookings.clone());

    let query = BookingNftListingQuery::for_recipient(ALICE);
    let page = app.api_client().list_booking_nfts(&query, None).await?;

    assert_eq!(page.data, bookings[..2]);
    assert_eq!(next_page_param(&page), Some(Cursor("2".into())));

    let requests = app.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].recipient.as_deref(), Some(ALICE));
    assert_eq!(requests[0].cursor, None);
    Ok(())
}

#[tokio::test]
async fn cursor_is_sent_as_query_parameter() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let bookings = alice_bookings();
    app.set_bookings(bookings.clone());

    let query = BookingNftListingQuery::for_recipient(ALICE);
    let cursor = Cursor("2".into());
    let page = app
        .api_client()
        .list_booking_nfts(&query, Some(&cursor))
        .await?;

    assert_eq!(page.data, bookings[2..]);
    assert_eq!(next_page_param(&page), None);
    assert_eq!(app.requests()[0].cursor, Some(cursor));
    Ok(())
}

#[tokio::test]
async fn listing_is_filtered_by_recipient() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let bob = bob_bookings();
    app.set_bookings(alice_bookings());
    app.add_bookings(bob.clone());

    let query = BookingNftListingQuery::for_recipient(BOB);
    let page = app.api_client().list_booking_nfts(&query, None).await?;

    assert_eq!(page.data, bob);
    assert_eq!(next_page_param(&page), None);
    Ok(())
}

#[tokio::test]
async fn unknown_recipient_gets_an_empty_last_page() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.set_bookings(alice_bookings());

    let query = BookingNftListingQuery::for_recipient("0xnobody");
    let page = app.api_client().list_booking_nfts(&query, None).await?;

    assert!(page.data.is_empty());
    assert_eq!(next_page_param(&page), None);
    Ok(())
}

#[tokio::test]
async fn server_errors_carry_status_and_body() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.set_bookings(alice_bookings());
    app.fail_page(ALICE, None, StatusCode::SERVICE_UNAVAILABLE);

    let query = BookingNftListingQuery::for_recipient(ALICE);
    let result = app.api_client().list_booking_nfts(&query, None).await;
    assert_status_code(result, StatusCode::SERVICE_UNAVAILABLE);
    Ok(())
}

#[tokio::test]
async fn unreachable_indexer_is_a_network_error() {
    let client = payloads::APIClient::new("http://127.0.0.1:1/");
    let query = BookingNftListingQuery::for_recipient(ALICE);
    let result = client.list_booking_nfts(&query, None).await;
    assert!(matches!(result, Err(payloads::ClientError::Network(_))));
}
