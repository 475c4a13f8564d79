use anyhow::Context;
use tokio::sync::watch;

use bookings::{
    Account, BookingsProvider, Config,
    telemetry::{get_subscriber, init_subscriber},
    time::TimeSource,
};
use payloads::APIClient;

/// Prints the voting power of an account from its booking NFTs.
///
/// Environment variables can be set directly or loaded from a .env file in
/// the working directory.
///
/// Required environment variables:
/// - API_ENDPOINT: Base url of the booking NFT indexer
/// - ACCOUNT_ADDRESS: Address whose bookings are counted
///
/// Optional:
/// - TIME_ZONE: IANA zone deciding what "today" is (defaults to UTC)
/// - REQUEST_TIMEOUT_SECS: Timeout per page request (defaults to 30)
///
/// Example:
/// API_ENDPOINT=https://api.example.com/ ACCOUNT_ADDRESS=0xabc cargo run
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if available
    let _ = dotenvy::dotenv();

    let subscriber = get_subscriber("info".into());
    init_subscriber(subscriber);

    let config = Config::from_env()?;
    let address = config
        .account_address
        .clone()
        .context("ACCOUNT_ADDRESS must be set")?;

    let client = APIClient {
        address: config.api_endpoint.clone(),
        inner_client: reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?,
    };

    #[cfg(not(feature = "mock-time"))]
    let time_source = TimeSource::new();
    #[cfg(feature = "mock-time")]
    let time_source = TimeSource::new(jiff::Timestamp::now());

    // keep the sender alive so the provider keeps following the account
    let (_identity, identity_rx) = watch::channel(Some(Account::new(address)));
    let (provider, mut handle) = BookingsProvider::spawn(
        client,
        identity_rx,
        time_source,
        config.time_zone.clone(),
    );

    let state = handle.wait_until_settled().await?;
    provider.shutdown();

    let total = state.my_booking_nfts.as_ref().map_or(0, Vec::len);
    let active = state.active_booking_nfts.unwrap_or_default();
    tracing::info!(
        total,
        active = active.len(),
        voting_power = state.voting_power.unwrap_or(0),
        "booking NFTs settled"
    );

    println!("booking NFTs: {total}");
    for nft in &active {
        println!(
            "  {} {} -> {} ({} nights)",
            nft.object_id,
            nft.start_date,
            nft.end_date,
            nft.nights()
        );
    }
    if let Some(last) = &state.my_last_booking_nft {
        println!("latest booking: {}", last.object_id);
    }
    println!("voting power: {}", state.voting_power.unwrap_or(0));
    Ok(())
}
