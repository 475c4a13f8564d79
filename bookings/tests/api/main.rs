mod client;
mod fetcher;

use bookings::{BookingsHandle, MyBookingNfts};
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(10);

/// Wait for the first published state matching `f`, failing the test if
/// it does not show up in time.
async fn wait_for_state(
    handle: &mut BookingsHandle,
    f: impl Fn(&MyBookingNfts) -> bool,
) -> anyhow::Result<MyBookingNfts> {
    let current = handle.current();
    if f(&current) {
        return Ok(current);
    }
    let wait = async {
        loop {
            let state = handle.changed().await?;
            if f(&state) {
                return Ok::<_, anyhow::Error>(state);
            }
        }
    };
    tokio::time::timeout(TIMEOUT, wait).await?
}
